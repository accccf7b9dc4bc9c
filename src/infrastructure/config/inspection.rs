//! 적용 설정 진단(inspection) 뷰 모델.

use serde::Serialize;

use super::loader::LoadedConfig;
use super::utils::command_exists;
use crate::domain::disk::LowSpacePolicy;

#[derive(Debug, Clone, Serialize)]
pub struct ConfigInspection {
    pub searched_paths: Vec<String>,
    pub loaded_paths: Vec<String>,
    pub effective: EffectiveConfig,
    pub tools_available: ToolAvailability,
}

#[derive(Debug, Clone, Serialize)]
pub struct EffectiveConfig {
    pub work_dir: String,
    pub container_image: String,
    pub config_repo: String,
    pub low_space_policy: LowSpacePolicy,
    pub container_runtime: String,
    pub vcs: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolAvailability {
    pub container_runtime: bool,
    pub vcs: bool,
}

impl ConfigInspection {
    pub(crate) fn from_loaded(loaded: LoadedConfig) -> Self {
        let cfg = &loaded.config;
        let effective = EffectiveConfig {
            work_dir: cfg.work_dir(),
            container_image: cfg.container_image(),
            config_repo: cfg.config_repo(),
            low_space_policy: cfg.low_space_policy(),
            container_runtime: cfg.container_runtime(),
            vcs: cfg.vcs_command(),
        };
        let tools_available = ToolAvailability {
            container_runtime: command_exists(&effective.container_runtime),
            vcs: command_exists(&effective.vcs),
        };

        Self {
            searched_paths: loaded
                .searched_paths
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            loaded_paths: loaded
                .loaded_paths
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            effective,
            tools_available,
        }
    }
}
