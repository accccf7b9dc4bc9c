//! 애플리케이션이 사용하는 설정 스키마(순수 데이터).
//!
//! 주의: 파일/환경변수/프로세스 접근은 `infrastructure`에서만 수행한다.

use serde::{Deserialize, Serialize};

use crate::domain::disk::LowSpacePolicy;
use crate::domain::session::{DEFAULT_CONFIG_REPO, DEFAULT_CONTAINER_IMAGE};

pub const DEFAULT_WORK_DIR: &str = "./fcos";
pub const DEFAULT_CONTAINER_RUNTIME: &str = "podman";
pub const DEFAULT_VCS_COMMAND: &str = "git";

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct Config {
    /// 전역 기본값
    #[serde(default)]
    pub defaults: DefaultsConfig,
    /// 외부 실행 파일 이름/경로
    #[serde(default)]
    pub tools: ToolsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct DefaultsConfig {
    /// cosa 작업 디렉터리
    pub work_dir: Option<String>,
    /// cosa 컨테이너 이미지
    pub container_image: Option<String>,
    /// `cosa init`에 넘길 설정 저장소 URL
    pub config_repo: Option<String>,
    /// 여유 공간이 임계 수준일 때 정책(ask/proceed/abort)
    pub low_space_policy: Option<LowSpacePolicy>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct ToolsConfig {
    pub container_runtime: Option<String>,
    pub vcs: Option<String>,
}

impl Config {
    pub fn work_dir(&self) -> String {
        self.defaults
            .work_dir
            .clone()
            .unwrap_or_else(|| DEFAULT_WORK_DIR.to_string())
    }

    pub fn container_image(&self) -> String {
        self.defaults
            .container_image
            .clone()
            .unwrap_or_else(|| DEFAULT_CONTAINER_IMAGE.to_string())
    }

    pub fn config_repo(&self) -> String {
        self.defaults
            .config_repo
            .clone()
            .unwrap_or_else(|| DEFAULT_CONFIG_REPO.to_string())
    }

    pub fn low_space_policy(&self) -> LowSpacePolicy {
        self.defaults.low_space_policy.unwrap_or_default()
    }

    pub fn container_runtime(&self) -> String {
        self.tools
            .container_runtime
            .clone()
            .unwrap_or_else(|| DEFAULT_CONTAINER_RUNTIME.to_string())
    }

    pub fn vcs_command(&self) -> String {
        self.tools
            .vcs
            .clone()
            .unwrap_or_else(|| DEFAULT_VCS_COMMAND.to_string())
    }

    /// 후순위(나중 파일) 값으로 덮어쓰는 병합 규칙.
    pub fn merge_from(&mut self, other: Config) {
        self.defaults.merge_from(other.defaults);
        self.tools.merge_from(other.tools);
    }
}

impl DefaultsConfig {
    pub(crate) fn merge_from(&mut self, other: DefaultsConfig) {
        if other.work_dir.is_some() {
            self.work_dir = other.work_dir;
        }
        if other.container_image.is_some() {
            self.container_image = other.container_image;
        }
        if other.config_repo.is_some() {
            self.config_repo = other.config_repo;
        }
        if other.low_space_policy.is_some() {
            self.low_space_policy = other.low_space_policy;
        }
    }
}

impl ToolsConfig {
    pub(crate) fn merge_from(&mut self, other: ToolsConfig) {
        if other.container_runtime.is_some() {
            self.container_runtime = other.container_runtime;
        }
        if other.vcs.is_some() {
            self.vcs = other.vcs;
        }
    }
}
