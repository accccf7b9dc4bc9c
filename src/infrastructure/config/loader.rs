//! 설정 파일 탐색/병합 로더.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::config::Config;

pub const CONFIG_ENV: &str = "COSAPILOT_CONFIG";

#[derive(Debug, Clone)]
pub(crate) struct LoadedConfig {
    pub config: Config,
    pub searched_paths: Vec<PathBuf>,
    pub loaded_paths: Vec<PathBuf>,
}

/// 우선순위 경로를 순회해 JSON 설정을 병합한다.
pub(crate) fn load_merged_config() -> Result<LoadedConfig> {
    load_from_paths(config_paths())
}

/// 존재하지 않는 경로는 건너뛰고, 읽기/파싱 실패는 경로와 함께 오류로 돌려준다.
pub(crate) fn load_from_paths(paths: Vec<PathBuf>) -> Result<LoadedConfig> {
    // 낮은 우선순위에서 높은 우선순위 순서로 병합한다.
    let mut merged = Config::default();
    let mut loaded_paths = Vec::new();

    for path in &paths {
        if !path.exists() {
            continue;
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        let parsed: Config = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse JSON in {}", path.display()))?;
        merged.merge_from(parsed);
        loaded_paths.push(path.to_path_buf());
    }

    tracing::debug!(loaded = ?loaded_paths, "config loaded");
    Ok(LoadedConfig {
        config: merged,
        searched_paths: paths,
        loaded_paths,
    })
}

/// 기본 + 사용자 + 프로젝트 + 명시 경로 순으로 병합 경로를 구성한다.
pub fn config_paths() -> Vec<PathBuf> {
    // 낮은 우선순위 -> 높은 우선순위 순서로 병합됨.
    let mut paths = vec![PathBuf::from("/etc/cosapilot/config.json")];

    if let Some(base) = dirs::config_dir() {
        paths.push(base.join("cosapilot").join("config.json"));
    }

    paths.push(PathBuf::from(".cosapilot/config.json"));

    if let Ok(path) = env::var(CONFIG_ENV) {
        paths.push(Path::new(&path).to_path_buf());
    }

    dedup_paths(paths)
}

fn dedup_paths(paths: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut out = Vec::new();
    for p in paths {
        if !out.contains(&p) {
            out.push(p);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::disk::LowSpacePolicy;

    #[test]
    fn merges_existing_files_in_order_and_skips_missing() {
        let dir = tempfile::tempdir().unwrap();
        let system = dir.path().join("system.json");
        let user = dir.path().join("user.json");
        let missing = dir.path().join("missing.json");
        fs::write(
            &system,
            r#"{"defaults": {"work_dir": "/srv/fcos", "low_space_policy": "proceed"}}"#,
        )
        .unwrap();
        fs::write(&user, r#"{"defaults": {"low_space_policy": "abort"}}"#).unwrap();

        let loaded =
            load_from_paths(vec![system.clone(), missing.clone(), user.clone()]).unwrap();

        assert_eq!(loaded.searched_paths.len(), 3);
        assert_eq!(loaded.loaded_paths, vec![system, user]);
        assert_eq!(loaded.config.work_dir(), "/srv/fcos");
        assert_eq!(loaded.config.low_space_policy(), LowSpacePolicy::Abort);
    }

    #[test]
    fn malformed_file_reports_its_path() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("bad.json");
        fs::write(&bad, "{ not json").unwrap();

        let err = load_from_paths(vec![bad.clone()]).unwrap_err();
        assert!(format!("{err:#}").contains(&bad.display().to_string()));
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let paths = dedup_paths(vec![
            PathBuf::from("a.json"),
            PathBuf::from("b.json"),
            PathBuf::from("a.json"),
        ]);
        assert_eq!(paths, vec![PathBuf::from("a.json"), PathBuf::from("b.json")]);
    }
}
