//! cosa 작업 디렉터리 구조 탐지.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const LATEST_BUILD: &str = "latest";

/// `src/config`, `cache`, `builds` 경로 모음.
#[derive(Debug, Clone)]
pub struct WorkDirLayout {
    root: PathBuf,
}

impl WorkDirLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_dir(&self) -> PathBuf {
        self.root.join("src").join("config")
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.root.join("cache")
    }

    pub fn builds_dir(&self) -> PathBuf {
        self.root.join("builds")
    }

    pub fn latest_build(&self) -> PathBuf {
        self.builds_dir().join(LATEST_BUILD)
    }

    pub fn has_config(&self) -> bool {
        self.config_dir().is_dir()
    }

    /// 설정 체크아웃(+ `.git`)과 캐시 디렉터리가 모두 있으면 이전 init 결과로 본다.
    pub fn is_initialized(&self) -> bool {
        let config = self.config_dir();
        config.is_dir() && self.cache_dir().is_dir() && config.join(".git").exists()
    }

    /// 작업 디렉터리 최상위 항목. 디렉터리가 없으면 빈 목록.
    pub fn entries(&self) -> io::Result<Vec<PathBuf>> {
        match fs::read_dir(&self.root) {
            Ok(iter) => iter.map(|e| e.map(|e| e.path())).collect(),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(err),
        }
    }

    /// `builds/` 아래 빌드 디렉터리. `include_latest`가 false면 `latest`를 뺀다.
    pub fn build_dirs(&self, include_latest: bool) -> io::Result<Vec<PathBuf>> {
        let builds = self.builds_dir();
        if !builds.is_dir() {
            return Ok(Vec::new());
        }

        let mut dirs = Vec::new();
        for entry in fs::read_dir(&builds)? {
            let path = entry?.path();
            if !path.is_dir() {
                continue;
            }
            if !include_latest && path.file_name().is_some_and(|n| n == LATEST_BUILD) {
                continue;
            }
            dirs.push(path);
        }
        dirs.sort();
        Ok(dirs)
    }
}
