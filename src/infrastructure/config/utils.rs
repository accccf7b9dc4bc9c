//! 설정 모듈 공용 유틸리티.

use std::env;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

/// 로컬 명령(podman/git 등)이 실행 가능한지 탐지한다.
pub fn command_exists(command: &str) -> bool {
    if command.trim().is_empty() {
        return false;
    }

    // 절대/상대 경로가 주어지면 해당 파일만 검사한다.
    let command_path = Path::new(command);
    if command_path.components().count() > 1 {
        return is_executable(command_path);
    }

    let Some(path_var) = env::var_os("PATH") else {
        return false;
    };

    env::split_paths(&path_var).any(|dir| is_executable(&dir.join(command)))
}

fn is_executable(path: &Path) -> bool {
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}
