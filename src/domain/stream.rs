//! 스트림(설정 브랜치) 목록 규칙.

/// 설정 저장소가 아직 없을 때 보여 주는 기본 스트림 목록.
pub const DEFAULT_STREAMS: [&str; 5] = ["testing-devel", "stable", "testing", "next", "rawhide"];

pub fn default_streams() -> Vec<String> {
    DEFAULT_STREAMS.iter().map(|s| s.to_string()).collect()
}

/// `git branch -r` 출력에서 원격 브랜치 이름만 뽑는다.
/// `origin/` 접두어를 떼고 심볼릭 `HEAD -> ...` 줄은 버린다.
pub fn parse_remote_branches(output: &str) -> Vec<String> {
    output
        .lines()
        .filter(|line| line.contains("origin/") && !line.contains("->"))
        .map(|line| line.trim().replace("origin/", ""))
        .filter(|branch| !branch.is_empty() && branch != "HEAD")
        .collect()
}
