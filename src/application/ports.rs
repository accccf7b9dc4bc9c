//! 애플리케이션 계층이 의존하는 포트(추상 인터페이스) 모음.

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;

use crate::application::config::Config;
use crate::domain::disk::DiskUsage;
use crate::domain::operation::{ExecMode, ExternalOp, ProcessOutcome};

/// 설정 로딩/점검을 담당하는 저장소 포트.
pub trait ConfigRepository: Send + Sync {
    fn load(&self) -> Result<Config>;
    fn inspect_pretty_json(&self) -> Result<String>;
}

/// 외부 프로세스(podman/git) 실행 포트.
/// 실행 파일을 띄우지 못한 경우에만 `Err`, 나머지는 `ProcessOutcome`으로 돌려준다.
#[async_trait]
pub trait ProcessGateway: Send + Sync {
    async fn execute(&self, op: &ExternalOp, mode: ExecMode) -> Result<ProcessOutcome>;
}

/// 호스트 상태 조회 포트.
pub trait HostProbe: Send + Sync {
    fn disk_usage(&self, path: &Path) -> Result<DiskUsage>;
    fn virtualization_available(&self) -> bool;
}

/// 사용자 확인 입력 포트.
pub trait UserConfirmer: Send + Sync {
    fn confirm(&self, message: &str) -> Result<bool>;
}

/// 콘솔/로그 출력 추상화 포트.
pub trait Reporter: Send + Sync {
    fn section(&self, name: &str);
    fn kv(&self, key: &str, value: &str);
    fn status(&self, scope: &str, message: &str);
    fn success(&self, message: &str);
    fn warn(&self, message: &str);
    fn raw(&self, line: &str);
}
