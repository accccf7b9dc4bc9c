//! 세션 컨트롤러.
//! 세션 값을 명시적으로 받아 각 작업을 외부 프로세스 호출로 풀어낸다.

mod build;
mod clean;
mod init;
mod kola;
mod report;
mod streams;

#[cfg(test)]
mod tests;

use anyhow::Result;

use crate::application::ports::{HostProbe, ProcessGateway, Reporter, UserConfirmer};
use crate::domain::disk::{DiskLevel, LowSpacePolicy, to_gib};
use crate::domain::error::OpError;
use crate::domain::operation::{ExecMode, ExitState, ExternalOp, ProcessOutcome, VcsOp};
use crate::domain::session::Session;

pub use init::InitOutcome;
pub use report::{DiskReport, StatusReport, TestSummary};

/// 모든 상위 작업(init/switch/fetch/build/kola/clean/status)의 진입점.
pub struct SessionController<'a> {
    pub gateway: &'a dyn ProcessGateway,
    pub host: &'a dyn HostProbe,
    pub reporter: &'a dyn Reporter,
    pub confirmer: &'a dyn UserConfirmer,
    /// 여유 공간이 임계 수준일 때의 처리 방식
    pub low_space_policy: LowSpacePolicy,
}

impl<'a> SessionController<'a> {
    /// 외부 작업을 실행하고 성공이 아니면 `OpError`로 바꾼다.
    async fn run_step(&self, op: ExternalOp, mode: ExecMode) -> Result<ProcessOutcome> {
        let outcome = self.gateway.execute(&op, mode).await?;
        match outcome.exit {
            ExitState::Success => Ok(outcome),
            ExitState::Interrupted => Err(OpError::Interrupted {
                command: op.describe(),
            }
            .into()),
            ExitState::Failed(_) => Err(OpError::CommandFailed {
                command: op.describe(),
                detail: failure_detail(&outcome),
            }
            .into()),
        }
    }

    /// 설정 체크아웃 대상 git 명령. 종료 코드는 호출자가 해석한다.
    async fn vcs(&self, op: VcsOp) -> Result<ProcessOutcome> {
        self.gateway.execute(&ExternalOp::Vcs(op), ExecMode::Captured).await
    }

    fn require_initialized(&self, session: &Session) -> Result<()> {
        if !session.initialized {
            return Err(OpError::NotInitialized.into());
        }
        Ok(())
    }

    fn require_built(&self, session: &Session) -> Result<()> {
        self.require_initialized(session)?;
        if !session.active_state().built {
            return Err(OpError::NoBuild {
                stream: session.active_stream().to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// fetch/build 전에 여유 공간을 확인한다.
    /// 조회 실패는 경고만 남기고 통과시킨다.
    fn ensure_disk_space(&self, session: &Session) -> Result<()> {
        let report = match self.check_disk_space(session) {
            Ok(report) => report,
            Err(err) => {
                self.reporter
                    .warn(&format!("could not check disk space: {err:#}"));
                return Ok(());
            }
        };

        match report.level {
            DiskLevel::Sufficient => Ok(()),
            DiskLevel::Low => {
                self.reporter
                    .warn("low disk space; CoreOS builds need 10-20 GB");
                // Low는 확인 후 진행한다. Ask 이외의 정책은 막지 않는다.
                if self.low_space_policy == LowSpacePolicy::Ask {
                    let free_gib = to_gib(report.usage.free);
                    if !self.confirmer.confirm(&format!(
                        "low disk space ({free_gib:.1} GB free); continue anyway?"
                    ))? {
                        return Err(OpError::InsufficientDiskSpace { free_gib }.into());
                    }
                }
                Ok(())
            }
            DiskLevel::Critical => {
                let free_gib = to_gib(report.usage.free);
                let proceed = match self.low_space_policy {
                    LowSpacePolicy::Proceed => true,
                    LowSpacePolicy::Abort => false,
                    LowSpacePolicy::Ask => self.confirmer.confirm(&format!(
                        "critically low disk space ({free_gib:.1} GB free); the build will likely fail"
                    ))?,
                };
                if !proceed {
                    return Err(OpError::InsufficientDiskSpace { free_gib }.into());
                }
                self.reporter
                    .warn("continuing despite critically low disk space");
                Ok(())
            }
        }
    }
}

fn failure_detail(outcome: &ProcessOutcome) -> String {
    let stderr = outcome.stderr.trim();
    if stderr.is_empty() {
        outcome.exit.to_string()
    } else {
        format!("{} ({})", stderr, outcome.exit)
    }
}
