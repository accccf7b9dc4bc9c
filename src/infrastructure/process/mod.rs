//! podman/git 실행 공통 모듈.
//! 논리 작업을 argv로 바꾸고 자식 프로세스를 띄워 결과를 표준화한다.

mod argv;
mod runner;

use std::io::{self, IsTerminal};

use anyhow::Result;
use async_trait::async_trait;

use crate::application::ports::ProcessGateway;
use crate::domain::operation::{ExecMode, ExternalOp, ProcessOutcome};

pub use argv::{Invocation, ToolSet, build_invocation};
pub use runner::run_invocation;

/// 실제 프로세스를 띄우는 게이트웨이 어댑터.
pub struct CommandGateway {
    tools: ToolSet,
}

impl CommandGateway {
    pub fn new(tools: ToolSet) -> Self {
        Self { tools }
    }
}

#[async_trait]
impl ProcessGateway for CommandGateway {
    async fn execute(&self, op: &ExternalOp, mode: ExecMode) -> Result<ProcessOutcome> {
        let tty = io::stdin().is_terminal();
        let invocation = build_invocation(&self.tools, op, mode, tty);
        tracing::debug!(?mode, command = %invocation, "executing");

        let outcome = run_invocation(&invocation, mode).await?;
        tracing::debug!(exit = %outcome.exit, "finished {}", op.describe());
        Ok(outcome)
    }
}
