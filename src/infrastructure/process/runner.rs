//! 외부 명령 실행기.

use std::os::unix::process::ExitStatusExt;
use std::process::{ExitStatus, Output, Stdio};

use anyhow::{Context, Result};
use nix::sys::signal::Signal;
use tokio::process::Command;

use super::argv::Invocation;
use crate::domain::operation::{ExecMode, ExitState, ProcessOutcome};

/// 명령을 실행하고 종료를 기다린다.
/// 실행 중 Ctrl-C가 들어오면 자식이 끝나기를 기다린 뒤 `Interrupted`로 돌려준다.
pub async fn run_invocation(invocation: &Invocation, mode: ExecMode) -> Result<ProcessOutcome> {
    let mut cmd = Command::new(&invocation.program);
    cmd.args(&invocation.args);
    match mode {
        ExecMode::Interactive => {
            cmd.stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit());
        }
        ExecMode::Captured => {
            cmd.stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped());
        }
    }

    let child = cmd
        .spawn()
        .with_context(|| format!("failed to spawn '{}'", invocation.program))?;

    let wait = child.wait_with_output();
    tokio::pin!(wait);

    let finished = tokio::select! {
        output = &mut wait => Some(output),
        Ok(()) = tokio::signal::ctrl_c() => None,
    };
    let (output, interrupted) = match finished {
        Some(output) => (output, false),
        // 같은 프로세스 그룹의 자식도 SIGINT를 받으므로 정리될 때까지 기다린다.
        None => (wait.await, true),
    };
    let output =
        output.with_context(|| format!("failed to wait for '{}'", invocation.program))?;

    Ok(outcome_from(output, interrupted))
}

fn outcome_from(output: Output, interrupted: bool) -> ProcessOutcome {
    ProcessOutcome {
        exit: exit_state(output.status, interrupted),
        stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    }
}

fn exit_state(status: ExitStatus, interrupted: bool) -> ExitState {
    if interrupted || status.signal() == Some(Signal::SIGINT as i32) {
        return ExitState::Interrupted;
    }
    if status.success() {
        ExitState::Success
    } else {
        ExitState::Failed(status.code())
    }
}
