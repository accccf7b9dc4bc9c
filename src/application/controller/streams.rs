//! 스트림(설정 브랜치) 전환과 목록.

use anyhow::Result;

use super::SessionController;
use crate::domain::error::OpError;
use crate::domain::layout::WorkDirLayout;
use crate::domain::operation::{ExecMode, ExternalOp, VcsOp};
use crate::domain::session::Session;
use crate::domain::stream::{default_streams, parse_remote_branches};

impl<'a> SessionController<'a> {
    /// 설정 체크아웃을 `name` 브랜치로 바꾼다.
    /// 로컬 브랜치 → origin 추적 브랜치 생성 → origin 직접(detached) 순으로 시도한다.
    pub async fn switch_stream(&self, session: &mut Session, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(OpError::MissingArgument("stream").into());
        }
        if !WorkDirLayout::new(&session.work_dir).has_config() {
            return Err(OpError::NotInitialized.into());
        }
        if session.current_stream() == Some(name) {
            self.reporter
                .status("switch", &format!("already on stream: {name}"));
            return Ok(());
        }

        self.reporter
            .status("switch", &format!("switching to stream: {name}"));
        self.run_step(ExternalOp::Vcs(VcsOp::FetchOrigin), ExecMode::Captured)
            .await?;

        let attempts = [
            VcsOp::Checkout(name.to_string()),
            VcsOp::CheckoutTracking(name.to_string()),
            VcsOp::CheckoutRemote(name.to_string()),
        ];
        let mut last_error = String::new();
        for op in attempts {
            let outcome = self.vcs(op).await?;
            if outcome.succeeded() {
                session.select_stream(name);
                self.reporter
                    .success(&format!("switched to stream: {name}"));
                return Ok(());
            }
            last_error = outcome.stderr.trim().to_string();
            tracing::debug!("checkout attempt failed: {last_error}");
        }

        if !last_error.is_empty() {
            self.reporter.raw(&format!("  {last_error}"));
        }
        let available = self.list_available_streams(session).await;
        Err(OpError::StreamNotFound {
            stream: name.to_string(),
            available,
        }
        .into())
    }

    /// 원격 브랜치 이름 목록. 설정 체크아웃이 없거나 조회에 실패하면 기본 목록.
    pub async fn list_available_streams(&self, session: &Session) -> Vec<String> {
        if !WorkDirLayout::new(&session.work_dir).has_config() {
            return default_streams();
        }

        match self.vcs(VcsOp::FetchOrigin).await {
            Ok(outcome) if !outcome.succeeded() => {
                tracing::debug!("git fetch origin failed: {}", outcome.stderr.trim());
            }
            Err(err) => tracing::warn!("git fetch origin failed: {err:#}"),
            Ok(_) => {}
        }

        match self.vcs(VcsOp::ListRemoteBranches).await {
            Ok(outcome) if outcome.succeeded() => parse_remote_branches(&outcome.stdout),
            Ok(outcome) => {
                tracing::warn!("git branch -r failed: {}", outcome.stderr.trim());
                default_streams()
            }
            Err(err) => {
                self.reporter
                    .warn(&format!("could not fetch branches: {err:#}"));
                default_streams()
            }
        }
    }

    /// 원격 브랜치를 다시 받아오고 목록을 보여 준다.
    pub async fn refresh_streams(&self, session: &Session) -> Result<Vec<String>> {
        if !WorkDirLayout::new(&session.work_dir).has_config() {
            return Err(OpError::NotInitialized.into());
        }

        self.reporter.status("refresh", "fetching all remote branches");
        self.run_step(ExternalOp::Vcs(VcsOp::FetchOrigin), ExecMode::Interactive)
            .await?;
        self.reporter.success("remote branches updated");
        self.show_streams(session).await
    }

    /// 스트림 목록과 각 스트림의 fetch/build 상태를 출력한다.
    pub async fn show_streams(&self, session: &Session) -> Result<Vec<String>> {
        if !session.initialized {
            let streams = default_streams();
            self.reporter.raw(&format!(
                "available streams (estimated): {}",
                streams.join(", ")
            ));
            self.reporter
                .raw("run 'init' first to get the actual list from the repository");
            return Ok(streams);
        }

        let streams = self.list_available_streams(session).await;
        self.reporter.section("Streams");
        for stream in &streams {
            let marker = if session.current_stream() == Some(stream.as_str()) {
                "->"
            } else {
                "  "
            };
            let state = session.stream_state(stream);
            let label = if state.fetched || state.built {
                state.label()
            } else {
                ""
            };
            self.reporter.raw(&format!("{marker} {stream:<16} {label}"));
        }
        if streams.len() <= 1 {
            self.reporter
                .raw("hint: only one stream? try 'refresh' to fetch all remote branches");
        }
        Ok(streams)
    }
}
