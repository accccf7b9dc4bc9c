//! 사전 점검, 컨테이너 이미지 pull, cosa init.

use anyhow::{Context, Result};

use super::SessionController;
use crate::domain::error::OpError;
use crate::domain::layout::WorkDirLayout;
use crate::domain::operation::{AssemblerCommand, ContainerOp, ExecMode, ExternalOp, VcsOp};
use crate::domain::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// 기존 init 결과를 그대로 채택했다.
    AlreadyInitialized,
    Initialized,
}

impl<'a> SessionController<'a> {
    /// podman/git 실행 가능 여부를 확인하고 /dev/kvm 부재는 경고만 한다.
    pub async fn check_prerequisites(&self) -> Result<()> {
        let checks = [
            ("podman", ExternalOp::Container(ContainerOp::Version)),
            ("git", ExternalOp::Vcs(VcsOp::Version)),
        ];

        for (tool, op) in checks {
            let available = match self.gateway.execute(&op, ExecMode::Captured).await {
                Ok(outcome) => outcome.succeeded(),
                Err(err) => {
                    tracing::debug!("{tool} probe failed: {err:#}");
                    false
                }
            };
            if !available {
                return Err(OpError::MissingTool {
                    tool: tool.to_string(),
                }
                .into());
            }
        }

        if !self.host.virtualization_available() {
            self.reporter
                .warn("/dev/kvm not found; virtualization may not work properly");
            self.reporter
                .raw("  make sure KVM is enabled or run on bare metal");
        }

        self.reporter.success("prerequisites check passed");
        Ok(())
    }

    /// cosa 컨테이너 이미지를 받는다.
    pub async fn pull_container(&self, session: &Session) -> Result<()> {
        self.reporter
            .status("pull", &format!("pulling {}", session.container_image));
        self.run_step(ExternalOp::Container(ContainerOp::Pull), ExecMode::Interactive)
            .await?;
        self.reporter.success("container pulled");
        Ok(())
    }

    /// 작업 디렉터리에 cosa를 초기화한다.
    /// 이미 초기화된 디렉터리는 cosa를 호출하지 않고 채택한다.
    pub async fn initialize(
        &self,
        session: &mut Session,
        repo: Option<&str>,
        force: bool,
    ) -> Result<InitOutcome> {
        let layout = WorkDirLayout::new(&session.work_dir);

        if layout.is_initialized() {
            session.initialized = true;
            self.reporter.status("init", "cosa already initialized");
            self.detect_current_stream(session).await;
            return Ok(InitOutcome::AlreadyInitialized);
        }

        let entries = layout
            .entries()
            .with_context(|| format!("failed to read {}", layout.root().display()))?
            .len();
        if entries > 0 && !force {
            return Err(OpError::DirectoryNotEmpty { entries }.into());
        }

        let repo = repo
            .map(str::to_string)
            .unwrap_or_else(|| session.config_repo.clone());
        let verb = if force { "force initializing" } else { "initializing" };
        self.reporter
            .status("init", &format!("{verb} cosa with config repo: {repo}"));

        self.run_step(
            ExternalOp::assembler(AssemblerCommand::Init { repo, force }),
            ExecMode::Interactive,
        )
        .await?;

        session.initialized = true;
        self.reporter.success("cosa initialized");
        if layout.has_config() {
            self.reporter
                .kv("Config", &layout.config_dir().display().to_string());
        }
        self.detect_current_stream(session).await;
        Ok(InitOutcome::Initialized)
    }

    /// 설정 체크아웃의 현재 브랜치를 현재 스트림으로 기록한다.
    pub(super) async fn detect_current_stream(&self, session: &mut Session) {
        if !WorkDirLayout::new(&session.work_dir).has_config() {
            return;
        }

        match self.vcs(VcsOp::ShowCurrentBranch).await {
            Ok(outcome) if outcome.succeeded() => {
                let branch = outcome.stdout.trim();
                if !branch.is_empty() {
                    session.select_stream(branch);
                    self.reporter.kv("Stream", branch);
                }
            }
            Ok(outcome) => {
                tracing::debug!("could not detect current branch: {}", outcome.exit);
            }
            Err(err) => {
                tracing::warn!("could not detect current branch: {err:#}");
            }
        }
    }
}
