//! fetch/build와 스트림 자동 빌드 워크플로.

use anyhow::Result;

use super::SessionController;
use crate::domain::layout::WorkDirLayout;
use crate::domain::operation::{AssemblerCommand, ExecMode, ExternalOp};
use crate::domain::session::Session;

impl<'a> SessionController<'a> {
    /// 현재(또는 지정한) 스트림의 메타데이터와 패키지를 받는다.
    pub async fn fetch(&self, session: &mut Session, stream: Option<&str>) -> Result<()> {
        self.prepare(session, stream).await?;
        self.fetch_active(session).await
    }

    /// 현재(또는 지정한) 스트림 이미지를 빌드한다.
    /// fetch 기록이 없으면 fetch를 먼저 실행한다.
    pub async fn build(&self, session: &mut Session, stream: Option<&str>) -> Result<()> {
        self.prepare(session, stream).await?;
        self.build_active(session).await
    }

    /// init(필요 시) → switch → fetch → build. 첫 실패에서 멈춘다.
    pub async fn build_stream_workflow(&self, session: &mut Session, stream: &str) -> Result<()> {
        self.reporter.section(&format!("Build {stream}"));

        if !session.initialized {
            self.initialize(session, None, false).await?;
        }
        self.switch_stream(session, stream).await?;
        self.ensure_disk_space(session)?;
        self.fetch_active(session).await?;
        self.build_active(session).await?;

        self.reporter
            .success(&format!("successfully built Fedora CoreOS {stream}"));
        self.reporter.raw("you can now:");
        self.reporter.raw("  run               start the VM");
        self.reporter.raw("  kola list         see available tests");
        self.reporter.raw("  run basic test    run basic tests");
        self.reporter.raw("  kola interactive  pick tests interactively");
        Ok(())
    }

    async fn prepare(&self, session: &mut Session, stream: Option<&str>) -> Result<()> {
        self.require_initialized(session)?;
        self.ensure_disk_space(session)?;
        if let Some(stream) = stream
            && session.current_stream() != Some(stream)
        {
            self.switch_stream(session, stream).await?;
        }
        Ok(())
    }

    async fn fetch_active(&self, session: &mut Session) -> Result<()> {
        let stream = session.active_stream().to_string();
        self.reporter.status(
            "fetch",
            &format!("fetching metadata and packages for stream: {stream}"),
        );

        self.run_step(ExternalOp::assembler(AssemblerCommand::Fetch), ExecMode::Interactive)
            .await?;
        session.mark_fetched();
        self.reporter
            .success(&format!("fetch completed for stream: {stream}"));
        Ok(())
    }

    async fn build_active(&self, session: &mut Session) -> Result<()> {
        let stream = session.active_stream().to_string();
        if !session.active_state().fetched {
            self.reporter.warn(&format!(
                "stream '{stream}' not fetched yet; running fetch first"
            ));
            self.fetch_active(session).await?;
        }

        self.reporter
            .status("build", &format!("building CoreOS image for stream: {stream}"));
        self.reporter.raw("this may take a while...");
        self.run_step(ExternalOp::assembler(AssemblerCommand::Build), ExecMode::Interactive)
            .await?;
        session.mark_built();
        self.reporter
            .success(&format!("build completed for stream: {stream}"));

        let latest = WorkDirLayout::new(&session.work_dir).latest_build();
        if latest.exists() {
            self.reporter
                .kv("Latest", &latest.display().to_string());
        }
        Ok(())
    }
}
