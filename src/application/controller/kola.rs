//! kola 테스트, VM 실행, cosa shell.

use anyhow::Result;

use super::SessionController;
use crate::domain::error::OpError;
use crate::domain::operation::{AssemblerCommand, ExecMode, ExternalOp, TestSelection};
use crate::domain::session::Session;

impl<'a> SessionController<'a> {
    /// 사용 가능한 kola 테스트 목록을 출력하고 원문을 돌려준다.
    pub async fn list_kola_tests(&self, session: &Session) -> Result<String> {
        self.require_built(session)?;
        self.reporter.status(
            "kola",
            &format!("listing kola tests for stream: {}", session.active_stream()),
        );

        let outcome = self
            .run_step(
                ExternalOp::assembler(AssemblerCommand::KolaList),
                ExecMode::Captured,
            )
            .await?;
        for line in outcome.stdout.lines() {
            self.reporter.raw(line);
        }
        Ok(outcome.stdout)
    }

    /// 패턴/추가 인자를 붙여 kola 테스트를 실행한다.
    pub async fn run_kola_tests(&self, session: &Session, selection: &TestSelection) -> Result<()> {
        self.require_built(session)?;
        let stream = session.active_stream();

        if selection.pattern.trim().is_empty() {
            self.reporter
                .status("kola", &format!("running all kola tests for stream: {stream}"));
        } else {
            self.reporter.status(
                "kola",
                &format!("running kola tests matching: {}", selection.pattern.trim()),
            );
        }
        if !selection.extra_args.trim().is_empty() {
            self.reporter
                .kv("Extra args", selection.extra_args.trim());
        }
        self.reporter
            .raw("this may take a while depending on the number of tests...");

        match self
            .run_step(
                ExternalOp::assembler(selection.to_command()),
                ExecMode::Interactive,
            )
            .await
        {
            Ok(_) => {
                self.reporter
                    .success(&format!("kola tests completed for stream: {stream}"));
                Ok(())
            }
            Err(err) => {
                self.reporter
                    .warn(&format!("some kola tests failed for stream: {stream}"));
                Err(err)
            }
        }
    }

    /// 테스트 목록을 보여 준 뒤 `select`가 돌려준 선택으로 실행한다.
    /// `select`가 `None`이면 취소.
    pub async fn run_interactive_test_selection<F>(
        &self,
        session: &Session,
        select: F,
    ) -> Result<()>
    where
        F: FnOnce() -> Result<Option<TestSelection>>,
    {
        self.require_built(session)?;
        self.reporter.section(&format!(
            "Interactive kola runner ({})",
            session.active_stream()
        ));
        self.list_kola_tests(session).await?;

        let Some(selection) = select()? else {
            return Err(OpError::Cancelled.into());
        };
        self.run_kola_tests(session, &selection).await
    }

    /// 빌드된 이미지를 QEMU로 띄운다.
    pub async fn run_image(&self, session: &Session, args: &[String]) -> Result<()> {
        let stream = session.active_stream();
        if !session.active_state().built {
            return Err(OpError::NoBuild {
                stream: stream.to_string(),
            }
            .into());
        }

        self.reporter
            .status("run", &format!("starting CoreOS VM (stream: {stream})"));
        self.reporter.raw("use Ctrl-a x to exit QEMU");
        self.run_step(
            ExternalOp::assembler(AssemblerCommand::Run {
                args: args.to_vec(),
            }),
            ExecMode::Interactive,
        )
        .await?;
        Ok(())
    }

    /// 컨테이너 안에서 cosa shell을 연다.
    pub async fn open_shell(&self) -> Result<()> {
        self.reporter.status("shell", "opening cosa shell");
        self.run_step(ExternalOp::assembler(AssemblerCommand::Shell), ExecMode::Interactive)
            .await?;
        Ok(())
    }
}
