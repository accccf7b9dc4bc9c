//! 빌드 산출물, 컨테이너, 작업 디렉터리 정리.

use std::fs;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};

use super::SessionController;
use crate::domain::error::OpError;
use crate::domain::layout::WorkDirLayout;
use crate::domain::operation::{ContainerOp, ExecMode, ExternalOp};
use crate::domain::session::Session;

impl<'a> SessionController<'a> {
    /// `builds/` 아래에서 `latest`를 제외한 빌드 디렉터리를 지운다.
    pub fn clean_builds(&self, session: &Session) -> Result<usize> {
        let layout = WorkDirLayout::new(&session.work_dir);
        if !layout.builds_dir().is_dir() {
            self.reporter
                .status("clean", "no builds directory found; nothing to clean");
            return Ok(0);
        }

        let dirs = layout
            .build_dirs(false)
            .context("failed to list build directories")?;
        if dirs.is_empty() {
            self.reporter.status("clean", "no old builds to clean");
            return Ok(0);
        }

        self.reporter
            .status("clean", &format!("cleaning {} old build(s)", dirs.len()));
        for dir in &dirs {
            self.reporter.raw(&format!("  removing {}", display_name(dir)));
            remove_entry(dir).with_context(|| format!("failed to remove {}", dir.display()))?;
        }
        self.reporter.success("build cleanup completed");
        Ok(dirs.len())
    }

    /// 사용하지 않는 컨테이너와 이미지를 정리한다. 실패는 경고로만 남긴다.
    pub async fn clean_containers(&self) -> Result<()> {
        self.reporter
            .status("clean", "cleaning unused containers and images");

        let steps = [
            (ContainerOp::PruneContainers, "stopped containers"),
            (ContainerOp::PruneImages, "unused images"),
        ];
        for (op, what) in steps {
            match self
                .run_step(ExternalOp::Container(op), ExecMode::Captured)
                .await
            {
                Ok(_) => self.reporter.success(&format!("cleaned {what}")),
                Err(err) => self
                    .reporter
                    .warn(&format!("could not clean {what}: {err:#}")),
            }
        }
        Ok(())
    }

    /// 작업 디렉터리의 모든 항목을 지우고 세션을 초기 상태로 되돌린다.
    /// `confirmed`가 false면 아무것도 건드리지 않는다.
    pub fn clean_working_directory(&self, session: &mut Session, confirmed: bool) -> Result<usize> {
        let layout = WorkDirLayout::new(&session.work_dir);
        let entries = layout
            .entries()
            .with_context(|| format!("failed to read {}", layout.root().display()))?;

        if !confirmed {
            return Err(OpError::Cancelled.into());
        }
        if entries.is_empty() {
            self.reporter.status("clean", "directory is already empty");
            return Ok(0);
        }

        self.reporter.status(
            "clean",
            &format!("cleaning working directory ({} items)", entries.len()),
        );
        for entry in &entries {
            self.reporter.raw(&format!("  removing {}", display_name(entry)));
            remove_entry(entry)
                .with_context(|| format!("failed to remove {}", entry.display()))?;
        }

        session.reset();
        self.reporter.success("directory cleaned");
        Ok(entries.len())
    }
}

/// 심볼릭 링크는 따라가지 않고 링크 자체만 지운다.
fn remove_entry(path: &Path) -> io::Result<()> {
    if fs::symlink_metadata(path)?.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
