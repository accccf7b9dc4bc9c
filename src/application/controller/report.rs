//! 읽기 전용 상태 보고(status, test-summary, disk).

use std::collections::BTreeMap;

use anyhow::Result;
use serde::Serialize;

use super::SessionController;
use crate::domain::disk::{DiskLevel, DiskUsage, to_gib};
use crate::domain::layout::WorkDirLayout;
use crate::domain::session::{Session, StreamState};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DiskReport {
    pub usage: DiskUsage,
    pub level: DiskLevel,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub work_dir: String,
    pub initialized: bool,
    pub current_stream: Option<String>,
    pub streams: BTreeMap<String, StreamState>,
    pub config_present: bool,
    pub builds_present: bool,
    pub build_count: usize,
    pub latest_present: bool,
    pub disk: Option<DiskReport>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TestSummary {
    pub initialized: bool,
    pub ready: Vec<String>,
    pub fetched_only: Vec<String>,
    pub not_ready: Vec<String>,
}

impl<'a> SessionController<'a> {
    /// 작업 디렉터리가 있는 파일시스템의 사용량을 조회하고 출력한다.
    pub fn check_disk_space(&self, session: &Session) -> Result<DiskReport> {
        let usage = self.host.disk_usage(&session.work_dir)?;
        let report = DiskReport {
            usage,
            level: usage.level(),
        };

        self.reporter.section("Disk Space");
        self.reporter
            .kv("Work dir", &session.work_dir.display().to_string());
        self.reporter
            .kv("Total", &format!("{:.1} GB", to_gib(usage.total)));
        self.reporter
            .kv("Used", &format!("{:.1} GB", to_gib(usage.used)));
        self.reporter.kv(
            "Free",
            &format!("{:.1} GB ({:.1}%)", to_gib(usage.free), usage.free_percent()),
        );
        match report.level {
            DiskLevel::Sufficient => self.reporter.success("sufficient space available"),
            DiskLevel::Low => self
                .reporter
                .warn("low disk space; CoreOS builds need 10-20 GB"),
            DiskLevel::Critical => self
                .reporter
                .warn("critically low disk space; the build will likely fail"),
        }
        Ok(report)
    }

    /// 세션 상태와 디렉터리 상태를 모아 출력한다.
    pub fn status(&self, session: &Session) -> StatusReport {
        let layout = WorkDirLayout::new(&session.work_dir);
        let build_count = layout.build_dirs(false).map(|d| d.len()).unwrap_or(0);
        let disk = match self.host.disk_usage(&session.work_dir) {
            Ok(usage) => Some(DiskReport {
                usage,
                level: usage.level(),
            }),
            Err(err) => {
                tracing::debug!("disk usage unavailable: {err:#}");
                None
            }
        };

        let report = StatusReport {
            work_dir: session.work_dir.display().to_string(),
            initialized: session.initialized,
            current_stream: session.current_stream().map(str::to_string),
            streams: session.streams().clone(),
            config_present: layout.has_config(),
            builds_present: layout.builds_dir().is_dir(),
            build_count,
            latest_present: layout.latest_build().exists(),
            disk,
        };

        self.reporter.section("Build Status");
        self.reporter.kv("Work dir", &report.work_dir);
        self.reporter
            .kv("Initialized", if report.initialized { "yes" } else { "no" });
        self.reporter.kv(
            "Stream",
            report.current_stream.as_deref().unwrap_or("none"),
        );
        for (stream, state) in &report.streams {
            self.reporter.raw(&format!(
                "  {stream:<16} fetched: {:<3} built: {}",
                yes_no(state.fetched),
                yes_no(state.built)
            ));
        }
        if report.config_present {
            self.reporter.kv("Config repo", "present");
        }
        if report.builds_present {
            self.reporter
                .kv("Builds", &report.build_count.to_string());
            if report.latest_present {
                self.reporter.kv("Latest", "available");
            }
        }
        if let Some(disk) = &report.disk {
            self.reporter.kv(
                "Disk free",
                &format!(
                    "{:.1} GB of {:.1} GB",
                    to_gib(disk.usage.free),
                    to_gib(disk.usage.total)
                ),
            );
        }
        report
    }

    /// 스트림별 테스트 준비 상태를 요약한다.
    pub fn test_summary(&self, session: &Session) -> TestSummary {
        let mut summary = TestSummary {
            initialized: session.initialized,
            ..TestSummary::default()
        };

        self.reporter.section("Kola Testing Summary");
        if !session.initialized {
            self.reporter.warn("cosa not initialized");
            return summary;
        }

        for (stream, state) in session.streams() {
            if state.built {
                self.reporter
                    .raw(&format!("  {stream}: build available, ready for testing"));
                summary.ready.push(stream.clone());
            } else if state.fetched {
                self.reporter
                    .raw(&format!("  {stream}: fetched only, build first"));
                summary.fetched_only.push(stream.clone());
            } else {
                self.reporter.raw(&format!("  {stream}: not ready"));
                summary.not_ready.push(stream.clone());
            }
        }

        if summary.ready.is_empty() {
            self.reporter
                .raw("no builds available for testing; build an image first");
        } else {
            self.reporter.success(&format!(
                "{} stream(s) ready for testing; use 'kola list' to see tests",
                summary.ready.len()
            ));
        }
        summary
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
