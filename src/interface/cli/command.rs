//! CLI 명령 파싱 모듈.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::application::config::Config;
use crate::domain::disk::LowSpacePolicy;

#[derive(Debug, Parser)]
#[command(name = "cosapilot", version)]
#[command(about = "Interactive driver for CoreOS Assembler (cosa) builds")]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Working directory for cosa (created if missing)
    #[arg(long, value_name = "DIR")]
    work_dir: Option<PathBuf>,

    /// Run init, switch, fetch and build for STREAM non-interactively, then exit
    #[arg(long, value_name = "STREAM")]
    build: Option<String>,

    /// Configuration repository passed to `cosa init`
    #[arg(long, value_name = "URL")]
    config_repo: Option<String>,

    /// coreos-assembler container image
    #[arg(long, value_name = "IMAGE")]
    image: Option<String>,

    /// Proceed even when disk space is critically low
    #[arg(long)]
    ignore_disk_space: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show effective merged config and tool availability
    Config,
}

/// 설정 파일 위에 덮어쓸 CLI 인자.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOptions {
    pub work_dir: Option<PathBuf>,
    pub config_repo: Option<String>,
    pub image: Option<String>,
    pub ignore_disk_space: bool,
}

impl RunOptions {
    /// CLI 인자가 설정 파일보다 우선한다.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(dir) = &self.work_dir {
            config.defaults.work_dir = Some(dir.display().to_string());
        }
        if let Some(repo) = &self.config_repo {
            config.defaults.config_repo = Some(repo.clone());
        }
        if let Some(image) = &self.image {
            config.defaults.container_image = Some(image.clone());
        }
        if self.ignore_disk_space {
            config.defaults.low_space_policy = Some(LowSpacePolicy::Proceed);
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum CliAction {
    Interactive(RunOptions),
    OneShot { stream: String, options: RunOptions },
    InspectConfig,
}

impl Cli {
    pub fn into_action(self) -> CliAction {
        if let Some(Commands::Config) = self.command {
            return CliAction::InspectConfig;
        }

        let options = RunOptions {
            work_dir: self.work_dir,
            config_repo: self.config_repo,
            image: self.image,
            ignore_disk_space: self.ignore_disk_space,
        };
        match self.build {
            Some(stream) => CliAction::OneShot { stream, options },
            None => CliAction::Interactive(options),
        }
    }
}
