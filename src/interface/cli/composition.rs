//! 애플리케이션 조립(composition root) 모듈.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::config::Config;
use crate::application::controller::SessionController;
use crate::application::ports::{ConfigRepository, UserConfirmer};
use crate::domain::session::Session;
use crate::infrastructure::adapters::{
    ConsoleReporter, JsonConfigRepository, NixHostProbe, StdinConfirmer,
};
use crate::infrastructure::process::{CommandGateway, ToolSet};
use crate::interface::cli::command::RunOptions;

/// 실행 시점 의존성을 한 곳에서 조립하는 컨테이너.
pub struct AppComposition {
    config: Config,
    work_dir: PathBuf,
    gateway: CommandGateway,
    host: NixHostProbe,
    reporter: ConsoleReporter,
    confirmer: Box<dyn UserConfirmer>,
}

impl AppComposition {
    /// 설정 파일을 읽고 CLI 인자를 덮어써 실행 조합을 만든다. 대화형 확인은 stdin으로 받는다.
    pub fn load(options: &RunOptions) -> Result<Self> {
        Self::with_confirmer(options, Box::new(StdinConfirmer))
    }

    /// 확인 어댑터를 외부에서 주입한다.
    pub fn with_confirmer(options: &RunOptions, confirmer: Box<dyn UserConfirmer>) -> Result<Self> {
        let mut config = JsonConfigRepository.load()?;
        options.apply_to(&mut config);
        Self::from_config(config, confirmer)
    }

    /// 작업 디렉터리를 만들고 절대 경로로 고정한다(컨테이너 마운트 경로로 쓰임).
    pub fn from_config(config: Config, confirmer: Box<dyn UserConfirmer>) -> Result<Self> {
        let requested = PathBuf::from(config.work_dir());
        fs::create_dir_all(&requested)
            .with_context(|| format!("failed to create work dir {}", requested.display()))?;
        let work_dir = requested
            .canonicalize()
            .with_context(|| format!("failed to resolve work dir {}", requested.display()))?;
        tracing::debug!(work_dir = %work_dir.display(), "work dir ready");

        let gateway = CommandGateway::new(ToolSet {
            container_runtime: config.container_runtime(),
            vcs: config.vcs_command(),
            image: config.container_image(),
            work_dir: work_dir.clone(),
        });

        Ok(Self {
            config,
            work_dir,
            gateway,
            host: NixHostProbe,
            reporter: ConsoleReporter::new(),
            confirmer,
        })
    }

    /// 병합된 설정 진단 JSON.
    pub fn inspect_config() -> Result<String> {
        JsonConfigRepository.inspect_pretty_json()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// 새 세션을 만든다. 상태는 메모리에만 존재한다.
    pub fn new_session(&self) -> Session {
        Session::new(
            self.work_dir.clone(),
            self.config.container_image(),
            self.config.config_repo(),
        )
    }

    pub fn controller(&self) -> SessionController<'_> {
        SessionController {
            gateway: &self.gateway,
            host: &self.host,
            reporter: &self.reporter,
            confirmer: self.confirmer.as_ref(),
            low_space_policy: self.config.low_space_policy(),
        }
    }
}
