//! cosapilot library root.
//! Clean Architecture + DDD 계층을 외부에 노출한다.

use std::io::{self, IsTerminal};

use anyhow::Result;

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interface;

use application::ports::UserConfirmer;
use infrastructure::adapters::{DenyConfirmer, StdinConfirmer};
use interface::cli::{AppComposition, RunOptions};

/// 비대화식 실행: 사전 점검 → 이미지 pull → init/switch/fetch/build.
/// stdin이 터미널이 아니면 확인 질문은 모두 거절로 처리한다.
pub async fn run_build(stream: &str, options: &RunOptions) -> Result<()> {
    let confirmer: Box<dyn UserConfirmer> = if io::stdin().is_terminal() {
        Box::new(StdinConfirmer)
    } else {
        Box::new(DenyConfirmer)
    };
    let app = AppComposition::with_confirmer(options, confirmer)?;
    let controller = app.controller();
    let mut session = app.new_session();

    controller.check_prerequisites().await?;
    controller.pull_container(&session).await?;
    controller.build_stream_workflow(&mut session, stream).await
}

/// 설정 점검 JSON 출력용 함수.
pub fn inspect_config_pretty_json() -> Result<String> {
    AppComposition::inspect_config()
}
