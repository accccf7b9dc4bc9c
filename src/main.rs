//! `cosapilot` 바이너리 진입점.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cosapilot::domain::error::OpError;
use cosapilot::interface::cli::{AppComposition, Cli, CliAction, run_repl};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // 인자 오류는 clap이 종료 코드 2로 처리한다.
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into())
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let result = match cli.into_action() {
        CliAction::InspectConfig => {
            cosapilot::inspect_config_pretty_json().map(|json| println!("{json}"))
        }
        CliAction::OneShot { stream, options } => cosapilot::run_build(&stream, &options).await,
        CliAction::Interactive(options) => match AppComposition::load(&options) {
            Ok(app) => run_repl(&app).await,
            Err(err) => Err(err),
        },
    };

    if let Err(err) = result {
        eprintln!("error: {err:#}");
        if let Some(hint) = err.downcast_ref::<OpError>().and_then(OpError::hint) {
            eprintln!("hint: {hint}");
        }
        std::process::exit(1);
    }
}
