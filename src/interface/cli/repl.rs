//! `cosapilot` 대화형 쉘(REPL) 인터페이스.

use std::io::{self, IsTerminal, Write};

use anyhow::Result;

use crate::application::controller::{InitOutcome, SessionController};
use crate::domain::command::{Action, ParsedCommand, known_verbs, parse_command};
use crate::domain::error::OpError;
use crate::domain::layout::WorkDirLayout;
use crate::domain::operation::TestSelection;
use crate::domain::session::Session;
use crate::infrastructure::adapters::paint;
use crate::interface::cli::composition::AppComposition;
use crate::interface::cli::repl_input::{LineEditor, prompt_line};

/// 대화형 입력을 받아 종료 명령이나 EOF까지 처리한다.
pub async fn run_repl(app: &AppComposition) -> Result<()> {
    let controller = app.controller();
    let mut session = app.new_session();

    // 대화형 모드에서는 도구가 없어도 알리고 계속한다(help/status 등은 쓸 수 있다).
    if let Err(err) = controller.check_prerequisites().await {
        report_error(&err);
    }
    if WorkDirLayout::new(&session.work_dir).is_initialized() {
        // 이전 실행에서 만든 init 결과를 cosa 호출 없이 채택한다.
        controller.initialize(&mut session, None, false).await?;
    }

    print_welcome(app, &session);
    io::stdout().flush()?;
    let mut editor = LineEditor::new();

    loop {
        let prompt = format!(
            "cosapilot ({})> ",
            session.current_stream().unwrap_or("none")
        );
        let Some(line) = editor.read_line(&prompt)? else {
            println!();
            break;
        };
        let Some(command) = parse_command(&line) else {
            continue;
        };
        if command.action == Action::Quit {
            break;
        }

        if let Err(err) = execute_command(&controller, &mut session, &command).await {
            report_error(&err);
        }
    }

    println!("goodbye");
    Ok(())
}

async fn execute_command(
    controller: &SessionController<'_>,
    session: &mut Session,
    command: &ParsedCommand,
) -> Result<()> {
    let first_arg = command.args.first().map(String::as_str);

    match command.action {
        Action::Init | Action::ForceInit => {
            let force = command.action == Action::ForceInit;
            if controller.initialize(session, first_arg, force).await? == InitOutcome::Initialized {
                println!("next: 'build <stream>' or 'streams' to list streams");
            }
        }
        Action::Fetch => controller.fetch(session, first_arg).await?,
        Action::Build => controller.build(session, first_arg).await?,
        Action::BuildStream => {
            let stream = first_arg.ok_or(OpError::MissingArgument("stream"))?;
            controller.build_stream_workflow(session, stream).await?;
        }
        Action::Status => {
            controller.status(session);
        }
        Action::Help => print_help(),
        Action::Quit => {}
        Action::Pull => controller.pull_container(session).await?,
        Action::Shell => controller.open_shell().await?,
        Action::Disk => {
            controller.check_disk_space(session)?;
        }
        Action::Clean => {
            controller.clean_builds(session)?;
        }
        Action::CleanAll => {
            controller.clean_builds(session)?;
            controller.clean_containers().await?;
        }
        Action::CleanDir => {
            let entries = WorkDirLayout::new(&session.work_dir).entries()?.len();
            let confirmed = entries == 0
                || controller.confirmer.confirm(&format!(
                    "this will delete ALL {entries} item(s) in {}",
                    session.work_dir.display()
                ))?;
            controller.clean_working_directory(session, confirmed)?;
        }
        Action::Switch => match first_arg {
            Some(stream) => controller.switch_stream(session, stream).await?,
            None => {
                controller.show_streams(session).await?;
                println!("usage: switch <stream>");
            }
        },
        Action::ListStreams => {
            controller.show_streams(session).await?;
        }
        Action::Refresh => {
            controller.refresh_streams(session).await?;
        }
        Action::CurrentStream => match session.current_stream() {
            Some(stream) => {
                let state = session.stream_state(stream);
                println!("current stream: {stream} ({})", state.label());
            }
            None => println!("no stream selected; use 'switch <stream>' or 'build <stream>'"),
        },
        Action::TestSummary => {
            controller.test_summary(session);
        }
        Action::KolaHelp => print_kola_help(),
        Action::KolaList => {
            controller.list_kola_tests(session).await?;
        }
        Action::KolaRun if command.args.is_empty() => run_kola_chooser(controller, session).await?,
        Action::KolaRun => {
            let selection = TestSelection::new(command.args.join(" "), "");
            controller.run_kola_tests(session, &selection).await?;
        }
        Action::KolaInteractive => {
            controller
                .run_interactive_test_selection(session, prompt_test_selection)
                .await?;
        }
        Action::RunImage => controller.run_image(session, &command.args).await?,
        Action::Unrecognized => {
            println!("unknown command: {}", command.verb);
            let similar = similar_verbs(&command.verb);
            if !similar.is_empty() {
                println!("did you mean: {}", similar.join(", "));
            }
            println!("type 'help' for available commands");
        }
    }
    Ok(())
}

#[derive(Debug, PartialEq)]
enum KolaChoice {
    All,
    List,
    Interactive,
    Pattern(String),
}

fn parse_kola_choice(answer: &str) -> KolaChoice {
    let answer = answer.trim();
    match answer.to_ascii_lowercase().as_str() {
        "" | "all" => KolaChoice::All,
        "list" => KolaChoice::List,
        "interactive" | "i" => KolaChoice::Interactive,
        _ => KolaChoice::Pattern(answer.to_string()),
    }
}

/// 패턴 없는 `kola run`: 전체 실행/목록/대화형 선택 중 고른다.
async fn run_kola_chooser(controller: &SessionController<'_>, session: &mut Session) -> Result<()> {
    if !session.active_state().built {
        // 선택지를 묻기 전에 빌드 여부부터 알린다.
        controller.run_kola_tests(session, &TestSelection::all()).await?;
        return Ok(());
    }

    println!("no test pattern given");
    println!("  Enter        run all tests");
    println!("  list         show available tests");
    println!("  interactive  pick tests interactively");
    println!("  <pattern>    run matching tests");
    let Some(answer) = prompt_line("choice: ")? else {
        return Err(OpError::Cancelled.into());
    };

    match parse_kola_choice(&answer) {
        KolaChoice::All => controller.run_kola_tests(session, &TestSelection::all()).await,
        KolaChoice::List => controller.list_kola_tests(session).await.map(|_| ()),
        KolaChoice::Interactive => {
            controller
                .run_interactive_test_selection(session, prompt_test_selection)
                .await
        }
        KolaChoice::Pattern(pattern) => {
            controller
                .run_kola_tests(session, &TestSelection::new(pattern, ""))
                .await
        }
    }
}

/// 대화형 kola 선택. `cancel`이나 EOF면 `None`.
fn prompt_test_selection() -> Result<Option<TestSelection>> {
    println!();
    println!("pattern examples: basic, ext.config.*, podman.*, '*' (all)");
    let Some(pattern) = prompt_line("test pattern (empty = all, 'cancel' to abort): ")? else {
        return Ok(None);
    };
    let pattern = pattern.trim();
    if pattern.eq_ignore_ascii_case("cancel") {
        return Ok(None);
    }

    println!("extra args examples: --parallel=2, --qemu-memory=4096");
    let extra = prompt_line("extra kola args (optional): ")?.unwrap_or_default();
    Ok(Some(TestSelection::new(pattern, extra.trim())))
}

fn report_error(err: &anyhow::Error) {
    let op = err.downcast_ref::<OpError>();
    if op == Some(&OpError::Cancelled) {
        println!("cancelled");
        return;
    }

    eprintln!("error: {err:#}");
    if let Some(hint) = op.and_then(OpError::hint) {
        eprintln!("hint: {hint}");
    }
}

/// 같은 글자로 시작하는 동사를 추천한다.
fn similar_verbs(verb: &str) -> Vec<&'static str> {
    let Some(first) = verb.chars().next() else {
        return Vec::new();
    };
    known_verbs()
        .into_iter()
        .filter(|v| v.starts_with(first))
        .take(5)
        .collect()
}

const HELP_ENTRIES: &[(&str, &str)] = &[
    ("init [repo]", "initialize cosa in the working directory"),
    ("force-init [repo]", "initialize even if the directory is not empty"),
    ("pull", "pull the coreos-assembler container image"),
    ("streams | list", "list available streams"),
    ("refresh", "fetch remote branches and list streams"),
    ("current", "show the current stream"),
    ("switch <stream>", "switch to a stream (alias: checkout)"),
    ("build <stream>", "init, switch, fetch and build in one go"),
    ("fetch [stream]", "fetch metadata and packages"),
    ("build", "build the current stream"),
    ("status", "show build status"),
    ("test-summary", "show which streams are ready for testing"),
    ("kola", "kola test commands (see 'kola')"),
    ("run [args]", "boot the latest build in QEMU"),
    ("shell", "open a cosa shell"),
    ("disk", "check free disk space"),
    ("clean", "remove old builds (keeps latest)"),
    ("clean-all", "clean builds and prune containers/images"),
    ("clean-dir", "wipe the whole working directory"),
    ("help", "show this help"),
    ("quit | exit", "leave cosapilot"),
];

const KOLA_HELP_ENTRIES: &[(&str, &str)] = &[
    ("kola list", "list available tests"),
    ("kola run [pattern]", "run tests (no pattern: choose)"),
    ("kola interactive", "pick a pattern and extra args"),
    ("test <pattern>", "shorthand for kola run"),
    ("run basic test", "natural form of kola run basic"),
];

fn print_help() {
    print_table("Commands", HELP_ENTRIES);
}

fn print_kola_help() {
    print_table("Kola testing", KOLA_HELP_ENTRIES);
    println!("patterns: basic, ext.config.*, podman.*, coreos.ignition.*");
}

fn print_table(title: &str, entries: &[(&str, &str)]) {
    let interactive = io::stdout().is_terminal();
    println!();
    println!("{}", paint(title, "1;36", interactive));
    for (usage, description) in entries {
        println!("  {} {description}", paint(&format!("{usage:<20}"), "1;33", interactive));
    }
    println!();
}

fn print_welcome(app: &AppComposition, session: &Session) {
    let interactive = io::stdout().is_terminal();

    let initialized = if session.initialized {
        paint("yes", "1;32", interactive)
    } else {
        paint("no (run 'init' or 'build <stream>')", "1;31", interactive)
    };

    println!("+------------------------------------------------------------+");
    println!("{}", box_row("cosapilot", Some("1;36"), interactive));
    println!(
        "{}",
        box_row("CoreOS Assembler interactive shell", Some("2;37"), interactive)
    );
    println!("+------------------------------------------------------------+");
    for line in dashboard_lines(app, session) {
        println!("{}", box_row(&line, None, interactive));
    }
    println!("+------------------------------------------------------------+");
    println!("  initialized: {initialized}");
    println!("  try: build stable | streams | status | help | quit");
    println!();
}

fn dashboard_lines(app: &AppComposition, session: &Session) -> Vec<String> {
    vec![
        format!("Work dir: {}", app.work_dir().display()),
        format!("Image: {}", session.container_image),
        format!("Config repo: {}", session.config_repo),
        format!("Low space policy: {:?}", app.config().low_space_policy()),
        format!("Stream: {}", session.current_stream().unwrap_or("none")),
    ]
}

/// 폭 맞춤은 색 입히기 전 평문 기준으로 한다(ANSI escape는 폭이 없다).
fn box_row(text: &str, ansi: Option<&str>, interactive: bool) -> String {
    let padded = format!("{:<58}", fit_box_line(text, 58));
    match ansi {
        Some(ansi) => format!("| {} |", paint(&padded, ansi, interactive)),
        None => format!("| {padded} |"),
    }
}

fn fit_box_line(text: &str, width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= width {
        return text.to_string();
    }
    if width <= 3 {
        return ".".repeat(width);
    }

    let keep = width - 3;
    let head: String = chars.into_iter().take(keep).collect();
    format!("{head}...")
}
