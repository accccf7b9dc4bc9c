//! 자유 형식 입력을 정규 액션으로 해석하는 명령 파서.
//! 세션 상태를 참조하지 않는 순수 함수이며, 모든 규칙은 아래 순서 있는 테이블로 표현한다.

/// 파서가 만들어 내는 정규 액션.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Init,
    ForceInit,
    Fetch,
    Build,
    /// `build <stream>`: init → switch → fetch → build 자동 워크플로.
    BuildStream,
    Status,
    Help,
    Quit,
    Pull,
    Shell,
    Disk,
    Clean,
    CleanAll,
    CleanDir,
    Switch,
    ListStreams,
    Refresh,
    CurrentStream,
    TestSummary,
    KolaHelp,
    KolaList,
    KolaRun,
    KolaInteractive,
    RunImage,
    /// 알 수 없는 첫 토큰. 원문은 `ParsedCommand::verb`에 남는다.
    Unrecognized,
}

/// 한 줄 입력의 해석 결과.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub action: Action,
    /// 소문자화된 첫 토큰
    pub verb: String,
    pub args: Vec<String>,
}

/// 인자 개수가 정확히 하나일 때만 적용되는 규칙.
const SINGLE_ARG_RULES: &[(&[&str], Action)] = &[
    (&["build"], Action::BuildStream),
    (&["switch", "checkout"], Action::Switch),
];

/// 별칭 규칙. `true`면 인자를 그대로 넘기고, `false`면 버린다.
const ALIAS_RULES: &[(&[&str], Action, bool)] = &[
    (&["streams", "branches", "list"], Action::ListStreams, false),
    (&["refresh", "update", "fetch-branches"], Action::Refresh, false),
    (&["current"], Action::CurrentStream, false),
    (&["force-init"], Action::ForceInit, true),
    (&["clean-dir", "clean-directory"], Action::CleanDir, false),
    (&["test-summary"], Action::TestSummary, false),
];

/// 인자를 그대로 넘기는 정규 동사.
const CANONICAL_VERBS: &[(&str, Action)] = &[
    ("init", Action::Init),
    ("fetch", Action::Fetch),
    ("build", Action::Build),
    ("status", Action::Status),
    ("help", Action::Help),
    ("quit", Action::Quit),
    ("exit", Action::Quit),
    ("pull", Action::Pull),
    ("shell", Action::Shell),
    ("disk", Action::Disk),
    ("clean", Action::Clean),
    ("clean-all", Action::CleanAll),
    ("switch", Action::Switch),
];

/// `kola` 하위 명령. 목록에 없는 토큰은 테스트 패턴으로 간주한다.
const KOLA_SUBCOMMANDS: &[(&str, Action)] = &[
    ("list", Action::KolaList),
    ("run", Action::KolaRun),
    ("interactive", Action::KolaInteractive),
];

/// `run <단일 인자>`를 테스트 실행으로 판단하는 부분 문자열 목록.
/// 고정 목록이라 `network`가 들어간 VM 인자도 테스트로 분류된다.
pub const TEST_INDICATORS: &[&str] = &[
    "basic",
    "podman",
    "network",
    "internet",
    "coreos",
    "ostree",
    "rpmostree",
    "systemd",
];

const TEST_SUFFIXES: &[&str] = &["test", "tests"];
const TEST_KEYWORDS: &[&str] = &["test", "kola"];

/// 입력 한 줄을 해석한다. 빈 입력이면 `None`.
pub fn parse_command(input: &str) -> Option<ParsedCommand> {
    let mut parts = input.split_whitespace();
    let verb = parts.next()?.to_lowercase();
    let args: Vec<String> = parts.map(ToString::to_string).collect();

    let (action, args) = resolve(&verb, args);
    Some(ParsedCommand { action, verb, args })
}

fn resolve(verb: &str, args: Vec<String>) -> (Action, Vec<String>) {
    if args.len() == 1
        && let Some((_, action)) = SINGLE_ARG_RULES.iter().find(|(verbs, _)| verbs.contains(&verb))
    {
        return (*action, args);
    }

    if let Some((_, action, keep_args)) =
        ALIAS_RULES.iter().find(|(verbs, _, _)| verbs.contains(&verb))
    {
        return (*action, if *keep_args { args } else { Vec::new() });
    }

    match verb {
        "kola" => return resolve_kola(args),
        "test" => return (Action::KolaRun, args),
        "run" => return resolve_run(args),
        _ => {}
    }

    match CANONICAL_VERBS.iter().find(|(name, _)| *name == verb) {
        Some((_, action)) => (*action, args),
        None => (Action::Unrecognized, args),
    }
}

fn resolve_kola(args: Vec<String>) -> (Action, Vec<String>) {
    let Some(first) = args.first() else {
        return (Action::KolaHelp, Vec::new());
    };

    let first = first.to_lowercase();
    match KOLA_SUBCOMMANDS.iter().find(|(name, _)| *name == first) {
        Some((_, Action::KolaRun)) => (Action::KolaRun, args[1..].to_vec()),
        Some((_, action)) => (*action, Vec::new()),
        None => (Action::KolaRun, args),
    }
}

fn resolve_run(args: Vec<String>) -> (Action, Vec<String>) {
    match args.len() {
        0 => (Action::RunImage, args),
        1 => {
            let arg = args[0].to_lowercase();
            if TEST_INDICATORS.iter().any(|indicator| arg.contains(indicator)) {
                (Action::KolaRun, args)
            } else {
                (Action::RunImage, args)
            }
        }
        n => {
            let last = args[n - 1].to_lowercase();
            if TEST_SUFFIXES.contains(&last.as_str()) {
                return (Action::KolaRun, vec![args[..n - 1].join(" ")]);
            }

            let joined = args.join(" ").to_lowercase();
            if TEST_KEYWORDS.iter().any(|word| joined.contains(word)) {
                (Action::KolaRun, args)
            } else {
                (Action::RunImage, args)
            }
        }
    }
}

/// Tab 완성과 도움말에 쓰이는 최상위 동사 목록.
pub fn known_verbs() -> Vec<&'static str> {
    let mut verbs: Vec<&'static str> = CANONICAL_VERBS.iter().map(|(name, _)| *name).collect();
    for (names, _, _) in ALIAS_RULES {
        verbs.extend_from_slice(names);
    }
    verbs.extend_from_slice(&["checkout", "kola", "test", "run"]);
    verbs.sort_unstable();
    verbs.dedup();
    verbs
}
