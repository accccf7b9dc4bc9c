//! 외부 프로세스로 위임되는 논리 작업과 그 결과 모델.

use std::fmt;

/// 컨테이너 안에서 실행하는 cosa 하위 명령.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssemblerCommand {
    Init { repo: String, force: bool },
    Fetch,
    Build,
    Run { args: Vec<String> },
    Shell,
    KolaList,
    KolaRun { pattern: Vec<String>, args: Vec<String> },
}

impl AssemblerCommand {
    /// cosa에 넘길 인자 목록.
    pub fn args(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        match self {
            AssemblerCommand::Init { repo, force } => {
                out.push("init".into());
                out.push(repo.clone());
                if *force {
                    out.push("--force".into());
                }
            }
            AssemblerCommand::Fetch => out.push("fetch".into()),
            AssemblerCommand::Build => out.push("build".into()),
            AssemblerCommand::Run { args } => {
                out.push("run".into());
                out.extend(args.iter().cloned());
            }
            AssemblerCommand::Shell => out.push("shell".into()),
            AssemblerCommand::KolaList => {
                out.push("kola".into());
                out.push("list".into());
            }
            AssemblerCommand::KolaRun { pattern, args } => {
                out.push("kola".into());
                out.push("run".into());
                out.extend(pattern.iter().cloned());
                out.extend(args.iter().cloned());
            }
        }
        out
    }
}

/// 컨테이너 런타임(podman) 작업.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerOp {
    Version,
    Pull,
    Assembler(AssemblerCommand),
    PruneContainers,
    PruneImages,
}

/// 설정 저장소 체크아웃(`src/config`) 대상 git 작업.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VcsOp {
    Version,
    FetchOrigin,
    ListRemoteBranches,
    ShowCurrentBranch,
    Checkout(String),
    CheckoutTracking(String),
    CheckoutRemote(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExternalOp {
    Container(ContainerOp),
    Vcs(VcsOp),
}

impl ExternalOp {
    pub fn assembler(command: AssemblerCommand) -> Self {
        ExternalOp::Container(ContainerOp::Assembler(command))
    }

    /// 사용자에게 보여 줄 짧은 이름.
    pub fn describe(&self) -> String {
        match self {
            ExternalOp::Container(ContainerOp::Assembler(cmd)) => {
                format!("cosa {}", cmd.args().join(" "))
            }
            ExternalOp::Container(ContainerOp::Version) => "podman --version".to_string(),
            ExternalOp::Container(ContainerOp::Pull) => "podman pull".to_string(),
            ExternalOp::Container(ContainerOp::PruneContainers) => {
                "podman container prune".to_string()
            }
            ExternalOp::Container(ContainerOp::PruneImages) => "podman image prune".to_string(),
            ExternalOp::Vcs(op) => match op {
                VcsOp::Version => "git --version".to_string(),
                VcsOp::FetchOrigin => "git fetch origin".to_string(),
                VcsOp::ListRemoteBranches => "git branch -r".to_string(),
                VcsOp::ShowCurrentBranch => "git branch --show-current".to_string(),
                VcsOp::Checkout(b) => format!("git checkout {b}"),
                VcsOp::CheckoutTracking(b) => format!("git checkout -b {b} origin/{b}"),
                VcsOp::CheckoutRemote(b) => format!("git checkout origin/{b}"),
            },
        }
    }
}

/// 실행 모드. interactive는 호출자의 stdio를 그대로 물려준다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecMode {
    Interactive,
    Captured,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitState {
    Success,
    Failed(Option<i32>),
    /// 실행 중 Ctrl-C
    Interrupted,
}

impl fmt::Display for ExitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitState::Success => write!(f, "success"),
            ExitState::Failed(Some(code)) => write!(f, "exit code {code}"),
            ExitState::Failed(None) => write!(f, "terminated by signal"),
            ExitState::Interrupted => write!(f, "interrupted"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutcome {
    pub exit: ExitState,
    /// captured 모드에서만 채워진다.
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutcome {
    pub fn succeeded(&self) -> bool {
        self.exit == ExitState::Success
    }
}

#[cfg(test)]
impl ProcessOutcome {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            exit: ExitState::Success,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit: ExitState::Failed(Some(code)),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// kola 실행 대상. 두 문자열 모두 쉘 규칙으로 분리해 `kola run` 뒤에 붙인다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestSelection {
    pub pattern: String,
    pub extra_args: String,
}

impl TestSelection {
    pub fn new(pattern: impl Into<String>, extra_args: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            extra_args: extra_args.into(),
        }
    }

    pub fn all() -> Self {
        Self::default()
    }

    /// 따옴표가 짝이 맞지 않으면 공백 기준으로 나눈다.
    pub fn split(text: &str) -> Vec<String> {
        let text = text.trim();
        if text.is_empty() {
            return Vec::new();
        }
        shlex::split(text)
            .unwrap_or_else(|| text.split_whitespace().map(ToString::to_string).collect())
    }

    pub fn to_command(&self) -> AssemblerCommand {
        AssemblerCommand::KolaRun {
            pattern: Self::split(&self.pattern),
            args: Self::split(&self.extra_args),
        }
    }
}
