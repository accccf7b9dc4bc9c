//! 논리 작업(`ExternalOp`)을 실제 실행 인자(argv)로 바꾸는 순수 함수 모음.

use std::fmt;
use std::path::PathBuf;

use crate::domain::layout::WorkDirLayout;
use crate::domain::operation::{ContainerOp, ExecMode, ExternalOp, VcsOp};

/// 컨테이너 안의 작업 디렉터리 마운트 지점.
const CONTAINER_SRV: &str = "/srv/";
const CONTAINER_NAME: &str = "cosa";

/// 외부 명령 실행에 필요한 고정 정보.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSet {
    pub container_runtime: String,
    pub vcs: String,
    pub image: String,
    /// 절대 경로여야 한다(컨테이너 볼륨 마운트에 그대로 쓰임).
    pub work_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let words = std::iter::once(self.program.as_str()).chain(self.args.iter().map(String::as_str));
        match shlex::try_join(words) {
            Ok(joined) => f.write_str(&joined),
            Err(_) => write!(f, "{} {}", self.program, self.args.join(" ")),
        }
    }
}

/// `tty`는 호출자의 stdin이 터미널인지 여부.
pub fn build_invocation(tools: &ToolSet, op: &ExternalOp, mode: ExecMode, tty: bool) -> Invocation {
    match op {
        ExternalOp::Container(op) => Invocation {
            program: tools.container_runtime.clone(),
            args: container_args(tools, op, mode, tty),
        },
        ExternalOp::Vcs(op) => Invocation {
            program: tools.vcs.clone(),
            args: vcs_args(tools, op),
        },
    }
}

fn container_args(tools: &ToolSet, op: &ContainerOp, mode: ExecMode, tty: bool) -> Vec<String> {
    let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    match op {
        ContainerOp::Version => owned(&["--version"]),
        ContainerOp::Pull => vec!["pull".to_string(), tools.image.clone()],
        ContainerOp::PruneContainers => owned(&["container", "prune", "-f"]),
        ContainerOp::PruneImages => owned(&["image", "prune", "-f"]),
        ContainerOp::Assembler(command) => {
            let mut args = vec!["run".to_string()];
            if mode == ExecMode::Interactive {
                args.push(if tty { "-ti" } else { "-i" }.to_string());
            }
            args.extend(owned(&[
                "--rm",
                "--security-opt=label=disable",
                "--privileged",
                "--userns=keep-id:uid=1000,gid=1000",
            ]));
            args.push(format!("-v={}:{CONTAINER_SRV}", tools.work_dir.display()));
            args.extend(owned(&[
                "--device=/dev/kvm",
                "--device=/dev/fuse",
                "--tmpfs=/tmp",
                "-v=/var/tmp:/var/tmp",
            ]));
            args.push(format!("--name={CONTAINER_NAME}"));
            args.push(tools.image.clone());
            args.extend(command.args());
            args
        }
    }
}

fn vcs_args(tools: &ToolSet, op: &VcsOp) -> Vec<String> {
    let sub: Vec<String> = match op {
        VcsOp::Version => return vec!["--version".to_string()],
        VcsOp::FetchOrigin => vec!["fetch".into(), "origin".into()],
        VcsOp::ListRemoteBranches => vec!["branch".into(), "-r".into()],
        VcsOp::ShowCurrentBranch => vec!["branch".into(), "--show-current".into()],
        VcsOp::Checkout(branch) => vec!["checkout".into(), branch.clone()],
        VcsOp::CheckoutTracking(branch) => vec![
            "checkout".into(),
            "-b".into(),
            branch.clone(),
            format!("origin/{branch}"),
        ],
        VcsOp::CheckoutRemote(branch) => vec!["checkout".into(), format!("origin/{branch}")],
    };

    let checkout = WorkDirLayout::new(&tools.work_dir).config_dir();
    let mut args = vec!["-C".to_string(), checkout.display().to_string()];
    args.extend(sub);
    args
}
