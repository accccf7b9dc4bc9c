use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Result, anyhow};
use async_trait::async_trait;

use super::*;
use crate::application::ports::{HostProbe, ProcessGateway, Reporter, UserConfirmer};
use crate::domain::disk::{DiskUsage, GIB, LowSpacePolicy};
use crate::domain::error::OpError;
use crate::domain::operation::{
    AssemblerCommand, ContainerOp, ExecMode, ExitState, ExternalOp, ProcessOutcome, TestSelection,
    VcsOp,
};
use crate::domain::session::{
    DEFAULT_CONFIG_REPO, DEFAULT_CONTAINER_IMAGE, Session, StreamState, UNNAMED_STREAM,
};

/// 호출을 기록하고, 지정한 응답이 없으면 성공을 돌려주는 게이트웨이.
#[derive(Default)]
struct FakeGateway {
    calls: Mutex<Vec<ExternalOp>>,
    scripted: Mutex<HashMap<String, VecDeque<Result<ProcessOutcome, String>>>>,
    /// `cosa init` 실행 시 초기화 결과 디렉터리를 만들 작업 디렉터리
    init_root: Option<PathBuf>,
}

impl FakeGateway {
    fn creating_layout_on_init(root: &Path) -> Self {
        Self {
            init_root: Some(root.to_path_buf()),
            ..Self::default()
        }
    }

    fn script(&self, op: &str, outcome: ProcessOutcome) {
        self.scripted
            .lock()
            .unwrap()
            .entry(op.to_string())
            .or_default()
            .push_back(Ok(outcome));
    }

    fn fail_spawn(&self, op: &str) {
        self.scripted
            .lock()
            .unwrap()
            .entry(op.to_string())
            .or_default()
            .push_back(Err(format!("failed to spawn {op}")));
    }

    fn calls(&self) -> Vec<ExternalOp> {
        self.calls.lock().unwrap().clone()
    }

    fn described(&self) -> Vec<String> {
        self.calls().iter().map(ExternalOp::describe).collect()
    }
}

#[async_trait]
impl ProcessGateway for FakeGateway {
    async fn execute(&self, op: &ExternalOp, _mode: ExecMode) -> Result<ProcessOutcome> {
        self.calls.lock().unwrap().push(op.clone());

        if let (Some(root), ExternalOp::Container(ContainerOp::Assembler(AssemblerCommand::Init { .. }))) =
            (&self.init_root, op)
        {
            fs::create_dir_all(root.join("src/config/.git"))?;
            fs::create_dir_all(root.join("cache"))?;
        }

        let next = self
            .scripted
            .lock()
            .unwrap()
            .get_mut(&op.describe())
            .and_then(VecDeque::pop_front);
        match next {
            Some(Ok(outcome)) => Ok(outcome),
            Some(Err(msg)) => Err(anyhow!(msg)),
            None => Ok(ProcessOutcome::success("")),
        }
    }
}

struct FakeHost {
    free: u64,
    kvm: bool,
}

impl HostProbe for FakeHost {
    fn disk_usage(&self, _path: &Path) -> Result<DiskUsage> {
        let total = 500 * GIB;
        Ok(DiskUsage {
            total,
            used: total - self.free,
            free: self.free,
        })
    }

    fn virtualization_available(&self) -> bool {
        self.kvm
    }
}

#[derive(Default)]
struct FakeReporter {
    lines: Mutex<Vec<String>>,
}

impl FakeReporter {
    fn push(&self, line: String) {
        self.lines.lock().unwrap().push(line);
    }

    fn contains(&self, needle: &str) -> bool {
        self.lines.lock().unwrap().iter().any(|l| l.contains(needle))
    }
}

impl Reporter for FakeReporter {
    fn section(&self, name: &str) {
        self.push(format!("== {name}"));
    }
    fn kv(&self, key: &str, value: &str) {
        self.push(format!("{key}: {value}"));
    }
    fn status(&self, scope: &str, message: &str) {
        self.push(format!("[{scope}] {message}"));
    }
    fn success(&self, message: &str) {
        self.push(format!("ok {message}"));
    }
    fn warn(&self, message: &str) {
        self.push(format!("warn {message}"));
    }
    fn raw(&self, line: &str) {
        self.push(line.to_string());
    }
}

struct FixedConfirmer {
    answer: bool,
    asked: AtomicUsize,
}

impl UserConfirmer for FixedConfirmer {
    fn confirm(&self, _message: &str) -> Result<bool> {
        self.asked.fetch_add(1, Ordering::SeqCst);
        Ok(self.answer)
    }
}

struct Harness {
    dir: tempfile::TempDir,
    gateway: FakeGateway,
    host: FakeHost,
    reporter: FakeReporter,
    confirmer: FixedConfirmer,
    policy: LowSpacePolicy,
}

impl Harness {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let gateway = FakeGateway::creating_layout_on_init(dir.path());
        Self {
            dir,
            gateway,
            host: FakeHost {
                free: 100 * GIB,
                kvm: true,
            },
            reporter: FakeReporter::default(),
            confirmer: FixedConfirmer {
                answer: false,
                asked: AtomicUsize::new(0),
            },
            policy: LowSpacePolicy::Ask,
        }
    }

    fn with_free_space(mut self, free: u64) -> Self {
        self.host.free = free;
        self
    }

    fn with_policy(mut self, policy: LowSpacePolicy, answer: bool) -> Self {
        self.policy = policy;
        self.confirmer.answer = answer;
        self
    }

    fn controller(&self) -> SessionController<'_> {
        SessionController {
            gateway: &self.gateway,
            host: &self.host,
            reporter: &self.reporter,
            confirmer: &self.confirmer,
            low_space_policy: self.policy,
        }
    }

    fn session(&self) -> Session {
        Session::new(
            self.dir.path().to_path_buf(),
            DEFAULT_CONTAINER_IMAGE.to_string(),
            DEFAULT_CONFIG_REPO.to_string(),
        )
    }

    /// 이전 init 결과가 있는 디렉터리로 만든다.
    fn seed_initialized(&self) {
        fs::create_dir_all(self.dir.path().join("src/config/.git")).unwrap();
        fs::create_dir_all(self.dir.path().join("cache")).unwrap();
    }

    fn asked(&self) -> usize {
        self.confirmer.asked.load(Ordering::SeqCst)
    }
}

fn op_error(err: &anyhow::Error) -> &OpError {
    err.downcast_ref::<OpError>()
        .unwrap_or_else(|| panic!("expected OpError, got {err:#}"))
}

fn assembler(cmd: AssemblerCommand) -> ExternalOp {
    ExternalOp::assembler(cmd)
}

#[tokio::test]
async fn build_before_fetch_runs_exactly_one_implicit_fetch() {
    let h = Harness::new();
    let mut session = h.session();
    session.initialized = true;

    h.controller().build(&mut session, None).await.unwrap();

    assert_eq!(
        h.gateway.calls(),
        vec![
            assembler(AssemblerCommand::Fetch),
            assembler(AssemblerCommand::Build)
        ]
    );
    assert_eq!(
        session.stream_state(UNNAMED_STREAM),
        StreamState {
            fetched: true,
            built: true
        }
    );
}

#[tokio::test]
async fn build_after_fetch_does_not_fetch_again() {
    let h = Harness::new();
    h.seed_initialized();
    let mut session = h.session();
    session.initialized = true;

    let controller = h.controller();
    controller.fetch(&mut session, Some("stable")).await.unwrap();
    controller.build(&mut session, None).await.unwrap();

    assert_eq!(
        h.gateway.described(),
        vec![
            "git fetch origin",
            "git checkout stable",
            "cosa fetch",
            "cosa build"
        ]
    );
    assert!(session.stream_state("stable").built);
}

#[tokio::test]
async fn failed_fetch_leaves_state_unchanged() {
    let h = Harness::new();
    let mut session = h.session();
    session.initialized = true;
    h.gateway
        .script("cosa fetch", ProcessOutcome::failure(1, "repo unreachable"));

    let err = h.controller().build(&mut session, None).await.unwrap_err();

    match op_error(&err) {
        OpError::CommandFailed { command, detail } => {
            assert_eq!(command, "cosa fetch");
            assert!(detail.contains("repo unreachable"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(h.gateway.calls(), vec![assembler(AssemblerCommand::Fetch)]);
    assert_eq!(session.active_state(), StreamState::default());
}

#[tokio::test]
async fn interrupted_build_is_a_failed_operation() {
    let h = Harness::new();
    let mut session = h.session();
    session.initialized = true;
    session.mark_fetched();
    h.gateway.script(
        "cosa build",
        ProcessOutcome {
            exit: ExitState::Interrupted,
            stdout: String::new(),
            stderr: String::new(),
        },
    );

    let err = h.controller().build(&mut session, None).await.unwrap_err();

    assert!(matches!(op_error(&err), OpError::Interrupted { .. }));
    assert!(session.active_state().fetched);
    assert!(!session.active_state().built);
}

#[tokio::test]
async fn fetch_requires_initialization() {
    let h = Harness::new();
    let mut session = h.session();

    let err = h.controller().fetch(&mut session, None).await.unwrap_err();

    assert_eq!(op_error(&err), &OpError::NotInitialized);
    assert!(h.gateway.calls().is_empty());
}

#[tokio::test]
async fn switching_to_current_stream_is_a_noop() {
    let h = Harness::new();
    h.seed_initialized();
    let mut session = h.session();
    session.initialized = true;
    session.select_stream("stable");

    h.controller()
        .switch_stream(&mut session, "stable")
        .await
        .unwrap();

    assert!(h.gateway.calls().is_empty());
    assert_eq!(session.current_stream(), Some("stable"));
}

#[tokio::test]
async fn switch_falls_back_to_remote_checkouts() {
    let h = Harness::new();
    h.seed_initialized();
    let mut session = h.session();
    h.gateway.script(
        "git checkout next",
        ProcessOutcome::failure(1, "pathspec 'next' did not match"),
    );
    h.gateway.script(
        "git checkout -b next origin/next",
        ProcessOutcome::failure(128, "a branch named 'next' already exists"),
    );

    h.controller()
        .switch_stream(&mut session, "next")
        .await
        .unwrap();

    assert_eq!(
        h.gateway.calls(),
        vec![
            ExternalOp::Vcs(VcsOp::FetchOrigin),
            ExternalOp::Vcs(VcsOp::Checkout("next".into())),
            ExternalOp::Vcs(VcsOp::CheckoutTracking("next".into())),
            ExternalOp::Vcs(VcsOp::CheckoutRemote("next".into())),
        ]
    );
    assert_eq!(session.current_stream(), Some("next"));
    assert!(session.streams().contains_key("next"));
}

#[tokio::test]
async fn switch_failure_reports_available_streams() {
    let h = Harness::new();
    h.seed_initialized();
    let mut session = h.session();
    session.select_stream("stable");
    for op in [
        "git checkout bogus",
        "git checkout -b bogus origin/bogus",
        "git checkout origin/bogus",
    ] {
        h.gateway.script(op, ProcessOutcome::failure(1, "no such ref"));
    }
    h.gateway.script(
        "git branch -r",
        ProcessOutcome::success("  origin/HEAD -> origin/testing-devel\n  origin/stable\n  origin/next\n"),
    );

    let err = h
        .controller()
        .switch_stream(&mut session, "bogus")
        .await
        .unwrap_err();

    assert_eq!(
        op_error(&err),
        &OpError::StreamNotFound {
            stream: "bogus".into(),
            available: vec!["stable".into(), "next".into()],
        }
    );
    assert_eq!(session.current_stream(), Some("stable"));
    assert!(!session.streams().contains_key("bogus"));
}

#[tokio::test]
async fn switch_requires_config_checkout() {
    let h = Harness::new();
    let mut session = h.session();

    let err = h
        .controller()
        .switch_stream(&mut session, "next")
        .await
        .unwrap_err();

    assert_eq!(op_error(&err), &OpError::NotInitialized);
}

#[tokio::test]
async fn stream_listing_falls_back_without_config_dir() {
    let h = Harness::new();
    let session = h.session();

    let streams = h.controller().list_available_streams(&session).await;

    assert_eq!(
        streams,
        vec!["testing-devel", "stable", "testing", "next", "rawhide"]
    );
    assert!(h.gateway.calls().is_empty());
}

#[tokio::test]
async fn stream_listing_falls_back_when_git_is_missing() {
    let h = Harness::new();
    h.seed_initialized();
    let session = h.session();
    h.gateway.fail_spawn("git branch -r");

    let streams = h.controller().list_available_streams(&session).await;

    assert_eq!(streams.len(), 5);
    assert_eq!(
        h.gateway.described(),
        vec!["git fetch origin", "git branch -r"]
    );
}

#[tokio::test]
async fn prior_initialization_is_adopted_without_cosa_init() {
    let h = Harness::new();
    h.seed_initialized();
    let mut session = h.session();
    h.gateway.script(
        "git branch --show-current",
        ProcessOutcome::success("testing-devel\n"),
    );

    let outcome = h
        .controller()
        .initialize(&mut session, None, false)
        .await
        .unwrap();

    assert_eq!(outcome, InitOutcome::AlreadyInitialized);
    assert!(session.initialized);
    assert_eq!(session.current_stream(), Some("testing-devel"));
    assert_eq!(
        h.gateway.calls(),
        vec![ExternalOp::Vcs(VcsOp::ShowCurrentBranch)]
    );
}

#[tokio::test]
async fn init_refuses_non_empty_directory_without_force() {
    let h = Harness::new();
    fs::write(h.dir.path().join("notes.txt"), "hello").unwrap();
    let mut session = h.session();

    let err = h
        .controller()
        .initialize(&mut session, None, false)
        .await
        .unwrap_err();

    assert_eq!(op_error(&err), &OpError::DirectoryNotEmpty { entries: 1 });
    assert!(!session.initialized);
    assert!(h.gateway.calls().is_empty());
}

#[tokio::test]
async fn force_init_passes_force_flag_and_repo() {
    let h = Harness::new();
    fs::write(h.dir.path().join("notes.txt"), "hello").unwrap();
    let mut session = h.session();
    h.gateway.script(
        "git branch --show-current",
        ProcessOutcome::success("testing-devel\n"),
    );

    let outcome = h
        .controller()
        .initialize(&mut session, Some("https://example.com/cfg.git"), true)
        .await
        .unwrap();

    assert_eq!(outcome, InitOutcome::Initialized);
    assert_eq!(
        h.gateway.calls()[0],
        assembler(AssemblerCommand::Init {
            repo: "https://example.com/cfg.git".into(),
            force: true,
        })
    );
    assert_eq!(session.current_stream(), Some("testing-devel"));
}

#[tokio::test]
async fn failed_init_keeps_session_uninitialized() {
    let h = Harness::new();
    let mut session = h.session();
    let init = format!("cosa init {DEFAULT_CONFIG_REPO}");
    h.gateway.script(&init, ProcessOutcome::failure(1, ""));

    let err = h
        .controller()
        .initialize(&mut session, None, false)
        .await
        .unwrap_err();

    match op_error(&err) {
        OpError::CommandFailed { detail, .. } => assert_eq!(detail, "exit code 1"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!session.initialized);
}

#[tokio::test]
async fn stream_workflow_runs_every_stage_in_order() {
    let h = Harness::new();
    let mut session = h.session();
    h.gateway.script(
        "git branch --show-current",
        ProcessOutcome::success("testing-devel\n"),
    );

    h.controller()
        .build_stream_workflow(&mut session, "rawhide")
        .await
        .unwrap();

    assert_eq!(
        h.gateway.described(),
        vec![
            format!("cosa init {DEFAULT_CONFIG_REPO}"),
            "git branch --show-current".to_string(),
            "git fetch origin".to_string(),
            "git checkout rawhide".to_string(),
            "cosa fetch".to_string(),
            "cosa build".to_string(),
        ]
    );
    assert_eq!(session.current_stream(), Some("rawhide"));
    assert!(session.stream_state("rawhide").built);
    assert!(!session.stream_state("testing-devel").fetched);
}

#[tokio::test]
async fn stream_workflow_stops_at_first_failure() {
    let h = Harness::new();
    h.seed_initialized();
    let mut session = h.session();
    h.gateway
        .script("cosa fetch", ProcessOutcome::failure(2, "no network"));

    let err = h
        .controller()
        .build_stream_workflow(&mut session, "stable")
        .await
        .unwrap_err();

    assert!(matches!(op_error(&err), OpError::CommandFailed { .. }));
    assert!(!h.gateway.described().contains(&"cosa build".to_string()));
    assert_eq!(session.stream_state("stable"), StreamState::default());
}

#[tokio::test]
async fn critical_disk_space_blocks_under_abort_policy() {
    let h = Harness::new()
        .with_free_space(5 * GIB - 1)
        .with_policy(LowSpacePolicy::Abort, true);
    let mut session = h.session();
    session.initialized = true;

    let err = h.controller().fetch(&mut session, None).await.unwrap_err();

    assert!(matches!(
        op_error(&err),
        OpError::InsufficientDiskSpace { .. }
    ));
    assert!(h.gateway.calls().is_empty());
    assert_eq!(h.asked(), 0);
}

#[tokio::test]
async fn critical_disk_space_asks_the_confirmer() {
    let declined = Harness::new()
        .with_free_space(GIB)
        .with_policy(LowSpacePolicy::Ask, false);
    let mut session = declined.session();
    session.initialized = true;
    assert!(declined.controller().fetch(&mut session, None).await.is_err());
    assert_eq!(declined.asked(), 1);

    let accepted = Harness::new()
        .with_free_space(GIB)
        .with_policy(LowSpacePolicy::Ask, true);
    let mut session = accepted.session();
    session.initialized = true;
    accepted
        .controller()
        .fetch(&mut session, None)
        .await
        .unwrap();
    assert_eq!(accepted.asked(), 1);
    assert!(session.active_state().fetched);
}

#[tokio::test]
async fn low_disk_space_asks_before_fetching() {
    let h = Harness::new()
        .with_free_space(7 * GIB)
        .with_policy(LowSpacePolicy::Ask, false);
    let mut session = h.session();
    session.initialized = true;

    let err = h.controller().fetch(&mut session, None).await.unwrap_err();

    assert!(matches!(
        op_error(&err),
        OpError::InsufficientDiskSpace { .. }
    ));
    assert_eq!(h.asked(), 1);
    assert!(h.gateway.calls().is_empty());
    assert!(h.reporter.contains("low disk space"));
}

#[tokio::test]
async fn low_disk_space_proceeds_when_confirmed_or_overridden() {
    let accepted = Harness::new()
        .with_free_space(5 * GIB)
        .with_policy(LowSpacePolicy::Ask, true);
    let mut session = accepted.session();
    session.initialized = true;
    accepted
        .controller()
        .fetch(&mut session, None)
        .await
        .unwrap();
    assert_eq!(accepted.asked(), 1);
    assert!(session.active_state().fetched);

    let overridden = Harness::new()
        .with_free_space(7 * GIB)
        .with_policy(LowSpacePolicy::Proceed, false);
    let mut session = overridden.session();
    session.initialized = true;
    overridden
        .controller()
        .fetch(&mut session, None)
        .await
        .unwrap();
    assert_eq!(overridden.asked(), 0);
    assert!(overridden.reporter.contains("low disk space"));
}

#[tokio::test]
async fn disk_report_classifies_usage() {
    let h = Harness::new().with_free_space(10 * GIB);
    let session = h.session();

    let report = h.controller().check_disk_space(&session).unwrap();

    assert_eq!(report.level, crate::domain::disk::DiskLevel::Sufficient);
    assert_eq!(report.usage.free, 10 * GIB);
}

#[tokio::test]
async fn kola_requires_a_build() {
    let h = Harness::new();
    let mut session = h.session();
    session.initialized = true;
    session.select_stream("stable");

    let err = h.controller().list_kola_tests(&session).await.unwrap_err();
    assert_eq!(
        op_error(&err),
        &OpError::NoBuild {
            stream: "stable".into()
        }
    );

    let err = h
        .controller()
        .run_kola_tests(&session, &TestSelection::all())
        .await
        .unwrap_err();
    assert!(matches!(op_error(&err), OpError::NoBuild { .. }));
    assert!(h.gateway.calls().is_empty());
}

#[tokio::test]
async fn kola_run_appends_pattern_and_args() {
    let h = Harness::new();
    let mut session = h.session();
    session.initialized = true;
    session.mark_fetched();
    session.mark_built();

    h.controller()
        .run_kola_tests(&session, &TestSelection::new("basic", "--parallel=2"))
        .await
        .unwrap();

    assert_eq!(
        h.gateway.calls(),
        vec![assembler(AssemblerCommand::KolaRun {
            pattern: vec!["basic".into()],
            args: vec!["--parallel=2".into()],
        })]
    );
}

#[tokio::test]
async fn kola_list_relays_output() {
    let h = Harness::new();
    let mut session = h.session();
    session.initialized = true;
    session.mark_fetched();
    session.mark_built();
    h.gateway.script(
        "cosa kola list",
        ProcessOutcome::success("basic\next.config.podman\n"),
    );

    let listing = h.controller().list_kola_tests(&session).await.unwrap();

    assert!(listing.contains("ext.config.podman"));
    assert!(h.reporter.contains("ext.config.podman"));
}

#[tokio::test]
async fn interactive_selection_lists_then_runs_choice() {
    let h = Harness::new();
    let mut session = h.session();
    session.initialized = true;
    session.mark_fetched();
    session.mark_built();

    h.controller()
        .run_interactive_test_selection(&session, || {
            Ok(Some(TestSelection::new("podman.*", "")))
        })
        .await
        .unwrap();

    assert_eq!(
        h.gateway.described(),
        vec!["cosa kola list", "cosa kola run podman.*"]
    );

    let cancelled = Harness::new();
    let err = cancelled
        .controller()
        .run_interactive_test_selection(&session, || Ok(None))
        .await
        .unwrap_err();
    assert_eq!(op_error(&err), &OpError::Cancelled);
    assert_eq!(cancelled.gateway.described(), vec!["cosa kola list"]);
}

#[tokio::test]
async fn run_image_requires_build_and_passes_args() {
    let h = Harness::new();
    let mut session = h.session();
    let args = vec!["--qemu-path=/x".to_string()];

    let err = h.controller().run_image(&session, &args).await.unwrap_err();
    assert!(matches!(op_error(&err), OpError::NoBuild { .. }));

    session.mark_fetched();
    session.mark_built();
    h.controller().run_image(&session, &args).await.unwrap();
    assert_eq!(
        h.gateway.calls(),
        vec![assembler(AssemblerCommand::Run { args })]
    );
}

#[tokio::test]
async fn clean_working_directory_needs_confirmation() {
    let h = Harness::new();
    h.seed_initialized();
    fs::write(h.dir.path().join("notes.txt"), "hello").unwrap();
    let mut session = h.session();
    session.initialized = true;
    session.select_stream("stable");

    let controller = h.controller();
    let err = controller
        .clean_working_directory(&mut session, false)
        .unwrap_err();
    assert_eq!(op_error(&err), &OpError::Cancelled);
    assert!(session.initialized);
    assert!(h.dir.path().join("notes.txt").exists());

    let removed = controller
        .clean_working_directory(&mut session, true)
        .unwrap();
    assert_eq!(removed, 3);
    assert!(fs::read_dir(h.dir.path()).unwrap().next().is_none());
    assert!(!session.initialized);
    assert_eq!(session.current_stream(), None);
    assert!(session.streams().is_empty());
}

#[tokio::test]
async fn empty_working_directory_keeps_session_without_confirmation() {
    let h = Harness::new();
    let mut session = h.session();
    session.initialized = true;
    session.select_stream("stable");
    session.mark_fetched();

    let controller = h.controller();
    let err = controller
        .clean_working_directory(&mut session, false)
        .unwrap_err();
    assert_eq!(op_error(&err), &OpError::Cancelled);
    assert!(session.initialized);
    assert_eq!(session.current_stream(), Some("stable"));
    assert!(session.stream_state("stable").fetched);

    assert_eq!(controller.clean_working_directory(&mut session, true).unwrap(), 0);
    assert!(session.initialized);
}

#[tokio::test]
async fn clean_builds_keeps_latest() {
    let h = Harness::new();
    let builds = h.dir.path().join("builds");
    fs::create_dir_all(builds.join("41.1")).unwrap();
    fs::create_dir_all(builds.join("41.2")).unwrap();
    fs::create_dir_all(builds.join("latest")).unwrap();
    let session = h.session();

    let removed = h.controller().clean_builds(&session).unwrap();

    assert_eq!(removed, 2);
    assert!(builds.join("latest").exists());
    assert!(!builds.join("41.1").exists());
    assert_eq!(h.controller().clean_builds(&session).unwrap(), 0);
}

#[tokio::test]
async fn container_prune_failures_are_not_fatal() {
    let h = Harness::new();
    h.gateway.script(
        "podman container prune",
        ProcessOutcome::failure(125, "permission denied"),
    );

    h.controller().clean_containers().await.unwrap();

    assert_eq!(
        h.gateway.calls(),
        vec![
            ExternalOp::Container(ContainerOp::PruneContainers),
            ExternalOp::Container(ContainerOp::PruneImages),
        ]
    );
    assert!(h.reporter.contains("could not clean stopped containers"));
}

#[tokio::test]
async fn prerequisites_fail_when_a_tool_is_missing() {
    let h = Harness::new();
    h.gateway.fail_spawn("podman --version");

    let err = h.controller().check_prerequisites().await.unwrap_err();

    assert_eq!(
        op_error(&err),
        &OpError::MissingTool {
            tool: "podman".into()
        }
    );
}

#[tokio::test]
async fn missing_kvm_only_warns() {
    let mut h = Harness::new();
    h.host.kvm = false;

    h.controller().check_prerequisites().await.unwrap();

    assert_eq!(h.gateway.described(), vec!["podman --version", "git --version"]);
    assert!(h.reporter.contains("/dev/kvm not found"));
}

#[tokio::test]
async fn status_and_summary_reflect_session() {
    let h = Harness::new();
    h.seed_initialized();
    fs::create_dir_all(h.dir.path().join("builds/41.1")).unwrap();
    fs::create_dir_all(h.dir.path().join("builds/latest")).unwrap();
    let mut session = h.session();
    session.initialized = true;
    session.select_stream("next");
    session.mark_fetched();
    session.select_stream("stable");
    session.mark_fetched();
    session.mark_built();
    session.select_stream("rawhide");

    let controller = h.controller();
    let report = controller.status(&session);
    assert!(report.config_present);
    assert_eq!(report.build_count, 1);
    assert!(report.latest_present);
    assert_eq!(report.current_stream.as_deref(), Some("rawhide"));
    assert!(report.disk.is_some());

    let summary = controller.test_summary(&session);
    assert_eq!(summary.ready, vec!["stable"]);
    assert_eq!(summary.fetched_only, vec!["next"]);
    assert_eq!(summary.not_ready, vec!["rawhide"]);
}
