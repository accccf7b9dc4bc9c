//! 세션 상태(작업 디렉터리, 현재 스트림, 스트림별 fetch/build 플래그).
//! 프로세스 메모리에만 존재하며 디스크에 저장하지 않는다.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

/// 스트림을 선택하지 않은 상태에서 플래그를 기록하는 자리표시 키.
pub const UNNAMED_STREAM: &str = "current";

pub const DEFAULT_CONTAINER_IMAGE: &str = "quay.io/coreos-assembler/coreos-assembler:latest";
pub const DEFAULT_CONFIG_REPO: &str = "https://github.com/coreos/fedora-coreos-config";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StreamState {
    pub fetched: bool,
    pub built: bool,
}

impl StreamState {
    pub fn label(&self) -> &'static str {
        match (self.fetched, self.built) {
            (_, true) => "built",
            (true, false) => "fetched",
            (false, false) => "not ready",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    pub work_dir: PathBuf,
    pub container_image: String,
    pub config_repo: String,
    pub initialized: bool,
    current_stream: Option<String>,
    streams: BTreeMap<String, StreamState>,
}

impl Session {
    pub fn new(work_dir: PathBuf, container_image: String, config_repo: String) -> Self {
        Self {
            work_dir,
            container_image,
            config_repo,
            initialized: false,
            current_stream: None,
            streams: BTreeMap::new(),
        }
    }

    pub fn current_stream(&self) -> Option<&str> {
        self.current_stream.as_deref()
    }

    /// 현재 스트림을 바꾸고 상태 항목이 없으면 만든다.
    pub fn select_stream(&mut self, name: &str) {
        self.streams.entry(name.to_string()).or_default();
        self.current_stream = Some(name.to_string());
    }

    /// 플래그를 기록할 키. 선택된 스트림이 없으면 [`UNNAMED_STREAM`].
    pub fn active_stream(&self) -> &str {
        self.current_stream.as_deref().unwrap_or(UNNAMED_STREAM)
    }

    pub fn stream_state(&self, name: &str) -> StreamState {
        self.streams.get(name).copied().unwrap_or_default()
    }

    pub fn active_state(&self) -> StreamState {
        self.stream_state(self.active_stream())
    }

    pub fn streams(&self) -> &BTreeMap<String, StreamState> {
        &self.streams
    }

    pub fn mark_fetched(&mut self) {
        let key = self.active_stream().to_string();
        self.streams.entry(key).or_default().fetched = true;
    }

    /// fetch 기록이 없으면 built로 올리지 않는다.
    pub fn mark_built(&mut self) -> bool {
        let key = self.active_stream().to_string();
        let state = self.streams.entry(key).or_default();
        if !state.fetched {
            return false;
        }
        state.built = true;
        true
    }

    /// 작업 디렉터리 정리 후 상태를 초기값으로 되돌린다.
    pub fn reset(&mut self) {
        self.initialized = false;
        self.current_stream = None;
        self.streams.clear();
    }
}
