//! 호스트 상태 조회 포트 구현 어댑터.

use std::path::Path;

use anyhow::{Context, Result};
use nix::sys::statvfs::statvfs;

use crate::application::ports::HostProbe;
use crate::domain::disk::DiskUsage;

const KVM_DEVICE: &str = "/dev/kvm";

/// statvfs(2)로 파일시스템 사용량을 읽는 어댑터.
pub struct NixHostProbe;

impl HostProbe for NixHostProbe {
    fn disk_usage(&self, path: &Path) -> Result<DiskUsage> {
        let stat = statvfs(path)
            .with_context(|| format!("failed to query filesystem of {}", path.display()))?;

        let fragment = stat.fragment_size() as u64;
        let total = stat.blocks() as u64 * fragment;
        let free = stat.blocks_available() as u64 * fragment;
        let used = total.saturating_sub(stat.blocks_free() as u64 * fragment);
        Ok(DiskUsage { total, used, free })
    }

    fn virtualization_available(&self) -> bool {
        Path::new(KVM_DEVICE).exists()
    }
}
