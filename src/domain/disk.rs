//! 디스크 여유 공간 분류 규칙.

use serde::{Deserialize, Serialize};

pub const GIB: u64 = 1024 * 1024 * 1024;
/// 이 값 미만이면 경고(비차단).
pub const LOW_SPACE_BYTES: u64 = 10 * GIB;
/// 이 값 미만이면 정책에 따라 차단.
pub const CRITICAL_SPACE_BYTES: u64 = 5 * GIB;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DiskUsage {
    pub total: u64,
    pub used: u64,
    pub free: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiskLevel {
    Sufficient,
    Low,
    Critical,
}

impl DiskUsage {
    pub fn level(&self) -> DiskLevel {
        classify_free_space(self.free)
    }

    pub fn free_percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.free as f64 / self.total as f64 * 100.0
    }
}

pub fn classify_free_space(free: u64) -> DiskLevel {
    if free < CRITICAL_SPACE_BYTES {
        DiskLevel::Critical
    } else if free < LOW_SPACE_BYTES {
        DiskLevel::Low
    } else {
        DiskLevel::Sufficient
    }
}

pub fn to_gib(bytes: u64) -> f64 {
    bytes as f64 / GIB as f64
}

/// 임계 수준에서 작업을 계속할지 결정하는 정책.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LowSpacePolicy {
    /// 사용자 확인 포트에 묻는다.
    #[default]
    Ask,
    Proceed,
    Abort,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_are_exact() {
        assert_eq!(classify_free_space(0), DiskLevel::Critical);
        assert_eq!(classify_free_space(5 * GIB - 1), DiskLevel::Critical);
        assert_eq!(classify_free_space(5 * GIB), DiskLevel::Low);
        assert_eq!(classify_free_space(10 * GIB - 1), DiskLevel::Low);
        assert_eq!(classify_free_space(10 * GIB), DiskLevel::Sufficient);
        assert_eq!(classify_free_space(200 * GIB), DiskLevel::Sufficient);
    }

    #[test]
    fn percent_handles_empty_filesystem() {
        let usage = DiskUsage {
            total: 0,
            used: 0,
            free: 0,
        };
        assert_eq!(usage.free_percent(), 0.0);

        let usage = DiskUsage {
            total: 100 * GIB,
            used: 75 * GIB,
            free: 25 * GIB,
        };
        assert!((usage.free_percent() - 25.0).abs() < f64::EPSILON);
        assert_eq!(usage.level(), DiskLevel::Sufficient);
    }
}
