//! 애플리케이션 포트를 실제 인프라 구현체로 연결하는 어댑터 계층.

mod config_repository;
mod host_probe;
mod reporter;
mod user_confirmer;

pub use config_repository::JsonConfigRepository;
pub use host_probe::NixHostProbe;
pub use reporter::{ConsoleReporter, paint};
pub use user_confirmer::{DenyConfirmer, StdinConfirmer};
