//! Domain layer
//! 세션 상태, 명령 해석 규칙, 작업 디렉터리 구조, 외부 작업 모델.

pub mod command;
pub mod disk;
pub mod error;
pub mod layout;
pub mod operation;
pub mod session;
pub mod stream;
