//! Interface layer
//! 사용자 입력(CLI 인자/REPL)을 애플리케이션 계층 호출로 연결한다.

pub mod cli;
