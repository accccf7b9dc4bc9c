//! Application layer
//! 세션 컨트롤러를 정의하고 포트(추상 인터페이스)를 통해 인프라를 사용한다.

pub mod config;
pub mod controller;
pub mod ports;
