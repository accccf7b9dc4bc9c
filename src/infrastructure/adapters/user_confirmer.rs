//! 사용자 확인 입력 포트 구현 어댑터.

use std::io::{self, Write};

use anyhow::Result;

use crate::application::ports::UserConfirmer;

/// stdin으로 y/yes 확인을 받는 어댑터.
pub struct StdinConfirmer;

impl UserConfirmer for StdinConfirmer {
    fn confirm(&self, message: &str) -> Result<bool> {
        println!("{message}");
        print!("continue? (y/N): ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        Ok(is_affirmative(&input))
    }
}

/// 항상 거절하는 확인 어댑터. 입력을 받을 수 없는 one-shot 실행에서 쓴다.
pub struct DenyConfirmer;

impl UserConfirmer for DenyConfirmer {
    fn confirm(&self, message: &str) -> Result<bool> {
        tracing::warn!("declining without prompt: {message}");
        Ok(false)
    }
}

pub(crate) fn is_affirmative(input: &str) -> bool {
    matches!(input.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
