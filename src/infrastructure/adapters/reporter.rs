//! 콘솔 리포터 포트 구현 어댑터.

use std::io::{self, IsTerminal};

use crate::application::ports::Reporter;

/// 콘솔 전용 리포터 어댑터. stdout이 TTY일 때만 ANSI 색을 입힌다.
pub struct ConsoleReporter {
    interactive: bool,
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self {
            interactive: io::stdout().is_terminal(),
        }
    }

    fn paint(&self, text: &str, ansi: &str) -> String {
        paint(text, ansi, self.interactive)
    }
}

impl Reporter for ConsoleReporter {
    fn section(&self, name: &str) {
        println!();
        println!("{}", self.paint(&format!("==================== {name} ===================="), "1;36"));
    }

    fn kv(&self, key: &str, value: &str) {
        println!("{:<12}: {}", key, value);
    }

    fn status(&self, scope: &str, message: &str) {
        println!("[{}] {}", self.paint(&format!("{scope:<8}"), "1;33"), message);
    }

    fn success(&self, message: &str) {
        println!("{} {}", self.paint("ok", "1;32"), message);
    }

    fn warn(&self, message: &str) {
        println!("{} {}", self.paint("warning:", "1;31"), message);
    }

    fn raw(&self, line: &str) {
        println!("{}", line);
    }
}

/// REPL 화면과 리포터가 같은 색 규칙을 쓰도록 공유한다.
pub fn paint(text: &str, ansi: &str, interactive: bool) -> String {
    if interactive {
        format!("\x1b[{ansi}m{text}\x1b[0m")
    } else {
        text.to_string()
    }
}
