//! REPL 입력 처리기.
//! 입력 중 동사 추천/해석 힌트를 프롬프트 아래 한 줄에 실시간으로 표시한다.

use std::env;
use std::io::{self, IsTerminal, Write};

use anyhow::Result;
use crossterm::cursor;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::style::{Color, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, ClearType};
use crossterm::{execute, queue};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::domain::command::{Action, ParsedCommand, known_verbs, parse_command};

const HISTORY_LIMIT: usize = 200;

/// 히스토리를 가진 한 줄 편집기.
pub struct LineEditor {
    verbs: Vec<&'static str>,
    history: Vec<String>,
}

impl Default for LineEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl LineEditor {
    pub fn new() -> Self {
        Self {
            verbs: known_verbs(),
            history: Vec::new(),
        }
    }

    /// REPL 한 줄 입력을 읽는다. EOF(Ctrl-D)면 `None`.
    /// - TTY + 지원 터미널: raw mode 편집 + Tab 완성 + 히스토리
    /// - non-TTY/미지원 터미널: 일반 라인 입력
    pub fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        let line = if supports_interactive_input() {
            match self.read_line_interactive(prompt) {
                Ok(v) => v,
                Err(err) => {
                    tracing::debug!("interactive input unavailable: {err:#}");
                    read_line_fallback(prompt)?
                }
            }
        } else {
            read_line_fallback(prompt)?
        };

        if let Some(line) = &line {
            self.remember(line);
        }
        Ok(line)
    }

    fn remember(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() || self.history.last().map(String::as_str) == Some(line) {
            return;
        }
        self.history.push(line.to_string());
        if self.history.len() > HISTORY_LIMIT {
            self.history.remove(0);
        }
    }

    fn read_line_interactive(&self, prompt: &str) -> Result<Option<String>> {
        let mut stdout = io::stdout();
        let _guard = InputGuard::enter()?;

        let mut input = String::new();
        let mut cursor_chars = 0usize;
        // 히스토리 탐색 중인 위치와, 탐색 전 입력하던 내용
        let mut history_idx: Option<usize> = None;
        let mut draft = String::new();

        loop {
            render_line(&mut stdout, prompt, &input, cursor_chars, &self.verbs)?;

            let key = match event::read()? {
                Event::Paste(text) => {
                    for ch in text.chars().filter(|c| !c.is_control()) {
                        insert_char_at(&mut input, cursor_chars, ch);
                        cursor_chars += 1;
                    }
                    continue;
                }
                Event::Key(key) if key.kind == KeyEventKind::Press => key,
                _ => continue,
            };
            let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

            match key.code {
                KeyCode::Enter => {
                    finish_line(&mut stdout)?;
                    return Ok(Some(input));
                }
                KeyCode::Char('d') if ctrl => {
                    if input.is_empty() {
                        finish_line(&mut stdout)?;
                        return Ok(None);
                    }
                    if cursor_chars < input.chars().count() {
                        remove_char_at(&mut input, cursor_chars);
                    }
                }
                KeyCode::Char('c') if ctrl => {
                    // 현재 줄만 버린다. 종료는 quit/exit/Ctrl-D.
                    finish_line(&mut stdout)?;
                    return Ok(Some(String::new()));
                }
                KeyCode::Char('a') if ctrl => cursor_chars = 0,
                KeyCode::Char('e') if ctrl => cursor_chars = input.chars().count(),
                KeyCode::Char('u') if ctrl => {
                    let rest: String = input.chars().skip(cursor_chars).collect();
                    input = rest;
                    cursor_chars = 0;
                }
                KeyCode::Char(ch) => {
                    if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) {
                        insert_char_at(&mut input, cursor_chars, ch);
                        cursor_chars += 1;
                    }
                }
                KeyCode::Backspace => {
                    if cursor_chars > 0 {
                        remove_char_at(&mut input, cursor_chars - 1);
                        cursor_chars -= 1;
                    }
                }
                KeyCode::Delete => {
                    if cursor_chars < input.chars().count() {
                        remove_char_at(&mut input, cursor_chars);
                    }
                }
                KeyCode::Left => cursor_chars = cursor_chars.saturating_sub(1),
                KeyCode::Right => cursor_chars = (cursor_chars + 1).min(input.chars().count()),
                KeyCode::Home => cursor_chars = 0,
                KeyCode::End => cursor_chars = input.chars().count(),
                KeyCode::Tab => {
                    if cursor_chars == input.chars().count()
                        && let Some(completed) = complete_verb(&input, &self.verbs)
                    {
                        input = completed;
                        cursor_chars = input.chars().count();
                    }
                }
                KeyCode::Up => {
                    if self.history.is_empty() {
                        continue;
                    }
                    let next = match history_idx {
                        None => {
                            draft = input.clone();
                            self.history.len() - 1
                        }
                        Some(idx) => idx.saturating_sub(1),
                    };
                    history_idx = Some(next);
                    input = self.history[next].clone();
                    cursor_chars = input.chars().count();
                }
                KeyCode::Down => {
                    let Some(idx) = history_idx else {
                        continue;
                    };
                    if idx + 1 < self.history.len() {
                        history_idx = Some(idx + 1);
                        input = self.history[idx + 1].clone();
                    } else {
                        history_idx = None;
                        input = std::mem::take(&mut draft);
                    }
                    cursor_chars = input.chars().count();
                }
                _ => {}
            }
        }
    }
}

/// 확인/패턴 입력 같은 보조 프롬프트. 편집 기능 없이 한 줄을 읽는다.
pub fn prompt_line(prompt: &str) -> Result<Option<String>> {
    read_line_fallback(prompt)
}

fn supports_interactive_input() -> bool {
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        return false;
    }

    // dumb 터미널에서는 제어 시퀀스 기반 UI를 비활성화한다.
    if let Ok(term) = env::var("TERM")
        && term.eq_ignore_ascii_case("dumb")
    {
        return false;
    }

    true
}

fn read_line_fallback(prompt: &str) -> Result<Option<String>> {
    print!("{prompt}");
    io::stdout().flush()?;

    let mut line = String::new();
    let read = io::stdin().read_line(&mut line)?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(trim_newline(line)))
}

/// 첫 토큰을 알려진 동사로 완성한다. 후보가 하나면 공백까지 붙인다.
fn complete_verb(input: &str, verbs: &[&'static str]) -> Option<String> {
    if input.is_empty() || input.contains(char::is_whitespace) {
        return None;
    }

    let needle = input.to_ascii_lowercase();
    let candidates: Vec<&str> = verbs
        .iter()
        .copied()
        .filter(|v| v.starts_with(&needle))
        .collect();

    match candidates.as_slice() {
        [] => None,
        [only] => Some(format!("{only} ")),
        many => {
            let prefix = common_prefix(many);
            (prefix.len() > needle.len()).then(|| prefix.to_string())
        }
    }
}

fn common_prefix<'a>(words: &[&'a str]) -> &'a str {
    let Some(first) = words.first() else {
        return "";
    };
    let mut end = first.len();
    for word in &words[1..] {
        end = first
            .bytes()
            .zip(word.bytes())
            .take(end)
            .take_while(|(a, b)| a == b)
            .count();
    }
    &first[..end]
}

/// 프롬프트 아래에 표시할 힌트.
fn realtime_hint(input: &str, verbs: &[&'static str]) -> Option<(Color, String)> {
    let trimmed = input.trim_start();
    if trimmed.is_empty() {
        return Some((Color::DarkGrey, "type 'help' for commands · Tab completes".to_string()));
    }

    if !trimmed.contains(char::is_whitespace) {
        let needle = trimmed.to_ascii_lowercase();
        let candidates: Vec<&str> = verbs
            .iter()
            .copied()
            .filter(|v| v.starts_with(&needle))
            .collect();
        if candidates.is_empty() {
            return Some((Color::Red, format!("unknown command: {needle}")));
        }
        if !(candidates.len() == 1 && candidates[0] == needle) {
            return Some((Color::DarkGrey, candidates.join("  ")));
        }
    }

    let parsed = parse_command(trimmed)?;
    Some(match parsed.action {
        Action::Unrecognized => (Color::Red, format!("unknown command: {}", parsed.verb)),
        _ => (Color::Green, format!("enter: {}", describe(&parsed))),
    })
}

/// 해석 결과를 짧게 설명한다.
fn describe(cmd: &ParsedCommand) -> String {
    let joined = cmd.args.join(" ");
    match cmd.action {
        Action::Init => "initialize cosa".to_string(),
        Action::ForceInit => "initialize cosa with --force".to_string(),
        Action::Fetch => "fetch packages for the current stream".to_string(),
        Action::Build => "build the current stream".to_string(),
        Action::BuildStream => format!("init, switch, fetch and build '{joined}'"),
        Action::Status => "show build status".to_string(),
        Action::Help => "show help".to_string(),
        Action::Quit => "exit".to_string(),
        Action::Pull => "pull the cosa container image".to_string(),
        Action::Shell => "open cosa shell".to_string(),
        Action::Disk => "check disk space".to_string(),
        Action::Clean => "remove old builds".to_string(),
        Action::CleanAll => "remove old builds and prune containers".to_string(),
        Action::CleanDir => "wipe the working directory".to_string(),
        Action::Switch if cmd.args.is_empty() => "list streams".to_string(),
        Action::Switch => format!("switch to stream '{}'", cmd.args[0]),
        Action::ListStreams => "list streams".to_string(),
        Action::Refresh => "refresh remote branches".to_string(),
        Action::CurrentStream => "show the current stream".to_string(),
        Action::TestSummary => "show test readiness".to_string(),
        Action::KolaHelp => "show kola help".to_string(),
        Action::KolaList => "list kola tests".to_string(),
        Action::KolaRun if cmd.args.is_empty() => "choose kola tests to run".to_string(),
        Action::KolaRun => format!("kola run {joined}"),
        Action::KolaInteractive => "pick kola tests interactively".to_string(),
        Action::RunImage if cmd.args.is_empty() => "boot the latest build in QEMU".to_string(),
        Action::RunImage => format!("cosa run {joined}"),
        Action::Unrecognized => format!("unknown command: {}", cmd.verb),
    }
}

fn render_line(
    stdout: &mut io::Stdout,
    prompt: &str,
    input: &str,
    cursor_chars: usize,
    verbs: &[&'static str],
) -> Result<()> {
    let (w, _) = terminal::size().unwrap_or((120, 40));
    let width = (w as usize).max(20);
    let prompt_width = display_width(prompt);
    let available = width.saturating_sub(prompt_width + 1);
    let shown = tail_with_ellipsis_display(input, available);

    queue!(
        stdout,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        SetForegroundColor(Color::Cyan)
    )?;
    write!(stdout, "{prompt}")?;
    queue!(stdout, ResetColor)?;
    write!(stdout, "{shown}")?;

    // 힌트 줄은 매번 다시 그린다. 맨 아래 줄에서 첫 렌더 때만 한 줄 스크롤된다.
    write!(stdout, "\r\n")?;
    queue!(stdout, terminal::Clear(ClearType::CurrentLine))?;
    if let Some((color, hint)) = realtime_hint(input, verbs) {
        queue!(stdout, SetForegroundColor(color))?;
        write!(stdout, "{}", clip_line_display(&hint, width.saturating_sub(1)))?;
        queue!(stdout, ResetColor)?;
    }

    let col = prompt_cursor_col(input, cursor_chars, prompt_width, available);
    queue!(stdout, cursor::MoveUp(1), cursor::MoveToColumn(col as u16))?;
    stdout.flush()?;
    Ok(())
}

/// 힌트 줄을 지우고 다음 줄로 내려간다.
fn finish_line(stdout: &mut io::Stdout) -> Result<()> {
    execute!(
        stdout,
        cursor::MoveDown(1),
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        cursor::MoveUp(1)
    )?;
    write!(stdout, "\r\n")?;
    stdout.flush()?;
    Ok(())
}

fn prompt_cursor_col(input: &str, cursor_chars: usize, prompt_width: usize, available: usize) -> usize {
    if display_width(input) <= available {
        let before: String = input.chars().take(cursor_chars).collect();
        return prompt_width + display_width(&before);
    }
    // 넘치는 입력은 꼬리만 보여 주므로 커서를 끝에 둔다.
    prompt_width + display_width(&tail_with_ellipsis_display(input, available))
}

fn tail_with_ellipsis_display(text: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    if display_width(text) <= max_width {
        return text.to_string();
    }
    if max_width <= 3 {
        return ".".repeat(max_width);
    }

    let target = max_width - 3;
    let mut tail_rev = String::new();
    let mut used = 0usize;
    for ch in text.chars().rev() {
        let cw = char_display_width(ch);
        if used + cw > target {
            break;
        }
        tail_rev.push(ch);
        used += cw;
    }

    let tail: String = tail_rev.chars().rev().collect();
    format!("...{tail}")
}

fn clip_line_display(line: &str, max_width: usize) -> String {
    if display_width(line) <= max_width {
        return line.to_string();
    }
    if max_width <= 3 {
        return ".".repeat(max_width);
    }

    let mut out = String::new();
    let mut used = 0usize;
    let cap = max_width - 3;
    for ch in line.chars() {
        let cw = char_display_width(ch);
        if used + cw > cap {
            break;
        }
        out.push(ch);
        used += cw;
    }
    out.push_str("...");
    out
}

fn trim_newline(mut s: String) -> String {
    while matches!(s.chars().last(), Some('\n' | '\r')) {
        s.pop();
    }
    s
}

fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

fn char_display_width(ch: char) -> usize {
    UnicodeWidthChar::width(ch).unwrap_or(0)
}

struct InputGuard;

impl InputGuard {
    fn enter() -> Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for InputGuard {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        let _ = execute!(stdout, cursor::Show, ResetColor);
        let _ = terminal::disable_raw_mode();
        let _ = stdout.flush();
    }
}

fn insert_char_at(input: &mut String, char_idx: usize, ch: char) {
    let byte_idx = byte_index_at_char(input, char_idx);
    input.insert(byte_idx, ch);
}

fn remove_char_at(input: &mut String, char_idx: usize) {
    let start = byte_index_at_char(input, char_idx);
    let end = byte_index_at_char(input, char_idx + 1);
    if start < end && end <= input.len() {
        input.replace_range(start..end, "");
    }
}

fn byte_index_at_char(input: &str, char_idx: usize) -> usize {
    input
        .char_indices()
        .nth(char_idx)
        .map(|(idx, _)| idx)
        .unwrap_or(input.len())
}
