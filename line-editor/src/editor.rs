use std::io;

use tracing::debug;
use tracing::warn;
use unicode_width::UnicodeWidthChar;
use webterm_protocol::ExecuteCommandResponse;

use crate::history::History;
use crate::history::Recall;
use crate::input::InputParser;
use crate::input::InputToken;
use crate::surface::Surface;

pub const DEFAULT_PROMPT: &str = "$ ";
pub const DEFAULT_TITLE: &str = "webterm";
pub const FAILURE_LINE: &str = "Error: Failed to execute command";

const BANNER_HINT: &str = "Type commands and press Enter to execute.";
const ERASE_LINE: &str = "\r\u{1b}[K";
const CURSOR_RIGHT: &str = "\u{1b}[C";
const GREEN: &str = "\u{1b}[32m";
const RED: &str = "\u{1b}[31m";
const RESET: &str = "\u{1b}[0m";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    pub prompt: String,
    /// Shown in green on the first banner line.
    pub title: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    /// A command was submitted and its result has not arrived yet.
    AwaitingResult,
}

/// A command line the user committed with Enter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub command: String,
}

/// How a submitted command ended, from the editor's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Completed(ExecuteCommandResponse),
    /// The request never produced a result. The message is logged, never
    /// shown.
    Failed(String),
}

/// Single-line editor with history recall.
///
/// At most one submission is outstanding. While it is, every input token is
/// decoded and dropped, and no editing state changes.
#[derive(Debug)]
pub struct LineEditor {
    config: EditorConfig,
    parser: InputParser,
    buffer: Vec<char>,
    cursor: usize,
    /// Line being edited before history browsing started.
    draft: Option<(Vec<char>, usize)>,
    history: History,
    state: SessionState,
    pending: Option<String>,
}

impl Default for LineEditor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl LineEditor {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            config,
            parser: InputParser::new(),
            buffer: Vec::new(),
            cursor: 0,
            draft: None,
            history: History::new(),
            state: SessionState::Idle,
            pending: None,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn buffer(&self) -> String {
        self.buffer.iter().collect()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Command waiting on a result, if any.
    pub fn pending(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    /// Draws the banner and the first prompt.
    pub fn start(&self, surface: &mut dyn Surface) -> io::Result<()> {
        surface.write_line(&format!("{GREEN}{}{RESET}", self.config.title))?;
        surface.write_line(BANNER_HINT)?;
        surface.write_line("")?;
        surface.write(&self.config.prompt)
    }

    /// Feeds a chunk of raw input. Returns the command to run when the chunk
    /// contained an Enter on a non-blank line; input after that Enter is
    /// dropped.
    pub fn handle_input(
        &mut self,
        data: &str,
        surface: &mut dyn Surface,
    ) -> io::Result<Option<Submission>> {
        let mut submission = None;
        for ch in data.chars() {
            let Some(token) = self.parser.push(ch) else {
                continue;
            };
            if self.state == SessionState::AwaitingResult {
                continue;
            }
            if let Some(submitted) = self.apply(token, surface)? {
                submission = Some(submitted);
            }
        }
        Ok(submission)
    }

    /// Renders the result of the outstanding submission and returns to the
    /// prompt. Ignored when nothing is outstanding.
    pub fn finish(
        &mut self,
        outcome: CommandOutcome,
        surface: &mut dyn Surface,
    ) -> io::Result<()> {
        let Some(command) = self.pending.take() else {
            debug!("dropping command outcome with no submission outstanding");
            return Ok(());
        };
        match outcome {
            CommandOutcome::Completed(response) => {
                render_output(&response.output, surface)?;
                render_error(&response.error, surface)?;
                self.history.push(command);
            }
            CommandOutcome::Failed(message) => {
                warn!("command {command:?} failed to execute: {message}");
                surface.write_line(&format!("{RED}{FAILURE_LINE}{RESET}"))?;
            }
        }
        self.reset_line();
        self.state = SessionState::Idle;
        surface.write(&self.config.prompt)
    }

    fn apply(
        &mut self,
        token: InputToken,
        surface: &mut dyn Surface,
    ) -> io::Result<Option<Submission>> {
        match token {
            InputToken::Insert(ch) => {
                self.buffer.insert(self.cursor, ch);
                self.cursor += 1;
                self.redraw(surface)?;
            }
            InputToken::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    self.buffer.remove(self.cursor);
                    self.redraw(surface)?;
                }
            }
            InputToken::CursorLeft => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    move_left(surface, char_width(self.buffer[self.cursor]))?;
                }
            }
            InputToken::CursorRight => {
                if self.cursor < self.buffer.len() {
                    let width = char_width(self.buffer[self.cursor]);
                    self.cursor += 1;
                    if width > 0 {
                        surface.write(&CURSOR_RIGHT.repeat(width))?;
                    }
                }
            }
            InputToken::HistoryPrev => {
                let browsing = self.history.is_browsing();
                if let Some(entry) = self.history.older() {
                    let entry: Vec<char> = entry.chars().collect();
                    if !browsing {
                        self.draft = Some((std::mem::take(&mut self.buffer), self.cursor));
                    }
                    self.cursor = entry.len();
                    self.buffer = entry;
                    self.redraw(surface)?;
                }
            }
            InputToken::HistoryNext => match self.history.newer() {
                Recall::Entry(entry) => {
                    self.buffer = entry.chars().collect();
                    self.cursor = self.buffer.len();
                    self.redraw(surface)?;
                }
                Recall::Live => {
                    let (buffer, cursor) = self.draft.take().unwrap_or_default();
                    self.buffer = buffer;
                    self.cursor = cursor.min(self.buffer.len());
                    self.redraw(surface)?;
                }
                Recall::Unchanged => {}
            },
            InputToken::Interrupt => {
                self.reset_line();
                surface.write("^C\r\n")?;
                surface.write(&self.config.prompt)?;
            }
            InputToken::ClearScreen => {
                surface.clear()?;
                surface.write(&self.config.prompt)?;
                surface.write(&self.buffer.iter().collect::<String>())?;
                move_left(surface, self.width_after_cursor())?;
            }
            InputToken::Submit => return self.submit(surface),
            InputToken::Ignored => {}
        }
        Ok(None)
    }

    fn submit(&mut self, surface: &mut dyn Surface) -> io::Result<Option<Submission>> {
        let command: String = self.buffer.iter().collect();
        surface.write("\r\n")?;
        if command.trim().is_empty() {
            self.reset_line();
            surface.write(&self.config.prompt)?;
            return Ok(None);
        }
        debug!("submitting command {command:?}");
        self.state = SessionState::AwaitingResult;
        self.pending = Some(command.clone());
        Ok(Some(Submission { command }))
    }

    fn reset_line(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
        self.draft = None;
        self.history.reset_cursor();
    }

    /// Erases the visible line and redraws prompt and buffer, leaving the
    /// terminal cursor over the logical cursor.
    fn redraw(&self, surface: &mut dyn Surface) -> io::Result<()> {
        let line: String = self.buffer.iter().collect();
        surface.write(&format!("{ERASE_LINE}{}{line}", self.config.prompt))?;
        move_left(surface, self.width_after_cursor())
    }

    fn width_after_cursor(&self) -> usize {
        self.buffer[self.cursor..].iter().copied().map(char_width).sum()
    }
}

fn char_width(ch: char) -> usize {
    ch.width().unwrap_or(0)
}

fn move_left(surface: &mut dyn Surface, columns: usize) -> io::Result<()> {
    if columns == 0 {
        return Ok(());
    }
    surface.write(&format!("\u{1b}[{columns}D"))
}

/// Writes each stdout line followed by CRLF. The empty fragment after a
/// trailing newline is not written.
fn render_output(output: &str, surface: &mut dyn Surface) -> io::Result<()> {
    if output.is_empty() {
        return Ok(());
    }
    let lines: Vec<&str> = output.split('\n').collect();
    let last = lines.len() - 1;
    for (index, line) in lines.into_iter().enumerate() {
        if index == last && line.is_empty() {
            break;
        }
        surface.write_line(line)?;
    }
    Ok(())
}

/// Writes each non-blank stderr line in red.
fn render_error(error: &str, surface: &mut dyn Surface) -> io::Result<()> {
    for line in error.split('\n').filter(|line| !line.trim().is_empty()) {
        surface.write_line(&format!("{RED}{line}{RESET}"))?;
    }
    Ok(())
}
