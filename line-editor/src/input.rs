/// One editing action decoded from the input stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputToken {
    Insert(char),
    Submit,
    Backspace,
    CursorLeft,
    CursorRight,
    HistoryPrev,
    HistoryNext,
    Interrupt,
    ClearScreen,
    /// A control byte or escape sequence with no binding.
    Ignored,
}

/// Single-byte controls with a binding. Everything else below 0x20 is
/// ignored.
const CONTROL_KEYS: &[(char, InputToken)] = &[
    ('\r', InputToken::Submit),
    ('\u{7f}', InputToken::Backspace),
    ('\u{8}', InputToken::Backspace),
    ('\u{3}', InputToken::Interrupt),
    ('\u{c}', InputToken::ClearScreen),
];

/// Final bytes of `ESC [ x` and `ESC O x` cursor keys.
const CURSOR_KEYS: &[(char, InputToken)] = &[
    ('A', InputToken::HistoryPrev),
    ('B', InputToken::HistoryNext),
    ('C', InputToken::CursorRight),
    ('D', InputToken::CursorLeft),
];

const ESC: char = '\u{1b}';

/// Longest CSI parameter run we buffer before giving up on a sequence.
const MAX_CSI_PARAMS: usize = 16;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum ParserState {
    #[default]
    Ground,
    Escape,
    Csi {
        params: String,
    },
    Ss3,
}

/// Incremental decoder for terminal input.
///
/// State survives between [`InputParser::feed`] calls, so an escape sequence
/// split across two chunks decodes the same as one delivered whole.
#[derive(Debug, Clone, Default)]
pub struct InputParser {
    state: ParserState,
}

impl InputParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while the parser sits inside an unfinished escape sequence.
    pub fn in_sequence(&self) -> bool {
        self.state != ParserState::Ground
    }

    pub fn feed(&mut self, data: &str) -> Vec<InputToken> {
        data.chars().filter_map(|ch| self.push(ch)).collect()
    }

    /// Advances by one character. Returns `None` while a sequence is still
    /// incomplete.
    pub fn push(&mut self, ch: char) -> Option<InputToken> {
        match std::mem::take(&mut self.state) {
            ParserState::Ground => self.ground(ch),
            ParserState::Escape => match ch {
                '[' => {
                    self.state = ParserState::Csi {
                        params: String::new(),
                    };
                    None
                }
                'O' => {
                    self.state = ParserState::Ss3;
                    None
                }
                ESC => {
                    self.state = ParserState::Escape;
                    Some(InputToken::Ignored)
                }
                // A lone ESC or an Alt prefix is dropped; the key itself stands.
                _ => self.ground(ch),
            },
            ParserState::Csi { mut params } => match ch {
                '\u{40}'..='\u{7e}' if params.is_empty() => Some(lookup(CURSOR_KEYS, ch)),
                '\u{40}'..='\u{7e}' => Some(InputToken::Ignored),
                '\u{20}'..='\u{3f}' if params.len() < MAX_CSI_PARAMS => {
                    params.push(ch);
                    self.state = ParserState::Csi { params };
                    None
                }
                _ if is_control(ch) => self.ground(ch),
                _ => Some(InputToken::Ignored),
            },
            ParserState::Ss3 if is_control(ch) => self.ground(ch),
            ParserState::Ss3 => Some(lookup(CURSOR_KEYS, ch)),
        }
    }

    fn ground(&mut self, ch: char) -> Option<InputToken> {
        if ch == ESC {
            self.state = ParserState::Escape;
            return None;
        }
        if is_control(ch) {
            return Some(lookup(CONTROL_KEYS, ch));
        }
        Some(InputToken::Insert(ch))
    }
}

/// C0 controls (ESC included) and DEL.
fn is_control(ch: char) -> bool {
    (ch as u32) < 0x20 || ch == '\u{7f}'
}

fn lookup(table: &[(char, InputToken)], ch: char) -> InputToken {
    table
        .iter()
        .find(|(key, _)| *key == ch)
        .map(|(_, token)| *token)
        .unwrap_or(InputToken::Ignored)
}
