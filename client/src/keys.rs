//! Translation from crossterm events to the byte sequences a terminal
//! emulator would send for the same keys.

use crossterm::event::Event;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;

/// Keys that map to a fixed sequence regardless of modifiers.
const FIXED_KEYS: &[(KeyCode, &str)] = &[
    (KeyCode::Enter, "\r"),
    (KeyCode::Backspace, "\u{7f}"),
    (KeyCode::Tab, "\t"),
    (KeyCode::Up, "\u{1b}[A"),
    (KeyCode::Down, "\u{1b}[B"),
    (KeyCode::Right, "\u{1b}[C"),
    (KeyCode::Left, "\u{1b}[D"),
    (KeyCode::Home, "\u{1b}[H"),
    (KeyCode::End, "\u{1b}[F"),
    (KeyCode::Insert, "\u{1b}[2~"),
    (KeyCode::Delete, "\u{1b}[3~"),
    (KeyCode::PageUp, "\u{1b}[5~"),
    (KeyCode::PageDown, "\u{1b}[6~"),
];

pub fn event_to_input(event: &Event) -> Option<String> {
    match event {
        Event::Key(key) => key_to_input(key),
        Event::Paste(text) => Some(paste_to_input(text)),
        _ => None,
    }
}

/// Bytes for one key press. Releases and keys with no terminal encoding
/// yield `None`, as does a bare Esc so no lone ESC reaches the line editor.
pub fn key_to_input(key: &KeyEvent) -> Option<String> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    match key.code {
        KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::CONTROL) => {
            control_char(c).map(String::from)
        }
        KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::ALT) => {
            Some(format!("\u{1b}{c}"))
        }
        KeyCode::Char(c) => Some(c.to_string()),
        code => FIXED_KEYS
            .iter()
            .find(|(key_code, _)| *key_code == code)
            .map(|(_, sequence)| (*sequence).to_string()),
    }
}

/// Ctrl+D on an idle, empty line leaves the client.
pub fn is_exit_key(key: &KeyEvent) -> bool {
    key.kind != KeyEventKind::Release
        && key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('d') | KeyCode::Char('D'))
}

/// Pasted newlines arrive as carriage returns, like typed Enter.
fn paste_to_input(text: &str) -> String {
    text.replace("\r\n", "\r").replace('\n', "\r")
}

fn control_char(c: char) -> Option<char> {
    match c.to_ascii_lowercase() {
        letter @ 'a'..='z' => Some(char::from((letter as u8) & 0x1f)),
        '@' | ' ' => Some('\0'),
        '\\' => Some('\u{1c}'),
        ']' => Some('\u{1d}'),
        '^' => Some('\u{1e}'),
        '_' => Some('\u{1f}'),
        _ => None,
    }
}
