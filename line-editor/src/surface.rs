use std::io;

/// Where the editor draws. Text may carry ANSI escape sequences and is
/// passed through untouched.
pub trait Surface {
    fn write(&mut self, text: &str) -> io::Result<()>;

    /// Wipes the visible screen and homes the cursor.
    fn clear(&mut self) -> io::Result<()>;

    fn write_line(&mut self, text: &str) -> io::Result<()> {
        self.write(text)?;
        self.write("\r\n")
    }
}

/// In-memory surface that records everything drawn on it.
///
/// A clear is recorded as the equivalent `ESC [ H ESC [ 2 J` so the transcript
/// can be replayed through a terminal emulator.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    text: String,
    clears: usize,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn clears(&self) -> usize {
        self.clears
    }

    /// Returns and forgets what has been drawn so far.
    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.text)
    }
}

impl Surface for Transcript {
    fn write(&mut self, text: &str) -> io::Result<()> {
        self.text.push_str(text);
        Ok(())
    }

    fn clear(&mut self) -> io::Result<()> {
        self.clears += 1;
        self.text.push_str("\u{1b}[H\u{1b}[2J");
        Ok(())
    }
}
