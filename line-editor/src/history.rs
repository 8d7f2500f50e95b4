/// What a step toward newer history produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recall<'a> {
    Entry(&'a str),
    /// Stepped past the newest entry back onto the line being edited.
    Live,
    /// Not browsing; nothing to do.
    Unchanged,
}

/// In-memory log of submitted commands, oldest first, with a browse cursor.
///
/// The cursor counts back from the newest entry: `Some(0)` is the most recent
/// command, `None` means the live line is shown.
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<String>,
    cursor: Option<usize>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `entry` and stops browsing.
    pub fn push(&mut self, entry: impl Into<String>) {
        self.entries.push(entry.into());
        self.cursor = None;
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// The cursor as a signed index, `-1` when not browsing.
    pub fn cursor_index(&self) -> isize {
        self.cursor
            .and_then(|cursor| isize::try_from(cursor).ok())
            .unwrap_or(-1)
    }

    pub fn is_browsing(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn reset_cursor(&mut self) {
        self.cursor = None;
    }

    /// Steps one entry further into the past. Returns `None` (and leaves the
    /// cursor where it is) when already at the oldest entry.
    pub fn older(&mut self) -> Option<&str> {
        let next = self.cursor.map_or(0, |cursor| cursor + 1);
        if next >= self.entries.len() {
            return None;
        }
        self.cursor = Some(next);
        self.entry_at(next)
    }

    pub fn newer(&mut self) -> Recall<'_> {
        match self.cursor {
            None => Recall::Unchanged,
            Some(0) => {
                self.cursor = None;
                Recall::Live
            }
            Some(cursor) => {
                let next = cursor - 1;
                self.cursor = Some(next);
                match self.entry_at(next) {
                    Some(entry) => Recall::Entry(entry),
                    None => Recall::Unchanged,
                }
            }
        }
    }

    fn entry_at(&self, back: usize) -> Option<&str> {
        let index = self.entries.len().checked_sub(back + 1)?;
        self.entries.get(index).map(String::as_str)
    }
}
