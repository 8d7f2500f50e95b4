//! Client-side line discipline: turns raw terminal input into an editable
//! command line with history recall, and renders command results.

mod editor;
mod history;
mod input;
mod surface;

pub use editor::CommandOutcome;
pub use editor::DEFAULT_PROMPT;
pub use editor::DEFAULT_TITLE;
pub use editor::EditorConfig;
pub use editor::FAILURE_LINE;
pub use editor::LineEditor;
pub use editor::SessionState;
pub use editor::Submission;
pub use history::History;
pub use history::Recall;
pub use input::InputParser;
pub use input::InputToken;
pub use surface::Surface;
pub use surface::Transcript;
