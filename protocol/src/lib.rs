//! Wire types shared by the terminal HTTP route and its clients.

mod terminal;

pub use terminal::COMMAND_REQUIRED_MESSAGE;
pub use terminal::EXECUTION_FAILED_MESSAGE;
pub use terminal::ErrorResponse;
pub use terminal::ExecuteCommandRequest;
pub use terminal::ExecuteCommandResponse;
pub use terminal::TERMINAL_ROUTE;
pub use terminal::TIMEOUT_EXIT_CODE;
pub use terminal::terminal_path;
