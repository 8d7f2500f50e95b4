//! Terminal client: drives a [`LineEditor`] against a remote command endpoint.
//!
//! [`LineEditor`]: webterm_line_editor::LineEditor

pub mod keys;
mod session;
mod surface;
mod transport;

pub use session::PendingExecution;
pub use session::TerminalSession;
pub use surface::RawModeGuard;
pub use surface::TerminalSurface;
pub use transport::CommandTransport;
pub use transport::HttpTransport;
pub use transport::TransportError;
