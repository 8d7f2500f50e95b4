//! Server-side half of webterm: runs one shell command per request inside a
//! project directory and reports a single consolidated result.

pub mod config;
pub mod error;
pub mod exec;
pub mod project;
mod spawn;

pub use config::Config;
pub use config::ConfigOverrides;
pub use config::ConfigToml;
pub use error::Result;
pub use error::WebtermErr;
pub use exec::CommandExecutor;
pub use exec::DEFAULT_EXEC_TIMEOUT;
pub use exec::ExecutionRequest;
pub use exec::ExecutionResult;
pub use exec::ExitOutcome;
pub use exec::TIMEOUT_MARKER;
pub use project::ProjectsRoot;
