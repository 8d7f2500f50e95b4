use serde::Deserialize;
use serde::Serialize;
use ts_rs::TS;

/// Route served by the terminal endpoint. `{project_id}` is the only path
/// parameter.
pub const TERMINAL_ROUTE: &str = "/api/projects/{project_id}/terminal";

/// Exit code reported when the command was killed by the execution deadline.
/// Real exit codes are never negative, so the value cannot collide.
pub const TIMEOUT_EXIT_CODE: i32 = -1;

pub const COMMAND_REQUIRED_MESSAGE: &str = "Command is required";
pub const EXECUTION_FAILED_MESSAGE: &str = "Failed to execute command";

/// Body of `POST /api/projects/{project_id}/terminal`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ExecuteCommandRequest {
    #[serde(default)]
    #[ts(optional)]
    pub command: Option<String>,
}

impl ExecuteCommandRequest {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: Some(command.into()),
        }
    }

    /// The command text, if present and not blank. The text is returned
    /// untrimmed: the shell receives exactly what the user typed.
    pub fn command_text(&self) -> Option<&str> {
        self.command
            .as_deref()
            .filter(|command| !command.trim().is_empty())
    }
}

/// Successful response. `error` carries the captured stderr, not a
/// transport-level failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ExecuteCommandResponse {
    pub output: String,
    pub error: String,
    pub exit_code: i32,
}

impl ExecuteCommandResponse {
    pub fn timed_out(&self) -> bool {
        self.exit_code == TIMEOUT_EXIT_CODE
    }
}

/// Body of every 4xx/5xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }

    pub fn command_required() -> Self {
        Self::new(COMMAND_REQUIRED_MESSAGE)
    }

    pub fn execution_failed() -> Self {
        Self::new(EXECUTION_FAILED_MESSAGE)
    }
}

/// Concrete request path for `project_id`. The identifier is
/// percent-encoded so it always lands in a single path segment.
pub fn terminal_path(project_id: &str) -> String {
    TERMINAL_ROUTE.replace("{project_id}", &urlencoding::encode(project_id))
}
