use std::io;
use std::path::Path;
use std::process::Stdio;

use tokio::process::Child;
use tokio::process::Command;

/// Asks tools that honour it (chalk, npm, vite, ...) to keep ANSI colours even
/// though stdout is a pipe.
const FORCE_COLOR_ENV_VAR: &str = "FORCE_COLOR";

#[cfg(unix)]
const SHELL_PROGRAM: &str = "/bin/sh";
#[cfg(unix)]
const SHELL_COMMAND_FLAG: &str = "-c";

#[cfg(windows)]
const SHELL_PROGRAM: &str = "cmd.exe";
#[cfg(windows)]
const SHELL_COMMAND_FLAG: &str = "/C";

/// Spawns `command_line` through the platform shell in `cwd`.
///
/// The shell does all tokenization, so pipes, redirects and globbing work as
/// typed. No sanitization is applied. stdin is closed and both output streams
/// are piped. `kill_on_drop` covers only the shell itself; descendants it
/// starts are not tracked.
pub(crate) fn spawn_shell_child(command_line: &str, cwd: &Path) -> io::Result<Child> {
    tracing::debug!(
        shell = SHELL_PROGRAM,
        cwd = %cwd.display(),
        "spawning shell command"
    );
    let mut cmd = Command::new(SHELL_PROGRAM);
    cmd.arg(SHELL_COMMAND_FLAG)
        .arg(command_line)
        .current_dir(cwd)
        .env(FORCE_COLOR_ENV_VAR, "1")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    cmd.spawn()
}
