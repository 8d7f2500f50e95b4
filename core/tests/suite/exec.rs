#![cfg(unix)]

use std::time::Duration;

use pretty_assertions::assert_eq;
use tempfile::TempDir;
use webterm_core::CommandExecutor;
use webterm_core::ExecutionRequest;
use webterm_core::ExitOutcome;
use webterm_core::ProjectsRoot;
use webterm_core::TIMEOUT_MARKER;

const PROJECT: &str = "demo";

fn projects_with_demo() -> TempDir {
    let root = TempDir::new().expect("projects root");
    std::fs::create_dir(root.path().join(PROJECT)).expect("project dir");
    root
}

fn executor(root: &TempDir) -> CommandExecutor {
    CommandExecutor::new(ProjectsRoot::new(root.path()))
}

#[tokio::test]
async fn echo_hello_captures_stdout() {
    let root = projects_with_demo();
    let result = executor(&root)
        .execute(&ExecutionRequest::new("echo hello", PROJECT))
        .await;

    assert_eq!(result.stdout, "hello\n");
    assert_eq!(result.stderr, "");
    assert_eq!(result.exit, ExitOutcome::Exited(0));
}

#[tokio::test]
async fn stderr_and_exit_code_are_kept_separate() {
    let root = projects_with_demo();
    let result = executor(&root)
        .execute(&ExecutionRequest::new(
            "echo visible; echo oops 1>&2; exit 3",
            PROJECT,
        ))
        .await;

    assert_eq!(result.stdout, "visible\n");
    assert_eq!(result.stderr, "oops\n");
    assert_eq!(result.exit, ExitOutcome::Exited(3));
}

#[tokio::test]
async fn shell_pipes_and_redirects_are_preserved() {
    let root = projects_with_demo();
    let executor = executor(&root);

    let piped = executor
        .execute(&ExecutionRequest::new("printf 'a\\nb\\nc\\n' | wc -l", PROJECT))
        .await;
    assert_eq!(piped.stdout.trim(), "3");

    let redirected = executor
        .execute(&ExecutionRequest::new(
            "echo saved > note.txt && cat note.txt",
            PROJECT,
        ))
        .await;
    assert_eq!(redirected.stdout, "saved\n");
    assert!(root.path().join(PROJECT).join("note.txt").exists());
}

#[tokio::test]
async fn runs_inside_the_project_directory() {
    let root = projects_with_demo();
    std::fs::write(root.path().join(PROJECT).join("marker.txt"), "here").expect("marker");

    let result = executor(&root)
        .execute(&ExecutionRequest::new("cat marker.txt", PROJECT))
        .await;

    assert_eq!(result.stdout, "here");
    assert_eq!(result.exit, ExitOutcome::Exited(0));
}

#[tokio::test]
async fn requests_colorized_output() {
    let root = projects_with_demo();
    let result = executor(&root)
        .execute(&ExecutionRequest::new("printf %s \"$FORCE_COLOR\"", PROJECT))
        .await;

    assert_eq!(result.stdout, "1");
}

#[tokio::test]
async fn unknown_program_reports_failure_in_stderr() {
    let root = projects_with_demo();
    let result = executor(&root)
        .execute(&ExecutionRequest::new("nonexistent-binary-xyz", PROJECT))
        .await;

    assert_eq!(result.stdout, "");
    assert_ne!(result.exit.code(), 0);
    assert!(
        result.stderr.contains("nonexistent-binary-xyz"),
        "stderr should name the missing program: {:?}",
        result.stderr
    );
}

#[tokio::test]
async fn missing_project_directory_surfaces_as_spawn_failure() {
    let root = projects_with_demo();
    let result = executor(&root)
        .execute(&ExecutionRequest::new("echo never", "does-not-exist"))
        .await;

    assert_eq!(result.stdout, "");
    assert_eq!(result.exit, ExitOutcome::Exited(127));
    assert!(result.stderr.contains("Failed to start command"));
    assert!(result.stderr.contains("does-not-exist"));
}

#[tokio::test]
async fn deadline_kills_command_and_keeps_partial_output() {
    let root = projects_with_demo();
    let executor = executor(&root).with_timeout(Duration::from_millis(500));

    let result = executor
        .execute(&ExecutionRequest::new("echo started; sleep 5", PROJECT))
        .await;

    assert_eq!(result.exit, ExitOutcome::TimedOut);
    assert_eq!(result.exit.code(), -1);
    assert_eq!(result.stdout, "started\n");
    assert!(result.stderr.ends_with(TIMEOUT_MARKER));
    assert!(result.stderr.contains("timed out"));
    assert!(
        result.duration < Duration::from_secs(4),
        "timeout should not wait for the sleep: {:?}",
        result.duration
    );
}

#[tokio::test]
async fn command_finishing_under_deadline_keeps_real_exit_code() {
    let root = projects_with_demo();
    let executor = executor(&root).with_timeout(Duration::from_secs(5));

    let result = executor
        .execute(&ExecutionRequest::new("sleep 0.2; exit 4", PROJECT))
        .await;

    assert_eq!(result.exit, ExitOutcome::Exited(4));
    assert!(!result.stderr.contains(TIMEOUT_MARKER));
}

#[tokio::test]
async fn large_output_on_both_streams_does_not_block() {
    let root = projects_with_demo();
    let command = "head -c 200000 /dev/zero | tr '\\000' a; \
                   head -c 200000 /dev/zero | tr '\\000' b 1>&2";

    let result = executor(&root)
        .execute(&ExecutionRequest::new(command, PROJECT))
        .await;

    assert_eq!(result.exit, ExitOutcome::Exited(0));
    assert_eq!(result.stdout.len(), 200_000);
    assert_eq!(result.stderr.len(), 200_000);
    assert!(result.stdout.chars().all(|c| c == 'a'));
    assert!(result.stderr.chars().all(|c| c == 'b'));
}

#[tokio::test]
async fn signal_death_is_reported_as_shell_exit_code() {
    let root = projects_with_demo();
    let result = executor(&root)
        .execute(&ExecutionRequest::new("kill -9 $$", PROJECT))
        .await;

    assert_eq!(result.exit, ExitOutcome::Exited(137));
}

#[tokio::test]
async fn concurrent_requests_do_not_share_buffers() {
    let root = projects_with_demo();
    let executor = executor(&root);
    let first = ExecutionRequest::new("sleep 0.2; echo first", PROJECT);
    let second = ExecutionRequest::new("echo second", PROJECT);

    let (first, second) = tokio::join!(executor.execute(&first), executor.execute(&second));

    assert_eq!(first.stdout, "first\n");
    assert_eq!(second.stdout, "second\n");
}
