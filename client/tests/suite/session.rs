use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use webterm_client::HttpTransport;
use webterm_client::TerminalSession;
use webterm_line_editor::EditorConfig;
use webterm_line_editor::SessionState;
use webterm_line_editor::Transcript;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::body_json;
use wiremock::matchers::method;
use wiremock::matchers::path;

const PROJECT: &str = "demo";
const ENDPOINT: &str = "/api/projects/demo/terminal";

fn session_for(base: &str) -> TerminalSession<HttpTransport> {
    let base = Url::parse(base).expect("base url");
    TerminalSession::new(HttpTransport::new(base), PROJECT, EditorConfig::default())
}

fn started(base: &str) -> (TerminalSession<HttpTransport>, Transcript) {
    let session = session_for(base);
    let mut surface = Transcript::new();
    session.start(&mut surface).expect("banner");
    surface.take();
    (session, surface)
}

fn ok_body(output: &str, error: &str, exit_code: i32) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "output": output,
        "error": error,
        "exitCode": exit_code
    }))
}

#[tokio::test]
async fn submitted_command_renders_remote_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(body_json(json!({ "command": "make" })))
        .respond_with(ok_body("built\n", "warning: unused\n", 0))
        .expect(1)
        .mount(&server)
        .await;

    let (mut session, mut surface) = started(&server.uri());
    session.feed("make\r", &mut surface).await.expect("feed");

    assert_eq!(
        surface.text(),
        "\r\u{1b}[K$ m\r\u{1b}[K$ ma\r\u{1b}[K$ mak\r\u{1b}[K$ make\r\n\
         built\r\n\u{1b}[31mwarning: unused\u{1b}[0m\r\n$ "
    );
    assert_eq!(session.editor().history().entries(), ["make".to_string()]);
    assert_eq!(session.editor().state(), SessionState::Idle);
    server.verify().await;
}

#[tokio::test]
async fn command_text_is_sent_untrimmed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(body_json(json!({ "command": "  ls  " })))
        .respond_with(ok_body("", "", 0))
        .expect(1)
        .mount(&server)
        .await;

    let (mut session, mut surface) = started(&server.uri());
    session.feed("  ls  \r", &mut surface).await.expect("feed");

    assert_eq!(session.editor().history().entries(), ["  ls  ".to_string()]);
    server.verify().await;
}

#[tokio::test]
async fn blank_line_never_reaches_the_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ok_body("", "", 0))
        .expect(0)
        .mount(&server)
        .await;

    let (mut session, mut surface) = started(&server.uri());
    session.feed("\r", &mut surface).await.expect("feed");
    session.feed("   \r", &mut surface).await.expect("feed");

    assert_eq!(surface.text(), "\r\n$ \r\u{1b}[K$  \r\u{1b}[K$   \r\u{1b}[K$    \r\n$ ");
    assert!(session.editor().history().is_empty());
    server.verify().await;
}

#[tokio::test]
async fn rejected_request_shows_failure_and_skips_history() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "error": "Failed to execute command" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (mut session, mut surface) = started(&server.uri());
    session.feed("ls\r", &mut surface).await.expect("feed");

    assert!(
        surface
            .text()
            .ends_with("\r\n\u{1b}[31mError: Failed to execute command\u{1b}[0m\r\n$ "),
        "{:?}",
        surface.text()
    );
    assert!(session.editor().history().is_empty());
    assert_eq!(session.editor().state(), SessionState::Idle);
    server.verify().await;
}

#[tokio::test]
async fn unreachable_server_returns_to_the_prompt() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("listener");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let (mut session, mut surface) = started(&format!("http://{addr}"));
    session.feed("ls\r", &mut surface).await.expect("feed");

    assert!(surface.text().ends_with("Error: Failed to execute command\u{1b}[0m\r\n$ "));
    assert_eq!(session.editor().state(), SessionState::Idle);

    // The terminal stays usable.
    session.feed("x", &mut surface).await.expect("feed");
    assert_eq!(session.editor().buffer(), "x");
}

#[tokio::test]
async fn second_enter_while_awaiting_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ok_body("done\n", "", 0).set_delay(Duration::from_millis(200)))
        .expect(1)
        .mount(&server)
        .await;

    let (mut session, mut surface) = started(&server.uri());
    let pending = session
        .handle_input("sleep 1\r", &mut surface)
        .expect("input")
        .expect("submission");
    assert_eq!(session.editor().state(), SessionState::AwaitingResult);

    let second = session
        .handle_input("pwd\r", &mut surface)
        .expect("input while awaiting");
    assert!(second.is_none());

    let outcome = pending.await;
    session.finish(outcome, &mut surface).expect("finish");

    assert_eq!(session.editor().history().entries(), ["sleep 1".to_string()]);
    assert_eq!(session.editor().buffer(), "");
    server.verify().await;
}

#[tokio::test]
async fn executed_commands_are_recalled_with_up() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ok_body("", "", 0))
        .expect(2)
        .mount(&server)
        .await;

    let (mut session, mut surface) = started(&server.uri());
    session.feed("ls\r", &mut surface).await.expect("feed");
    session.feed("pwd\r", &mut surface).await.expect("feed");

    session.feed("\u{1b}[A", &mut surface).await.expect("up");
    assert_eq!(session.editor().buffer(), "pwd");
    session.feed("\u{1b}[A", &mut surface).await.expect("up");
    assert_eq!(session.editor().buffer(), "ls");

    let mut parser = vt100::Parser::new(24, 80, 0);
    parser.process(surface.text().as_bytes());
    assert_eq!(parser.screen().contents(), "$ ls\n$ pwd\n$ ls");
    server.verify().await;
}
