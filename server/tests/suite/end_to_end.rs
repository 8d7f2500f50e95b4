#![cfg(unix)]

use std::time::Duration;

use pretty_assertions::assert_eq;
use server_test_support::DEMO_PROJECT;
use server_test_support::TestServer;
use url::Url;
use webterm_client::HttpTransport;
use webterm_client::TerminalSession;
use webterm_line_editor::EditorConfig;
use webterm_line_editor::SessionState;
use webterm_line_editor::Transcript;

fn session_for(server: &TestServer) -> anyhow::Result<TerminalSession<HttpTransport>> {
    let base = Url::parse(&server.url())?;
    Ok(TerminalSession::new(
        HttpTransport::new(base),
        DEMO_PROJECT,
        EditorConfig::default(),
    ))
}

fn screen(transcript: &Transcript) -> vt100::Parser {
    let mut parser = vt100::Parser::new(24, 80, 0);
    parser.process(transcript.text().as_bytes());
    parser
}

#[tokio::test]
async fn typed_command_runs_on_the_server_and_renders() -> anyhow::Result<()> {
    let server = TestServer::start().await?;
    let mut session = session_for(&server)?;
    let mut surface = Transcript::new();

    session.start(&mut surface)?;
    session.feed("echo hello\r", &mut surface).await?;

    let parser = screen(&surface);
    assert_eq!(
        parser.screen().contents(),
        "webterm\nType commands and press Enter to execute.\n\n$ echo hello\nhello\n$ "
    );
    assert_eq!(session.editor().history().entries(), ["echo hello".to_string()]);
    Ok(())
}

#[tokio::test]
async fn stderr_lines_are_drawn_in_red() -> anyhow::Result<()> {
    let server = TestServer::start().await?;
    let mut session = session_for(&server)?;
    let mut surface = Transcript::new();

    session.feed("echo oops 1>&2\r", &mut surface).await?;

    let parser = screen(&surface);
    let contents = parser.screen().contents();
    assert!(contents.contains("\noops\n"), "{contents:?}");
    let oops_row = contents
        .lines()
        .position(|line| line == "oops")
        .expect("oops row") as u16;
    let cell = parser.screen().cell(oops_row, 0).expect("cell");
    assert_eq!(cell.fgcolor(), vt100::Color::Idx(1));
    Ok(())
}

#[tokio::test]
async fn timed_out_command_shows_marker_and_keeps_going() -> anyhow::Result<()> {
    let server = TestServer::start_with_timeout(Duration::from_millis(300)).await?;
    let mut session = session_for(&server)?;
    let mut surface = Transcript::new();

    session.feed("sleep 5\r", &mut surface).await?;

    assert!(surface.text().contains("\u{1b}[31mCommand timed out\u{1b}[0m\r\n$ "));
    assert_eq!(session.editor().state(), SessionState::Idle);
    assert_eq!(session.editor().history().entries(), ["sleep 5".to_string()]);

    session.feed("echo after\r", &mut surface).await?;
    assert!(surface.text().ends_with("after\r\n$ "));
    Ok(())
}

#[tokio::test]
async fn recalled_command_can_be_edited_and_rerun() -> anyhow::Result<()> {
    let server = TestServer::start().await?;
    let mut session = session_for(&server)?;
    let mut surface = Transcript::new();

    session.feed("echo one\r", &mut surface).await?;
    // Up, erase the last character, type a replacement.
    session.feed("\u{1b}[A\u{7f}\u{7f}\u{7f}two\r", &mut surface).await?;

    assert_eq!(
        session.editor().history().entries(),
        ["echo one".to_string(), "echo two".to_string()]
    );
    assert!(surface.text().ends_with("two\r\n$ "));
    Ok(())
}
