use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::Arc;

use tracing::info;
use webterm_line_editor::CommandOutcome;
use webterm_line_editor::EditorConfig;
use webterm_line_editor::LineEditor;
use webterm_line_editor::Submission;
use webterm_line_editor::Surface;

use crate::transport::CommandTransport;

/// Request in flight for the last submission. Resolve it and pass the
/// outcome to [`TerminalSession::finish`].
pub type PendingExecution = Pin<Box<dyn Future<Output = CommandOutcome> + Send + 'static>>;

/// One terminal bound to one project.
pub struct TerminalSession<T> {
    editor: LineEditor,
    transport: Arc<T>,
    project_id: String,
}

impl<T> TerminalSession<T>
where
    T: CommandTransport + 'static,
{
    pub fn new(transport: T, project_id: impl Into<String>, config: EditorConfig) -> Self {
        Self {
            editor: LineEditor::new(config),
            transport: Arc::new(transport),
            project_id: project_id.into(),
        }
    }

    pub fn editor(&self) -> &LineEditor {
        &self.editor
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn start(&self, surface: &mut dyn Surface) -> io::Result<()> {
        self.editor.start(surface)
    }

    /// Feeds raw input to the editor. When it submits a command, returns the
    /// request future; the editor drops all input until
    /// [`TerminalSession::finish`] is called.
    pub fn handle_input(
        &mut self,
        data: &str,
        surface: &mut dyn Surface,
    ) -> io::Result<Option<PendingExecution>> {
        let Some(Submission { command }) = self.editor.handle_input(data, surface)? else {
            return Ok(None);
        };
        let transport = Arc::clone(&self.transport);
        let project_id = self.project_id.clone();
        Ok(Some(Box::pin(async move {
            info!("executing {command:?} in project {project_id}");
            match transport.execute(&project_id, &command).await {
                Ok(response) => {
                    info!(
                        "command {command:?} finished with exit code {}",
                        response.exit_code
                    );
                    CommandOutcome::Completed(response)
                }
                Err(err) => CommandOutcome::Failed(err.to_string()),
            }
        })))
    }

    pub fn finish(&mut self, outcome: CommandOutcome, surface: &mut dyn Surface) -> io::Result<()> {
        self.editor.finish(outcome, surface)
    }

    /// Handles `data` and, if it submitted a command, waits for the result
    /// before returning.
    pub async fn feed(&mut self, data: &str, surface: &mut dyn Surface) -> io::Result<()> {
        if let Some(pending) = self.handle_input(data, surface)? {
            let outcome = pending.await;
            self.finish(outcome, surface)?;
        }
        Ok(())
    }
}
