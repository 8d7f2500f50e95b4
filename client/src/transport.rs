use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;
use url::Url;
use webterm_protocol::ErrorResponse;
use webterm_protocol::ExecuteCommandRequest;
use webterm_protocol::ExecuteCommandResponse;
use webterm_protocol::terminal_path;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid endpoint url: {0}")]
    Url(#[from] url::ParseError),
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("server answered {status}: {message}")]
    Rejected { status: u16, message: String },
}

/// Runs one command remotely. Implementations keep no state between calls.
#[async_trait]
pub trait CommandTransport: Send + Sync {
    async fn execute(
        &self,
        project_id: &str,
        command: &str,
    ) -> Result<ExecuteCommandResponse, TransportError>;
}

/// JSON-over-HTTP transport for the terminal endpoint.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base: Url,
}

impl HttpTransport {
    /// `base` is the server root, e.g. `http://127.0.0.1:3000`.
    pub fn new(base: Url) -> Self {
        Self::with_client(Client::new(), base)
    }

    pub fn with_client(client: Client, base: Url) -> Self {
        Self { client, base }
    }

    fn endpoint(&self, project_id: &str) -> Result<Url, TransportError> {
        Ok(self.base.join(&terminal_path(project_id))?)
    }
}

#[async_trait]
impl CommandTransport for HttpTransport {
    async fn execute(
        &self,
        project_id: &str,
        command: &str,
    ) -> Result<ExecuteCommandResponse, TransportError> {
        let endpoint = self.endpoint(project_id)?;
        debug!("POST {endpoint}");
        let response = self
            .client
            .post(endpoint)
            .json(&ExecuteCommandRequest::new(command))
            .send()
            .await?;
        let status = response.status();
        let body = response.bytes().await?;
        if status.is_success() {
            return Ok(serde_json::from_slice(&body)?);
        }

        let message = match serde_json::from_slice::<ErrorResponse>(&body) {
            Ok(error) => error.error,
            Err(_) => String::from_utf8_lossy(&body).into_owned(),
        };
        Err(TransportError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}
