//! `QuillClient` builder.
//!
//! This is the entry point for applications. It ties the layers together:
//! reqwest transport → JSON protocol → session manager.

use std::sync::Arc;
use std::time::Duration;

use quill_session::{SessionConfig, SessionManager};
use quill_transport::ReqwestTransport;

use crate::{ClientConfig, QuillError};

/// The session manager type a [`QuillClient`] hands out.
pub type Session = SessionManager<ReqwestTransport>;

/// Builder for configuring a [`QuillClient`].
///
/// # Example
///
/// ```rust,no_run
/// use quill::prelude::*;
///
/// # async fn run() -> Result<(), QuillError> {
/// let client = QuillClient::builder()
///     .api_url("https://blog.example.com/api")
///     .build()?;
///
/// let session = client.session();
/// session.bootstrap().await;
/// session.login("ada@example.com", "hunter2").await?;
/// # Ok(())
/// # }
/// ```
pub struct QuillClientBuilder {
    config: ClientConfig,
}

impl QuillClientBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
        }
    }

    /// Starts from an existing configuration (e.g. [`ClientConfig::from_env`]).
    pub fn from_config(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Sets the API base URL.
    pub fn api_url(mut self, url: &str) -> Self {
        self.config.api_url = url.to_string();
        self
    }

    /// Sets the session configuration.
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.config.session = config;
        self
    }

    /// Sets the per-request timeout. `None` disables it.
    pub fn request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Builds the transport and an empty session.
    ///
    /// No request is sent; call [`SessionManager::bootstrap`] to pick up
    /// an existing session.
    ///
    /// # Errors
    /// [`QuillError::Transport`] if the API URL does not parse.
    pub fn build(self) -> Result<QuillClient, QuillError> {
        let transport =
            ReqwestTransport::with_timeout(&self.config.api_url, self.config.request_timeout)?;
        let session = Arc::new(SessionManager::new(transport, self.config.session.clone()));

        tracing::info!(api_url = %self.config.api_url, "Quill client ready");
        Ok(QuillClient {
            config: self.config,
            session,
        })
    }
}

impl Default for QuillClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A configured client for the Quill API.
///
/// Cheap to clone; clones share the same session and cookie jar.
#[derive(Clone)]
pub struct QuillClient {
    config: ClientConfig,
    session: Arc<Session>,
}

impl QuillClient {
    /// Creates a new builder.
    pub fn builder() -> QuillClientBuilder {
        QuillClientBuilder::new()
    }

    /// Builds a client from `QUILL_*` environment variables.
    pub fn from_env() -> Result<Self, QuillError> {
        QuillClientBuilder::from_config(ClientConfig::from_env()?).build()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The shared session manager.
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_defaults_succeeds_without_network() {
        let client = QuillClient::builder().build().expect("default config is valid");

        assert_eq!(client.config().api_url, crate::config::DEFAULT_API_URL);
        assert_eq!(
            client.session().transport().base_url(),
            "http://localhost:5000/api"
        );
        assert!(client.session().is_loading());
        assert!(!client.session().is_authenticated());
    }

    #[test]
    fn test_build_invalid_url_is_transport_error() {
        let result = QuillClient::builder().api_url("not a url").build();
        assert!(matches!(result, Err(QuillError::Transport(_))));
    }

    #[test]
    fn test_clones_share_session() {
        let client = QuillClient::builder().build().unwrap();
        let clone = client.clone();
        assert!(Arc::ptr_eq(client.session(), clone.session()));
    }

    #[test]
    fn test_builder_applies_session_config() {
        let client = QuillClient::builder()
            .session_config(SessionConfig {
                safety_margin: Duration::from_secs(5),
                ..SessionConfig::default()
            })
            .request_timeout(None)
            .build()
            .unwrap();

        assert_eq!(client.session().config().safety_margin, Duration::from_secs(5));
        assert_eq!(client.config().request_timeout, None);
    }
}
