pub mod webdriver;

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum BrowserError {
    /// An element did not appear, or an action did not finish, in time.
    #[error("timed out: {0}")]
    Timeout(String),

    #[error("browser error: {0}")]
    Other(String),
}

impl BrowserError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, BrowserError::Timeout(_))
    }
}

impl From<anyhow::Error> for BrowserError {
    fn from(err: anyhow::Error) -> Self {
        BrowserError::Other(format!("{err:#}"))
    }
}

/// Starts isolated browser sessions. One session per booking attempt.
#[async_trait]
pub trait BrowserProvider: Send + Sync {
    async fn open_session(&self, headless: bool) -> Result<Box<dyn BrowserSession>, BrowserError>;
}

/// A single page in a fresh browser profile. Controls are addressed by their
/// visible labels only.
#[async_trait]
pub trait BrowserSession: Send {
    async fn goto(&mut self, url: &str) -> Result<(), BrowserError>;

    async fn wait_for_network_idle(&mut self) -> Result<(), BrowserError>;

    /// Clicks the first control whose accessible label contains `label`.
    async fn click_label(&mut self, label: &str) -> Result<(), BrowserError>;

    /// Clicks a button by its accessible name.
    async fn click_button(&mut self, name: &str, exact: bool) -> Result<(), BrowserError>;

    /// Replaces the value of the labelled input.
    async fn fill_label(&mut self, label: &str, value: &str) -> Result<(), BrowserError>;

    async fn close(&mut self) -> Result<(), BrowserError>;
}
