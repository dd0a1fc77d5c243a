use async_trait::async_trait;

use crate::error::TabError;
use crate::models::tab::Tab;

/// Browser tab primitives the actions rely on.
#[async_trait]
pub trait TabHost: Send + Sync {
    /// Tabs of the window the action was triggered from.
    async fn window_tabs(&self) -> Result<Vec<Tab>, TabError>;

    /// Tabs of every open window.
    async fn all_tabs(&self) -> Result<Vec<Tab>, TabError>;

    /// The focused tab of the current window, if any.
    async fn active_tab(&self) -> Result<Option<Tab>, TabError>;

    /// Opens `url` in a new background tab.
    async fn create_tab(&self, url: &str) -> Result<(), TabError>;
}
