use serde::{Deserialize, Serialize};

/// The part of a live browser tab the vault looks at.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Tab {
    pub url: Option<String>,
    pub title: Option<String>,
}

impl Tab {
    pub fn with_url(url: impl Into<String>) -> Self {
        Tab {
            url: Some(url.into()),
            title: None,
        }
    }
}
