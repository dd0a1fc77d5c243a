use serde::{Deserialize, Serialize};

/// A named, persisted set of restorable urls.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub id: i64,
    pub name: String,
    pub urls: Vec<String>,
}

/// Counts shown next to the saved groups list.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    #[serde(rename = "groupCount")]
    pub group_count: usize,
    #[serde(rename = "tabCount")]
    pub tab_count: usize,
}

impl Group {
    pub fn new(id: i64, name: impl Into<String>, urls: Vec<String>) -> Self {
        Group {
            id,
            name: name.into(),
            urls,
        }
    }
}
