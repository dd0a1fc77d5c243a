use serde::{Deserialize, Serialize};
use chrono::prelude::*;

use crate::models::group::Summary;

#[derive(Serialize, Deserialize, Debug)]
pub struct UpdateResponse {
    pub message : String,
    pub summary: Summary,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub updated_at: DateTime<Utc>,
}
