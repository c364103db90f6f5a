use serde::{Deserialize, Serialize};
use crate::models::study::StudyRecord;

#[derive(Debug, Deserialize)]
pub struct ChatQuery {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse<'a> {
    pub study: &'a StudyRecord,
}
