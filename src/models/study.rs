use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyRecord {
    pub id: String,
    pub inclusion_criteria: Vec<String>,
    pub exclusion_criteria: Vec<String>,
}
