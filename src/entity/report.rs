use std::path::PathBuf;

use serde::{
    Deserialize,
    Serialize,
};
use serde_json::json;

#[derive(Debug)]
pub struct Report {
    pub location: String,
    pub summary: Summary,
    pub duration: std::time::Duration,
}

/// What a render run did, in the order it was done
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Summary {
    #[serde(rename = "jsonDump")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_dump: Option<PathBuf>,

    pub hasher: String,

    #[serde(rename = "maxJobs")]
    pub max_jobs: usize,

    #[serde(rename = "filesWritten")]
    pub files_written: Vec<PathBuf>,

    #[serde(rename = "dryRun")]
    pub dry_run: bool,
}

impl Report {
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "location": self.location,
            "summary": self.summary,
            "elapsedTime": self.duration,
        })
    }

    pub fn to_json_string(&self) -> String {
        self.to_json().to_string()
    }
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_json_string())
    }
}
