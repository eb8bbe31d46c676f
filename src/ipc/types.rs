use std::path::PathBuf;

use rusqlite::Connection;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    #[serde(default)]
    pub id: String,
    #[serde(alias = "method")]
    pub action: String,
    #[serde(default, alias = "params")]
    pub data: serde_json::Value,
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub db: Option<Connection>,
}
