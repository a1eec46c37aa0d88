use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub display_name: String,
    pub role: String,
    pub login_time: i64,
}

/// Session details for the dashboard header.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub display_name: String,
    pub role: String,
    pub login_time: i64,
    pub last_activity: i64,
}
