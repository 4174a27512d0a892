//! Response envelopes shared across route families.

use serde::Serialize;

/// `{"success": true}`, returned by the fire-and-forget logging endpoints.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub response: String,
    pub status: &'static str,
}

impl StatusResponse {
    pub fn success(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            status: "success",
        }
    }
}
