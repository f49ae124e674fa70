mod url;

pub use url::{CreateUrlRequest, CreateUrlResponse, ErrorResponse};

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
