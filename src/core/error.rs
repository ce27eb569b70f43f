use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request failed for {url}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} for {url}: {body}")]
    Status { status: u16, url: String, body: String },

    #[error("Invalid JSON response from {url}")]
    Protocol {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
