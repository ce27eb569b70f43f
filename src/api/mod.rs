mod client;

use crate::core::error::ApiError;
use crate::core::models::Integration;
use async_trait::async_trait;
use serde_json::Value;

pub use client::IntegrationClient;

pub const INTEGRATION_TYPE: &str = "AWSCloudWatch";

/// A decoded listing. `total` counts every entry of `results`, including
/// entries that could not be read as integrations.
#[derive(Debug, Clone, Default)]
pub struct Listing {
    pub total: usize,
    pub integrations: Vec<Integration>,
}

#[async_trait]
pub trait IntegrationApi: Send + Sync {
    /// Lists every integration of type [`INTEGRATION_TYPE`].
    async fn list_integrations(&self) -> Result<Listing, ApiError>;

    /// Replaces the integration `id` with `body`.
    async fn update_integration(&self, id: &str, body: &Integration) -> Result<(), ApiError>;
}

/// Decodes a listing response. A missing or non-array `results` field is an
/// empty listing, and entries that are not objects are skipped.
pub fn parse_listing(body: &str, url: &str) -> Result<Listing, ApiError> {
    if body.trim().is_empty() {
        return Ok(Listing::default());
    }

    let payload: Value = serde_json::from_str(body).map_err(|source| ApiError::Protocol {
        url: url.to_string(),
        source,
    })?;

    let results = match payload {
        Value::Object(mut map) => match map.remove("results") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    Ok(Listing {
        total: results.len(),
        integrations: results
            .into_iter()
            .filter_map(Integration::from_value)
            .collect(),
    })
}
