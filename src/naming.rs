//! Color naming enrichment
//!
//! A naming service receives the extracted hex codes and returns traditional
//! pigment names for them. Enrichment is best effort: any failure leaves the
//! palette as it was.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use utoipa::ToSchema;

use crate::error::AppError;
use crate::palette::{ColorInfo, ColorName};

/// A naming record for one hex code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NamedColor {
    pub hex: String,
    #[serde(flatten)]
    pub name: ColorName,
}

/// Something that can put names on hex colors
#[async_trait]
pub trait NamingService: Send + Sync {
    /// Short label for logs
    fn source(&self) -> &'static str;

    /// Name the given hex codes; records may come back in any order
    async fn name_colors(&self, hexes: &[String]) -> Result<Vec<NamedColor>, AppError>;
}

#[derive(Debug, Serialize)]
struct NamingRequest<'a> {
    colors: &'a [String],
}

/// Remote naming service reached over HTTP
pub struct HttpNamingService {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpNamingService {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        })
    }
}

#[async_trait]
impl NamingService for HttpNamingService {
    fn source(&self) -> &'static str {
        "http"
    }

    async fn name_colors(&self, hexes: &[String]) -> Result<Vec<NamedColor>, AppError> {
        tracing::info!("Requesting names for {} colors from {}", hexes.len(), self.endpoint);

        let mut request = self
            .client
            .post(&self.endpoint)
            .header("Accept", "application/json")
            .json(&NamingRequest { colors: hexes });

        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(AppError::Enrichment(format!(
                "Naming service returned status: {}",
                response.status()
            )));
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| AppError::Enrichment(format!("Malformed naming response: {}", e)))
    }
}

/// Patch names onto matching colors by case-insensitive hex
///
/// Colors without a matching record keep whatever name fields they had.
pub fn apply_names(colors: Vec<ColorInfo>, named: &[NamedColor]) -> Vec<ColorInfo> {
    colors
        .into_iter()
        .map(|color| {
            match named
                .iter()
                .find(|n| n.hex.trim().eq_ignore_ascii_case(&color.hex))
            {
                Some(n) => color.with_name(n.name.clone()),
                None => color,
            }
        })
        .collect()
}

/// Enrich a finished palette, falling back to the input on any failure
pub async fn enrich(colors: Vec<ColorInfo>, service: &dyn NamingService) -> Vec<ColorInfo> {
    if colors.is_empty() {
        return colors;
    }

    let hexes: Vec<String> = colors.iter().map(|c| c.hex.clone()).collect();

    match service.name_colors(&hexes).await {
        Ok(named) => {
            let colors = apply_names(colors, &named);
            let matched = colors.iter().filter(|c| c.is_named()).count();
            tracing::debug!(
                "Named {}/{} colors via {}",
                matched,
                colors.len(),
                service.source()
            );
            colors
        }
        Err(e) => {
            tracing::warn!(
                "Naming via {} failed, returning unnamed palette: {}",
                service.source(),
                e
            );
            colors
        }
    }
}
