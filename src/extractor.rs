//! Extraction service
//!
//! Runs decode → palette on the blocking pool, drops results from superseded
//! runs, then hands the finished palette to the naming service.

use std::sync::Arc;

use crate::config::Config;
use crate::error::AppError;
use crate::image_processing;
use crate::kmeans::Seeding;
use crate::naming::{self, HttpNamingService, NamingService};
use crate::palette::{self, ColorInfo};
use crate::pigments::PigmentCatalog;
use crate::runs::{RunTicket, RunTracker};
use crate::settings::ProcessingSettings;

/// One extraction request
#[derive(Debug, Clone, Default)]
pub struct ExtractRequest {
    pub settings: ProcessingSettings,
    pub seeding: Seeding,
    /// Run naming enrichment after clustering
    pub enrich: bool,
    /// Client session; a newer request for the same session supersedes this one
    pub session: Option<String>,
}

pub struct Extractor {
    naming: Arc<dyn NamingService>,
    runs: Arc<RunTracker>,
    max_image_dimension: u32,
}

impl Extractor {
    pub fn new(naming: Arc<dyn NamingService>, runs: Arc<RunTracker>, max_image_dimension: u32) -> Self {
        Self {
            naming,
            runs,
            max_image_dimension,
        }
    }

    /// Wire up the naming service and run tracker described by `config`
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let naming: Arc<dyn NamingService> = match &config.naming_service_url {
            Some(url) => {
                tracing::info!("Using remote naming service at {}", url);
                Arc::new(HttpNamingService::new(
                    url.clone(),
                    config.naming_api_key.clone(),
                    config.naming_timeout,
                )?)
            }
            None => {
                tracing::info!("No naming service configured, using local pigment catalog");
                Arc::new(PigmentCatalog::new())
            }
        };

        Ok(Self::new(
            naming,
            Arc::new(RunTracker::new(config.session_ttl)),
            config.max_image_dimension,
        ))
    }

    pub fn naming(&self) -> &dyn NamingService {
        self.naming.as_ref()
    }

    /// Extract a palette from encoded image bytes
    pub async fn extract(&self, image_data: Vec<u8>, request: ExtractRequest) -> Result<Vec<ColorInfo>, AppError> {
        request.settings.validate()?;

        let ticket = self.runs.begin(request.session.as_deref()).await;
        let max_dimension = self.max_image_dimension;
        let settings = request.settings;
        let seeding = request.seeding;

        // The whole pipeline runs in one blocking task; nothing partial escapes
        let colors = tokio::task::spawn_blocking(move || {
            let img = image_processing::decode_rgba(&image_data, max_dimension)?;
            palette::extract_palette(img.as_raw(), img.width(), img.height(), &settings, seeding)
        })
        .await
        .map_err(|e| AppError::Task(e.to_string()))??;

        tracing::info!("Extracted {} colors", colors.len());
        self.ensure_current(&ticket).await?;

        if !request.enrich {
            return Ok(colors);
        }

        let colors = naming::enrich(colors, self.naming.as_ref()).await;
        self.ensure_current(&ticket).await?;

        Ok(colors)
    }

    /// Name an already extracted palette
    pub async fn name(&self, colors: Vec<ColorInfo>) -> Vec<ColorInfo> {
        naming::enrich(colors, self.naming.as_ref()).await
    }

    async fn ensure_current(&self, ticket: &RunTicket) -> Result<(), AppError> {
        if self.runs.is_current(ticket).await {
            return Ok(());
        }

        let session = ticket.session().unwrap_or_default().to_string();
        tracing::debug!("Discarding stale extraction for session {}", session);
        Err(AppError::Superseded(session))
    }
}
