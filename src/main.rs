mod color;
mod config;
mod error;
mod extractor;
mod image_processing;
mod kmeans;
mod naming;
mod palette;
mod pigments;
mod runs;
mod sampler;
mod settings;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::{IntoParams, OpenApi};
use utoipa_scalar::{Scalar, Servable};

use crate::color::{Cmyk, Rgb};
use crate::config::Config;
use crate::error::AppError;
use crate::extractor::{ExtractRequest, Extractor};
use crate::kmeans::Seeding;
use crate::naming::NamedColor;
use crate::palette::{ColorInfo, ColorName};
use crate::pigments::PIGMENTS;
use crate::settings::ProcessingSettings;

/// Largest accepted upload
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Application state shared across handlers
#[derive(Clone)]
struct AppState {
    extractor: Arc<Extractor>,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Mural Palette API",
        description = "Dominant color extraction and traditional pigment naming for Dunhuang mural images",
        version = "0.1.0"
    ),
    tags(
        (name = "Palette", description = "Color extraction and naming"),
        (name = "Pigments", description = "Traditional pigment catalog")
    ),
    paths(health, extract_palette, name_palette, list_pigments),
    components(schemas(ColorInfo, ColorName, NamedColor, Rgb, Cmyk, ProcessingSettings))
)]
struct ApiDoc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = Config::from_env();

    let extractor = match Extractor::from_config(&config) {
        Ok(extractor) => extractor,
        Err(e) => {
            tracing::error!("Failed to set up extractor: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Naming colors via {}", extractor.naming().source());

    let state = AppState {
        extractor: Arc::new(extractor),
    };

    let app = router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/palette", post(extract_palette))
        .route("/palette/names", post(name_palette))
        .route("/pigments", get(list_pigments))
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .route("/openapi.json", get(openapi_json))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Query parameters for palette extraction
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
struct PaletteQuery {
    /// Number of colors, 3-12 (default 6)
    color_count: Option<usize>,
    /// Sampling density, 1-10 (default 5)
    sample_precision: Option<u8>,
    /// Apply PCCS restoration brightening (default false)
    brighten: Option<bool>,
    /// Skip near-neutral pixels (default true)
    ignore_grayscale: Option<bool>,
    /// Seed for random centroid initialization; evenly spaced when absent
    seed: Option<u64>,
    /// Name colors after extraction (default true)
    enrich: Option<bool>,
    /// Client session; a newer request supersedes older ones in flight
    session: Option<String>,
}

impl PaletteQuery {
    fn into_request(self) -> ExtractRequest {
        let defaults = ProcessingSettings::default();
        ExtractRequest {
            settings: ProcessingSettings {
                color_count: self.color_count.unwrap_or(defaults.color_count),
                sample_precision: self.sample_precision.unwrap_or(defaults.sample_precision),
                brighten: self.brighten.unwrap_or(defaults.brighten),
                ignore_grayscale: self.ignore_grayscale.unwrap_or(defaults.ignore_grayscale),
            },
            seeding: self
                .seed
                .map_or(Seeding::EvenlySpaced, |seed| Seeding::Random { seed }),
            enrich: self.enrich.unwrap_or(true),
            session: self.session.filter(|s| !s.is_empty()),
        }
    }
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = String)
    )
)]
async fn health() -> &'static str {
    "ok"
}

/// Get OpenAPI JSON specification
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Extract a palette
///
/// Accepts an encoded image (PNG, JPEG, WebP, GIF) as the request body and
/// returns its dominant colors, largest share first.
#[utoipa::path(
    post,
    path = "/palette",
    tag = "Palette",
    params(PaletteQuery),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "Extracted colors", body = Vec<ColorInfo>),
        (status = 400, description = "Settings out of range"),
        (status = 409, description = "Superseded by a newer request for the same session"),
        (status = 422, description = "Image could not be decoded")
    )
)]
async fn extract_palette(
    State(state): State<AppState>,
    Query(query): Query<PaletteQuery>,
    body: Bytes,
) -> Result<Json<Vec<ColorInfo>>, AppError> {
    let request = query.into_request();
    tracing::info!(
        "Palette request: {} bytes, settings={:?}, seeding={:?}, session={:?}",
        body.len(),
        request.settings,
        request.seeding,
        request.session
    );

    let colors = state.extractor.extract(body.to_vec(), request).await?;
    Ok(Json(colors))
}

/// Name an extracted palette
///
/// Returns the same colors with traditional pigment names patched in where
/// the naming service recognized them.
#[utoipa::path(
    post,
    path = "/palette/names",
    tag = "Palette",
    request_body = Vec<ColorInfo>,
    responses(
        (status = 200, description = "Named colors", body = Vec<ColorInfo>)
    )
)]
async fn name_palette(
    State(state): State<AppState>,
    Json(colors): Json<Vec<ColorInfo>>,
) -> Json<Vec<ColorInfo>> {
    tracing::info!("Naming request for {} colors", colors.len());
    Json(state.extractor.name(colors).await)
}

/// List the traditional pigment catalog
#[utoipa::path(
    get,
    path = "/pigments",
    tag = "Pigments",
    responses(
        (status = 200, description = "Dunhuang mural pigments", body = Vec<NamedColor>)
    )
)]
async fn list_pigments() -> Json<Vec<NamedColor>> {
    Json(
        PIGMENTS
            .iter()
            .map(|p| p.to_named_color(p.rgb.to_hex()))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pigments::PigmentCatalog;
    use crate::runs::RunTracker;
    use image::{ImageFormat, Rgba, RgbaImage};
    use reqwest::StatusCode;
    use std::io::Cursor;
    use std::time::Duration;

    async fn spawn_app() -> String {
        let extractor = Extractor::new(
            Arc::new(PigmentCatalog::new()),
            Arc::new(RunTracker::new(Duration::from_secs(60))),
            256,
        );
        let app = router(AppState {
            extractor: Arc::new(extractor),
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn striped_png() -> Vec<u8> {
        // Stripes of 20, 10 and 10 columns
        let img = RgbaImage::from_fn(40, 10, |x, _| match x {
            0..=19 => Rgba([168, 76, 50, 255]),
            20..=29 => Rgba([75, 94, 62, 255]),
            _ => Rgba([233, 163, 76, 255]),
        });
        let mut out = Vec::new();
        img.write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn test_query_defaults() {
        let request = PaletteQuery::default().into_request();
        assert_eq!(request.settings, ProcessingSettings::default());
        assert_eq!(request.seeding, Seeding::EvenlySpaced);
        assert!(request.enrich);
        assert!(request.session.is_none());
    }

    #[test]
    fn test_query_overrides() {
        let query: PaletteQuery = serde_json::from_str(
            r#"{"colorCount":9,"samplePrecision":2,"brighten":true,"ignoreGrayscale":false,"seed":5,"enrich":false,"session":""}"#,
        )
        .unwrap();
        let request = query.into_request();
        assert_eq!(request.settings.color_count, 9);
        assert_eq!(request.settings.sample_precision, 2);
        assert!(request.settings.brighten);
        assert!(!request.settings.ignore_grayscale);
        assert_eq!(request.seeding, Seeding::Random { seed: 5 });
        assert!(!request.enrich);
        assert!(request.session.is_none());
    }

    #[tokio::test]
    async fn test_palette_endpoint() {
        let base = spawn_app().await;
        let client = reqwest::Client::new();

        let response = client
            .post(format!("{}/palette?colorCount=3&samplePrecision=10", base))
            .body(striped_png())
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let colors: Vec<ColorInfo> = response.json().await.unwrap();
        assert_eq!(colors.len(), 3);
        let total: f64 = colors.iter().map(|c| c.percentage).sum();
        assert!((total - 100.0).abs() <= 0.1);
        assert!(colors.iter().all(|c| c.is_named()));
    }

    #[tokio::test]
    async fn test_palette_endpoint_errors() {
        let base = spawn_app().await;
        let client = reqwest::Client::new();

        let response = client
            .post(format!("{}/palette?colorCount=20", base))
            .body(striped_png())
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = client
            .post(format!("{}/palette", base))
            .body("definitely not an image")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_names_and_pigments_endpoints() {
        let base = spawn_app().await;
        let client = reqwest::Client::new();

        let pigments: Vec<NamedColor> = client
            .get(format!("{}/pigments", base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(pigments.len(), PIGMENTS.len());
        assert_eq!(pigments[0].hex, "#A84C32");

        let unnamed = vec![ColorInfo::from_centroid(Rgb::new(0x9D, 0x29, 0x33), 100.0, false)];
        let named: Vec<ColorInfo> = client
            .post(format!("{}/palette/names", base))
            .json(&unnamed)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(named[0].en_name.as_deref(), Some("Rouge"));
        assert_eq!(named[0].hex, unnamed[0].hex);
    }
}
