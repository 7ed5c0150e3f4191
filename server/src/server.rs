//! HTTP API serving assembled heatmaps.
//!
//! Routes:
//!   GET  /api/health        → health check
//!   GET  /api/options       → selectable courts, groupings, years, defaults
//!   GET  /api/heatmap       → heatmap bundle as JSON
//!   GET  /api/heatmap.png   → heatmap raster

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use courtmap_common::booking::Grouping;
use courtmap_common::config::Config;
use courtmap_common::court::Court;
use courtmap_common::error::{ErrorKind, HeatmapError};
use courtmap_common::protocol::{
    DisplayOptions, ErrorResponse, HealthResponse, HeatmapQuery, HeatmapResponse, OptionsResponse,
};
use courtmap_processing::{render, DataStore, HeatmapBundle, MatrixAssembler, Selection};

/// Shared state for route handlers.
#[derive(Clone)]
pub struct AppState {
    store: Arc<DataStore>,
    config: Arc<Config>,
    start_time: Instant,
}

impl AppState {
    pub fn new(store: DataStore, config: Config) -> Self {
        Self {
            store: Arc::new(store),
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/options", get(options))
        .route("/api/heatmap", get(heatmap_json))
        .route("/api/heatmap.png", get(heatmap_png))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the HTTP server. Blocks until shutdown.
pub async fn run(state: AppState, shutdown: Arc<AtomicBool>) -> anyhow::Result<()> {
    let listen_addr = state.config.listen_addr.clone();
    let app = router(state);

    let listener = TcpListener::bind(&listen_addr).await?;
    info!("Court usage server listening on {listen_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            loop {
                tokio::time::sleep(std::time::Duration::from_secs(1)).await;
                if shutdown.load(Ordering::Relaxed) {
                    break;
                }
            }
        })
        .await?;

    Ok(())
}

// ── errors ───────────────────────────────────────────────────────────────

/// A request that could not be served. Other selections are unaffected.
pub enum ApiError {
    /// Bad query, or assembly failed; `selection` is set once the query
    /// resolved to one.
    Heatmap {
        error: HeatmapError,
        selection: Option<Selection>,
    },
    /// The bundle assembled but the PNG could not be encoded.
    Render {
        error: anyhow::Error,
        selection: Selection,
    },
}

impl From<HeatmapError> for ApiError {
    fn from(error: HeatmapError) -> Self {
        Self::Heatmap {
            error,
            selection: None,
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        HeatmapError::InvalidParameter {
            name: "query",
            value: rejection.body_text(),
        }
        .into()
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Heatmap { error, .. } => match error.kind() {
                ErrorKind::InvalidParameter => StatusCode::BAD_REQUEST,
                ErrorKind::Configuration | ErrorKind::DataIntegrity => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Render { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Heatmap { error, .. } => error.kind().as_str(),
            Self::Render { .. } => "render",
        }
    }

    /// Diagnostic naming the court / grouping / year, when known.
    fn log_line(&self) -> String {
        let (selection, message) = match self {
            Self::Heatmap { error, selection } => (*selection, error.to_string()),
            Self::Render { error, selection } => (Some(*selection), format!("{error:#}")),
        };
        match selection {
            Some(Selection {
                court,
                grouping,
                year,
            }) => format!(
                "Selection {court} / {grouping} / {year} failed ({}): {message}",
                self.kind()
            ),
            None => format!("Request rejected ({}): {message}", self.kind()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{}", self.log_line());
        } else {
            warn!("{}", self.log_line());
        }
        let error = match &self {
            Self::Heatmap { error, .. } => error.to_string(),
            Self::Render { error, .. } => format!("{error:#}"),
        };
        let body = ErrorResponse {
            error,
            kind: self.kind().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

// ── route handlers ───────────────────────────────────────────────────────

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

async fn options(State(state): State<AppState>) -> Json<OptionsResponse> {
    let config = &state.config;
    Json(OptionsResponse {
        courts: Court::ALL.to_vec(),
        group_by: Grouping::ALL.to_vec(),
        years: config.year_selectors(),
        default_court: config.default_court,
        default_group_by: config.default_grouping,
        default_year: config.default_year,
        default_display: config.default_display,
    })
}

async fn heatmap_json(
    State(state): State<AppState>,
    query: Result<Query<HeatmapQuery>, QueryRejection>,
) -> Result<Json<HeatmapResponse>, ApiError> {
    let Query(query) = query?;
    let (bundle, display) = assemble(&state, &query)?;
    Ok(Json(bundle.to_response(display)))
}

async fn heatmap_png(
    State(state): State<AppState>,
    query: Result<Query<HeatmapQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query?;
    let (bundle, display) = assemble(&state, &query)?;
    let bytes = render::render_png(&bundle, &display).map_err(|error| ApiError::Render {
        error,
        selection: bundle.selection,
    })?;
    Ok(([(header::CONTENT_TYPE, "image/png")], bytes).into_response())
}

/// Resolve the query against configured defaults and assemble the bundle.
fn assemble(
    state: &AppState,
    query: &HeatmapQuery,
) -> Result<(HeatmapBundle, DisplayOptions), ApiError> {
    let (selection, display) = parse_query(&state.config, query)?;
    let bundle = MatrixAssembler::new(&state.store)
        .assemble(selection)
        .map_err(|error| ApiError::Heatmap {
            error,
            selection: Some(selection),
        })?;
    Ok((bundle, display))
}

fn parse_query(
    config: &Config,
    query: &HeatmapQuery,
) -> Result<(Selection, DisplayOptions), HeatmapError> {
    let court = match &query.court {
        Some(c) => c.parse()?,
        None => config.default_court,
    };
    let grouping = match &query.group_by {
        Some(g) => g.parse()?,
        None => config.default_grouping,
    };
    let year = match &query.year {
        Some(y) => y.parse()?,
        None => config.default_year,
    };

    let defaults = config.default_display;
    let cell_totals = match query.cell_totals.as_deref().map(str::to_ascii_lowercase) {
        None => defaults.cell_totals,
        Some(v) if v == "on" || v == "true" || v == "1" => true,
        Some(v) if v == "off" || v == "false" || v == "0" => false,
        Some(v) => {
            return Err(HeatmapError::InvalidParameter {
                name: "cell_totals",
                value: v,
            })
        }
    };
    let display = DisplayOptions {
        height: query.height.unwrap_or(defaults.height),
        width: query.width.unwrap_or(defaults.width),
        cell_totals,
    };

    Ok((
        Selection {
            court,
            grouping,
            year,
        },
        display,
    ))
}
