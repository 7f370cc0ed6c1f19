use axum::{
    Json, Router,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use crate::chart::{self, ChartConfig};
use crate::export;
use crate::formula::{self, EvalResult};
use crate::project::Project;
use crate::saving;

pub struct AppState {
    project: Mutex<Project>,
    charts: Mutex<Vec<ChartConfig>>,
}

#[derive(Deserialize)]
struct StatUpdate {
    field: String,
    /// `null` removes the field.
    value: Option<f64>,
}

#[derive(Deserialize)]
struct EvaluateRequest {
    formula: String,
}

#[derive(Serialize)]
struct EvaluateResponse {
    result: EvalResult,
    fields: Vec<String>,
}

#[derive(Deserialize)]
struct FileQuery {
    filename: String,
}

#[derive(Serialize)]
struct StatusResponse {
    status: String,
    message: Option<String>,
}

impl StatusResponse {
    fn ok() -> Self {
        StatusResponse {
            status: "ok".to_string(),
            message: None,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        StatusResponse {
            status: "error".to_string(),
            message: Some(message.into()),
        }
    }
}

pub async fn run(
    project: Project,
    charts: Vec<ChartConfig>,
    addr: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    // Setup app state
    let app_state = Arc::new(AppState {
        project: Mutex::new(project),
        charts: Mutex::new(charts),
    });

    // Build router
    let app = Router::new()
        .route("/api/project", get(get_project))
        .route("/api/stats", post(update_stat))
        .route("/api/evaluate", post(evaluate_formula))
        .route("/api/charts", get(get_charts).put(replace_charts))
        .route("/api/save", post(save_project))
        .route("/api/load", post(load_project))
        .route("/api/export/csv", get(export_csv))
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = TcpListener::bind(addr).await?;
    println!("Listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn get_project(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let project = state.project.lock().unwrap();
    Json(project.clone())
}

async fn update_stat(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<StatUpdate>,
) -> impl IntoResponse {
    let mut project = state.project.lock().unwrap();

    match payload.value {
        Some(value) => project.set_stat(payload.field, value),
        None => {
            project.remove_stat(&payload.field);
        }
    }

    Json(StatusResponse::ok())
}

async fn evaluate_formula(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<EvaluateRequest>,
) -> impl IntoResponse {
    let project = state.project.lock().unwrap();

    Json(EvaluateResponse {
        result: formula::evaluate(&payload.formula, &project.stats),
        fields: formula::referenced_fields(&payload.formula),
    })
}

async fn get_charts(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let project = state.project.lock().unwrap();
    let charts = state.charts.lock().unwrap();

    Json(chart::compute_all(&charts, &project.stats))
}

async fn replace_charts(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<Vec<ChartConfig>>,
) -> impl IntoResponse {
    let mut charts = state.charts.lock().unwrap();
    *charts = payload;

    Json(StatusResponse::ok())
}

async fn save_project(
    Query(params): Query<FileQuery>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let project = state.project.lock().unwrap();

    match saving::save_project(&project, &params.filename) {
        Ok(_) => Json(StatusResponse::ok()).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(StatusResponse::error(e.to_string())),
        )
            .into_response(),
    }
}

async fn load_project(
    Query(params): Query<FileQuery>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    match saving::load_project(&params.filename) {
        Ok(loaded) => {
            let mut project = state.project.lock().unwrap();
            *project = loaded;
            Json(StatusResponse::ok()).into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(StatusResponse::error(format!(
                "Failed to load project: {}",
                e
            ))),
        )
            .into_response(),
    }
}

async fn export_csv(State(state): State<Arc<AppState>>) -> Response {
    let project = state.project.lock().unwrap();
    let charts = state.charts.lock().unwrap();

    match export::to_csv(&project, &charts) {
        Ok(csv) => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "text/csv")
            .header(
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"project.csv\"",
            )
            .body(axum::body::Body::from(csv))
            .unwrap(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(StatusResponse::error(e.to_string())),
        )
            .into_response(),
    }
}
