use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::config::PublicMapConfig;
use crate::environment::AppState;
use crate::errors::{AppError, AppResult};
use crate::models::clean_identifier;
use crate::services::dashboard::{Feed, Legend, RouteView};
use crate::services::markers::{ClusterSize, MarkerView};
use crate::services::stats::StatsDisplay;
use crate::tools::i18n::Language;

pub fn create_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/ready", web::get().to(readiness_check))
        .route("/config", web::get().to(get_map_config))
        .route("/stats", web::get().to(get_stats))
        .route("/markers/trains", web::get().to(get_train_markers))
        .route("/markers/works", web::get().to(get_works_markers))
        .route("/markers/cluster", web::get().to(get_cluster))
        .route("/route", web::get().to(get_route))
        .route("/select/{train_id}", web::post().to(select_train))
        .route("/select", web::delete().to(clear_selection))
        .route("/language/{lang}", web::post().to(set_language));
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub display: StatsDisplay,
    pub lines: Vec<String>,
    pub legend: Legend,
    pub language: Language,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub works_error: Option<String>,
    pub last_update: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct ClusterQuery {
    /// Comma-separated train ids.
    pub ids: String,
}

#[derive(Debug, Serialize)]
pub struct ClusterResponse {
    pub cluster_size: ClusterSize,
}

async fn readiness_check(app_state: web::Data<AppState>) -> AppResult<HttpResponse> {
    if !app_state.dashboard.read().await.is_ready() {
        return Err(AppError::NotReady(
            "Service not ready - waiting for the first train data".to_string(),
        ));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "message": "Service is ready to handle requests"
    })))
}

async fn get_map_config(app_state: web::Data<AppState>) -> web::Json<PublicMapConfig> {
    web::Json(app_state.config.map.public_view())
}

async fn get_stats(app_state: web::Data<AppState>) -> web::Json<StatsResponse> {
    let dashboard = app_state.dashboard.read().await;
    let language = dashboard.language();
    web::Json(StatsResponse {
        display: dashboard.stats().clone(),
        lines: dashboard.stats_lines(),
        legend: dashboard.legend(),
        language,
        works_error: dashboard.works_error().map(str::to_string),
        last_update: dashboard.last_update(),
    })
}

async fn get_train_markers(app_state: web::Data<AppState>) -> web::Json<Vec<MarkerView>> {
    web::Json(app_state.dashboard.read().await.marker_views(Feed::Trains))
}

async fn get_works_markers(app_state: web::Data<AppState>) -> web::Json<Vec<MarkerView>> {
    web::Json(app_state.dashboard.read().await.marker_views(Feed::Works))
}

/// Size class for one cluster of train markers drawn by the front-end.
async fn get_cluster(
    app_state: web::Data<AppState>,
    query: web::Query<ClusterQuery>,
) -> web::Json<ClusterResponse> {
    let ids: Vec<String> = query
        .ids
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect();
    web::Json(ClusterResponse {
        cluster_size: app_state.dashboard.read().await.cluster(&ids),
    })
}

async fn get_route(app_state: web::Data<AppState>) -> web::Json<RouteView> {
    web::Json(app_state.dashboard.read().await.route_view())
}

async fn select_train(
    app_state: web::Data<AppState>,
    train_id: web::Path<String>,
) -> AppResult<web::Json<RouteView>> {
    let train_id = clean_identifier(&train_id);
    let route = app_state.dashboard.write().await.select_train(&train_id)?;
    Ok(web::Json(route))
}

async fn clear_selection(app_state: web::Data<AppState>) -> HttpResponse {
    app_state.dashboard.write().await.clear_selection();
    HttpResponse::NoContent().finish()
}

/// Switches language and refetches trains right away so popups and stop
/// names come back translated.
async fn set_language(
    app_state: web::Data<AppState>,
    lang: web::Path<String>,
) -> AppResult<HttpResponse> {
    let language: Language = lang.parse()?;
    app_state.dashboard.write().await.set_language(language);

    let poller = app_state.poller.clone();
    tokio::spawn(async move { poller.refresh_trains().await });

    Ok(HttpResponse::Ok().json(serde_json::json!({ "language": language })))
}
