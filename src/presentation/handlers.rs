// HTTP request handlers
use crate::domain::controls::{Controls, ControlsUpdate};
use crate::infrastructure::config::ConfigError;
use crate::presentation::app_state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct NewPlant {
    pub name: String,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn list_plants(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.greenhouse.load().await {
        Ok(config) => Json(config.plants).into_response(),
        Err(e) => config_error_response(e),
    }
}

/// Add a plant to the configuration document; the source reopens with the new plant set
pub async fn add_plant(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewPlant>,
) -> impl IntoResponse {
    match state.greenhouse.add_plant(&body.name).await {
        Ok(name) => {
            state.controls.send_modify(|c| c.request_reopen());
            (StatusCode::CREATED, Json(name)).into_response()
        }
        Err(e) => config_error_response(e),
    }
}

pub async fn remove_plant(
    Path(name): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    match state.greenhouse.remove_plant(&name).await {
        Ok(()) => {
            state.controls.send_modify(|c| {
                if c.selected_plant.as_deref() == Some(name.as_str()) {
                    c.selected_plant = None;
                }
                c.request_reopen();
            });
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => config_error_response(e),
    }
}

pub async fn get_controls(State(state): State<Arc<AppState>>) -> Json<Controls> {
    Json(state.controls.borrow().clone())
}

/// Partial update of mode, stream URL, selection and sliders.
/// A selected plant must exist in the configuration document.
pub async fn update_controls(
    State(state): State<Arc<AppState>>,
    Json(update): Json<ControlsUpdate>,
) -> Response {
    if let Some(plant) = update.selected_plant.as_deref().filter(|p| !p.is_empty()) {
        match state.greenhouse.load().await {
            Ok(config) if config.plants.iter().any(|p| p == plant) => {}
            Ok(_) => return config_error_response(ConfigError::UnknownPlant(plant.to_string())),
            Err(e) => return config_error_response(e),
        }
    }

    state.controls.send_modify(|c| c.apply(update));
    Json(state.controls.borrow().clone()).into_response()
}

/// Reopen the current source, e.g. after the stream server came back
pub async fn reconnect(State(state): State<Arc<AppState>>) -> StatusCode {
    state.controls.send_modify(|c| c.request_reopen());
    StatusCode::ACCEPTED
}

/// Latest chart set for the selected plant; 204 while waiting for live data
pub async fn get_dashboard(State(state): State<Arc<AppState>>) -> Response {
    let selected = state.controls.borrow().selected_plant.clone();
    let dashboard = state.dashboard.borrow().clone();

    match dashboard {
        Some(d) if selected.as_deref().is_none_or(|s| s == d.plant) => Json(d).into_response(),
        _ => StatusCode::NO_CONTENT.into_response(),
    }
}

pub async fn get_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.status.borrow().clone())
}

fn config_error_response(e: ConfigError) -> Response {
    let status = match &e {
        ConfigError::EmptyPlantName => StatusCode::BAD_REQUEST,
        ConfigError::DuplicatePlant(_) => StatusCode::CONFLICT,
        ConfigError::UnknownPlant(_) => StatusCode::NOT_FOUND,
        ConfigError::Io { .. } | ConfigError::Parse { .. } => {
            tracing::error!(error = %e, "greenhouse configuration unavailable");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, e.to_string()).into_response()
}
