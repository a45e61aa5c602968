use std::sync::Arc;

use anyhow::{Error, Result};
use axum::{
    Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use serde_json::Value;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    clients::{health::HealthChecker, rbmq::QueuePublisher},
    models::{
        health::HealthStatus,
        message::QueueMessage,
        registration::RegistrationAccepted,
        response::ApiResponse,
        validation::validate_registration,
    },
};

pub struct AppState {
    publisher: Arc<dyn QueuePublisher>,
    health_checker: HealthChecker,
}

impl AppState {
    pub fn new(publisher: Arc<dyn QueuePublisher>, health_checker: HealthChecker) -> Self {
        Self {
            publisher,
            health_checker,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_api_server(server_port: u16, state: Arc<AppState>) -> Result<(), Error> {
    let app = router(state);

    let addr = format!("0.0.0.0:{}", server_port);
    let listener = TcpListener::bind(&addr).await?;

    info!(address = %addr, "Registration API server started");

    axum::serve(listener, app).await?;

    Ok(())
}

type RegisterResponse = (StatusCode, Json<ApiResponse<RegistrationAccepted>>);

async fn register(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> RegisterResponse {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            warn!(error = %rejection, "Rejected registration request body");
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error(
                    rejection.body_text(),
                    "Invalid JSON body".to_string(),
                )),
            );
        }
    };

    info!("Received registration request");

    let registration = match validate_registration(&body) {
        Ok(registration) => registration,
        Err(failure) => {
            warn!(missing = ?failure.missing_fields, "Registration request has missing fields");
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error(
                    failure.to_string(),
                    "Validation failed".to_string(),
                )),
            );
        }
    };

    let request_id = Uuid::new_v4().to_string();
    let message = QueueMessage::signup(&registration, &request_id);

    if let Err(e) = state.publisher.publish(&message).await {
        error!(request_id = %request_id, error = %e, "Failed to enqueue registration");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error(
                format!("An error occurred: {}", e),
                "Failed to enqueue registration".to_string(),
            )),
        );
    }

    info!(
        request_id = %request_id,
        username = %registration.username,
        "User request added to the queue"
    );

    (
        StatusCode::ACCEPTED,
        Json(ApiResponse::success(
            RegistrationAccepted { request_id },
            "User request added to the queue.".to_string(),
        )),
    )
}

async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_checker.check_all().await;

    let status_code = match health.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}
