use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{rejection::FormRejection as FormExtractRejection, State},
    http::StatusCode,
    routing::get,
    routing::post,
    Form, Json, Router,
};
use shared::protocol::{EndpointForm, EndpointReply, FormRejection};
use storage::Storage;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod api;
mod config;

use api::{endpoint_route, handle_form, ApiContext};
use config::{load_settings, normalize_database_url};

#[derive(Clone)]
struct AppState {
    api: ApiContext,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = load_settings();
    let database_url = normalize_database_url(&settings.database_url);
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;

    let app = build_router(Arc::new(AppState {
        api: ApiContext { storage },
    }));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "confirmation endpoint listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(endpoint_route(), post(submit_form))
        .with_state(state)
}

async fn healthz(State(state): State<Arc<AppState>>) -> (StatusCode, &'static str) {
    match state.api.storage.health_check().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(error) => {
            error!(%error, "health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    }
}

async fn submit_form(
    State(state): State<Arc<AppState>>,
    form: Result<Form<EndpointForm>, FormExtractRejection>,
) -> Json<EndpointReply> {
    match form {
        Ok(Form(form)) => Json(handle_form(&state.api, &form).await),
        Err(rejection) => {
            warn!(error = %rejection, "unreadable form body");
            Json(EndpointReply::failure(FormRejection::InvalidAction.message()))
        }
    }
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
