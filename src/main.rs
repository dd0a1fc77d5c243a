use std::env::args;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    Json, response::Response,
    Router,
    routing::get,
};
use axum::extract::{ConnectInfo, Request};
use axum::middleware::Next;
use tower_http::cors::{Any, CorsLayer};
use log::{error, info, warn};

use tab_group_vault::config::Config;
use tab_group_vault::logger;
use tab_group_vault::models::group::{Group, Summary};
use tab_group_vault::models::update_response::UpdateResponse;
use tab_group_vault::reconciler::{normalize, summarize};
use tab_group_vault::store::{FileStore, GroupStore};

#[derive(Clone)]
struct AppState {
    store: Arc<dyn GroupStore>,
}

#[tokio::main]
async fn main() {
    if let Err(e) = logger::setup_logger("logs") {
        eprintln!("Failed to set up logging: {}", e);
    }
    info!("Starting server... at {}", chrono::Utc::now());
    let params: Vec<String> = args().collect();
    if params.len() < 2 {
        println!("Usage: {} <port>", params[0]);
        println!("data directory should be created in the current directory");

        error!("Error: missing port number");
        return;
    }

    let port = match params[1].parse::<u16>() {
        Ok(port) => port,
        Err(e) => {
            println!("Invalid port {}: {}", params[1], e);
            error!("Error: invalid port {}: {}", params[1], e);
            return;
        }
    };

    // check data directory
    let data_dir = match std::env::current_dir() {
        Ok(dir) => dir.join("data"),
        Err(e) => {
            error!("Error: cannot resolve current directory: {}", e);
            return;
        }
    };
    if !data_dir.exists() {
        println!("Create data directory: {:?}", data_dir);
        error!("Error: missing data directory");
        return;
    }

    let config = Config::new();
    let store = FileStore::new(&data_dir, config.settings.clone());
    info!("Serving slot {:?}", store.path());
    let state = AppState {
        store: Arc::new(store),
    };

    println!("Listening on port {}", port);
    info!("Listening on port {}", port);

    match tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await {
        Ok(listener) => {
            match axum::serve(listener, app(state).into_make_service_with_connect_info::<SocketAddr>()).await {
                Ok(_) => {
                    info!("Web server stopped");
                }
                Err(e) => {
                    println!("Error: {}", e);
                    error!("Error: {}", e);
                }
            }
        }
        Err(e) => {
            println!("Error: {}", e);
            error!("Error: {}", e);
        }
    }
}

fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
    ;
    Router::new()
        .route("/", get(root))
        .route("/api/", get(root))
        .route("/api/groups", get(get_groups).post(replace_groups))
        .route("/api/groups/summary", get(get_summary))
        .layer(axum::middleware::from_fn(access_log_middleware))
        .layer(cors)
        .with_state(state)
}

async fn access_log_middleware(
    ConnectInfo(socket_addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    info!("{} - {} {}", socket_addr, request.method(), request.uri().path());
    next.run(request).await
}

async fn root() -> (StatusCode, Json<String>) {
    let message = format!("version: {}, {}", env!("CARGO_PKG_VERSION"), chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
    (StatusCode::OK, Json(message))
}

async fn get_groups(State(state): State<AppState>) -> (StatusCode, Json<Vec<Group>>) {
    match state.store.read().await {
        Ok(groups) => (StatusCode::OK, Json(groups)),
        Err(e) => {
            error!("Error reading groups: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(Vec::new()))
        }
    }
}

async fn get_summary(State(state): State<AppState>) -> (StatusCode, Json<Summary>) {
    match state.store.read().await {
        Ok(groups) => (StatusCode::OK, Json(summarize(&normalize(groups)))),
        Err(e) => {
            error!("Error reading groups: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(Summary::default()))
        }
    }
}

/// Replaces the whole slot with the posted collection. Last writer wins.
async fn replace_groups(
    State(state): State<AppState>, Json(groups): Json<Vec<Group>>
) -> (StatusCode, Json<UpdateResponse>) {
    let summary = summarize(&groups);
    match state.store.write(&groups).await {
        Ok(()) => {
            (StatusCode::OK, Json(UpdateResponse {
                message: "OK".to_string(),
                summary,
                updated_at: chrono::Utc::now()
            }))
        }
        Err(e) => {
            warn!("Error saving groups: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(UpdateResponse {
                message: format!("Error saving groups: {}", e),
                summary: Summary::default(),
                updated_at: chrono::Utc::now()
            }))
        }
    }
}
