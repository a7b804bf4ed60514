//! 카탈로그 API 서버.
//!
//! 토큰 발급(로그인)과 요청 인증을 제공하는 Axum 서버를 시작합니다.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use catalog_api::auth::{SigningKey, TokenCodec, AUTH_TOKEN_HEADER};
use catalog_api::metrics::setup_metrics_recorder;
use catalog_api::repository::{
    seed_users, IdentityStore, InMemoryIdentityStore, NewUser, PgIdentityStore,
};
use catalog_api::routes::create_api_router;
use catalog_api::state::AppState;
use catalog_core::{init_logging, AppConfig, CatalogError, DatabaseConfig, LogConfig};

/// 사용자 저장소 생성.
///
/// `database.url`이 설정되어 있으면 PostgreSQL, 아니면 인메모리 저장소를 사용합니다.
async fn create_identity_store(
    config: &DatabaseConfig,
) -> Result<(Arc<dyn IdentityStore>, Option<sqlx::PgPool>), Box<dyn std::error::Error>> {
    let Some(url) = config.url.as_deref().filter(|u| !u.is_empty()) else {
        warn!("database.url not set, using in-memory identity store");
        return Ok((Arc::new(InMemoryIdentityStore::new()), None));
    };

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connection_timeout_secs))
        .connect(url)
        .await
        .map_err(|e| {
            error!("Failed to connect to database: {}", e);
            e
        })?;

    let store = PgIdentityStore::new(pool.clone());
    store.ensure_schema().await?;
    info!("Connected to PostgreSQL identity store");

    Ok((Arc::new(store), Some(pool)))
}

/// CORS 레이어 생성.
///
/// - `CORS_ORIGINS`: 쉼표로 구분된 허용 origin 목록
fn cors_layer() -> CorsLayer {
    let allow_origin = match std::env::var("CORS_ORIGINS") {
        Ok(origins) if !origins.is_empty() => {
            let origins: Vec<_> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();

            if origins.is_empty() {
                warn!("CORS_ORIGINS is set but contains no valid origins, allowing any");
                AllowOrigin::any()
            } else {
                info!("CORS configured with {} allowed origins", origins.len());
                AllowOrigin::list(origins)
            }
        }
        _ => {
            warn!("CORS_ORIGINS not set, allowing any origin (development mode)");
            AllowOrigin::any()
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
            AUTH_TOKEN_HEADER.clone(),
        ])
        .max_age(Duration::from_secs(3600))
}

/// /metrics 엔드포인트 핸들러.
async fn metrics_handler(
    axum::extract::State(handle): axum::extract::State<PrometheusHandle>,
) -> String {
    handle.render()
}

/// 전체 라우터 생성.
fn create_router(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metrics_handle);

    Router::new()
        .merge(metrics_router)
        .merge(create_api_router(state.clone()).with_state(state))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(cors_layer())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    let config = AppConfig::load_default()?;
    init_logging(LogConfig::from_section(&config.logging))?;

    info!("Starting Catalog API server...");

    // 시크릿 누락 시 명시적으로 허용하지 않았다면 기동 중단
    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration. Set CATALOG__AUTH__SECRET or allow the insecure default explicitly.");
        return Err(e.into());
    }

    let metrics_handle = setup_metrics_recorder()?;
    info!("Prometheus metrics recorder initialized");

    let addr: SocketAddr = config.server.bind_address().parse().map_err(|e| {
        error!(
            host = %config.server.host,
            port = config.server.port,
            error = %e,
            "소켓 주소 설정이 유효하지 않습니다. CATALOG__SERVER__HOST, CATALOG__SERVER__PORT를 확인하세요."
        );
        CatalogError::Config(format!("invalid bind address: {}", e))
    })?;

    let signing_key = SigningKey::initialize(config.auth.passphrase());
    let codec = TokenCodec::new(signing_key, config.auth.token_validity_secs);

    let (store, pool) = create_identity_store(&config.database).await?;

    let seeds = config
        .users
        .iter()
        .map(NewUser::from_seed)
        .collect::<Result<Vec<_>, _>>()?;
    let seeded = seed_users(store.as_ref(), seeds).await?;
    info!(configured = config.users.len(), seeded, "Initial users provisioned");
    if config.users.is_empty() && pool.is_none() {
        warn!("No users configured for the in-memory identity store; every sign-in will fail");
    }

    let mut state = AppState::new(codec, store);
    if let Some(pool) = pool {
        state = state.with_db_pool(pool);
    }
    let state = Arc::new(state);

    info!(
        version = %state.version,
        has_db = state.db_pool.is_some(),
        token_validity_secs = state.codec().validity_secs(),
        "Application state initialized"
    );

    let app = create_router(state, metrics_handle);

    info!(%addr, "API server listening");
    info!("Metrics available at http://{}/metrics", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped gracefully");

    Ok(())
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 반환합니다.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
