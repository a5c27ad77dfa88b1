use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::{HeaderValue, Method};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use quote_server::domains::quote::services::ExpirySweeper;
use quote_server::domains::quote::store::{InMemoryQuoteStore, PgQuoteStore, QuoteStore};
use quote_server::routes::create_app;
use quote_server::shared::clients::{HttpPriceOracle, PriceOracle};
use quote_server::shared::config::AppConfig;
use quote_server::shared::database::Database;
use quote_server::shared::services::AppState;
use quote_server::shared::utils::{Clock, SystemClock};

#[tokio::main]
async fn main() -> Result<()> {
    // 설정 로드
    let config = AppConfig::from_env().context("Failed to load configuration")?;

    // 로깅 초기화 (RUST_LOG 가 있으면 우선)
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .context("Invalid log filter")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // 저장소 선택: DATABASE_URL 이 있으면 PostgreSQL, 없으면 인메모리
    let store: Arc<dyn QuoteStore> = match &config.database_url {
        Some(db_url) => {
            let db = Database::new(db_url)
                .await
                .context("Failed to connect to database")?;
            db.initialize()
                .await
                .context("Failed to initialize database")?;
            info!("Using PostgreSQL quote store");
            Arc::new(PgQuoteStore::new(db))
        }
        None => {
            warn!("DATABASE_URL not set, using in-memory quote store (data is lost on restart)");
            Arc::new(InMemoryQuoteStore::new())
        }
    };

    let oracle: Arc<dyn PriceOracle> = Arc::new(
        HttpPriceOracle::new(&config.oracle).context("Failed to build price oracle client")?,
    );
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // AppState 생성 (모든 Service 초기화)
    let app_state = AppState::new(&config.jwt_secret, store, oracle, clock, &config.quote)
        .context("Failed to initialize AppState")?;

    // 만료 견적 백그라운드 정리
    if let Some(period) = config.quote.sweep_interval {
        let sweeper = ExpirySweeper::new(app_state.quote_state.quote_service.clone(), period);
        sweeper.start();
        info!(period_secs = period.as_secs(), "Expiry sweeper started");
    }

    // CORS 설정
    let cors = CorsLayer::new()
        .allow_origin(
            config
                .cors_origin
                .parse::<HeaderValue>()
                .context("Invalid CORS_ORIGIN")?,
        )
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
        ])
        .allow_credentials(true);

    let app = create_app(app_state).layer(cors);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

    info!(addr = %config.bind_addr, "Server running");
    info!("Swagger UI available at http://{}/swagger-ui", config.bind_addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
