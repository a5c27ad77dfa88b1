// Routes module: 라우팅 설정
// 역할: 모든 도메인의 라우터를 조합
// Routes module: combines all domain routers

use axum::Router;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::shared::services::AppState;

// 각 도메인의 routes import
use crate::domains::quote::routes::create_quote_router;

pub mod api_doc;

pub use api_doc::{ApiDoc, SecurityAddon};

/// Create main router (combines all domain routers)
/// 메인 라우터 생성 (모든 도메인 라우터 조합)
pub fn create_router() -> Router<AppState> {
    Router::new().nest("/api", create_quote_router())
}

/// 상태가 연결된 전체 애플리케이션 (Swagger UI, 요청 추적 포함)
/// Full application with Swagger UI and request tracing
///
/// CORS 는 배포 설정에 따라 main 에서 추가합니다.
pub fn create_app(app_state: AppState) -> Router {
    Router::new()
        .merge(create_router())
        .merge(
            SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", ApiDoc::openapi())
        )
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
