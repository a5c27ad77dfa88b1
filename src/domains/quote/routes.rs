use axum::{
    routing::{get, post},
    Router,
};

use crate::shared::services::AppState;

use super::handlers;

/// 견적 라우터 생성
/// Create quote router
///
/// 견적/주문/잔고 API 엔드포인트를 등록합니다.
///
/// # Routes
///
/// ## Quotes (견적)
/// - `POST   /api/quotes` - 견적 생성
/// - `GET    /api/quotes` - 내 견적 목록
/// - `DELETE /api/quotes` - 견적 일괄 삭제
/// - `GET    /api/quotes/:id` - 견적 조회
/// - `POST   /api/quotes/:id/accept` - 견적 수락 (주문 생성)
///
/// ## Orders (주문)
/// - `GET    /api/orders` - 내 주문 목록
/// - `GET    /api/orders/:id` - 주문 조회
///
/// ## Balances (잔고)
/// - `GET    /api/balances` - 내 잔고 조회
pub fn create_quote_router() -> Router<AppState> {
    Router::new()
        // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
        // Quotes (견적)
        // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

        .route("/quotes",
            post(handlers::create_quote)
                .get(handlers::list_quotes)
                .delete(handlers::clear_quotes)
        )

        .route("/quotes/:quote_id", get(handlers::get_quote))

        .route("/quotes/:quote_id/accept", post(handlers::accept_quote))

        // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
        // Orders (주문)
        // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

        .route("/orders", get(handlers::list_orders))

        .route("/orders/:order_id", get(handlers::get_order))

        // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
        // Balances (잔고)
        // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

        .route("/balances", get(handlers::list_balances))
}
