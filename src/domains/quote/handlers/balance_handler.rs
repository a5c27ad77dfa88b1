// Balance Handler
// 잔고 핸들러

use axum::{extract::State, http::StatusCode, Json};

use crate::domains::quote::models::BalancesResponse;
use crate::shared::errors::QuoteError;
use crate::shared::middleware::auth::AuthenticatedUser;
use crate::shared::services::AppState;
use crate::shared::utils::Clock;

/// 내 잔고 조회 핸들러
/// Get all balances for authenticated user
///
/// 경로: GET /api/balances
/// 인증: 필요 (JWT 토큰)
///
/// 처음 조회하면 지원하는 모든 통화/자산의 0 잔고 행을 만듭니다.
#[utoipa::path(
    get,
    path = "/api/balances",
    responses(
        (status = 200, description = "Balances retrieved successfully", body = BalancesResponse),
        (status = 401, description = "Unauthorized (missing or invalid token)"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Balances",
    security(("BearerAuth" = []))
)]
pub async fn list_balances(
    State(app_state): State<AppState>,
    authenticated_user: AuthenticatedUser,
) -> Result<Json<BalancesResponse>, (StatusCode, Json<serde_json::Value>)> {
    let now = app_state.quote_state.clock.now();

    let balances = app_state
        .quote_state
        .balance_guard
        .list_balances(authenticated_user.user_id, now)
        .await
        .map_err(|e: QuoteError| -> (StatusCode, Json<serde_json::Value>) { e.into() })?;

    Ok(Json(balances))
}
