// Order Handler
// 주문 핸들러
// 역할: 견적 수락으로 생성된 주문 조회

use axum::{
    extract::{rejection::PathRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use super::quote_handler::parse_id;
use crate::domains::quote::models::{OrderListQuery, OrderResponse, OrdersResponse};
use crate::shared::errors::QuoteError;
use crate::shared::middleware::auth::AuthenticatedUser;
use crate::shared::services::AppState;

/// 내 주문 목록 조회 핸들러
/// List my orders
///
/// 경로: GET /api/orders?limit=&offset=
/// 인증: 필요 (JWT 토큰)
#[utoipa::path(
    get,
    path = "/api/orders",
    params(OrderListQuery),
    responses(
        (status = 200, description = "Orders retrieved", body = OrdersResponse),
        (status = 400, description = "Invalid pagination"),
        (status = 401, description = "Unauthorized (missing or invalid token)")
    ),
    tag = "Orders",
    security(("BearerAuth" = []))
)]
pub async fn list_orders(
    State(app_state): State<AppState>,
    authenticated_user: AuthenticatedUser,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<OrdersResponse>, (StatusCode, Json<serde_json::Value>)> {
    let orders = app_state
        .quote_state
        .order_service
        .list_orders(authenticated_user.user_id, query.limit, query.offset)
        .await
        .map_err(|e: QuoteError| -> (StatusCode, Json<serde_json::Value>) { e.into() })?;

    Ok(Json(OrdersResponse { orders }))
}

/// 주문 단건 조회 핸들러
/// Get order
///
/// 경로: GET /api/orders/{id}
/// 인증: 필요 (JWT 토큰)
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order retrieved", body = OrderResponse),
        (status = 401, description = "Unauthorized (missing or invalid token)"),
        (status = 404, description = "Order not found")
    ),
    tag = "Orders",
    security(("BearerAuth" = []))
)]
pub async fn get_order(
    State(app_state): State<AppState>,
    authenticated_user: AuthenticatedUser,
    order_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<OrderResponse>, (StatusCode, Json<serde_json::Value>)> {
    let order_id = parse_id(order_id)?;

    let order = app_state
        .quote_state
        .order_service
        .get_order(authenticated_user.user_id, order_id)
        .await
        .map_err(|e: QuoteError| -> (StatusCode, Json<serde_json::Value>) { e.into() })?;

    Ok(Json(OrderResponse {
        message: format!("Order {}", order.reference),
        order,
    }))
}
