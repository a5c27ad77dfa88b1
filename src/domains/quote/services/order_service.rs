use std::sync::Arc;

use uuid::Uuid;

use crate::domains::quote::models::Order;
use crate::domains::quote::store::QuoteStore;
use crate::shared::errors::QuoteError;

/// 기본 조회 개수
pub const DEFAULT_ORDER_LIMIT: i64 = 100;

/// 최대 조회 개수
pub const MAX_ORDER_LIMIT: i64 = 500;

/// 주문 조회 서비스
/// Order query service
#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn QuoteStore>,
}

impl OrderService {
    pub fn new(store: Arc<dyn QuoteStore>) -> Self {
        Self { store }
    }

    /// 사용자 주문 목록 (최신순)
    /// List the caller's orders, newest first
    pub async fn list_orders(
        &self,
        user_id: u64,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Order>, QuoteError> {
        let limit = limit.unwrap_or(DEFAULT_ORDER_LIMIT);
        let offset = offset.unwrap_or(0);

        if !(1..=MAX_ORDER_LIMIT).contains(&limit) {
            return Err(QuoteError::InvalidInput(format!(
                "limit must be between 1 and {}",
                MAX_ORDER_LIMIT
            )));
        }
        if offset < 0 {
            return Err(QuoteError::InvalidInput(
                "offset must not be negative".to_string(),
            ));
        }

        Ok(self.store.list_orders(user_id, limit, offset).await?)
    }

    /// 주문 단건 조회 (다른 사용자의 주문은 NotFound)
    pub async fn get_order(&self, user_id: u64, order_id: Uuid) -> Result<Order, QuoteError> {
        self.store
            .get_order(order_id)
            .await?
            .filter(|order| order.user_id == user_id)
            .ok_or_else(|| QuoteError::order_not_found(order_id))
    }
}
