use utoipa::OpenApi;

use crate::domains::quote::models::*;

// OpenAPI 스키마 정의: Swagger 문서 자동 생성
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::domains::quote::handlers::quote_handler::create_quote,
        crate::domains::quote::handlers::quote_handler::list_quotes,
        crate::domains::quote::handlers::quote_handler::get_quote,
        crate::domains::quote::handlers::quote_handler::accept_quote,
        crate::domains::quote::handlers::quote_handler::clear_quotes,
        crate::domains::quote::handlers::order_handler::list_orders,
        crate::domains::quote::handlers::order_handler::get_order,
        crate::domains::quote::handlers::balance_handler::list_balances
    ),
    components(schemas(
        CreateQuoteRequest,
        CreateQuoteResponse,
        QuoteDetailResponse,
        QuotesResponse,
        ClearQuotesResponse,
        Quote,
        QuoteStatus,
        QuoteInputKind,
        TradeType,
        FiatCurrency,
        CryptoAsset,
        BalanceShortfall,
        BalanceSide,
        FiatBalance,
        CryptoBalance,
        BalancesResponse,
        Order,
        OrderStatus,
        OrderResponse,
        OrdersResponse
    )),
    modifiers(
        &SecurityAddon
    ),
    tags(
        (name = "Quotes", description = "Time-limited price quotes and acceptance"),
        (name = "Orders", description = "Orders created from accepted quotes"),
        (name = "Balances", description = "Fiat and crypto balances")
    ),
    info(
        title = "Quote Server",
        description = "Fiat/crypto quote and order conversion API",
        version = "1.0.0"
    )
)]
pub struct ApiDoc;

// Security scheme 정의: Swagger UI에서 "Authorize" 버튼 추가
pub struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "BearerAuth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
