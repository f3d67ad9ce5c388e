//! Cryptocurrency prices (GET /api/crypto)

use std::collections::HashMap;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::Response,
};
use chrono::{TimeZone, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::api::{policy::CRYPTO, respond, AppState, ClientIdentity};
use crate::error::{ApiError, Result};
use crate::models::requests::or_default;
use crate::models::CryptoQuery;
use crate::routes::query_params;
use crate::upstream::{UpstreamClient, UpstreamError};

const UNAVAILABLE: &str = "Crypto service unavailable";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoinPrice {
    pub coin: String,
    pub currency: String,
    pub price: f64,
    pub market_cap: Option<f64>,
    pub volume_24h: Option<f64>,
    pub change_24h: Option<f64>,
    pub last_updated: String,
}

/// CoinGecko's simple-price body: coin id to field name to number.
type SimplePrice = HashMap<String, HashMap<String, f64>>;

/// Handler for GET /api/crypto
pub async fn crypto_handler(
    State(state): State<AppState>,
    ClientIdentity(identity): ClientIdentity,
    query: std::result::Result<Query<CryptoQuery>, QueryRejection>,
) -> Response {
    let result = price(&state, &identity, query).await;
    respond(&CRYPTO, &identity, result)
}

async fn price(
    state: &AppState,
    identity: &str,
    query: std::result::Result<Query<CryptoQuery>, QueryRejection>,
) -> Result<Value> {
    state.check_rate(&CRYPTO, identity).await?;
    let query = query_params(query)?;

    let coin = or_default(&query.coin, "bitcoin").to_lowercase();
    let currency = or_default(&query.currency, "usd").to_lowercase();

    let key = format!("{coin}:{currency}");
    state
        .cached(&CRYPTO, &key, || async {
            let price = fetch_price(&state.upstream, &coin, &currency)
                .await
                .map_err(|e| ApiError::upstream(UNAVAILABLE, e))?;
            serde_json::to_value(price).map_err(|e| ApiError::internal(UNAVAILABLE, e.to_string()))
        })
        .await
}

/// Looks up the current price of `coin` in `currency`.
///
/// # Errors
///
/// `NotFound` when CoinGecko has no quote for the pair, otherwise whatever
/// the request itself failed with.
pub async fn fetch_price(
    upstream: &UpstreamClient,
    coin: &str,
    currency: &str,
) -> std::result::Result<CoinPrice, UpstreamError> {
    let url = format!("{}/simple/price", upstream.config().coingecko_base_url);
    let body: SimplePrice = upstream
        .get_json(
            &url,
            &[
                ("ids", coin),
                ("vs_currencies", currency),
                ("include_24hr_change", "true"),
                ("include_market_cap", "true"),
                ("include_24hr_vol", "true"),
                ("include_last_updated_at", "true"),
            ],
        )
        .await?;

    let fields = body
        .get(coin)
        .ok_or_else(|| UpstreamError::NotFound(format!("coin {coin}")))?;
    let price = *fields
        .get(currency)
        .ok_or_else(|| UpstreamError::NotFound(format!("{coin} in {currency}")))?;

    let last_updated = fields
        .get("last_updated_at")
        .and_then(|secs| Utc.timestamp_opt(*secs as i64, 0).single())
        .unwrap_or_else(Utc::now)
        .to_rfc3339();

    Ok(CoinPrice {
        coin: coin.to_string(),
        currency: currency.to_uppercase(),
        price,
        market_cap: fields.get(&format!("{currency}_market_cap")).copied(),
        volume_24h: fields.get(&format!("{currency}_24h_vol")).copied(),
        change_24h: fields.get(&format!("{currency}_24h_change")).copied(),
        last_updated,
    })
}
