use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::calculate;
use crate::models::{Currency, Decklist};

#[derive(Debug, Deserialize)]
pub struct DecklistPriceRequest {
    pub decklist: Decklist,
    pub currency: Option<Currency>,
}

/// One price when a currency was requested, both otherwise.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum DecklistPriceResponse {
    Single { currency: Currency, price: f64 },
    Both { eur: f64, usd: f64 },
}

pub async fn decklist_price(
    State(state): State<AppState>,
    Json(request): Json<DecklistPriceRequest>,
) -> Result<Json<DecklistPriceResponse>, ApiError> {
    let lookup = state.source.fetch_card_price_lookup()?;
    let price = |currency| calculate::decklist_price(&request.decklist, &lookup, currency);

    let response = match request.currency {
        Some(currency) => DecklistPriceResponse::Single {
            currency,
            price: price(currency),
        },
        None => DecklistPriceResponse::Both {
            eur: price(Currency::Eur),
            usd: price(Currency::Usd),
        },
    };
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct AveragePriceRequest {
    pub decklists: Vec<Decklist>,
    pub currency: Currency,
}

#[derive(Debug, Serialize)]
pub struct AveragePriceResponse {
    pub currency: Currency,
    pub average: f64,
    pub prices: Vec<f64>,
}

pub async fn average_price(
    State(state): State<AppState>,
    Json(request): Json<AveragePriceRequest>,
) -> Result<Json<AveragePriceResponse>, ApiError> {
    let decklists: Vec<&Decklist> = request
        .decklists
        .iter()
        .filter(|decklist| !decklist.is_empty())
        .collect();
    if decklists.is_empty() {
        return Err(ApiError::BadRequest(
            "decklists must contain at least one card".to_string(),
        ));
    }
    let lookup = state.source.fetch_card_price_lookup()?;

    Ok(Json(AveragePriceResponse {
        currency: request.currency,
        average: calculate::average_price(decklists.iter().copied(), &lookup, request.currency)?,
        prices: calculate::decklist_prices(decklists.iter().copied(), &lookup, request.currency),
    }))
}

#[cfg(test)]
mod tests {
    use crate::api::build_router;
    use crate::api::test_support::{post_json, setup_test_state};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_decklist_price_single_currency() {
        let tmp = tempfile::tempdir().unwrap();
        let app = build_router(setup_test_state(tmp.path()));

        let (status, json) = post_json(
            app,
            "/api/prices/decklist",
            r#"{"decklist": {"A": 2, "B": 1}, "currency": "eur"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({"currency": "eur", "price": 6.0}));
    }

    #[tokio::test]
    async fn test_decklist_price_both_currencies() {
        let tmp = tempfile::tempdir().unwrap();
        let app = build_router(setup_test_state(tmp.path()));

        let (status, json) = post_json(
            app,
            "/api/prices/decklist",
            r#"{"decklist": {"A": 2, "B": 1, "UNKNOWN": 4}}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({"eur": 6.0, "usd": 4.0}));
    }

    #[tokio::test]
    async fn test_average_price() {
        let tmp = tempfile::tempdir().unwrap();
        let app = build_router(setup_test_state(tmp.path()));

        let (status, json) = post_json(
            app,
            "/api/prices/average",
            r#"{"decklists": [{"A": 2, "B": 1}, {"B": 1}, {}], "currency": "eur"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["prices"], json!([6.0, 3.0]));
        assert_eq!(json["average"], 4.5);
    }

    #[tokio::test]
    async fn test_average_price_is_mean_of_prices() {
        let tmp = tempfile::tempdir().unwrap();
        let app = build_router(setup_test_state(tmp.path()));

        let (status, json) = post_json(
            app,
            "/api/prices/average",
            r#"{"decklists": [{}, {"A": 1}, {"A": 3, "B": 2}, {}], "currency": "usd"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let prices: Vec<f64> = json["prices"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p.as_f64().unwrap())
            .collect();
        let mean = prices.iter().sum::<f64>() / prices.len() as f64;
        assert_eq!(prices, vec![2.0, 6.0]);
        assert_eq!(json["average"].as_f64().unwrap(), mean);
    }

    #[tokio::test]
    async fn test_average_price_rejects_empty() {
        let tmp = tempfile::tempdir().unwrap();

        for body in [
            r#"{"decklists": [], "currency": "usd"}"#,
            r#"{"decklists": [{}, {}], "currency": "usd"}"#,
        ] {
            let app = build_router(setup_test_state(tmp.path()));
            let (status, _) = post_json(app, "/api/prices/average", body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }
    }
}
