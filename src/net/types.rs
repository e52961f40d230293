//! Typed records for the BFF endpoints.
//!
//! DESIGN
//! ======
//! Backend payloads are opaque to the session layer, but each endpoint gets
//! an explicit record here so defaulting rules (missing page -> 1, missing
//! list -> empty) live in one place instead of in every view. Fields this
//! client does not interpret are kept in a flattened `extra` map so nothing
//! is lost on the way through.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// CURRENCY
// =============================================================================

/// Quote currency supported by the BFF.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    #[default]
    Usd,
    Eur,
}

impl Currency {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Usd => "usd",
            Self::Eur => "eur",
        }
    }

    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Usd => "$",
            Self::Eur => "€",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "usd" => Ok(Self::Usd),
            "eur" => Ok(Self::Eur),
            other => Err(format!("unsupported currency '{other}' (expected 'usd' or 'eur')")),
        }
    }
}

// =============================================================================
// USERS & AUTH
// =============================================================================

/// Identity returned by `GET /logado` and the user CRUD endpoints.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
    /// Backend-defined fields this client does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Registration payload for `POST /signup`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct NewUser {
    pub name: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("name", &self.name)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// Partial update for `PUT /{id}`; absent fields are not sent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Username/password pair submitted form-encoded to `POST /login`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self { username: username.into(), password: password.into() }
    }

    #[must_use]
    pub fn form_fields(&self) -> Vec<(String, String)> {
        vec![
            ("username".to_owned(), self.username.clone()),
            ("password".to_owned(), self.password.clone()),
        ]
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

// =============================================================================
// MARKET DATA
// =============================================================================

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Cryptocurrency {
    pub id: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub market_cap_rank: Option<u32>,
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Page metadata as reported by the server; any field may be missing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    #[serde(default)]
    pub current_page: Option<u32>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub per_page: Option<u32>,
}

/// Response of `GET /cryptocurrencies`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CryptoPage {
    #[serde(default)]
    pub current_page: Option<u32>,
    #[serde(default)]
    pub per_page: Option<u32>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub cryptocurrencies: Vec<Cryptocurrency>,
}

impl CryptoPage {
    #[must_use]
    pub fn page_info(&self) -> PageInfo {
        PageInfo {
            current_page: self.current_page,
            total: self.total,
            per_page: self.per_page,
        }
    }
}

/// Query for `GET /cryptocurrencies`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListQuery {
    pub currency: Currency,
    pub page: u32,
    pub per_page: u32,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self { currency: Currency::Usd, page: 1, per_page: 10 }
    }
}

impl ListQuery {
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        vec![
            ("currency".to_owned(), self.currency.as_str().to_owned()),
            ("page".to_owned(), self.page.to_string()),
            ("per_page".to_owned(), self.per_page.to_string()),
        ]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Unix timestamp in seconds.
    pub date: f64,
    pub price: f64,
}

/// Response of `GET /cryptocurrencies/{id}/history`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceHistory {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub history: Vec<PricePoint>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Lowest, highest and mean price over a history window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PriceStats {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

impl PriceHistory {
    /// `None` for an empty window.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn stats(&self) -> Option<PriceStats> {
        let first = self.history.first()?.price;
        let (min, max, sum) = self
            .history
            .iter()
            .fold((first, first, 0.0), |(min, max, sum), point| {
                (min.min(point.price), max.max(point.price), sum + point.price)
            });
        Some(PriceStats { min, max, avg: sum / self.history.len() as f64 })
    }
}

/// Query for `GET /cryptocurrencies/{id}/history`; dates are `YYYY-MM-DD`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HistoryQuery {
    pub currency: Currency,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl HistoryQuery {
    /// Window of `days` days ending on `end`.
    #[must_use]
    pub fn ending_on(currency: Currency, end: time::Date, days: i64) -> Self {
        let start = end
            .checked_sub(time::Duration::days(days))
            .unwrap_or(end);
        Self {
            currency,
            start_date: Some(start.to_string()),
            end_date: Some(end.to_string()),
        }
    }

    /// The last seven days up to today (UTC).
    #[must_use]
    pub fn last_week(currency: Currency) -> Self {
        Self::ending_on(currency, time::OffsetDateTime::now_utc().date(), 7)
    }

    #[must_use]
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("currency".to_owned(), self.currency.as_str().to_owned())];
        if let Some(start) = &self.start_date {
            pairs.push(("start_date".to_owned(), start.clone()));
        }
        if let Some(end) = &self.end_date {
            pairs.push(("end_date".to_owned(), end.clone()));
        }
        pairs
    }
}

/// A coin highlighted by the market summary.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketMover {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub percentage_change_24h: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response of `GET /market/summary`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketSummary {
    #[serde(default)]
    pub top_gainer: Option<MarketMover>,
    #[serde(default)]
    pub top_loser: Option<MarketMover>,
    #[serde(default)]
    pub top_market_cap: Vec<MarketMover>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// =============================================================================
// FAVORITES
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Favorite {
    pub id: i64,
    pub coin_id: String,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewFavorite {
    pub coin_id: String,
}
