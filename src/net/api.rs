//! Endpoint services for the CryptoDash BFF.
//!
//! SYSTEM CONTEXT
//! ==============
//! Thin typed wrappers over the gateway verbs, grouped the way views consume
//! them. None of these add behavior of their own: credential attachment and
//! expiry handling happen in the gateway.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::sync::Arc;

use serde_json::Value;

use super::error::ApiError;
use super::gateway::Gateway;
use super::transport::RequestBody;
use super::types::{
    AccessToken, CryptoPage, Credentials, Currency, Favorite, HistoryQuery, ListQuery, MarketSummary, NewFavorite,
    NewUser, PriceHistory, User, UserUpdate,
};

pub const LOGIN_PATH: &str = "/login";
pub const SIGNUP_PATH: &str = "/signup";
pub const CURRENT_USER_PATH: &str = "/logado";
pub const CRYPTOCURRENCIES_PATH: &str = "/cryptocurrencies";
pub const MARKET_SUMMARY_PATH: &str = "/market/summary";
pub const FAVORITES_PATH: &str = "/favorites";
pub const FAVORITES_LIST_PATH: &str = "/favorites/all";

fn user_endpoint(user_id: i64) -> String {
    format!("/{user_id}")
}

fn history_endpoint(coin_id: &str) -> String {
    format!("{CRYPTOCURRENCIES_PATH}/{}/history", coin_id.trim())
}

fn favorite_endpoint(favorite_id: i64) -> String {
    format!("{FAVORITES_PATH}/{favorite_id}")
}

// =============================================================================
// USERS
// =============================================================================

#[derive(Clone)]
pub struct UserService {
    gateway: Arc<Gateway>,
}

impl UserService {
    #[must_use]
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    /// Exchange a username/password for an access token (`POST /login`, form-encoded).
    ///
    /// Sent without the stored token, so a rejected password never expires
    /// an existing session.
    ///
    /// # Errors
    ///
    /// Returns the gateway failure; rejected credentials carry the backend detail.
    pub async fn login(&self, credentials: &Credentials) -> Result<AccessToken, ApiError> {
        self.gateway
            .post_form_anonymous(LOGIN_PATH, credentials.form_fields())
            .await
    }

    /// Register a new account (`POST /signup`). The response body is passed through.
    ///
    /// # Errors
    ///
    /// Returns the gateway failure.
    pub async fn signup(&self, user: &NewUser) -> Result<Value, ApiError> {
        let response = self
            .gateway
            .post(SIGNUP_PATH, RequestBody::Json(to_json(user)?))
            .await?;
        Ok(serde_json::from_str(&response.body).unwrap_or(Value::Null))
    }

    /// Identity of the current bearer token (`GET /logado`).
    ///
    /// # Errors
    ///
    /// Returns the gateway failure.
    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.gateway
            .get_json(CURRENT_USER_PATH, Vec::new())
            .await
    }

    /// # Errors
    ///
    /// Returns the gateway failure.
    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.gateway.get_json("/", Vec::new()).await
    }

    /// # Errors
    ///
    /// Returns the gateway failure.
    pub async fn get_user(&self, user_id: i64) -> Result<User, ApiError> {
        self.gateway
            .get_json(&user_endpoint(user_id), Vec::new())
            .await
    }

    /// # Errors
    ///
    /// Returns the gateway failure.
    pub async fn update_user(&self, user_id: i64, update: &UserUpdate) -> Result<User, ApiError> {
        self.gateway
            .put_json(&user_endpoint(user_id), update)
            .await
    }

    /// # Errors
    ///
    /// Returns the gateway failure.
    pub async fn delete_user(&self, user_id: i64) -> Result<(), ApiError> {
        self.gateway.delete(&user_endpoint(user_id)).await?;
        Ok(())
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::InvalidRequest(e.to_string()))
}

// =============================================================================
// MARKET DATA
// =============================================================================

#[derive(Clone)]
pub struct CryptoService {
    gateway: Arc<Gateway>,
}

impl CryptoService {
    #[must_use]
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    /// One page of the coin listing (`GET /cryptocurrencies`).
    ///
    /// # Errors
    ///
    /// Returns the gateway failure.
    pub async fn list(&self, query: &ListQuery) -> Result<CryptoPage, ApiError> {
        self.gateway
            .get_json(CRYPTOCURRENCIES_PATH, query.query_pairs())
            .await
    }

    /// Price history for one coin (`GET /cryptocurrencies/{id}/history`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidRequest` for a blank id, otherwise the gateway failure.
    pub async fn history(&self, coin_id: &str, query: &HistoryQuery) -> Result<PriceHistory, ApiError> {
        if coin_id.trim().is_empty() {
            return Err(ApiError::InvalidRequest("cryptocurrency id is required".to_owned()));
        }
        self.gateway
            .get_json(&history_endpoint(coin_id), query.query_pairs())
            .await
    }
}

#[derive(Clone)]
pub struct MarketService {
    gateway: Arc<Gateway>,
}

impl MarketService {
    #[must_use]
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    /// # Errors
    ///
    /// Returns the gateway failure.
    pub async fn summary(&self, currency: Currency) -> Result<MarketSummary, ApiError> {
        let query = vec![("currency".to_owned(), currency.as_str().to_owned())];
        self.gateway
            .get_json(MARKET_SUMMARY_PATH, query)
            .await
    }
}

// =============================================================================
// FAVORITES
// =============================================================================

#[derive(Clone)]
pub struct FavoriteService {
    gateway: Arc<Gateway>,
}

impl FavoriteService {
    #[must_use]
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    /// # Errors
    ///
    /// Returns the gateway failure.
    pub async fn add(&self, coin_id: &str) -> Result<Favorite, ApiError> {
        let body = NewFavorite { coin_id: coin_id.trim().to_ascii_lowercase() };
        self.gateway.post_json(FAVORITES_PATH, &body).await
    }

    /// # Errors
    ///
    /// Returns the gateway failure.
    pub async fn list(&self) -> Result<Vec<Favorite>, ApiError> {
        self.gateway
            .get_json(FAVORITES_LIST_PATH, Vec::new())
            .await
    }

    /// # Errors
    ///
    /// Returns the gateway failure.
    pub async fn remove(&self, favorite_id: i64) -> Result<(), ApiError> {
        self.gateway
            .delete(&favorite_endpoint(favorite_id))
            .await?;
        Ok(())
    }
}

// =============================================================================
// BUNDLE
// =============================================================================

/// All endpoint services sharing one gateway.
#[derive(Clone)]
pub struct Api {
    pub users: UserService,
    pub crypto: CryptoService,
    pub market: MarketService,
    pub favorites: FavoriteService,
}

impl Api {
    #[must_use]
    pub fn new(gateway: &Arc<Gateway>) -> Self {
        Self {
            users: UserService::new(gateway.clone()),
            crypto: CryptoService::new(gateway.clone()),
            market: MarketService::new(gateway.clone()),
            favorites: FavoriteService::new(gateway.clone()),
        }
    }
}
