//! Typed HTTP client for the BuySearch REST API
//!
//! Works on native targets and in the browser. In the browser the session
//! cookie is attached by the fetch layer (`credentials: include`); natively
//! the stored token is sent as a `Cookie` header.

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use buysearch_types::{
    AuthUser, CountBucket, LoginRequest, NamedItem, NewSavedFilterSet, Notification, Page,
    ParsedQuery, PriceHistory, Product, ProductTotals, SavedFilterSet, ScraperSummary,
    UnseenCount,
};

use super::error::ApiError;
use crate::filters::ProductQuery;

/// Name of the cookie carrying the session token.
pub const TOKEN_COOKIE: &str = "token";

const MAX_ERROR_BODY: usize = 200;

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: AuthUser,
    /// Token lifted from `Set-Cookie` (native only; browsers keep it opaque)
    pub token: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FavouriteBody {
    product_id: i64,
}

#[derive(Serialize)]
struct MarkSeenBody<'a> {
    ids: &'a [i64],
}

#[derive(Serialize)]
struct ParseBody<'a> {
    query: &'a str,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let base_url = base_url.into();
        let trimmed = base_url.trim().trim_end_matches('/').to_string();
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://") || trimmed.starts_with('/'))
        {
            return Err(ApiError::InvalidBaseUrl { url: base_url });
        }
        let http = reqwest::Client::builder().build().map_err(ApiError::Client)?;
        Ok(Self {
            http,
            base_url: trimmed,
            token: None,
        })
    }

    /// Native client with a per-request timeout.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: std::time::Duration,
    ) -> Result<Self, ApiError> {
        let mut client = Self::new(base_url)?;
        client.http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Client)?;
        Ok(client)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token.filter(|t| !t.is_empty());
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        #[cfg(target_arch = "wasm32")]
        let builder = builder.fetch_credentials_include();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = match &self.token {
            Some(token) => builder.header(reqwest::header::COOKIE, format!("{TOKEN_COOKIE}={token}")),
            None => builder,
        };
        builder
    }

    async fn send(&self, builder: RequestBuilder, path: &str) -> Result<reqwest::Response, ApiError> {
        let url = self.url(path);
        tracing::debug!(%url, "api request");
        let response = builder.send().await.map_err(|source| ApiError::Transport {
            url: url.clone(),
            source,
        })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ApiError::Unauthorized {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let cut = (0..=MAX_ERROR_BODY)
                    .rev()
                    .find(|i| body.is_char_boundary(*i))
                    .unwrap_or(0);
                body.truncate(cut);
            }
            tracing::warn!(%url, status = status.as_u16(), "api request failed");
            return Err(ApiError::Status {
                url,
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        path: &str,
    ) -> Result<T, ApiError> {
        let response = self.send(builder, path).await?;
        let bytes = response.bytes().await.map_err(|source| ApiError::Transport {
            url: self.url(path),
            source,
        })?;
        serde_json::from_slice(&bytes).map_err(|source| ApiError::Decode {
            url: self.url(path),
            source,
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.json(self.request(Method::GET, path), path).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Catalogue
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn products(&self, query: &ProductQuery) -> Result<Page<Product>, ApiError> {
        let builder = self.request(Method::GET, "/products").query(&query.params());
        self.json(builder, "/products").await
    }

    pub async fn brands(&self) -> Result<Vec<NamedItem>, ApiError> {
        self.get("/brands").await
    }

    pub async fn categories(&self) -> Result<Vec<NamedItem>, ApiError> {
        self.get("/categories").await
    }

    pub async fn colors(&self) -> Result<Vec<NamedItem>, ApiError> {
        self.get("/colors").await
    }

    pub async fn sources(&self) -> Result<Vec<NamedItem>, ApiError> {
        self.get("/sources").await
    }

    pub async fn price_history(&self, product_id: i64) -> Result<PriceHistory, ApiError> {
        self.get(&format!("/price-history/{product_id}")).await
    }

    /// Ask the backend to turn free text into structured filters.
    pub async fn parse_search(&self, text: &str) -> Result<ParsedQuery, ApiError> {
        let builder = self
            .request(Method::POST, "/search/parse")
            .json(&ParseBody { query: text });
        self.json(builder, "/search/parse").await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Favourites
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn favourites(&self) -> Result<Vec<Product>, ApiError> {
        self.get("/favourites").await
    }

    pub async fn add_favourite(&self, product_id: i64) -> Result<(), ApiError> {
        let builder = self
            .request(Method::POST, "/favourites")
            .json(&FavouriteBody { product_id });
        self.send(builder, "/favourites").await.map(|_| ())
    }

    pub async fn remove_favourite(&self, product_id: i64) -> Result<(), ApiError> {
        let path = format!("/favourites/{product_id}");
        self.send(self.request(Method::DELETE, &path), &path)
            .await
            .map(|_| ())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Notifications
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn notifications(&self, offset: u64, limit: u64) -> Result<Page<Notification>, ApiError> {
        let builder = self
            .request(Method::GET, "/notifications")
            .query(&[("offset", offset), ("limit", limit)]);
        self.json(builder, "/notifications").await
    }

    pub async fn unseen_count(&self) -> Result<u64, ApiError> {
        let count: UnseenCount = self.get("/notifications/unseen-count").await?;
        Ok(count.count)
    }

    pub async fn mark_seen(&self, ids: &[i64]) -> Result<(), ApiError> {
        let builder = self
            .request(Method::POST, "/notifications/mark-seen")
            .json(&MarkSeenBody { ids });
        self.send(builder, "/notifications/mark-seen").await.map(|_| ())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Saved filters
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn saved_filters(&self) -> Result<Vec<SavedFilterSet>, ApiError> {
        self.get("/saved-filters").await
    }

    pub async fn create_saved_filter(
        &self,
        request: &NewSavedFilterSet,
    ) -> Result<SavedFilterSet, ApiError> {
        let builder = self.request(Method::POST, "/saved-filters").json(request);
        self.json(builder, "/saved-filters").await
    }

    pub async fn update_saved_filter(
        &self,
        id: i64,
        request: &NewSavedFilterSet,
    ) -> Result<SavedFilterSet, ApiError> {
        let path = format!("/saved-filters/{id}");
        let builder = self.request(Method::PUT, &path).json(request);
        self.json(builder, &path).await
    }

    pub async fn delete_saved_filter(&self, id: i64) -> Result<(), ApiError> {
        let path = format!("/saved-filters/{id}");
        self.send(self.request(Method::DELETE, &path), &path)
            .await
            .map(|_| ())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Auth
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn login(&self, request: &LoginRequest) -> Result<LoginOutcome, ApiError> {
        let path = "/auth/login";
        let response = self
            .send(self.request(Method::POST, path).json(request), path)
            .await?;
        let token = token_from_headers(response.headers());
        let bytes = response.bytes().await.map_err(|source| ApiError::Transport {
            url: self.url(path),
            source,
        })?;
        let user = serde_json::from_slice(&bytes).map_err(|source| ApiError::Decode {
            url: self.url(path),
            source,
        })?;
        Ok(LoginOutcome { user, token })
    }

    pub async fn logout(&self) -> Result<(), ApiError> {
        self.send(self.request(Method::POST, "/auth/logout"), "/auth/logout")
            .await
            .map(|_| ())
    }

    pub async fn me(&self) -> Result<AuthUser, ApiError> {
        self.get("/auth/me").await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Admin
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn scraping_summary(&self) -> Result<Vec<ScraperSummary>, ApiError> {
        self.get("/scraping-history/summary").await
    }

    pub async fn product_totals(&self) -> Result<ProductTotals, ApiError> {
        self.get("/stats/products").await
    }

    pub async fn source_counts(&self) -> Result<Vec<CountBucket>, ApiError> {
        self.get("/stats/sources").await
    }

    pub async fn brand_counts(&self) -> Result<Vec<CountBucket>, ApiError> {
        self.get("/stats/brands").await
    }

    pub async fn category_counts(&self) -> Result<Vec<CountBucket>, ApiError> {
        self.get("/stats/categories").await
    }

    pub async fn price_change_counts(&self) -> Result<Vec<CountBucket>, ApiError> {
        self.get("/stats/price-changes").await
    }
}

/// Pull the session token out of `Set-Cookie` response headers.
fn token_from_headers(headers: &reqwest::header::HeaderMap) -> Option<String> {
    headers
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(token_from_set_cookie)
}

fn token_from_set_cookie(header: &str) -> Option<String> {
    let pair = header.split(';').next()?.trim();
    let (name, value) = pair.split_once('=')?;
    (name.trim() == TOKEN_COOKIE && !value.is_empty()).then(|| value.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalised() {
        let client = ApiClient::new("http://localhost:3000/api/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000/api");
        assert_eq!(client.url("/brands"), "http://localhost:3000/api/brands");

        let relative = ApiClient::new("/api").unwrap();
        assert_eq!(relative.url("/products"), "/api/products");
    }

    #[test]
    fn test_rejects_bare_host() {
        let err = ApiClient::new("localhost:3000").unwrap_err();
        assert!(matches!(err, ApiError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn test_empty_token_is_cleared() {
        let mut client = ApiClient::new("http://localhost").unwrap();
        client.set_token(Some(String::new()));
        assert_eq!(client.token(), None);
        client.set_token(Some("abc".into()));
        assert_eq!(client.token(), Some("abc"));
    }

    #[test]
    fn test_token_from_set_cookie() {
        assert_eq!(
            token_from_set_cookie("token=abc.def.ghi; Path=/; HttpOnly"),
            Some("abc.def.ghi".to_string())
        );
        assert_eq!(token_from_set_cookie("session=xyz; Path=/"), None);
        assert_eq!(token_from_set_cookie("token=; Max-Age=0"), None);
    }
}
