//! # HTTP Transport
//!
//! Reqwest-backed [`ProviderTransport`] implementation.
//!
//! Each instance targets one provider under a shared upstream base URL:
//! `GET {base}/{provider}/movies` for the catalog and
//! `GET {base}/{provider}/movie/{id}` for details. The upstream access
//! token rides on every request as an `x-access-token` default header.
//!
//! # Examples
//!
//! ```no_run
//! use cinecompare::domain::provider::ProviderId;
//! use cinecompare::infrastructure::providers::http::HttpTransport;
//! use std::time::Duration;
//!
//! let transport = HttpTransport::new(
//!     ProviderId::new("cinemaworld"),
//!     "https://webjetapitest.azurewebsites.net/api",
//!     "secret-token",
//!     Duration::from_secs(10),
//! ).unwrap();
//! ```

use crate::domain::provider::ProviderId;
use crate::infrastructure::providers::error::{ProviderError, ProviderResult};
use crate::infrastructure::providers::transport::ProviderTransport;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Response};
use std::time::Duration;

const ACCESS_TOKEN_HEADER: &str = "x-access-token";
const ERROR_BODY_SNIPPET_LEN: usize = 200;

/// HTTP implementation of [`ProviderTransport`] for one provider.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    provider: ProviderId,
    base_url: String,
    client: Client,
}

impl HttpTransport {
    /// Creates a transport for `provider` under `base_url`.
    ///
    /// `access_token` may be empty, in which case no token header is sent.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Connection`] if the underlying client cannot
    /// be built or the token is not a valid header value.
    pub fn new(
        provider: ProviderId,
        base_url: &str,
        access_token: &str,
        timeout: Duration,
    ) -> ProviderResult<Self> {
        let mut headers = HeaderMap::new();
        if !access_token.is_empty() {
            let value = HeaderValue::from_str(access_token).map_err(|e| {
                ProviderError::connection(format!("invalid access token header: {e}"))
            })?;
            headers.insert(ACCESS_TOKEN_HEADER, value);
        }

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| ProviderError::connection(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            provider,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn catalog_url(&self) -> String {
        format!("{}/{}/movies", self.base_url, self.provider)
    }

    fn detail_url(&self, native_id: &str) -> String {
        format!("{}/{}/movie/{}", self.base_url, self.provider, native_id)
    }

    async fn get_bytes(&self, url: &str) -> ProviderResult<Bytes> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        Self::read_success_body(response).await
    }

    async fn read_success_body(response: Response) -> ProviderResult<Bytes> {
        let status = response.status();
        if status.is_success() {
            response.bytes().await.map_err(map_reqwest_error)
        } else {
            let mut body = response.text().await.unwrap_or_default();
            body.truncate(ERROR_BODY_SNIPPET_LEN);
            Err(ProviderError::status(status.as_u16(), body))
        }
    }
}

/// Maps a reqwest error to a [`ProviderError`].
fn map_reqwest_error(error: reqwest::Error) -> ProviderError {
    if error.is_timeout() {
        ProviderError::timeout("request timed out")
    } else if error.is_connect() {
        ProviderError::connection(format!("connection failed: {error}"))
    } else {
        ProviderError::connection(format!("HTTP request failed: {error}"))
    }
}

#[async_trait]
impl ProviderTransport for HttpTransport {
    fn provider(&self) -> &ProviderId {
        &self.provider
    }

    async fn fetch_catalog(&self) -> ProviderResult<Bytes> {
        self.get_bytes(&self.catalog_url()).await
    }

    async fn fetch_detail(&self, native_id: &str) -> ProviderResult<Bytes> {
        self.get_bytes(&self.detail_url(native_id)).await
    }

    async fn probe(&self) -> ProviderResult<u16> {
        // The probe hits the catalog endpoint but never retries and never
        // reads the body; callers enforce their own timeout around it.
        let response = self
            .client
            .get(self.catalog_url())
            .send()
            .await
            .map_err(map_reqwest_error)?;
        Ok(response.status().as_u16())
    }
}
