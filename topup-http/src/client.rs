//! A [`topup::api::ConsoleApi`] implementation that talks to a remote
//! console over HTTP.
//!
//! [`ConsoleClient`] handles the token, profile, affiliate, and recharge
//! endpoints of a console backend and implements the
//! [`topup::api::ConsoleApi`] trait for use with the flow controllers.
//!
//! ## Features
//!
//! - Uses `reqwest` for async HTTP requests
//! - Supports optional timeout and headers (authentication rides on a
//!   header)
//! - Integrates with `tracing` if the `telemetry` feature is enabled
//!
//! ## Error Handling
//!
//! Custom error types capture detailed failure contexts, including
//! - URL construction
//! - HTTP transport failures
//! - JSON deserialization errors
//! - Unexpected HTTP status responses
//!
//! Every error here is a *transport* failure in the sense of the flow
//! layer; a business failure travels inside a decoded envelope with
//! `success = false` and is never turned into an `Err` by this client.

use http::{HeaderMap, HeaderValue, StatusCode, header};
use reqwest::Client;
use std::fmt::Display;
use std::time::Duration;
use topup::api::ConsoleApi;
use topup::proto::{ChargeRequest, ChargeResponse, Envelope, TokenPage, TokenQuery, UserQuota};
use url::Url;

use crate::constants::{RECHARGE_ENDPOINT, TOKENS_ENDPOINT, USER_AFF_ENDPOINT, USER_SELF_ENDPOINT};

#[cfg(feature = "telemetry")]
use tracing::{Instrument, Span, instrument};

/// A client for the console endpoints of an API platform backend.
///
/// Handles the token, profile, affiliate, and recharge endpoints via JSON
/// HTTP.
#[derive(Clone, Debug)]
pub struct ConsoleClient {
    /// Base URL of the console (e.g. `https://console.example/`)
    base_url: Url,
    /// Full URL for `GET` token listings
    tokens_url: Url,
    /// Full URL for `GET` account profile requests
    user_self_url: Url,
    /// Full URL for `GET` affiliate code requests
    aff_url: Url,
    /// Full URL for `POST` recharge requests
    recharge_url: Url,
    /// Shared Reqwest HTTP client
    client: Client,
    /// Custom headers sent with each request (authentication lives here)
    headers: HeaderMap,
    /// Optional request timeout
    timeout: Option<Duration>,
}

/// Errors that can occur while talking to a remote console.
#[derive(Debug, thiserror::Error)]
pub enum ConsoleClientError {
    /// URL parse error.
    #[error("URL parse error: {context}: {source}")]
    UrlParse {
        /// Human-readable context.
        context: &'static str,
        /// The underlying parse error.
        #[source]
        source: url::ParseError,
    },
    /// The access token cannot be carried in an HTTP header.
    #[error("access token contains characters not allowed in an HTTP header")]
    InvalidAccessToken,
    /// HTTP transport error.
    #[error("HTTP error: {context}: {source}")]
    Http {
        /// Human-readable context.
        context: &'static str,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
    /// JSON deserialization error.
    #[error("Failed to deserialize JSON: {context}: {source}")]
    JsonDeserialization {
        /// Human-readable context.
        context: &'static str,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
    /// Unexpected HTTP status code.
    #[error("Unexpected HTTP status {status}: {context}: {body}")]
    HttpStatus {
        /// Human-readable context.
        context: &'static str,
        /// The HTTP status code.
        status: StatusCode,
        /// The response body.
        body: String,
    },
    /// Failed to read response body.
    #[error("Failed to read response body as text: {context}: {source}")]
    ResponseBodyRead {
        /// Human-readable context.
        context: &'static str,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
}

impl ConsoleClient {
    /// Returns the base URL used by this client.
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the computed token-listing URL relative to
    /// [`ConsoleClient::base_url`].
    pub const fn tokens_url(&self) -> &Url {
        &self.tokens_url
    }

    /// Returns the computed account-profile URL relative to
    /// [`ConsoleClient::base_url`].
    pub const fn user_self_url(&self) -> &Url {
        &self.user_self_url
    }

    /// Returns the computed affiliate-code URL relative to
    /// [`ConsoleClient::base_url`].
    pub const fn aff_url(&self) -> &Url {
        &self.aff_url
    }

    /// Returns the computed recharge URL relative to
    /// [`ConsoleClient::base_url`].
    pub const fn recharge_url(&self) -> &Url {
        &self.recharge_url
    }

    /// Returns any custom headers configured on the client.
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the configured timeout, if any.
    pub const fn timeout(&self) -> &Option<Duration> {
        &self.timeout
    }

    /// Constructs a new [`ConsoleClient`] from a base URL.
    ///
    /// This sets up the endpoint URLs relative to the base. The base URL
    /// should end with a slash; [`TryFrom<&str>`] normalizes that for you.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleClientError`] if URL construction fails.
    pub fn try_new(base_url: Url) -> Result<Self, ConsoleClientError> {
        let client = Client::new();
        let tokens_url = base_url
            .join(TOKENS_ENDPOINT)
            .map_err(|e| ConsoleClientError::UrlParse {
                context: "Failed to construct token listing URL",
                source: e,
            })?;
        let user_self_url =
            base_url
                .join(USER_SELF_ENDPOINT)
                .map_err(|e| ConsoleClientError::UrlParse {
                    context: "Failed to construct account profile URL",
                    source: e,
                })?;
        let aff_url = base_url
            .join(USER_AFF_ENDPOINT)
            .map_err(|e| ConsoleClientError::UrlParse {
                context: "Failed to construct affiliate code URL",
                source: e,
            })?;
        let recharge_url =
            base_url
                .join(RECHARGE_ENDPOINT)
                .map_err(|e| ConsoleClientError::UrlParse {
                    context: "Failed to construct recharge URL",
                    source: e,
                })?;
        Ok(Self {
            client,
            base_url,
            tokens_url,
            user_self_url,
            aff_url,
            recharge_url,
            headers: HeaderMap::new(),
            timeout: None,
        })
    }

    /// Attaches custom headers to all future requests.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Authenticates all future requests with a bearer access token.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleClientError::InvalidAccessToken`] if the token
    /// contains bytes that cannot appear in an HTTP header value.
    pub fn with_access_token(mut self, token: &str) -> Result<Self, ConsoleClientError> {
        let value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| ConsoleClientError::InvalidAccessToken)?;
        self.headers.insert(header::AUTHORIZATION, value);
        Ok(self)
    }

    /// Sets a timeout for all future requests.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sends the token listing request.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleClientError`] if the HTTP request fails.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "console.client.tokens", skip_all, err)
    )]
    pub async fn tokens(
        &self,
        query: &TokenQuery,
    ) -> Result<Envelope<TokenPage>, ConsoleClientError> {
        self.get_json_with_query(&self.tokens_url, "GET /api/token/", Some(query))
            .await
    }

    /// Sends the account profile request.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleClientError`] if the HTTP request fails.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "console.client.user_self", skip_all, err)
    )]
    pub async fn user_self(&self) -> Result<Envelope<UserQuota>, ConsoleClientError> {
        self.get_json(&self.user_self_url, "GET /api/user/self")
            .await
    }

    /// Sends the affiliate code request.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleClientError`] if the HTTP request fails.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "console.client.aff_code", skip_all, err)
    )]
    pub async fn aff_code(&self) -> Result<Envelope<String>, ConsoleClientError> {
        self.get_json(&self.aff_url, "GET /api/user/aff").await
    }

    /// Sends a recharge request, asking the backend for a payment link.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleClientError`] if the HTTP request fails. A refused
    /// top-up is not an error: it comes back as `success = false` on the
    /// response body.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "console.client.recharge", skip_all, err)
    )]
    pub async fn recharge(
        &self,
        request: &ChargeRequest,
    ) -> Result<ChargeResponse, ConsoleClientError> {
        self.post_json(&self.recharge_url, "POST /api/user/recharge", request)
            .await
    }

    /// Generic POST helper that handles JSON serialization, error mapping,
    /// timeout application, and telemetry integration.
    ///
    /// `context` is a human-readable identifier used in tracing and error
    /// messages (e.g. `"POST /api/user/recharge"`).
    async fn post_json<T, R>(
        &self,
        url: &Url,
        context: &'static str,
        payload: &T,
    ) -> Result<R, ConsoleClientError>
    where
        T: serde::Serialize + Sync + ?Sized,
        R: serde::de::DeserializeOwned,
    {
        let mut req = self.client.post(url.clone()).json(payload);
        for (key, value) in &self.headers {
            req = req.header(key, value);
        }
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }
        let http_response = req
            .send()
            .await
            .map_err(|e| ConsoleClientError::Http { context, source: e })?;

        let result = if http_response.status() == StatusCode::OK {
            http_response
                .json::<R>()
                .await
                .map_err(|e| ConsoleClientError::JsonDeserialization { context, source: e })
        } else {
            let status = http_response.status();
            let body = http_response
                .text()
                .await
                .map_err(|e| ConsoleClientError::ResponseBodyRead { context, source: e })?;
            Err(ConsoleClientError::HttpStatus {
                context,
                status,
                body,
            })
        };

        record_result_on_span(&result);

        result
    }

    /// Generic GET helper without query parameters.
    async fn get_json<R>(&self, url: &Url, context: &'static str) -> Result<R, ConsoleClientError>
    where
        R: serde::de::DeserializeOwned,
    {
        self.get_json_with_query::<(), R>(url, context, None).await
    }

    /// Generic GET helper that handles query encoding, error mapping,
    /// timeout application, and telemetry integration.
    async fn get_json_with_query<Q, R>(
        &self,
        url: &Url,
        context: &'static str,
        query: Option<&Q>,
    ) -> Result<R, ConsoleClientError>
    where
        Q: serde::Serialize + Sync + ?Sized,
        R: serde::de::DeserializeOwned,
    {
        let mut req = self.client.get(url.clone());
        if let Some(query) = query {
            req = req.query(query);
        }
        for (key, value) in &self.headers {
            req = req.header(key, value);
        }
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }
        let http_response = req
            .send()
            .await
            .map_err(|e| ConsoleClientError::Http { context, source: e })?;

        let result = if http_response.status() == StatusCode::OK {
            http_response
                .json::<R>()
                .await
                .map_err(|e| ConsoleClientError::JsonDeserialization { context, source: e })
        } else {
            let status = http_response.status();
            let body = http_response
                .text()
                .await
                .map_err(|e| ConsoleClientError::ResponseBodyRead { context, source: e })?;
            Err(ConsoleClientError::HttpStatus {
                context,
                status,
                body,
            })
        };

        record_result_on_span(&result);

        result
    }
}

impl ConsoleApi for ConsoleClient {
    type Error = ConsoleClientError;

    /// Fetches the account profile.
    #[cfg(feature = "telemetry")]
    async fn user_self(&self) -> Result<Envelope<UserQuota>, ConsoleClientError> {
        with_span(
            Self::user_self(self),
            tracing::info_span!("console.api.user_self", timeout = ?self.timeout),
        )
        .await
    }

    /// Fetches the account profile.
    #[cfg(not(feature = "telemetry"))]
    async fn user_self(&self) -> Result<Envelope<UserQuota>, ConsoleClientError> {
        ConsoleClient::user_self(self).await
    }

    /// Creates a payment link for a top-up.
    #[cfg(feature = "telemetry")]
    async fn recharge(&self, request: &ChargeRequest) -> Result<ChargeResponse, ConsoleClientError> {
        with_span(
            Self::recharge(self, request),
            tracing::info_span!("console.api.recharge", timeout = ?self.timeout),
        )
        .await
    }

    /// Creates a payment link for a top-up.
    #[cfg(not(feature = "telemetry"))]
    async fn recharge(&self, request: &ChargeRequest) -> Result<ChargeResponse, ConsoleClientError> {
        ConsoleClient::recharge(self, request).await
    }

    /// Lists the account's API tokens.
    async fn tokens(&self, query: &TokenQuery) -> Result<Envelope<TokenPage>, ConsoleClientError> {
        ConsoleClient::tokens(self, query).await
    }

    /// Fetches the account's affiliate code.
    async fn aff_code(&self) -> Result<Envelope<String>, ConsoleClientError> {
        ConsoleClient::aff_code(self).await
    }
}

/// Converts a string URL into a `ConsoleClient`, parsing the URL and calling
/// `try_new`.
impl TryFrom<&str> for ConsoleClient {
    type Error = ConsoleClientError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        // Normalize: strip trailing slashes and add a single trailing slash
        let mut normalized = value.trim_end_matches('/').to_string();
        normalized.push('/');
        let url = Url::parse(&normalized).map_err(|e| ConsoleClientError::UrlParse {
            context: "Failed to parse base url",
            source: e,
        })?;
        Self::try_new(url)
    }
}

/// Converts a String URL into a `ConsoleClient`.
impl TryFrom<String> for ConsoleClient {
    type Error = ConsoleClientError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

/// Records the outcome of a request on a tracing span, including status and
/// errors.
#[cfg(feature = "telemetry")]
fn record_result_on_span<R, E: Display>(result: &Result<R, E>) {
    let span = Span::current();
    match result {
        Ok(_) => {
            span.record("otel.status_code", "OK");
        }
        Err(err) => {
            span.record("otel.status_code", "ERROR");
            span.record("error.message", tracing::field::display(err));
            tracing::event!(tracing::Level::ERROR, error = %err, "Request to console failed");
        }
    }
}

/// Records the outcome of a request on a tracing span, including status and
/// errors. Noop if telemetry feature is off.
#[cfg(not(feature = "telemetry"))]
fn record_result_on_span<R, E: Display>(_result: &Result<R, E>) {}

/// Instruments a future with a given tracing span.
#[cfg(feature = "telemetry")]
fn with_span<F: Future>(fut: F, span: Span) -> impl Future<Output = F::Output> {
    fut.instrument(span)
}
