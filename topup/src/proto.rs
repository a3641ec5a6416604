//! Wire format types for the console endpoints.
//!
//! Every console endpoint wraps its payload in the same
//! `{success, message, data}` envelope, with one exception: the recharge
//! endpoint returns its payment link flat on the response body. The types
//! here mirror the backend contract exactly; renaming happens through serde
//! attributes so the Rust side can use idiomatic names.
//!
//! # Key Types
//!
//! - [`Envelope`] - The uniform response wrapper
//! - [`ChargeRequest`] / [`ChargeResponse`] - Recharge endpoint messages
//! - [`PayProvider`] - Payment channel selector
//! - [`UserQuota`] - Remaining account balance
//! - [`TokenQuery`] / [`TokenPage`] / [`TokenRecord`] - Token-list endpoint messages

use serde::{Deserialize, Serialize};

use crate::amount::TopUpAmount;

/// The uniform `{success, message, data}` response wrapper used by every
/// console endpoint.
///
/// `success` is the *business* outcome chosen by the backend; it is
/// independent of the transport outcome. Callers must handle both axes:
/// a transport failure surfaces as the client's error type, a business
/// failure as `success = false` with a human-readable `message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    /// Whether the backend accepted the request.
    pub success: bool,

    /// Human-readable outcome message, shown verbatim to the user on
    /// business failure.
    #[serde(default)]
    pub message: String,

    /// Endpoint-specific payload; absent on failure responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Collapses the envelope into the business-level result.
    ///
    /// # Errors
    ///
    /// Returns the server-supplied `message` when `success` is false, or a
    /// fixed description when a success response carries no payload.
    pub fn into_data(self) -> Result<T, String> {
        if self.success {
            self.data
                .ok_or_else(|| "response carried no data".to_owned())
        } else {
            Err(self.message)
        }
    }
}

/// Payment channel selector sent with a charge request.
///
/// Serialized with the backend's wire names: `"wxpay"` and `"alipay"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PayProvider {
    /// WeChat Pay.
    #[default]
    #[serde(rename = "wxpay")]
    Wechat,
    /// Alipay.
    #[serde(rename = "alipay")]
    Alipay,
}

impl PayProvider {
    /// The backend wire name for this provider.
    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Wechat => "wxpay",
            Self::Alipay => "alipay",
        }
    }
}

impl std::fmt::Display for PayProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Body of `POST /api/user/recharge`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeRequest {
    /// Top-up amount in whole currency units, already clamped.
    pub amount: TopUpAmount,

    /// Selected payment channel. The backend calls this field `type`.
    #[serde(rename = "type")]
    pub provider: PayProvider,
}

/// Response of `POST /api/user/recharge`.
///
/// Unlike the other endpoints this is not wrapped in [`Envelope`]; the
/// payment link sits flat on the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeResponse {
    /// Whether a payment link was created.
    pub success: bool,

    /// Human-readable outcome message.
    #[serde(default)]
    pub message: String,

    /// The payment link. Its URL scheme selects the flow branch; see
    /// [`crate::payment::PaymentLink`].
    #[serde(default)]
    pub payurl: String,
}

/// Payload of `GET /api/user/self`: the account's remaining quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserQuota {
    /// Remaining balance in backend quota units. Render with
    /// [`crate::quota::format_quota`].
    #[serde(default)]
    pub quota: i64,
}

/// Query parameters of `GET /api/token/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenQuery {
    /// 1-based page index.
    pub page: u32,
    /// Page size.
    pub size: u32,
    /// Search keyword; empty for an unfiltered listing.
    pub keyword: String,
    /// Sort order; `-id` lists newest tokens first.
    pub order: String,
}

impl TokenQuery {
    /// The query the first-key cache issues: first page, newest first.
    #[must_use]
    pub fn first_page() -> Self {
        Self {
            page: 1,
            size: 10,
            keyword: String::new(),
            order: "-id".to_owned(),
        }
    }
}

impl Default for TokenQuery {
    fn default() -> Self {
        Self::first_page()
    }
}

/// Payload of `GET /api/token/`: one page of API tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPage {
    /// The tokens on this page, in the requested order.
    #[serde(default)]
    pub data: Vec<TokenRecord>,
}

/// A single API token as listed by the console.
///
/// The backend returns more fields than the flows need; unknown fields are
/// ignored on deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    /// Token identifier.
    #[serde(default)]
    pub id: i64,

    /// The API key itself, without any scheme prefix.
    pub key: String,

    /// Display name of the token.
    #[serde(default)]
    pub name: String,
}
