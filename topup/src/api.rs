//! The console API client trait.
//!
//! [`ConsoleApi`] is the seam between the flow logic in this crate and the
//! actual HTTP transport. The `topup-http` crate provides the production
//! `reqwest` implementation; tests implement it with in-memory stubs.

use crate::proto::{ChargeRequest, ChargeResponse, Envelope, TokenPage, TokenQuery, UserQuota};

/// An authenticated client for the console endpoints.
///
/// Each method maps to exactly one backend endpoint. A returned `Err` is a
/// *transport* failure; a business failure travels inside the `Ok` value as
/// `success = false`. Implementations must not retry on their own: the
/// flows surface failures and let the user re-trigger the action.
#[allow(async_fn_in_trait)]
pub trait ConsoleApi: Send + Sync {
    /// Transport-level error type of this client.
    type Error: std::error::Error + Send + Sync + 'static;

    /// `GET /api/user/self` — the account's remaining quota.
    async fn user_self(&self) -> Result<Envelope<UserQuota>, Self::Error>;

    /// `POST /api/user/recharge` — creates a payment link for a top-up.
    async fn recharge(&self, request: &ChargeRequest) -> Result<ChargeResponse, Self::Error>;

    /// `GET /api/token/` — lists the account's API tokens.
    async fn tokens(&self, query: &TokenQuery) -> Result<Envelope<TokenPage>, Self::Error>;

    /// `GET /api/user/aff` — the account's affiliate code.
    async fn aff_code(&self) -> Result<Envelope<String>, Self::Error>;
}
