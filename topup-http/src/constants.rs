//! Endpoint paths of the console API.
//!
//! All paths are relative so they can be joined onto any base URL; the
//! client normalizes its base URL to end with a slash.

/// Token listing endpoint (`GET`).
pub const TOKENS_ENDPOINT: &str = "api/token/";

/// Account profile endpoint carrying the quota (`GET`).
pub const USER_SELF_ENDPOINT: &str = "api/user/self";

/// Affiliate code endpoint (`GET`).
pub const USER_AFF_ENDPOINT: &str = "api/user/aff";

/// Payment link creation endpoint (`POST`).
pub const RECHARGE_ENDPOINT: &str = "api/user/recharge";
