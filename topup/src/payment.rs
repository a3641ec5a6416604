//! Payment link classification.
//!
//! The recharge endpoint communicates the follow-up step implicitly through
//! the scheme of `payurl`: an `http(s)` link means "send the browser there",
//! while a wallet deep link (`weixin://…`, `alipays://…`, any non-HTTP
//! scheme) means "show the link as a QR code and let the user's wallet app
//! take over". That string convention is part of the backend contract and is
//! preserved here at the wire boundary, but the rest of the crate works with
//! the explicit [`PaymentLink`] tag instead of re-inspecting strings.

use url::Url;

/// A classified payment link from a successful charge response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentLink {
    /// A regular web URL; the page should navigate to it.
    Redirect(Url),

    /// A wallet deep link; the page should present it as a scannable code
    /// and may additionally attempt a direct navigation.
    QrPayment {
        /// The raw deep link, exactly as the backend sent it.
        payload: String,
    },
}

impl PaymentLink {
    /// Classifies a raw `payurl` by its URL scheme.
    ///
    /// `http` and `https` yield [`PaymentLink::Redirect`]; every other
    /// scheme yields [`PaymentLink::QrPayment`] with the raw string kept
    /// byte-for-byte, since wallet apps are picky about their links.
    ///
    /// # Errors
    ///
    /// Returns the parse error for strings that are not absolute URLs.
    pub fn classify(raw: &str) -> Result<Self, url::ParseError> {
        let url = Url::parse(raw)?;
        match url.scheme() {
            "http" | "https" => Ok(Self::Redirect(url)),
            _ => Ok(Self::QrPayment {
                payload: raw.to_owned(),
            }),
        }
    }
}
