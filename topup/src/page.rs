//! Hosting-page capability.
//!
//! In a browser tab, navigation, reloads, the page origin, and the
//! clipboard are ambient globals. Here they form an
//! explicit boundary: the [`Page`] trait is injected into the flows, which
//! keeps them host-agnostic and lets tests observe exactly which page
//! actions a flow requested.

/// Error raised by a hosting page that could not perform an action.
///
/// Flows treat page failures as non-fatal: navigation into a wallet deep
/// link is best-effort, and a failed reload leaves the flow in a stable
/// state.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct PageError {
    message: String,
}

impl PageError {
    /// Creates a page error with a human-readable description.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Capability covering the actions flows request from their hosting page.
pub trait Page: Send + Sync {
    /// Navigates the page to the given URL, abandoning the current view.
    ///
    /// For wallet deep links the host may refuse or silently fail; the
    /// top-up flow treats that as acceptable and falls back to the QR path.
    ///
    /// # Errors
    ///
    /// Returns [`PageError`] if the navigation could not be started.
    fn navigate(&self, url: &str) -> Result<(), PageError>;

    /// Performs a full reload of the page.
    ///
    /// # Errors
    ///
    /// Returns [`PageError`] if the reload could not be started.
    fn reload(&self) -> Result<(), PageError>;

    /// The page origin (scheme + host + port), used to compose invite links.
    fn origin(&self) -> String;

    /// Copies text to the user's clipboard.
    ///
    /// # Errors
    ///
    /// Returns [`PageError`] if the host denied clipboard access.
    fn copy_text(&self, text: &str) -> Result<(), PageError>;
}
