//! Session-cached invite link sharing.
//!
//! Registration links carry an affiliate code so the platform can attribute
//! new sign-ups. The code is fetched once per session and the composed link
//! is kept in memory only, so a page reload starts fresh. Every invocation
//! copies the link to the clipboard; only the first one touches the
//! network.

use tokio::sync::OnceCell;

use crate::api::ConsoleApi;
use crate::error::FlowError;
use crate::notice::{Notice, Notifier};
use crate::page::Page;

/// Notice shown after the invite link landed on the clipboard.
pub const MSG_LINK_COPIED: &str = "invite link copied";

/// Notice shown when the clipboard rejected the link.
pub const MSG_COPY_FAILED: &str = "failed to copy invite link";

/// Shares the account's invite link, fetching the affiliate code at most
/// once per session.
#[derive(Debug)]
pub struct InviteShare<A, P, N> {
    api: A,
    page: P,
    notifier: N,
    link: OnceCell<String>,
}

impl<A, P, N> InviteShare<A, P, N>
where
    A: ConsoleApi,
    P: Page,
    N: Notifier,
{
    /// Creates a sharer with an empty session cache.
    pub fn new(api: A, page: P, notifier: N) -> Self {
        Self {
            api,
            page,
            notifier,
            link: OnceCell::new(),
        }
    }

    /// Returns the invite link, if it has been composed this session.
    pub fn link(&self) -> Option<&str> {
        self.link.get().map(String::as_str)
    }

    /// Copies the invite link to the clipboard, composing it first if this
    /// is the session's first call.
    ///
    /// The link is `<origin>/register?aff=<code>`, with the origin taken
    /// from the hosting page. Concurrent first calls are deduplicated so
    /// the affiliate code is fetched exactly once.
    ///
    /// Returns the link when it is available, whether or not the clipboard
    /// accepted it. A business failure surfaces the server's message as an
    /// error notice; a transport failure is silent (the link is not a
    /// critical read) and `None` is returned so the user can try again.
    pub async fn copy_link(&self) -> Option<String> {
        let composed = self
            .link
            .get_or_try_init(|| async {
                let envelope = self.api.aff_code().await.map_err(FlowError::Transport)?;
                let code = envelope.into_data().map_err(|m| FlowError::rejected(m))?;
                Ok::<_, FlowError<A::Error>>(format!("{}/register?aff={code}", self.page.origin()))
            })
            .await;

        let link = match composed {
            Ok(link) => link.clone(),
            Err(FlowError::Rejected { message }) => {
                self.notifier.notify(Notice::error(message));
                return None;
            }
            Err(error) => {
                log_fetch_failure(&error);
                return None;
            }
        };

        match self.page.copy_text(&link) {
            Ok(()) => self.notifier.notify(Notice::success(MSG_LINK_COPIED)),
            Err(_) => self.notifier.notify(Notice::error(MSG_COPY_FAILED)),
        }
        Some(link)
    }
}

#[cfg(feature = "telemetry")]
fn log_fetch_failure(error: &dyn std::fmt::Display) {
    tracing::debug!(%error, "affiliate code fetch failed");
}

#[cfg(not(feature = "telemetry"))]
fn log_fetch_failure(_error: &dyn std::fmt::Display) {}
