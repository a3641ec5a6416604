//! Error types for console flows.

/// Error returned by flow helpers that talk to the console backend.
///
/// The two failure axes of every console call are kept distinct:
/// [`FlowError::Transport`] wraps the client's own error (the request never
/// completed), while [`FlowError::Rejected`] carries the server-supplied
/// message of a `success = false` envelope.
#[derive(Debug, thiserror::Error)]
pub enum FlowError<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    /// The request never completed (network error, bad status, bad body).
    #[error("request failed: {0}")]
    Transport(#[source] E),

    /// The backend answered, but refused the request.
    #[error("{message}")]
    Rejected {
        /// Server-supplied outcome message, shown verbatim to the user.
        message: String,
    },

    /// The account has no API tokens, so there is no first key to cache.
    #[error("account has no API tokens")]
    MissingToken,
}

impl<E> FlowError<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    /// Wraps a server-supplied rejection message.
    #[must_use]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }
}
