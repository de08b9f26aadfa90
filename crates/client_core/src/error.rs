use thiserror::Error;

/// Failure of a single gateway call. Remote and transport failures are reported as-is.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("remote returned {status}: {body}")]
    Remote { status: u16, body: String },
}

impl GatewayError {
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Transport(err) => err.status().map(|status| status.as_u16()),
            GatewayError::Remote { status, .. } => Some(*status),
        }
    }
}
