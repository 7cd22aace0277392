//! Error types for wsflood

use tokio_tungstenite::tungstenite;

/// Errors that can occur while driving a session
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("websocket handshake failed: {0}")]
    Connect(#[from] tungstenite::Error),
}

impl SessionError {
    /// HTTP status carried by a rejected handshake, if the server answered at all.
    ///
    /// `connect_async` surfaces a non-101 upgrade response as an error; the
    /// status is needed to report why the connect check failed.
    pub fn handshake_status(&self) -> Option<u16> {
        match self {
            SessionError::Connect(tungstenite::Error::Http(response)) => {
                Some(response.status().as_u16())
            }
            _ => None,
        }
    }
}

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_tungstenite::tungstenite::http;

    #[test]
    fn test_handshake_status_from_http_error() {
        let response = http::Response::builder()
            .status(403)
            .body(None)
            .expect("valid response");
        let err = SessionError::Connect(tungstenite::Error::Http(response));
        assert_eq!(err.handshake_status(), Some(403));
    }

    #[test]
    fn test_handshake_status_absent_for_other_errors() {
        let err = SessionError::InvalidConfig("bad url".to_string());
        assert_eq!(err.handshake_status(), None);

        let err = SessionError::Connect(tungstenite::Error::ConnectionClosed);
        assert_eq!(err.handshake_status(), None);
    }

    #[test]
    fn test_display() {
        let err = SessionError::InvalidConfig("vus must be at least 1".to_string());
        assert_eq!(
            err.to_string(),
            "invalid configuration: vus must be at least 1"
        );
    }
}
