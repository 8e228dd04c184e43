pub mod chat;
pub mod stream;

use reqwest::StatusCode;

/// Failures of a send or diagnose call.
///
/// `Service` is the service answering with an error frame; `Transport` and
/// `Status` mean the request itself did not go through.
#[derive(thiserror::Error, Debug)]
pub enum AssistError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP error! status: {}", .0.as_u16())]
    Status(StatusCode),

    #[error("{0}")]
    Service(String),
}

impl AssistError {
    pub fn is_service_error(&self) -> bool {
        matches!(self, AssistError::Service(_))
    }

    pub fn is_transport_error(&self) -> bool {
        matches!(self, AssistError::Transport(_) | AssistError::Status(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message() {
        let err = AssistError::Status(StatusCode::BAD_GATEWAY);
        assert_eq!(err.to_string(), "HTTP error! status: 502");
        assert!(err.is_transport_error());
        assert!(!err.is_service_error());
    }

    #[test]
    fn test_service_message_is_verbatim() {
        let err = AssistError::Service("模型服务繁忙".into());
        assert_eq!(err.to_string(), "模型服务繁忙");
        assert!(err.is_service_error());
        assert!(!err.is_transport_error());
    }
}
