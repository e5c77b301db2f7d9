mod error_kind;

pub use self::error_kind::ErrorKind;
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use std::fmt::{Debug, Display, Formatter};

/// Application-specific error wrapping the root cause together with the error kind.
pub struct Error {
    pub kind: ErrorKind,
    pub root_cause: anyhow::Error,
}

impl Error {
    /// Creates a client-side error with the specified message.
    pub fn client<M: Display + Debug + Send + Sync + 'static>(message: M) -> Self {
        Self {
            kind: ErrorKind::ClientError,
            root_cause: anyhow::anyhow!(message),
        }
    }

    /// Creates a client-side error with the specified root cause.
    pub fn client_with_root_cause(root_cause: anyhow::Error) -> Self {
        Self {
            kind: ErrorKind::ClientError,
            root_cause,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.root_cause, f)
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(&self.root_cause, f)
    }
}

impl From<anyhow::Error> for Error {
    fn from(root_cause: anyhow::Error) -> Self {
        // Preserve the original kind if the cause is already an application error.
        match root_cause.downcast::<Error>() {
            Ok(error) => error,
            Err(root_cause) => Self {
                kind: ErrorKind::Unknown,
                root_cause,
            },
        }
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self.kind {
            ErrorKind::ClientError => StatusCode::BAD_REQUEST,
            ErrorKind::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self.kind {
            // Only client errors expose their message to the caller.
            ErrorKind::ClientError => HttpResponse::build(self.status_code())
                .json(serde_json::json!({ "message": self.root_cause.to_string() })),
            ErrorKind::Unknown => HttpResponse::build(self.status_code()).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Error, ErrorKind};
    use actix_web::{ResponseError, body::MessageBody, http::StatusCode};
    use anyhow::anyhow;
    use std::str::from_utf8;

    #[test]
    fn can_create_client_errors() -> anyhow::Result<()> {
        let error = Error::client("Something went wrong.");
        assert_eq!(error.kind, ErrorKind::ClientError);
        assert_eq!(error.to_string(), "Something went wrong.");

        let error = Error::client_with_root_cause(anyhow!("Root cause."));
        assert_eq!(error.kind, ErrorKind::ClientError);
        assert_eq!(error.to_string(), "Root cause.");

        Ok(())
    }

    #[test]
    fn preserves_kind_when_converted_through_anyhow() -> anyhow::Result<()> {
        let error = Error::from(anyhow!(Error::client("Bad input.")));
        assert_eq!(error.kind, ErrorKind::ClientError);

        let error = Error::from(anyhow!("Unexpected."));
        assert_eq!(error.kind, ErrorKind::Unknown);

        Ok(())
    }

    #[test]
    fn renders_http_responses_based_on_kind() -> anyhow::Result<()> {
        let error = Error::client("Bad input.");
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);

        let body = error.error_response().into_body().try_into_bytes().unwrap();
        assert_eq!(from_utf8(&body)?, r#"{"message":"Bad input."}"#);

        let error = Error::from(anyhow!("Unexpected."));
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(
            error
                .error_response()
                .into_body()
                .try_into_bytes()
                .unwrap()
                .is_empty()
        );

        Ok(())
    }
}
