//! Core API trait and error types.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use thiserror::Error;

use crate::credentials::Credentials;
use crate::limits::{BillingDetails, UsageLimits};
use crate::model::LessonRequest;

/// Message shown when the server gives no usable explanation.
pub const DEFAULT_ERROR_MESSAGE: &str = "Something went wrong";

/// Forward-only, single-use source of raw body chunks for one generation.
pub type ChunkSource = BoxStream<'static, Result<Bytes, ClientError>>;

/// Errors that can occur during client operations.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The token was rejected; credentials have already been logged out.
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Invalid module title or lesson title")]
    InvalidLesson,

    #[error("Response has no readable body")]
    MissingBody,

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Stream cancelled")]
    StreamCancelled,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Text to display to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Api { message, .. } | ClientError::Unauthorized { message } => {
                message.clone()
            }
            ClientError::NotLoggedIn => "Please login to generate course content".to_string(),
            ClientError::InvalidLesson => "Invalid module title or lesson title".to_string(),
            _ => DEFAULT_ERROR_MESSAGE.to_string(),
        }
    }
}

/// Course API operations used by the lesson viewer and the limits widget.
///
/// Implement this trait to back the viewer with a different transport.
/// Every call takes the caller's [`Credentials`] explicitly; implementations
/// log them out when the server rejects the token.
///
/// # Example
/// ```rust,ignore
/// let source = api
///     .generate_lesson("rust-basics", &cursor.to_request(), &credentials)
///     .await?;
/// let text = read_stream(source, StreamHandlers::new(|text| println!("{}", text))).await?;
/// ```
#[async_trait]
pub trait CourseApi: Send + Sync {
    /// Start generating a lesson and return its body as a chunk source.
    ///
    /// Non-OK responses never yield a source.
    async fn generate_lesson(
        &self,
        course_slug: &str,
        request: &LessonRequest,
        credentials: &Credentials,
    ) -> Result<ChunkSource, ClientError>;

    /// Fetch today's generation usage.
    async fn course_limits(&self, credentials: &Credentials) -> Result<UsageLimits, ClientError>;

    /// Fetch the user's subscription status.
    async fn billing_details(&self, credentials: &Credentials)
        -> Result<BillingDetails, ClientError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        let api = ClientError::Api {
            status: 429,
            message: "Daily limit reached".to_string(),
        };
        assert_eq!(api.user_message(), "Daily limit reached");
        assert_eq!(
            ClientError::NotLoggedIn.user_message(),
            "Please login to generate course content"
        );
        assert_eq!(
            ClientError::InvalidLesson.user_message(),
            "Invalid module title or lesson title"
        );
        assert_eq!(ClientError::MissingBody.user_message(), DEFAULT_ERROR_MESSAGE);
        assert_eq!(
            ClientError::Decode("truncated".to_string()).user_message(),
            DEFAULT_ERROR_MESSAGE
        );
    }
}
