//! Lesson viewer state driven by one generation request at a time.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::client::{ChunkSource, ClientError, CourseApi};
use crate::credentials::Credentials;
use crate::model::LessonCursor;
use crate::render::{markdown_to_html, RenderMode};
use crate::stream::{read_stream_until_cancelled, StreamHandlers};

/// What the lesson viewer displays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LessonView {
    /// Waiting for the response to start
    pub is_loading: bool,
    /// Receiving lesson text
    pub is_generating: bool,
    pub error: Option<String>,
    /// Rendered lesson, safe to assign into the document
    pub html: String,
}

impl LessonView {
    /// Show a spinner.
    pub fn is_busy(&self) -> bool {
        self.is_loading || self.is_generating
    }
}

/// Runs lesson generations for one course and keeps the resulting view.
///
/// # Example
/// ```rust,ignore
/// let mut session = LessonSession::new(&client, credentials, "rust-basics");
/// let token = CancellationToken::new();
/// session
///     .generate(&cursor, &token, |view| println!("{} bytes of html", view.html.len()))
///     .await?;
/// ```
pub struct LessonSession<'a, A: CourseApi + ?Sized> {
    api: &'a A,
    credentials: Credentials,
    course_slug: String,
    view: LessonView,
}

impl<'a, A: CourseApi + ?Sized> LessonSession<'a, A> {
    pub fn new(api: &'a A, credentials: Credentials, course_slug: impl Into<String>) -> Self {
        Self {
            api,
            credentials,
            course_slug: course_slug.into(),
            view: LessonView::default(),
        }
    }

    pub fn view(&self) -> &LessonView {
        &self.view
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Show the lesson body. When false, the host shows a login prompt.
    pub fn is_logged_in(&self) -> bool {
        self.credentials.is_logged_in()
    }

    /// Generate the lesson at `cursor`, calling `on_update` after every
    /// change to the view.
    ///
    /// Returns the full lesson markdown. Cancelling `token` stops the stream
    /// and leaves the partial lesson in place without an error message.
    pub async fn generate<F>(
        &mut self,
        cursor: &LessonCursor,
        token: &CancellationToken,
        mut on_update: F,
    ) -> Result<String, ClientError>
    where
        F: FnMut(&LessonView) + Send,
    {
        self.view.is_loading = true;
        self.view.error = None;
        on_update(&self.view);

        let started = self.start(cursor).await;
        self.view.is_loading = false;

        let source = match started {
            Ok(source) => source,
            Err(e) => {
                debug!("Lesson generation did not start: {}", e);
                self.view.error = Some(e.user_message());
                on_update(&self.view);
                return Err(e);
            }
        };

        self.view.is_generating = true;
        on_update(&self.view);

        let view = &mut self.view;
        let progress = |text: &str| {
            view.html = markdown_to_html(text, RenderMode::Streaming);
            on_update(&*view);
        };
        let result = read_stream_until_cancelled(source, StreamHandlers::new(progress), token).await;

        self.view.is_generating = false;
        match &result {
            Ok(text) => {
                info!("Lesson generated ({} bytes)", text.len());
                self.view.html = markdown_to_html(text, RenderMode::Final);
            }
            Err(ClientError::StreamCancelled) => {}
            Err(e) => self.view.error = Some(e.user_message()),
        }
        on_update(&self.view);

        result
    }

    async fn start(&self, cursor: &LessonCursor) -> Result<ChunkSource, ClientError> {
        if !self.credentials.is_logged_in() {
            return Err(ClientError::NotLoggedIn);
        }
        if !cursor.is_complete() {
            return Err(ClientError::InvalidLesson);
        }

        self.api
            .generate_lesson(&self.course_slug, &cursor.to_request(), &self.credentials)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limits::{BillingDetails, BillingStatus, UsageLimits};
    use crate::model::LessonRequest;
    use async_trait::async_trait;
    use bytes::Bytes;
    use futures::stream::{self, StreamExt};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    enum Reply {
        Chunks(Vec<&'static str>),
        FailAfter(Vec<&'static str>),
        Status(u16, &'static str),
    }

    struct FakeApi {
        reply: Reply,
        calls: AtomicUsize,
        last_request: Mutex<Option<LessonRequest>>,
    }

    impl FakeApi {
        fn new(reply: Reply) -> Self {
            Self {
                reply,
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl CourseApi for FakeApi {
        async fn generate_lesson(
            &self,
            _course_slug: &str,
            request: &LessonRequest,
            credentials: &Credentials,
        ) -> Result<ChunkSource, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(request.clone());

            let to_chunks = |parts: &Vec<&'static str>| -> Vec<Result<Bytes, ClientError>> {
                parts.iter().map(|p| Ok(Bytes::from(*p))).collect()
            };

            match &self.reply {
                Reply::Chunks(parts) => Ok(stream::iter(to_chunks(parts)).boxed()),
                Reply::FailAfter(parts) => {
                    let mut items = to_chunks(parts);
                    items.push(Err(ClientError::Decode("connection reset".to_string())));
                    Ok(stream::iter(items).boxed())
                }
                Reply::Status(401, message) => {
                    credentials.logout();
                    Err(ClientError::Unauthorized {
                        message: message.to_string(),
                    })
                }
                Reply::Status(status, message) => Err(ClientError::Api {
                    status: *status,
                    message: message.to_string(),
                }),
            }
        }

        async fn course_limits(&self, _: &Credentials) -> Result<UsageLimits, ClientError> {
            Ok(UsageLimits { used: 0, limit: 10 })
        }

        async fn billing_details(&self, _: &Credentials) -> Result<BillingDetails, ClientError> {
            Ok(BillingDetails {
                status: BillingStatus::None,
            })
        }
    }

    fn cursor() -> LessonCursor {
        LessonCursor {
            active_module_index: 0,
            total_modules: 2,
            module_title: "Module 1: Basics".to_string(),
            active_lesson_index: 1,
            total_lessons: 3,
            lesson_title: "Lesson 2: Variables".to_string(),
        }
    }

    async fn run(
        api: &FakeApi,
        credentials: Credentials,
        cursor: &LessonCursor,
    ) -> (Result<String, ClientError>, Vec<LessonView>, LessonView) {
        let mut session = LessonSession::new(api, credentials, "rust-basics");
        let mut updates = Vec::new();
        let result = session
            .generate(cursor, &CancellationToken::new(), |view| updates.push(view.clone()))
            .await;
        (result, updates, session.view().clone())
    }

    #[tokio::test]
    async fn test_streams_and_renders_lesson() {
        let api = FakeApi::new(Reply::Chunks(vec!["# Variab", "les\n\nUse `let`.", "\n"]));

        let (result, updates, view) = run(&api, Credentials::new("token"), &cursor()).await;

        assert_eq!(result.unwrap(), "# Variables\n\nUse `let`.\n");
        assert!(!view.is_busy());
        assert_eq!(view.error, None);
        assert!(view.html.contains("<h1>Variables</h1>"));
        assert!(view.html.contains("<code>let</code>"));

        assert!(updates[0].is_loading);
        assert!(updates[1].is_generating && !updates[1].is_loading);
        assert!(updates[2].html.contains("<h1>Variab</h1>"));
        assert_eq!(updates.len(), 6);

        let sent = api.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(sent.lesson_position, 1);
        assert_eq!(sent.total_lessons_in_module, 3);
    }

    #[tokio::test]
    async fn test_requires_login() {
        let api = FakeApi::new(Reply::Chunks(vec!["never"]));

        let (result, _, view) = run(&api, Credentials::anonymous(), &cursor()).await;

        assert!(matches!(result, Err(ClientError::NotLoggedIn)));
        assert_eq!(view.error.as_deref(), Some("Please login to generate course content"));
        assert!(!view.is_busy());
        assert_eq!(api.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_rejects_missing_titles() {
        let api = FakeApi::new(Reply::Chunks(vec!["never"]));
        let blank = LessonCursor {
            lesson_title: String::new(),
            ..cursor()
        };

        let (result, _, view) = run(&api, Credentials::new("token"), &blank).await;

        assert!(matches!(result, Err(ClientError::InvalidLesson)));
        assert_eq!(view.error.as_deref(), Some("Invalid module title or lesson title"));
        assert_eq!(api.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unauthorized_logs_out_without_streaming() {
        let api = FakeApi::new(Reply::Status(401, "Invalid token"));
        let logouts = Arc::new(AtomicUsize::new(0));
        let counter = logouts.clone();
        let credentials = Credentials::new("stale").on_logout(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let (result, updates, view) = run(&api, credentials.clone(), &cursor()).await;

        assert!(matches!(result, Err(ClientError::Unauthorized { .. })));
        assert_eq!(logouts.load(Ordering::SeqCst), 1);
        assert!(!credentials.is_logged_in());
        assert!(updates.iter().all(|v| !v.is_generating));
        assert_eq!(view.html, "");
    }

    #[tokio::test]
    async fn test_api_error_shows_message_and_keeps_credentials() {
        let api = FakeApi::new(Reply::Status(429, "Daily limit reached"));
        let credentials = Credentials::new("token");

        let (result, _, view) = run(&api, credentials.clone(), &cursor()).await;

        assert!(matches!(result, Err(ClientError::Api { status: 429, .. })));
        assert_eq!(view.error.as_deref(), Some("Daily limit reached"));
        assert!(credentials.is_logged_in());
    }

    #[tokio::test]
    async fn test_stream_failure_keeps_partial_lesson() {
        let api = FakeApi::new(Reply::FailAfter(vec!["Partial text"]));

        let (result, _, view) = run(&api, Credentials::new("token"), &cursor()).await;

        assert!(matches!(result, Err(ClientError::Decode(_))));
        assert_eq!(view.error.as_deref(), Some("Something went wrong"));
        assert!(view.html.contains("Partial text"));
        assert!(!view.is_generating);
    }

    #[tokio::test]
    async fn test_cancelled_generation_has_no_error() {
        let api = FakeApi::new(Reply::Chunks(vec!["a", "b"]));
        let mut session = LessonSession::new(&api, Credentials::new("token"), "rust-basics");
        let token = CancellationToken::new();
        token.cancel();

        let result = session.generate(&cursor(), &token, |_| {}).await;

        assert!(matches!(result, Err(ClientError::StreamCancelled)));
        assert_eq!(session.view().error, None);
        assert!(!session.view().is_busy());
    }
}
