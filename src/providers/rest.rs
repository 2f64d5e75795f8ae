//! REST implementation of [`CourseApi`].
//!
//! Endpoints, relative to the configured base URL:
//! - `POST /v1-generate-ai-course-lesson/{slug}`: streamed lesson markdown
//! - `GET /v1-get-ai-course-limits`: `{ "used": n, "limit": n }`
//! - `GET /v1-billing-details`: `{ "status": "none" | "active" | ... }`

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::client::{ChunkSource, ClientError, CourseApi};
use crate::credentials::Credentials;
use crate::http::{add_extra_headers, authorize, build_http_client, error_from_response};
use crate::limits::{BillingDetails, UsageLimits};
use crate::model::LessonRequest;
use crate::options::ClientOptions;

const GENERATE_LESSON_PATH: &str = "v1-generate-ai-course-lesson";
const COURSE_LIMITS_PATH: &str = "v1-get-ai-course-limits";
const BILLING_DETAILS_PATH: &str = "v1-billing-details";

/// Course API client over HTTP.
pub struct HttpCourseClient {
    http: reqwest::Client,
    options: ClientOptions,
}

impl HttpCourseClient {
    /// Create a client from options.
    pub fn new(options: ClientOptions) -> Result<Self, ClientError> {
        let http = build_http_client(&options)?;
        Ok(Self { http, options })
    }

    /// Create a client configured from the environment.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::new(ClientOptions::from_env()?)
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Send `request`, returning the response only when it is OK.
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        credentials: &Credentials,
    ) -> Result<reqwest::Response, ClientError> {
        let request = add_extra_headers(authorize(request, credentials), &self.options.extra_headers);
        let response = request.send().await?;
        let status = response.status();
        debug!("Course API responded with HTTP {}", status);

        if !status.is_success() {
            return Err(error_from_response(response, credentials).await);
        }

        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        credentials: &Credentials,
    ) -> Result<T, ClientError> {
        let url = self.options.endpoint(path);
        let response = self.send(self.http.get(&url), credentials).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl CourseApi for HttpCourseClient {
    async fn generate_lesson(
        &self,
        course_slug: &str,
        request: &LessonRequest,
        credentials: &Credentials,
    ) -> Result<ChunkSource, ClientError> {
        if !credentials.is_logged_in() {
            return Err(ClientError::NotLoggedIn);
        }

        let url = self
            .options
            .endpoint(&format!("{}/{}", GENERATE_LESSON_PATH, course_slug));
        info!(
            "Generating lesson {} / {} for course {}",
            request.module_title, request.lesson_title, course_slug
        );

        let req = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .json(request);
        let response = self.send(req, credentials).await?;

        if response.status() == StatusCode::NO_CONTENT {
            return Err(ClientError::MissingBody);
        }

        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map_err(ClientError::from))
            .boxed())
    }

    async fn course_limits(&self, credentials: &Credentials) -> Result<UsageLimits, ClientError> {
        self.get_json(COURSE_LIMITS_PATH, credentials).await
    }

    async fn billing_details(
        &self,
        credentials: &Credentials,
    ) -> Result<BillingDetails, ClientError> {
        self.get_json(BILLING_DETAILS_PATH, credentials).await
    }
}
