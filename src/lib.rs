//! # lessonstream - AI course lesson streaming client
//!
//! A small async library for the client side of AI-generated courses:
//! it requests a lesson, reads the streamed body into a growing text
//! buffer and renders every snapshot to safe HTML, and it decides when
//! usage limits warrant an upgrade prompt.
//!
//! ## Features
//! - Async-first, tokio compatible
//! - Cumulative streaming with progress, completion and error callbacks
//! - Cancellation through `tokio_util::sync::CancellationToken` or by
//!   dropping the snapshot stream
//! - Incremental UTF-8 decoding across chunk boundaries
//! - Markdown rendering with raw HTML escaped
//! - Explicit credential context with a logout hook for rejected tokens
//!
//! ## Architecture
//!
//! - **`CourseApi`**: the network seam, implemented over HTTP by `HttpCourseClient`
//! - **`stream`**: the reader turning a chunk source into cumulative text
//! - **`render`**: markdown to HTML, pure and linear in input size
//! - **`LessonSession`**: view state for one lesson viewer
//! - **`limits`**: usage-threshold gating for upgrade prompts
//!
//! ## Example
//! ```no_run
//! use lessonstream::credentials::Credentials;
//! use lessonstream::model::LessonCursor;
//! use lessonstream::providers::HttpCourseClient;
//! use lessonstream::session::LessonSession;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HttpCourseClient::from_env()?;
//!     let credentials = Credentials::new("jwt").on_logout(|| eprintln!("session expired"));
//!
//!     let cursor = LessonCursor {
//!         active_module_index: 0,
//!         total_modules: 4,
//!         module_title: "Module 1: Getting Started".to_string(),
//!         active_lesson_index: 0,
//!         total_lessons: 5,
//!         lesson_title: "Lesson 1: Installing Rust".to_string(),
//!     };
//!
//!     let mut session = LessonSession::new(&client, credentials, "learn-rust");
//!     let token = CancellationToken::new();
//!     session
//!         .generate(&cursor, &token, |view| println!("{} bytes rendered", view.html.len()))
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod credentials;
pub mod decode;
pub mod http;
pub mod limits;
pub mod model;
pub mod options;
pub mod providers;
pub mod render;
pub mod session;
pub mod stream;

// Re-exports for convenience
pub use client::{ChunkSource, ClientError, CourseApi};
pub use credentials::Credentials;
pub use render::{markdown_to_html, RenderMode};
pub use session::{LessonSession, LessonView};
pub use stream::{cumulative_text, read_stream, read_stream_until_cancelled, StreamHandlers};
