//! Stream one generated lesson to the terminal.
//!
//! Run with:
//! ```bash
//! export PUBLIC_API_URL="https://api.example.com"
//! export COURSE_TOKEN="your-jwt"
//! RUST_LOG=lessonstream=debug cargo run --example lesson_stream -- learn-rust
//! ```
//!
//! Press Ctrl-C to stop the stream early.

use std::io::Write;

use lessonstream::limits::fetch_upsell;
use lessonstream::model::LessonCursor;
use lessonstream::providers::HttpCourseClient;
use lessonstream::{ClientError, Credentials, LessonSession};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let course_slug = std::env::args().nth(1).unwrap_or_else(|| "learn-rust".to_string());
    let token = std::env::var("COURSE_TOKEN").expect("COURSE_TOKEN environment variable must be set");

    let client = HttpCourseClient::from_env()?;
    let credentials = Credentials::new(token).on_logout(|| eprintln!("\nSession expired, please log in again."));

    match fetch_upsell(&client, &credentials).await {
        Ok(decision) => {
            if decision.show_usage_meter {
                eprintln!("{}% of the daily limit used", decision.usage_percentage);
            }
            if decision.show_upgrade_prompt {
                eprintln!("Upgrade for higher limits.");
            }
        }
        Err(e) => eprintln!("Could not load usage limits: {}", e),
    }

    let cursor = LessonCursor {
        active_module_index: 0,
        total_modules: 1,
        module_title: "Module 1: Getting Started".to_string(),
        active_lesson_index: 0,
        total_lessons: 1,
        lesson_title: "Lesson 1: Hello, Cargo".to_string(),
    };

    println!("== {} / {}", cursor.display_module_title(), cursor.display_lesson_title());

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_ctrl_c.cancel();
        }
    });

    let mut session = LessonSession::new(&client, credentials, course_slug);
    let mut printed = 0;
    let result = session
        .generate(&cursor, &cancel, |view| {
            // HTML is re-rendered per snapshot, so only report growth.
            if view.html.len() > printed {
                print!("\r{} bytes of HTML", view.html.len());
                let _ = std::io::stdout().flush();
                printed = view.html.len();
            }
        })
        .await;

    match result {
        Ok(markdown) => {
            println!("\n\n{}", markdown);
        }
        Err(ClientError::StreamCancelled) => {
            println!("\n\nStopped.");
        }
        Err(e) => {
            eprintln!("\n{}", e.user_message());
            return Err(e.into());
        }
    }

    Ok(())
}
