//! Course API implementations.

pub mod rest;

// Re-export for convenience
pub use rest::HttpCourseClient;
