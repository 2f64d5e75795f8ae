//! Request and response shapes exchanged with the course API.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Body of a lesson generation request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LessonRequest {
    pub module_title: String,
    pub lesson_title: String,
    pub module_position: usize,
    pub lesson_position: usize,
    pub total_lessons_in_module: usize,
}

/// Error object carried by a non-OK response.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ApiErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Application status code; may differ from the HTTP status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

/// Position of the lesson viewer inside a generated course.
///
/// Indices are zero-based.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LessonCursor {
    pub active_module_index: usize,
    pub total_modules: usize,
    pub module_title: String,
    pub active_lesson_index: usize,
    pub total_lessons: usize,
    pub lesson_title: String,
}

impl LessonCursor {
    /// Whether a previous lesson exists.
    pub fn has_previous(&self) -> bool {
        !(self.active_module_index == 0 && self.active_lesson_index == 0)
    }

    /// Whether a next lesson exists.
    pub fn has_next(&self) -> bool {
        !(self.active_module_index + 1 >= self.total_modules
            && self.active_lesson_index + 1 >= self.total_lessons)
    }

    /// Both titles are present.
    pub fn is_complete(&self) -> bool {
        !self.module_title.trim().is_empty() && !self.lesson_title.trim().is_empty()
    }

    /// Module title without its `Module 3:` numbering.
    pub fn display_module_title(&self) -> String {
        let stripped = strip_numbering(module_prefix(), &self.module_title);
        if stripped.is_empty() {
            "Loading...".to_string()
        } else {
            stripped.to_string()
        }
    }

    /// Lesson title without its `Lesson 2.` numbering.
    pub fn display_lesson_title(&self) -> String {
        strip_numbering(lesson_prefix(), &self.lesson_title).to_string()
    }

    pub fn to_request(&self) -> LessonRequest {
        LessonRequest {
            module_title: self.module_title.clone(),
            lesson_title: self.lesson_title.clone(),
            module_position: self.active_module_index,
            lesson_position: self.active_lesson_index,
            total_lessons_in_module: self.total_lessons,
        }
    }
}

fn module_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^Module\s*?\d+[.:]\s*").expect("valid module prefix pattern"))
}

fn lesson_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^Lesson\s*?\d+[.:]\s*").expect("valid lesson prefix pattern"))
}

fn strip_numbering<'a>(pattern: &Regex, title: &'a str) -> &'a str {
    match pattern.find(title) {
        Some(m) => &title[m.end()..],
        None => title,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor(module: usize, lesson: usize) -> LessonCursor {
        LessonCursor {
            active_module_index: module,
            total_modules: 3,
            module_title: "Module 1: Ownership".to_string(),
            active_lesson_index: lesson,
            total_lessons: 4,
            lesson_title: "Lesson 2. Borrowing".to_string(),
        }
    }

    #[test]
    fn test_navigation_bounds() {
        assert!(!cursor(0, 0).has_previous());
        assert!(cursor(0, 1).has_previous());
        assert!(cursor(2, 0).has_next());
        assert!(!cursor(2, 3).has_next());
    }

    #[test]
    fn test_display_titles_strip_numbering() {
        let c = cursor(0, 0);
        assert_eq!(c.display_module_title(), "Ownership");
        assert_eq!(c.display_lesson_title(), "Borrowing");

        let plain = LessonCursor {
            module_title: "Modules of the standard library".to_string(),
            lesson_title: "Lesson12: Traits".to_string(),
            ..Default::default()
        };
        assert_eq!(plain.display_module_title(), "Modules of the standard library");
        assert_eq!(plain.display_lesson_title(), "Traits");
    }

    #[test]
    fn test_empty_module_title_shows_loading() {
        let c = LessonCursor::default();
        assert_eq!(c.display_module_title(), "Loading...");
        assert!(!c.is_complete());
    }

    #[test]
    fn test_request_serializes_camel_case() {
        let request = cursor(1, 2).to_request();
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["moduleTitle"], "Module 1: Ownership");
        assert_eq!(json["lessonTitle"], "Lesson 2. Borrowing");
        assert_eq!(json["modulePosition"], 1);
        assert_eq!(json["lessonPosition"], 2);
        assert_eq!(json["totalLessonsInModule"], 4);
    }

    #[test]
    fn test_error_body_fields_are_optional() {
        let body: ApiErrorBody = serde_json::from_str(r#"{"message":"Limit reached"}"#).unwrap();
        assert_eq!(body.message.as_deref(), Some("Limit reached"));
        assert_eq!(body.status, None);

        let body: ApiErrorBody = serde_json::from_str(r#"{"status":401}"#).unwrap();
        assert_eq!(body.status, Some(401));
    }
}
