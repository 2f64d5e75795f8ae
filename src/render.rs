//! Markdown to safe HTML for lesson content.
//!
//! The renderer is called on every progress snapshot, so it is a pure
//! function of its input with cost linear in the text length.

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};

/// Characters that only carry meaning as markdown syntax.
const MARKER_CHARS: &[char] = &['#', '*', '_', '`', '~', '-', '+', '=', '>', '|', ':', '!', '['];

/// URL schemes that are never emitted in `href` or `src`.
const BLOCKED_SCHEMES: &[&str] = &["javascript:", "vbscript:", "data:"];

/// Whether the text is still arriving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// More text may follow; a dangling half-received marker is held back.
    Streaming,
    /// The text is complete.
    Final,
}

/// Convert markdown to HTML that is safe to assign into a document.
///
/// Raw HTML in the input is escaped and script-capable link targets are
/// replaced by `#`.
///
/// # Example
/// ```
/// use lessonstream::render::{markdown_to_html, RenderMode};
///
/// let html = markdown_to_html("# Ownership\n\n<b>moves</b>", RenderMode::Final);
/// assert!(html.contains("<h1>Ownership</h1>"));
/// assert!(html.contains("&lt;b&gt;moves&lt;/b&gt;"));
/// ```
pub fn markdown_to_html(markdown: &str, mode: RenderMode) -> String {
    let source = match mode {
        RenderMode::Streaming => settled_prefix(markdown),
        RenderMode::Final => markdown,
    };

    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(source, options).map(sanitize);

    let mut out = String::with_capacity(source.len() + source.len() / 2);
    html::push_html(&mut out, parser);
    out
}

/// `markdown` minus a trailing, unterminated line made only of marker
/// characters, such as a lone `#` or `**` still waiting for its text.
fn settled_prefix(markdown: &str) -> &str {
    if markdown.ends_with('\n') {
        return markdown;
    }

    let start = markdown.rfind('\n').map_or(0, |i| i + 1);
    let tail = markdown[start..].trim();

    if !tail.is_empty() && tail.chars().all(|c| MARKER_CHARS.contains(&c) || c.is_whitespace()) {
        &markdown[..start]
    } else {
        markdown
    }
}

fn sanitize(event: Event<'_>) -> Event<'_> {
    match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        other => other,
    }
}

fn safe_url(url: CowStr<'_>) -> CowStr<'_> {
    let normalized: String = url
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();

    if BLOCKED_SCHEMES.iter().any(|scheme| normalized.starts_with(scheme)) {
        CowStr::Borrowed("#")
    } else {
        url
    }
}
