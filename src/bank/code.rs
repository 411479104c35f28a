//! Inline code spans
//!
//! Question and answer text may embed source code as
//! `<code lang="python">...</code>`. This module splits such text into plain
//! and code segments so the code can be rendered separately.

use regex::Regex;
use std::sync::OnceLock;

/// Language assumed for `<code>` tags without a `lang` attribute.
pub const DEFAULT_CODE_LANGUAGE: &str = "python";

// ─────────────────────────────────────────────────────────────────────────────
// Segments
// ─────────────────────────────────────────────────────────────────────────────

/// A piece of source code embedded in question or answer text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeSpan {
    /// Declared language identifier (e.g. "python", "rust")
    pub language: String,
    /// Unescaped source code
    pub code: String,
}

/// One segment of rich text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Code(CodeSpan),
}

/// Text with embedded code spans, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RichText {
    segments: Vec<Segment>,
}

impl RichText {
    /// Split raw text into plain and code segments.
    pub fn parse(raw: &str) -> Self {
        let mut segments = Vec::new();
        let mut last = 0;

        for caps in code_span_regex().captures_iter(raw) {
            let Some(whole) = caps.get(0) else { continue };
            if whole.start() > last {
                segments.push(Segment::Text(raw[last..whole.start()].to_string()));
            }

            let language = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str().trim())
                .filter(|lang| !lang.is_empty())
                .unwrap_or(DEFAULT_CODE_LANGUAGE)
                .to_string();
            let body = caps.get(3).map_or("", |m| m.as_str());

            segments.push(Segment::Code(CodeSpan {
                language,
                code: html_unescape(strip_outer_newlines(body)),
            }));
            last = whole.end();
        }

        if last < raw.len() {
            segments.push(Segment::Text(raw[last..].to_string()));
        }

        Self { segments }
    }

    /// The segments in source order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Iterate over the code spans only.
    pub fn code_spans(&self) -> impl Iterator<Item = &CodeSpan> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Code(span) => Some(span),
            Segment::Text(_) => None,
        })
    }

    /// Whether the text has no visible content.
    pub fn is_blank(&self) -> bool {
        self.segments.iter().all(|s| match s {
            Segment::Text(t) => t.trim().is_empty(),
            Segment::Code(_) => false,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn code_span_regex() -> &'static Regex {
    static CODE_SPAN: OnceLock<Regex> = OnceLock::new();
    CODE_SPAN.get_or_init(|| {
        Regex::new(r#"(?s)<code(?:\s+lang=(?:"([^"]*)"|'([^']*)'))?\s*>(.*?)</code>"#)
            .expect("code span pattern is valid")
    })
}

/// Drop one newline directly after the opening tag and one before the closing tag.
fn strip_outer_newlines(body: &str) -> &str {
    let body = body
        .strip_prefix("\r\n")
        .or_else(|| body.strip_prefix('\n'))
        .unwrap_or(body);
    body.strip_suffix("\r\n")
        .or_else(|| body.strip_suffix('\n'))
        .unwrap_or(body)
}

/// Decode the HTML entities authors use to keep `<` and `&` out of the tag.
pub fn html_unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest
            .find(';')
            .filter(|&end| end <= 10)
            .and_then(|end| decode_entity(&rest[1..end]).map(|c| (c, end)));

        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" | "#39" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
