//! Syntax Highlighting
//!
//! This module wraps syntect to turn source code into lines of colored
//! segments that the rasterizer can draw.
//!
//! # Features
//! - Loads syntect's bundled SyntaxSet and ThemeSet once per highlighter
//! - Resolves language identifiers through a table of common aliases
//! - Falls back to plain text (theme foreground) for unknown languages

use super::RenderError;
use image::Rgba;
use log::{debug, warn};
use syntect::easy::HighlightLines;
use syntect::highlighting::{Color, FontStyle, Style, Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

/// Fallback theme if the specified theme is not found
pub const FALLBACK_THEME: &str = "base16-ocean.dark";

/// Used when a theme defines no foreground color.
const DEFAULT_FOREGROUND: Rgba<u8> = Rgba([0xc0, 0xc5, 0xce, 0xff]);

/// Used when a theme defines no background color.
const DEFAULT_BACKGROUND: Rgba<u8> = Rgba([0x2b, 0x30, 0x3b, 0xff]);

// ─────────────────────────────────────────────────────────────────────────────
// Highlighted Segment
// ─────────────────────────────────────────────────────────────────────────────

/// A segment of highlighted text with its associated color.
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightedSegment {
    /// The text content of this segment
    pub text: String,
    /// Foreground color for this segment
    pub foreground: Rgba<u8>,
    /// Whether this segment should be bold
    pub bold: bool,
}

impl HighlightedSegment {
    pub fn new(text: String, foreground: Rgba<u8>) -> Self {
        Self {
            text,
            foreground,
            bold: false,
        }
    }
}

/// A line of highlighted segments.
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightedLine {
    /// The segments that make up this line
    pub segments: Vec<HighlightedSegment>,
}

impl HighlightedLine {
    pub fn new(segments: Vec<HighlightedSegment>) -> Self {
        Self { segments }
    }

    /// Create an unhighlighted line with a single segment.
    pub fn plain(text: &str, color: Rgba<u8>) -> Self {
        Self {
            segments: vec![HighlightedSegment::new(text.to_string(), color)],
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Syntax Highlighter
// ─────────────────────────────────────────────────────────────────────────────

/// Syntax highlighter holding syntect's syntax and theme sets.
///
/// Loading the sets is relatively expensive, so one highlighter should be
/// built per conversion and reused for every code span.
pub struct SyntaxHighlighter {
    /// Loaded syntax definitions
    syntax_set: SyntaxSet,
    /// Loaded color themes
    theme_set: ThemeSet,
}

impl Default for SyntaxHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntaxHighlighter {
    /// Create a new syntax highlighter with syntect's default syntaxes and themes.
    pub fn new() -> Self {
        debug!("Loading syntect syntax and theme sets");
        let syntax_set = SyntaxSet::load_defaults_newlines();
        let theme_set = ThemeSet::load_defaults();
        debug!(
            "Loaded {} syntaxes and {} themes",
            syntax_set.syntaxes().len(),
            theme_set.themes.len()
        );
        Self {
            syntax_set,
            theme_set,
        }
    }

    /// Get available theme names.
    pub fn available_themes(&self) -> Vec<&str> {
        self.theme_set.themes.keys().map(|s| s.as_str()).collect()
    }

    /// Whether a theme with this name is loaded.
    pub fn has_theme(&self, name: &str) -> bool {
        self.theme_set.themes.contains_key(name)
    }

    /// Get a theme by name, falling back to the default if not found.
    pub fn get_theme(&self, name: &str) -> &Theme {
        self.theme_set
            .themes
            .get(name)
            .or_else(|| self.theme_set.themes.get(FALLBACK_THEME))
            .expect("Fallback theme should always exist")
    }

    /// Highlight code with the specified language and theme.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::UnsupportedLanguage` if no syntax matches `language`.
    pub fn highlight(
        &self,
        code: &str,
        language: &str,
        theme: &Theme,
    ) -> Result<Vec<HighlightedLine>, RenderError> {
        let syntax = self.find_syntax_for_language(language).ok_or_else(|| {
            RenderError::UnsupportedLanguage {
                language: language.to_string(),
            }
        })?;

        let mut highlighter = HighlightLines::new(syntax, theme);
        let mut lines = Vec::new();

        for line in LinesWithEndings::from(code) {
            match highlighter.highlight_line(line, &self.syntax_set) {
                Ok(ranges) => {
                    let segments = ranges
                        .into_iter()
                        .map(|(style, text)| style_to_segment(style, text))
                        .collect();
                    lines.push(HighlightedLine::new(segments));
                }
                Err(e) => {
                    warn!("Failed to highlight line: {}", e);
                    // Fall back to plain text for this line
                    lines.push(HighlightedLine::plain(line, self.foreground(theme)));
                }
            }
        }

        Ok(lines)
    }

    /// Lay out code as plain text in the theme's foreground color.
    pub fn plain(&self, code: &str, theme: &Theme) -> Vec<HighlightedLine> {
        let color = self.foreground(theme);
        code.lines()
            .map(|line| HighlightedLine::plain(line, color))
            .collect()
    }

    /// Foreground color of a theme.
    pub fn foreground(&self, theme: &Theme) -> Rgba<u8> {
        theme
            .settings
            .foreground
            .map(syntect_to_rgba)
            .unwrap_or(DEFAULT_FOREGROUND)
    }

    /// Background color of a theme.
    pub fn background(&self, theme: &Theme) -> Rgba<u8> {
        theme
            .settings
            .background
            .map(syntect_to_rgba)
            .unwrap_or(DEFAULT_BACKGROUND)
    }

    /// Find syntax definition for a language identifier.
    ///
    /// Tries multiple strategies:
    /// 1. By extension (e.g., "rs" -> Rust)
    /// 2. By name (e.g., "Rust" -> Rust)
    /// 3. By case-insensitive name
    fn find_syntax_for_language(&self, language: &str) -> Option<&SyntaxReference> {
        let language = language.trim();
        if language.is_empty() {
            return None;
        }

        let lang_lower = language.to_lowercase();

        // Map common language aliases to extensions
        let extension = match lang_lower.as_str() {
            "rust" | "rs" => "rs",
            "python" | "py" | "python3" => "py",
            "javascript" | "js" => "js",
            "typescript" | "ts" => "ts",
            "c" | "h" => "c",
            "cpp" | "c++" | "cxx" | "hpp" => "cpp",
            "csharp" | "c#" | "cs" => "cs",
            "java" => "java",
            "go" | "golang" => "go",
            "ruby" | "rb" => "rb",
            "php" => "php",
            "scala" => "scala",
            "html" | "htm" => "html",
            "css" => "css",
            "json" => "json",
            "yaml" | "yml" => "yaml",
            "xml" => "xml",
            "markdown" | "md" => "md",
            "sql" => "sql",
            "shell" | "sh" | "bash" | "zsh" => "sh",
            "makefile" | "make" => "Makefile",
            "lua" => "lua",
            "perl" | "pl" => "pl",
            "r" => "r",
            "haskell" | "hs" => "hs",
            "erlang" | "erl" => "erl",
            "clojure" | "clj" => "clj",
            "ocaml" | "ml" => "ml",
            "lisp" | "lsp" => "lisp",
            "pascal" | "pas" => "pas",
            "matlab" => "matlab",
            "diff" | "patch" => "diff",
            "latex" | "tex" => "tex",
            other => other,
        };

        if let Some(syntax) = self.syntax_set.find_syntax_by_extension(extension) {
            return Some(syntax);
        }

        if let Some(syntax) = self.syntax_set.find_syntax_by_name(language) {
            return Some(syntax);
        }

        self.syntax_set
            .syntaxes()
            .iter()
            .find(|syntax| syntax.name.to_lowercase() == lang_lower)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helper Functions
// ─────────────────────────────────────────────────────────────────────────────

/// Convert syntect Color to an image pixel.
pub fn syntect_to_rgba(color: Color) -> Rgba<u8> {
    Rgba([color.r, color.g, color.b, color.a])
}

/// Convert syntect Style to HighlightedSegment.
fn style_to_segment(style: Style, text: &str) -> HighlightedSegment {
    HighlightedSegment {
        text: text.to_string(),
        foreground: syntect_to_rgba(style.foreground),
        bold: style.font_style.contains(FontStyle::BOLD),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
