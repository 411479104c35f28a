//! Code image rendering
//!
//! Turns a code snippet into a syntax-highlighted PNG.
//!
//! # Architecture
//!
//! - `highlight.rs` - syntect integration and language resolution
//! - `raster.rs` - bitmap-font drawing and PNG encoding
//!
//! The [`CodeRenderer`] is built from explicit [`RenderSettings`]; there is no
//! shared highlighter state between renderers.

pub mod highlight;
pub mod raster;

pub use highlight::SyntaxHighlighter;

use crate::config::{parse_hex_color, RenderSettings};
use highlight::HighlightedLine;
use image::Rgba;
use log::{debug, warn};
use raster::{encode_png, rasterize, RasterStyle};
use std::fmt;

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that can occur while rendering code.
#[derive(Debug)]
pub enum RenderError {
    /// The language identifier matches no known syntax
    UnsupportedLanguage { language: String },
    /// PNG encoding failed
    Encode(image::ImageError),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::UnsupportedLanguage { language } => {
                write!(f, "unsupported code language '{}'", language)
            }
            RenderError::Encode(e) => write!(f, "failed to encode code image: {}", e),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Encode(e) => Some(e),
            RenderError::UnsupportedLanguage { .. } => None,
        }
    }
}

impl From<image::ImageError> for RenderError {
    fn from(err: image::ImageError) -> Self {
        RenderError::Encode(err)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Code Image
// ─────────────────────────────────────────────────────────────────────────────

/// A rendered code snippet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeImage {
    /// Language the snippet was declared with
    pub language: String,
    /// PNG bytes
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// False when the snippet was drawn as plain text
    pub highlighted: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Renderer
// ─────────────────────────────────────────────────────────────────────────────

/// Renders code snippets with a fixed theme and layout.
pub struct CodeRenderer {
    settings: RenderSettings,
    highlighter: SyntaxHighlighter,
}

impl CodeRenderer {
    /// Create a renderer, loading syntect's syntax and theme sets.
    pub fn new(settings: RenderSettings) -> Self {
        Self::with_highlighter(settings, SyntaxHighlighter::new())
    }

    /// Create a renderer around an already loaded highlighter.
    pub fn with_highlighter(settings: RenderSettings, highlighter: SyntaxHighlighter) -> Self {
        if !highlighter.has_theme(&settings.theme) {
            warn!(
                "Unknown highlighting theme '{}', using '{}'. Available: {}",
                settings.theme,
                highlight::FALLBACK_THEME,
                highlighter.available_themes().join(", ")
            );
        }
        Self {
            settings,
            highlighter,
        }
    }

    /// Render with syntax highlighting, failing on unknown languages.
    ///
    /// # Errors
    ///
    /// - `RenderError::UnsupportedLanguage` if `language` is not recognized
    /// - `RenderError::Encode` if PNG encoding fails
    pub fn render_highlighted(&self, code: &str, language: &str) -> Result<CodeImage, RenderError> {
        let theme = self.highlighter.get_theme(&self.settings.theme);
        let lines = self.highlighter.highlight(code, language, theme)?;
        self.draw(&lines, language, true)
    }

    /// Render with syntax highlighting, falling back to plain monospace text
    /// when the language is not recognized.
    ///
    /// # Errors
    ///
    /// Only `RenderError::Encode`.
    pub fn render(&self, code: &str, language: &str) -> Result<CodeImage, RenderError> {
        match self.render_highlighted(code, language) {
            Err(RenderError::UnsupportedLanguage { language }) => {
                warn!(
                    "No syntax for code language '{}', rendering as plain text",
                    language
                );
                let theme = self.highlighter.get_theme(&self.settings.theme);
                let lines = self.highlighter.plain(code, theme);
                self.draw(&lines, &language, false)
            }
            other => other,
        }
    }

    fn draw(
        &self,
        lines: &[HighlightedLine],
        language: &str,
        highlighted: bool,
    ) -> Result<CodeImage, RenderError> {
        let style = self.raster_style();
        let img = rasterize(lines, &style);
        let png = encode_png(&img)?;

        debug!(
            "Rendered {} line(s) of {} code into {}x{} PNG ({} bytes)",
            lines.len(),
            language,
            img.width(),
            img.height(),
            png.len()
        );

        Ok(CodeImage {
            language: language.to_string(),
            png,
            width: img.width(),
            height: img.height(),
            highlighted,
        })
    }

    fn raster_style(&self) -> RasterStyle {
        let theme = self.highlighter.get_theme(&self.settings.theme);
        let defaults = RenderSettings::default();
        let color = |value: &str, fallback: &str| {
            let [r, g, b] = parse_hex_color(value)
                .or_else(|| parse_hex_color(fallback))
                .unwrap_or([0, 0, 0]);
            Rgba([r, g, b, 0xff])
        };

        RasterStyle {
            scale: self.settings.font_scale.clamp(
                RenderSettings::MIN_FONT_SCALE,
                RenderSettings::MAX_FONT_SCALE,
            ),
            padding: self.settings.padding,
            tab_width: self.settings.tab_width,
            line_numbers: self.settings.line_numbers,
            background: self.highlighter.background(theme),
            gutter_background: color(&self.settings.line_number_bg, &defaults.line_number_bg),
            gutter_foreground: color(&self.settings.line_number_fg, &defaults.line_number_fg),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
