//! Converter settings
//!
//! This module defines the `Settings` struct that holds all user-configurable
//! options, with serde support for JSON persistence.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Image Handling
// ─────────────────────────────────────────────────────────────────────────────

/// How rendered code images are placed in the generated XML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ImageHandling {
    /// Inline `data:` URI inside the `<img>` tag
    #[default]
    EmbedBase64,
    /// Moodle `@@PLUGINFILE@@` reference backed by a `<file>` element
    PluginFile,
}

// ─────────────────────────────────────────────────────────────────────────────
// Code Rendering
// ─────────────────────────────────────────────────────────────────────────────

/// Appearance of rendered code images.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Name of the syntect theme used for highlighting
    pub theme: String,
    /// Integer upscaling of the 8x8 glyph cell
    pub font_scale: u32,
    /// Whether to draw a line-number gutter
    pub line_numbers: bool,
    /// Gutter background, `#rrggbb`
    pub line_number_bg: String,
    /// Gutter foreground, `#rrggbb`
    pub line_number_fg: String,
    /// Padding around the code, in pixels
    pub padding: u32,
    /// Columns per tab stop
    pub tab_width: u32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            theme: "base16-ocean.dark".to_string(),
            font_scale: 2,
            line_numbers: true,
            line_number_bg: "#272822".to_string(),
            line_number_fg: "#8f908a".to_string(),
            padding: 10,
            tab_width: 4,
        }
    }
}

impl RenderSettings {
    /// Minimum glyph scale.
    pub const MIN_FONT_SCALE: u32 = 1;
    /// Maximum glyph scale.
    pub const MAX_FONT_SCALE: u32 = 8;
    /// Maximum padding in pixels.
    pub const MAX_PADDING: u32 = 64;
    /// Minimum tab width.
    pub const MIN_TAB_WIDTH: u32 = 1;
    /// Maximum tab width.
    pub const MAX_TAB_WIDTH: u32 = 8;

    fn sanitize(&mut self) {
        let defaults = Self::default();

        self.font_scale = self
            .font_scale
            .clamp(Self::MIN_FONT_SCALE, Self::MAX_FONT_SCALE);
        self.padding = self.padding.min(Self::MAX_PADDING);
        self.tab_width = self
            .tab_width
            .clamp(Self::MIN_TAB_WIDTH, Self::MAX_TAB_WIDTH);

        if self.theme.trim().is_empty() {
            self.theme = defaults.theme;
        }
        if parse_hex_color(&self.line_number_bg).is_none() {
            self.line_number_bg = defaults.line_number_bg;
        }
        if parse_hex_color(&self.line_number_fg).is_none() {
            self.line_number_fg = defaults.line_number_fg;
        }
    }
}

/// Parse a `#rrggbb` color string into its RGB components.
pub fn parse_hex_color(value: &str) -> Option<[u8; 3]> {
    let hex = value.trim().strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

// ─────────────────────────────────────────────────────────────────────────────
// Moodle Output
// ─────────────────────────────────────────────────────────────────────────────

/// How multiple-choice questions are graded by Moodle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MultipleChoiceGrading {
    /// `multichoiceset` (All-or-Nothing plugin): full credit only for the
    /// exact set of correct options, no partial credit
    #[default]
    AllOrNothing,
    /// Core `multichoice` for sites without the plugin: correct options share
    /// 100% and each wrong option is -100%. Any wrong selection scores zero,
    /// but an incomplete selection earns partial credit.
    PenalizeWrong,
}

impl MultipleChoiceGrading {
    /// Moodle question type emitted for this grading mode.
    pub fn question_type(&self) -> &'static str {
        match self {
            MultipleChoiceGrading::PenalizeWrong => "multichoice",
            MultipleChoiceGrading::AllOrNothing => "multichoiceset",
        }
    }
}

/// Values written into every generated `<question>` element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Text of the `<name>` element
    pub question_name: String,
    /// Append the 1-based question number to the name
    pub number_names: bool,
    /// Points a question is worth
    pub default_grade: f64,
    /// Penalty factor applied per wrong attempt (0..=1)
    pub penalty: f64,
    /// Height of the essay response editor, in lines
    pub essay_response_lines: u32,
    /// Grading scheme for questions with several correct options
    pub multiple_choice_grading: MultipleChoiceGrading,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            question_name: "Quiz Question".to_string(),
            number_names: false,
            default_grade: 1.0,
            penalty: 0.0,
            essay_response_lines: 10,
            multiple_choice_grading: MultipleChoiceGrading::default(),
        }
    }
}

impl OutputSettings {
    /// Moodle accepts essay editors of 5 to 40 lines.
    pub const MIN_RESPONSE_LINES: u32 = 5;
    /// See [`Self::MIN_RESPONSE_LINES`].
    pub const MAX_RESPONSE_LINES: u32 = 40;

    fn sanitize(&mut self) {
        if self.question_name.trim().is_empty() {
            self.question_name = Self::default().question_name;
        }
        if !self.default_grade.is_finite() || self.default_grade < 0.0 {
            self.default_grade = 1.0;
        }
        if !self.penalty.is_finite() {
            self.penalty = 0.0;
        }
        self.penalty = self.penalty.clamp(0.0, 1.0);
        self.essay_response_lines = self
            .essay_response_lines
            .clamp(Self::MIN_RESPONSE_LINES, Self::MAX_RESPONSE_LINES);
    }

    /// Name for the question at `index` (0-based).
    pub fn name_for(&self, index: usize) -> String {
        if self.number_names {
            format!("{} {}", self.question_name, index + 1)
        } else {
            self.question_name.clone()
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Settings
// ─────────────────────────────────────────────────────────────────────────────

/// All converter settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Replace `<code>` spans with rendered images
    pub render_code: bool,
    /// Where rendered images live in the XML
    pub image_handling: ImageHandling,
    /// Code image appearance
    pub render: RenderSettings,
    /// Generated question fields
    pub output: OutputSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            render_code: true,
            image_handling: ImageHandling::default(),
            render: RenderSettings::default(),
            output: OutputSettings::default(),
        }
    }
}

impl Settings {
    /// Sanitize settings by clamping values to valid ranges.
    ///
    /// Configuration files are hand-edited, so anything out of range is
    /// pulled back to something usable instead of rejected.
    pub fn sanitize(&mut self) {
        self.render.sanitize();
        self.output.sanitize();
    }

    /// Load settings and sanitize them to ensure validity.
    pub fn from_json_sanitized(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert!(settings.render_code);
        assert_eq!(settings.image_handling, ImageHandling::EmbedBase64);
        assert_eq!(settings.render.theme, "base16-ocean.dark");
        assert_eq!(settings.output.question_name, "Quiz Question");
        assert_eq!(settings.output.essay_response_lines, 10);
    }

    #[test]
    fn test_image_handling_serialization() {
        let json = serde_json::to_string(&ImageHandling::PluginFile).unwrap();
        assert_eq!(json, "\"plugin_file\"");

        let parsed: ImageHandling = serde_json::from_str("\"embed_base64\"").unwrap();
        assert_eq!(parsed, ImageHandling::EmbedBase64);
    }

    #[test]
    fn test_multiple_choice_grading_serialization() {
        let parsed: MultipleChoiceGrading = serde_json::from_str("\"all_or_nothing\"").unwrap();
        assert_eq!(parsed, MultipleChoiceGrading::AllOrNothing);
        assert_eq!(parsed.question_type(), "multichoiceset");
        assert_eq!(MultipleChoiceGrading::default(), MultipleChoiceGrading::AllOrNothing);
        let opt_in: MultipleChoiceGrading = serde_json::from_str("\"penalize_wrong\"").unwrap();
        assert_eq!(opt_in.question_type(), "multichoice");
    }

    #[test]
    fn test_settings_serialization_roundtrip() {
        let mut settings = Settings::default();
        settings.render.theme = "InspiredGitHub".to_string();
        settings.output.number_names = true;

        let json = serde_json::to_string_pretty(&settings).unwrap();
        let parsed: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(settings, parsed);
    }

    #[test]
    fn test_settings_deserialize_with_defaults() {
        let json = r#"{"render_code": false, "render": {"font_scale": 3}}"#;
        let settings: Settings = serde_json::from_str(json).unwrap();

        assert!(!settings.render_code);
        assert_eq!(settings.render.font_scale, 3);
        assert_eq!(settings.render.tab_width, 4);
        assert_eq!(settings.output, OutputSettings::default());
    }

    #[test]
    fn test_settings_deserialize_empty_json() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_sanitize_render_settings() {
        let json = r##"{"render": {"font_scale": 0, "tab_width": 99, "padding": 500,
            "theme": "  ", "line_number_bg": "red", "line_number_fg": "#12345"}}"##;
        let settings = Settings::from_json_sanitized(json).unwrap();

        assert_eq!(settings.render.font_scale, RenderSettings::MIN_FONT_SCALE);
        assert_eq!(settings.render.tab_width, RenderSettings::MAX_TAB_WIDTH);
        assert_eq!(settings.render.padding, RenderSettings::MAX_PADDING);
        assert_eq!(settings.render.theme, "base16-ocean.dark");
        assert_eq!(settings.render.line_number_bg, "#272822");
        assert_eq!(settings.render.line_number_fg, "#8f908a");
    }

    #[test]
    fn test_sanitize_output_settings() {
        let json = r#"{"output": {"question_name": "", "default_grade": -2.0,
            "penalty": 3.5, "essay_response_lines": 100}}"#;
        let settings = Settings::from_json_sanitized(json).unwrap();

        assert_eq!(settings.output.question_name, "Quiz Question");
        assert_eq!(settings.output.default_grade, 1.0);
        assert_eq!(settings.output.penalty, 1.0);
        assert_eq!(
            settings.output.essay_response_lines,
            OutputSettings::MAX_RESPONSE_LINES
        );
    }

    #[test]
    fn test_from_json_sanitized_rejects_invalid_json() {
        assert!(Settings::from_json_sanitized("{not json").is_err());
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#272822"), Some([0x27, 0x28, 0x22]));
        assert_eq!(parse_hex_color(" #FFffFF "), Some([255, 255, 255]));
        assert_eq!(parse_hex_color("272822"), None);
        assert_eq!(parse_hex_color("#27282"), None);
        assert_eq!(parse_hex_color("#zz2822"), None);
    }

    #[test]
    fn test_name_for() {
        let mut output = OutputSettings::default();
        assert_eq!(output.name_for(4), "Quiz Question");

        output.number_names = true;
        assert_eq!(output.name_for(0), "Quiz Question 1");
        assert_eq!(output.name_for(4), "Quiz Question 5");
    }
}
