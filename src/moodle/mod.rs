//! Moodle XML generation
//!
//! Serializes parsed questions into a single `<quiz>` document that Moodle's
//! question bank import accepts.
//!
//! # Architecture
//!
//! - `scoring.rs` - answer fractions and the grade a submission receives
//! - `xml.rs` - CDATA wrapping and escaping

pub mod scoring;
pub mod xml;

use crate::bank::{Answer, Question, QuestionKind, RichText, Segment};
use crate::config::{ImageHandling, OutputSettings};
use crate::render::{CodeImage, CodeRenderer, RenderError};
use base64::{engine::general_purpose::STANDARD, Engine};
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
use scoring::{answer_fraction, format_fraction};
use xml::{cdata, expand_tabs, xml_escape};

/// XML declaration and root element opening.
const DOCUMENT_HEADER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<quiz>\n";

// ─────────────────────────────────────────────────────────────────────────────
// HTML Fragments
// ─────────────────────────────────────────────────────────────────────────────

/// A `<file>` element backing a `@@PLUGINFILE@@` image reference.
#[derive(Debug, Clone, PartialEq)]
struct EmbeddedFile {
    name: String,
    base64: String,
}

impl EmbeddedFile {
    fn to_xml(&self, indent: &str) -> String {
        format!(
            "{indent}<file name=\"{}\" path=\"/\" encoding=\"base64\">{}</file>\n",
            xml_escape(&self.name),
            self.base64,
        )
    }
}

/// HTML for one rich text field plus the files its images reference.
#[derive(Debug, Default)]
struct Fragment {
    html: String,
    files: Vec<EmbeddedFile>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Emitter
// ─────────────────────────────────────────────────────────────────────────────

/// Writes questions as a Moodle XML document.
pub struct XmlEmitter<'a> {
    output: &'a OutputSettings,
    image_handling: ImageHandling,
    /// `None` keeps code spans as HTML `<code>` text instead of images
    renderer: Option<&'a CodeRenderer>,
}

impl<'a> XmlEmitter<'a> {
    pub fn new(
        output: &'a OutputSettings,
        image_handling: ImageHandling,
        renderer: Option<&'a CodeRenderer>,
    ) -> Self {
        Self {
            output,
            image_handling,
            renderer,
        }
    }

    /// Build the complete document. Answers are shuffled with `rng`.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::Encode` if a code image cannot be encoded.
    pub fn emit<R: Rng + ?Sized>(
        &self,
        questions: &[Question],
        rng: &mut R,
    ) -> Result<String, RenderError> {
        let mut doc = String::from(DOCUMENT_HEADER);
        let mut image_count = 0;

        for (index, question) in questions.iter().enumerate() {
            let name = self.output.name_for(index);
            let text = self.render_rich_text(&question.text, &mut image_count)?;
            let question_html = format!(
                "<pre style=\"font-family: inherit;\">{}</pre>",
                expand_tabs(&text.html)
            );

            match &question.kind {
                QuestionKind::Essay => {
                    doc.push_str(&self.essay_xml(&name, &question_html, &text.files));
                }
                kind => {
                    let mut answers: Vec<&Answer> = question.answers.iter().collect();
                    answers.shuffle(rng);
                    let answers_xml = answers
                        .into_iter()
                        .map(|answer| self.answer_xml(kind, answer, &mut image_count))
                        .collect::<Result<String, _>>()?;
                    doc.push_str(&self.choice_xml(
                        kind,
                        &name,
                        &question_html,
                        &text.files,
                        &answers_xml,
                    ));
                }
            }
            doc.push_str("    </question>\n\n");
        }

        doc.push_str("</quiz>\n");
        debug!(
            "Emitted {} question(s) with {} code image(s)",
            questions.len(),
            image_count
        );
        Ok(doc)
    }

    fn essay_xml(&self, name: &str, question_html: &str, files: &[EmbeddedFile]) -> String {
        format!(
            r#"    <question type="essay">
        <name>
            <text>{name}</text>
        </name>
        <questiontext format="html">
            <text>{text}</text>
{files}        </questiontext>
        <generalfeedback format="html">
            <text></text>
        </generalfeedback>
        <defaultgrade>{grade}</defaultgrade>
        <penalty>{penalty}</penalty>
        <hidden>0</hidden>
        <idnumber></idnumber>
        <responseformat>editor</responseformat>
        <responserequired>1</responserequired>
        <responsefieldlines>{lines}</responsefieldlines>
        <minwordlimit></minwordlimit>
        <maxwordlimit></maxwordlimit>
        <attachments>0</attachments>
        <attachmentsrequired>0</attachmentsrequired>
        <graderinfo format="html">
            <text></text>
        </graderinfo>
        <responsetemplate format="html">
            <text></text>
        </responsetemplate>
"#,
            name = xml_escape(name),
            text = cdata(question_html),
            files = files_xml(files, "            "),
            grade = format_decimal(self.output.default_grade),
            penalty = format_decimal(self.output.penalty),
            lines = self.output.essay_response_lines,
        )
    }

    fn choice_xml(
        &self,
        kind: &QuestionKind,
        name: &str,
        question_html: &str,
        files: &[EmbeddedFile],
        answers_xml: &str,
    ) -> String {
        let question_type = match kind {
            QuestionKind::MultipleChoice { .. } => {
                self.output.multiple_choice_grading.question_type()
            }
            _ => "multichoice",
        };
        // multichoiceset has no <single>; it is always a checkbox question
        let single = if question_type == "multichoice" {
            format!(
                "        <single>{}</single>\n",
                matches!(kind, QuestionKind::SingleChoice { .. })
            )
        } else {
            String::new()
        };

        format!(
            r#"    <question type="{question_type}">
        <name>
            <text>{name}</text>
        </name>
        <questiontext format="html">
            <text>{text}</text>
{files}        </questiontext>
        <generalfeedback format="html">
            <text></text>
        </generalfeedback>
        <defaultgrade>{grade}</defaultgrade>
        <penalty>{penalty}</penalty>
        <hidden>0</hidden>
{single}        <shuffleanswers>1</shuffleanswers>
        <answernumbering>none</answernumbering>
{answers_xml}"#,
            name = xml_escape(name),
            text = cdata(question_html),
            files = files_xml(files, "            "),
            grade = format_decimal(self.output.default_grade),
            penalty = format_decimal(self.output.penalty),
        )
    }

    fn answer_xml(
        &self,
        kind: &QuestionKind,
        answer: &Answer,
        image_count: &mut usize,
    ) -> Result<String, RenderError> {
        let fraction = answer_fraction(kind, answer.label, self.output.multiple_choice_grading);
        let text = self.render_rich_text(&answer.text, image_count)?;

        Ok(format!(
            r#"        <answer fraction="{fraction}" format="html">
            <text>{text}</text>
{files}            <feedback format="html">
                <text></text>
            </feedback>
        </answer>
"#,
            fraction = format_fraction(fraction),
            text = cdata(&text.html),
            files = files_xml(&text.files, "            "),
        ))
    }

    /// Turn rich text into HTML, rendering code spans as images.
    fn render_rich_text(
        &self,
        text: &RichText,
        image_count: &mut usize,
    ) -> Result<Fragment, RenderError> {
        let mut fragment = Fragment::default();

        for segment in text.segments() {
            match (segment, self.renderer) {
                (Segment::Text(t), _) => fragment.html.push_str(t),
                (Segment::Code(span), Some(renderer)) => {
                    let image = renderer.render(&span.code, &span.language)?;
                    *image_count += 1;
                    self.embed_image(&image, *image_count, &mut fragment);
                }
                (Segment::Code(span), None) => {
                    fragment.html.push_str(&format!(
                        "<code class=\"language-{}\">{}</code>",
                        xml_escape(&span.language),
                        xml_escape(&span.code)
                    ));
                }
            }
        }

        Ok(fragment)
    }

    fn embed_image(&self, image: &CodeImage, number: usize, fragment: &mut Fragment) {
        debug!(
            "Embedding code image {} ({}x{}, {})",
            number,
            image.width,
            image.height,
            if image.highlighted { "highlighted" } else { "plain" }
        );
        let encoded = STANDARD.encode(&image.png);
        let alt = format!("{} code snippet", xml_escape(&image.language));

        match self.image_handling {
            ImageHandling::EmbedBase64 => {
                fragment.html.push_str(&format!(
                    "<img src=\"data:image/png;base64,{}\" alt=\"{}\" width=\"{}\" height=\"{}\" />",
                    encoded, alt, image.width, image.height
                ));
            }
            ImageHandling::PluginFile => {
                let name = format!("code_{}.png", number);
                fragment.html.push_str(&format!(
                    "<img src=\"@@PLUGINFILE@@/{}\" alt=\"{}\" width=\"{}\" height=\"{}\" />",
                    name, alt, image.width, image.height
                ));
                fragment.files.push(EmbeddedFile {
                    name,
                    base64: encoded,
                });
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn files_xml(files: &[EmbeddedFile], indent: &str) -> String {
    files.iter().map(|f| f.to_xml(indent)).collect()
}

/// Moodle writes grades and penalties with seven decimals.
fn format_decimal(value: f64) -> String {
    format!("{:.7}", value)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
