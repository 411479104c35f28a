//! Question bank conversion pipeline
//!
//! Reads a question bank, parses every block, renders code spans and writes
//! the Moodle XML document. The output file is only written once the whole
//! bank has converted successfully.

use crate::bank::{parse_bank, Question, QuestionKind};
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::moodle::XmlEmitter;
use crate::render::CodeRenderer;
use log::{debug, info};
use rand::Rng;
use std::fs;
use std::path::Path;

/// Counts reported after a conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionSummary {
    pub single_choice: usize,
    pub multiple_choice: usize,
    pub essay: usize,
    pub code_spans: usize,
}

impl ConversionSummary {
    fn from_questions(questions: &[Question]) -> Self {
        let mut summary = Self::default();
        for question in questions {
            match question.kind {
                QuestionKind::Essay => summary.essay += 1,
                QuestionKind::SingleChoice { .. } => summary.single_choice += 1,
                QuestionKind::MultipleChoice { .. } => summary.multiple_choice += 1,
            }
            summary.code_spans += question.text.code_spans().count()
                + question
                    .answers
                    .iter()
                    .map(|a| a.text.code_spans().count())
                    .sum::<usize>();
        }
        summary
    }

    /// Total number of questions.
    pub fn questions(&self) -> usize {
        self.single_choice + self.multiple_choice + self.essay
    }
}

/// Result of converting one question bank.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub xml: String,
    pub summary: ConversionSummary,
}

/// Converts question banks with a fixed set of settings.
pub struct Converter {
    settings: Settings,
}

impl Converter {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Convert question bank text to a Moodle XML document.
    ///
    /// # Errors
    ///
    /// - `Error::Parse` for the first malformed block
    /// - `Error::Render` if a code image cannot be encoded
    pub fn convert_str<R: Rng + ?Sized>(&self, text: &str, rng: &mut R) -> Result<Conversion> {
        let questions = parse_bank(text)?;
        let summary = ConversionSummary::from_questions(&questions);

        // syntect's sets are only loaded when there is code to draw
        let renderer = (self.settings.render_code && summary.code_spans > 0)
            .then(|| CodeRenderer::new(self.settings.render.clone()));
        if renderer.is_none() && summary.code_spans > 0 {
            debug!("Code rendering disabled; keeping code spans as text");
        }

        let emitter = XmlEmitter::new(
            &self.settings.output,
            self.settings.image_handling,
            renderer.as_ref(),
        );
        let xml = emitter.emit(&questions, rng)?;

        Ok(Conversion { xml, summary })
    }

    /// Convert the bank at `input` and write the document to `output`.
    ///
    /// # Errors
    ///
    /// - `Error::FileRead` if the input cannot be read
    /// - `Error::FileWrite` if the output cannot be written
    /// - any error of [`Converter::convert_str`]; nothing is written then
    pub fn convert_file<R: Rng + ?Sized>(
        &self,
        input: &Path,
        output: &Path,
        rng: &mut R,
    ) -> Result<ConversionSummary> {
        debug!("Reading question bank from {}", input.display());
        let text = fs::read_to_string(input).map_err(|e| Error::FileRead {
            path: input.to_path_buf(),
            source: e,
        })?;

        let conversion = self.convert_str(&text, rng)?;

        fs::write(output, &conversion.xml).map_err(|e| Error::FileWrite {
            path: output.to_path_buf(),
            source: e,
        })?;

        let summary = conversion.summary;
        info!(
            "Wrote {} question(s) to {} ({} single choice, {} multiple choice, {} essay, {} code image(s))",
            summary.questions(),
            output.display(),
            summary.single_choice,
            summary.multiple_choice,
            summary.essay,
            if self.settings.render_code { summary.code_spans } else { 0 },
        );
        Ok(summary)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
