//! quiz2moodle - Main Entry Point
//!
//! Converts a plain-text question bank into a Moodle XML question bank,
//! rendering inline `<code>` blocks as syntax-highlighted images.

mod bank;
mod config;
mod convert;
mod error;
mod moodle;
mod render;

use clap::{Parser, ValueEnum};
use config::{load_config, ImageHandling, MultipleChoiceGrading, APP_NAME};
use convert::Converter;
use log::{error, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::process::ExitCode;

/// Output file used when `--output` is not given.
const DEFAULT_OUTPUT: &str = "moodle_quiz.xml";

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ImagesArg {
    /// Inline data: URIs
    Embed,
    /// @@PLUGINFILE@@ references with <file> elements
    PluginFile,
}

impl From<ImagesArg> for ImageHandling {
    fn from(arg: ImagesArg) -> Self {
        match arg {
            ImagesArg::Embed => ImageHandling::EmbedBase64,
            ImagesArg::PluginFile => ImageHandling::PluginFile,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum GradingArg {
    /// multichoiceset (All-or-Nothing plugin), no partial credit
    AllOrNothing,
    /// Core multichoice with -100% for wrong options; incomplete selections earn partial credit
    PenalizeWrong,
}

impl From<GradingArg> for MultipleChoiceGrading {
    fn from(arg: GradingArg) -> Self {
        match arg {
            GradingArg::PenalizeWrong => MultipleChoiceGrading::PenalizeWrong,
            GradingArg::AllOrNothing => MultipleChoiceGrading::AllOrNothing,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = APP_NAME, version, about, long_about = None)]
struct Args {
    /// Question bank text file
    input: PathBuf,

    /// Where to write the Moodle XML
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// JSON settings file (defaults to the platform config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// syntect theme for code images
    #[arg(long)]
    theme: Option<String>,

    /// Keep <code> blocks as text instead of rendering images
    #[arg(long)]
    no_code_images: bool,

    /// How code images are stored in the XML
    #[arg(long, value_enum)]
    images: Option<ImagesArg>,

    /// Grading scheme for questions with several correct answers
    #[arg(long, value_enum)]
    grading: Option<GradingArg>,

    /// Seed for answer shuffling (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> error::Result<()> {
    info!("Starting {}", APP_NAME);

    let mut settings = load_config(args.config.as_deref())?;
    if let Some(theme) = args.theme {
        settings.render.theme = theme;
    }
    if args.no_code_images {
        settings.render_code = false;
    }
    if let Some(images) = args.images {
        settings.image_handling = images.into();
    }
    if let Some(grading) = args.grading {
        settings.output.multiple_choice_grading = grading.into();
    }
    settings.sanitize();

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    Converter::new(settings).convert_file(&args.input, &args.output, &mut rng)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
        assert_eq!(Args::command().get_name(), APP_NAME);
    }

    #[test]
    fn test_cli_defaults() {
        let args = Args::try_parse_from(["quiz2moodle", "bank.txt"]).unwrap();
        assert_eq!(args.input, PathBuf::from("bank.txt"));
        assert_eq!(args.output, PathBuf::from(DEFAULT_OUTPUT));
        assert!(args.config.is_none());
        assert!(!args.no_code_images);
    }

    #[test]
    fn test_cli_options() {
        let args = Args::try_parse_from([
            "quiz2moodle",
            "bank.txt",
            "-o",
            "out.xml",
            "--images",
            "plugin-file",
            "--grading",
            "penalize-wrong",
            "--seed",
            "3",
            "--no-code-images",
        ])
        .unwrap();

        assert_eq!(args.output, PathBuf::from("out.xml"));
        assert!(matches!(args.images, Some(ImagesArg::PluginFile)));
        assert_eq!(
            MultipleChoiceGrading::from(args.grading.unwrap()),
            MultipleChoiceGrading::PenalizeWrong
        );
        assert_eq!(args.seed, Some(3));
        assert!(args.no_code_images);
    }

    #[test]
    fn test_cli_requires_input() {
        assert!(Args::try_parse_from(["quiz2moodle"]).is_err());
    }
}
