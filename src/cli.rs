//! Command-line front end for splan.
//!
//! Each subcommand drives one flow of a [`Session`]: pasted text goes through
//! the chat submit path, an input file is ingested first and then run through
//! the tool generate path. All study-material logic lives in `splan-core`;
//! this module parses arguments, wires config into the session and prints or
//! writes the result.

use crate::load_config::{resolve_config, CliConfig};
use crate::progress::ProgressDisplay;
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use splan_core::document::{Quiz, StudyDocument};
use splan_core::export::{self, ExportFormat};
use splan_core::ingest::{FileIngestor, FileSource, IngestFile};
use splan_core::session::{Session, APOLOGY};
use splan_core::settings::{Difficulty, QuizType, SettingsPatch, SummaryLength, ToolType};
use splan_core::topic::Topic;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Study material generator: summaries, flashcards and quizzes from your notes.
#[derive(Parser, Debug)]
#[clap(
    name = "splan",
    version,
    about = "Turn study text into summaries, flashcards and quizzes"
)]
pub struct Cli {
    /// Path to an optional YAML config file
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Summarize the input into key points
    Summarize(GenerateArgs),
    /// Build fill-in-the-blank flashcards grouped by topic
    Flashcards {
        #[clap(flatten)]
        args: GenerateArgs,
        /// Only print cards of this topic (Definitions, Concepts or Examples)
        #[clap(long)]
        topic: Option<Topic>,
    },
    /// Build a quiz from the input
    Quiz(GenerateArgs),
    /// Extract and print the text of a file
    Ingest {
        #[clap(long)]
        input: PathBuf,
    },
    /// Write summary, flashcards and quiz into one PDF
    ExportAll {
        #[clap(flatten)]
        source: SourceArgs,
        #[clap(flatten)]
        settings: SettingsArgs,
        #[clap(long)]
        seed: Option<u64>,
        /// Target file or directory; defaults to the configured output directory
        #[clap(long)]
        output: Option<PathBuf>,
    },
    /// Grade answers against an exported quiz
    Check {
        /// Quiz markdown file
        #[clap(long)]
        input: PathBuf,
        /// Answers in question order; option letters are accepted
        #[clap(long, value_delimiter = ',', num_args = 1..)]
        answers: Vec<String>,
    },
}

/// Where the study text comes from.
#[derive(Args, Debug, Clone, Default)]
#[group(required = true, multiple = false)]
pub struct SourceArgs {
    /// Study text given directly
    #[clap(long)]
    pub text: Option<String>,
    /// File to ingest (text, PDF or image)
    #[clap(long)]
    pub input: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct SettingsArgs {
    #[clap(long)]
    pub summary_length: Option<SummaryLength>,
    #[clap(long)]
    pub quiz_type: Option<QuizType>,
    #[clap(long)]
    pub difficulty: Option<Difficulty>,
    /// 1 to 20
    #[clap(long)]
    pub num_questions: Option<u32>,
    /// 1 to 50
    #[clap(long)]
    pub num_flashcards: Option<u32>,
}

impl From<&SettingsArgs> for SettingsPatch {
    fn from(args: &SettingsArgs) -> Self {
        SettingsPatch {
            summary_length: args.summary_length,
            quiz_type: args.quiz_type,
            difficulty: args.difficulty,
            num_questions: args.num_questions,
            num_flashcards: args.num_flashcards,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    #[clap(flatten)]
    pub source: SourceArgs,
    #[clap(flatten)]
    pub settings: SettingsArgs,
    /// Seed for reproducible keyword picks
    #[clap(long)]
    pub seed: Option<u64>,
    #[clap(long, value_enum, default_value_t = OutputFormat::Markdown)]
    pub format: OutputFormat,
    /// File or directory to write to; markdown goes to stdout when omitted
    #[clap(long)]
    pub output: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Markdown,
    Pdf,
}

impl From<OutputFormat> for ExportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Markdown => ExportFormat::Markdown,
            OutputFormat::Pdf => ExportFormat::Pdf,
        }
    }
}

/// Async entry point shared by `main` and the integration tests.
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    let config = resolve_config(cli.config.as_deref())?;

    let result = match cli.command {
        Commands::Summarize(args) => run_tool(&config, ToolType::Summarize, args, None).await,
        Commands::Flashcards { args, topic } => {
            run_tool(&config, ToolType::Flashcards, args, topic).await
        }
        Commands::Quiz(args) => run_tool(&config, ToolType::Quiz, args, None).await,
        Commands::Ingest { input } => run_ingest(&config, &input).await,
        Commands::ExportAll {
            source,
            settings,
            seed,
            output,
        } => run_export_all(&config, source, settings, seed, output).await,
        Commands::Check { input, answers } => run_check(&input, &answers),
    };

    if let Err(e) = &result {
        error!(error = %e, "Command failed");
    }
    result
}

fn new_session(config: &CliConfig, seed: Option<u64>, settings: &SettingsArgs) -> Session {
    let ingestor = FileIngestor::new(&config.ingest);
    let mut session = match seed {
        Some(seed) => Session::with_seed(config.settings.clone(), ingestor, seed),
        None => Session::new(config.settings.clone(), ingestor),
    };
    session.update_settings(SettingsPatch::from(settings));
    session
}

/// Ingests `path` through the session with a progress display on stderr.
async fn ingest_into(session: &mut Session, path: &Path) -> Result<String> {
    let file = file_from_path(path).await?;
    let display = ProgressDisplay::start(format!("Reading {}", file.name));
    let result = session.ingest(&file, Some(display.callback())).await;
    display.finish();
    result.with_context(|| format!("Could not read {}", path.display()))
}

async fn load_source(session: &mut Session, source: &SourceArgs) -> Result<()> {
    match (&source.text, &source.input) {
        (Some(text), _) => {
            session.set_input_text(text.clone());
            Ok(())
        }
        (None, Some(path)) => ingest_into(session, path).await.map(|_| ()),
        (None, None) => anyhow::bail!("Provide --text or --input"),
    }
}

async fn run_tool(
    config: &CliConfig,
    tool: ToolType,
    args: GenerateArgs,
    topic: Option<Topic>,
) -> Result<()> {
    let mut session = new_session(config, args.seed, &args.settings);
    session.select_tool(tool);
    info!(tool = %tool, "Running tool");

    // Typed text takes the chat path; files take the generate path.
    match (&args.source.text, &args.source.input) {
        (Some(text), _) => session.submit(text).await?,
        _ => {
            load_source(&mut session, &args.source).await?;
            session.generate().await?
        }
    };

    let document = match session.store().last_assistant_message().and_then(|m| m.document()) {
        Some(document) => document.clone(),
        None => {
            println!("{APOLOGY}");
            anyhow::bail!("{tool} generation failed");
        }
    };
    let document = match (document, topic) {
        (StudyDocument::Flashcards(deck), Some(topic)) => {
            StudyDocument::Flashcards(deck.filter_topic(Some(topic)))
        }
        (document, _) => document,
    };

    let format = ExportFormat::from(args.format);
    match (format, args.output) {
        (ExportFormat::Markdown, None) => {
            println!("{}", document.to_markdown());
        }
        (format, output) => {
            let target = output.unwrap_or_else(|| config.export.output_dir.clone());
            let path = export::write_document(&document, format, &target)
                .await
                .with_context(|| format!("Could not export to {}", target.display()))?;
            println!("Wrote {}", path.display());
        }
    }
    Ok(())
}

async fn run_ingest(config: &CliConfig, input: &Path) -> Result<()> {
    let mut session = new_session(config, None, &SettingsArgs::default());
    let text = ingest_into(&mut session, input).await?;
    println!("{text}");
    Ok(())
}

async fn run_export_all(
    config: &CliConfig,
    source: SourceArgs,
    settings: SettingsArgs,
    seed: Option<u64>,
    output: Option<PathBuf>,
) -> Result<()> {
    let mut session = new_session(config, seed, &settings);
    load_source(&mut session, &source).await?;
    let materials = session.generate_all().await?;

    let target = output.unwrap_or_else(|| config.export.output_dir.clone());
    let path = export::write_combined(&materials, &target)
        .await
        .with_context(|| format!("Could not export to {}", target.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn run_check(input: &Path, answers: &[String]) -> Result<()> {
    let markdown = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read quiz {}", input.display()))?;
    let quiz = Quiz::from_markdown(&markdown)
        .with_context(|| format!("{} is not a quiz export", input.display()))?;
    info!(questions = quiz.questions.len(), answers = answers.len(), "Grading quiz");

    let mut correct = 0;
    for (i, question) in quiz.questions.iter().enumerate() {
        let verdict = match answers.get(i) {
            Some(given) if question.is_correct(given) => {
                correct += 1;
                "correct".to_string()
            }
            Some(_) => format!("incorrect (answer: {})", question.answer),
            None => format!("unanswered (answer: {})", question.answer),
        };
        println!("Question {}: {verdict}", i + 1);
    }
    println!("Score: {correct}/{}", quiz.questions.len());
    Ok(())
}

async fn file_from_path(path: &Path) -> Result<IngestFile> {
    let metadata = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let media_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string();
    Ok(IngestFile {
        name,
        media_type,
        size: metadata.len(),
        source: FileSource::Path(path.to_path_buf()),
    })
}
