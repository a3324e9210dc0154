//! CLI entry point for the data preparation wizard.

use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};
use dotenv::dotenv;
use prep_wizard::{
    ChoiceProvider, ConsoleChoices, LoadFormat, ScriptedChoices, Stage, StageGate, WizardConfig,
    run_session,
};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// CLI-compatible load format enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliFormat {
    /// Comma-separated text (.csv)
    Csv,
    /// Spreadsheet (.xlsx, .xls)
    Excel,
    /// SQLite database (.db, .sqlite)
    Sqlite,
}

impl From<CliFormat> for LoadFormat {
    fn from(cli: CliFormat) -> Self {
        match cli {
            CliFormat::Csv => LoadFormat::Csv,
            CliFormat::Excel => LoadFormat::Excel,
            CliFormat::Sqlite => LoadFormat::Sqlite,
        }
    }
}

/// Step-gated interactive data preparation wizard
#[derive(Parser, Debug)]
#[command(
    name = "prep-wizard",
    version,
    about = "Step-gated interactive data preparation wizard",
    long_about = "Walks through loading a dataset, selecting feature and target columns,\n\
                  resolving missing values, encoding categorical columns, scaling,\n\
                  handling outliers, visualizing and exporting the result.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  RUST_LOG              Log filter (overrides --log-level)\n\n\
                  EXAMPLES:\n  \
                  # Interactive session\n  \
                  prep-wizard\n\n  \
                  # Start with a dataset already loaded\n  \
                  prep-wizard --input data.csv --format csv\n\n  \
                  # Replay answers from a file\n  \
                  prep-wizard --input data.csv --script answers.txt --output-dir out/"
)]
struct Args {
    /// Dataset to load before the menu starts
    #[arg(short, long, requires = "format")]
    input: Option<PathBuf>,

    /// Format of the --input dataset
    #[arg(short, long, value_enum)]
    format: Option<CliFormat>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory exports are written to (overrides the config file)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Read operator answers from a file, one per line, instead of stdin
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr so they do not interleave with the menus on stdout.
fn init_logging(level: &str, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "error" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn build_config(args: &Args) -> Result<WizardConfig> {
    let mut config = match &args.config {
        Some(path) => WizardConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => WizardConfig::default(),
    };
    if let Some(dir) = &args.output_dir {
        config.output_dir = Some(dir.clone());
    }
    config.validate()?;
    debug!(?config, "Configuration ready");
    Ok(config)
}

fn run(args: &Args, config: WizardConfig, choices: &mut dyn ChoiceProvider) -> Result<Stage> {
    let mut gate = StageGate::new(config);

    if let Some(input) = &args.input {
        let format = args
            .format
            .ok_or_else(|| anyhow!("--format is required with --input"))?;
        // A failed preload leaves the gate at NotLoaded; the menu still offers loading.
        match gate.load_from(input, format.into(), choices) {
            Ok(report) => {
                if let Some(message) = report.message() {
                    choices.notify(&message);
                }
            }
            Err(e) => {
                warn!(code = e.error_code(), input = %input.display(), "Preload failed: {}", e);
                choices.notify(&e.to_string());
            }
        }
    }

    let stage = run_session(&mut gate, choices)?;
    info!(%stage, "Wizard finished");
    Ok(stage)
}

fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let args = Args::parse();
    init_logging(&args.log_level, args.quiet);

    let config = build_config(&args)?;

    match &args.script {
        Some(path) => {
            let mut choices = ScriptedChoices::from_file(path)
                .with_context(|| format!("Failed to read script {}", path.display()))?
                .with_echo(true);
            run(&args, config, &mut choices)?;
        }
        None => {
            run(&args, config, &mut ConsoleChoices::new())?;
        }
    }
    Ok(())
}
