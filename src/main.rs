//! Aidos - Interactive Privacy-Preference Elicitation
//!
//! Thin console front-end: selects the learning mode and round budget,
//! wires the corpus, generator, host and recorder together, and runs the
//! elicitation loop.

use aidos_core::{
    AnthropicGenerator, ConsoleHost, DirectStrategy, ElicitationLoop, JsonFileRecorder,
    JsonScenarioSource, JustifiedStrategy, LearningMode, LearningStrategy, ScenarioSequencer,
    ScenarioSource, TextGenerator,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Default log directory using the XDG data-dir standard
fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("aidos")
        .join("logs")
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    /// Learn directly from the diff between generated and edited text
    Direct,
    /// Additionally ask for justifications of the most significant changes
    Justified,
}

impl From<ModeArg> for LearningMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Direct => LearningMode::Direct,
            ModeArg::Justified => LearningMode::Justified,
        }
    }
}

#[derive(Parser)]
#[command(name = "aidos", version, about = "Interactive privacy-preference elicitation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an elicitation session over a scenario corpus
    Run {
        /// Path to the scenario corpus (JSON)
        #[arg(short, long)]
        scenarios: PathBuf,

        /// Number of rounds to run
        #[arg(short, long, default_value = "6")]
        rounds: usize,

        /// Learning mode
        #[arg(short, long, value_enum, default_value = "direct")]
        mode: ModeArg,

        /// Directory for session logs
        #[arg(long)]
        log_dir: Option<PathBuf>,
    },

    /// List the scenarios in a corpus
    Scenarios {
        /// Path to the scenario corpus (JSON)
        #[arg(short, long)]
        file: PathBuf,
    },
}

async fn run_session(
    scenarios: PathBuf,
    rounds: usize,
    mode: LearningMode,
    log_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let source = Arc::new(JsonScenarioSource::load(&scenarios)?);
    let available = source.count() as usize;
    if rounds > available {
        anyhow::bail!(
            "corpus holds {} scenario(s), cannot run {} round(s)",
            available,
            rounds
        );
    }

    let generator: Arc<dyn TextGenerator> = Arc::new(AnthropicGenerator::with_default()?);
    let strategy: Box<dyn LearningStrategy> = match mode {
        LearningMode::Direct => Box::new(DirectStrategy::new(generator.clone())),
        LearningMode::Justified => Box::new(JustifiedStrategy::new(generator.clone())),
    };

    let log_dir = log_dir.unwrap_or_else(default_log_dir);
    info!("Using {} mode, logging to {}", mode, log_dir.display());

    println!("\nStarting privacy preference elicitation ({} mode)", mode);
    println!("We will go through {} rounds of interaction.", rounds);

    let session = ElicitationLoop::new(
        ScenarioSequencer::new(source),
        generator,
        strategy,
        Arc::new(ConsoleHost::new()),
        Box::new(JsonFileRecorder::new(mode, log_dir)),
        rounds,
    );

    let summary = session.run().await?;

    if summary.aborted {
        println!("\nSession ended by user.");
    }
    println!(
        "\nCompleted {} round(s); learned {} preference rule(s).",
        summary.rounds_completed,
        summary.store.active_rules().len()
    );
    println!("Session log saved to: {}", summary.log_path.display());

    Ok(())
}

fn list_scenarios(file: PathBuf) -> anyhow::Result<()> {
    let source = JsonScenarioSource::load(&file)?;

    println!("{} scenario(s) in {}", source.count(), file.display());
    for record in source.scenarios() {
        println!(
            "  {}. {} [{}]",
            record.id,
            record.instruction,
            record.toolkits.join(", ")
        );
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("aidos=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            scenarios,
            rounds,
            mode,
            log_dir,
        } => run_session(scenarios, rounds, mode.into(), log_dir).await,
        Commands::Scenarios { file } => list_scenarios(file),
    }
}
