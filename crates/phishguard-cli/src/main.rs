mod display;
mod review;

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use phishguard_ai::{Predictor, TrainingEngine};
use phishguard_core::{
    FeedbackRecord, Label, ReferenceLocation, Settings, TrainingConfig, Verdict,
};
use phishguard_curation::{CurationGate, ReviewOutcome};
use phishguard_store::FeedbackStore;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::review::TerminalReviewer;

#[derive(Parser)]
#[command(name = "phishguard", version, about = "Spam/ham SMS classifier with curated feedback")]
struct Cli {
    /// Directory holding the feedback and verified corpus files
    #[arg(long, global = true, env = "PHISHGUARD_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Directory holding the model artifacts (defaults to the data directory)
    #[arg(long, global = true, env = "PHISHGUARD_MODEL_DIR")]
    model_dir: Option<PathBuf>,

    /// Reference dataset URL or local path
    #[arg(long, global = true, env = "PHISHGUARD_REFERENCE")]
    reference: Option<ReferenceLocation>,

    /// Seed for the train/holdout shuffle
    #[arg(long, global = true, default_value_t = 42)]
    seed: u64,

    /// Fraction of the corpus held out for evaluation
    #[arg(long, global = true, default_value_t = 0.2)]
    test_fraction: f64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify a message with the latest model
    Predict {
        message: String,
        /// Record whether the prediction was right; corrections go to the review queue
        #[arg(long, value_enum)]
        verdict: Option<VerdictArg>,
    },
    /// Queue a labelled message for admin review
    Submit {
        #[arg(long)]
        label: Label,
        message: String,
    },
    /// Review queued feedback and promote approved records
    Review,
    /// Retrain on the reference dataset plus the verified corpus
    Train {
        /// Print the evaluation report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum VerdictArg {
    Correct,
    Incorrect,
}

impl From<VerdictArg> for Verdict {
    fn from(arg: VerdictArg) -> Self {
        match arg {
            VerdictArg::Correct => Verdict::Correct,
            VerdictArg::Incorrect => Verdict::Incorrect,
        }
    }
}

impl Cli {
    fn settings(&self) -> Settings {
        let mut settings = Settings::new(&self.data_dir).with_training(TrainingConfig {
            seed: self.seed,
            test_fraction: self.test_fraction,
            ..TrainingConfig::default()
        });
        if let Some(dir) = &self.model_dir {
            settings = settings.with_model_dir(dir);
        }
        if let Some(reference) = &self.reference {
            settings = settings.with_reference(reference.clone());
        }
        settings
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = cli.settings();
    info!("phishguard v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Predict { message, verdict } => predict(&settings, &message, verdict),
        Command::Submit { label, message } => submit(&settings, FeedbackRecord::new(label, message)),
        Command::Review => review(settings).await,
        Command::Train { json } => train(settings, json).await,
    }
}

fn predict(settings: &Settings, message: &str, verdict: Option<VerdictArg>) -> anyhow::Result<()> {
    let Some(predictor) = Predictor::load(settings.model_dir()) else {
        bail!(
            "no model available in {}; run `phishguard train` first",
            settings.model_dir().display()
        );
    };
    let prediction = predictor.predict(message);
    display::print_prediction(&prediction);

    if let Some(verdict) = verdict {
        submit(settings, prediction.feedback(verdict.into()))?;
    }
    Ok(())
}

fn submit(settings: &Settings, record: FeedbackRecord) -> anyhow::Result<()> {
    if record.is_blank() {
        bail!("message must not be empty");
    }
    FeedbackStore::new(settings.feedback_path())
        .submit(&record)
        .context("recording feedback")?;
    println!("Feedback queued for review: {},{}", record.label, record.message);
    Ok(())
}

async fn review(settings: Settings) -> anyhow::Result<()> {
    let (tx, rx) = mpsc::unbounded_channel();
    let gate = CurationGate::from_settings(&settings).with_retrain_channel(tx);

    // The session blocks on stdin; the gate and its sender drop when it ends.
    let outcome = tokio::task::spawn_blocking(move || {
        let stdin = std::io::stdin();
        let mut reviewer = TerminalReviewer::new(stdin.lock(), std::io::stdout());
        gate.review(&mut reviewer)
    })
    .await
    .context("review session aborted")?
    .context("reviewing feedback")?;

    match outcome {
        ReviewOutcome::NothingToReview(reason) => {
            println!("{reason}");
            return Ok(());
        }
        ReviewOutcome::Reviewed(summary) => {
            println!(
                "\nReviewed {}: {} approved, {} rejected, {} skipped. Feedback queue cleared.",
                summary.reviewed(),
                summary.approved,
                summary.rejected,
                summary.skipped
            );
        }
    }

    let mut first_error: Option<anyhow::Error> = None;
    TrainingEngine::new(settings)
        .run_requests(rx, |result| {
            let shown = result
                .map_err(anyhow::Error::from)
                .and_then(|run| display::print_training_run(&run));
            if let Err(e) = shown {
                first_error.get_or_insert(e);
            }
        })
        .await;
    match first_error {
        Some(e) => Err(e.context("retraining after review")),
        None => Ok(()),
    }
}

async fn train(settings: Settings, json: bool) -> anyhow::Result<()> {
    let run = TrainingEngine::new(settings)
        .run()
        .await
        .context("training run failed")?;
    if json {
        display::print_training_json(&run)
    } else {
        display::print_training_run(&run)
    }
}
