use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use reviewrate_core::{AnnotationSession, DataPaths, Dataset, Scores, SessionStatus, parse_review};
use reviewrate_store::EvaluationStore;

mod display;

#[derive(Parser)]
#[command(
    name = "reviewrate",
    version,
    about = "Inspect and rate peer-review annotation queues"
)]
struct Cli {
    /// Directory holding user.csv, the mapping files and evaluation_results.csv
    #[arg(long, env = "REVIEWRATE_DATA_DIR", default_value = "data", global = true)]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a review text file and print its sections
    Parse { file: PathBuf },
    /// List users with their annotator id and progress
    Users,
    /// Show how many assigned reviews a user has rated
    Progress { user: String },
    /// Show the next review waiting for a user's scores
    Next { user: String },
    /// Rate the user's current review and advance
    Submit(SubmitArgs),
}

#[derive(Args)]
struct SubmitArgs {
    user: String,
    #[arg(long)]
    confidence: f64,
    #[arg(long)]
    thoroughness: f64,
    #[arg(long)]
    constructiveness: f64,
    #[arg(long)]
    helpfulness: f64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    tracing::info!("reviewrate v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let paths = DataPaths::new(cli.data_dir);

    match cli.command {
        Command::Parse { file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            display::print_review(&parse_review(Some(text.as_str())));
        }
        Command::Users => {
            let dataset = load_dataset(&paths)?;
            let store = EvaluationStore::open(paths.results());
            for entry in dataset.users.users() {
                let total = dataset.assignments.queue_for(&entry.annotator_id).len();
                let done = store.count_for_user(&entry.name).min(total);
                println!(
                    "  {:<24} annotator {:<6} {done}/{total}",
                    entry.name, entry.annotator_id
                );
            }
        }
        Command::Progress { user } => {
            let dataset = load_dataset(&paths)?;
            let store = EvaluationStore::open(paths.results());
            let session = AnnotationSession::resume(&dataset, &store, &user)?;
            display::print_status(&session);
        }
        Command::Next { user } => {
            let dataset = load_dataset(&paths)?;
            let store = EvaluationStore::open(paths.results());
            let session = AnnotationSession::resume(&dataset, &store, &user)?;
            match session.current() {
                Some(current) => display::print_current(&current),
                None => display::print_status(&session),
            }
        }
        Command::Submit(args) => {
            let dataset = load_dataset(&paths)?;
            let store = EvaluationStore::open(paths.results());
            let mut session = AnnotationSession::resume(&dataset, &store, &args.user)?;
            let scores = Scores::new(
                args.confidence,
                args.thoroughness,
                args.constructiveness,
                args.helpfulness,
            );
            let record = session
                .submit(&store, scores)
                .with_context(|| format!("submitting rating for {}", args.user))?;
            println!(
                "Rating submitted: {} / {}",
                record.paper_id, record.review_type
            );
            if let SessionStatus::Complete { .. } = session.status() {
                display::print_status(&session);
            }
        }
    }

    Ok(())
}

fn load_dataset(paths: &DataPaths) -> anyhow::Result<Dataset> {
    Dataset::load(paths)
        .with_context(|| format!("loading data from {}", paths.data_dir().display()))
}
