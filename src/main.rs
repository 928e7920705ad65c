use anyhow::Result;
use clap::{Parser, Subcommand};
use samarth::datasets::DatasetCatalog;
use samarth::{Planner, PlannerConfig};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "samarth")]
#[command(about = "Answer questions about Indian crop production and rainfall")]
struct Args {
    /// Directory with the cleaned parquet tables (or set SAMARTH_CLEAN_DIR)
    #[arg(short, long, global = true)]
    clean_dir: Option<PathBuf>,

    /// Dataset manifest JSON (or set SAMARTH_MANIFEST)
    #[arg(short, long, global = true)]
    manifest: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Answer a question and print the payload as JSON
    Ask {
        question: String,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },
    /// Show which template a question matches and the parsed intent
    Parse { question: String },
    /// Row counts and year spans of the dataset views
    Datasets,
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", out);
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = PlannerConfig::from_env().with_overrides(args.clean_dir, args.manifest);
    info!("Clean data: {}", config.clean_dir.display());

    match args.command {
        Command::Ask { question, pretty } => {
            let planner = Planner::new(config);
            let payload = planner.answer_or_degrade(&question);
            print_json(&payload, pretty)?;
        }
        Command::Parse { question } => {
            let template = samarth::intent::matching_template(&question);
            println!("template: {}", template.unwrap_or("none"));
            print_json(&samarth::parse_question(&question), true)?;
        }
        Command::Datasets => {
            let catalog = DatasetCatalog::open(&config.clean_dir)?;
            let caps = catalog.capabilities();
            for view in catalog.summary()? {
                println!(
                    "{:<24} rows={:<8} years={}-{}  ({})",
                    view.view,
                    view.rows,
                    view.min_year.map(|y| y.to_string()).unwrap_or_else(|| "?".to_string()),
                    view.max_year.map(|y| y.to_string()).unwrap_or_else(|| "?".to_string()),
                    view.path.display()
                );
            }
            println!(
                "subdivision rainfall: {}  state rainfall: {}",
                caps.have_subdivision, caps.have_state
            );
        }
    }

    Ok(())
}
