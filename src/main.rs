use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use qc_pack::config::{resolve_data_dir, Settings};
use qc_pack::db::SqliteRecordStore;
use qc_pack::evaluator::parse_measure;
use qc_pack::models::NewItem;
use qc_pack::packing::PackingLine;
use qc_pack::report::{render_closed_boxes, render_items, FinalReport};
use qc_pack::store::{FsRecordStore, RecordStore};
use qc_pack::Error;

const REPORTS_DIR: &str = "reports";
const DATABASE_FILE: &str = "qcpack.db";

#[derive(Parser)]
#[command(name = "qcpack", version)]
#[command(about = "Quality control and box packing for inspected parts")]
struct Cli {
    /// Directory holding box records, the reject record and reports
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// JSON settings file (thresholds, box capacity)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Record backend
    #[arg(long, global = true, value_enum, default_value_t = Backend::Fs)]
    backend: Backend,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Backend {
    /// One JSON file per record
    Fs,
    /// Single SQLite database
    Sqlite,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate and record a new part
    Register {
        #[arg(long)]
        id: String,
        /// Weight in grams (a decimal comma is accepted)
        #[arg(long)]
        weight: String,
        #[arg(long)]
        color: String,
        /// Length in centimetres (a decimal comma is accepted)
        #[arg(long)]
        length: String,
    },
    /// Evaluate a part without recording it
    Evaluate {
        #[arg(long)]
        weight: String,
        #[arg(long)]
        color: String,
        #[arg(long)]
        length: String,
    },
    /// List approved and rejected parts
    List,
    /// Remove a registered part
    Remove { id: String },
    /// List closed boxes and their contents
    Boxes,
    /// Print the final report
    Report {
        /// Also write the report under <data-dir>/reports
        #[arg(long)]
        save: bool,

        /// Print the totals as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Show the open box and counts
    Status,
}

/// Logs go to stderr so stdout carries only command output.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "qc_pack=info,qcpack=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<Error>() {
                Some(Error::DuplicateId(_) | Error::NotFound(_) | Error::InvalidInput(_)) => {
                    eprintln!("error: {}", e);
                }
                _ => {
                    tracing::error!("{:#}", e);
                    eprintln!("error: {:#}", e);
                }
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = Settings::load(cli.config.as_deref())?;
    let data_dir = resolve_data_dir(cli.data_dir)?;

    match cli.backend {
        Backend::Fs => {
            let store = FsRecordStore::open(&data_dir)?;
            execute(PackingLine::open(store, &settings)?, cli.command, &data_dir)
        }
        Backend::Sqlite => {
            let store = SqliteRecordStore::open(data_dir.join(DATABASE_FILE))?;
            store.migrate()?;
            execute(PackingLine::open(store, &settings)?, cli.command, &data_dir)
        }
    }
}

fn execute<S: RecordStore>(
    mut line: PackingLine<S>,
    command: Commands,
    data_dir: &std::path::Path,
) -> anyhow::Result<()> {
    match command {
        Commands::Register {
            id,
            weight,
            color,
            length,
        } => {
            let input = NewItem {
                id,
                weight: parse_measure("weight", &weight)?,
                color,
                length: parse_measure("length", &length)?,
            };
            let item = line.register(input)?;
            if item.approved {
                let open_id = line.inventory().open_box().id;
                println!("Item {} APPROVED and packed (open box is now #{}).", item.id, open_id);
            } else {
                println!(
                    "Item {} REJECTED. Reasons: {}",
                    item.id,
                    item.failure_reasons.join(", ")
                );
            }
        }
        Commands::Evaluate {
            weight,
            color,
            length,
        } => {
            let verdict = line.evaluate(
                parse_measure("weight", &weight)?,
                &color,
                parse_measure("length", &length)?,
            );
            if verdict.approved {
                println!("APPROVED");
            } else {
                println!("REJECTED: {}", verdict.reasons.join(", "));
            }
        }
        Commands::List => print!("{}", render_items(line.inventory())),
        Commands::Remove { id } => {
            let item = line.remove(id.trim())?;
            println!("Item '{}' removed.", item.id);
        }
        Commands::Boxes => print!("{}", render_closed_boxes(line.inventory())),
        Commands::Report { save, json } => {
            let report = FinalReport::from_inventory(line.inventory());
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report.render());
            }
            if save {
                let path = report.save(&data_dir.join(REPORTS_DIR), chrono::Local::now())?;
                println!("\nReport saved to: {}", path.display());
            }
        }
        Commands::Status => {
            let inventory = line.inventory();
            let open_box = inventory.open_box();
            println!(
                "Open box #{}: {}/{} items",
                open_box.id,
                open_box.len(),
                line.capacity()
            );
            println!("Closed boxes: {}", inventory.closed_boxes().len());
            println!(
                "Approved: {}, rejected: {}",
                inventory.approved_ids().len(),
                inventory.rejected_ids().len()
            );
        }
    }

    Ok(())
}
