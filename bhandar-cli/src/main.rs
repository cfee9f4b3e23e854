//! Bhandar CLI - drives the storage & retrieval engine from the terminal
//!
//! Every command opens a session (SQLite ledger + JSON rack snapshot), issues
//! one request, and ticks the sequencer until the trolley is idle again.

mod render;

use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;

use bhandar::io::export_report;
use bhandar::store::{MaintenanceCounters, ModelCatalog, OperationLog};
use bhandar::{
    BhandarConfig, GridCell, ModelId, OperationSequencer, Result, RetrievalMode,
    RetrievalRequest, TickEvent, open_session,
};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(
    name = "bhandar",
    version = env!("CARGO_PKG_VERSION"),
    about = "Automated storage & retrieval rack simulator"
)]
struct Cli {
    /// Configuration file (defaults apply if it does not exist)
    #[clap(long, global = true, default_value = "bhandar.toml")]
    config: PathBuf,

    /// Run without the per-tick delay
    #[clap(long, global = true)]
    fast: bool,

    /// Redraw the rack after every tick
    #[clap(long, global = true)]
    watch: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Inspect or extend the model catalog
    Models {
        #[clap(subcommand)]
        command: ModelsCommand,
    },
    /// Store a box of a catalog model
    Store {
        /// Model id
        model: u32,
    },
    /// Retrieve a box
    Retrieve {
        #[clap(long, value_enum, default_value_t = PolicyArg::Lifo)]
        policy: PolicyArg,
        /// Only consider boxes of this model (LIFO/FIFO)
        #[clap(long)]
        model: Option<u32>,
        /// Box id for `--policy by-id`
        #[clap(long)]
        id: Option<String>,
    },
    /// Move the trolley to a cell or numbered location
    ///
    /// The trolley position is not saved: the next command starts again at
    /// the origin, so this is a demonstration of travel only.
    Goto {
        #[clap(required_unless_present = "code", requires = "col")]
        row: Option<usize>,
        col: Option<usize>,
        /// Location code, e.g. pcode-42 or 42
        #[clap(long, conflicts_with = "row")]
        code: Option<String>,
    },
    /// Show the rack and counters
    Status,
    /// Export the CSV report
    Report,
    /// Empty the rack and clear history
    Reset,
}

#[derive(Subcommand, Debug)]
enum ModelsCommand {
    /// List catalog models
    List,
    /// Add a model
    Add { name: String, length: u32, width: u32 },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PolicyArg {
    Lifo,
    Fifo,
    ById,
}

impl From<PolicyArg> for RetrievalMode {
    fn from(p: PolicyArg) -> Self {
        match p {
            PolicyArg::Lifo => RetrievalMode::Lifo,
            PolicyArg::Fifo => RetrievalMode::Fifo,
            PolicyArg::ById => RetrievalMode::ById,
        }
    }
}

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("bhandar=info,bhandar_cli=info")),
        )
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = BhandarConfig::load_or_default(&cli.config)?;
    if cli.fast {
        config.sequencer.tick_interval_ms = 0;
    }
    let mut seq = open_session(&config)?;

    match cli.command {
        Command::Models { command } => match command {
            ModelsCommand::List => {
                for m in seq.ledger().list_models()? {
                    println!("{:>4}  {:<16} {}x{}", m.id.0, m.name, m.length, m.width);
                }
            }
            ModelsCommand::Add {
                name,
                length,
                width,
            } => {
                let id = seq.ledger_mut().add_model(&name, length, width)?;
                println!("Added model {:?} as id {}", name, id.0);
            }
        },
        Command::Store { model } => {
            seq.request_store(ModelId(model))?;
            drive(&mut seq, &config, cli.watch)?;
        }
        Command::Retrieve { policy, model, id } => {
            let request =
                RetrievalRequest::from_parts(policy.into(), model.map(ModelId), id.as_deref())?;
            seq.request_retrieve(request)?;
            drive(&mut seq, &config, cli.watch)?;
        }
        Command::Goto { row, col, code } => {
            match (code, row, col) {
                (Some(code), _, _) => seq.request_move_to_code(&code)?,
                (None, Some(row), Some(col)) => seq.request_move_to(GridCell::new(row, col))?,
                _ => {
                    return Err(bhandar::BhandarError::InvalidInput(
                        "goto needs <row> <col> or --code".to_string(),
                    ));
                }
            }
            drive(&mut seq, &config, cli.watch)?;
        }
        Command::Status => {
            print!("{}", render::render_rack(&seq));
            let counters = seq.ledger().current_counters().ok();
            println!("{}", render::render_summary(&seq, counters));
        }
        Command::Report => {
            let entries = seq.ledger().entries()?;
            let path = export_report(&config.storage.report_dir, &entries, seq.ledger())?;
            println!("Report written to {}", path.display());
        }
        Command::Reset => {
            seq.reset()?;
            println!("Rack reset");
        }
    }
    Ok(())
}

/// Tick the sequencer to idle at the configured pace.
fn drive(seq: &mut OperationSequencer, config: &BhandarConfig, watch: bool) -> Result<()> {
    let interval = config.sequencer.tick_interval();
    let outcome = seq.run_until_idle(|s, event| {
        debug!("{} {:?}", s.phase().as_str(), event);
        if watch {
            println!("{}", render::render_rack(s));
        }
        if !interval.is_zero() && !matches!(event, TickEvent::Completed(_)) {
            thread::sleep(interval);
        }
    })?;

    match outcome {
        Some(o) => {
            info!("{} box {} (distance {})", o.kind, o.box_id, o.distance);
            println!("{} box {}, distance {}", o.kind, o.box_id.0, o.distance);
        }
        None => println!("Trolley at {}", seq.agent_position()),
    }
    Ok(())
}
