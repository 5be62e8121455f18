//! gridline - Entry Point

use clap::{Parser, Subcommand};
use gridline::app::{self, AppContext, EditRequest, ViewRequest};
use gridline::logging::LogTarget;
use gridline::model::error::AppError;
use gridline::model::{EntityKind, Record};
use gridline::source;
use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};

/// gridline - filter, sort and bulk-edit tabular JSON records
#[derive(Parser, Debug)]
#[command(name = "gridline")]
#[command(version)]
#[command(about = "Filter, sort and bulk-edit tabular JSON records")]
pub struct Args {
    /// Path to configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Entity table the records belong to (leads, clients, positions)
    #[arg(long, global = true, default_value = "leads")]
    pub entity: EntityKind,

    /// JSON array or JSON-lines records file (reads stdin if not provided)
    #[arg(long, global = true)]
    pub records: Option<PathBuf>,

    /// Write logs to stderr instead of the log file
    #[arg(long, global = true)]
    pub log_stderr: bool,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// gridline subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render one page of records as a table
    View {
        /// Column filter as column=JSON (repeatable; replaces saved filters)
        #[arg(long = "filter", value_name = "COLUMN=JSON")]
        filters: Vec<String>,

        /// Sort key as column[:asc|:desc] (repeatable, in priority order)
        #[arg(long, value_name = "COLUMN[:DIR]")]
        sort: Vec<String>,

        /// Quick search across visible columns
        #[arg(long)]
        search: Option<String>,

        /// 1-based page number
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        page: Option<u32>,

        /// Rows per page
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        page_size: Option<u32>,

        /// Comma-separated column ids to show
        #[arg(long, value_delimiter = ',')]
        columns: Option<Vec<String>>,

        /// Persist filters, sort, order and visibility for this entity
        #[arg(long)]
        save: bool,
    },

    /// Set or clear fields on several records at once
    Edit {
        /// Comma-separated record ids
        #[arg(long, value_delimiter = ',', required = true)]
        ids: Vec<String>,

        /// Field to set as field=JSON (repeatable)
        #[arg(long, value_name = "FIELD=JSON")]
        set: Vec<String>,

        /// Field to clear (repeatable)
        #[arg(long, value_name = "FIELD")]
        clear: Vec<String>,

        /// Show current values and options instead of editing
        #[arg(long, conflicts_with_all = ["set", "clear", "output"])]
        preview: bool,

        /// Write edited records here (stdout if not provided)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Set one field on exactly one record
    Assign {
        /// Record id
        #[arg(long, value_delimiter = ',', required = true)]
        id: Vec<String>,

        /// Field assignment as field=JSON
        assignment: String,

        /// Write edited records here (stdout if not provided)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

impl Command {
    fn page_size(&self) -> Option<usize> {
        match self {
            Command::View { page_size, .. } => page_size.map(|n| n as usize),
            _ => None,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match try_main().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "Command failed");
            eprintln!("gridline: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn try_main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Defaults → Config File → Env Vars → CLI Args
    let config = gridline::config::resolve(args.config.clone(), args.command.page_size())?;

    let log_target = if args.log_stderr {
        LogTarget::Stderr
    } else {
        LogTarget::File(config.log_file_path.clone())
    };
    gridline::logging::init(&log_target)?;

    info!(config = ?config, entity = %args.entity, "Configuration loaded and resolved");

    let ctx = AppContext::new(config, args.entity);
    let records = source::load_records(args.records.as_deref())?;

    run(&ctx, records, args.command).await?;
    Ok(())
}

async fn run(ctx: &AppContext, records: Vec<Record>, command: Command) -> Result<(), AppError> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match command {
        Command::View {
            filters,
            sort,
            search,
            page,
            columns,
            save,
            ..
        } => {
            let request = ViewRequest {
                filters: filters
                    .iter()
                    .map(|raw| app::parse_assignment(raw))
                    .collect::<Result<_, _>>()?,
                sort: sort
                    .iter()
                    .map(|raw| app::parse_sort_key(raw))
                    .collect::<Result<_, _>>()?,
                search,
                page: page.map(|n| n as usize),
                columns,
                save,
            };
            app::run_view(ctx, &records, &request, &mut out)
        }
        Command::Edit {
            ids,
            preview: true,
            ..
        } => app::run_preview(ctx, &records, &ids, &mut out),
        Command::Edit {
            ids,
            set,
            clear,
            output,
            ..
        } => {
            let request = EditRequest {
                ids,
                set: set
                    .iter()
                    .map(|raw| app::parse_assignment(raw))
                    .collect::<Result<_, _>>()?,
                clear,
            };
            let (outcome, edited) = app::run_edit(ctx, records, &request).await?;
            eprintln!("{}", outcome.summary());
            write_records(&edited, output.as_deref(), &mut out)
        }
        Command::Assign {
            id,
            assignment,
            output,
        } => {
            let (field, value): (String, Value) = app::parse_assignment(&assignment)?;
            let (outcome, edited) = app::run_assign(ctx, records, &id, &field, value).await?;
            eprintln!("{}", outcome.summary());
            write_records(&edited, output.as_deref(), &mut out)
        }
    }
}

fn write_records<W: Write>(
    records: &[Record],
    output: Option<&Path>,
    out: &mut W,
) -> Result<(), AppError> {
    match output {
        Some(path) => {
            source::save_records(path, records)?;
            info!(path = %path.display(), count = records.len(), "Wrote records");
        }
        None => {
            let values: Vec<&Value> = records.iter().map(Record::data).collect();
            serde_json::to_writer_pretty(&mut *out, &values).map_err(std::io::Error::from)?;
            writeln!(out)?;
        }
    }
    Ok(())
}
