//! filterexpr - evaluate filter expressions against a JSON data set

use anyhow::{bail, Context, Result};
use clap::{Parser as ClapParser, Subcommand};
use filterexpr::catalog::load_data_set;
use filterexpr::{DataSet, TableIdFields};
use std::path::PathBuf;

/// Evaluate STTP-style filter expressions
#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON data set file
    #[arg(short = 'D', long, global = true)]
    dataset: Option<PathBuf>,

    /// Primary table for literal identifiers and bare expressions
    #[arg(short, long, global = true, default_value = "ActiveMeasurements")]
    table: String,

    /// JSON file overriding the SignalID / ID / PointTag field names
    #[arg(long, global = true)]
    id_fields: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate an expression, against one row of the primary table when --row is given
    Eval {
        expression: String,
        #[arg(short, long)]
        row: Option<usize>,
    },
    /// Print the rows selected by a filter expression
    Select { filter: String },
    /// Print the signal IDs selected by a filter expression
    SignalIds { filter: String },
    /// Print the bound expression tree of every statement
    Trees { filter: String },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    match &args.command {
        Command::Eval { expression, row } => match row {
            None => {
                let value = filterexpr::evaluate_expression(expression)
                    .context("Failed to evaluate expression")?;
                println!("{}", value);
            }
            Some(row) => {
                let data_set = open_data_set(&args)?;
                let table = data_set
                    .table(&args.table)
                    .with_context(|| format!("Table \"{}\" not found", args.table))?;
                let data_row = table
                    .row(*row)
                    .with_context(|| format!("Table \"{}\" has no row {}", args.table, row))?;
                let value = filterexpr::evaluate_row_expression(table, data_row, expression)
                    .context("Failed to evaluate expression")?;
                println!("{}", value);
            }
        },
        Command::Select { filter } => {
            let data_set = open_data_set(&args)?;
            let id_fields = load_id_fields(&args)?;
            let rows = filterexpr::select_data_rows(&data_set, filter, &args.table, Some(&id_fields))
                .context("Failed to select rows")?;

            for row_ref in &rows {
                let (Some(table), Some(row)) = (data_set.table_at(row_ref.table), data_set.row(*row_ref))
                else {
                    continue;
                };
                let values: Vec<String> = table
                    .columns()
                    .iter()
                    .zip(row.values())
                    .map(|(column, value)| format!("{}={}", column.name, value))
                    .collect();
                println!("{}[{}]: {}", table.name(), row_ref.row, values.join(", "));
            }
            log::info!("{} row(s) selected", rows.len());
        }
        Command::SignalIds { filter } => {
            let data_set = open_data_set(&args)?;
            let id_fields = load_id_fields(&args)?;
            let signal_ids =
                filterexpr::select_signal_ids(&data_set, filter, &args.table, Some(&id_fields))
                    .context("Failed to select signal IDs")?;

            for signal_id in &signal_ids {
                println!("{}", signal_id.braced());
            }
            log::info!("{} signal ID(s) selected", signal_ids.len());
        }
        Command::Trees { filter } => {
            let data_set = open_data_set(&args)?;
            let trees = filterexpr::generate_expression_trees(&data_set, &args.table, filter)
                .context("Failed to generate expression trees")?;

            for tree in &trees {
                println!("{}", tree);
            }
        }
    }

    Ok(())
}

fn open_data_set(args: &Args) -> Result<DataSet> {
    let Some(path) = &args.dataset else {
        bail!("--dataset is required for this command");
    };
    let data_set = load_data_set(path)?;
    log::debug!(
        "Loaded {} table(s) from {}",
        data_set.tables().len(),
        path.display()
    );
    Ok(data_set)
}

fn load_id_fields(args: &Args) -> Result<TableIdFields> {
    let Some(path) = &args.id_fields else {
        return Ok(TableIdFields::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read id fields file {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid id fields file {}", path.display()))
}
