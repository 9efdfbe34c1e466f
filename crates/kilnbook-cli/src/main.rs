use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use kilnbook_core::config::DEFAULT_DATA_DIR;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod output;

#[derive(Parser)]
#[command(
    name = "kilnbook",
    version,
    about = "Studio calendar, time log, goals, portfolio and journal for makers"
)]
struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    format: output::OutputFormat,

    /// Data directory
    #[arg(long, global = true, env = "KILNBOOK_DIR", default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: commands::Commands,
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let dir = cli.data_dir.as_path();
    match &cli.command {
        commands::Commands::Init(args) => commands::init::run(args, dir),
        commands::Commands::Create(args) => commands::create::run(args, dir, cli.format),
        commands::Commands::Show(args) => commands::show::run(args, dir, cli.format),
        commands::Commands::List(args) => commands::list::run(args, dir, cli.format),
        commands::Commands::Update(args) => commands::update::run(args, dir, cli.format),
        commands::Commands::Delete(args) => commands::delete::run(args, dir),
        commands::Commands::Link(args) => commands::link::run_link(args, dir),
        commands::Commands::Unlink(args) => commands::link::run_unlink(args, dir),
        commands::Commands::Links(args) => commands::links::run(args, dir, cli.format),
        commands::Commands::Search(args) => commands::search::run(args, dir, cli.format),
        commands::Commands::Reindex => commands::reindex::run(dir),
        commands::Commands::Agenda(args) => commands::agenda::run(args, dir, cli.format),
        commands::Commands::Time(args) => commands::time::run(args, dir, cli.format),
        commands::Commands::Export(args) => commands::export::run(args, dir),
        commands::Commands::Import(args) => commands::import::run(args, dir, cli.format),
        commands::Commands::Stats => commands::stats::run(dir, cli.format),
    }
}
