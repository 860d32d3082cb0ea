use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser, Subcommand};
use keytrace::config::Config;
use keytrace::geometry::{Fingermap, Layout};
use keytrace::KtResult;
use std::process;
use std::sync::Arc;
use tracing::{error, info};

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(global = true, short, long, default_value = "data/layout.json")]
    layout: String,

    /// Layout to use when the layout file is a QMK info.json with several.
    #[arg(global = true, long)]
    layout_name: Option<String>,

    #[arg(global = true, short, long, default_value = "data/fingermap.json")]
    fingermap: String,

    /// JSON config file; flags given on the command line take precedence.
    #[arg(global = true, long = "config")]
    config_file: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Analyze(cmd::analyze::AnalyzeArgs),
    Replay(cmd::replay::ReplayArgs),
    Compare(cmd::compare::CompareArgs),
}

impl Commands {
    fn config(&self) -> &Config {
        match self {
            Commands::Analyze(args) => &args.config,
            Commands::Replay(args) => &args.config,
            Commands::Compare(args) => &args.config,
        }
    }
}

fn resolve_config(cli: &Cli, sub_matches: &ArgMatches) -> KtResult<Config> {
    let cli_config = cli.command.config();

    match &cli.config_file {
        Some(path) => {
            info!("⚙️  Loading Config: {}", path);
            let mut config = Config::load_from_file(path)?;
            config.merge_from_cli(cli_config, sub_matches);
            Ok(config)
        }
        None => Ok(cli_config.clone()),
    }
}

fn run(cli: Cli, matches: &ArgMatches) -> KtResult<()> {
    info!("📂 Loading Layout: {}", cli.layout);
    let layout = Arc::new(Layout::load_from_file(
        &cli.layout,
        cli.layout_name.as_deref(),
    )?);

    info!("🖐  Loading Fingermap: {}", cli.fingermap);
    let fingermap = Fingermap::load_from_file(&cli.fingermap)?;
    fingermap.validate(&layout)?;

    let sub_matches = matches.subcommand().map(|(_, m)| m).unwrap_or(matches);
    let config = resolve_config(&cli, sub_matches)?;

    match cli.command {
        Commands::Analyze(args) => cmd::analyze::run(args, layout, &fingermap, config),
        Commands::Replay(args) => cmd::replay::run(args, layout, &fingermap, config),
        Commands::Compare(args) => cmd::compare::run(args, layout, &fingermap, config),
    }
}

fn main() {
    tracing_subscriber::fmt::init();

    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    if let Err(e) = run(cli, &matches) {
        if e.is_fatal() {
            error!("❌ FATAL: {}", e);
        } else {
            error!("❌ {}", e);
        }
        process::exit(1);
    }
}
