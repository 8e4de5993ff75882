//! seqfx - sequencer effect compositing CLI
//!
//! Lists the available effects and renders synthetic frames through them.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "seqfx")]
#[command(author, version, about = "Sequencer effect compositing engine")]
#[command(long_about = "
Runs the sequencer's compositing effects on synthetic frames.

Examples:
  seqfx list                               # Effects, inputs and capabilities
  seqfx list --json
  seqfx render cross --fac 0.25            # Dissolve two gradients
  seqfx render color_mix --mode screen -W 1920 -H 1080
  seqfx render glow --config engine.yaml --json
  seqfx config > engine.yaml               # Default engine configuration
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Number of threads (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// List effect types
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Render synthetic inputs through an effect
    #[command(visible_alias = "r")]
    Render(RenderArgs),

    /// Print the default engine configuration as YAML
    Config,
}

/// Arguments for the `list` command.
#[derive(Args)]
struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Arguments for the `render` command.
#[derive(Args)]
struct RenderArgs {
    /// Effect name (cross, gamma_cross, alpha_over, screen, glow, ...)
    effect: String,

    /// Frame width
    #[arg(short = 'W', long, default_value = "64")]
    width: u32,

    /// Frame height
    #[arg(short = 'H', long, default_value = "64")]
    height: u32,

    /// Blend factor; the effect's default when omitted
    #[arg(short, long)]
    fac: Option<f32>,

    /// Blend mode stored on a color_mix strip
    #[arg(short, long)]
    mode: Option<String>,

    /// Engine configuration (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Render float frames instead of byte frames
    #[arg(long)]
    float: bool,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::List(args) => commands::list::run(args),
        Commands::Render(args) => commands::render::run(args, cli.threads),
        Commands::Config => commands::config::run(cli.threads),
    }
}
