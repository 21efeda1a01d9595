use clap::builder::{styling::AnsiColor, Styles};
use clap::ColorChoice;
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use commands::{
    inspect_stack, list_text, reset_config, set_default_stack, show_config, Category,
    InspectStackArgs, ListTextArgs,
};
use lumpstack::DiagnosticLog;
use miette::Result;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod commands;
mod errors;
mod utils;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show what a resource stack resolves to
    Inspect {
        /// The stack file (lumpstack.toml or .json); defaults to the configured stack
        #[arg(short, long)]
        stack: Option<String>,

        /// Which resource category to load
        #[arg(short, long, value_enum, default_value = "all")]
        category: Category,

        /// List every image, not only the counts
        #[arg(short, long)]
        verbose: bool,
    },
    /// List the text lumps of one family, in processing order
    Text {
        /// The stack file (lumpstack.toml or .json); defaults to the configured stack
        #[arg(short, long)]
        stack: Option<String>,

        /// The lump family (DECORATE, ZSCRIPT, MAPINFO, GLDEFS, SNDINFO, ...)
        lump: String,

        /// Lump name or exact path for DECORATE, ZSCRIPT and MODELDEF
        #[arg(short, long)]
        name: Option<String>,

        /// Print the contents of each lump
        #[arg(long)]
        show_text: bool,
    },
    /// Manage the CLI configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the current configuration
    Show,
    /// Set the stack file used when --stack is omitted
    SetDefaultStack {
        /// Path to the stack file
        path: String,
    },
    /// Reset the configuration to defaults
    Reset,
}

fn parse_args() -> Args {
    // Configure colored/styled help output
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default())
        .placeholder(AnsiColor::Blue.on_default());

    let matches = Args::command()
        .styles(styles)
        .color(ColorChoice::Auto)
        .get_matches();

    Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
}

/// Installs the stderr formatter and the diagnostic collector.
fn init_logging() -> DiagnosticLog {
    let log = DiagnosticLog::new();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("lumpstack=info,lumpstack_cli=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(log.clone())
        .init();
    log
}

fn main() -> Result<()> {
    let args = parse_args();
    let log = init_logging();

    match args.command {
        Commands::Inspect {
            stack,
            category,
            verbose,
        } => inspect_stack(
            InspectStackArgs {
                stack,
                category,
                verbose,
            },
            &log,
        ),
        Commands::Text {
            stack,
            lump,
            name,
            show_text,
        } => list_text(
            ListTextArgs {
                stack,
                lump,
                name,
                show_text,
            },
            &log,
        ),
        Commands::Config { action } => match action {
            ConfigAction::Show => show_config(),
            ConfigAction::SetDefaultStack { path } => set_default_stack(path),
            ConfigAction::Reset => reset_config(),
        },
    }
}
