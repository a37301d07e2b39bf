mod commands;

use clap::{Parser, Subcommand};
use commands::Overrides;
use htmlstring::EscapeMode;
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "htmlstring")]
#[command(about = "Escape and unescape HTML character entities", long_about = None)]
struct Cli {
    /// Config file; defaults to ./htmlstring.toml when present
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Extra entities in the WHATWG entities.json format
    #[arg(long, global = true)]
    entities: Option<PathBuf>,

    /// Repeat for more detail (-v debug, -vv trace)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Escape {
        /// Escape everything that is not plain ASCII
        #[arg(long, conflicts_with = "unicode")]
        ascii: bool,

        /// Escape only markup-significant characters
        #[arg(long)]
        unicode: bool,

        /// Prefer named entities (ASCII mode)
        #[arg(long)]
        named: bool,

        /// Input file, or `-` for stdin
        input: Option<PathBuf>,
    },
    Unescape {
        /// Input file, or `-` for stdin
        input: Option<PathBuf>,
    },
    Entity {
        /// Look up the name for a literal value instead
        #[arg(long)]
        reverse: bool,

        value: String,
    },
}

fn init_logging(verbose: u8) {
    let directive = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
    let use_ansi = std::env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(use_ansi)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let overrides = Overrides {
        config: cli.config,
        entities: cli.entities,
        ..Overrides::default()
    };

    let result = match cli.command {
        Commands::Escape {
            ascii,
            unicode,
            named,
            input,
        } => {
            let mode = if ascii {
                Some(EscapeMode::Ascii)
            } else if unicode {
                Some(EscapeMode::Unicode)
            } else {
                None
            };
            let overrides = Overrides {
                mode,
                named,
                ..overrides
            };
            commands::escape(&overrides, input.as_deref())
        }
        Commands::Unescape { input } => commands::unescape(&overrides, input.as_deref()),
        Commands::Entity { reverse, value } => commands::entity(&overrides, &value, reverse),
    };

    if let Err(error) = result {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}
