use std::io::IsTerminal;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::filter::LevelFilter;

mod rules_check;

#[derive(Parser)]
#[command(
    name = "rulecheck",
    version,
    about = "Batch validator for alerting and recording rule files"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Show project information
    #[arg(long)]
    about: bool,

    /// Only log messages with the given severity or above
    #[arg(long = "log.level", global = true, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Output format of log messages
    #[arg(long = "log.format", global = true, value_enum, default_value_t = LogFormat::Logfmt)]
    log_format: LogFormat,
}

/// Log severity threshold.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum LogFormat {
    /// key=value text lines (default)
    #[default]
    Logfmt,
    /// One JSON object per line
    Json,
}

#[derive(Subcommand)]
#[command(next_display_order = None)]
enum Commands {
    /// Check if the rule files are valid or not
    RulesCheck {
        /// The rule files glob to check (repeated)
        #[arg(long = "rules", required = true, value_name = "GLOB")]
        rules: Vec<String>,
    },
}

pub fn run(cli: Cli) {
    if cli.about {
        print_about();
        return;
    }

    init_logging(cli.log_level, cli.log_format);

    match cli.command {
        Some(Commands::RulesCheck { rules }) => rules_check::run(&rules),
        None => {
            eprintln!("Usage: rulecheck <command> [args]");
            eprintln!("Run `rulecheck --help` for details.");
            std::process::exit(1);
        }
    }
}

/// Install the global `tracing` subscriber writing to stderr.
fn init_logging(level: LogLevel, format: LogFormat) {
    let builder = tracing_subscriber::fmt()
        .with_max_level(LevelFilter::from(level))
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false);
    match format {
        LogFormat::Logfmt => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn print_about() {
    println!(
        "rulecheck: rule file batch validator\n\
         ├─ version:    {}\n\
         └─ licence:    {} https://www.apache.org/licenses/LICENSE-2.0",
        env!("CARGO_PKG_VERSION"),
        env!("CARGO_PKG_LICENSE"),
    );
}
