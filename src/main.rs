//! commits-format CLI
//!
//! Usage:
//!   commits-format [format] [OPTIONS]
//!   commits-format list [OPTIONS]
//!
//! Options:
//!   -f, --format <NAME>    Format to use (default: "default")
//!   -c, --config <FILE>    Configuration file (JSON, or TOML by extension)
//!   -o, --output <FILE>    Also write the message to a file
//!   -q, --quiet            Print only the message
//!   -d, --debug            Log each resolution step
//!   -h, --help             Print help

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use commits_format::config::DEFAULT_FORMAT;
use commits_format::prompt::TerminalPrompter;
use commits_format::{format_commit, CommitFormatConfiguration, FormatError, FormatOptions};

#[derive(Parser)]
#[command(name = "commits-format")]
#[command(version, about = "Build commit messages from a repository-defined format")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Name of the format to use
    #[arg(short, long, global = true, default_value = DEFAULT_FORMAT)]
    format: String,

    /// Configuration file (default: commits-format.json or commits-format.toml
    /// in the current directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Also write the message to this file (e.g. for `git commit -F`)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Print only the message, without the header
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Debug mode: log each resolution step
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Build a commit message interactively (the default)
    Format,
    /// List the formats defined in the configuration
    List,
}

impl Cli {
    fn options(&self) -> FormatOptions {
        let options = FormatOptions::new()
            .with_format(self.format.clone())
            .with_debug(self.debug);
        match &self.config {
            Some(path) => options.with_config_path(path),
            None => options,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let options = cli.options();
    init_logging(options.debug);

    #[cfg(unix)]
    if let Err(e) = install_signal_handlers() {
        debug!("Could not install signal handlers: {}", e);
    }

    if let Err(err) = run(&cli, &options) {
        let cancelled = err
            .downcast_ref::<FormatError>()
            .is_some_and(FormatError::is_cancelled);
        if cancelled {
            debug!("Cancelled by user");
            std::process::exit(0);
        }
        error!("{:#}", err);
        std::process::exit(1);
    }
}

fn init_logging(debug: bool) {
    let level = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(debug)
        .init();
}

/// Exit quietly on SIGINT or SIGTERM
#[cfg(unix)]
fn install_signal_handlers() -> Result<()> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM])?;
    std::thread::spawn(move || {
        if let Some(sig) = signals.forever().next() {
            debug!("Received signal {}, exiting", sig);
            std::process::exit(0);
        }
    });
    Ok(())
}

fn run(cli: &Cli, options: &FormatOptions) -> Result<()> {
    match cli.command.as_ref().unwrap_or(&Command::Format) {
        Command::Format => run_format(cli, options),
        Command::List => run_list(options),
    }
}

fn load_configuration(options: &FormatOptions) -> Result<CommitFormatConfiguration> {
    let cwd = std::env::current_dir().context("Failed to determine the working directory")?;
    options.load(&cwd).with_context(|| match &options.config_path {
        Some(path) => format!("Error loading configuration '{}'", path.display()),
        None => format!("Error loading configuration from '{}'", cwd.display()),
    })
}

fn run_format(cli: &Cli, options: &FormatOptions) -> Result<()> {
    let config = load_configuration(options)?;

    let mut prompter = TerminalPrompter::stdio();
    let message = match format_commit(&config, &options.format, &mut prompter) {
        Ok(message) => message,
        Err(FormatError::Render(err)) => {
            let template = config
                .format(&options.format)
                .and_then(|format| format.template.as_ref())
                .and_then(|template| template.string.as_deref());
            if let Some(source) = template {
                eprintln!("{}", err.format(source, &options.format));
            }
            return Err(FormatError::Render(err).into());
        }
        Err(err) => return Err(err.into()),
    };

    if !cli.quiet {
        println!("Commit message:");
    }
    println!("{}", message);

    if let Some(path) = &cli.output {
        fs::write(path, format!("{}\n", message))
            .with_context(|| format!("Error writing message to '{}'", path.display()))?;
    }
    Ok(())
}

fn run_list(options: &FormatOptions) -> Result<()> {
    let config = load_configuration(options)?;
    for format in &config.formats {
        match &format.description {
            Some(description) => println!("{}\t{}", format.name, description),
            None => println!("{}", format.name),
        }
    }
    Ok(())
}
