use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use phpdoc_api::{ApiParser, Config};

/// Extract API documentation from a PHP source tree and print it as JSON.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base path of the source tree (overrides `base_path` from --config)
    base: Option<PathBuf>,

    /// Sub-path of the base path to scan (repeatable; default: the whole base path)
    #[arg(short, long = "source", value_name = "PATH")]
    sources: Vec<PathBuf>,

    /// Glob matched against absolute file paths to skip (repeatable)
    #[arg(short, long = "ignore", value_name = "GLOB")]
    ignore: Vec<String>,

    /// TOML config file; command line options extend it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print only this class (fully-qualified name)
    #[arg(long, value_name = "FQN", conflicts_with_all = ["class_map", "namespaces", "failed"])]
    class: Option<String>,

    /// Print the namespace tree instead of the full table
    #[arg(long, conflicts_with_all = ["namespaces", "failed"])]
    class_map: bool,

    /// Print the namespaces that were found
    #[arg(long, conflicts_with = "failed")]
    namespaces: bool,

    /// Print the files that could not be parsed
    #[arg(long)]
    failed: bool,

    /// Log progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<(Config, Output)> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("failed to load {}", path.display()))?,
            None => Config::default(),
        };
        if let Some(base) = self.base {
            config.base_path = base;
        }
        config.sources.extend(self.sources);
        config.ignore.extend(self.ignore);

        let output = if let Some(fqn) = self.class {
            Output::Class(fqn)
        } else if self.class_map {
            Output::ClassMap
        } else if self.namespaces {
            Output::Namespaces
        } else if self.failed {
            Output::Failed
        } else {
            Output::Classes
        };
        Ok((config, output))
    }
}

enum Output {
    Classes,
    Class(String),
    ClassMap,
    Namespaces,
    Failed,
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let (config, output) = cli.into_config()?;
    let mut parser = ApiParser::new(config)?;
    parser.parse();

    let json = match output {
        Output::Classes => serde_json::to_string_pretty(parser.classes())?,
        Output::Class(fqn) => match parser.class(&fqn) {
            Some(record) => serde_json::to_string_pretty(record)?,
            None => bail!("class {fqn} was not found"),
        },
        Output::ClassMap => serde_json::to_string_pretty(&parser.class_map())?,
        Output::Namespaces => serde_json::to_string_pretty(parser.namespaces())?,
        Output::Failed => serde_json::to_string_pretty(parser.failed_paths())?,
    };

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{json}")?;
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
