//! Actionflow CLI — check, lint, format and lay out CI workflow files.
//!
//! A thin host around actionflow-core: it reads files, calls the core and
//! prints the results.

use actionflow_cli::commands;
use actionflow_cli::settings::Settings;
use clap::{Parser, Subcommand};

/// Actionflow CLI — CI workflow tooling
#[derive(Parser)]
#[command(name = "actionflow", version, about = "Actionflow CLI — CI workflow tooling")]
pub struct Cli {
    /// Path to a YAML settings file with `layout:` and `lint:` sections
    #[arg(long, env = "ACTIONFLOW_CONFIG")]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and lint a workflow, failing on any error
    Check {
        /// Workflow YAML file
        file: String,
    },

    /// Print lint diagnostics for a workflow
    Lint {
        /// Workflow YAML file
        file: String,
        /// Print diagnostics as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Rewrite a workflow in canonical form
    Fmt {
        /// Workflow YAML file
        file: String,
        /// Write the result back to the file instead of stdout
        #[arg(long)]
        write: bool,
    },

    /// Print the job graph layout as JSON
    Layout {
        /// Workflow YAML file
        file: String,
    },

    /// List the normalized triggers of a workflow
    Triggers {
        /// Workflow YAML file
        file: String,
    },

    /// Print a new workflow
    New {
        /// Print the two-job sample workflow instead of a blank one
        #[arg(long)]
        sample: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "actionflow_core=warn,actionflow_cli=info".into()),
        )
        .init();

    let result = match Settings::load(cli.config.as_deref()) {
        Err(e) => Err(e),
        Ok(settings) => match cli.command {
            Some(Commands::Check { file }) => commands::check::run(&file, &settings),
            Some(Commands::Lint { file, json }) => commands::lint::run(&file, json, &settings),
            Some(Commands::Fmt { file, write }) => commands::fmt::run(&file, write),
            Some(Commands::Layout { file }) => commands::layout::run(&file, &settings),
            Some(Commands::Triggers { file }) => commands::triggers::run(&file),
            Some(Commands::New { sample }) => commands::new::run(sample),
            None => {
                // No subcommand: show help
                use clap::CommandFactory;
                Cli::command().print_help().ok();
                println!();
                Ok(())
            }
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
