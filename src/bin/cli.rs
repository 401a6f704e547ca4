//! gql-coverage CLI - GraphQL SDK coverage for test runs.
//!
//! Usage:
//!   gql-coverage schema <SDK_FILE>                       # Print extracted operation schema
//!   gql-coverage run --graphql-file <SDK_FILE> -- <cmd>  # Run a test command under coverage
//!   gql-coverage begin --graphql-file <SDK_FILE>         # Prepare the scratch directory
//!   gql-coverage end --graphql-file <SDK_FILE>           # Report and clean up

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use gql_coverage::parser::DEFAULT_SDK_FUNCTION;
use gql_coverage::{extract_operations_schema, GraphqlCoverageReport, ReporterOptions, COVERAGE_DIR_ENV};
use std::path::PathBuf;
use tokio::process::Command;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gql-coverage")]
#[command(about = "GraphQL operation and argument coverage for generated SDK clients", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the operation schema extracted from an SDK file as JSON
    Schema {
        /// Generated SDK source file
        sdk_file: PathBuf,

        /// Name of the SDK factory function
        #[arg(long, default_value = DEFAULT_SDK_FUNCTION)]
        sdk_function: String,
    },

    /// Run a test command and report coverage of the calls it recorded
    Run {
        #[command(flatten)]
        options: OptionArgs,

        /// Test command and its arguments
        #[arg(last = true, required = true)]
        command: Vec<String>,
    },

    /// Prepare an empty scratch directory for recorders
    Begin {
        #[command(flatten)]
        options: OptionArgs,
    },

    /// Build the coverage report from recorded calls and print it
    End {
        #[command(flatten)]
        options: OptionArgs,
    },
}

/// Reporter options. Flags override values from `--config`.
#[derive(Args)]
struct OptionArgs {
    /// TOML file with reporter options
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Generated SDK source file
    #[arg(long)]
    graphql_file: Option<PathBuf>,

    /// Where to write the coverage log
    #[arg(long)]
    coverage_file: Option<PathBuf>,

    /// Where to write the HTML report
    #[arg(long)]
    html_file: Option<PathBuf>,

    /// Scratch directory for call logs
    #[arg(long)]
    coverage_dir: Option<PathBuf>,

    /// Name of the SDK factory function
    #[arg(long)]
    sdk_function: Option<String>,

    /// Minimum argument coverage per operation, in percent
    #[arg(long)]
    min_coverage: Option<f64>,

    /// List uncovered operations in the console report
    #[arg(long)]
    log_uncovered: bool,

    /// Save the coverage log
    #[arg(long)]
    save_log: bool,

    /// Save the HTML report
    #[arg(long)]
    save_html: bool,
}

impl OptionArgs {
    fn resolve(self) -> Result<ReporterOptions> {
        let mut options = match (&self.config, self.graphql_file.clone()) {
            (Some(path), graphql_file) => {
                let mut options = ReporterOptions::from_toml_file(path)?;
                if let Some(file) = graphql_file {
                    options.graphql_file_path = file;
                }
                options
            }
            (None, Some(file)) => ReporterOptions::new(file),
            (None, None) => bail!("either --config or --graphql-file is required"),
        };

        if let Some(path) = self.coverage_file {
            options.coverage_file_path = path;
        }
        if let Some(path) = self.html_file {
            options.html_file_path = path;
        }
        if let Some(dir) = self.coverage_dir {
            options.coverage_dir = Some(dir);
        }
        if let Some(name) = self.sdk_function {
            options.sdk_function_name = name;
        }
        if let Some(min) = self.min_coverage {
            options.min_coverage_per_operation = min;
        }
        options.log_uncovered_operations |= self.log_uncovered;
        options.save_gql_coverage_log |= self.save_log;
        options.save_html_summary |= self.save_html;

        options.validate()?;
        Ok(options)
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<i32> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(execute(cli.command))
}

async fn execute(command: Commands) -> Result<i32> {
    match command {
        Commands::Schema {
            sdk_file,
            sdk_function,
        } => {
            let schema = extract_operations_schema(&sdk_file, &sdk_function)?;
            println!("{}", serde_json::to_string_pretty(&schema)?);
            Ok(0)
        }

        Commands::Run { options, command } => {
            let mut report = GraphqlCoverageReport::new(options.resolve()?)?;
            report.on_begin().await?;

            let (program, args) = command
                .split_first()
                .context("missing test command")?;
            let status = Command::new(program)
                .args(args)
                .env(COVERAGE_DIR_ENV, report.coverage_dir())
                .status()
                .await
                .with_context(|| format!("failed to run '{}'", program))?;
            tracing::info!(%status, "test command finished");

            report.on_end().await?;
            report.on_exit();
            Ok(status.code().unwrap_or(1))
        }

        Commands::Begin { options } => {
            let mut report = GraphqlCoverageReport::new(options.resolve()?)?;
            report.on_begin().await?;
            println!("{}={}", COVERAGE_DIR_ENV, report.coverage_dir().display());
            Ok(0)
        }

        Commands::End { options } => {
            let mut report = GraphqlCoverageReport::new(options.resolve()?)?;
            report.on_end().await?;
            report.on_exit();
            Ok(0)
        }
    }
}
