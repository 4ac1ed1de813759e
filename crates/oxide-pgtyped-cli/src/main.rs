//! oxide-pgtyped CLI
//!
//! Command-line tool for parsing, typing and binding PostgreSQL queries.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{debug, error, info, Level};
use tracing_subscriber::FmtSubscriber;

use oxide_pgtyped_core::{
    infer_with, parse, refine, to_query_config, InferOptions, QueryInterface, StaticSchema,
};

/// Typed query bindings for PostgreSQL.
#[derive(Parser)]
#[command(name = "oxide-pgtyped")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON schema used to resolve column, function and type placeholders.
    #[arg(short, long, env = "OXIDE_PGTYPED_SCHEMA")]
    schema_file: Option<PathBuf>,

    /// Schema applied to unqualified table names.
    #[arg(short, long, env = "OXIDE_PGTYPED_DEFAULT_SCHEMA", default_value = "public")]
    default_schema: String,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the syntax tree of a query.
    Parse {
        /// File holding one statement.
        file: PathBuf,
    },

    /// Print the parameters and result columns of a query.
    Infer {
        /// File holding one statement.
        file: PathBuf,

        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Rewrite named parameters to positional ones and bind values.
    Bind {
        /// File holding one statement.
        file: PathBuf,

        /// JSON object keyed by parameter name.
        #[arg(long)]
        values: PathBuf,
    },

    /// Parse every file and report syntax errors.
    Check {
        /// Files holding one statement each.
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn read_source(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn run_parse(path: &Path) -> anyhow::Result<bool> {
    let source = read_source(path)?;
    match parse(&source) {
        Ok(parsed) => {
            println!("{:#?}", parsed.statement);
            for comment in &parsed.comments {
                println!(
                    "comment {}..{}: {}",
                    comment.span.start, comment.span.end, comment.text
                );
            }
            Ok(true)
        }
        Err(err) => {
            error!("{}: {err}", path.display());
            eprintln!("{}", err.caret(&source));
            Ok(false)
        }
    }
}

fn print_interface(interface: &QueryInterface) {
    println!("Parameters:");
    println!("{:-<60}", "");
    for param in &interface.params {
        let mut name = param.name.clone();
        if param.spread {
            name.insert_str(0, "$$");
        }
        if !param.pick.is_empty() {
            name.push_str(&format!("({})", param.pick.join(", ")));
        }
        if param.required {
            name.push('!');
        }
        println!(" {name:<24} {:?}", param.ty);
    }
    println!("\nResults:");
    println!("{:-<60}", "");
    for column in &interface.results {
        println!(" {:<24} {:?}", column.name, column.ty);
    }
    println!();
}

fn run_infer(
    path: &Path,
    options: &InferOptions,
    schema: Option<&StaticSchema>,
    json: bool,
) -> anyhow::Result<bool> {
    let source = read_source(path)?;
    let parsed = match parse(&source) {
        Ok(parsed) => parsed,
        Err(err) => {
            error!("{}: {err}", path.display());
            eprintln!("{}", err.caret(&source));
            return Ok(false);
        }
    };
    let mut interface = infer_with(&parsed.statement, options)?;
    if let Some(schema) = schema {
        interface = refine(interface, schema);
    }
    if json {
        println!("{}", serde_json::to_string_pretty(&interface)?);
    } else {
        print_interface(&interface);
    }
    Ok(true)
}

fn run_bind(path: &Path, values: &Path) -> anyhow::Result<bool> {
    let source = read_source(path)?;
    let values: serde_json::Value = serde_json::from_str(&read_source(values)?)
        .with_context(|| format!("parsing {}", values.display()))?;
    let config = to_query_config(&source, &values)?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(true)
}

fn run_check(files: &[PathBuf]) -> anyhow::Result<bool> {
    let mut failed = 0;
    for path in files {
        let source = read_source(path)?;
        match parse(&source) {
            Ok(parsed) => debug!("{}: {}", path.display(), parsed.statement.kind()),
            Err(err) => {
                failed += 1;
                error!("{}: {err}", path.display());
                eprintln!("{}", err.caret(&source));
            }
        }
    }
    if failed == 0 {
        info!("{} file(s) parsed.", files.len());
    } else {
        info!("{failed} of {} file(s) failed to parse.", files.len());
    }
    Ok(failed == 0)
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let options = InferOptions {
        default_schema: cli.default_schema,
    };
    let schema = match &cli.schema_file {
        Some(path) => {
            debug!("Loading schema from {}", path.display());
            Some(
                StaticSchema::from_path(path)
                    .with_context(|| format!("loading schema {}", path.display()))?,
            )
        }
        None => None,
    };

    let ok = match cli.command {
        Commands::Parse { file } => run_parse(&file)?,
        Commands::Infer { file, json } => run_infer(&file, &options, schema.as_ref(), json)?,
        Commands::Bind { file, values } => run_bind(&file, &values)?,
        Commands::Check { files } => run_check(&files)?,
    };

    Ok(if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
