use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use ffi_fixtures::ast::CAbstractSyntaxTree;
use ffi_fixtures::catalog::{build_ast, ENUM_FIXTURES};
use ffi_fixtures::error::log_fixture_error;
use ffi_fixtures::ffi::{enum_export, OPAQUE_CALC_SYMBOL};
use ffi_fixtures::merge::merge;
use ffi_fixtures::opaque::OpaqueTypePlatformSpecificSize;
use ffi_fixtures::oracle::run_oracles;
use ffi_fixtures::verify::verify_bindings_file;
use ffi_fixtures::{FixtureConfig, TargetPlatform};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(
    name = "ffi-fixtures",
    about = "Native fixtures and binding checks for C FFI generators"
)]
struct Cli {
    /// JSON config file (defaults to ./ffi_fixtures.json when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log at debug level
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write the AST document for one platform
    Ast {
        /// Platform short name or target triple (defaults to the compiled one)
        #[arg(long)]
        platform: Option<String>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Merge per-platform AST documents into a cross-platform one
    Merge {
        #[arg(long = "input", required = true, num_args = 1..)]
        inputs: Vec<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Inspect a generated binding artifact
    Verify {
        #[arg(long)]
        bindings: PathBuf,
        /// AST the bindings were generated from (defaults to the built-in one)
        #[arg(long)]
        ast: Option<PathBuf>,
    },
    /// Run the identity, print, width and calc laws against the exports
    Oracle {
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Call an exported print function, which writes to stdout
    Print {
        /// Enum declaration name, e.g. Enum_Force_UInt8
        #[arg(long)]
        fixture: String,
        #[arg(long = "value", required = true, num_args = 1.., allow_negative_numbers = true)]
        values: Vec<i128>,
    },
    /// List fixtures and their exported symbols
    List,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OutputFormat {
    Json,
    Table,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    ffi_fixtures::init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => FixtureConfig::load_from_file(path),
        None => FixtureConfig::load(),
    };
    tracing::debug!(?config, "configuration resolved");

    match cli.command {
        Commands::Ast { platform, output } => run_ast(&config, platform, output),
        Commands::Merge { inputs, output } => run_merge(&inputs, output),
        Commands::Verify { bindings, ast } => run_verify(&config, &bindings, ast),
        Commands::Oracle { format } => run_oracle(&config, format),
        Commands::Print { fixture, values } => run_print(&fixture, &values),
        Commands::List => run_list(&config),
    }
}

fn run_ast(
    config: &FixtureConfig,
    platform: Option<String>,
    output: Option<PathBuf>,
) -> Result<ExitCode> {
    let platform = resolve_platform(config, platform)?;
    let ast = build_ast(platform, &config.exclusions());
    let json = ast.to_json_pretty()?;
    emit_json(&json, output)?;
    Ok(ExitCode::from(0))
}

fn run_merge(inputs: &[PathBuf], output: Option<PathBuf>) -> Result<ExitCode> {
    let mut documents = Vec::with_capacity(inputs.len());
    for path in inputs {
        match CAbstractSyntaxTree::read_from_path(path) {
            Ok(document) => documents.push(document),
            Err(err) => {
                log_fixture_error(&err, &format!("merge input {}", path.display()));
            }
        }
    }

    let outcome = merge(&documents).inspect_err(|err| log_fixture_error(err, "merge"))?;
    for dropped in &outcome.dropped {
        tracing::info!(name = %dropped.name, reason = ?dropped.reason, "declaration dropped");
    }
    let json = outcome.ast.to_json_pretty()?;
    emit_json(&json, output)?;
    Ok(ExitCode::from(0))
}

fn run_verify(config: &FixtureConfig, bindings: &Path, ast_path: Option<PathBuf>) -> Result<ExitCode> {
    let ast = match ast_path {
        Some(path) => CAbstractSyntaxTree::read_from_path(&path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => build_ast(config.target_platform()?, &config.exclusions()),
    };

    let report = verify_bindings_file(bindings, &ast, &config.verify_options())
        .with_context(|| format!("verifying {}", bindings.display()))?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if report.has_anomalies() {
        if let Err(err) = report.exclusion_result() {
            log_fixture_error(&err, "verify");
        }
        emit_diff(&VerifyDiff {
            artifact: &report.artifact,
            anomaly_count: report.anomalies.len(),
            anomalies: &report.anomalies,
        })?;
        return Ok(ExitCode::from(2));
    }
    Ok(ExitCode::from(0))
}

fn run_oracle(config: &FixtureConfig, format: OutputFormat) -> Result<ExitCode> {
    let report = run_oracles(&config.exclusions(), config.include_excluded_oracles);
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Table => print!("{}", report.render_table()),
    }
    if report.passed() {
        Ok(ExitCode::from(0))
    } else {
        Ok(ExitCode::from(2))
    }
}

fn run_print(fixture: &str, values: &[i128]) -> Result<ExitCode> {
    let export =
        enum_export(fixture).with_context(|| format!("no exported enum named {fixture:?}"))?;
    for value in values {
        if !(export.print_native)(*value) {
            anyhow::bail!("{value} does not fit the storage of {fixture}");
        }
    }
    Ok(ExitCode::from(0))
}

fn run_list(config: &FixtureConfig) -> Result<ExitCode> {
    let exclusions = config.exclusions();
    for fixture in ENUM_FIXTURES.iter() {
        let marker = if exclusions.is_excluded(fixture.c_name) {
            " (excluded)"
        } else {
            ""
        };
        println!(
            "{} [{}]{}\n  {}\n  {}",
            fixture.c_name,
            fixture.integer_type.name,
            marker,
            fixture.export.print_symbol,
            fixture.export.return_symbol
        );
    }
    println!(
        "{} [{} bytes on {}]\n  {}",
        OpaqueTypePlatformSpecificSize::C_NAME,
        OpaqueTypePlatformSpecificSize::size_of(),
        TargetPlatform::current(),
        OPAQUE_CALC_SYMBOL
    );
    Ok(ExitCode::from(0))
}

fn resolve_platform(config: &FixtureConfig, flag: Option<String>) -> Result<TargetPlatform> {
    let platform = match flag {
        Some(name) => name
            .parse::<TargetPlatform>()
            .with_context(|| format!("resolving platform {name:?}"))?,
        None => config.target_platform()?,
    };
    Ok(platform)
}

fn emit_json(json: &str, output: Option<PathBuf>) -> Result<()> {
    if let Some(path) = output {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    } else {
        println!("{json}");
    }
    Ok(())
}

fn emit_diff(diff: &VerifyDiff<'_>) -> Result<()> {
    let json = serde_json::to_string_pretty(diff)?;
    eprintln!("{json}");
    Ok(())
}

#[derive(Serialize)]
struct VerifyDiff<'a> {
    artifact: &'a str,
    anomaly_count: usize,
    anomalies: &'a [ffi_fixtures::verify::BindingAnomaly],
}
