//! FluentConf CLI - Container entrypoint for configuration generation
//!
//! Commands: generate, render, validate
//! Settings come from the environment, optionally layered over a JSON file.
//! Reports go to stdout as JSON; diagnostics go to stderr.
//! Returns 2 on conflicting settings, 1 on any other failure.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use fluentconf_core::{
    logging::{init_tracing, LogFormat},
    ArtifactTargets, CompiledConfig, ConfigPipeline, EnvSource, FsArtifactWriter, PipelineError,
    Settings,
    DEFAULT_MAIN_CONFIG_PATH, DEFAULT_MULTILINE_CONFIG_PATH, DEFAULT_PLUGIN_PATH,
};

#[derive(Parser)]
#[command(name = "fluentconf-cli")]
#[command(about = "FluentConf CLI - Log Shipper Configuration Compiler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON file of settings; environment variables override it
    #[arg(short, long, global = true)]
    settings: Option<PathBuf>,

    /// Diagnostic verbosity when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Diagnostic output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the plugin, compile and write the configuration files
    Generate {
        /// Main configuration destination
        #[arg(long, default_value = DEFAULT_MAIN_CONFIG_PATH)]
        output: PathBuf,

        /// Multiline parser destination
        #[arg(long, default_value = DEFAULT_MULTILINE_CONFIG_PATH)]
        multiline_output: PathBuf,

        /// Output plugin that must exist before generating
        #[arg(long, default_value = DEFAULT_PLUGIN_PATH)]
        plugin: PathBuf,

        /// Skip the plugin presence check
        #[arg(long)]
        skip_plugin_check: bool,
    },

    /// Compile and print a document without writing anything
    Render {
        /// Print the multiline parser document instead of the main one
        #[arg(long)]
        multiline: bool,
    },

    /// Check settings for conflicting options
    Validate,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(&cli.log_level, cli.log_format) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    let settings = match Settings::load(cli.settings.as_deref(), &EnvSource) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let pipeline = ConfigPipeline::new();

    match cli.command {
        Commands::Generate {
            output,
            multiline_output,
            plugin,
            skip_plugin_check,
        } => {
            let targets = ArtifactTargets {
                main: output,
                multiline: multiline_output,
                plugin: (!skip_plugin_check).then_some(plugin),
            };

            match pipeline.generate(&settings, &targets, &mut FsArtifactWriter) {
                Ok(report) => {
                    let output = serde_json::json!({
                        "success": true,
                        "report": report,
                    });
                    ExitCode::from(printed_status(print_json(&output), 0))
                }
                Err(e) => {
                    tracing::error!("{}", e);
                    let output = serde_json::json!({
                        "success": false,
                        "error": e.to_string(),
                    });
                    let _ = printed_status(print_json(&output), 1);
                    exit_code(&e)
                }
            }
        }

        Commands::Render { multiline } => match pipeline.compile(&settings) {
            Ok(compiled) => {
                match select_document(compiled, multiline) {
                    Some(document) => print!("{document}"),
                    None => tracing::warn!(
                        "No multiline document produced: MULTILINE_START_STATE_RULE is empty"
                    ),
                }
                ExitCode::SUCCESS
            }
            Err(e) => {
                tracing::error!("{}", e);
                exit_code(&e)
            }
        },

        Commands::Validate => {
            let result = pipeline.check_settings(&settings);
            let status = if result.valid { 0 } else { 2 };  // 2: conflicting settings
            ExitCode::from(printed_status(print_json(&result), status))
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), serde_json::Error> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

/// `status` if the JSON was printed, 1 if serialization failed.
fn printed_status(printed: Result<(), serde_json::Error>, status: u8) -> u8 {
    match printed {
        Ok(()) => status,
        Err(e) => {
            tracing::error!("Failed to serialize output: {}", e);
            1
        }
    }
}

/// The requested document; `None` when the multiline one was not produced.
fn select_document(compiled: CompiledConfig, multiline: bool) -> Option<String> {
    if multiline {
        compiled.multiline
    } else {
        Some(compiled.main)
    }
}

fn exit_code(err: &PipelineError) -> ExitCode {
    match err {
        PipelineError::Conflict(_) => ExitCode::from(2),
        _ => ExitCode::FAILURE,
    }
}
