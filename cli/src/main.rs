mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use pbit_extract::{ContainerError, ExtractError, WorkspaceError};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "pbit-extract")]
#[command(about = "Extract data-model and layout metadata from Power BI templates")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Extract metadata tables from one or more .pbit archives")]
    Extract {
        #[arg(help = "Paths to .pbit template archives", required = true)]
        archives: Vec<String>,
        #[arg(long, short, value_enum, default_value = "csv", help = "Output format")]
        format: OutputFormat,
        #[arg(
            long,
            short,
            value_name = "DIR",
            help = "Directory for the five CSV files (default: current directory)"
        )]
        out_dir: Option<String>,
        #[arg(
            long,
            value_name = "DIR",
            help = "Directory extraction workspaces are created under (default: system temp)"
        )]
        scratch_dir: Option<String>,
    },
    #[command(about = "Show a summary of a template's metadata")]
    Info {
        #[arg(help = "Path to the template archive")]
        path: String,
        #[arg(long, help = "List table names and storage modes")]
        tables: bool,
    },
}

#[derive(Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Json,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Extract {
            archives,
            format,
            out_dir,
            scratch_dir,
        } => commands::extract::run(
            &archives,
            format,
            out_dir.as_deref(),
            scratch_dir.as_deref(),
        ),
        Commands::Info { path, tables } => commands::info::run(&path, tables),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit_code_for_error(&e)
        }
    }
}

fn exit_code_for_error(err: &anyhow::Error) -> ExitCode {
    if is_internal_error(err) {
        ExitCode::from(3)
    } else {
        ExitCode::from(2)
    }
}

// Pointing the tool at something that is not a template is a usage
// mistake; anything that goes wrong past container validation is ours.
fn is_internal_error(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        if let Some(container_err) = cause.downcast_ref::<ContainerError>() {
            return !is_user_container_error(container_err);
        }
        if let Some(extract_err) = cause.downcast_ref::<ExtractError>() {
            return match extract_err {
                ExtractError::Container(container_err) => {
                    !is_user_container_error(container_err)
                }
                _ => true,
            };
        }
        cause.is::<WorkspaceError>()
    })
}

fn is_user_container_error(err: &ContainerError) -> bool {
    matches!(
        err,
        ContainerError::NotZipContainer | ContainerError::NotTemplate
    )
}
