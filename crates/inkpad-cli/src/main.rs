//! inkpad CLI - Markdown notes from the terminal
//!
//! Create, edit, search, and export notes stored in the local data directory.

mod cli;
mod commands;
mod error;


use clap::{CommandFactory, Parser};
use inkpad_core::Toaster;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::common::{load_config, resolve_data_dir, spawn_toast_printer, Context};
use crate::commands::completions::run_completions;
use crate::commands::delete::run_delete;
use crate::commands::edit::run_edit;
use crate::commands::export::{
    fallback_export_dir, run_export, stdin_is_interactive, ExportArgs,
};
use crate::commands::list::run_list;
use crate::commands::new::run_new;
use crate::commands::show::run_show;
use crate::error::CliError;

const DEFAULT_LOG_FILTER: &str = "inkpad=warn";

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    if let Commands::Completions { shell, output } = &command {
        return run_completions(*shell, output.as_deref());
    }

    let config = load_config(cli.config.as_deref())?;
    let data_dir = resolve_data_dir(cli.data_dir, &config)?;
    let toaster = Toaster::new(config.toast_duration());
    let printer = spawn_toast_printer(&toaster);

    let ctx = Context {
        data_dir,
        config,
        toaster,
    };
    let result = dispatch(command, &ctx).await;

    // Closing the last toaster ends the printer once it has drained.
    drop(ctx);
    let _ = printer.await;

    result
}

async fn dispatch(command: Commands, ctx: &Context) -> Result<(), CliError> {
    match command {
        Commands::New { title, content } => run_new(title, &content, ctx),
        Commands::List {
            search,
            limit,
            json,
        } => run_list(search.as_deref(), limit, json, ctx),
        Commands::Show { id } => run_show(&id, ctx),
        Commands::Edit { id, title, content } => run_edit(&id, title, content, ctx),
        Commands::Delete { id } => run_delete(&id, ctx),
        Commands::Export {
            id,
            format,
            view,
            output,
            force,
        } => {
            let args = ExportArgs {
                id,
                format,
                view,
                output,
                force,
                interactive: stdin_is_interactive(),
                fallback_dir: fallback_export_dir(),
            };
            run_export(args, ctx).await
        }
        Commands::Completions { shell, output } => run_completions(shell, output.as_deref()),
    }
}
