//! TakeIt CLI - notes, backups and backup merges from the command line

mod cli;
mod commands;
mod error;
#[cfg(test)]
mod tests;

use clap::{CommandFactory, Parser};
use takeit_core::BackupManager;

use crate::cli::{BackupCommands, Cli, Commands, TagCommands, TrashCommands};
use crate::commands::add::run_add;
use crate::commands::backup::{
    run_backup_clear, run_backup_create, run_backup_delete, run_backup_list,
};
use crate::commands::common::{load_store_config, resolve_data_dir};
use crate::commands::completions::run_completions;
use crate::commands::delete::run_delete;
use crate::commands::export::run_export;
use crate::commands::list::run_list;
use crate::commands::merge::run_merge;
use crate::commands::restore::run_restore;
use crate::commands::tag::{run_tag_color, run_tag_list};
use crate::commands::trash::{run_trash_list, run_trash_purge, run_trash_restore};
use crate::commands::upgrade::run_upgrade;
use crate::error::CliError;

fn main() {
    if let Err(error) = run() {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("takeit=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    if let Commands::Completions { shell, output_dir } = &command {
        return run_completions(*shell, output_dir.as_deref());
    }

    let data_dir = resolve_data_dir(cli.data_dir);
    let config = load_store_config(&data_dir)?;
    let manager = BackupManager::new(config.clone());

    match command {
        Commands::Add { content, tags } => run_add(&content, &tags, &config)?,
        Commands::List { tag, json } => run_list(tag.as_deref(), json, &config)?,
        Commands::Delete { id } => run_delete(&id, &config)?,
        Commands::Tag { command } => match command {
            TagCommands::List { json } => run_tag_list(json, &config)?,
            TagCommands::Color { name, color } => run_tag_color(&name, &color, &config)?,
        },
        Commands::Trash { command } => match command {
            TrashCommands::List { json } => run_trash_list(json, &config)?,
            TrashCommands::Restore { id } => run_trash_restore(&id, &config)?,
            TrashCommands::Purge { retention_days } => {
                run_trash_purge(retention_days, &manager)?;
            }
        },
        Commands::Backup { command } => match command {
            BackupCommands::Create { auto } => run_backup_create(auto, &manager)?,
            BackupCommands::List { json } => run_backup_list(json, &manager)?,
            BackupCommands::Delete { name } => run_backup_delete(&name, &manager)?,
            BackupCommands::Clear => run_backup_clear(&manager)?,
        },
        Commands::Restore { name } => run_restore(&name, &manager)?,
        Commands::Merge { name, strategy } => run_merge(&name, strategy.into(), &manager)?,
        Commands::Export { name, live, output } => {
            run_export(name.as_deref(), live, output.as_deref(), &manager)?;
        }
        Commands::Upgrade => run_upgrade(&manager)?,
        Commands::Completions { .. } => {}
    }

    Ok(())
}
