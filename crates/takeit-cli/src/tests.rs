use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use clap::{CommandFactory, Parser};
use pretty_assertions::assert_eq;
use takeit_core::db::{Database, NoteRepository, SqliteNoteRepository};
use takeit_core::{BackupManager, ConflictStrategy, NoteId, StoreConfig};
use tempfile::{tempdir, TempDir};

use clap_complete::Shell;
use takeit_core::{Tag, TagId};

use crate::cli::{BackupCommands, Cli, Commands, StrategyArg, TagCommands};
use crate::commands::add::run_add;
use crate::commands::backup::{run_backup_clear, run_backup_create, run_backup_delete};
use crate::commands::common::{
    format_relative_time, format_tag_lines, normalize_content, parse_note_id, resolve_data_dir,
    tag_to_list_item,
};
use crate::commands::completions::run_completions;
use crate::commands::delete::run_delete;
use crate::commands::export::run_export;
use crate::commands::list::run_list;
use crate::commands::merge::run_merge;
use crate::commands::restore::run_restore;
use crate::commands::tag::{run_tag_color, run_tag_list};
use crate::commands::trash::{run_trash_purge, run_trash_restore};
use crate::error::CliError;

fn setup() -> (TempDir, StoreConfig, BackupManager) {
    let dir = tempdir().unwrap();
    let config = StoreConfig::from_data_dir(dir.path());
    let manager = BackupManager::new(config.clone());
    (dir, config, manager)
}

fn words(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

fn notes(config: &StoreConfig) -> Vec<(String, Vec<String>)> {
    let db = Database::open(&config.data_path).unwrap();
    SqliteNoteRepository::new(db.connection())
        .list()
        .unwrap()
        .into_iter()
        .map(|note| (note.content, note.tags))
        .collect()
}

fn only_note_id(config: &StoreConfig) -> String {
    let db = Database::open(&config.data_path).unwrap();
    let notes = SqliteNoteRepository::new(db.connection()).list().unwrap();
    assert_eq!(notes.len(), 1);
    notes[0].id.to_string()
}

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn merge_strategy_defaults_to_keep_newer() {
    let cli = Cli::try_parse_from(["takeit", "merge", "notes_backup_20240101_120000.db"]).unwrap();
    let Some(Commands::Merge { name, strategy }) = cli.command else {
        panic!("expected merge command");
    };
    assert_eq!(name, "notes_backup_20240101_120000.db");
    assert_eq!(strategy, StrategyArg::KeepNewer);
    assert_eq!(ConflictStrategy::from(strategy), ConflictStrategy::KeepNewer);
}

#[test]
fn merge_strategy_accepts_kebab_case_values() {
    let cli = Cli::try_parse_from(["takeit", "merge", "x.db", "--strategy", "keep-current"]).unwrap();
    let Some(Commands::Merge { strategy, .. }) = cli.command else {
        panic!("expected merge command");
    };
    assert_eq!(ConflictStrategy::from(strategy), ConflictStrategy::KeepCurrent);
}

#[test]
fn export_requires_a_source() {
    assert!(Cli::try_parse_from(["takeit", "export"]).is_err());
    assert!(Cli::try_parse_from(["takeit", "export", "--live"]).is_ok());
}

#[test]
fn data_dir_flag_is_global() {
    let cli = Cli::try_parse_from(["takeit", "backup", "create", "--auto", "--data-dir", "/tmp/x"])
        .unwrap();
    assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/x")));
    assert!(matches!(
        cli.command,
        Some(Commands::Backup {
            command: BackupCommands::Create { auto: true }
        })
    ));
}

#[test]
fn resolve_data_dir_prefers_flag() {
    let explicit = PathBuf::from("/explicit/dir");
    assert_eq!(resolve_data_dir(Some(explicit.clone())), explicit);
}

#[test]
fn normalize_content_trims_and_rejects_empty() {
    assert_eq!(normalize_content("  hello  "), Some("hello".to_string()));
    assert_eq!(normalize_content(" \n\t "), None);
}

#[test]
fn parse_note_id_rejects_garbage() {
    assert_eq!(parse_note_id(" 42 ").unwrap(), NoteId(42));
    assert!(matches!(
        parse_note_id("abc"),
        Err(CliError::InvalidNoteId(id)) if id == "abc"
    ));
}

#[test]
fn format_relative_time_units() {
    let now = 10_000_000;
    assert_eq!(format_relative_time(now - 30_000, now), "just now");
    assert_eq!(format_relative_time(now - 120_000, now), "2m ago");
    assert_eq!(format_relative_time(now - 2 * 60 * 60_000, now), "2h ago");
}

#[test]
fn run_add_saves_note_with_tags() {
    let (_dir, config, _manager) = setup();

    run_add(&words("buy  milk"), &["errands".to_string(), " ".to_string()], &config).unwrap();

    assert_eq!(
        notes(&config),
        vec![("buy milk".to_string(), vec!["errands".to_string()])]
    );
}

#[test]
fn run_add_rejects_empty_content() {
    let (_dir, config, _manager) = setup();
    assert!(matches!(
        run_add(&words("   "), &[], &config),
        Err(CliError::EmptyContent)
    ));
}

#[test]
fn run_delete_and_trash_restore_round_trip() {
    let (_dir, config, _manager) = setup();
    run_add(&words("temporary"), &[], &config).unwrap();
    let id = only_note_id(&config);

    run_delete(&id, &config).unwrap();
    assert!(notes(&config).is_empty());

    run_trash_restore(&id, &config).unwrap();
    assert_eq!(notes(&config).len(), 1);
}

#[test]
fn run_trash_purge_uses_configured_retention() {
    let (_dir, config, manager) = setup();
    run_add(&words("fresh trash"), &[], &config).unwrap();
    let id = only_note_id(&config);
    run_delete(&id, &config).unwrap();

    run_trash_purge(None, &manager).unwrap();
    let db = Database::open(&config.data_path).unwrap();
    assert_eq!(
        SqliteNoteRepository::new(db.connection())
            .list_deleted()
            .unwrap()
            .len(),
        1
    );

    // Zero-day retention only removes notes deleted strictly before now
    thread::sleep(Duration::from_millis(5));
    run_trash_purge(Some(0), &manager).unwrap();
    assert!(SqliteNoteRepository::new(db.connection())
        .list_deleted()
        .unwrap()
        .is_empty());
}

#[test]
fn backup_create_delete_and_clear() {
    let (_dir, config, manager) = setup();
    run_add(&words("snapshot me"), &[], &config).unwrap();

    run_backup_create(false, &manager).unwrap();
    run_backup_create(true, &manager).unwrap();
    let backups = manager.list_backups();
    assert_eq!(backups.len(), 2);

    run_backup_delete(&backups[0].file_name, &manager).unwrap();
    assert_eq!(manager.list_backups().len(), 1);

    run_backup_clear(&manager).unwrap();
    assert!(manager.list_backups().is_empty());
}

#[test]
fn backup_delete_rejects_unknown_name() {
    let (_dir, _config, manager) = setup();
    assert!(matches!(
        run_backup_delete("notes.db", &manager),
        Err(CliError::Core(takeit_core::Error::InvalidInput(_)))
    ));
    assert!(matches!(
        run_backup_delete("notes_backup_20240101_120000.db", &manager),
        Err(CliError::Core(takeit_core::Error::NotFound(_)))
    ));
}

#[test]
fn run_restore_rolls_back_later_notes() {
    let (_dir, config, manager) = setup();
    run_add(&words("before"), &[], &config).unwrap();
    let snapshot = manager.snapshots().create(false).unwrap();
    run_add(&words("after"), &[], &config).unwrap();

    run_restore(&snapshot.file_name, &manager).unwrap();

    assert_eq!(notes(&config), vec![("before".to_string(), Vec::new())]);
}

#[test]
fn run_merge_brings_back_deleted_notes() {
    let (_dir, config, manager) = setup();
    run_add(&words("keep me"), &["work".to_string()], &config).unwrap();
    let snapshot = manager.snapshots().create(false).unwrap();

    let db = Database::open(&config.data_path).unwrap();
    let repo = SqliteNoteRepository::new(db.connection());
    let id = repo.list().unwrap()[0].id;
    repo.permanent_delete(&[id]).unwrap();
    drop(db);
    assert!(notes(&config).is_empty());

    run_merge(&snapshot.file_name, ConflictStrategy::KeepCurrent, &manager).unwrap();

    assert_eq!(
        notes(&config),
        vec![("keep me".to_string(), vec!["work".to_string()])]
    );
}

#[test]
fn run_merge_unknown_backup_is_an_error() {
    let (_dir, config, manager) = setup();
    run_add(&words("live"), &[], &config).unwrap();

    assert!(run_merge(
        "notes_backup_20240101_120000.db",
        ConflictStrategy::KeepNewer,
        &manager
    )
    .is_err());
}

#[test]
fn run_export_writes_raw_bytes() {
    let (dir, config, manager) = setup();
    run_add(&words("export me"), &[], &config).unwrap();
    let snapshot = manager.snapshots().create(false).unwrap();

    let live_out = dir.path().join("live-copy.db");
    run_export(None, true, Some(&live_out), &manager).unwrap();
    assert_eq!(fs::read(&live_out).unwrap(), fs::read(&config.data_path).unwrap());

    let backup_out = dir.path().join("backup-copy.db");
    run_export(Some(&snapshot.file_name), false, Some(&backup_out), &manager).unwrap();
    assert_eq!(fs::read(&backup_out).unwrap(), fs::read(&snapshot.path).unwrap());
}

#[test]
fn run_export_of_missing_live_store_creates_no_file() {
    let (dir, _config, manager) = setup();
    let out = dir.path().join("live-copy.db");

    let err = run_export(None, true, Some(&out), &manager).unwrap_err();

    assert!(matches!(err, CliError::Core(takeit_core::Error::MissingSource(_))));
    assert!(!out.exists());
}

#[test]
fn run_completions_writes_script_named_after_binary() {
    let dir = tempdir().unwrap();
    let out_dir = dir.path().join("completions");

    run_completions(Shell::Bash, Some(&out_dir)).unwrap();
    run_completions(Shell::Fish, Some(&out_dir)).unwrap();

    let bash = fs::read_to_string(out_dir.join("takeit.bash")).unwrap();
    assert!(bash.contains("takeit"));
    assert!(bash.contains("merge"));
    assert!(out_dir.join("takeit.fish").is_file());
}

#[test]
fn completions_accepts_powershell() {
    let cli = Cli::try_parse_from(["takeit", "completions", "powershell"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Completions {
            shell: Shell::PowerShell,
            output_dir: None
        })
    ));
}

#[test]
fn list_tag_filter_parses() {
    let cli = Cli::try_parse_from(["takeit", "list", "--tag", "work", "--json"]).unwrap();
    let Some(Commands::List { tag, json }) = cli.command else {
        panic!("expected list command");
    };
    assert_eq!(tag.as_deref(), Some("work"));
    assert!(json);
}

#[test]
fn run_list_filters_by_tag() {
    let (_dir, config, _manager) = setup();
    run_add(&words("ship it"), &words("work"), &config).unwrap();
    thread::sleep(Duration::from_millis(5));
    run_add(&words("buy milk"), &words("home"), &config).unwrap();

    run_list(Some("work"), false, &config).unwrap();
    run_list(Some("  "), true, &config).unwrap();

    let db = Database::open(&config.data_path).unwrap();
    let tagged = SqliteNoteRepository::new(db.connection())
        .list_by_tag("work")
        .unwrap();
    assert_eq!(tagged.len(), 1);
    assert_eq!(tagged[0].content, "ship it");
}

#[test]
fn tag_color_command_parses() {
    let cli = Cli::try_parse_from(["takeit", "tag", "color", "work", "#4caf50"]).unwrap();
    let Some(Commands::Tag {
        command: TagCommands::Color { name, color },
    }) = cli.command
    else {
        panic!("expected tag color command");
    };
    assert_eq!(name, "work");
    assert_eq!(color, "#4caf50");
}

#[test]
fn run_tag_color_updates_existing_tag() {
    let (_dir, config, _manager) = setup();
    run_add(&words("ship it"), &words("work"), &config).unwrap();

    run_tag_color("work", "#4caf50", &config).unwrap();
    run_tag_list(false, &config).unwrap();

    let db = Database::open(&config.data_path).unwrap();
    let tags = SqliteNoteRepository::new(db.connection()).list_tags().unwrap();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].color, "#4CAF50");
}

#[test]
fn run_tag_color_rejects_bad_input() {
    let (_dir, config, _manager) = setup();
    run_add(&words("ship it"), &words("work"), &config).unwrap();

    assert!(run_tag_color("work", "green", &config).is_err());
    assert!(run_tag_color("missing", "#4CAF50", &config).is_err());
}

#[test]
fn tag_lines_show_readable_text_color() {
    let tag = |id, name: &str, color: &str| Tag {
        id: TagId(id),
        name: name.to_string(),
        color: color.to_string(),
    };
    let tags = vec![tag(1, "light", "#FFEB3B"), tag(2, "dark", "#212121")];

    let lines = format_tag_lines(&tags);
    assert!(lines[0].starts_with("light"));
    assert!(lines[0].ends_with("text #000000"));
    assert!(lines[1].ends_with("text #FFFFFF"));

    let item = tag_to_list_item(&tags[1]);
    assert_eq!(item.text_color, "#FFFFFF");
}
