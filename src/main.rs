use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use std::process::ExitCode;
use wad_keeper_lib::config::AppSettings;
use wad_keeper_lib::core::cleanup;
use wad_keeper_lib::models::mod_dto::ModEdit;
use wad_keeper_lib::utils::logging;
use wad_keeper_lib::{ModEngine, PathResolver, SError};

#[derive(Parser)]
#[command(name = "wad_keeper")]
#[command(about = "Keeps one Hotline Miami 2 mod active at a time, with the vanilla files backed up")]
#[command(version)]
struct Cli {
    /// Data root for stored mods, backups and state (overrides the settings file)
    #[arg(long, global = true)]
    home: Option<Utf8PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Select the game installation folder (or its music .wad)
    Setup { path: Utf8PathBuf },
    /// List installed mods
    List,
    /// Show the active mod and setup state
    Status,
    /// Install a mod from .patchwad / .wad files
    Install {
        name: String,
        #[arg(required = true)]
        files: Vec<Utf8PathBuf>,
    },
    /// Rename a mod or change its files
    Edit {
        name: String,
        #[arg(long)]
        rename: Option<String>,
        #[arg(long = "add")]
        add: Vec<Utf8PathBuf>,
        /// Stored path or file name to delete from the mod
        #[arg(long = "remove")]
        remove: Vec<Utf8PathBuf>,
    },
    /// Delete a mod (restores vanilla first if it is active)
    Delete { name: String },
    /// Import a mod package (.zip)
    Import { archive: Utf8PathBuf },
    /// Export a mod as a package (.zip)
    Export { name: String, output: Utf8PathBuf },
    /// Make a mod the active one
    Activate { name: String },
    /// Put the original game files back
    Restore,
    /// Back up the current live files if no backup exists yet
    Backup,
    /// Find (and by default delete) leftovers in mod storage
    Cleanup {
        #[arg(long)]
        dry_run: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut settings = match AppSettings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load settings: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(home) = cli.home.clone() {
        settings.home = home;
    }
    if cli.verbose {
        settings.log_level = "debug".into();
    }

    let paths = PathResolver::new(&settings.home, settings.layout.clone());
    let _guard = logging::init(paths.log_dir(), &settings.log_level);

    match run(cli.command, paths) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command, paths: PathResolver) -> Result<(), SError> {
    let mut engine = ModEngine::open(paths)?;

    match command {
        Command::Setup { path } => {
            let music = engine.select_game_folder(&path)?;
            println!("Game music file: {music}");
        }
        Command::List => {
            for m in engine.mods() {
                let marker = if engine.is_active(&m.name) { "*" } else { " " };
                let patches: Vec<_> = m.patch_files.iter().filter_map(|p| p.file_name()).collect();
                let music = m.music_file.as_ref().and_then(|p| p.file_name()).unwrap_or("-");
                println!("{marker} {}  patch: [{}]  music: {music}", m.name, patches.join(", "));
            }
        }
        Command::Status => {
            match engine.live_music_path() {
                Some(p) => println!("Game music file: {p}"),
                None => println!("Game folder not selected yet, run `wad_keeper setup <path>`"),
            }
            println!("Active: {}", engine.active_mod_name().unwrap_or("vanilla"));
        }
        Command::Install { name, files } => {
            let m = engine.install(&name, &files)?;
            println!("Installed '{}'", m.name);
        }
        Command::Edit {
            name,
            rename,
            add,
            remove,
        } => {
            let m = engine.edit(
                &name,
                ModEdit {
                    new_name: rename,
                    add_files: add,
                    remove_files: remove,
                },
            )?;
            println!("Updated '{}'", m.name);
            if engine.is_active(&m.name) {
                println!("'{}' is active; activate it again to apply file changes", m.name);
            }
        }
        Command::Delete { name } => {
            engine.delete(&name)?;
            println!("Deleted '{name}'");
        }
        Command::Import { archive } => {
            let m = engine.import_package(&archive)?;
            println!("Mod '{}' installed successfully", m.name);
        }
        Command::Export { name, output } => {
            engine.export_package(&name, &output)?;
            println!("Exported '{name}' to {output}");
        }
        Command::Activate { name } => {
            engine.activate(&name)?;
            println!("Active: {name}");
        }
        Command::Restore => {
            let report = engine.restore_vanilla()?;
            if !report.is_complete() {
                println!("Some files had no backup and were left as they are: {report:?}");
            }
            println!("Active: vanilla");
        }
        Command::Backup => {
            let report = engine.backup_vanilla()?;
            println!("Backup: {report:?}");
        }
        Command::Cleanup { dry_run } => {
            let orphans = if dry_run {
                cleanup::find_orphans(&engine)?
            } else {
                engine.purge_orphans()?
            };
            for p in orphans.folders.iter().chain(orphans.files.iter()) {
                println!("{}{p}", if dry_run { "would remove " } else { "removed " });
            }
        }
    }

    Ok(())
}
