#![allow(dead_code)]

use camino::{Utf8Path, Utf8PathBuf};
use std::fs::{self, File};
use std::io::Write;
use tempfile::TempDir;
use wad_keeper_lib::models::game::GameLayout;
use wad_keeper_lib::{ModEngine, PathResolver};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub const VANILLA_MUSIC: &[u8] = b"vanilla music";
pub const VANILLA_PATCH: &[u8] = b"vanilla patch";

/// Throwaway data root, game data dir, game install and a folder of source files.
pub struct TestEnv {
    pub tmp: TempDir,
    pub home: Utf8PathBuf,
    pub game_data: Utf8PathBuf,
    pub game_dir: Utf8PathBuf,
    pub downloads: Utf8PathBuf,
}

impl TestEnv {
    pub fn resolver(&self) -> PathResolver {
        PathResolver::with_game_data_dir(&self.home, &self.game_data, GameLayout::default())
    }

    pub fn music_path(&self) -> Utf8PathBuf {
        self.game_dir.join("hlm2_music_desktop.wad")
    }

    pub fn live_patch(&self) -> Utf8PathBuf {
        self.game_data.join("patchwad.wad")
    }

    /// Writes a source file into the downloads folder and returns its path.
    pub fn source(&self, name: &str, content: &str) -> Utf8PathBuf {
        let path = self.downloads.join(name);
        write(&path, content.as_bytes());
        path
    }

    /// Opens an engine on this environment and completes first-run setup.
    pub fn engine(&self) -> ModEngine {
        let mut engine = ModEngine::open(self.resolver()).unwrap();
        engine.select_game_folder(&self.game_dir).unwrap();
        engine
    }
}

/// Game install with both archives, a live patch file, and empty data root.
pub fn setup_test_env() -> TestEnv {
    let tmp = tempfile::tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).unwrap();
    // Canonical root so paths compare equal to what setup stores.
    let root = Utf8PathBuf::from_path_buf(dunce::canonicalize(&root).unwrap()).unwrap();

    let home = root.join("home");
    let game_data = root.join("appdata/HotlineMiami2");
    let game_dir = root.join("steam/Hotline Miami 2");
    let downloads = root.join("downloads");

    for dir in [&home, &game_data, &game_dir, &downloads] {
        fs::create_dir_all(dir).unwrap();
    }

    write(&game_dir.join("hlm2_music_desktop.wad"), VANILLA_MUSIC);
    write(&game_dir.join("hlm2_data_desktop.wad"), b"data");
    write(&game_data.join("patchwad.wad"), VANILLA_PATCH);

    TestEnv {
        tmp,
        home,
        game_data,
        game_dir,
        downloads,
    }
}

pub fn write(path: &Utf8Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

pub fn read(path: &Utf8Path) -> String {
    fs::read_to_string(path).unwrap()
}

/// Relative file names under `dir`, sorted.
pub fn list_names(dir: &Utf8Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Writes a zip with the given (entry name, content) pairs. Names ending in
/// '/' become directory entries.
pub fn make_zip(path: &Utf8Path, entries: &[(&str, &str)]) {
    let mut writer = ZipWriter::new(File::create(path).unwrap());
    let options = SimpleFileOptions::default();
    for (name, content) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, options).unwrap();
        } else {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
    }
    writer.finish().unwrap();
}
