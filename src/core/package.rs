use crate::models::error::SError;
use crate::utils::file::FileUtils;
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io;
use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// What a mod package contains, read without extracting anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageListing {
    pub mod_name: String,
    /// File entries relative to the mod folder.
    pub files: Vec<Utf8PathBuf>,
}

pub struct ArchivePackager;

impl ArchivePackager {
    /// Zips every file under `mod_folder`. Entry names are relative to the
    /// folder's parent, so they all start with the mod name.
    pub fn pack(mod_folder: &Utf8Path, output: &Utf8Path) -> Result<(), SError> {
        let mods_root = mod_folder
            .parent()
            .ok_or_else(|| SError::Validation(format!("'{mod_folder}' has no parent folder")))?;
        let mod_name = mod_folder
            .file_name()
            .ok_or_else(|| SError::Validation(format!("'{mod_folder}' has no folder name")))?;

        if !mod_folder.is_dir() {
            return Err(SError::FileOrDirectoryNotFound(mod_folder.to_string()));
        }

        if let Some(parent) = output.parent() {
            if !parent.as_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| SError::io(parent, e))?;
            }
        }

        let result = Self::write_archive(mod_folder, mods_root, mod_name, output);
        if result.is_err() {
            let _ = fs::remove_file(output);
        }
        result
    }

    fn write_archive(
        mod_folder: &Utf8Path,
        mods_root: &Utf8Path,
        mod_name: &str,
        output: &Utf8Path,
    ) -> Result<(), SError> {
        let file = File::create(output).map_err(|e| SError::io(output, e))?;
        let mut writer = ZipWriter::new(file);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        // Keeps the top-level folder even for a mod with no files.
        writer.add_directory(format!("{mod_name}/"), options)?;

        for path in FileUtils::list_files(mod_folder)? {
            let rel = path.strip_prefix(mods_root)?;
            let entry_name = Self::entry_name(rel);
            debug!("Packing {path} as {entry_name}");

            writer.start_file(entry_name, options)?;
            let mut src = File::open(&path).map_err(|e| SError::io(&path, e))?;
            io::copy(&mut src, &mut writer).map_err(|e| SError::io(&path, e))?;
        }

        writer.finish()?;
        info!("Packed {mod_folder} into {output}");
        Ok(())
    }

    /// Zip entry names always use forward slashes.
    fn entry_name(rel: &Utf8Path) -> String {
        rel.components()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Reads the entry table and finds the single top-level folder.
    pub fn inspect(archive_path: &Utf8Path) -> Result<PackageListing, SError> {
        let file = File::open(archive_path).map_err(|e| SError::io(archive_path, e))?;
        let mut archive = ZipArchive::new(file)?;

        let mut roots = BTreeSet::new();
        let mut files = Vec::new();

        for i in 0..archive.len() {
            let entry = archive.by_index(i)?;
            let safe_path = Self::safe_entry_path(entry.name(), entry.enclosed_name())?;

            let mut components = safe_path.components();
            let Some(Utf8Component::Normal(root)) = components.next() else {
                return Err(SError::InvalidPackage(format!(
                    "unexpected entry '{}'",
                    entry.name()
                )));
            };
            let rest = components.as_path();

            if !entry.is_dir() && rest.as_str().is_empty() {
                return Err(SError::InvalidPackage(format!(
                    "file '{}' is not inside a mod folder",
                    entry.name()
                )));
            }

            roots.insert(root.to_string());
            if !entry.is_dir() {
                files.push(rest.to_path_buf());
            }
        }

        let mut roots = roots.into_iter();
        match (roots.next(), roots.next()) {
            (Some(mod_name), None) => Ok(PackageListing { mod_name, files }),
            (None, _) => Err(SError::InvalidPackage(format!(
                "'{archive_path}' is empty"
            ))),
            (Some(first), Some(second)) => Err(SError::InvalidPackage(format!(
                "entries are spread over several top-level folders ('{first}', '{second}', ...)"
            ))),
        }
    }

    fn safe_entry_path(
        raw_name: &str,
        enclosed: Option<std::path::PathBuf>,
    ) -> Result<Utf8PathBuf, SError> {
        // enclosed_name() rejects absolute paths and `..` escapes (zip slip)
        enclosed
            .and_then(|p| Utf8PathBuf::from_path_buf(p).ok())
            .ok_or_else(|| SError::InvalidPackage(format!("unsafe entry path '{raw_name}'")))
    }

    /// Validates the package, then extracts it under `mods_root`.
    /// Nothing is written when validation fails.
    pub fn unpack(archive_path: &Utf8Path, mods_root: &Utf8Path) -> Result<String, SError> {
        let listing = Self::inspect(archive_path)?;
        let dest = mods_root.join(&listing.mod_name);
        if dest.exists() {
            return Err(SError::ModAlreadyExists(listing.mod_name));
        }

        if let Err(e) = Self::extract(archive_path, mods_root) {
            FileUtils::remove_dir_if_exists(&dest)?;
            return Err(e);
        }

        info!("Unpacked {archive_path} into {dest}");
        Ok(listing.mod_name)
    }

    fn extract(archive_path: &Utf8Path, destination: &Utf8Path) -> Result<(), SError> {
        let file = File::open(archive_path).map_err(|e| SError::io(archive_path, e))?;
        let mut archive = ZipArchive::new(file)?;

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            let safe_path = Self::safe_entry_path(entry.name(), entry.enclosed_name())?;
            let output_path = destination.join(&safe_path);

            if entry.is_dir() {
                fs::create_dir_all(&output_path).map_err(|e| SError::io(&output_path, e))?;
                continue;
            }

            if let Some(parent) = output_path.parent() {
                fs::create_dir_all(parent).map_err(|e| SError::io(parent, e))?;
            }
            let mut outfile =
                File::create(&output_path).map_err(|e| SError::io(&output_path, e))?;
            io::copy(&mut entry, &mut outfile).map_err(|e| SError::io(&output_path, e))?;
        }

        Ok(())
    }
}
