use crate::models::error::SError;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs::{File, OpenOptions};
use std::io;
use tracing::debug;

pub struct FileIngestor;

impl FileIngestor {
    /// Copies `source` into `destination`, never replacing an existing file.
    /// A taken name gets a numeric suffix: `a.wad`, `a_1.wad`, `a_2.wad`, ...
    pub fn ingest(source: &Utf8Path, destination: &Utf8Path) -> Result<Utf8PathBuf, SError> {
        let file_name = source.file_name().ok_or_else(|| {
            SError::Validation(format!("'{source}' does not name a file"))
        })?;

        let mut reader = File::open(source).map_err(|e| SError::io(source, e))?;
        std::fs::create_dir_all(destination).map_err(|e| SError::io(destination, e))?;

        let stem = Utf8Path::new(file_name).file_stem().unwrap_or(file_name);
        let ext = Utf8Path::new(file_name).extension();

        let mut counter = 0u32;
        loop {
            let candidate = destination.join(Self::suffixed(file_name, stem, ext, counter));

            // create_new makes the existence check and the claim one step
            match OpenOptions::new().write(true).create_new(true).open(&candidate) {
                Ok(mut writer) => {
                    if let Err(e) = io::copy(&mut reader, &mut writer) {
                        drop(writer);
                        let _ = std::fs::remove_file(&candidate);
                        return Err(SError::io(&candidate, e));
                    }
                    debug!("Ingested {source} as {candidate}");
                    return Ok(candidate);
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => counter += 1,
                Err(e) => return Err(SError::io(&candidate, e)),
            }
        }
    }

    fn suffixed(file_name: &str, stem: &str, ext: Option<&str>, counter: u32) -> String {
        match (counter, ext) {
            (0, _) => file_name.to_string(),
            (n, Some(ext)) => format!("{stem}_{n}.{ext}"),
            (n, None) => format!("{stem}_{n}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_goes_before_extension() {
        assert_eq!(FileIngestor::suffixed("a.wad", "a", Some("wad"), 0), "a.wad");
        assert_eq!(FileIngestor::suffixed("a.wad", "a", Some("wad"), 2), "a_2.wad");
        assert_eq!(FileIngestor::suffixed("LICENSE", "LICENSE", None, 1), "LICENSE_1");
    }
}
