use std::fs;
use std::path::{Path, PathBuf};

use crate::tle::error::TleError;
use crate::tle::parsing::{parse_multi_tle, TleRecord};

/// Reads every `.tle` / `.txt` file in a directory.
pub struct TleLoader {
    tle_dir: PathBuf,
}

impl TleLoader {
    pub fn new(tle_dir: PathBuf) -> Self {
        Self { tle_dir }
    }

    /// Load all TLE files from the directory
    pub fn load_all(&self) -> Result<Vec<TleRecord>, TleError> {
        if !self.tle_dir.is_dir() {
            return Err(TleError::DirectoryNotFound(
                self.tle_dir.display().to_string(),
            ));
        }

        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.tle_dir)? {
            let path = entry?.path();
            let is_tle = path
                .extension()
                .map(|ext| ext == "tle" || ext == "txt")
                .unwrap_or(false);
            if path.is_file() && is_tle {
                paths.push(path);
            }
        }
        // Stable order so later files deterministically win on duplicates.
        paths.sort();

        let mut records = Vec::new();
        for path in paths {
            match read_tle_file(&path) {
                Ok(mut parsed) => {
                    log::debug!("{}: {} element sets", path.display(), parsed.len());
                    records.append(&mut parsed);
                }
                Err(e) => {
                    log::warn!("Failed to read TLE file {}: {}", path.display(), e);
                    // Continue with other files
                }
            }
        }

        Ok(records)
    }
}

fn read_tle_file(path: &Path) -> Result<Vec<TleRecord>, TleError> {
    let content = fs::read_to_string(path)?;
    Ok(parse_multi_tle(&content))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("satpass-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn loads_tle_and_txt_files_only() {
        let dir = scratch_dir("loader");
        fs::write(
            dir.join("a.tle"),
            "SAT A\n1 11111U 00001A   20194.0 .0 00000-0 00000-0 0  9990\n2 11111  10.0 0.0 0001 0.0 0.0 15.0 00010\n",
        )
        .unwrap();
        fs::write(
            dir.join("b.txt"),
            "1 22222U 00002A   20194.0 .0 00000-0 00000-0 0  9990\n2 22222  20.0 0.0 0001 0.0 0.0 15.0 00010\n",
        )
        .unwrap();
        fs::write(dir.join("ignored.json"), "{}").unwrap();

        let records = TleLoader::new(dir.clone()).load_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name.as_deref(), Some("SAT A"));
        assert_eq!(records[1].norad_id().as_deref(), Some("22222"));

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = std::env::temp_dir().join("satpass-definitely-missing-dir");
        let err = TleLoader::new(dir).load_all().unwrap_err();
        assert!(matches!(err, TleError::DirectoryNotFound(_)));
    }
}
