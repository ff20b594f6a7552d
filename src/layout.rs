//! Dataset directory layout.
//!
//! ```text
//!  <root>/
//!  ├── figures/
//!  └── data/
//!      ├── data-prep_mocap-of-heels_left.csv
//!      ├── data-prep_mocap-of-heels_right.csv
//!      ├── data-prep_force-plate-center-of-pressure.csv
//!      └── final_data/
//!          ├── StartTimes.csv
//!          └── <session>-Filled-In/     one per participant session
//! ```
//!
//! Analysis scripts run from a sibling of `data/` (e.g. `<root>/notebooks`), so
//! the default root is the parent of the working directory.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::error::{Error, Result};

pub const HEELS_LEFT_FILE: &str = "data-prep_mocap-of-heels_left.csv";
pub const HEELS_RIGHT_FILE: &str = "data-prep_mocap-of-heels_right.csv";
pub const COP_FILE: &str = "data-prep_force-plate-center-of-pressure.csv";
pub const START_TIMES_FILE: &str = "StartTimes.csv";
pub const PARTICIPANT_FOLDER_SUFFIX: &str = "-Filled-In";

/// Root of a dataset tree; every fixed path is derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The parent of the current working directory.
    pub fn from_current_dir() -> Result<Self> {
        let cwd = std::env::current_dir().map_err(|e| Error::io(".", e))?;
        let root = cwd
            .parent()
            .ok_or_else(|| Error::NoDatasetRoot(cwd.clone()))?
            .to_path_buf();
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.join("data")
    }

    pub fn final_data_dir(&self) -> PathBuf {
        self.data_dir().join("final_data")
    }

    /// `(left, right)` heel trajectory files.
    pub fn heel_paths(&self) -> (PathBuf, PathBuf) {
        let data = self.data_dir();
        (data.join(HEELS_LEFT_FILE), data.join(HEELS_RIGHT_FILE))
    }

    pub fn cop_path(&self) -> PathBuf {
        self.data_dir().join(COP_FILE)
    }

    pub fn start_times_path(&self) -> PathBuf {
        self.final_data_dir().join(START_TIMES_FILE)
    }

    pub fn figures_folder(&self) -> PathBuf {
        self.root.join("figures")
    }

    /// Sorted `*-Filled-In` directories under `data/final_data`.
    ///
    /// A missing `final_data` folder yields an empty list.
    pub fn participants_data_folders(&self) -> Result<Vec<PathBuf>> {
        let dir = self.final_data_dir();
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("{} does not exist", dir.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(Error::io(&dir, e)),
        };

        let mut folders = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::io(&dir, e))?;
            let path = entry.path();
            let matches = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(PARTICIPANT_FOLDER_SUFFIX));
            if matches && path.is_dir() {
                folders.push(path);
            }
        }
        folders.sort();
        debug!("found {} participant folders in {}", folders.len(), dir.display());
        Ok(folders)
    }
}

/// Sorted regular files directly inside `folder`.
pub fn trial_files(folder: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(folder).map_err(|e| Error::io(folder, e))? {
        let path = entry.map_err(|e| Error::io(folder, e))?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// `<root>/figures` for the default layout.
pub fn get_figures_folder() -> Result<PathBuf> {
    Ok(DataLayout::from_current_dir()?.figures_folder())
}

/// Participant session folders for the default layout.
pub fn get_participants_data_folders() -> Result<Vec<PathBuf>> {
    DataLayout::from_current_dir()?.participants_data_folders()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_paths_hang_off_the_root() {
        let layout = DataLayout::new("/study");
        let (left, right) = layout.heel_paths();
        assert_eq!(left, Path::new("/study/data/data-prep_mocap-of-heels_left.csv"));
        assert_eq!(right, Path::new("/study/data/data-prep_mocap-of-heels_right.csv"));
        assert_eq!(
            layout.cop_path(),
            Path::new("/study/data/data-prep_force-plate-center-of-pressure.csv")
        );
        assert_eq!(
            layout.start_times_path(),
            Path::new("/study/data/final_data/StartTimes.csv")
        );
        assert_eq!(layout.figures_folder(), Path::new("/study/figures"));
    }

    #[test]
    fn participant_folders_are_globbed_and_sorted() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = DataLayout::new(tmp.path());
        let final_data = layout.final_data_dir();
        for name in ["P2-Filled-In", "P1-Filled-In", "P3-Raw", "notes-Filled-In.txt"] {
            if name.ends_with(".txt") {
                fs::create_dir_all(&final_data).unwrap();
                fs::write(final_data.join(name), "x").unwrap();
            } else {
                fs::create_dir_all(final_data.join(name)).unwrap();
            }
        }

        let folders = layout.participants_data_folders().unwrap();
        assert_eq!(
            folders,
            vec![final_data.join("P1-Filled-In"), final_data.join("P2-Filled-In")]
        );
    }

    #[test]
    fn missing_final_data_gives_no_folders() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = DataLayout::new(tmp.path());
        assert!(layout.participants_data_folders().unwrap().is_empty());
    }

    #[test]
    fn trial_files_skip_directories() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("b.csv"), "").unwrap();
        fs::write(tmp.path().join("a.csv"), "").unwrap();
        fs::create_dir(tmp.path().join("sub")).unwrap();
        let files = trial_files(tmp.path()).unwrap();
        assert_eq!(files, vec![tmp.path().join("a.csv"), tmp.path().join("b.csv")]);
    }
}
