// crates/seismark-media/src/scan.rs
//
// Folder → trace groups. Stateless; the Workbench keeps the result.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use seismark_core::media_types::{ScanMode, TraceGroup};

use crate::error::ScanError;

pub const WAVEFORM_EXTENSIONS: [&str; 3] = ["sac", "mseed", "miniseed"];

pub fn is_waveform_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| WAVEFORM_EXTENSIONS.iter().any(|w| ext.eq_ignore_ascii_case(w)))
}

/// Walk `folder` and group its waveform files. A folder without any matching
/// files gives an empty list, not an error.
pub fn scan(folder: &Path, mode: ScanMode) -> Result<Vec<TraceGroup>, ScanError> {
    if !folder.is_dir() {
        return Err(ScanError::NotAFolder(folder.to_path_buf()));
    }

    let mut groups: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    for entry in WalkDir::new(folder).sort_by_file_name() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("[scan] skipping unreadable entry: {e}");
                continue;
            }
        };
        if !entry.file_type().is_file() || !is_waveform_file(entry.path()) {
            continue;
        }
        let Some(key) = group_key(folder, entry.path(), mode) else {
            debug!("[scan] {} has no group in {mode:?} mode", entry.path().display());
            continue;
        };
        groups.entry(key).or_default().push(entry.into_path());
    }

    let mut out: Vec<TraceGroup> = groups
        .into_iter()
        .map(|(group_key, mut paths)| {
            paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
            TraceGroup { group_key, component_file_paths: paths }
        })
        .collect();

    if mode == ScanMode::FilenamePrefix {
        out.sort_by(|a, b| prefix_order(&a.group_key).cmp(&prefix_order(&b.group_key)));
    }

    info!("[scan] {} groups in {} ({mode:?})", out.len(), folder.display());
    Ok(out)
}

/// The group a file belongs to, or `None` if the mode has no place for it.
pub fn group_key(folder: &Path, file: &Path, mode: ScanMode) -> Option<String> {
    match mode {
        ScanMode::EventStation => {
            let rel = file.parent()?.strip_prefix(folder).ok()?;
            let parts: Vec<String> = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            if parts.len() < 2 {
                return None;
            }
            Some(format!("{}/{}", parts[0], parts[parts.len() - 1]))
        }
        ScanMode::FilenamePrefix => {
            let name = file.file_name()?.to_str()?;
            let prefix = name.split('.').next().filter(|p| !p.is_empty())?;
            Some(prefix.to_string())
        }
    }
}

/// The first run of ASCII digits in `key`.
pub fn first_integer(key: &str) -> Option<u64> {
    let start = key.find(|c: char| c.is_ascii_digit())?;
    let digits: String = key[start..].chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// Numeric keys first by value, then keys without digits; ties lexical.
fn prefix_order(key: &str) -> (bool, u64, &str) {
    match first_integer(key) {
        Some(n) => (false, n, key),
        None    => (true, 0, key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Path, rel: &str) {
        let p = root.join(rel);
        fs::create_dir_all(p.parent().unwrap()).unwrap();
        fs::write(p, b"").unwrap();
    }

    #[test]
    fn empty_folder_yields_no_groups() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "notes.txt");
        assert!(scan(dir.path(), ScanMode::EventStation).unwrap().is_empty());
        assert!(scan(dir.path(), ScanMode::FilenamePrefix).unwrap().is_empty());
    }

    #[test]
    fn missing_folder_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            scan(&dir.path().join("nope"), ScanMode::EventStation),
            Err(ScanError::NotAFolder(_))
        ));
    }

    #[test]
    fn event_station_groups_by_first_and_last_folder() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "eq002/STA1/XX.STA1..BHZ.sac");
        touch(dir.path(), "eq001/STA1/XX.STA1..BHZ.SAC");
        touch(dir.path(), "eq001/STA1/XX.STA1..BHE.sac");
        touch(dir.path(), "eq001/raw/STA2/XX.STA2..BHZ.sac");
        touch(dir.path(), "eq001/loose.sac");
        touch(dir.path(), "eq001/STA1/readme.md");

        let groups = scan(dir.path(), ScanMode::EventStation).unwrap();
        let keys: Vec<&str> = groups.iter().map(|g| g.group_key.as_str()).collect();
        assert_eq!(keys, ["eq001/STA1", "eq001/STA2", "eq002/STA1"]);

        let names: Vec<String> = groups[0]
            .component_file_paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["XX.STA1..BHE.sac", "XX.STA1..BHZ.SAC"]);
    }

    #[test]
    fn filename_prefix_groups_are_numerically_ordered() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "ev10.BHZ.sac");
        touch(dir.path(), "ev10.BHN.mseed");
        touch(dir.path(), "ev9.BHZ.sac");
        touch(dir.path(), "sub/ev100.HHZ.miniseed");
        touch(dir.path(), "calib.BHZ.sac");

        let groups = scan(dir.path(), ScanMode::FilenamePrefix).unwrap();
        let keys: Vec<&str> = groups.iter().map(|g| g.group_key.as_str()).collect();
        assert_eq!(keys, ["ev9", "ev10", "ev100", "calib"]);
        assert_eq!(groups[1].component_file_paths.len(), 2);
    }

    #[test]
    fn first_integer_finds_leading_digit_run() {
        assert_eq!(first_integer("ev0042b7"), Some(42));
        assert_eq!(first_integer("none"), None);
    }
}
