use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::StoreError;

/// Encodes `value` next to `path` and renames it into place, so readers
/// see either the old document or the new one.
pub(crate) fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let write_error = |source: io::Error| StoreError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_error)?;
    }

    let tmp_path = temp_path_for(path);
    let result = write_temp(&tmp_path, value, path).and_then(|()| {
        fs::rename(&tmp_path, path).map_err(write_error)
    });
    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

fn write_temp<T: Serialize>(tmp_path: &Path, value: &T, path: &Path) -> Result<(), StoreError> {
    let write_error = |source: io::Error| StoreError::Write {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(tmp_path).map_err(write_error)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|source| StoreError::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    writer.write_all(b"\n").map_err(write_error)?;
    let file = writer
        .into_inner()
        .map_err(|error| write_error(error.into_error()))?;
    file.sync_all().map_err(write_error)
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "prefs".into());
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn replaces_existing_document_and_leaves_no_temp() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("nested").join("prefs.json");

        write_json_atomic(&path, &BTreeMap::from([("Level", 1)])).expect("first write");
        write_json_atomic(&path, &BTreeMap::from([("Level", 2)])).expect("second write");

        let text = fs::read_to_string(&path).expect("read");
        assert!(text.contains("\"Level\": 2"));
        assert!(!temp_path_for(&path).exists());
    }

    #[test]
    fn temp_file_sits_beside_the_target() {
        let path = Path::new("save").join("audio.json");
        assert_eq!(temp_path_for(&path), Path::new("save").join("audio.json.tmp"));
    }
}
