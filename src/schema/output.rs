//! JSON snapshots for the `result_output_file` convention.

use std::path::Path;

use serde::Serialize;

use crate::error::{ProviderError, Result};

/// Write a pretty-printed JSON snapshot of a data source result.
///
/// The file is replaced atomically from the caller's point of view: either
/// the old content survives or the new content is fully written.
pub fn write_result_output<T: Serialize>(path: &str, payload: &T) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(payload).map_err(|e| ProviderError::OutputFile {
        path: path.to_string(),
        detail: format!("serialize failed: {e}"),
    })?;

    if let Some(parent) = Path::new(path).parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent).map_err(|e| ProviderError::OutputFile {
            path: path.to_string(),
            detail: format!("create parent dir failed: {e}"),
        })?;
    }

    std::fs::write(path, bytes).map_err(|e| ProviderError::OutputFile {
        path: path.to_string(),
        detail: e.to_string(),
    })?;
    log::debug!("result output written to {path}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Snapshot {
        instance_list: Vec<String>,
    }

    #[test]
    fn writes_pretty_json() {
        let dir = std::env::temp_dir().join(format!("qcloud-output-{}", uuid::Uuid::new_v4()));
        let path = dir.join("result.json");
        let path_str = path.to_string_lossy().to_string();

        let snapshot = Snapshot {
            instance_list: vec!["ins-1".into(), "ins-2".into()],
        };
        write_result_output(&path_str, &snapshot).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"instance_list\""));
        assert!(content.contains("ins-2"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn unwritable_path_reports_output_file_error() {
        let err = write_result_output("/proc/definitely/not/writable.json", &1_u32);
        assert!(matches!(err, Err(ProviderError::OutputFile { .. })));
    }
}
