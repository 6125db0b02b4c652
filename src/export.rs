// CSV export of grouping results.
//
// The output is UTF-8 with a byte-order-mark prefix so spreadsheet tools
// decode it correctly, a `GroupNumber,Name` header, and one row per group
// member. The `csv` writer quotes any field containing a comma, quote, or
// newline.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::group::Group;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// UTF-8 byte order mark (EF BB BF).
pub const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Header row of the exported table.
pub const CSV_HEADER: [&str; 2] = ["GroupNumber", "Name"];

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),
}

// ---------------------------------------------------------------------------
// Serialization
// ---------------------------------------------------------------------------

/// Serialize groups to CSV bytes: BOM prefix, header row, then one
/// `(group id, member)` row per member in group order then member order.
pub fn serialize_groups(groups: &[Group]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(CSV_HEADER)?;
    for group in groups {
        for member in &group.members {
            writer.write_record([group.id.to_string(), member.clone()])?;
        }
    }

    let body = writer
        .into_inner()
        .map_err(|e| ExportError::Csv(csv::Error::from(e.into_error())))?;

    let mut bytes = Vec::with_capacity(UTF8_BOM.len() + body.len());
    bytes.extend_from_slice(UTF8_BOM);
    bytes.extend_from_slice(&body);
    Ok(bytes)
}

/// Freshly timestamped export filename, e.g.
/// `grouping_20250301_142530_123.csv`. The millisecond suffix keeps
/// near-simultaneous exports distinct.
pub fn grouping_filename() -> String {
    let now = chrono::Utc::now();
    now.format("grouping_%Y%m%d_%H%M%S_%3f.csv").to_string()
}

/// Write the serialized groups to a freshly named file under `dir`,
/// creating the directory if needed. Returns the path of the written file.
pub fn write_groups_csv(dir: &Path, groups: &[Group]) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(dir).map_err(|e| ExportError::Io {
        path: dir.display().to_string(),
        source: e,
    })?;

    let path = dir.join(grouping_filename());
    let bytes = serialize_groups(groups)?;
    std::fs::write(&path, bytes).map_err(|e| ExportError::Io {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(path)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
