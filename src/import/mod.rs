//! Survey import
//!
//! Reduces field files to the `RawSurveyPoint` shape the trajectory engine
//! consumes:
//! - `delimited`: comma, tab or semicolon tables with depth/inc/azimuth columns
//! - `witsml`: WITSML 1.4.1.1 trajectory documents

pub mod delimited;
pub mod witsml;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::types::RawSurveyPoint;

pub use delimited::{parse_delimited, read_delimited_file};
pub use witsml::{parse_witsml_trajectory, read_witsml_file};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Failed to read {}: {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Missing required column or element: {0}")]
    MissingColumn(&'static str),

    #[error("Line {line}: invalid {field} value '{value}'")]
    InvalidValue {
        line: u64,
        field: &'static str,
        value: String,
    },
}

/// Import a survey file, choosing the parser by extension.
///
/// `.xml` and `.witsml` files are read as WITSML; anything else as a
/// delimited table.
pub fn import_file(path: &Path) -> Result<Vec<RawSurveyPoint>, ImportError> {
    let is_xml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("xml") || e.eq_ignore_ascii_case("witsml"));

    let points = if is_xml {
        read_witsml_file(path)?
    } else {
        read_delimited_file(path)?
    };
    info!(path = %path.display(), points = points.len(), "Imported survey");
    Ok(points)
}

fn read_to_string(path: &Path) -> Result<String, ImportError> {
    std::fs::read_to_string(path).map_err(|e| ImportError::Io(path.to_path_buf(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_import_dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();

        let csv_path = dir.path().join("survey.csv");
        std::fs::write(&csv_path, "md,inc,azi\n0,90,0\n30,88,2\n").unwrap();
        assert_eq!(import_file(&csv_path).unwrap().len(), 2);

        let xml_path = dir.path().join("survey.xml");
        let mut f = std::fs::File::create(&xml_path).unwrap();
        write!(
            f,
            "<trajectorys><trajectory><trajectoryStation><md uom=\"ft\">10</md>\
             <incl uom=\"dega\">85</incl><azi uom=\"dega\">45</azi></trajectoryStation>\
             </trajectory></trajectorys>"
        )
        .unwrap();
        let points = import_file(&xml_path).unwrap();
        assert_eq!(points, vec![RawSurveyPoint::new(10.0, 85.0, 45.0)]);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = import_file(Path::new("/nonexistent/survey.csv")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/survey.csv"));
    }
}
