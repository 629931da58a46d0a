//! Content file loading and validation.

use std::fs;
use std::path::{Path, PathBuf};

use ability_core::data::ContentData;
use ability_core::error::AbilityError;
use thiserror::Error;

/// Errors raised while reading content files.
#[derive(Debug, Error)]
pub enum ToolError {
    /// A file or directory could not be read.
    #[error("Failed to read '{path}': {source}")]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The directory holds no `.ron` files.
    #[error("No .ron files found in '{0}'")]
    NoDataFiles(PathBuf),

    /// Content failed to parse or resolve.
    #[error(transparent)]
    Content(#[from] AbilityError),

    /// Writing output failed.
    #[error("Failed to encode output: {0}")]
    Encode(String),
}

/// Result type for tool operations.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Problems found in one content file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    /// The file checked.
    pub path: PathBuf,
    /// Human-readable problems. Empty when the file is valid.
    pub problems: Vec<String>,
}

impl FileReport {
    /// Whether the file passed every check.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Read and parse one content file.
///
/// # Errors
///
/// Fails if the file cannot be read or is not valid RON content.
pub fn load_content_file(path: &Path) -> Result<ContentData> {
    let source = fs::read_to_string(path).map_err(|source| ToolError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(ContentData::from_ron(&source, &path.display().to_string())?)
}

/// Check one content file.
///
/// Parse failures are reported as problems rather than errors so a
/// directory run can list every broken file at once. Reference checks run
/// first; resolution only runs once they pass.
///
/// # Errors
///
/// Fails only if the file cannot be read.
pub fn validate_file(path: &Path) -> Result<FileReport> {
    let mut report = FileReport {
        path: path.to_path_buf(),
        problems: Vec::new(),
    };
    let data = match load_content_file(path) {
        Ok(data) => data,
        Err(ToolError::Content(e)) => {
            report.problems.push(e.to_string());
            return Ok(report);
        }
        Err(e) => return Err(e),
    };

    report.problems = data.validate();
    if report.problems.is_empty() {
        if let Err(e) = data.resolve() {
            report.problems.push(e.to_string());
        }
    }
    tracing::debug!(
        path = %path.display(),
        problems = report.problems.len(),
        "content file checked"
    );
    Ok(report)
}

/// Check a single file, or every `.ron` file in a directory in name order.
///
/// # Errors
///
/// Fails if the path cannot be read or a directory holds no `.ron` files.
pub fn validate_data_directory(path: &Path) -> Result<Vec<FileReport>> {
    if path.is_file() {
        return Ok(vec![validate_file(path)?]);
    }

    let entries = fs::read_dir(path).map_err(|source| ToolError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ToolError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file = entry.path();
        if file.extension().is_some_and(|ext| ext == "ron") {
            files.push(file);
        }
    }
    if files.is_empty() {
        return Err(ToolError::NoDataFiles(path.to_path_buf()));
    }
    files.sort();

    files.iter().map(|file| validate_file(file)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ability_core::content;

    fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_builtin_export_validates() {
        let dir = tempfile::tempdir().unwrap();
        let ron = content::builtin_data().to_ron().unwrap();
        let path = write(dir.path(), "content.ron", &ron);

        let report = validate_file(&path).unwrap();
        assert!(report.is_valid(), "{:?}", report.problems);
        assert_eq!(load_content_file(&path).unwrap(), content::builtin_data());
    }

    #[test]
    fn test_parse_error_is_a_problem() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "broken.ron", "ContentData(statuses: [");

        let report = validate_file(&path).unwrap();
        assert_eq!(report.problems.len(), 1);
        assert!(report.problems[0].contains("broken.ron"));
    }

    #[test]
    fn test_dangling_reference_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "wet.ron",
            r#"ContentData(statuses: [StatusData(name: "wet", opposites: ["burning"])])"#,
        );

        let report = validate_file(&path).unwrap();
        assert!(!report.is_valid());
        assert!(report.problems[0].contains("burning"));
    }

    #[test]
    fn test_reactive_phase_status_fails_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "frozen.ron",
            r#"ContentData(
                statuses: [StatusData(name: "frozen", reactive: true)],
                units: [UnitTypeData(
                    name: "bastion",
                    health: 100,
                    speed: 4294967296,
                    hit_radius: 2147483648,
                    abilities: AbilityLoadoutData(
                        siege: Some(SiegeData(
                            siege_time: 10,
                            unsiege_time: 10,
                            statuses: PhaseStatusData(active: Some("frozen")),
                        )),
                    ),
                )],
            )"#,
        );

        let report = validate_file(&path).unwrap();
        assert_eq!(report.problems.len(), 1);
        assert!(report.problems[0].contains("reactive"));
    }

    #[test]
    fn test_directory_reports_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.ron", "ContentData(statuses: [])");
        write(dir.path(), "a.ron", "not ron at all");
        write(dir.path(), "notes.txt", "ignored");

        let reports = validate_data_directory(dir.path()).unwrap();
        let names: Vec<_> = reports
            .iter()
            .map(|r| r.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.ron", "b.ron"]);
        assert!(!reports[0].is_valid());
        assert!(reports[1].is_valid());
    }

    #[test]
    fn test_empty_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            validate_data_directory(dir.path()),
            Err(ToolError::NoDataFiles(_))
        ));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.ron");
        assert!(matches!(
            validate_file(&missing),
            Err(ToolError::Io { .. })
        ));
    }

    #[test]
    fn test_shipped_content_matches_builtin() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets/data/content.ron");
        assert_eq!(load_content_file(&path).unwrap(), content::builtin_data());
    }
}
