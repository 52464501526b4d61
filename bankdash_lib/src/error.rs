//! Error types for the library layer.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while loading data, validating configuration,
/// rendering charts, or writing the dashboard image.
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("The file '{}' was not found", .0.display())]
    InputNotFound(PathBuf),
    #[error("Failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Missing required column: {0}")]
    MissingColumn(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_yml::Error),
    #[error("Failed to load font: {0}")]
    Font(String),
    #[error("Rendering failed: {0}")]
    Render(String),
    #[error("Error saving '{}': {reason}", path.display())]
    Export { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_not_found_display() {
        let err = DashboardError::InputNotFound(PathBuf::from("data/all_stocks_5yr.csv"));
        assert_eq!(
            err.to_string(),
            "The file 'data/all_stocks_5yr.csv' was not found"
        );
    }

    #[test]
    fn test_export_display_names_path() {
        let err = DashboardError::Export {
            path: PathBuf::from("/readonly/out.png"),
            reason: "permission denied".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/readonly/out.png"));
        assert!(msg.contains("permission denied"));
    }

    #[test]
    fn test_missing_column_display() {
        let err = DashboardError::MissingColumn("close".to_string());
        assert!(err.to_string().contains("close"));
    }
}
