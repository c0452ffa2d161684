use std::cmp::Ordering;
use std::path::Path;

use crate::{ApiError, ApiResult};

const SCHEDULE_EXTENSIONS: [&str; 2] = [".csv", ".ods"];

/// Input schedules available in `dir`: CSV files first, then ODS, each
/// group in case-insensitive name order.
pub async fn list_schedules(dir: &Path) -> ApiResult<Vec<String>> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| ApiError::internal_with("Cannot read directory", e))?;

    let mut names = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| ApiError::internal_with("Cannot read directory", e))?
    {
        let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_file && is_schedule(&name) {
            names.push(name);
        }
    }

    names.sort_by(|a, b| schedule_order(a, b));
    Ok(names)
}

fn is_schedule(name: &str) -> bool {
    let lower = name.to_lowercase();
    SCHEDULE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

fn schedule_order(a: &str, b: &str) -> Ordering {
    let a_csv = a.to_lowercase().ends_with(".csv");
    let b_csv = b.to_lowercase().ends_with(".csv");
    b_csv
        .cmp(&a_csv)
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_sorts_before_ods() {
        let mut names = vec!["b.ods", "Z.csv", "a.csv", "A.ods"];
        names.sort_by(|a, b| schedule_order(a, b));
        assert_eq!(names, vec!["a.csv", "Z.csv", "A.ods", "b.ods"]);
    }

    #[test]
    fn extension_match_ignores_case() {
        assert!(is_schedule("Rooms.CSV"));
        assert!(is_schedule("plant.Ods"));
        assert!(!is_schedule("readme.md"));
        assert!(!is_schedule("csv"));
    }

    #[tokio::test]
    async fn missing_directory_is_an_internal_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = list_schedules(&dir.path().join("gone")).await.unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Cannot read directory");
    }
}
