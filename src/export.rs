//! CSV export of crawl results and artifact-name handling for the
//! download endpoint.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::Local;

use crate::models::JobRecord;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// Column header, written up front so the artifact carries the full
/// column set even when the crawl produced no records.
const COLUMNS: [&str; 12] = [
    "REF",
    "Company",
    "Company industry",
    "Number of employee",
    "Company description",
    "Job Title",
    "Location",
    "Recruiter name",
    "Recruiter URL profile",
    "Recruiter presentation",
    "Job description",
    "Job URL",
];

/// Write the accumulated records to a timestamped CSV file under `dir`
/// and return the artifact file name.
///
/// The file starts with a UTF-8 BOM so spreadsheet tools pick up the
/// encoding of non-ASCII job text.
pub fn write_artifact(dir: &Path, records: &[JobRecord]) -> Result<String, ExportError> {
    let filename = artifact_name(Local::now().format("%Y%m%d_%H%M%S"));
    let mut file = File::create(dir.join(&filename))?;
    file.write_all(b"\xef\xbb\xbf")?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    writer.write_record(COLUMNS)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(filename)
}

fn artifact_name(timestamp: impl std::fmt::Display) -> String {
    format!("linkedin_jobs_{}.csv", timestamp)
}

/// Reduce a requested artifact name to its base component.
///
/// Returns `None` for anything that is not a plain file name (path
/// separators, parent references, empty input), so the download handler
/// can never be walked out of the output directory.
pub fn sanitize_artifact_name(requested: &str) -> Option<String> {
    if requested.is_empty()
        || requested.contains('/')
        || requested.contains('\\')
        || requested.contains("..")
    {
        return None;
    }
    let path = Path::new(requested);
    match path.file_name() {
        Some(name) if name == requested => Some(requested.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JobRecord;

    fn temp_dir(tag: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "job_scraper_export_{}_{}",
            tag,
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn writes_bom_header_and_rows_in_column_order() {
        let dir = temp_dir("rows");
        let mut record = JobRecord::empty(1);
        record.job_title = "Rust Engineer".into();
        record.job_url = "https://example/jobs/view/42".into();

        let name = write_artifact(&dir, &[record]).unwrap();
        let bytes = std::fs::read(dir.join(&name)).unwrap();
        assert_eq!(&bytes[..3], b"\xef\xbb\xbf");

        let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "REF,Company,Company industry,Number of employee,Company description,\
             Job Title,Location,Recruiter name,Recruiter URL profile,\
             Recruiter presentation,Job description,Job URL"
        );
        assert!(lines.next().unwrap().starts_with("1,,,,,Rust Engineer,"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn empty_crawl_still_produces_artifact_with_header() {
        let dir = temp_dir("empty");
        let name = write_artifact(&dir, &[]).unwrap();
        assert!(name.starts_with("linkedin_jobs_"));
        assert!(name.ends_with(".csv"));

        let bytes = std::fs::read(dir.join(&name)).unwrap();
        assert_eq!(&bytes[..3], b"\xef\xbb\xbf");
        let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("REF,Company,"));
        assert!(lines.next().is_none());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn sanitize_accepts_plain_names() {
        assert_eq!(
            sanitize_artifact_name("linkedin_jobs_20250101_120000.csv").as_deref(),
            Some("linkedin_jobs_20250101_120000.csv")
        );
    }

    #[test]
    fn sanitize_rejects_traversal() {
        assert!(sanitize_artifact_name("../secrets.csv").is_none());
        assert!(sanitize_artifact_name("/etc/passwd").is_none());
        assert!(sanitize_artifact_name("dir/jobs.csv").is_none());
        assert!(sanitize_artifact_name("dir\\jobs.csv").is_none());
        assert!(sanitize_artifact_name("").is_none());
    }
}
