//! ABOUTME: Crawl-report artifact — serializes a finished session's error ledger to the reports cache dir

use std::path::{Path, PathBuf};

use docbro_core::crawl::CrawlSession;

/// Writes `<reports_dir>/<session_id>.json` containing the session's full
/// state (including `error_ledger`), creating `reports_dir` if needed.
/// Callers surface the returned path to the operator on partial failure.
pub fn write_crawl_report(reports_dir: &Path, session: &CrawlSession) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(reports_dir)?;
    let path = reports_dir.join(format!("{}.json", session.id));
    let json = serde_json::to_string_pretty(session).expect("CrawlSession is always serializable");
    std::fs::write(&path, json)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docbro_core::crawl::{CrawlStatus, ErrorKind};
    use docbro_core::ids::BoxId;
    use tempfile::tempdir;

    #[test]
    fn writes_report_file_named_after_session_id() {
        let dir = tempdir().unwrap();
        let mut session = CrawlSession::new(BoxId::new(), "https://docs.example.com", 3, 1.0);
        session.error_ledger.record("https://docs.example.com/a", ErrorKind::Timeout, "timed out");
        session.finish(CrawlStatus::Failed);

        let path = write_crawl_report(dir.path(), &session).unwrap();
        assert_eq!(path, dir.path().join(format!("{}.json", session.id)));
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("timed out"));
    }
}
