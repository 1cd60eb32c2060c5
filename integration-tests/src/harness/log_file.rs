use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// An access log in its own temp directory, written the way a web server
/// would: appends only, flushed per call.
pub struct TestLogFile {
    _dir: TempDir,
    path: PathBuf,
}

impl TestLogFile {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = dir.path().join("access.log");
        fs::write(&path, "").expect("failed to create access log");

        Self { _dir: dir, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, lines: &[String]) {
        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .expect("failed to open access log");
        for line in lines {
            writeln!(file, "{line}").expect("failed to append to access log");
        }
        file.flush().expect("failed to flush access log");
    }

    pub fn truncate(&self) {
        fs::write(&self.path, "").expect("failed to truncate access log");
    }
}

impl Default for TestLogFile {
    fn default() -> Self {
        Self::new()
    }
}

pub fn access_line(method: &str, target: &str, status: u16, bytes: u64) -> String {
    format!(
        r#"127.0.0.1 - frank [10/Oct/2000:13:55:36 -0700] "{method} {target} HTTP/1.1" {status} {bytes} "-" "curl/8.0""#
    )
}
