
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

pub(super) fn append(path: &Path, text: &str) {
    let mut file = OpenOptions::new()
        .append(true)
        .open(path)
        .expect("log file should open for append");
    file.write_all(text.as_bytes()).unwrap();
    file.flush().unwrap();
}

pub(super) fn access_line(target: &str, status: u16, bytes: u64) -> String {
    format!(
        "127.0.0.1 - jill [09/May/2018:16:00:41 +0000] \"GET {target} HTTP/1.0\" {status} {bytes}\n"
    )
}
