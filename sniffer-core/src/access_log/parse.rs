use crate::access_log::LogRecord;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

// remotehost rfc931 authuser [date] "request" status bytes "referrer" "agent"
static ACCESS_LOG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^(\S+) (\S+) (\S+) \[([\w:/]+\s[+\-]\d{4})\] "(\S+)\s?(\S+)?\s?(\S+)?" (\d{3}|-) (\d+|-)\s?"?([^"]*)"?\s?"?([^"]*)?"?$"#,
    )
    .expect("access log pattern is valid")
});

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("line does not match the access log grammar")]
    NoMatch,
}

/// Parse one access log line.
///
/// Status and body size fall back to `0` when the field is `-`; only a
/// line that does not match the grammar at all is an error.
pub fn parse_line(line: &str) -> Result<LogRecord, ParseError> {
    let caps = ACCESS_LOG.captures(line).ok_or(ParseError::NoMatch)?;
    let field = |i: usize| caps.get(i).map_or("", |m| m.as_str());

    let target = field(6);

    Ok(LogRecord {
        raw: line.to_string(),
        remote_host: field(1).to_string(),
        requesting_user: field(3).to_string(),
        timestamp: field(4).to_string(),
        method: field(5).to_string(),
        target: target.to_string(),
        section: section_of(target),
        http_version: field(7).to_string(),
        response_code: field(8).parse().unwrap_or(0),
        body_size: field(9).parse().unwrap_or(0),
    })
}

/// First `/`-delimited segment of a request target, e.g. `/api/foo` -> `/api`.
///
/// Targets without a path (`*`, empty) map to `/`. Query strings and
/// fragments are not part of the section.
pub fn section_of(target: &str) -> String {
    let path = match target
        .strip_prefix("http://")
        .or_else(|| target.strip_prefix("https://"))
    {
        // absolute-form: drop the authority
        Some(rest) => rest.find('/').map_or("/", |i| &rest[i..]),
        None => target,
    };

    let path = path.split(['?', '#']).next().unwrap_or_default();

    match path.strip_prefix('/') {
        Some(rest) => format!("/{}", rest.split('/').next().unwrap_or_default()),
        None => "/".to_string(),
    }
}
