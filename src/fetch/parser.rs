//! Turns fetched twtxt bodies into status collections and user records.
//!
//! Two formats are understood:
//! - a user's own feed, `timestamp \t message` per line;
//! - a registry dump, `nick \t url \t timestamp \t message` per line.
//!
//! Blank lines and `#` comments are skipped in both.

use crate::fetch::client::parse_remote_url;
use crate::registry::error::{LineIssue, RegistryError, Result};
use crate::registry::types::{FIELD_SEPARATOR, TimeMap, now_rfc3339, parse_timestamp, render_status};
use crate::registry::user::UserRecord;
use std::collections::HashMap;

/// Result of parsing a single user's feed.
#[derive(Debug, Default)]
pub struct ParsedFeed {
    pub statuses: TimeMap,
    /// Lines whose timestamp could not be read. They are not in `statuses`.
    pub issues: Vec<LineIssue>,
}

/// Result of parsing a registry dump.
#[derive(Debug, Default)]
pub struct ParsedDump {
    /// Users in the order their URL first appeared.
    pub users: Vec<UserRecord>,
    /// Lines that were skipped.
    pub issues: Vec<LineIssue>,
}

fn content_lines(body: &str) -> impl Iterator<Item = (usize, &str)> {
    body.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim_end_matches('\r')))
        .filter(|(_, line)| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
}

/// Parses a user's own twtxt file and enriches each line with `nick` and `url`.
///
/// A line that is not exactly `timestamp \t message` fails the whole feed. A line with an
/// unreadable timestamp is reported in `issues` and left out.
pub fn parse_single_user_feed(body: &str, nick: &str, url: &str) -> Result<ParsedFeed> {
    if body.trim().is_empty() {
        return Err(RegistryError::malformed(format!("received no data from {}", url)));
    }

    let mut parsed = ParsedFeed::default();
    for (line_no, line) in content_lines(body) {
        let columns: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
        let [raw_ts, message] = columns[..] else {
            return Err(RegistryError::malformed(format!(
                "improperly formatted data at line {} of {}: expected 2 fields, found {}",
                line_no,
                url,
                columns.len()
            )));
        };

        let raw_ts = raw_ts.trim();
        match parse_timestamp(raw_ts) {
            Ok(ts) => {
                let rendered = render_status(nick, url, raw_ts, message.trim());
                parsed.statuses.insert(ts, rendered);
            }
            Err(e) => parsed.issues.push(LineIssue {
                line: line_no,
                message: e.to_string(),
            }),
        }
    }

    Ok(parsed)
}

struct DumpEntry {
    nick: String,
    statuses: TimeMap,
}

/// Parses another registry's `/api/plain/tweets` output into user records.
///
/// Bad lines are collected in `issues` and skipped; the rest of the dump is
/// still processed. Every returned record joins at parse time.
pub fn parse_registry_dump(body: &str) -> Result<ParsedDump> {
    if body.trim().is_empty() {
        return Err(RegistryError::malformed("received no data"));
    }

    let mut order: Vec<String> = Vec::new();
    let mut entries: HashMap<String, DumpEntry> = HashMap::new();
    let mut issues = Vec::new();

    for (line_no, line) in content_lines(body) {
        let columns: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
        if columns.len() != 4 {
            issues.push(LineIssue {
                line: line_no,
                message: format!("expected 4 fields, found {}", columns.len()),
            });
            continue;
        }

        let nick = columns[0].trim();
        let url = columns[1].trim();
        let raw_ts = columns[2].trim();

        if nick.is_empty() {
            issues.push(LineIssue {
                line: line_no,
                message: "empty nickname".to_string(),
            });
            continue;
        }
        if let Err(e) = parse_remote_url(url) {
            issues.push(LineIssue {
                line: line_no,
                message: e.to_string(),
            });
            continue;
        }
        let ts = match parse_timestamp(raw_ts) {
            Ok(ts) => ts,
            Err(e) => {
                tracing::warn!("Skipping dump line {}: {}", line_no, e);
                issues.push(LineIssue {
                    line: line_no,
                    message: e.to_string(),
                });
                continue;
            }
        };

        let entry = entries.entry(url.to_string()).or_insert_with(|| {
            order.push(url.to_string());
            DumpEntry {
                nick: nick.to_string(),
                statuses: TimeMap::new(),
            }
        });
        let rendered = render_status(&entry.nick, url, raw_ts, columns[3].trim());
        entry.statuses.insert(ts, rendered);
    }

    let joined_at = now_rfc3339();
    let users = order
        .into_iter()
        .filter_map(|url| {
            let entry = entries.remove(&url)?;
            Some(UserRecord::with_joined_at(
                entry.nick,
                url,
                None,
                joined_at.clone(),
                entry.statuses,
            ))
        })
        .collect();

    Ok(ParsedDump { users, issues })
}
