#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{fs, path::Path};

use crate::{error::HarnessError, record::Record};

peg::parser! {
    /// Line grammar for the declarative test-file format. Each rule matches
    /// one whole line *after* comment stripping.
    pub grammar test_line() for str {
        /// matches any amount of intra-line whitespace
        rule ws() = quiet!{[' ' | '\t' | '\r']*}

        /// field names run up to the first colon and may not contain quotes
        rule key() -> String
            = k:$([^ '"' | ':']*) { k.to_string() }

        /// a blank or whitespace-only line
        pub rule blank()
            = ws() ![_]

        /// a `key: "value"` line; the value may not embed a quote
        pub rule one_line() -> (String, String)
            = k:key() ":" ws() "\"" v:$([^ '"']*) "\"" ws() ![_]
            { (k, v.to_string()) }

        /// a `key: """` line opening a multi-line block
        pub rule multi_open() -> String
            = k:key() ":" ws() "\"\"\"" ws() ![_] { k }

        /// a `"""` line closing a multi-line block
        pub rule multi_close()
            = ws() "\"\"\"" ws() ![_]
    }
}

/// Strips a `#` comment to end-of-line. The marker is not escapable.
fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

/// Parses the test file at `path` into a [`Record`].
///
/// Fails with [`HarnessError::NotFound`] if the file is absent and
/// [`HarnessError::Format`] on any line the grammar does not accept.
pub fn parse_file(path: &Path) -> Result<Record, HarnessError> {
    if !path.exists() {
        return Err(HarnessError::NotFound { path: path.into() });
    }
    let text = fs::read_to_string(path)?;
    parse_str(&path.display().to_string(), &text)
}

/// Parses already-loaded test-file text. The `path` is recorded as the
/// record's source identifier and used in error messages.
pub fn parse_str(path: &str, text: &str) -> Result<Record, HarnessError> {
    let raw_lines: Vec<String> = text.lines().map(str::to_string).collect();
    let stripped: Vec<String> = raw_lines
        .iter()
        .map(|line| strip_comment(line).to_string())
        .collect();

    let mut record = Record::new(path);
    record.set("path", path);
    record.set_raw_lines(raw_lines.clone());

    let mut i = 0;
    while i < stripped.len() {
        let line = stripped[i].as_str();

        if test_line::blank(line).is_ok() {
            record.record_raw(&raw_lines[i]);
            i += 1;
            continue;
        }

        if let Ok((key, value)) = test_line::one_line(line) {
            record.record_one_line(&key, &value);
            i += 1;
            continue;
        }

        if let Ok(key) = test_line::multi_open(line) {
            let opened_at = i + 1;
            let mut body: Vec<&str> = Vec::new();
            i += 1;
            // terminator is matched on the stripped line, but the block body
            // keeps its raw lines so comments inside it survive
            while i < stripped.len() && test_line::multi_close(&stripped[i]).is_err() {
                body.push(&raw_lines[i]);
                i += 1;
            }
            if i >= stripped.len() {
                return Err(HarnessError::Format {
                    path:   path.to_string(),
                    line:   opened_at,
                    reason: "unterminated multiline string".to_string(),
                });
            }
            record.record_multi_line(&key, &body.join("\n"));
            i += 1;
            continue;
        }

        return Err(HarnessError::Format {
            path:   path.to_string(),
            line:   i + 1,
            reason: "line is not blank, `key: \"value\"`, or a `\"\"\"` block".to_string(),
        });
    }

    Ok(record)
}
