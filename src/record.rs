#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// One step of the reconstruction log kept alongside a parsed record.
///
/// Replaying the log in order reproduces the source file: raw lines are
/// emitted verbatim, the other two kinds re-serialize the named field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmitOp {
    /// A blank or comment-only line, stored exactly as read.
    Raw(String),
    /// A `key: "value"` field.
    OneLine(String),
    /// A `key: """` ... `"""` block.
    MultiLine(String),
}

/// The parsed key/value representation of one test/config file.
///
/// Field order is insertion order. A record is immutable once parsed except
/// for synthetic fields the orchestrator adds via [`Record::set`], which are
/// deliberately left out of the emit log so they never leak into
/// re-serialized files.
#[derive(Debug, Clone, Default)]
pub struct Record {
    /// Source file identifier, also exposed as the `path` field.
    path:      String,
    /// Parsed fields in insertion order.
    fields:    Vec<(String, String)>,
    /// Reconstruction log, in source order.
    emit_log:  Vec<EmitOp>,
    /// The original lines of the file, before comment stripping.
    raw_lines: Vec<String>,
}

impl Record {
    /// Creates an empty record for the given source path.
    pub fn new(path: impl Into<String>) -> Self {
        Record {
            path: path.into(),
            ..Record::default()
        }
    }

    /// Source file identifier.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The original file lines, for `--print-tests` style display.
    pub fn raw_lines(&self) -> &[String] {
        &self.raw_lines
    }

    /// Replaces the stored raw lines. Called once by the parser.
    pub fn set_raw_lines(&mut self, lines: Vec<String>) {
        self.raw_lines = lines;
    }

    /// Looks up a field value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Looks up a field value, defaulting to the empty string.
    pub fn get_or_empty(&self, key: &str) -> &str {
        self.get(key).unwrap_or_default()
    }

    /// Looks up a field value, failing with the record's path in the message.
    pub fn require(&self, key: &str) -> anyhow::Result<&str> {
        use anyhow::Context;
        self.get(key)
            .with_context(|| format!("missing field `{}` in {}", key, self.path))
    }

    /// Sets a field without touching the emit log. Used for synthetic fields
    /// such as `test_out_file`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.fields.push((key, value)),
        }
    }

    /// Records a raw passthrough line.
    pub fn record_raw(&mut self, line: &str) {
        self.emit_log.push(EmitOp::Raw(line.to_string()));
    }

    /// Records a single-line field.
    pub fn record_one_line(&mut self, key: &str, value: &str) {
        self.set(key, value);
        self.emit_log.push(EmitOp::OneLine(key.to_string()));
    }

    /// Records a multi-line field.
    pub fn record_multi_line(&mut self, key: &str, value: &str) {
        self.set(key, value);
        self.emit_log.push(EmitOp::MultiLine(key.to_string()));
    }

    /// Whether this test is disabled via a `disabled: "true"` field,
    /// case-insensitive.
    pub fn is_disabled(&self) -> bool {
        self.get("disabled")
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }

    /// Re-serializes the record by replaying the emit log.
    ///
    /// For an unmodified record this reproduces the original file
    /// byte-for-byte (assuming canonical `key: "value"` spacing and a
    /// trailing newline, which is all the parser itself ever writes).
    pub fn emit(&self) -> String {
        let mut out = String::new();
        for op in &self.emit_log {
            match op {
                EmitOp::Raw(line) => {
                    out.push_str(line);
                    out.push('\n');
                }
                EmitOp::OneLine(key) => {
                    out.push_str(key);
                    out.push_str(": \"");
                    out.push_str(self.get_or_empty(key));
                    out.push_str("\"\n");
                }
                EmitOp::MultiLine(key) => {
                    out.push_str(key);
                    out.push_str(": \"\"\"\n");
                    out.push_str(self.get_or_empty(key));
                    out.push_str("\n\"\"\"\n");
                }
            }
        }
        out
    }
}
