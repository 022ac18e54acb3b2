//! Configuration text parser and rewriter
//!
//! Single left-to-right scan over the source, maintaining a two-state
//! machine (scanning key / scanning value) with escape and comment flags.
//!
//! ## Statement Syntax
//! ```text
//! key = value;
//! ```
//! - Keys: one or more of `[A-Za-z0-9._-]`; whitespace may surround a key
//!   but never split it.
//! - Values: everything up to an unescaped `;`, leading/trailing
//!   whitespace stripped. A backslash makes the next character literal,
//!   so `\;` is a semicolon inside the value and `\#` does not open a
//!   comment.
//! - `#` starts a line comment in both the key and value regions; the
//!   comment runs up to (not including) the end of the line.
//!
//! ## Rewrite
//! A rewrite pass emits the source text back out verbatim, except that
//! statements whose key exists in the table are patched to carry the
//! table's value. Entries that are dirty and never matched by the scan are
//! appended as new statements at the end. The emitted text always ends in
//! a line terminator.

use crate::error::{ConfKvError, Result};
use crate::hash::key_hash;

use super::entry::ConfigEntry;
use super::table::ConfigText;

/// Line terminator used for emitted statements
#[cfg(windows)]
const LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
const LINE_ENDING: &str = "\n";

/// Options controlling a parse pass
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Regenerate the source text, patched to match the table
    pub rewrite: bool,

    /// Parsed values unconditionally overwrite table values, with dirty
    /// tracking suppressed
    pub override_existing: bool,

    /// Clear the dirty flag of every entry the rewrite pass writes out
    pub mark_written_clean: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            rewrite: false,
            override_existing: false,
            mark_written_clean: true,
        }
    }
}

impl ConfigText {
    /// Parse `source` into the table with default options: absent keys are
    /// inserted, existing table values are left untouched
    pub fn parse(&mut self, source: &str) -> Result<()> {
        self.parse_with(source, &ParseOptions::default())?;
        Ok(())
    }

    /// Parse `source` and regenerate it with the table as the authority
    ///
    /// Statements for keys the table already holds are patched to the
    /// table's value; dirty entries missing from `source` are appended at
    /// the end. All written entries come out clean.
    pub fn rewrite(&mut self, source: &str) -> Result<String> {
        let options = ParseOptions {
            rewrite: true,
            ..ParseOptions::default()
        };
        // parse_with returns text whenever options.rewrite is set
        Ok(self.parse_with(source, &options)?.unwrap_or_default())
    }

    /// Parse `source` into the table
    ///
    /// Returns the rewritten text iff `options.rewrite` is set. A syntax
    /// error aborts the scan immediately; statements merged before the
    /// error remain in the table.
    pub fn parse_with(&mut self, source: &str, options: &ParseOptions) -> Result<Option<String>> {
        let mut out = options
            .rewrite
            .then(|| String::with_capacity(source.len() + 16));
        let mut matched: Vec<u32> = Vec::new();

        // Scanner state
        let mut scanning_value = false;
        let mut escaped = false;
        let mut in_comment = false;
        let mut key = String::new();
        let mut key_interrupted = false;
        let mut value = String::new();
        // Length of `value` with trailing whitespace excluded
        let mut value_keep = 0usize;
        // Position in `out` just after the statement's '='
        let mut value_out_start = 0usize;

        for (offset, ch) in source.char_indices() {
            if in_comment {
                if ch != '\n' {
                    if let Some(out) = out.as_mut() {
                        out.push(ch);
                    }
                    continue;
                }
                // The newline ending a comment is ordinary whitespace
                in_comment = false;
            }

            if scanning_value {
                if escaped {
                    escaped = false;
                    value.push(ch);
                    value_keep = value.len();
                    if let Some(out) = out.as_mut() {
                        out.push(ch);
                    }
                    continue;
                }
                match ch {
                    '\\' => escaped = true,
                    '#' => in_comment = true,
                    ';' => {
                        if key.is_empty() {
                            return Err(ConfKvError::Syntax {
                                message: "statement with empty key".to_string(),
                                offset,
                            });
                        }
                        value.truncate(value_keep);
                        self.resolve_statement(
                            &key,
                            &value,
                            options,
                            &mut out,
                            value_out_start,
                            &mut matched,
                        )?;
                        key.clear();
                        key_interrupted = false;
                        scanning_value = false;
                    }
                    c if c.is_whitespace() => {
                        // Leading whitespace is skipped, interior kept
                        if !value.is_empty() {
                            value.push(c);
                        }
                    }
                    c => {
                        value.push(c);
                        value_keep = value.len();
                    }
                }
                if let Some(out) = out.as_mut() {
                    out.push(ch);
                }
            } else {
                match ch {
                    '#' => in_comment = true,
                    '=' => {
                        scanning_value = true;
                        value.clear();
                        value_keep = 0;
                    }
                    c if is_key_char(c) => {
                        if key_interrupted {
                            return Err(ConfKvError::Syntax {
                                message: format!(
                                    "unexpected character '{c}' after whitespace inside key"
                                ),
                                offset,
                            });
                        }
                        key.push(c);
                    }
                    c if c.is_whitespace() => {
                        if !key.is_empty() {
                            key_interrupted = true;
                        }
                    }
                    c => {
                        return Err(ConfKvError::Syntax {
                            message: format!("unexpected character '{c}' in key"),
                            offset,
                        });
                    }
                }
                if let Some(out) = out.as_mut() {
                    out.push(ch);
                    if ch == '=' {
                        value_out_start = out.len();
                    }
                }
            }
        }

        // A statement left open at end of input has no recovery
        if escaped || scanning_value || !key.is_empty() {
            return Err(ConfKvError::Syntax {
                message: "unexpected end of input inside statement".to_string(),
                offset: source.len(),
            });
        }

        if let Some(out) = out.as_mut() {
            if !out.is_empty() && !out.ends_with('\n') {
                out.push_str(LINE_ENDING);
            }

            // Append dirty entries the scan never matched
            for entry in self.entries.iter_mut() {
                if entry.dirty && !matched.contains(&entry.hash) {
                    out.push_str(&entry.key);
                    out.push_str(" = ");
                    out.push_str(&escape_value(&entry.value));
                    out.push(';');
                    out.push_str(LINE_ENDING);
                    if options.mark_written_clean {
                        entry.dirty = false;
                    }
                }
            }
        }

        tracing::trace!(
            entries = self.entries.len(),
            rewrite = options.rewrite,
            "parsed configuration text"
        );

        Ok(out)
    }

    /// Merge one completed `key = value` statement into the table and, on
    /// rewrite, patch the emitted value region when the table disagrees
    fn resolve_statement(
        &mut self,
        key: &str,
        value: &str,
        options: &ParseOptions,
        out: &mut Option<String>,
        value_out_start: usize,
        matched: &mut Vec<u32>,
    ) -> Result<()> {
        let hash = key_hash(key);
        matched.push(hash);

        if options.override_existing {
            // Source wins over the table; dirty tracking suppressed
            self.set(key, Some(value), false)?;
            return Ok(());
        }

        if options.rewrite {
            if let Some(idx) = self.position(hash) {
                // Table wins over the source
                let mut patch = None;
                if let Some(entry) = self.entries.get_mut(idx) {
                    if options.mark_written_clean {
                        entry.dirty = false;
                    }
                    if entry.value != value {
                        patch = Some(entry.value.clone());
                    }
                }
                if let (Some(authoritative), Some(out)) = (patch, out.as_mut()) {
                    out.truncate(value_out_start);
                    out.push(' ');
                    out.push_str(&escape_value(&authoritative));
                }
            } else {
                self.entries.push(ConfigEntry::new(key, value, false));
            }
            return Ok(());
        }

        // Plain parse: fill absent keys, leave existing values untouched
        if self.position(hash).is_none() {
            self.entries.push(ConfigEntry::new(key, value, false));
        }
        Ok(())
    }

    /// Emit every entry as a `key = value;` statement
    ///
    /// The output parses back into an equal table; values are escaped so
    /// that `;`, `#`, and `\` survive the round trip.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for entry in self.entries.iter() {
            out.push_str(&entry.key);
            out.push_str(" = ");
            out.push_str(&escape_value(&entry.value));
            out.push(';');
            out.push_str(LINE_ENDING);
        }
        out
    }
}

/// Legal key characters: `[A-Za-z0-9._-]`
fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
}

/// Escape a value so it parses back verbatim
fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '\\' | ';' | '#') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}
