//! Lossless view of a PO file, used to write translations back.
//!
//! `polib` models only part of a PO file: it rebuilds the header from a fixed
//! field list and drops translator comments and obsolete entries when it writes
//! a catalog. `PoDocument` keeps the original text line by line and replaces
//! nothing but the `msgstr` lines of entries whose translation changed.
//!
//! Loading also checks the file for what `polib` would otherwise panic on: a
//! header without one of its required fields, or a keyword line that is not
//! followed by a quoted string.

use std::collections::HashMap;
use std::fmt::Display;
use std::ops::Range;
use std::path::Path;

use polib::catalog::Catalog;
use polib::message::MessageView;

use crate::mt::{MtError, MtResult};

/// Header fields `polib` expects in every catalog.
const REQUIRED_HEADER_FIELDS: [&str; 9] = [
    "Project-Id-Version",
    "POT-Creation-Date",
    "PO-Revision-Date",
    "Language-Team",
    "MIME-Version",
    "Content-Type",
    "Content-Transfer-Encoding",
    "Language",
    "Plural-Forms",
];

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct EntryKey {
    msgctxt: String,
    msgid: String,
}

impl EntryKey {
    fn new(msgctxt: &str, msgid: &str) -> Self {
        Self {
            msgctxt: msgctxt.to_string(),
            msgid: msgid.to_string(),
        }
    }
}

#[derive(Debug)]
struct Entry {
    msgstr: String,
    /// The `msgstr` keyword line and its continuation lines.
    msgstr_lines: Range<usize>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Field {
    Msgctxt,
    Msgid,
    MsgidPlural,
    Msgstr,
    MsgstrPlural,
}

/// Fields of the entry currently being scanned, still escaped.
#[derive(Default)]
struct PendingEntry {
    first_line: usize,
    msgctxt: Option<String>,
    msgid: Option<String>,
    msgid_plural: Option<String>,
    msgstr: Option<String>,
    msgstr_lines: Option<Range<usize>>,
    has_plural_msgstr: bool,
    field: Option<Field>,
}

impl PendingEntry {
    fn is_empty(&self) -> bool {
        self.field.is_none()
    }

    fn field_mut(&mut self, field: Field) -> Option<&mut String> {
        match field {
            Field::Msgctxt => self.msgctxt.as_mut(),
            Field::Msgid => self.msgid.as_mut(),
            Field::MsgidPlural => self.msgid_plural.as_mut(),
            Field::Msgstr => self.msgstr.as_mut(),
            Field::MsgstrPlural => None,
        }
    }
}

fn catalog_error(line: usize, message: impl Display) -> MtError {
    MtError::CatalogError(format!("line {}: {message}", line + 1))
}

/// Strip the line terminator, `\n` or `\r\n`.
fn line_content(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

fn line_terminator(line: &str) -> &str {
    &line[line_content(line).len()..]
}

/// The inside of a `"..."` string, still escaped.
fn quoted(rest: &str, line: usize) -> MtResult<&str> {
    rest.strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .ok_or_else(|| catalog_error(line, format!("expected a quoted string, found {rest:?}")))
}

fn unescape(escaped: &str, line: usize) -> MtResult<String> {
    let mut unescaped = String::with_capacity(escaped.len());
    let mut chars = escaped.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            unescaped.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => unescaped.push('\\'),
            Some('n') => unescaped.push('\n'),
            Some('r') => unescaped.push('\r'),
            Some('t') => unescaped.push('\t'),
            Some('"') => unescaped.push('"'),
            None => unescaped.push('\\'),
            Some(other) => {
                return Err(catalog_error(
                    line,
                    format!("invalid escape sequence \\{other}"),
                ));
            }
        }
    }
    Ok(unescaped)
}

fn escape(unescaped: &str) -> String {
    let mut escaped = String::with_capacity(unescaped.len());
    for c in unescaped.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn missing_header_fields(header: &str) -> Vec<&'static str> {
    let present: Vec<&str> = header
        .split('\n')
        .filter_map(|line| line.split_once(':').map(|(key, _)| key))
        .collect();
    REQUIRED_HEADER_FIELDS
        .into_iter()
        .filter(|field| !present.contains(field))
        .collect()
}

/// A PO file as text, with the `msgstr` position of every active entry.
#[derive(Debug)]
pub struct PoDocument {
    /// Lines including their terminators; concatenated they give the file.
    lines: Vec<String>,
    newline: &'static str,
    entries: Vec<Entry>,
    /// Every active entry; plural entries map to `None` as they are never rewritten.
    index: HashMap<EntryKey, Option<usize>>,
}

impl PoDocument {
    /// Read and scan the PO file at `path`.
    pub fn load(path: &Path) -> MtResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|err| {
            MtError::CatalogError(format!("Could not read {}: {err}", path.display()))
        })?;
        Self::parse(&text).map_err(|err| match err {
            MtError::CatalogError(msg) => {
                MtError::CatalogError(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }

    pub fn parse(text: &str) -> MtResult<Self> {
        let lines: Vec<String> = text.split_inclusive('\n').map(str::to_string).collect();
        let newline = if lines.first().is_some_and(|line| line.ends_with("\r\n")) {
            "\r\n"
        } else {
            "\n"
        };

        let mut document = PoDocument {
            lines: Vec::new(),
            newline,
            entries: Vec::new(),
            index: HashMap::new(),
        };
        let mut header_seen = false;
        let mut pending = PendingEntry::default();

        for (number, line) in lines.iter().enumerate() {
            let content = line_content(line);
            if content.is_empty() {
                let finished = std::mem::take(&mut pending);
                document.finish_entry(finished, &mut header_seen)?;
                continue;
            }
            if content.starts_with('#') || content.trim().is_empty() {
                // Comments, flags, references and obsolete `#~` entries stay as text.
                continue;
            }
            if content.starts_with('"') {
                let value = quoted(content, number)?;
                let field = pending
                    .field
                    .ok_or_else(|| catalog_error(number, "string without a keyword"))?;
                if let Some(target) = pending.field_mut(field) {
                    target.push_str(value);
                }
                if field == Field::Msgstr {
                    if let Some(range) = pending.msgstr_lines.as_mut() {
                        range.end = number + 1;
                    }
                }
                continue;
            }

            let (field, rest) = if let Some(rest) = content.strip_prefix("msgctxt ") {
                (Field::Msgctxt, rest)
            } else if let Some(rest) = content.strip_prefix("msgid_plural ") {
                (Field::MsgidPlural, rest)
            } else if let Some(rest) = content.strip_prefix("msgid ") {
                (Field::Msgid, rest)
            } else if let Some(rest) = content.strip_prefix("msgstr ") {
                (Field::Msgstr, rest)
            } else if let Some(rest) = content
                .strip_prefix("msgstr[")
                .and_then(|rest| rest.split_once("] "))
                .filter(|(index, _)| {
                    !index.is_empty() && index.chars().all(|c| c.is_ascii_digit())
                })
                .map(|(_, rest)| rest)
            {
                (Field::MsgstrPlural, rest)
            } else {
                return Err(catalog_error(number, format!("unexpected line {content:?}")));
            };

            let value = quoted(rest, number)?.to_string();
            if pending.is_empty() {
                pending.first_line = number;
            }
            let msgstr_seen = pending.msgstr.is_some() || pending.has_plural_msgstr;
            let slot = match field {
                Field::Msgctxt => &mut pending.msgctxt,
                Field::Msgid => &mut pending.msgid,
                Field::MsgidPlural => &mut pending.msgid_plural,
                Field::Msgstr => &mut pending.msgstr,
                Field::MsgstrPlural => {
                    pending.has_plural_msgstr = true;
                    pending.field = Some(field);
                    continue;
                }
            };
            if slot.is_some() || msgstr_seen {
                return Err(catalog_error(
                    number,
                    "entries must be separated by a blank line",
                ));
            }
            *slot = Some(value);
            if field == Field::Msgstr {
                pending.msgstr_lines = Some(number..number + 1);
            }
            pending.field = Some(field);
        }
        let finished = std::mem::take(&mut pending);
        document.finish_entry(finished, &mut header_seen)?;

        if !header_seen {
            return Err(MtError::CatalogError("missing header entry".to_string()));
        }
        document.lines = lines;
        Ok(document)
    }

    fn finish_entry(&mut self, pending: PendingEntry, header_seen: &mut bool) -> MtResult<()> {
        if pending.is_empty() {
            return Ok(());
        }
        let line = pending.first_line;
        let msgid = unescape(
            pending
                .msgid
                .as_deref()
                .ok_or_else(|| catalog_error(line, "entry without msgid"))?,
            line,
        )?;

        if !*header_seen {
            let header = unescape(pending.msgstr.as_deref().unwrap_or_default(), line)?;
            if !msgid.is_empty() || header.is_empty() {
                return Err(catalog_error(line, "missing header entry"));
            }
            let missing = missing_header_fields(&header);
            if !missing.is_empty() {
                return Err(catalog_error(
                    line,
                    format!("header lacks required fields: {}", missing.join(", ")),
                ));
            }
            *header_seen = true;
            return Ok(());
        }

        let msgctxt = unescape(pending.msgctxt.as_deref().unwrap_or_default(), line)?;
        let key = EntryKey::new(&msgctxt, &msgid);
        if self.index.contains_key(&key) {
            return Err(catalog_error(line, format!("duplicate entry {msgid:?}")));
        }

        if pending.msgid_plural.is_some() {
            if !pending.has_plural_msgstr {
                return Err(catalog_error(line, "plural entry without msgstr[N]"));
            }
            self.index.insert(key, None);
            return Ok(());
        }

        let (Some(msgstr), Some(msgstr_lines)) = (pending.msgstr, pending.msgstr_lines) else {
            return Err(catalog_error(line, "entry without msgstr"));
        };
        let msgstr = unescape(&msgstr, line)?;
        self.index.insert(key, Some(self.entries.len()));
        self.entries.push(Entry {
            msgstr,
            msgstr_lines,
        });
        Ok(())
    }

    /// Take over every singular translation that differs between `catalog` and
    /// the file. Returns the number of entries rewritten.
    pub fn update_from(&mut self, catalog: &Catalog) -> MtResult<usize> {
        let mut updated = 0;
        for message in catalog.messages() {
            let Ok(msgstr) = message.msgstr() else {
                continue;
            };
            let key = EntryKey::new(message.msgctxt(), message.msgid());
            let index = self
                .index
                .get(&key)
                .copied()
                .flatten()
                .ok_or_else(|| {
                    MtError::CatalogError(format!(
                        "entry {:?} is not in the file",
                        message.msgid()
                    ))
                })?;
            if self.entries[index].msgstr != msgstr {
                self.replace_msgstr(index, msgstr);
                updated += 1;
            }
        }
        Ok(updated)
    }

    fn replace_msgstr(&mut self, index: usize, msgstr: &str) {
        let range = self.entries[index].msgstr_lines.clone();
        let terminator = line_terminator(&self.lines[range.end - 1]).to_string();

        let segments: Vec<&str> = msgstr.split_inclusive('\n').collect();
        let rendered = if segments.len() <= 1 {
            format!("msgstr \"{}\"{terminator}", escape(msgstr))
        } else {
            let mut rendered = format!("msgstr \"\"{}", self.newline);
            let last = segments.len() - 1;
            for (i, segment) in segments.iter().enumerate() {
                let end = if i == last { terminator.as_str() } else { self.newline };
                rendered.push_str(&format!("\"{}\"{end}", escape(segment)));
            }
            rendered
        };

        // Keep line numbers stable: the first line carries the new text, the
        // rest of the old range becomes empty.
        self.lines[range.start] = rendered;
        for line in &mut self.lines[range.start + 1..range.end] {
            line.clear();
        }
        self.entries[index].msgstr = msgstr.to_string();
    }

    /// The file contents with all updates applied.
    pub fn to_text(&self) -> String {
        self.lines.concat()
    }

    pub fn save(&self, path: &Path) -> MtResult<()> {
        std::fs::write(path, self.to_text()).map_err(|err| {
            MtError::CatalogError(format!("Could not write {}: {err}", path.display()))
        })
    }
}
