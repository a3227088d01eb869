use crate::error::{IniError, Result};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Entry
// ============================================================================

/// A single `key = value` line, with the comment lines written above it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: String,
    pub value: String,
    pub comments: Vec<String>,
    /// Indented lines that follow the key, e.g. the nested settings under
    /// `s3 =`. Kept verbatim, indentation included.
    pub children: Vec<String>,
}

// ============================================================================
// Section
// ============================================================================

/// A named, ordered block of unique keys.
///
/// The global section (entries before the first header) has an empty name and
/// is never rendered with a header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    name: String,
    comments: Vec<String>,
    /// Comment after the closing `]`, marker included.
    header_comment: Option<String>,
    entries: Vec<Entry>,
}

impl Section {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Comment lines (including their `#`/`;` marker) above the header.
    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    pub fn header_comment(&self) -> Option<&str> {
        self.header_comment.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.value.as_str())
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.entries.iter().any(|e| e.key == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Iterate `(key, value)` pairs in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|e| (e.key.as_str(), e.value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Set `key` to `value`, replacing an existing value (and any nested lines)
    /// in place or appending a new entry at the end of the section.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let key = key.into();
        let value = value.into();
        validate_key(&key)?;
        if value.contains(['\n', '\r']) {
            return Err(IniError::InvalidValue { key });
        }

        match self.entries.iter_mut().find(|e| e.key == key) {
            Some(entry) => {
                entry.value = value;
                entry.children.clear();
            }
            None => self.entries.push(Entry {
                key,
                value,
                comments: Vec::new(),
                children: Vec::new(),
            }),
        }
        Ok(())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let idx = self.entries.iter().position(|e| e.key == key)?;
        Some(self.entries.remove(idx).value)
    }

    fn write_entries(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.entries.iter().map(|e| e.key.len()).max().unwrap_or(0);
        for entry in &self.entries {
            for comment in &entry.comments {
                writeln!(f, "{}", comment)?;
            }
            if entry.value.is_empty() {
                writeln!(f, "{:<width$} =", entry.key)?;
            } else {
                writeln!(f, "{:<width$} = {}", entry.key, entry.value)?;
            }
            for child in &entry.children {
                writeln!(f, "{}", child)?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// Document
// ============================================================================

/// An INI document whose section names are unique and whose sections and keys
/// keep their insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    global: Section,
    sections: Vec<Section>,
    trailing_comments: Vec<String>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a document from text.
    ///
    /// A repeated `[header]` merges its keys into the first section of that
    /// name; a repeated key overwrites the earlier value in place.
    ///
    /// An indented line directly under a key belongs to that key (the AWS
    /// nested sub-property form) and is kept verbatim. A header may carry a
    /// trailing `#` or `;` comment.
    pub fn parse(input: &str) -> Result<Self> {
        let mut doc = Document::new();
        // None means the global section.
        let mut current: Option<usize> = None;
        // Index of the entry that indented lines attach to.
        let mut parent: Option<usize> = None;
        let mut pending: Vec<String> = Vec::new();

        for (idx, raw) in input.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();

            if line.is_empty() {
                continue;
            }
            if raw.starts_with([' ', '\t'])
                && !line.starts_with('[')
                && let Some(entry_idx) = parent
            {
                let section = match current {
                    Some(pos) => &mut doc.sections[pos],
                    None => &mut doc.global,
                };
                section.entries[entry_idx]
                    .children
                    .push(raw.trim_end().to_string());
                continue;
            }

            if line.starts_with('#') || line.starts_with(';') {
                pending.push(line.to_string());
                parent = None;
                continue;
            }

            if let Some(rest) = line.strip_prefix('[') {
                let Some(close) = rest.find(']') else {
                    return Err(IniError::Parse {
                        line: line_no,
                        message: "section header is missing ']'".into(),
                    });
                };
                let name = rest[..close].trim();
                let trailing = rest[close + 1..].trim();
                let header_comment = if trailing.is_empty() {
                    None
                } else if trailing.starts_with(['#', ';']) {
                    Some(trailing.to_string())
                } else {
                    return Err(IniError::Parse {
                        line: line_no,
                        message: format!(
                            "unexpected text after section header: {:?}",
                            trailing
                        ),
                    });
                };
                if name.is_empty() {
                    return Err(IniError::Parse {
                        line: line_no,
                        message: "section name is empty".into(),
                    });
                }

                let pos = match doc.position(name) {
                    Some(pos) => pos,
                    None => {
                        doc.sections.push(Section::new(name));
                        doc.sections.len() - 1
                    }
                };
                let section = &mut doc.sections[pos];
                section.comments.append(&mut pending);
                if header_comment.is_some() {
                    section.header_comment = header_comment;
                }
                current = Some(pos);
                parent = None;
                continue;
            }

            let Some(split) = line.find(['=', ':']) else {
                return Err(IniError::Parse {
                    line: line_no,
                    message: format!("expected `key = value`, found {:?}", line),
                });
            };
            let key = line[..split].trim();
            let value = line[split + 1..].trim();
            if key.is_empty() {
                return Err(IniError::Parse {
                    line: line_no,
                    message: "key is empty".into(),
                });
            }

            let section = match current {
                Some(pos) => &mut doc.sections[pos],
                None => &mut doc.global,
            };
            match section.entries.iter().position(|e| e.key == key) {
                Some(pos) => {
                    let entry = &mut section.entries[pos];
                    entry.value = value.to_string();
                    entry.children.clear();
                    entry.comments.append(&mut pending);
                    parent = Some(pos);
                }
                None => {
                    section.entries.push(Entry {
                        key: key.to_string(),
                        value: value.to_string(),
                        comments: std::mem::take(&mut pending),
                        children: Vec::new(),
                    });
                    parent = Some(section.entries.len() - 1);
                }
            }
        }

        doc.trailing_comments = pending;
        Ok(doc)
    }

    /// Keys that appear before the first section header.
    pub fn global(&self) -> &Section {
        &self.global
    }

    pub fn global_mut(&mut self) -> &mut Section {
        &mut self.global
    }

    /// Named sections in document order.
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    pub fn section_names(&self) -> Vec<String> {
        self.sections.iter().map(|s| s.name.clone()).collect()
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn section_mut(&mut self, name: &str) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| s.name == name)
    }

    pub fn contains_section(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Number of named sections.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty() && self.global.is_empty()
    }

    /// Append a new, empty section and return it for population.
    pub fn new_section(&mut self, name: &str) -> Result<&mut Section> {
        validate_section_name(name)?;
        if self.contains_section(name) {
            return Err(IniError::DuplicateSection(name.to_string()));
        }
        self.sections.push(Section::new(name));
        let last = self.sections.len() - 1;
        Ok(&mut self.sections[last])
    }

    /// Remove the named section, returning it if it existed.
    pub fn delete_section(&mut self, name: &str) -> Option<Section> {
        let pos = self.position(name)?;
        Some(self.sections.remove(pos))
    }

    /// Keep only the sections for which `keep` returns true.
    pub fn retain_sections(&mut self, mut keep: impl FnMut(&Section) -> bool) {
        self.sections.retain(|s| keep(s));
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.name == name)
    }
}

impl FromStr for Document {
    type Err = IniError;

    fn from_str(s: &str) -> Result<Self> {
        Document::parse(s)
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;

        if !self.global.is_empty() {
            self.global.write_entries(f)?;
            first = false;
        }

        for section in &self.sections {
            if !first {
                writeln!(f)?;
            }
            first = false;
            for comment in &section.comments {
                writeln!(f, "{}", comment)?;
            }
            match &section.header_comment {
                Some(comment) => writeln!(f, "[{}] {}", section.name, comment)?,
                None => writeln!(f, "[{}]", section.name)?,
            }
            section.write_entries(f)?;
        }

        if !self.trailing_comments.is_empty() {
            if !first {
                writeln!(f)?;
            }
            for comment in &self.trailing_comments {
                writeln!(f, "{}", comment)?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// Validation
// ============================================================================

fn validate_section_name(name: &str) -> Result<()> {
    let reason = if name.trim().is_empty() {
        "name is empty"
    } else if name.trim() != name {
        "name has leading or trailing whitespace"
    } else if name.contains(['[', ']']) {
        "name contains a bracket"
    } else if name.contains(['\n', '\r']) {
        "name contains a line break"
    } else {
        return Ok(());
    };
    Err(IniError::InvalidSectionName {
        name: name.to_string(),
        reason,
    })
}

fn validate_key(key: &str) -> Result<()> {
    let reason = if key.trim().is_empty() {
        "key is empty"
    } else if key.trim() != key {
        "key has leading or trailing whitespace"
    } else if key.contains(['=', ':']) {
        "key contains a delimiter"
    } else if key.contains(['\n', '\r']) {
        "key contains a line break"
    } else if key.starts_with(['[', '#', ';']) {
        "key starts with a reserved character"
    } else {
        return Ok(());
    };
    Err(IniError::InvalidKey {
        key: key.to_string(),
        reason,
    })
}

// ============================================================================
// Tests
// ============================================================================
