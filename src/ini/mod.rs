//! INI store
//!
//! Order- and comment-preserving model of an INI text file, with a
//! "current section" cursor used for lookup and incremental mutation.
//!
//! Lines that are not valid UTF-8 are looked up through a lossy decoding
//! but written back with their original bytes.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IniError {
    #[error("cannot open {path:?}: {source}")]
    Open { path: PathBuf, source: io::Error },

    #[error("cannot read {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("cannot write {path:?}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("no section selected")]
    NoSection,

    #[error("invalid section name {name:?}: {reason}")]
    InvalidSection { name: String, reason: &'static str },

    #[error("invalid entry {key:?} = {value:?}: {reason}")]
    InvalidEntry {
        key: String,
        value: String,
        reason: &'static str,
    },
}

/// A key/value pair. An empty key marks a comment line kept verbatim in `value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: String,
    pub value: String,
    raw: Option<Vec<u8>>,
}

impl Entry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            raw: None,
        }
    }

    pub fn comment(line: impl Into<String>) -> Self {
        Self::new(String::new(), line)
    }

    pub fn is_comment(&self) -> bool {
        self.key.is_empty()
    }
}

/// A named, ordered group of entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    pub entries: Vec<Entry>,
    raw: Option<Vec<u8>>,
}

impl Section {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
            raw: None,
        }
    }

    fn find(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.key == key)
    }
}

/// In-memory INI document bound to the file it was opened from.
///
/// The cursor is an index into `sections`; `None` means "past the end",
/// which is where a failed [`IniStore::set_section`] leaves it.
#[derive(Debug, Default)]
pub struct IniStore {
    sections: Vec<Section>,
    cursor: Option<usize>,
    path: Option<PathBuf>,
    dirty: bool,
}

impl IniStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Path the store was last opened from
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// True if sections or entries were added or removed since load
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Index of the section under the cursor
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Parse an existing file, or create an empty one if it is absent.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<(), IniError> {
        let path = path.as_ref();
        match self.try_open(path) {
            Ok(()) => Ok(()),
            Err(IniError::Open { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("Creating new config file {:?}", path);
                File::create(path).map_err(|source| IniError::Open {
                    path: path.to_path_buf(),
                    source,
                })?;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Parse an existing file without creating anything.
    ///
    /// Any previously loaded content is discarded first.
    pub fn try_open(&mut self, path: impl AsRef<Path>) -> Result<(), IniError> {
        let path = path.as_ref();
        self.reset();
        self.path = Some(path.to_path_buf());

        let file = File::open(path).map_err(|source| IniError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        self.parse(BufReader::new(file))
            .map_err(|source| IniError::Read {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Append the contents of `reader` to the store.
    ///
    /// Malformed lines are skipped; only a read fault is an error.
    pub fn parse<R: BufRead>(&mut self, mut reader: R) -> io::Result<()> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                return Ok(());
            }

            let line = strip_line_end(&buf);
            if line.is_empty() {
                continue;
            }

            match std::str::from_utf8(line) {
                Ok(text) => self.parse_line(text, None),
                Err(_) => {
                    let text = String::from_utf8_lossy(line);
                    self.parse_line(&text, Some(line.to_vec()));
                }
            }
        }
    }

    fn parse_line(&mut self, line: &str, raw: Option<Vec<u8>>) {
        if line.starts_with(';') || line.starts_with('#') {
            if let Some(last) = self.sections.last_mut() {
                let mut entry = Entry::comment(line);
                entry.raw = raw;
                last.entries.push(entry);
            }
        } else if line.starts_with('[') {
            if let Some(name) = parse_section(line) {
                let mut section = Section::new(name);
                section.raw = raw;
                self.sections.push(section);
            }
        } else if let Some(mut entry) = parse_key(line) {
            // Keys before the first header have nowhere to go
            if let Some(last) = self.sections.last_mut() {
                entry.raw = raw;
                last.entries.push(entry);
            }
        }
    }

    /// Move the cursor to the first section called `name`.
    pub fn set_section(&mut self, name: &str) -> bool {
        self.cursor = self.sections.iter().position(|s| s.name == name);
        self.cursor.is_some()
    }

    /// Insert an empty section at the cursor and select it.
    ///
    /// With the cursor past the end (the state after a failed lookup)
    /// the section is appended. Names containing `]` or a line break
    /// would not read back and are rejected.
    pub fn add_section(&mut self, name: &str) -> Result<(), IniError> {
        if let Some(reason) = check_section(name) {
            return Err(IniError::InvalidSection {
                name: name.to_string(),
                reason,
            });
        }

        let at = self
            .cursor
            .filter(|&i| i < self.sections.len())
            .unwrap_or(self.sections.len());
        self.sections.insert(at, Section::new(name));
        self.cursor = Some(at);
        self.dirty = true;
        Ok(())
    }

    /// First value stored under `key` in the current section
    pub fn value(&self, key: &str) -> Option<&str> {
        let section = self.current()?;
        section
            .find(key)
            .map(|i| section.entries[i].value.as_str())
    }

    /// Append an entry to the current section. Duplicates are kept.
    ///
    /// An empty key adds a comment, so `value` must then start with `;` or
    /// `#`. Otherwise the key may not contain `=`, end in a space or start
    /// with `[`, `;` or `#`, and the value may not start with a space.
    /// Neither may contain a line break.
    pub fn add_value(&mut self, key: &str, value: &str) -> Result<(), IniError> {
        if let Some(reason) = check_entry(key, value) {
            return Err(IniError::InvalidEntry {
                key: key.to_string(),
                value: value.to_string(),
                reason,
            });
        }

        let section = self.current_mut().ok_or(IniError::NoSection)?;
        section.entries.push(Entry::new(key, value));
        self.dirty = true;
        Ok(())
    }

    /// Remove the first entry stored under `key` in the current section.
    pub fn remove_value(&mut self, key: &str) {
        let Some(section) = self.current_mut() else {
            return;
        };
        if let Some(i) = section.find(key) {
            section.entries.remove(i);
            self.dirty = true;
        }
    }

    /// Serialize every section to `path`.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), IniError> {
        let path = path.as_ref();
        let write_err = |source| IniError::Write {
            path: path.to_path_buf(),
            source,
        };

        let file = File::create(path).map_err(write_err)?;
        let mut out = BufWriter::new(file);
        self.write_to(&mut out).map_err(write_err)?;
        out.flush().map_err(write_err)
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for section in &self.sections {
            match &section.raw {
                Some(raw) => write_raw(out, raw)?,
                None => writeln!(out, "[{}]", section.name)?,
            }
            for entry in &section.entries {
                match &entry.raw {
                    Some(raw) => write_raw(out, raw)?,
                    None if entry.is_comment() => writeln!(out, "{}", entry.value)?,
                    None => writeln!(out, "{} = {}", entry.key, entry.value)?,
                }
            }
            writeln!(out)?;
        }
        Ok(())
    }

    /// Write back to the opened path if dirty, then drop all content.
    ///
    /// A store that was never opened has nowhere to write to. Calling it
    /// again is a no-op.
    pub fn close(&mut self) -> Result<(), IniError> {
        let result = match &self.path {
            Some(path) if self.dirty => {
                let written = self.write(path);
                if written.is_ok() {
                    tracing::info!("Configuration saved to {:?}", path);
                }
                written
            }
            _ => Ok(()),
        };

        self.reset();
        result
    }

    fn reset(&mut self) {
        self.sections.clear();
        self.cursor = None;
        self.dirty = false;
    }

    fn current(&self) -> Option<&Section> {
        self.cursor.and_then(|i| self.sections.get(i))
    }

    fn current_mut(&mut self) -> Option<&mut Section> {
        self.cursor.and_then(|i| self.sections.get_mut(i))
    }
}

impl Drop for IniStore {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::error!("{}", e);
        }
    }
}

fn strip_line_end(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn write_raw<W: Write>(out: &mut W, raw: &[u8]) -> io::Result<()> {
    out.write_all(raw)?;
    out.write_all(b"\n")
}

/// `[name]` → `name`; anything after the first `]` is ignored.
fn parse_section(line: &str) -> Option<&str> {
    let end = line.find(']')?;
    Some(&line[1..end])
}

/// `key = value`, tolerant of spacing around `=`.
fn parse_key(line: &str) -> Option<Entry> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim_end_matches(' ');
    if key.is_empty() {
        return None;
    }
    Some(Entry::new(key, value.trim_start_matches(' ')))
}

fn check_section(name: &str) -> Option<&'static str> {
    if name.contains([']', '\n', '\r']) {
        return Some("contains ']' or a line break");
    }
    None
}

fn check_entry(key: &str, value: &str) -> Option<&'static str> {
    if value.contains(['\n', '\r']) {
        return Some("value contains a line break");
    }
    if key.is_empty() {
        if !value.starts_with([';', '#']) {
            return Some("comment must start with ';' or '#'");
        }
        return None;
    }
    if key.contains(['=', '\n', '\r']) {
        return Some("key contains '=' or a line break");
    }
    if key.ends_with(' ') {
        return Some("key ends with a space");
    }
    if key.starts_with(['[', ';', '#']) {
        return Some("key starts with '[', ';' or '#'");
    }
    if value.starts_with(' ') {
        return Some("value starts with a space");
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parsed(text: &str) -> IniStore {
        let mut ini = IniStore::new();
        ini.parse(Cursor::new(text)).unwrap();
        ini
    }

    fn rendered(ini: &IniStore) -> String {
        let mut out = Vec::new();
        ini.write_to(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_parse_sections_and_keys() {
        let ini = parsed("[Audio]\nFrequency=48000\nChannels   =   2  \n\n[Console]\nAnsi = true\n");
        let sections = ini.sections();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].name, "Audio");
        assert_eq!(sections[0].entries[0], Entry::new("Frequency", "48000"));
        // trailing spaces of the value are kept
        assert_eq!(sections[0].entries[1], Entry::new("Channels", "2  "));
        assert_eq!(sections[1].entries, vec![Entry::new("Ansi", "true")]);
        assert!(!ini.is_dirty());
    }

    #[test]
    fn test_parse_skips_malformed_lines() {
        let ini = parsed(
            "orphan = 1\n; orphan comment\n[Broken\n[Ok]\nno equals here\n= nokey\nkey = v\n",
        );
        assert_eq!(ini.sections().len(), 1);
        assert_eq!(ini.sections()[0].name, "Ok");
        assert_eq!(ini.sections()[0].entries, vec![Entry::new("key", "v")]);
    }

    #[test]
    fn test_parse_comments_and_crlf() {
        let ini = parsed("[S]\r\na = 1\r\n; note\r\n# other\r\nb = 2\r\n");
        let entries = &ini.sections()[0].entries;
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[1], Entry::comment("; note"));
        assert_eq!(entries[2], Entry::comment("# other"));
        assert_eq!(entries[3], Entry::new("b", "2"));
    }

    #[test]
    fn test_section_header_trailing_text() {
        let ini = parsed("[Name] ; trailing\nk = v\n");
        assert_eq!(ini.sections()[0].name, "Name");
    }

    #[test]
    fn test_lookup_first_duplicate_wins() {
        let mut ini = parsed("[S]\nk = first\nk = second\n");
        assert!(ini.set_section("S"));
        assert_eq!(ini.value("k"), Some("first"));
        ini.remove_value("k");
        assert_eq!(ini.value("k"), Some("second"));
        assert!(ini.is_dirty());
    }

    #[test]
    fn test_value_without_section() {
        let mut ini = parsed("[S]\nk = v\n");
        assert_eq!(ini.value("k"), None);
        assert!(!ini.set_section("Missing"));
        assert_eq!(ini.value("k"), None);
        assert!(matches!(ini.add_value("k", "x"), Err(IniError::NoSection)));
        assert!(!ini.is_dirty());
    }

    #[test]
    fn test_add_section_appends_after_failed_lookup() {
        let mut ini = parsed("[A]\n[B]\n");
        assert!(!ini.set_section("C"));
        ini.add_section("C").unwrap();
        let names: Vec<_> = ini.sections().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["A", "B", "C"]);
        assert_eq!(ini.cursor(), Some(2));
        assert!(ini.is_dirty());
    }

    #[test]
    fn test_add_section_inserts_at_cursor() {
        let mut ini = parsed("[A]\n[B]\n");
        assert!(ini.set_section("B"));
        ini.add_section("New").unwrap();
        let names: Vec<_> = ini.sections().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["A", "New", "B"]);
        ini.add_value("k", "v").unwrap();
        assert_eq!(ini.sections()[1].entries, vec![Entry::new("k", "v")]);
    }

    #[test]
    fn test_remove_missing_key_is_not_a_mutation() {
        let mut ini = parsed("[S]\nk = v\n");
        ini.set_section("S");
        ini.remove_value("absent");
        assert!(!ini.is_dirty());
    }

    #[test]
    fn test_write_format() {
        let mut ini = parsed("[S]\nk=v\n; c\nempty =\n[T]\n");
        ini.set_section("T");
        ini.add_value("x", "").unwrap();
        assert_eq!(rendered(&ini), "[S]\nk = v\n; c\nempty = \n\n[T]\nx = \n\n");
    }

    #[test]
    fn test_round_trip_edge_entries() {
        let sections = [
            ("", vec![("k", "v")]),
            ("[nested", vec![("k", "a = b"), ("k", "")]),
            ("with space", vec![("", "; comment"), ("", "#comment"), ("  indented", "v")]),
            ("Café", vec![("key\t", "\tvalue  "), ("k[0]", "x]"), ("ключ", "значение")]),
        ];

        let mut ini = IniStore::new();
        for (name, entries) in &sections {
            ini.set_section("never matches\n");
            ini.add_section(name).unwrap();
            for (key, value) in entries {
                ini.add_value(key, value).unwrap();
            }
        }

        let mut text = Vec::new();
        ini.write_to(&mut text).unwrap();
        let mut reparsed = IniStore::new();
        reparsed.parse(Cursor::new(&text)).unwrap();

        assert_eq!(reparsed.sections(), ini.sections());
    }

    #[test]
    fn test_add_rejects_entries_that_do_not_read_back() {
        let mut ini = parsed("[S]\nk = v\n");
        ini.set_section("S");

        let rejected = [
            ("k", " v"),
            ("a=b", "v"),
            ("k ", "v"),
            ("", "plain text"),
            ("", ""),
            ("[k", "v"),
            (";k", "v"),
            ("#k", "v"),
            ("k", "a\nb"),
            ("k", "v\r"),
            ("a\nb", "v"),
        ];
        for (key, value) in rejected {
            let result = ini.add_value(key, value);
            assert!(
                matches!(result, Err(IniError::InvalidEntry { .. })),
                "{key:?} = {value:?} accepted"
            );
        }

        for name in ["a]b", "a\nb", "a\rb"] {
            assert!(matches!(
                ini.add_section(name),
                Err(IniError::InvalidSection { .. })
            ));
        }

        assert!(!ini.is_dirty());
        assert_eq!(ini.sections().len(), 1);
        assert_eq!(ini.sections()[0].entries, vec![Entry::new("k", "v")]);
    }

    #[test]
    fn test_non_utf8_lines_are_kept() {
        let input: &[u8] = b"[Audio]\nFrequency = 22050\n; caf\xe9\nRom = /roms/k\xe9rnal\n\n";
        let mut ini = IniStore::new();
        ini.parse(Cursor::new(input)).unwrap();

        assert!(ini.set_section("Audio"));
        assert_eq!(ini.value("Frequency"), Some("22050"));
        assert_eq!(ini.value("Rom"), Some("/roms/k\u{fffd}rnal"));
        assert_eq!(ini.sections()[0].entries.len(), 3);
        assert!(ini.sections()[0].entries[1].is_comment());

        ini.add_value("Channels", "2").unwrap();
        let mut out = Vec::new();
        ini.write_to(&mut out).unwrap();
        assert_eq!(
            out,
            b"[Audio]\nFrequency = 22050\n; caf\xe9\nRom = /roms/k\xe9rnal\nChannels = 2\n\n"
        );
    }

    #[test]
    fn test_non_utf8_section_header() {
        let input: &[u8] = b"[Caf\xe9]\nk = v\n";
        let mut ini = IniStore::new();
        ini.parse(Cursor::new(input)).unwrap();
        assert_eq!(ini.sections()[0].name, "Caf\u{fffd}");

        let mut out = Vec::new();
        ini.write_to(&mut out).unwrap();
        assert_eq!(out, b"[Caf\xe9]\nk = v\n\n");
    }

    #[test]
    fn test_open_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new.ini");

        let mut ini = IniStore::new();
        ini.open(&path).unwrap();
        assert!(path.is_file());
        assert!(ini.sections().is_empty());
        assert_eq!(ini.path(), Some(path.as_path()));
    }

    #[test]
    fn test_try_open_does_not_create() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.ini");

        let mut ini = IniStore::new();
        assert!(matches!(ini.try_open(&path), Err(IniError::Open { .. })));
        assert!(!path.exists());
    }

    #[test]
    fn test_open_fails_in_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no").join("such").join("file.ini");

        let mut ini = IniStore::new();
        assert!(ini.open(&path).is_err());
    }

    #[test]
    fn test_close_writes_only_when_dirty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.ini");
        let original = "[S]\nk=v\n";
        std::fs::write(&path, original).unwrap();

        let mut ini = IniStore::new();
        ini.open(&path).unwrap();
        ini.close().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), original);

        ini.open(&path).unwrap();
        ini.set_section("S");
        ini.add_value("n", "1").unwrap();
        ini.close().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[S]\nk = v\nn = 1\n\n");

        // idempotent
        std::fs::write(&path, "changed").unwrap();
        ini.close().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "changed");
        assert!(ini.sections().is_empty());
        assert!(!ini.is_dirty());
    }

    #[test]
    fn test_comments_survive_write_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.ini");
        std::fs::write(&path, "[S]\na = 1\n; keep me\n# and me\nb = 2\n\n[T]\nc = 3\n\n").unwrap();

        let mut ini = IniStore::new();
        ini.open(&path).unwrap();
        ini.set_section("T");
        ini.add_value("d", "").unwrap();
        ini.close().unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "[S]\na = 1\n; keep me\n# and me\nb = 2\n\n[T]\nc = 3\nd = \n\n"
        );
    }

    #[test]
    fn test_drop_flushes_dirty_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.ini");

        {
            let mut ini = IniStore::new();
            ini.open(&path).unwrap();
            ini.add_section("S").unwrap();
            ini.add_value("k", "v").unwrap();
        }

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[S]\nk = v\n\n");
    }
}
