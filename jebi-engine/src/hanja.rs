//! Hanja and symbol dictionaries.
//!
//! Tables are plain text, one `key:value:comment` entry per line, with `#`
//! comment lines. Lookup is by suffix so that a jamo-typed key and the
//! precomposed spelling both resolve.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HanjaTableError {
    #[error("failed to read hanja table: {0}")]
    Io(#[from] std::io::Error),
}

/// One dictionary entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hanja {
    key: String,
    value: String,
    comment: String,
}

impl Hanja {
    pub fn new(
        key: impl Into<String>,
        value: impl Into<String>,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            comment: comment.into(),
        }
    }

    /// The Hangul reading this entry replaces.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The replacement text.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }
}

/// A dictionary keyed by reading. The symbol table and the Hanja table are
/// both instances of this type.
#[derive(Debug, Default)]
pub struct HanjaTable {
    index: HashMap<String, Vec<Hanja>>,
    len: usize,
}

impl HanjaTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self, HanjaTableError> {
        let content = fs::read_to_string(path)?;
        let table = Self::parse(&content);
        tracing::debug!("loaded {} entries from {:?}", table.len(), path);
        Ok(table)
    }

    /// Parse table text. Malformed lines are skipped.
    pub fn parse(content: &str) -> Self {
        let mut table = Self::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.splitn(3, ':');
            let (Some(key), Some(value)) = (parts.next(), parts.next()) else {
                continue;
            };
            if key.is_empty() || value.is_empty() {
                continue;
            }
            table.insert(Hanja::new(key, value, parts.next().unwrap_or("")));
        }
        table
    }

    pub fn insert(&mut self, entry: Hanja) {
        self.index
            .entry(entry.key.clone())
            .or_default()
            .push(entry);
        self.len += 1;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Entries whose key equals `key` exactly.
    pub fn match_exact(&self, key: &str) -> &[Hanja] {
        self.index.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Entries whose key equals any suffix of `key`, longest suffix first.
    pub fn match_suffix(&self, key: &str) -> Vec<&Hanja> {
        let mut out = Vec::new();
        for (i, _) in key.char_indices() {
            out.extend(self.match_exact(&key[i..]));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_comments_and_garbage() {
        let table = HanjaTable::parse("# header\n가:家:집 가\nbroken line\n:empty:\n");
        assert_eq!(table.len(), 1);
        assert_eq!(table.match_exact("가")[0].value(), "家");
    }

    #[test]
    fn test_match_suffix_longest_first() {
        let table = HanjaTable::parse("수도:首都:\n도:道:\n");
        let hits = table.match_suffix("수도");
        let values: Vec<_> = hits.iter().map(|h| h.value()).collect();
        assert_eq!(values, ["首都", "道"]);
    }

    #[test]
    fn test_match_suffix_no_hit() {
        let table = HanjaTable::parse("가:家:\n");
        assert!(table.match_suffix("나").is_empty());
    }

    #[test]
    fn test_load_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# jebi symbol table\n가:家:집 가\n나:奈:").unwrap();

        let table = HanjaTable::load(file.path()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.match_exact("나")[0].value(), "奈");
    }

    #[test]
    fn test_load_missing_file_errors() {
        assert!(HanjaTable::load(Path::new("/nonexistent/jebi.txt")).is_err());
    }
}
