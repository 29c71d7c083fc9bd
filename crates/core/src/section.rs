//! Ordered, commented key/value mappings
//!
//! A [`Section`] is what every format encodes and decodes. Keys keep their
//! insertion order and each entry can carry comment lines and an inline
//! comment for formats that support them.

use crate::number::Number;
use crate::value::Value;

/// A key, its value and the comments attached to it
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub key: String,
    pub value: Value,
    /// Comment lines written above the entry; an empty line is a blank comment
    pub comments: Vec<String>,
    pub inline_comment: Option<String>,
}

impl Entry {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            comments: Vec::new(),
            inline_comment: None,
        }
    }
}

/// An ordered mapping of unique keys to values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Section {
    entries: Vec<Entry>,
}

impl Section {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entry(key).map(|e| &e.value)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        let index = self.position(key)?;
        Some(&mut self.entries[index].value)
    }

    pub fn entry(&self, key: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.key == key)
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Insert or replace a value.
    ///
    /// Replacing keeps the entry's position and comments and returns the
    /// previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.position(&key) {
            Some(index) => Some(std::mem::replace(&mut self.entries[index].value, value)),
            None => {
                self.entries.push(Entry::new(key, value));
                None
            }
        }
    }

    /// Insert a complete entry, replacing any entry with the same key in place
    pub fn push_entry(&mut self, entry: Entry) {
        match self.position(&entry.key) {
            Some(index) => self.entries[index] = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let index = self.position(key)?;
        Some(self.entries.remove(index).value)
    }

    /// Attach comment lines to an existing key; returns `false` if absent
    pub fn set_comments<I, S>(&mut self, key: &str, comments: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        match self.position(key) {
            Some(index) => {
                self.entries[index].comments = comments.into_iter().map(Into::into).collect();
                true
            }
            None => false,
        }
    }

    /// Attach an inline comment to an existing key; returns `false` if absent
    pub fn set_inline_comment(&mut self, key: &str, comment: impl Into<String>) -> bool {
        match self.position(key) {
            Some(index) => {
                self.entries[index].inline_comment = Some(comment.into());
                true
            }
            None => false,
        }
    }

    pub fn comments(&self, key: &str) -> Option<&[String]> {
        self.entry(key).map(|e| e.comments.as_slice())
    }

    pub fn inline_comment(&self, key: &str) -> Option<&str> {
        self.entry(key).and_then(|e| e.inline_comment.as_deref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|e| (e.key.as_str(), &e.value))
    }

    pub fn get_number(&self, key: &str) -> Option<Number> {
        self.get(key).and_then(Value::as_number)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    pub fn get_array(&self, key: &str) -> Option<&[Value]> {
        self.get(key).and_then(Value::as_array)
    }

    pub fn get_section(&self, key: &str) -> Option<&Section> {
        self.get(key).and_then(Value::as_section)
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.key == key)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Section {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut section = Section::new();
        for (key, value) in iter {
            section.insert(key, value);
        }
        section
    }
}

impl IntoIterator for Section {
    type Item = Entry;
    type IntoIter = std::vec::IntoIter<Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Section {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
