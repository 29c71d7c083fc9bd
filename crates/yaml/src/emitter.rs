//! Block style YAML writer with comment support

use cogwheel_core::{Number, Section, Value};
use serde_yaml::Value as YamlValue;

const MAX_IMPLICIT_KEY: usize = 1024;

/// Writes sections as block style YAML
pub(crate) struct Emitter {
    out: String,
    indent: usize,
    comments: bool,
}

impl Emitter {
    pub(crate) fn new(indent: usize, comments: bool) -> Self {
        Self {
            out: String::new(),
            indent: indent.max(1),
            comments,
        }
    }

    /// Render a whole document
    pub(crate) fn document(mut self, section: &Section) -> String {
        if section.is_empty() {
            return "{}\n".to_string();
        }
        self.section(section, 0);
        self.out
    }

    fn section(&mut self, section: &Section, column: usize) {
        for entry in section {
            if self.comments {
                for comment in &entry.comments {
                    self.comment(comment, column);
                }
            }
            self.key(&entry.key, column);
            let inline = if self.comments {
                entry.inline_comment.as_deref()
            } else {
                None
            };
            self.value_after_key(&entry.value, column, inline);
        }
    }

    /// Keys too long for an implicit key are written as `? key` then `:`
    fn key(&mut self, key: &str, column: usize) {
        let key = quote(key);
        self.pad(column);
        if key.chars().count() > MAX_IMPLICIT_KEY {
            self.out.push_str("? ");
            self.out.push_str(&key);
            self.out.push('\n');
            self.pad(column);
        } else {
            self.out.push_str(&key);
        }
        self.out.push(':');
    }

    fn value_after_key(&mut self, value: &Value, column: usize, inline: Option<&str>) {
        match value {
            Value::Array(items) if !items.is_empty() => {
                self.inline_comment(inline);
                self.out.push('\n');
                self.sequence(items, column + self.indent);
            }
            Value::Map(section) if !section.is_empty() => {
                self.inline_comment(inline);
                self.out.push('\n');
                self.section(section, column + self.indent);
            }
            scalar => {
                self.out.push(' ');
                self.out.push_str(&scalar_text(scalar));
                self.inline_comment(inline);
                self.out.push('\n');
            }
        }
    }

    fn sequence(&mut self, items: &[Value], column: usize) {
        for item in items {
            self.pad(column);
            self.out.push('-');
            match item {
                Value::Map(section) if !section.is_empty() => {
                    let nested = column + 2;
                    let mut child = Emitter::new(self.indent, self.comments);
                    child.section(section, nested);
                    let rendered = child.out;
                    let prefix = " ".repeat(nested);
                    match rendered.strip_prefix(prefix.as_str()) {
                        Some(rest) => {
                            self.out.push(' ');
                            self.out.push_str(rest);
                        }
                        None => {
                            self.out.push('\n');
                            self.out.push_str(&rendered);
                        }
                    }
                }
                Value::Array(nested) if !nested.is_empty() => {
                    self.out.push('\n');
                    self.sequence(nested, column + self.indent);
                }
                scalar => {
                    self.out.push(' ');
                    self.out.push_str(&scalar_text(scalar));
                    self.out.push('\n');
                }
            }
        }
    }

    fn comment(&mut self, comment: &str, column: usize) {
        for line in comment.split('\n') {
            if line.trim().is_empty() {
                self.out.push('\n');
                continue;
            }
            self.pad(column);
            self.out.push_str("# ");
            self.out.push_str(line.trim_end());
            self.out.push('\n');
        }
    }

    fn inline_comment(&mut self, comment: Option<&str>) {
        if let Some(comment) = comment.map(|c| c.replace('\n', " ")) {
            if !comment.trim().is_empty() {
                self.out.push_str(" # ");
                self.out.push_str(comment.trim());
            }
        }
    }

    fn pad(&mut self, column: usize) {
        self.out.extend(std::iter::repeat(' ').take(column));
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_text(*n),
        Value::String(s) => quote(s),
        Value::Array(_) => "[]".to_string(),
        Value::Map(_) => "{}".to_string(),
    }
}

/// Integers outside `i64` and `u64` are written as floats
fn number_text(number: Number) -> String {
    match number {
        Number::Int(i) if number.as_i64().is_some() || number.as_u64().is_some() => i.to_string(),
        other => float_text(other.as_f64()),
    }
}

fn float_text(f: f64) -> String {
    if f.is_nan() {
        ".nan".to_string()
    } else if f == f64::INFINITY {
        ".inf".to_string()
    } else if f == f64::NEG_INFINITY {
        "-.inf".to_string()
    } else {
        format!("{:?}", f)
    }
}

/// Write `s` plain when it reads back as the same string, double quoted otherwise
pub(crate) fn quote(s: &str) -> String {
    if is_plain(s) {
        s.to_string()
    } else {
        double_quoted(s)
    }
}

fn is_plain(s: &str) -> bool {
    let first = match s.chars().next() {
        Some(c) => c,
        None => return false,
    };
    if s.trim() != s || "-?:,[]{}#&*!|>'\"%@`".contains(first) {
        return false;
    }
    if s.contains(": ") || s.contains(" #") || s.ends_with(':') {
        return false;
    }
    if s.chars().any(|c| c.is_control() || is_unicode_break(c)) {
        return false;
    }
    matches!(
        serde_yaml::from_str::<YamlValue>(s),
        Ok(YamlValue::String(ref parsed)) if parsed == s
    )
}

/// Line and paragraph separators break lines in YAML
fn is_unicode_break(c: char) -> bool {
    c == '\u{2028}' || c == '\u{2029}'
}

fn double_quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' => out.push_str("\\L"),
            '\u{2029}' => out.push_str("\\P"),
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emit(section: &Section) -> String {
        Emitter::new(2, true).document(section)
    }

    #[test]
    fn test_quoting() {
        assert_eq!(quote("hello world"), "hello world");
        assert_eq!(quote("localhost:8080"), "localhost:8080");
        assert_eq!(quote(""), "\"\"");
        assert_eq!(quote("true"), "\"true\"");
        assert_eq!(quote("10"), "\"10\"");
        assert_eq!(quote("~"), "\"~\"");
        assert_eq!(quote("a: b"), "\"a: b\"");
        assert_eq!(quote("#tag"), "\"#tag\"");
        assert_eq!(quote("  padded"), "\"  padded\"");
        assert_eq!(quote("line1\nline2"), "\"line1\\nline2\"");
        assert_eq!(quote("say \"hi\""), "say \"hi\"");
        assert_eq!(quote("- item"), "\"- item\"");
        assert_eq!(quote("a\u{2028}b"), "\"a\\Lb\"");
        assert_eq!(quote("a\u{2029}b"), "\"a\\Pb\"");
    }

    #[test]
    fn test_long_keys_are_explicit() {
        let long = "k".repeat(1100);
        let mut inner = Section::new();
        inner.insert("x", 1);
        let mut section = Section::new();
        section.insert(long.as_str(), "v");
        section.insert("short", 1);
        section.insert(format!("{}2", long), inner);

        assert_eq!(
            emit(&section),
            format!("? {long}\n: v\nshort: 1\n? {long}2\n:\n  x: 1\n", long = long)
        );

        let edge = "k".repeat(1024);
        let section: Section = [(edge.clone(), 1)].into_iter().collect();
        assert_eq!(emit(&section), format!("{}: 1\n", edge));
    }

    #[test]
    fn test_scalars() {
        assert_eq!(scalar_text(&Value::from(0.5)), "0.5");
        assert_eq!(scalar_text(&Value::from(3.0)), "3.0");
        assert_eq!(scalar_text(&Value::from(f64::NEG_INFINITY)), "-.inf");
        assert_eq!(scalar_text(&Value::from(f64::NAN)), ".nan");
        assert_eq!(scalar_text(&Value::from(-7)), "-7");
        assert_eq!(scalar_text(&Value::Null), "null");
        assert_eq!(scalar_text(&Value::from(u64::MAX)), "18446744073709551615");
        assert_eq!(
            scalar_text(&Value::Number(Number::Int(i128::MAX))),
            "1.7014118346046923e38"
        );
    }

    #[test]
    fn test_document() {
        let mut server = Section::new();
        server.insert("host", "localhost");
        server.insert("port", 8080);

        let users: Vec<Value> = [("alice", true), ("bob", false)]
            .iter()
            .map(|(name, admin)| {
                let mut user = Section::new();
                user.insert("name", *name);
                user.insert("admin", *admin);
                Value::Map(user)
            })
            .collect();

        let mut section = Section::new();
        section.insert("name", "cog");
        section.set_comments("name", ["Application name"]);
        section.set_inline_comment("name", "required");
        section.insert("server", server);
        section.set_inline_comment("server", "network");
        section.insert("tags", Value::Array(vec![Value::from("a"), Value::from("b")]));
        section.insert("empty", Value::Array(vec![]));
        section.insert("nothing", Section::new());
        section.insert("ratio", 0.5);
        section.insert("missing", Value::Null);
        section.insert("users", Value::Array(users));

        let expected = "\
# Application name
name: cog # required
server: # network
  host: localhost
  port: 8080
tags:
  - a
  - b
empty: []
nothing: {}
ratio: 0.5
missing: null
users:
  - name: alice
    admin: true
  - name: bob
    admin: false
";
        assert_eq!(emit(&section), expected);
    }

    #[test]
    fn test_comment_lines() {
        let mut section = Section::new();
        section.insert("a", 1);
        section.set_comments("a", ["", "first\nsecond"]);
        assert_eq!(emit(&section), "\n# first\n# second\na: 1\n");

        let without = Emitter::new(2, false).document(&section);
        assert_eq!(without, "a: 1\n");
    }

    #[test]
    fn test_nested_sequences_and_indent() {
        let mut section = Section::new();
        section.insert(
            "matrix",
            Value::Array(vec![
                Value::Array(vec![Value::from(1), Value::from(2)]),
                Value::Array(vec![]),
            ]),
        );
        assert_eq!(emit(&section), "matrix:\n  -\n    - 1\n    - 2\n  - []\n");

        let mut inner = Section::new();
        inner.insert("b", "x");
        let mut outer = Section::new();
        outer.insert("a", inner);
        assert_eq!(Emitter::new(4, true).document(&outer), "a:\n    b: x\n");
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(emit(&Section::new()), "{}\n");
    }

    #[test]
    fn test_map_in_sequence_with_comments() {
        let mut item = Section::new();
        item.insert("id", 1);
        item.set_comments("id", ["identifier"]);
        let mut section = Section::new();
        section.insert("items", Value::Array(vec![Value::Map(item)]));
        assert_eq!(emit(&section), "items:\n  - # identifier\n    id: 1\n");
    }
}
