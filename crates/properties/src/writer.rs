//! Writer for `.properties` documents

use crate::{PropertiesFormat, FORMAT};
use cogwheel_core::{CogwheelError, Result, Section, Value};
use tracing::trace;

pub(crate) fn write(format: &PropertiesFormat, section: &Section) -> Result<String> {
    let marker = if format.exclamation_mark_comments { '!' } else { '#' };
    let separator = match (format.colon_separator, format.spaces_around_separator) {
        (true, true) => ": ",
        (true, false) => ":",
        (false, true) => " = ",
        (false, false) => "=",
    };

    let mut out = String::new();
    if !format.header.is_empty() {
        for line in &format.header {
            write_comment(&mut out, marker, line);
        }
        out.push('\n');
    }

    for entry in section {
        let value = match scalar_text(&entry.key, &entry.value)? {
            Some(value) => value,
            None => {
                trace!(key = %entry.key, "Skipping null property");
                continue;
            }
        };
        for comment in &entry.comments {
            write_comment(&mut out, marker, comment);
        }
        out.push_str(&escape(&entry.key, true));
        out.push_str(separator);
        out.push_str(&escape(&value, false));
        out.push('\n');
        if format.empty_line_between_entries {
            out.push('\n');
        }
    }

    Ok(out)
}

fn write_comment(out: &mut String, marker: char, comment: &str) {
    for line in comment.split('\n') {
        out.push(marker);
        let line = line.trim_end_matches('\r');
        if !line.is_empty() {
            out.push(' ');
            out.push_str(line);
        }
        out.push('\n');
    }
}

fn scalar_text(key: &str, value: &Value) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Array(_) | Value::Map(_) => Err(CogwheelError::UnsupportedValue {
            format: FORMAT.to_string(),
            key: key.to_string(),
            kind: value.kind().to_string(),
        }),
    }
}

/// Escape text for a key or value.
///
/// A leading space is always escaped; `escape_space` escapes every space.
/// Characters outside printable ASCII become `\uXXXX` UTF-16 units.
pub(crate) fn escape(text: &str, escape_space: bool) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    for (i, c) in text.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            c if c > '=' && c < '\x7f' => out.push(c),
            ' ' => {
                if i == 0 || escape_space {
                    out.push('\\');
                }
                out.push(' ');
            }
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\x0c' => out.push_str("\\f"),
            '=' | ':' | '#' | '!' => {
                out.push('\\');
                out.push(c);
            }
            c if c < ' ' || c > '~' => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{:04X}", unit));
                }
            }
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_values() {
        assert_eq!(escape("plain value", false), "plain value");
        assert_eq!(escape(" leading", false), "\\ leading");
        assert_eq!(escape("a=b:c#d!e", false), "a\\=b\\:c\\#d\\!e");
        assert_eq!(escape("tab\tnew\nline", false), "tab\\tnew\\nline");
        assert_eq!(escape("c:\\dir", false), "c\\:\\\\dir");
        assert_eq!(escape("café", false), "caf\\u00E9");
        assert_eq!(escape("😀", false), "\\uD83D\\uDE00");
        assert_eq!(escape("\x01", false), "\\u0001");
    }

    #[test]
    fn test_escape_keys() {
        assert_eq!(escape("key with spaces", true), "key\\ with\\ spaces");
    }

    #[test]
    fn test_write_layouts() {
        let mut section = Section::new();
        section.insert("name", "cog");
        section.set_comments("name", ["The name", ""]);
        section.insert("port", 25565);
        section.insert("none", Value::Null);

        let plain = write(&PropertiesFormat::default(), &section).unwrap();
        assert_eq!(plain, "# The name\n#\nname=cog\nport=25565\n");

        let format = PropertiesFormat {
            header: vec!["Server settings".to_string()],
            colon_separator: true,
            exclamation_mark_comments: true,
            spaces_around_separator: true,
            empty_line_between_entries: true,
        };
        assert_eq!(
            write(&format, &section).unwrap(),
            "! Server settings\n\n! The name\n!\nname: cog\n\nport: 25565\n\n"
        );
    }

    #[test]
    fn test_collections_are_rejected() {
        let mut section = Section::new();
        section.insert("list", Value::Array(vec![Value::from(1)]));
        let err = write(&PropertiesFormat::default(), &section).unwrap_err();
        assert!(matches!(
            err,
            CogwheelError::UnsupportedValue { ref key, ref kind, .. } if key == "list" && kind == "array"
        ));
    }
}
