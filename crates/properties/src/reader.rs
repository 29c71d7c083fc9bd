//! Reader for the `.properties` line grammar

use crate::FORMAT;
use cogwheel_core::{CogwheelError, Result, Section};

const WHITESPACE: [char; 3] = [' ', '\t', '\x0c'];

/// Parse a properties document.
///
/// Every value is read as a string. Comment lines directly above a key become
/// that entry's comments; a blank line discards pending comments.
pub(crate) fn parse(input: &str) -> Result<Section> {
    let normalized = input.replace("\r\n", "\n").replace('\r', "\n");
    let mut lines = normalized.split('\n');
    let mut section = Section::new();
    let mut pending: Vec<String> = Vec::new();

    while let Some(line) = lines.next() {
        let trimmed = line.trim_start_matches(WHITESPACE);
        if trimmed.is_empty() {
            pending.clear();
            continue;
        }
        if trimmed.starts_with('#') || trimmed.starts_with('!') {
            pending.push(comment_text(trimmed));
            continue;
        }

        let mut logical = trimmed.to_string();
        while ends_with_continuation(&logical) {
            logical.pop();
            match lines.next() {
                Some(next) => logical.push_str(next.trim_start_matches(WHITESPACE)),
                None => break,
            }
        }

        let (key, value) = split_key_value(&logical)?;
        section.insert(key.clone(), value);
        if !pending.is_empty() {
            section.set_comments(&key, std::mem::take(&mut pending));
        }
    }

    Ok(section)
}

fn comment_text(line: &str) -> String {
    let text = &line[1..];
    text.strip_prefix(' ').unwrap_or(text).to_string()
}

/// An odd number of trailing backslashes joins the next line
fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

fn split_key_value(line: &str) -> Result<(String, String)> {
    let chars: Vec<char> = line.chars().collect();
    let mut key_end = chars.len();
    let mut separator_found = false;
    let mut escaped = false;

    for (i, c) in chars.iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => {
                key_end = i;
                separator_found = true;
                break;
            }
            c if WHITESPACE.contains(c) => {
                key_end = i;
                break;
            }
            _ => {}
        }
    }

    let mut value_start = (key_end + 1).min(chars.len());
    if !separator_found {
        while value_start < chars.len() && WHITESPACE.contains(&chars[value_start]) {
            value_start += 1;
        }
        if value_start < chars.len() && matches!(chars[value_start], '=' | ':') {
            value_start += 1;
        }
    }
    while value_start < chars.len() && WHITESPACE.contains(&chars[value_start]) {
        value_start += 1;
    }

    Ok((
        unescape(&chars[..key_end])?,
        unescape(&chars[value_start..])?,
    ))
}

fn unescape(chars: &[char]) -> Result<String> {
    let mut out = String::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        i += 1;
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(&escape) = chars.get(i) else {
            break;
        };
        i += 1;
        match escape {
            't' => out.push('\t'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            'f' => out.push('\x0c'),
            'u' => {
                let unit = read_unit(chars, i)?;
                i += 4;
                if (0xD800..0xDC00).contains(&unit) && low_surrogate_follows(chars, i) {
                    let low = read_unit(chars, i + 2)?;
                    i += 6;
                    let combined = 0x10000 + ((unit as u32 - 0xD800) << 10) + (low as u32 - 0xDC00);
                    out.push(char::from_u32(combined).unwrap_or(char::REPLACEMENT_CHARACTER));
                } else {
                    out.push(char::from_u32(unit as u32).unwrap_or(char::REPLACEMENT_CHARACTER));
                }
            }
            other => out.push(other),
        }
    }
    Ok(out)
}

fn read_unit(chars: &[char], start: usize) -> Result<u16> {
    let digits: String = chars.iter().skip(start).take(4).collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(CogwheelError::parse(FORMAT, "Malformed \\uxxxx encoding"));
    }
    u16::from_str_radix(&digits, 16)
        .map_err(|_| CogwheelError::parse(FORMAT, "Malformed \\uxxxx encoding"))
}

fn low_surrogate_follows(chars: &[char], i: usize) -> bool {
    chars.get(i) == Some(&'\\')
        && chars.get(i + 1) == Some(&'u')
        && matches!(read_unit(chars, i + 2), Ok(unit) if (0xDC00..0xE000).contains(&unit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separators() {
        let section = parse("a=1\nb: 2\nc 3\nd = 4\ne\tfive\nf\n g  =  spaced \n").unwrap();
        assert_eq!(section.get_str("a"), Some("1"));
        assert_eq!(section.get_str("b"), Some("2"));
        assert_eq!(section.get_str("c"), Some("3"));
        assert_eq!(section.get_str("d"), Some("4"));
        assert_eq!(section.get_str("e"), Some("five"));
        assert_eq!(section.get_str("f"), Some(""));
        assert_eq!(section.get_str("g"), Some("spaced "));
    }

    #[test]
    fn test_comments_attach_to_next_key() {
        let section = parse("# header\n\n# first\n! second\nkey=value\nother=x\n").unwrap();
        assert_eq!(
            section.comments("key"),
            Some(&["first".to_string(), "second".to_string()][..])
        );
        assert_eq!(section.comments("other"), Some(&[][..]));
    }

    #[test]
    fn test_continuation_lines() {
        let section = parse("fruits = apple, \\\n    banana, \\\r\n    pear\npath=c:\\\\dir\\\\\n").unwrap();
        assert_eq!(section.get_str("fruits"), Some("apple, banana, pear"));
        assert_eq!(section.get_str("path"), Some("c:\\dir\\"));
    }

    #[test]
    fn test_escapes() {
        let section = parse(
            "key\\ with\\ spaces = v\nk\\=e\\:y=\\tx\\ny\nu=caf\\u00E9 \\uD83D\\uDE00\nplain=\\q\n",
        )
        .unwrap();
        assert_eq!(section.get_str("key with spaces"), Some("v"));
        assert_eq!(section.get_str("k=e:y"), Some("\tx\ny"));
        assert_eq!(section.get_str("u"), Some("café 😀"));
        assert_eq!(section.get_str("plain"), Some("q"));
    }

    #[test]
    fn test_malformed_unicode() {
        let err = parse("bad=\\u12G4\n").unwrap_err();
        assert!(matches!(err, CogwheelError::Parse { .. }));
        assert!(parse("short=\\u12").is_err());
    }

    #[test]
    fn test_duplicates_replace() {
        let section = parse("a=1\nb=2\na=3\n").unwrap();
        assert_eq!(section.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(section.get_str("a"), Some("3"));
    }
}
