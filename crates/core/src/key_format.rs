//! Key formatters rewrite node names into the keys stored in a document
//!
//! All formatters split a name into words at `_`, `-`, spaces and at every
//! lowercase to uppercase transition, then join the words in their own
//! style. `max_players`, `maxPlayers` and `Max players` are the same two
//! words.

use std::fmt::Debug;

/// Turns a node name into a document key
pub trait KeyFormatter: Send + Sync + Debug {
    fn format(&self, key: &str) -> String;
}

/// Split a name into its words
pub fn split_words(key: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut previous_lower = false;

    for c in key.chars() {
        if c == '_' || c == '-' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            previous_lower = false;
            continue;
        }
        if c.is_uppercase() && previous_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        previous_lower = c.is_lowercase() || c.is_ascii_digit();
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn join_mapped(key: &str, separator: &str, map: impl Fn(usize, &str) -> String) -> String {
    split_words(key)
        .iter()
        .enumerate()
        .map(|(i, word)| map(i, word.as_str()))
        .collect::<Vec<_>>()
        .join(separator)
}

/// Leaves keys untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityKeyFormatter;

impl KeyFormatter for IdentityKeyFormatter {
    fn format(&self, key: &str) -> String {
        key.to_string()
    }
}

/// `max_players`
#[derive(Debug, Clone, Copy, Default)]
pub struct SnakeCase;

impl KeyFormatter for SnakeCase {
    fn format(&self, key: &str) -> String {
        join_mapped(key, "_", |_, w| w.to_lowercase())
    }
}

/// `MAX_PLAYERS`
#[derive(Debug, Clone, Copy, Default)]
pub struct UpperSnakeCase;

impl KeyFormatter for UpperSnakeCase {
    fn format(&self, key: &str) -> String {
        join_mapped(key, "_", |_, w| w.to_uppercase())
    }
}

/// `max-players`
#[derive(Debug, Clone, Copy, Default)]
pub struct KebabCase;

impl KeyFormatter for KebabCase {
    fn format(&self, key: &str) -> String {
        join_mapped(key, "-", |_, w| w.to_lowercase())
    }
}

/// `MAX-PLAYERS`
#[derive(Debug, Clone, Copy, Default)]
pub struct UpperKebabCase;

impl KeyFormatter for UpperKebabCase {
    fn format(&self, key: &str) -> String {
        join_mapped(key, "-", |_, w| w.to_uppercase())
    }
}

/// `maxPlayers`
#[derive(Debug, Clone, Copy, Default)]
pub struct CamelCase;

impl KeyFormatter for CamelCase {
    fn format(&self, key: &str) -> String {
        join_mapped(key, "", |i, w| {
            if i == 0 {
                w.to_lowercase()
            } else {
                capitalize(w)
            }
        })
    }
}

/// `MaxPlayers`
#[derive(Debug, Clone, Copy, Default)]
pub struct PascalCase;

impl KeyFormatter for PascalCase {
    fn format(&self, key: &str) -> String {
        join_mapped(key, "", |_, w| capitalize(w))
    }
}

/// `Max players`
#[derive(Debug, Clone, Copy, Default)]
pub struct ProperCase;

impl KeyFormatter for ProperCase {
    fn format(&self, key: &str) -> String {
        join_mapped(key, " ", |i, w| {
            if i == 0 {
                capitalize(w)
            } else {
                w.to_lowercase()
            }
        })
    }
}

/// `MAX PLAYERS`
#[derive(Debug, Clone, Copy, Default)]
pub struct UpperCase;

impl KeyFormatter for UpperCase {
    fn format(&self, key: &str) -> String {
        join_mapped(key, " ", |_, w| w.to_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_words() {
        assert_eq!(split_words("max_players"), vec!["max", "players"]);
        assert_eq!(split_words("maxPlayers"), vec!["max", "Players"]);
        assert_eq!(split_words("Max  players"), vec!["Max", "players"]);
        assert_eq!(split_words("server-v2Port"), vec!["server", "v2", "Port"]);
        assert_eq!(split_words("HTTP"), vec!["HTTP"]);
        assert!(split_words("").is_empty());
    }

    #[test]
    fn test_formatters_from_snake_case() {
        let key = "max_players";
        assert_eq!(IdentityKeyFormatter.format(key), "max_players");
        assert_eq!(SnakeCase.format(key), "max_players");
        assert_eq!(UpperSnakeCase.format(key), "MAX_PLAYERS");
        assert_eq!(KebabCase.format(key), "max-players");
        assert_eq!(UpperKebabCase.format(key), "MAX-PLAYERS");
        assert_eq!(CamelCase.format(key), "maxPlayers");
        assert_eq!(PascalCase.format(key), "MaxPlayers");
        assert_eq!(ProperCase.format(key), "Max players");
        assert_eq!(UpperCase.format(key), "MAX PLAYERS");
    }

    #[test]
    fn test_formatters_from_camel_case() {
        let key = "viewDistance";
        assert_eq!(SnakeCase.format(key), "view_distance");
        assert_eq!(KebabCase.format(key), "view-distance");
        assert_eq!(PascalCase.format(key), "ViewDistance");
        assert_eq!(ProperCase.format(key), "View distance");
    }

    #[test]
    fn test_empty_key() {
        assert_eq!(SnakeCase.format(""), "");
        assert_eq!(CamelCase.format(""), "");
    }
}
