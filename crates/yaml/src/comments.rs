//! Comment recovery for decoded YAML documents
//!
//! `serde_yaml` drops comments, so the source is scanned line by line.
//! Comment lines (and blank lines between them) attach to the key that
//! follows, and a trailing `# text` attaches to the key on its line. Keys
//! are tracked by indentation through block mappings and sequences; block
//! scalar bodies are skipped.

use cogwheel_core::{Section, Value};

/// Attach the comments found in `input` to the matching entries of `section`
pub(crate) fn recover(input: &str, section: &mut Section) {
    let mut scanner = Scanner::default();
    for line in input.lines() {
        scanner.line(line);
    }
    for found in scanner.found {
        let Some((Step::Key(key), parents)) = found.path.split_last() else {
            continue;
        };
        let Some(target) = locate(section, parents) else {
            continue;
        };
        if !found.comments.is_empty() {
            target.set_comments(key, found.comments);
        }
        if let Some(inline) = found.inline {
            target.set_inline_comment(key, inline);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Step {
    Key(String),
    Item(usize),
}

#[derive(Debug)]
struct Frame {
    indent: usize,
    step: Step,
}

#[derive(Debug)]
struct Found {
    path: Vec<Step>,
    comments: Vec<String>,
    inline: Option<String>,
}

#[derive(Debug, Default)]
struct Scanner {
    frames: Vec<Frame>,
    pending: Vec<String>,
    found: Vec<Found>,
    /// Indent of the node owning a block scalar body
    block_scalar: Option<usize>,
}

impl Scanner {
    fn line(&mut self, line: &str) {
        let text = line.trim_start_matches(' ');
        let indent = line.len() - text.len();
        let text = text.trim_end();

        if let Some(owner) = self.block_scalar {
            if text.is_empty() || indent > owner {
                return;
            }
            self.block_scalar = None;
        }

        if text.is_empty() {
            self.pending.push(String::new());
        } else if let Some(comment) = text.strip_prefix('#') {
            self.pending.push(comment_text(comment));
        } else if indent == 0 && (text == "---" || text.starts_with("--- ") || text == "...") {
            self.frames.clear();
            self.pending.clear();
        } else if indent == 0 && text.starts_with('%') {
            // directive
        } else {
            self.content(indent, text);
        }
    }

    fn content(&mut self, indent: usize, text: &str) {
        while self.frames.last().is_some_and(|f| f.indent > indent) {
            self.frames.pop();
        }

        if let Some(rest) = indicator(text, '-') {
            self.item(indent, text, rest);
        } else if let Some(rest) = indicator(text, '?') {
            self.pop_siblings(indent);
            match scalar_token(rest) {
                Some((key, after)) => self.key(indent, key, after),
                None => self.pending.clear(),
            }
        } else if let Some(rest) = indicator(text, ':') {
            // value of an explicit key
            if let Some(inline) = inline_comment(rest) {
                self.set_inline(indent, inline);
            }
            self.check_block_scalar(indent, rest);
        } else if let Some((key, value)) = split_key(text) {
            self.pop_siblings(indent);
            self.key(indent, key, value);
        } else {
            self.pending.clear();
        }
    }

    fn item(&mut self, indent: usize, text: &str, rest: &str) {
        let index = match self.frames.last() {
            Some(Frame {
                indent: top,
                step: Step::Item(n),
            }) if *top == indent => {
                let next = n + 1;
                self.frames.pop();
                next
            }
            _ => 0,
        };
        self.frames.push(Frame {
            indent,
            step: Step::Item(index),
        });

        let rest = rest.trim_start_matches(' ');
        if rest.is_empty() {
            return;
        }
        if let Some(comment) = rest.strip_prefix('#') {
            self.pending.push(comment_text(comment));
            return;
        }
        if rest.starts_with(['|', '>']) {
            self.block_scalar = Some(indent);
            self.pending.clear();
            return;
        }
        let column = indent + text.len() - rest.len();
        self.content(column, rest);
    }

    /// Drop the previous key at this indent and any sequence under it
    fn pop_siblings(&mut self, indent: usize) {
        while self.frames.last().is_some_and(|f| f.indent >= indent) {
            self.frames.pop();
        }
    }

    fn key(&mut self, indent: usize, key: String, value: &str) {
        self.frames.push(Frame {
            indent,
            step: Step::Key(key),
        });
        let comments = std::mem::take(&mut self.pending);
        let inline = inline_comment(value);
        if !comments.is_empty() || inline.is_some() {
            self.found.push(Found {
                path: self.frames.iter().map(|f| f.step.clone()).collect(),
                comments,
                inline,
            });
        }
        self.check_block_scalar(indent, value);
    }

    fn set_inline(&mut self, indent: usize, inline: String) {
        let path: Vec<Step> = self.frames.iter().map(|f| f.step.clone()).collect();
        if !matches!(self.frames.last(), Some(f) if f.indent == indent) {
            return;
        }
        match self.found.last_mut() {
            Some(found) if found.path == path => found.inline = Some(inline),
            _ => self.found.push(Found {
                path,
                comments: Vec::new(),
                inline: Some(inline),
            }),
        }
    }

    fn check_block_scalar(&mut self, indent: usize, value: &str) {
        if value.trim_start().starts_with(['|', '>']) {
            self.block_scalar = Some(indent);
        }
    }
}

/// Text after an indicator such as `- `, `? ` or `: `
fn indicator(text: &str, c: char) -> Option<&str> {
    let rest = text.strip_prefix(c)?;
    (rest.is_empty() || rest.starts_with(' ')).then_some(rest)
}

fn comment_text(comment: &str) -> String {
    comment.strip_prefix(' ').unwrap_or(comment).trim_end().to_string()
}

/// Split `key: value`, returning the key and everything after the colon
fn split_key(text: &str) -> Option<(String, &str)> {
    let (key, after) = scalar_token(text)?;
    let after = after.trim_start_matches(' ');
    indicator(after, ':').map(|value| (key, value))
}

/// Read one scalar key, quoted or plain, and return it with the remaining text
fn scalar_token(text: &str) -> Option<(String, &str)> {
    let text = text.trim_start_matches(' ');
    match text.chars().next()? {
        '"' | '\'' => {
            let end = closing_quote(text)?;
            let key = match serde_yaml::from_str::<serde_yaml::Value>(&text[..=end]).ok()? {
                serde_yaml::Value::String(key) => key,
                _ => return None,
            };
            Some((key, &text[end + 1..]))
        }
        c if "[{&*!|>%@`#".contains(c) => None,
        _ => {
            let end = plain_end(text);
            let key = text[..end].trim_end();
            (!key.is_empty()).then(|| (key.to_string(), &text[end..]))
        }
    }
}

/// Index of the quote closing the scalar that opens `text`
fn closing_quote(text: &str) -> Option<usize> {
    let mut chars = text.char_indices();
    let (_, open) = chars.next()?;
    let mut chars = chars.peekable();
    while let Some((i, c)) = chars.next() {
        if open == '"' && c == '\\' {
            chars.next();
        } else if c == open {
            if open == '\'' && matches!(chars.peek(), Some((_, '\''))) {
                chars.next();
            } else {
                return Some(i);
            }
        }
    }
    None
}

/// End of a plain key: before `: `, a trailing `:` or a ` #` comment
fn plain_end(text: &str) -> usize {
    let mut prev = ' ';
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c == '#' && prev == ' ' {
            return i;
        }
        if c == ':' && matches!(chars.peek(), None | Some((_, ' '))) {
            return i;
        }
        prev = c;
    }
    text.len()
}

/// Trailing `# text` of a value, skipping `#` inside quoted scalars
fn inline_comment(value: &str) -> Option<String> {
    let mut quote = None;
    let mut prev = ' ';
    let mut chars = value.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        match quote {
            Some('"') => {
                if c == '\\' {
                    chars.next();
                } else if c == '"' {
                    quote = None;
                }
            }
            Some(_) => {
                if c == '\'' {
                    if matches!(chars.peek(), Some((_, '\''))) {
                        chars.next();
                    } else {
                        quote = None;
                    }
                }
            }
            None => {
                if (c == '"' || c == '\'') && matches!(prev, ' ' | '[' | '{' | ',') {
                    quote = Some(c);
                } else if c == '#' && prev == ' ' {
                    let text = value[i + 1..].trim();
                    return (!text.is_empty()).then(|| text.to_string());
                }
            }
        }
        prev = c;
    }
    None
}

/// Section reached by following `path` from `section`
fn locate<'a>(section: &'a mut Section, path: &[Step]) -> Option<&'a mut Section> {
    let mut target = section;
    let mut steps = path.iter().peekable();
    while let Some(step) = steps.next() {
        let Step::Key(key) = step else {
            return None;
        };
        let mut value = target.get_mut(key)?;
        while let Some(Step::Item(index)) = steps.peek() {
            value = match value {
                Value::Array(items) => items.get_mut(*index)?,
                _ => return None,
            };
            steps.next();
        }
        target = value.as_section_mut()?;
    }
    Some(target)
}
