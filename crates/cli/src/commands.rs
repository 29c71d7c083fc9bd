//! Subcommand implementations

use crate::format::FormatKind;
use crate::settings::Settings;
use anyhow::{Context, Result};
use cogwheel_core::{fs, Section, ValidationReport, Value};
use std::path::Path;
use tracing::info;

/// Re-encode `input` and return the encoded text.
///
/// The text is also written to `output` when one is given.
pub fn convert(
    settings: &Settings,
    input: &Path,
    output: Option<&Path>,
    from: Option<FormatKind>,
    to: Option<FormatKind>,
) -> Result<String> {
    let from = FormatKind::resolve(from, Some(input)).context("Unknown input format")?;
    let to = FormatKind::resolve(to, output).context("Unknown output format")?;

    let section = decode(settings, input, from)?;
    let text = to
        .build(settings)
        .encode(&section)
        .with_context(|| format!("Failed to encode {} as {}", input.display(), to))?;

    if let Some(output) = output {
        fs::write_file(output, text.as_bytes())
            .with_context(|| format!("Failed to write {}", output.display()))?;
        info!(input = %input.display(), output = %output.display(), %from, %to, "Converted document");
    }
    Ok(text)
}

/// Decode `input` and describe what it contains
pub fn check(settings: &Settings, input: &Path, from: Option<FormatKind>) -> Result<CheckSummary> {
    let format = FormatKind::resolve(from, Some(input)).context("Unknown input format")?;
    let section = decode(settings, input, format)?;

    let mut summary = CheckSummary {
        format: Some(format),
        keys: section.len(),
        ..CheckSummary::default()
    };
    summary.inspect(&section, "");
    Ok(summary)
}

fn decode(settings: &Settings, input: &Path, format: FormatKind) -> Result<Section> {
    let bytes = fs::read_file(input).with_context(|| format!("Failed to read {}", input.display()))?;
    format
        .build(settings)
        .decode_slice(&bytes)
        .with_context(|| format!("Failed to decode {} as {}", input.display(), format))
}

/// Result of `check`
#[derive(Debug, Default)]
pub struct CheckSummary {
    pub format: Option<FormatKind>,
    /// Top level keys
    pub keys: usize,
    /// Scalar values at any depth
    pub values: usize,
    pub comments: usize,
    pub report: ValidationReport,
}

impl CheckSummary {
    fn inspect(&mut self, section: &Section, path: &str) {
        for entry in section {
            let key_path = if path.is_empty() {
                entry.key.clone()
            } else {
                format!("{}.{}", path, entry.key)
            };
            self.comments += entry.comments.len() + usize::from(entry.inline_comment.is_some());
            if entry.key.trim().is_empty() {
                self.report.add_warning(&key_path, "Key is blank");
            }
            self.inspect_value(&entry.value, &key_path);
        }
    }

    fn inspect_value(&mut self, value: &Value, path: &str) {
        match value {
            Value::Map(section) => self.inspect(section, path),
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    self.inspect_value(item, &format!("{}.{}", path, i));
                }
            }
            Value::Null => self.report.add_warning(path, "Value is null"),
            _ => self.values += 1,
        }
    }
}

impl std::fmt::Display for CheckSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(format) = self.format {
            write!(f, "{}: ", format)?;
        }
        write!(
            f,
            "{} keys, {} values, {} comments. {}",
            self.keys,
            self.values,
            self.comments,
            self.report.summary()
        )?;
        for warning in &self.report.warnings {
            write!(f, "\n  warning: {}: {}", warning.field, warning.message)?;
        }
        Ok(())
    }
}
