//! Diff renderer, consumed by external reporters — the core hands back a
//! structured diff object the reporter can print as-is.

use similar::{ChangeTag, TextDiff};

const REF_MASK: &str = "env.REF(…)";

/// One line of a rendered diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub tag: DiffTag,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffTag {
    Equal,
    Delete,
    Insert,
}

/// Renders a line-oriented diff between the pretty-printed JSON of `old` and
/// `new`. Values that look like an `env.REF(...)` placeholder are masked on
/// both sides before diffing so that vault-backed secrets never leak into a
/// report.
pub fn render_diff(old: &serde_json::Value, new: &serde_json::Value, mask_refs: bool) -> Vec<DiffLine> {
    let old_text = to_pretty(old, mask_refs);
    let new_text = to_pretty(new, mask_refs);
    let diff = TextDiff::from_lines(&old_text, &new_text);

    diff.iter_all_changes()
        .map(|change| {
            let tag = match change.tag() {
                ChangeTag::Equal => DiffTag::Equal,
                ChangeTag::Delete => DiffTag::Delete,
                ChangeTag::Insert => DiffTag::Insert,
            };
            DiffLine {
                tag,
                text: change.value().trim_end_matches('\n').to_string(),
            }
        })
        .collect()
}

fn to_pretty(value: &serde_json::Value, mask_refs: bool) -> String {
    let masked = if mask_refs { mask_value(value.clone()) } else { value.clone() };
    serde_json::to_string_pretty(&masked).unwrap_or_default()
}

fn mask_value(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::String(s) if s.starts_with("env.REF(") => {
            serde_json::Value::String(REF_MASK.to_string())
        }
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.into_iter().map(mask_value).collect())
        }
        serde_json::Value::Object(map) => serde_json::Value::Object(
            map.into_iter().map(|(k, v)| (k, mask_value(v))).collect(),
        ),
        other => other,
    }
}
