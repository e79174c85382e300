use crate::record::RecordSet;
use similar::TextDiff;

const CONTEXT_LINES: usize = 3;

/// Unified diff between the pretty-printed current and candidate sets.
///
/// Returns an empty string when the renderings are identical. The output is
/// for review only; it plays no part in deciding what gets uploaded.
pub fn render_diff(current: &RecordSet, candidate: &RecordSet) -> String {
    let old = render_set(current);
    let new = render_set(candidate);
    let diff = TextDiff::from_lines(&old, &new);

    let old_label = format!("Current {}", current.kind().plural());
    let new_label = format!("Import {}", candidate.kind().plural());
    let mut unified = diff.unified_diff();
    unified
        .context_radius(CONTEXT_LINES)
        .header(&old_label, &new_label);
    unified.to_string()
}

/// One pretty-printed JSON block per record, in key order.
fn render_set(set: &RecordSet) -> String {
    let mut text = String::new();
    for record in set {
        // Serializing a Value cannot fail, its map keys are always strings.
        let block = serde_json::to_string_pretty(record.fields()).unwrap_or_default();
        text.push_str(&block);
        text.push('\n');
    }
    text
}
