use crate::core::table::TableRecord;
use crate::domain::model::ClassPreference;

/// Build the classId-keyed preference index from normalized table rows.
/// Columns 2-4 are the PL, TP and T preference lists. Row order is kept;
/// a later row for the same classId overwrites the earlier entry in place.
pub fn build_index(records: &[TableRecord], headers: &[String]) -> Vec<ClassPreference> {
    let mut index: Vec<ClassPreference> = Vec::new();

    for record in records {
        let preference = ClassPreference {
            class_id: canonical_class_id(record.get(&headers[0])),
            pl: parse_preferences(record.get(&headers[1])),
            tp: parse_preferences(record.get(&headers[2])),
            t: parse_preferences(record.get(&headers[3])),
        };

        match index
            .iter_mut()
            .find(|existing| existing.class_id == preference.class_id)
        {
            Some(existing) => *existing = preference,
            None => index.push(preference),
        }
    }

    index
}

/// Canonical classId: trim the cell, then everything before the first `#`.
pub fn canonical_class_id(cell: &str) -> String {
    cell.trim()
        .split('#')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// A `#`-joined preference cell as an ordered list of trimmed slot-number
/// tokens. Position encodes priority; duplicates are allowed. An empty cell
/// means no preference was requested for that slot type.
pub fn parse_preferences(cell: &str) -> Option<Vec<String>> {
    let tokens: Vec<String> = cell
        .split('#')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect();

    if tokens.is_empty() {
        None
    } else {
        Some(tokens)
    }
}
