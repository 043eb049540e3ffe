use sheetseek_core::{FieldConstraint, Record, Table};

/// Return the first record satisfying every constraint, in table order.
///
/// A constraint holds when the record's value for `field` is non-empty and
/// equals `value` after lowercasing both sides. There is no trimming and no
/// partial matching. An empty constraint list means "not searching yet" and
/// yields `None`, as does a constraint naming a field the table lacks.
///
/// Only one record is ever returned, even when several rows match.
///
/// # Example
/// ```
/// use sheetseek_core::FieldConstraint;
/// use sheetseek_sheet::{find_match, normalize};
///
/// let table = normalize("People", &[
///     vec!["ID".to_string(), "Name".to_string()],
///     vec!["1".to_string(), "Alice".to_string()],
/// ]);
/// let hit = find_match(&table, &[FieldConstraint::new("Name", "ALICE")]);
/// assert_eq!(hit.and_then(|r| r.get("ID")), Some("1"));
/// ```
#[must_use]
pub fn find_match<'a>(table: &'a Table, constraints: &[FieldConstraint]) -> Option<&'a Record> {
    if constraints.is_empty() {
        return None;
    }

    // Lowercase each query value once rather than once per record.
    let wanted: Vec<(&str, String)> = constraints
        .iter()
        .map(|c| (c.field.as_str(), c.value.to_lowercase()))
        .collect();

    table.records.iter().find(|record| {
        wanted
            .iter()
            .all(|(field, value)| cell_matches(record, field, value))
    })
}

/// Single-column lookup. A blank search value never matches.
#[must_use]
pub fn find_by_id<'a>(table: &'a Table, column: &str, value: &str) -> Option<&'a Record> {
    if value.is_empty() {
        return None;
    }
    find_match(table, &[FieldConstraint::new(column, value)])
}

fn cell_matches(record: &Record, field: &str, lowered_value: &str) -> bool {
    match record.get(field) {
        Some(cell) if !cell.is_empty() => cell.to_lowercase() == lowered_value,
        _ => false,
    }
}
