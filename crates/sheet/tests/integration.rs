use sheetseek_sheet::{
    detect_fields, find_match, normalize, DetectedFields, FieldConstraint, Record, Table,
};
use std::collections::HashSet;

fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|r| r.iter().map(|c| (*c).to_string()).collect())
        .collect()
}

fn record(pairs: &[(&str, &str)]) -> Record {
    pairs.iter().copied().collect()
}

fn scenario_table() -> Table {
    normalize("People", &grid(&[&["ID", "Name"], &["1", "Alice"], &["2", "Bob"]]))
}

// ===== Scenarios =====

#[test]
fn test_scenario_a_normalize_and_match() {
    let table = scenario_table();
    assert_eq!(table.headers, vec!["ID", "Name"]);
    assert_eq!(table.records.len(), 2);

    let hit = find_match(&table, &[FieldConstraint::new("Name", "alice")]);
    assert_eq!(hit, Some(&record(&[("ID", "1"), ("Name", "Alice")])));
}

#[test]
fn test_scenario_b_no_match() {
    let table = scenario_table();
    assert!(find_match(&table, &[FieldConstraint::new("Name", "Carol")]).is_none());
}

#[test]
fn test_scenario_c_detect_fields() {
    let fields = detect_fields(&["Full Name", "Date of Birth", "Email"]);
    assert_eq!(
        fields,
        DetectedFields {
            primary: "Full Name".to_string(),
            secondary: "Date of Birth".to_string(),
        }
    );
}

#[test]
fn test_scenario_d_jagged_row() {
    let table = normalize("People", &grid(&[&["ID", "Name"], &["3"]]));
    assert_eq!(table.records, vec![record(&[("ID", "3"), ("Name", "")])]);
}

// ===== Normalizer properties =====

#[test]
fn test_record_count_and_key_sets() {
    let grids = [
        grid(&[]),
        grid(&[&["A"]]),
        grid(&[&["A", "B", "C"], &["1"], &["1", "2"], &["1", "2", "3", "4"], &[]]),
        grid(&[&["Name", "Email"], &["x", "y"], &["z"]]),
    ];

    for g in &grids {
        let table = normalize("S", g);
        assert_eq!(table.records.len(), g.len().saturating_sub(1));

        let header_set: HashSet<&str> = table.headers.iter().map(String::as_str).collect();
        for rec in &table.records {
            let keys: HashSet<&str> = rec.keys().collect();
            assert_eq!(keys, header_set);
        }
    }
}

#[test]
fn test_normalize_is_pure() {
    let g = grid(&[&["ID", "Name"], &["1", "Alice"], &["2"]]);
    assert_eq!(normalize("S", &g), normalize("S", &g));
}

#[test]
fn test_record_preserves_header_order() {
    let table = normalize("S", &grid(&[&["Zeta", "Alpha", "Mid"], &["z", "a", "m"]]));
    let keys: Vec<&str> = table.records[0].keys().collect();
    assert_eq!(keys, vec!["Zeta", "Alpha", "Mid"]);
}

// ===== Matcher properties =====

#[test]
fn test_empty_constraints_never_match() {
    for table in [scenario_table(), Table::empty("Empty")] {
        assert!(find_match(&table, &[]).is_none());
    }
}

#[test]
fn test_match_independent_of_query_casing() {
    let table = scenario_table();
    let expected = find_match(&table, &[FieldConstraint::new("Name", "Bob")]);
    assert!(expected.is_some());

    for query in ["bob", "BOB", "bOb", "Bob"] {
        assert_eq!(
            find_match(&table, &[FieldConstraint::new("Name", query)]),
            expected
        );
    }
}

#[test]
fn test_match_on_empty_table() {
    let table = normalize("Empty", &grid(&[]));
    assert!(find_match(&table, &[FieldConstraint::new("Name", "Alice")]).is_none());
}

#[test]
fn test_identical_records_return_first() {
    let table = normalize(
        "S",
        &grid(&[&["Name", "Row"], &["Ann", "1"], &["Ann", "2"], &["Ann", "3"]]),
    );
    let hit = find_match(&table, &[FieldConstraint::new("Name", "ann")]).unwrap();
    assert_eq!(hit.get("Row"), Some("1"));
}

// ===== End to end =====

#[test]
fn test_detected_fields_drive_search() {
    let table = normalize(
        "Patients",
        &grid(&[
            &["MRN", "Patient Name", "DOB"],
            &["100", "Jane Roe", "1980-02-03"],
            &["101", "Jane Roe", "1991-07-08"],
        ]),
    );
    let fields = detect_fields(&table.headers);
    assert_eq!(fields.primary, "Patient Name");
    assert_eq!(fields.secondary, "DOB");

    let hit = find_match(
        &table,
        &[
            FieldConstraint::new(fields.primary.clone(), "jane roe"),
            FieldConstraint::new(fields.secondary.clone(), "1991-07-08"),
        ],
    )
    .unwrap();
    assert_eq!(hit.get("MRN"), Some("101"));
}
