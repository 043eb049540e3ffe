use sheetseek_core::{Record, Table};

/// Build a [`Table`] from a raw grid whose first row is the header row.
///
/// Short rows are padded with empty strings and cells past the header width
/// are dropped, so every record holds exactly the header set. Values are kept
/// as text; nothing is coerced.
///
/// When a header name repeats, `headers` keeps every occurrence but each
/// record has a single entry for that name holding the value of the
/// right-most column.
///
/// # Example
/// ```
/// use sheetseek_sheet::normalize;
///
/// let table = normalize("People", &[
///     vec!["ID".to_string(), "Name".to_string()],
///     vec!["3".to_string()],
/// ]);
/// assert_eq!(table.records[0].get("Name"), Some(""));
/// ```
#[must_use]
pub fn normalize<R: AsRef<[String]>>(sheet_name: &str, grid: &[R]) -> Table {
    let Some((header_row, rows)) = grid.split_first() else {
        return Table::empty(sheet_name);
    };

    let headers: Vec<String> = header_row.as_ref().to_vec();
    let records = rows
        .iter()
        .map(|row| to_record(&headers, row.as_ref()))
        .collect();

    Table {
        sheet_name: sheet_name.to_string(),
        headers,
        records,
    }
}

fn to_record(headers: &[String], row: &[String]) -> Record {
    let mut record = Record::new();
    for (i, header) in headers.iter().enumerate() {
        let value = row.get(i).map_or("", String::as_str);
        record.insert(header.as_str(), value);
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|c| (*c).to_string()).collect())
            .collect()
    }

    #[test]
    fn test_empty_grid() {
        let table = normalize("Empty", &Vec::<Vec<String>>::new());
        assert_eq!(table, Table::empty("Empty"));
    }

    #[test]
    fn test_header_only() {
        let table = normalize("S", &grid(&[&["ID", "Name"]]));
        assert_eq!(table.headers, vec!["ID", "Name"]);
        assert!(table.records.is_empty());
    }

    #[test]
    fn test_records_follow_headers() {
        let table = normalize("S", &grid(&[&["ID", "Name"], &["1", "Alice"], &["2", "Bob"]]));
        assert_eq!(table.sheet_name, "S");
        assert_eq!(table.record_count(), 2);
        assert_eq!(table.records[1].get("ID"), Some("2"));
        assert_eq!(table.records[1].get("Name"), Some("Bob"));
    }

    #[test]
    fn test_jagged_row_padded() {
        let table = normalize("S", &grid(&[&["ID", "Name", "Email"], &["3"]]));
        let record = &table.records[0];
        assert_eq!(record.len(), 3);
        assert_eq!(record.get("ID"), Some("3"));
        assert_eq!(record.get("Name"), Some(""));
        assert_eq!(record.get("Email"), Some(""));
    }

    #[test]
    fn test_extra_cells_ignored() {
        let table = normalize("S", &grid(&[&["ID"], &["1", "stray", "cells"]]));
        assert_eq!(table.records[0].len(), 1);
        assert_eq!(table.records[0].get("ID"), Some("1"));
    }

    #[test]
    fn test_empty_data_row() {
        let table = normalize("S", &grid(&[&["ID", "Name"], &[]]));
        assert_eq!(table.record_count(), 1);
        assert_eq!(table.records[0].get("ID"), Some(""));
    }

    #[test]
    fn test_duplicate_headers_last_column_wins() {
        let table = normalize("S", &grid(&[&["Name", "Name"], &["first", "second"]]));
        assert_eq!(table.headers, vec!["Name", "Name"]);
        assert_eq!(table.records[0].len(), 1);
        assert_eq!(table.records[0].get("Name"), Some("second"));
    }

    #[test]
    fn test_no_coercion() {
        let table = normalize("S", &grid(&[&["Amount", "Flag"], &["007.50", "TRUE"]]));
        assert_eq!(table.records[0].get("Amount"), Some("007.50"));
        assert_eq!(table.records[0].get("Flag"), Some("TRUE"));
    }
}
