//! Client-side CSV sheets
//!
//! Item and price sheets are parsed in the browser for the weight
//! correction flow and the CSV editor.

use serde_json::{Map, Value};

/// A parsed CSV sheet; every row has one cell per column
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    /// Parse CSV text, dropping a leading BOM, trimming header names and
    /// padding short rows
    pub fn parse(text: &str) -> Result<Self, String> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(text.as_bytes());

        let columns: Vec<String> = reader
            .headers()
            .map_err(|e| format!("Invalid CSV header: {}", e))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        if columns.is_empty() || columns.iter().all(String::is_empty) {
            return Err("CSV has no columns".to_string());
        }

        let mut rows = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record = record.map_err(|e| format!("Invalid CSV row {}: {}", i + 1, e))?;
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            row.resize(columns.len(), String::new());
            rows.push(row);
        }

        Ok(Self { columns, rows })
    }

    /// Rows as JSON objects; empty cells become `null`
    pub fn records(&self) -> Vec<Value> {
        self.rows
            .iter()
            .map(|row| {
                let object: Map<String, Value> = self
                    .columns
                    .iter()
                    .zip(row)
                    .map(|(column, cell)| {
                        let value = if cell.is_empty() {
                            Value::Null
                        } else {
                            Value::String(cell.clone())
                        };
                        (column.clone(), value)
                    })
                    .collect();
                Value::Object(object)
            })
            .collect()
    }

    /// Item rows tagged with `original_index`, with corrected weights applied
    pub fn corrected_records(&self, corrections: &[(usize, String)]) -> Vec<Value> {
        self.records()
            .into_iter()
            .enumerate()
            .map(|(index, mut record)| {
                if let Value::Object(object) = &mut record {
                    object.insert("original_index".to_string(), Value::from(index));
                    if let Some((_, weight)) = corrections.iter().find(|(i, _)| *i == index) {
                        object.insert("weight".to_string(), Value::String(weight.clone()));
                    }
                }
                record
            })
            .collect()
    }

    pub fn add_row(&mut self) {
        self.rows.push(vec![String::new(); self.columns.len()]);
    }

    pub fn remove_row(&mut self, index: usize) {
        if index < self.rows.len() {
            self.rows.remove(index);
        }
    }

    /// Append a column; blank or duplicate names are rejected
    pub fn add_column(&mut self, name: &str) -> Result<(), String> {
        let name = name.trim();
        if name.is_empty() {
            return Err("Column name is required".to_string());
        }
        if self.columns.iter().any(|c| c == name) {
            return Err(format!("Column {} already exists", name));
        }
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            row.push(String::new());
        }
        Ok(())
    }

    pub fn set_cell(&mut self, row: usize, col: usize, value: String) {
        if let Some(cell) = self.rows.get_mut(row).and_then(|r| r.get_mut(col)) {
            *cell = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strips_bom_and_pads() {
        let sheet = Sheet::parse("\u{feff}box_no,weight,misc\n1,10g\n2,3g,0.5\n").unwrap();
        assert_eq!(sheet.columns, vec!["box_no", "weight", "misc"]);
        assert_eq!(sheet.rows[0], vec!["1", "10g", ""]);
        assert_eq!(sheet.rows.len(), 2);
    }

    #[test]
    fn test_parse_trims_header_names() {
        let sheet = Sheet::parse("box_no , weight,material\n1, 10g ,K18\n").unwrap();
        assert_eq!(sheet.columns, vec!["box_no", "weight", "material"]);
        // cells keep their spacing; only headers are names
        assert_eq!(sheet.rows[0][1], " 10g ");
        assert_eq!(sheet.records()[0]["weight"], " 10g ");
    }

    #[test]
    fn test_records_map_empty_to_null() {
        let sheet = Sheet::parse("material,price\nK18,\n").unwrap();
        let records = sheet.records();
        assert_eq!(records[0]["material"], "K18");
        assert!(records[0]["price"].is_null());
    }

    #[test]
    fn test_corrected_records() {
        let sheet = Sheet::parse("box_no,weight\n1,abc\n2,5g\n").unwrap();
        let records = sheet.corrected_records(&[(0, "4.5".to_string())]);

        assert_eq!(records[0]["original_index"], 0);
        assert_eq!(records[0]["weight"], "4.5");
        assert_eq!(records[1]["original_index"], 1);
        assert_eq!(records[1]["weight"], "5g");
    }

    #[test]
    fn test_add_column() {
        let mut sheet = Sheet::parse("a\n1\n").unwrap();
        sheet.add_column("b").unwrap();
        assert_eq!(sheet.rows[0], vec!["1", ""]);
        assert!(sheet.add_column("a").is_err());
        assert!(sheet.add_column("  ").is_err());
    }
}
