//! Metal Valuation
//!
//! Computes the metal value of jewellery items from an item sheet and a
//! material price list.
//!
//! For each item row:
//! - the total weight is read from `weight` (text before the first `g`,
//!   digits and dots only),
//! - gemstone weight is estimated from the tokens in `misc`: `3mm` stones
//!   weigh `d³/700` grams, carat values such as `0.25` weigh `ct × 0.2`
//!   grams, tokens containing `#`, `cm` or `%` are ignored,
//! - the material weight is the remainder and is priced by `material`.
//!
//! Unpriced materials get a zero value but still report their total weight.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::table::{Cell, Table, TableError};

/// Columns written by [`calculate`], in output order
pub const VALUATION_COLUMNS: [&str; 5] = [
    "jewelry_price",
    "material_price",
    "total_weight",
    "gemstone_weight",
    "material_weight",
];

/// Grams per carat
const CARAT_GRAMS: f64 = 0.2;

/// Divisor turning a stone diameter in mm into an estimated weight in grams
const MM_CUBE_DIVISOR: f64 = 700.0;

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("valid number pattern"));

/// Valuation errors
#[derive(Debug, Error)]
pub enum ValuationError {
    #[error("{sheet} sheet is missing column: {column}")]
    MissingColumn { sheet: &'static str, column: String },

    #[error(transparent)]
    Table(#[from] TableError),
}

fn require(table: &Table, sheet: &'static str, column: &str) -> Result<usize, ValuationError> {
    table
        .column_index(column)
        .ok_or_else(|| ValuationError::MissingColumn {
            sheet,
            column: column.to_string(),
        })
}

/// Material → price per gram
#[derive(Debug, Clone, Default)]
pub struct PriceList {
    prices: HashMap<String, f64>,
}

impl PriceList {
    /// Build from a sheet with `material` and `price` columns.
    ///
    /// Materials are lower-cased; non-numeric prices count as 0. Later
    /// rows override earlier ones for the same material.
    pub fn from_table(table: &Table) -> Result<Self, ValuationError> {
        let material = require(table, "price", "material")?;
        let price = require(table, "price", "price")?;

        let mut prices = HashMap::new();
        for row in 0..table.len() {
            let Some(name) = table.cell(row, material) else {
                continue;
            };
            let value = table.cell(row, price).map(coerce_number).unwrap_or(0.0);
            prices.insert(name.to_lowercase(), value);
        }

        Ok(Self { prices })
    }

    pub fn get(&self, material: &str) -> Option<f64> {
        self.prices.get(material).copied()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

/// Valuation of one item row
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RowValuation {
    pub jewelry_price: f64,
    pub material_price: f64,
    pub total_weight: f64,
    pub gemstone_weight: f64,
    pub material_weight: f64,
}

impl RowValuation {
    fn values(&self) -> [f64; 5] {
        [
            self.jewelry_price,
            self.material_price,
            self.total_weight,
            self.gemstone_weight,
            self.material_weight,
        ]
    }
}

/// Text of a weight cell that is fed to the number parser
fn weight_digits(raw: &str) -> String {
    raw.split('g')
        .next()
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect()
}

/// Parse a free-form weight such as `"12.5g"` or `"約 3.2 g"`.
///
/// Missing, empty and unparsable weights are 0.
pub fn parse_total_weight(raw: Option<&str>) -> f64 {
    raw.map(weight_digits)
        .and_then(|digits| digits.parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Estimate gemstone weight in grams from the `misc` notes
pub fn estimate_gemstone_weight(misc: Option<&str>) -> f64 {
    let Some(misc) = misc else {
        return 0.0;
    };

    misc.split_whitespace()
        .filter(|part| !(part.contains('#') || part.contains("cm") || part.contains('%')))
        .filter_map(|part| {
            let number: f64 = NUMBER.find(part)?.as_str().parse().ok()?;
            if part.contains("mm") {
                Some(number.powi(3) / MM_CUBE_DIVISOR)
            } else if part.contains('.') {
                Some(number * CARAT_GRAMS)
            } else {
                None
            }
        })
        .sum()
}

/// Value a single item
pub fn value_row(
    weight: Option<&str>,
    misc: Option<&str>,
    material: Option<&str>,
    prices: &PriceList,
) -> RowValuation {
    let total_weight = parse_total_weight(weight);

    let price = material
        .map(|m| m.trim().to_lowercase())
        .filter(|m| !m.is_empty())
        .and_then(|m| prices.get(&m));

    match price {
        Some(material_price) => {
            let gemstone_weight = estimate_gemstone_weight(misc);
            let material_weight = total_weight - gemstone_weight;
            RowValuation {
                jewelry_price: material_weight * material_price,
                material_price,
                total_weight,
                gemstone_weight,
                material_weight,
            }
        }
        None => RowValuation {
            total_weight,
            ..RowValuation::default()
        },
    }
}

/// Value every row of `items`, writing the valuation columns in place.
/// Existing valuation columns are overwritten.
pub fn calculate(items: &mut Table, prices: &Table) -> Result<(), ValuationError> {
    let prices = PriceList::from_table(prices)?;
    let weight = require(items, "item", "weight")?;
    let misc = require(items, "item", "misc")?;
    let material = require(items, "item", "material")?;

    let valuations: Vec<RowValuation> = (0..items.len())
        .map(|row| {
            value_row(
                items.cell(row, weight),
                items.cell(row, misc),
                items.cell(row, material),
                &prices,
            )
        })
        .collect();

    let targets: Vec<usize> = VALUATION_COLUMNS
        .iter()
        .map(|name| items.ensure_column(name))
        .collect();

    for (row, valuation) in valuations.iter().enumerate() {
        for (col, value) in targets.iter().zip(valuation.values()) {
            items.set_cell(row, *col, Some(format_number(value)));
        }
    }

    tracing::debug!(
        rows = items.len(),
        materials = prices.len(),
        "Valuation calculated"
    );

    Ok(())
}

/// A weight that could not be read as a number
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvalidWeight {
    pub index: usize,
    pub weight: String,
    pub box_id: String,
    pub box_no: String,
    pub row_data: Map<String, Value>,
}

/// Find rows whose non-blank weight does not parse. A sheet without a
/// `weight` column has no invalid rows.
pub fn find_invalid_weights(items: &Table) -> Vec<InvalidWeight> {
    let Some(weight) = items.column_index("weight") else {
        return Vec::new();
    };
    let box_id = items.column_index("box_id");
    let box_no = items.column_index("box_no");
    let text = |row: usize, col: Option<usize>| {
        col.and_then(|c| items.cell(row, c))
            .unwrap_or_default()
            .to_string()
    };

    (0..items.len())
        .filter_map(|row| {
            let raw = items.cell(row, weight)?;
            if raw.trim().is_empty() || weight_digits(raw).parse::<f64>().is_ok() {
                return None;
            }
            Some(InvalidWeight {
                index: row,
                weight: raw.to_string(),
                box_id: text(row, box_id),
                box_no: text(row, box_no),
                row_data: items.row_object(row),
            })
        })
        .collect()
}

/// Calculation over operator-corrected rows.
///
/// Blank weights count as missing, `box_no`/`box_id` are coerced to
/// integers (non-numeric → 0), rows are stably sorted by
/// `(box_no, box_id)` and the client-side `original_index` is dropped.
pub fn calculate_fixed(items: &mut Table, prices: &Table) -> Result<(), ValuationError> {
    if let Some(weight) = items.column_index("weight") {
        for row in 0..items.len() {
            if items.cell(row, weight).is_some_and(|w| w.trim().is_empty()) {
                items.set_cell(row, weight, None);
            }
        }
    }

    calculate(items, prices)?;

    let box_no = require(items, "item", "box_no")?;
    let box_id = require(items, "item", "box_id")?;
    for row in 0..items.len() {
        for col in [box_no, box_id] {
            let n = coerce_integer(items.cell(row, col));
            items.set_cell(row, col, Some(n.to_string()));
        }
    }

    items.sort_rows_by_key(|cells| (integer_cell(&cells[box_no]), integer_cell(&cells[box_id])));
    items.drop_column("original_index");

    Ok(())
}

/// Quick per-row values: `weight × price` joined on material.
///
/// Column names and materials are lower-cased first. Rows are keyed by
/// `name` when the item sheet has one, otherwise by `material`; unpriced
/// or unparsable rows are worth 0.
pub fn quick_values(items: &Table, prices: &Table) -> Result<Vec<Value>, ValuationError> {
    let mut items = items.clone();
    let mut prices = prices.clone();
    items.rename_columns(str::to_lowercase);
    prices.rename_columns(str::to_lowercase);

    let material = require(&items, "item", "material")?;
    let weight_col = require(&items, "item", "weight")?;
    let price_material = require(&prices, "price", "material")?;
    let price = require(&prices, "price", "price")?;
    let (key, key_col) = match items.column_index("name") {
        Some(col) => ("name", col),
        None => ("material", material),
    };

    let mut results = Vec::new();
    for row in 0..items.len() {
        let item_material = items.cell(row, material).map(str::to_lowercase);
        let weight = items
            .cell(row, weight_col)
            .and_then(|w| w.trim().parse::<f64>().ok());

        let matches: Vec<Option<f64>> = (0..prices.len())
            .filter(|&p| {
                item_material.is_some()
                    && prices.cell(p, price_material).map(str::to_lowercase) == item_material
            })
            .map(|p| prices.cell(p, price).and_then(|v| v.trim().parse::<f64>().ok()))
            .collect();
        let matches = if matches.is_empty() { vec![None] } else { matches };

        let label = if key_col == material {
            item_material.clone()
        } else {
            items.cell(row, key_col).map(str::to_string)
        };

        for unit_price in matches {
            let value = match (weight, unit_price) {
                (Some(w), Some(p)) if (w * p).is_finite() => w * p,
                _ => 0.0,
            };
            results.push(json!({ key: label, "value": value }));
        }
    }

    Ok(results)
}

/// Numeric coercion: unparsable and NaN become 0
fn coerce_number(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| !v.is_nan())
        .unwrap_or(0.0)
}

/// Integer coercion truncating toward zero
fn coerce_integer(raw: Option<&str>) -> i64 {
    raw.map(coerce_number)
        .filter(|v| v.is_finite())
        .map(|v| v.trunc() as i64)
        .unwrap_or(0)
}

fn integer_cell(cell: &Cell) -> i64 {
    coerce_integer(cell.as_deref())
}

/// Render a float the way the result sheets always have: integral values
/// keep a trailing `.0`, everything else uses the shortest exact form.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prices() -> Table {
        Table::from_csv_bytes(b"material,price\nK18,9000\nPt900,5000.5\nSV925,abc\n").unwrap()
    }

    fn price_list() -> PriceList {
        PriceList::from_table(&prices()).unwrap()
    }

    #[test]
    fn test_parse_total_weight() {
        assert_eq!(parse_total_weight(Some("12.5g")), 12.5);
        assert_eq!(parse_total_weight(Some("12.5 g (chain 2g)")), 12.5);
        assert_eq!(parse_total_weight(Some("約3.2")), 3.2);
        assert_eq!(parse_total_weight(Some("7")), 7.0);
        assert_eq!(parse_total_weight(Some("abc")), 0.0);
        assert_eq!(parse_total_weight(Some("1.2.3")), 0.0);
        assert_eq!(parse_total_weight(Some("")), 0.0);
        assert_eq!(parse_total_weight(None), 0.0);
    }

    #[test]
    fn test_gemstone_weight() {
        // 3mm stone: 27 / 700
        let mm = estimate_gemstone_weight(Some("3mm"));
        assert!((mm - 27.0 / 700.0).abs() < 1e-12);

        // 0.5 carat: 0.1 g
        let ct = estimate_gemstone_weight(Some("0.5ct"));
        assert!((ct - 0.1).abs() < 1e-12);

        // integers without mm or a dot are ignored
        assert_eq!(estimate_gemstone_weight(Some("2pcs")), 0.0);

        // sizes, percentages and item numbers are skipped
        assert_eq!(
            estimate_gemstone_weight(Some("#12 45cm 0.5% 1.5cm")),
            0.0
        );

        let mixed = estimate_gemstone_weight(Some("D0.25 3mm #3 note"));
        assert!((mixed - (0.05 + 27.0 / 700.0)).abs() < 1e-12);

        assert_eq!(estimate_gemstone_weight(None), 0.0);
    }

    #[test]
    fn test_price_list() {
        let list = price_list();
        assert_eq!(list.get("k18"), Some(9000.0));
        assert_eq!(list.get("pt900"), Some(5000.5));
        assert_eq!(list.get("sv925"), Some(0.0));
        assert_eq!(list.get("K18"), None);
    }

    #[test]
    fn test_value_row_priced() {
        let v = value_row(Some("10g"), Some("0.5ct"), Some("  K18 "), &price_list());

        assert_eq!(v.total_weight, 10.0);
        assert!((v.gemstone_weight - 0.1).abs() < 1e-12);
        assert!((v.material_weight - 9.9).abs() < 1e-9);
        assert!((v.jewelry_price - 9.9 * 9000.0).abs() < 1e-6);
        assert_eq!(v.material_price, 9000.0);
    }

    #[test]
    fn test_value_row_unpriced_keeps_total_weight() {
        let v = value_row(Some("10g"), Some("3mm"), Some("gold"), &price_list());
        assert_eq!(
            v,
            RowValuation {
                total_weight: 10.0,
                ..RowValuation::default()
            }
        );

        let none = value_row(Some("4g"), None, None, &price_list());
        assert_eq!(none.total_weight, 4.0);
        assert_eq!(none.jewelry_price, 0.0);
    }

    #[test]
    fn test_calculate_appends_columns() {
        let mut items = Table::from_csv_bytes(
            b"box_id,weight,misc,material\n1,10g,0.5ct,K18\n2,5g,,silver\n",
        )
        .unwrap();

        calculate(&mut items, &prices()).unwrap();

        assert_eq!(
            &items.columns()[4..],
            VALUATION_COLUMNS.map(String::from).as_slice()
        );
        let col = |name: &str| items.column_index(name).unwrap();
        assert_eq!(items.cell(0, col("material_price")), Some("9000.0"));
        assert_eq!(items.cell(0, col("total_weight")), Some("10.0"));
        assert_eq!(items.cell(1, col("jewelry_price")), Some("0.0"));
        assert_eq!(items.cell(1, col("total_weight")), Some("5.0"));
    }

    #[test]
    fn test_calculate_overwrites_existing_columns() {
        let mut items =
            Table::from_csv_bytes(b"weight,misc,material,total_weight\n2g,,K18,old\n").unwrap();

        calculate(&mut items, &prices()).unwrap();

        assert_eq!(items.columns().len(), 8);
        assert_eq!(items.cell(0, 3), Some("2.0"));
    }

    #[test]
    fn test_calculate_missing_columns() {
        let mut items = Table::from_csv_bytes(b"weight,material\n1g,K18\n").unwrap();
        let err = calculate(&mut items, &prices()).unwrap_err();
        assert!(matches!(
            err,
            ValuationError::MissingColumn { sheet: "item", ref column } if column == "misc"
        ));

        let mut items = Table::from_csv_bytes(b"weight,misc,material\n1g,,K18\n").unwrap();
        let bad_prices = Table::from_csv_bytes(b"material,cost\nK18,1\n").unwrap();
        assert!(matches!(
            calculate(&mut items, &bad_prices),
            Err(ValuationError::MissingColumn { sheet: "price", .. })
        ));
    }

    #[test]
    fn test_find_invalid_weights() {
        let items = Table::from_csv_bytes(
            b"box_id,box_no,weight\n1,10,12g\n2,10,abc\n3,11,\n4,11,1.2.3g\n5,12,  \n",
        )
        .unwrap();

        let invalid = find_invalid_weights(&items);
        let indices: Vec<usize> = invalid.iter().map(|w| w.index).collect();

        assert_eq!(indices, vec![1, 3]);
        assert_eq!(invalid[0].weight, "abc");
        assert_eq!(invalid[0].box_id, "2");
        assert_eq!(invalid[0].box_no, "10");
        assert_eq!(invalid[0].row_data["weight"], "abc");
    }

    #[test]
    fn test_find_invalid_weights_without_weight_column() {
        let items = Table::from_csv_bytes(b"box_id\n1\n").unwrap();
        assert!(find_invalid_weights(&items).is_empty());
    }

    #[test]
    fn test_calculate_fixed_sorts_and_cleans() {
        let records = vec![
            json!({"box_no": "2", "box_id": 1, "weight": "3g", "misc": null, "material": "K18", "original_index": 0}),
            json!({"box_no": 1, "box_id": "x", "weight": " ", "misc": null, "material": "K18", "original_index": 1}),
            json!({"box_no": "1.9", "box_id": 0, "weight": "1g", "misc": null, "material": "Pt900", "original_index": 2}),
            json!({"box_no": 1, "box_id": -1, "weight": "2g", "misc": null, "material": "K18", "original_index": 3}),
        ];
        let mut items = Table::from_records(&records).unwrap();

        calculate_fixed(&mut items, &prices()).unwrap();

        assert!(items.column_index("original_index").is_none());
        let box_no = items.column_index("box_no").unwrap();
        let box_id = items.column_index("box_id").unwrap();
        let weight = items.column_index("total_weight").unwrap();

        let keys: Vec<(&str, &str)> = (0..items.len())
            .map(|r| (items.cell(r, box_no).unwrap(), items.cell(r, box_id).unwrap()))
            .collect();
        assert_eq!(keys, vec![("1", "-1"), ("1", "0"), ("1", "0"), ("2", "1")]);

        // stable: the blank-weight row (input 1) stays ahead of input 2
        assert_eq!(items.cell(1, weight), Some("0.0"));
        assert_eq!(items.cell(2, weight), Some("1.0"));
    }

    #[test]
    fn test_calculate_fixed_requires_box_columns() {
        let mut items = Table::from_records(&[json!({"weight": "1g", "misc": null, "material": "K18"})]).unwrap();
        assert!(matches!(
            calculate_fixed(&mut items, &prices()),
            Err(ValuationError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_quick_values() {
        let items = Table::from_csv_bytes(b"Name,Material,Weight\nring,K18,2\nchain,gold,3\nbad,K18,x\n").unwrap();
        let prices = Table::from_csv_bytes(b"Material,Price\nk18,100\n").unwrap();

        let results = quick_values(&items, &prices).unwrap();

        assert_eq!(
            results,
            vec![
                json!({"name": "ring", "value": 200.0}),
                json!({"name": "chain", "value": 0.0}),
                json!({"name": "bad", "value": 0.0}),
            ]
        );
    }

    #[test]
    fn test_quick_values_keyed_by_material() {
        let items = Table::from_csv_bytes(b"material,weight\nK18,1.5\n").unwrap();
        let prices = Table::from_csv_bytes(b"material,price\nK18,10\n").unwrap();

        let results = quick_values(&items, &prices).unwrap();
        assert_eq!(results, vec![json!({"material": "k18", "value": 15.0})]);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0.0), "0.0");
        assert_eq!(format_number(12.0), "12.0");
        assert_eq!(format_number(12.5), "12.5");
        assert_eq!(format_number(-3.0), "-3.0");
        assert_eq!(format_number(0.1 + 0.2), "0.30000000000000004");
    }
}
