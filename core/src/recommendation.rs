//! Recommendation table: the structured half of a model response.
//!
//! The model is asked for a fixed eight-column schema but may drop,
//! rename or add columns. The table keeps whatever grid it was given;
//! typed access goes through `RecommendationRow`, where every schema
//! field is optional and unknown columns are kept in `extra`.

use crate::types::RECOMMENDATION_COLUMNS;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Why a table block could not be turned into a grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// Nothing left after separator rows were removed.
    Empty,
    /// A row's cell count differs from the header's.
    Ragged { row: usize, expected: usize, found: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationTable {
    pub columns: Vec<String>,
    pub rows:    Vec<Vec<String>>,
}

/// Split one `| a | b |` line into trimmed cells, outer delimiters removed.
fn split_cells(line: &str) -> Vec<String> {
    let line = line.trim();
    let line = line.strip_prefix('|').unwrap_or(line);
    let line = line.strip_suffix('|').unwrap_or(line);
    line.split('|').map(|c| c.trim().to_string()).collect()
}

/// Markdown header separator: every cell is dashes/colons (`---`, `:--:`).
fn is_separator_row(cells: &[String]) -> bool {
    let has_rule = cells.iter().any(|c| c.contains('-') || c.contains('='));
    has_rule
        && cells
            .iter()
            .all(|c| c.chars().all(|ch| matches!(ch, '-' | ':' | '=' | '+' | ' ')))
}

impl RecommendationTable {
    /// Build a grid from table lines. The first non-separator line is the
    /// header. Fully empty columns and rows are dropped.
    pub fn from_lines(lines: &[&str]) -> Result<Self, GridError> {
        let mut grid: Vec<Vec<String>> = lines
            .iter()
            .map(|l| split_cells(l))
            .filter(|cells| !is_separator_row(cells))
            .collect();
        if grid.is_empty() {
            return Err(GridError::Empty);
        }

        let width = grid[0].len();
        for (row, cells) in grid.iter().enumerate().skip(1) {
            if cells.len() != width {
                return Err(GridError::Ragged {
                    row,
                    expected: width,
                    found: cells.len(),
                });
            }
        }

        let keep: Vec<bool> = (0..width)
            .map(|col| grid.iter().any(|cells| !cells[col].is_empty()))
            .collect();
        if !keep.iter().any(|k| *k) {
            return Err(GridError::Empty);
        }
        for cells in grid.iter_mut() {
            let mut col = 0;
            cells.retain(|_| {
                let k = keep[col];
                col += 1;
                k
            });
        }

        let columns = grid.remove(0);
        let rows = grid
            .into_iter()
            .filter(|cells| cells.iter().any(|c| !c.is_empty()))
            .collect();
        Ok(Self { columns, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All values of one column, or `None` when the column is absent.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| r[idx].as_str()).collect())
    }

    /// Schema columns that the model left out.
    pub fn missing_columns(&self) -> Vec<&'static str> {
        RECOMMENDATION_COLUMNS
            .iter()
            .copied()
            .filter(|c| self.column_index(c).is_none())
            .collect()
    }

    pub fn records(&self) -> Vec<RecommendationRow> {
        self.rows
            .iter()
            .map(|cells| RecommendationRow::from_cells(&self.columns, cells))
            .collect()
    }
}

/// Typed view of one recommendation. Field names follow the schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationRow {
    pub msisdn:              Option<String>,
    pub recommended_product: Option<String>,
    pub category:            Option<String>,
    pub tier:                Option<String>,
    pub product_price:       Option<String>,
    pub reason:              Option<String>,
    pub upsell_option:       Option<String>,
    pub cross_sell_option:   Option<String>,
    /// Columns outside the schema, by observed name.
    pub extra:               BTreeMap<String, String>,
}

impl RecommendationRow {
    /// Column names are matched case-sensitively.
    pub fn from_cells(columns: &[String], cells: &[String]) -> Self {
        let mut row = RecommendationRow::default();
        for (name, value) in columns.iter().zip(cells) {
            let slot = match name.as_str() {
                "MSISDN" => &mut row.msisdn,
                "RecommendedProduct" => &mut row.recommended_product,
                "Category" => &mut row.category,
                "Tier" => &mut row.tier,
                "ProductPrice" => &mut row.product_price,
                "Reason" => &mut row.reason,
                "UpsellOption" => &mut row.upsell_option,
                "CrossSellOption" => &mut row.cross_sell_option,
                other => {
                    row.extra.insert(other.to_string(), value.clone());
                    continue;
                }
            };
            if !value.is_empty() {
                *slot = Some(value.clone());
            }
        }
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alignment_row_is_separator() {
        let cells: Vec<String> = vec![":---".into(), "---:".into(), ":-:".into()];
        assert!(is_separator_row(&cells));
        let cells: Vec<String> = vec!["-".into(), "Data".into()];
        assert!(!is_separator_row(&cells));
    }

    #[test]
    fn empty_cells_are_none() {
        let columns = vec!["MSISDN".to_string(), "Category".to_string(), "Notes".to_string()];
        let cells = vec!["2783".to_string(), String::new(), "vip".to_string()];
        let row = RecommendationRow::from_cells(&columns, &cells);
        assert_eq!(row.msisdn.as_deref(), Some("2783"));
        assert_eq!(row.category, None);
        assert_eq!(row.extra.get("Notes").map(String::as_str), Some("vip"));
    }
}
