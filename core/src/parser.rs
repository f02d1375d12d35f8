//! Recommendation response parser.
//!
//! Turns free model text into a recommendation table, categorised insights
//! and residual commentary. The parser never fails: a missing or malformed
//! table degrades to `table: None` with the whole text kept as commentary.

use crate::{
    insights::{self, InsightEntry},
    recommendation::RecommendationTable,
    table_scan,
};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedResponse {
    pub table:      Option<RecommendationTable>,
    pub insights:   Vec<InsightEntry>,
    pub commentary: String,
}

impl ParsedResponse {
    /// True when the response carried no usable table.
    pub fn is_degraded(&self) -> bool {
        self.table.is_none()
    }
}

pub fn parse(response_text: &str) -> ParsedResponse {
    let (table, commentary) = match table_scan::find_table_block(response_text) {
        None => {
            debug!("no pipe table in response; treating all text as commentary");
            (None, response_text.trim().to_string())
        }
        Some(block) => match RecommendationTable::from_lines(&block.lines) {
            Ok(table) => {
                let residual = [&response_text[..block.start], &response_text[block.end..]].concat();
                (Some(table), residual.trim().to_string())
            }
            Err(e) => {
                warn!("table block could not be parsed ({e:?}); keeping full text");
                (None, response_text.trim().to_string())
            }
        },
    };

    let insights = insights::categorize(&commentary);
    ParsedResponse {
        table,
        insights,
        commentary,
    }
}
