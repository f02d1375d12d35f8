//! Category distribution of a recommendation table, plus colour lookup.

use crate::{config::PaletteConfig, recommendation::RecommendationTable};
use serde::Serialize;
use std::collections::HashMap;

/// Bucket for rows with no usable category.
pub const OTHER_CATEGORY: &str = "Other";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub category:   String,
    pub count:      usize,
    /// Share of all rows, rounded to two decimals.
    pub percentage: f64,
}

/// Count recommendations per `Category`, most frequent first, ties by name.
/// A table without a `Category` column counts every row as `Other`.
pub fn category_distribution(table: &RecommendationTable) -> Vec<CategoryCount> {
    let total = table.len();
    if total == 0 {
        return Vec::new();
    }

    let values = table
        .column("Category")
        .unwrap_or_else(|| vec![""; total]);
    let mut counts: HashMap<String, usize> = HashMap::new();
    for value in values {
        let category = match value.trim() {
            "" => OTHER_CATEGORY,
            c => c,
        };
        *counts.entry(category.to_string()).or_default() += 1;
    }

    let mut out: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(category, count)| CategoryCount {
            category,
            count,
            percentage: (count as f64 / total as f64 * 10_000.0).round() / 100.0,
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.category.cmp(&b.category)));
    out
}

/// Category → colour mapping, loaded from configuration.
#[derive(Debug, Clone)]
pub struct CategoryPalette {
    colors:   HashMap<String, String>,
    fallback: String,
}

impl CategoryPalette {
    pub fn from_config(config: &PaletteConfig) -> Self {
        Self {
            colors:   config.colors.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            fallback: config.fallback.clone(),
        }
    }

    /// Colour for a category name; surrounding whitespace is ignored.
    pub fn color_for(&self, category: &str) -> &str {
        self.colors
            .get(category.trim())
            .map(String::as_str)
            .unwrap_or(&self.fallback)
    }
}

/// Horizontal text bars, one line per category, scaled to `width` columns.
pub fn render_bar_chart(counts: &[CategoryCount], width: usize) -> String {
    let max = counts.iter().map(|c| c.count).max().unwrap_or(0);
    let label_width = counts.iter().map(|c| c.category.chars().count()).max().unwrap_or(0);
    counts
        .iter()
        .map(|c| {
            let bar = if max == 0 { 0 } else { (c.count * width).div_ceil(max) };
            format!(
                "{:<label_width$}  {}  {} ({:.2}%)",
                c.category,
                "#".repeat(bar),
                c.count,
                c.percentage
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
