//! Prompt construction for one recommendation request.

use crate::{
    dataset::ProductCatalogue,
    selector::SubscriberSubset,
    types::RECOMMENDATION_COLUMNS,
};

/// Render rows as a fixed-width text table: right-aligned columns,
/// two-space gaps, header first, no index column.
pub fn render_text_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            rows.iter()
                .filter_map(|r| r.get(i))
                .map(|c| c.chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let render_row = |cells: &[String]| -> String {
        widths
            .iter()
            .enumerate()
            .map(|(i, &w)| {
                let cell = cells.get(i).map(String::as_str).unwrap_or("");
                format!("{cell:>w$}")
            })
            .collect::<Vec<_>>()
            .join("  ")
    };

    std::iter::once(render_row(headers))
        .chain(rows.iter().map(|r| render_row(r)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_subscribers(subset: &SubscriberSubset<'_>) -> String {
    let headers: Vec<String> = subset
        .records
        .first()
        .map(|r| r.fields.iter().map(|(name, _)| name.clone()).collect())
        .unwrap_or_default();
    let rows: Vec<Vec<String>> = subset
        .records
        .iter()
        .map(|r| r.fields.iter().map(|(_, v)| v.clone()).collect())
        .collect();
    render_text_table(&headers, &rows)
}

pub fn render_catalogue(catalogue: &ProductCatalogue) -> String {
    let rows: Vec<Vec<String>> = catalogue
        .records
        .iter()
        .map(|p| p.fields.iter().map(|(_, v)| v.clone()).collect())
        .collect();
    render_text_table(&catalogue.headers, &rows)
}

/// One `- Include <field>` line per active profiling field.
pub fn render_field_filters(fields: &[String]) -> String {
    fields
        .iter()
        .map(|f| format!("- Include {f}"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn build_prompt(
    subset: &SubscriberSubset<'_>,
    catalogue: &ProductCatalogue,
    fields: &[String],
) -> String {
    let subscribers = render_subscribers(subset);
    let products = render_catalogue(catalogue);
    let filters = render_field_filters(fields);
    let schema = RECOMMENDATION_COLUMNS.join(" | ");

    format!(
        "Compare the subscriber data below with the product catalogue. \
Recommend one product for each of the following subscribers:

{subscribers}

Use the product catalogue below:

{products}

Variables to consider for profiling:
{filters}

Output a clean markdown-style table with the following columns exactly:
{schema}
Use product names instead of product codes.
After the table, include a short bullet-point section with additional upsell and \
cross-sell insights or strategy tips. Do not include general commentary, just the \
table and the follow-up list.
Always make a recommendation for every subscriber.
"
    )
}
