//! Recommendation response parsing tests.

use amabutho_core::{
    insights::{categorize, extract_bullets, InsightKind},
    parser::parse,
    types::RECOMMENDATION_COLUMNS,
};

// ── Test helpers ────────────────────────────────────────────────────────────

const WELL_FORMED: &str = "\
Here are the recommendations:

| MSISDN | RecommendedProduct | Category | Tier | ProductPrice | Reason | UpsellOption | CrossSellOption |
|---|---|---|---|---|---|---|---|
| 27831000001 | Gaming Pass | Gaming | Gold | 99 | Heavy mobile gamer | Gaming Pass Plus | Music Stream |
| 27831000002 | Health Plus | Health | Silver | 49 | Uses fitness apps | Health Max | Data Bundle 1GB |

- Offer Gaming Pass users an upgrade to the Gold tier after three months.
- Pair the health plan with a data bundle for wearables.
- Review churn signals weekly.
";

fn kinds(text: &str) -> Vec<InsightKind> {
    parse(text).insights.iter().map(|e| e.kind).collect()
}

// ── Table extraction ────────────────────────────────────────────────────────

/// Eight schema columns, one record per data line, and three insights in
/// Upsell, CrossSell, Other order.
#[test]
fn well_formed_response_yields_table_and_insights() {
    let parsed = parse(WELL_FORMED);

    let table = parsed.table.as_ref().expect("table should parse");
    assert_eq!(table.columns, RECOMMENDATION_COLUMNS.to_vec());
    assert_eq!(table.len(), 2);
    assert!(table.missing_columns().is_empty());

    let records = table.records();
    assert_eq!(records[0].msisdn.as_deref(), Some("27831000001"));
    assert_eq!(records[0].category.as_deref(), Some("Gaming"));
    assert_eq!(records[1].cross_sell_option.as_deref(), Some("Data Bundle 1GB"));
    assert!(records[1].extra.is_empty());

    assert_eq!(
        kinds(WELL_FORMED),
        vec![InsightKind::Upsell, InsightKind::CrossSell, InsightKind::Other]
    );
}

/// A markdown separator row never becomes a phantom all-dash record.
#[test]
fn separator_row_is_not_a_record() {
    let text = "| MSISDN | Category |\n|:---|---:|\n| 1 | Data |\n";
    let table = parse(text).table.unwrap();
    assert_eq!(table.len(), 1);
    assert!(
        table.rows.iter().all(|r| r.iter().all(|c| !c.starts_with('-') && !c.starts_with(':'))),
        "separator leaked into rows: {:?}",
        table.rows
    );
}

#[test]
fn response_without_pipes_is_all_commentary() {
    let text = "  Sorry, I could not build a table.\n- Upgrade everyone to premium.\n\n";
    let parsed = parse(text);
    assert!(parsed.table.is_none());
    assert!(parsed.is_degraded());
    assert_eq!(parsed.commentary, text.trim());
    assert_eq!(parsed.insights.len(), 1);
}

/// Ragged rows degrade to no table; the full text is kept as commentary.
#[test]
fn ragged_table_degrades_to_commentary() {
    let text = "Intro\n| a | b |\n| 1 | 2 | 3 |\n- bundle idea\n";
    let parsed = parse(text);
    assert!(parsed.table.is_none());
    assert_eq!(parsed.commentary, text.trim());
    assert_eq!(parsed.insights.len(), 1);
    assert_eq!(parsed.insights[0].kind, InsightKind::CrossSell);
}

/// Commentary is the original text with the table block cut out exactly.
#[test]
fn residual_commentary_excludes_table_block() {
    let parsed = parse(WELL_FORMED);
    assert!(!parsed.commentary.contains('|'));
    assert!(parsed.commentary.starts_with("Here are the recommendations:"));
    assert!(parsed.commentary.ends_with("Review churn signals weekly."));
}

#[test]
fn only_first_table_block_is_used() {
    let text = "| A | B |\n| 1 | 2 |\n\ntext\n\n| C | D |\n| 3 | 4 |\n";
    let parsed = parse(text);
    let table = parsed.table.unwrap();
    assert_eq!(table.columns, vec!["A", "B"]);
    assert!(parsed.commentary.contains("| C | D |"));
}

/// Unknown or missing columns never crash typed access.
#[test]
fn unexpected_columns_are_kept_as_extras() {
    let text = "| MSISDN | RecommendedProduct | Confidence |\n| 42 | Video Pack | high |\n";
    let table = parse(text).table.unwrap();
    let missing = table.missing_columns();
    assert!(missing.contains(&"Category"));
    assert!(missing.contains(&"CrossSellOption"));

    let row = &table.records()[0];
    assert_eq!(row.recommended_product.as_deref(), Some("Video Pack"));
    assert_eq!(row.category, None);
    assert_eq!(row.extra.get("Confidence").map(String::as_str), Some("high"));
}

/// Column names are matched case-sensitively.
#[test]
fn lowercase_column_is_not_schema_field() {
    let table = parse("| msisdn | category |\n| 1 | Data |\n").table.unwrap();
    let row = &table.records()[0];
    assert_eq!(row.msisdn, None);
    assert_eq!(row.extra.get("category").map(String::as_str), Some("Data"));
}

#[test]
fn empty_columns_and_rows_are_dropped() {
    let text = "| A |  | B |\n| 1 |  | 2 |\n|  |  |  |\n| 3 |  | 4 |\n";
    let table = parse(text).table.unwrap();
    assert_eq!(table.columns, vec!["A", "B"]);
    assert_eq!(table.rows, vec![vec!["1", "2"], vec!["3", "4"]]);
}

#[test]
fn header_only_table_has_no_rows() {
    let table = parse("| MSISDN | Category |\n|---|---|\n").table.unwrap();
    assert_eq!(table.columns, vec!["MSISDN", "Category"]);
    assert!(table.is_empty());
}

#[test]
fn parsing_is_idempotent() {
    assert_eq!(parse(WELL_FORMED), parse(WELL_FORMED));
}

// ── Bullets and classification ──────────────────────────────────────────────

#[test]
fn multi_line_bullets_are_joined() {
    let text = "- Upgrade heavy users\n  to the premium tier\n* Bundle music\n\nTrailing prose\n";
    assert_eq!(
        extract_bullets(text),
        vec!["Upgrade heavy users to the premium tier", "Bundle music"]
    );
}

#[test]
fn glyph_bullets_and_empty_bullets() {
    let text = "• Offer additional SMS\n-   \n• Nothing special\n";
    assert_eq!(extract_bullets(text), vec!["Offer additional SMS", "Nothing special"]);
}

/// Stable three-way partition: groups in precedence order, source order within.
#[test]
fn insights_partition_is_stable() {
    let text = "\
- Call customers on Fridays
- Add a complementary streaming pass
- Move prepaid users to a higher plan
- Send a satisfaction survey
- Upsell the 5G router
";
    let entries = categorize(text);
    let got: Vec<(InsightKind, &str)> = entries.iter().map(|e| (e.kind, e.text.as_str())).collect();
    assert_eq!(
        got,
        vec![
            (InsightKind::Upsell, "Move prepaid users to a higher plan"),
            (InsightKind::Upsell, "Upsell the 5G router"),
            (InsightKind::CrossSell, "Add a complementary streaming pass"),
            (InsightKind::Other, "Call customers on Fridays"),
            (InsightKind::Other, "Send a satisfaction survey"),
        ]
    );
}

/// Upsell keywords take precedence when both groups match.
#[test]
fn upsell_keyword_wins_over_cross_sell() {
    let entries = categorize("- Premium bundle for families\n- CROSS-SELL voice minutes\n");
    assert_eq!(entries[0].kind, InsightKind::Upsell);
    assert_eq!(entries[1].kind, InsightKind::CrossSell);
}

/// A marker needs no space after it; a doubled marker is a heading or rule.
#[test]
fn markers_without_space_are_bullets() {
    let text = "**Strategy tips:**\n---\n-Upgrade to premium\n*Bundle SMS with data\n";
    assert_eq!(extract_bullets(text), vec!["Upgrade to premium", "Bundle SMS with data"]);

    let parsed = parse("| A | B |\n| 1 | 2 |\n-Upgrade heavy users to premium\n");
    assert_eq!(parsed.insights.len(), 1);
    assert_eq!(parsed.insights[0].kind, InsightKind::Upsell);
    assert_eq!(parsed.insights[0].text, "Upgrade heavy users to premium");
}
