//! CSV, text and XLSX exports of an analysis result.

use crate::{
    analysis::AnalysisResult,
    error::{RecError, RecResult},
    insights::{self, InsightEntry},
    prompt,
    recommendation::RecommendationTable,
};
use chrono::{DateTime, Local};
use log::info;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::io::{Read, Write};
use std::path::Path;

pub const SHEET_SUBSCRIBERS: &str = "Subscribers";
pub const SHEET_RECOMMENDATIONS: &str = "Recommendations";
pub const SHEET_INSIGHTS: &str = "Insights";
pub const SHEET_METADATA: &str = "Metadata";

/// `<prefix>_<YYYYmmdd_HHMMSS>.<ext>`
pub fn default_file_name(prefix: &str, ext: &str, now: DateTime<Local>) -> String {
    format!("{prefix}_{}.{ext}", now.format("%Y%m%d_%H%M%S"))
}

// ── CSV ───────────────────────────────────────────────────────────

pub fn write_table_csv<W: Write>(table: &RecommendationTable, writer: W) -> RecResult<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(&table.columns)?;
    for row in &table.rows {
        csv.write_record(row)?;
    }
    csv.flush()?;
    Ok(())
}

pub fn export_table_csv(table: &RecommendationTable, path: &Path) -> RecResult<()> {
    let file = std::fs::File::create(path)?;
    write_table_csv(table, file)?;
    info!("wrote {} recommendation rows to {}", table.len(), path.display());
    Ok(())
}

/// Read back a table written by `write_table_csv`.
pub fn read_table_csv<R: Read>(reader: R) -> RecResult<RecommendationTable> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let columns: Vec<String> = csv.headers()?.iter().map(str::to_string).collect();
    let rows = csv
        .records()
        .map(|r| r.map(|rec| rec.iter().map(str::to_string).collect()))
        .collect::<Result<Vec<Vec<String>>, _>>()?;
    Ok(RecommendationTable { columns, rows })
}

/// `Type,Strategy` rows, one per insight.
pub fn write_insights_csv<W: Write>(entries: &[InsightEntry], writer: W) -> RecResult<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(["Type", "Strategy"])?;
    for entry in entries {
        csv.write_record([entry.kind.label(), entry.text.as_str()])?;
    }
    csv.flush()?;
    Ok(())
}

pub fn export_insights_csv(entries: &[InsightEntry], path: &Path) -> RecResult<()> {
    let file = std::fs::File::create(path)?;
    write_insights_csv(entries, file)?;
    info!("wrote {} insights to {}", entries.len(), path.display());
    Ok(())
}

// ── Text report ───────────────────────────────────────────────────

pub fn write_text_report<W: Write>(result: &AnalysisResult, mut writer: W) -> RecResult<()> {
    let rows: Vec<Vec<String>> = result
        .subscribers
        .iter()
        .map(|r| r.fields.iter().map(|(_, v)| v.clone()).collect())
        .collect();
    writeln!(writer, "Selected Subscribers")?;
    writeln!(writer, "{}", prompt::render_text_table(&result.subscriber_headers, &rows))?;
    writeln!(writer)?;
    writeln!(writer, "AI Recommendations")?;
    writeln!(writer, "{}", result.response.trim())?;
    writer.flush()?;
    Ok(())
}

pub fn export_text_report(result: &AnalysisResult, path: &Path) -> RecResult<()> {
    let file = std::fs::File::create(path)?;
    write_text_report(result, std::io::BufWriter::new(file))?;
    info!("wrote text report to {}", path.display());
    Ok(())
}

// ── Workbook ──────────────────────────────────────────────────────

fn sheet_index(value: usize) -> RecResult<u32> {
    u32::try_from(value).map_err(|_| RecError::InvalidInput(format!("row {value} exceeds sheet size")))
}

fn col_index(value: usize) -> RecResult<u16> {
    u16::try_from(value)
        .map_err(|_| RecError::InvalidInput(format!("column {value} exceeds sheet size")))
}

fn write_grid(
    sheet: &mut Worksheet,
    header_format: &Format,
    headers: &[String],
    rows: &[Vec<String>],
) -> RecResult<()> {
    for (c, header) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, col_index(c)?, header, header_format)?;
    }
    for (r, row) in rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            sheet.write_string(sheet_index(r + 1)?, col_index(c)?, cell)?;
        }
    }
    Ok(())
}

/// Multi-sheet report: Subscribers, Recommendations (when a table was
/// parsed), Insights and Metadata.
pub fn export_workbook(result: &AnalysisResult, path: &Path) -> RecResult<()> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let subscriber_rows: Vec<Vec<String>> = result
        .subscribers
        .iter()
        .map(|r| r.fields.iter().map(|(_, v)| v.clone()).collect())
        .collect();
    let sheet = workbook.add_worksheet().set_name(SHEET_SUBSCRIBERS)?;
    write_grid(sheet, &header, &result.subscriber_headers, &subscriber_rows)?;

    if let Some(table) = &result.parsed.table {
        let sheet = workbook.add_worksheet().set_name(SHEET_RECOMMENDATIONS)?;
        write_grid(sheet, &header, &table.columns, &table.rows)?;
    }

    let insight_rows: Vec<Vec<String>> = std::iter::once(vec![
        "Commentary".to_string(),
        insights::format_commentary(&result.parsed.commentary),
    ])
    .chain(
        result
            .parsed
            .insights
            .iter()
            .map(|e| vec![e.kind.label().to_string(), e.text.clone()]),
    )
    .collect();
    let sheet = workbook.add_worksheet().set_name(SHEET_INSIGHTS)?;
    write_grid(
        sheet,
        &header,
        &["Type".to_string(), "Insights".to_string()],
        &insight_rows,
    )?;

    let metadata = vec![
        vec![
            "Report Generated".to_string(),
            result.generated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ],
        vec!["Number of Subscribers".to_string(), result.subscriber_count().to_string()],
        vec!["Selection Mode".to_string(), result.selection_mode.to_string()],
        vec!["Variables Used".to_string(), result.fields_label()],
    ];
    let sheet = workbook.add_worksheet().set_name(SHEET_METADATA)?;
    write_grid(
        sheet,
        &header,
        &["Parameter".to_string(), "Value".to_string()],
        &metadata,
    )?;

    workbook.save(path)?;
    info!("wrote workbook report to {}", path.display());
    Ok(())
}
