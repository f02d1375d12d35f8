//! Subscriber and product tables loaded from delimited text files.
//!
//! Both tables are read once per session and are immutable afterwards.
//! Malformed rows are skipped and counted; they never reject the file.

use crate::{
    error::{RecError, RecResult},
    types::Msisdn,
};
use log::{debug, info};
use serde::Serialize;
use std::io::Read;
use std::path::Path;

pub const MSISDN_COLUMN: &str = "MSISDN";

// ── Raw grid ──────────────────────────────────────────────────────

struct RawGrid {
    headers: Vec<String>,
    rows:    Vec<Vec<String>>,
    skipped: usize,
}

fn read_file_lossy(path: &Path) -> RecResult<String> {
    let mut bytes = Vec::new();
    std::fs::File::open(path)?.read_to_end(&mut bytes)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Read a header row plus data rows. Rows whose width differs from the
/// header are skipped. `accept` can reject further rows (e.g. bad keys).
fn read_grid<R: Read>(
    reader: R,
    limit: Option<usize>,
    accept: impl Fn(&[String], &[String]) -> bool,
) -> RecResult<RawGrid> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for (line, result) in csv_reader.records().enumerate() {
        if limit.is_some_and(|max| rows.len() >= max) {
            break;
        }
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                debug!("skipping unreadable row {}: {e}", line + 2);
                skipped += 1;
                continue;
            }
        };
        if record.len() != headers.len() {
            debug!(
                "skipping row {}: {} fields, expected {}",
                line + 2,
                record.len(),
                headers.len()
            );
            skipped += 1;
            continue;
        }
        let cells: Vec<String> = record.iter().map(str::to_string).collect();
        if !accept(&headers, &cells) {
            debug!("skipping row {}: rejected by table rules", line + 2);
            skipped += 1;
            continue;
        }
        rows.push(cells);
    }

    Ok(RawGrid { headers, rows, skipped })
}

fn parse_msisdn(raw: &str) -> Option<Msisdn> {
    raw.trim().parse::<Msisdn>().ok()
}

// ── Subscribers ───────────────────────────────────────────────────

/// One subscriber row. `fields` keeps every column in file order,
/// the MSISDN column included.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriberRecord {
    pub msisdn: Msisdn,
    pub fields: Vec<(String, String)>,
}

impl SubscriberRecord {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    /// Profiling attributes: every column except the MSISDN.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .filter(|(name, _)| name != MSISDN_COLUMN)
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

#[derive(Debug, Clone, Default)]
pub struct SubscriberTable {
    pub headers: Vec<String>,
    pub records: Vec<SubscriberRecord>,
    /// Malformed rows dropped while loading.
    pub skipped: usize,
}

impl SubscriberTable {
    pub fn load(path: impl AsRef<Path>, limit: Option<usize>) -> RecResult<Self> {
        let path = path.as_ref();
        let content = read_file_lossy(path)?;
        let table = Self::from_reader(content.as_bytes(), limit)?;
        info!(
            "loaded {} subscribers from {} ({} rows skipped)",
            table.records.len(),
            path.display(),
            table.skipped
        );
        Ok(table)
    }

    pub fn from_reader<R: Read>(reader: R, limit: Option<usize>) -> RecResult<Self> {
        let grid = read_grid(reader, limit, |headers, cells| {
            headers
                .iter()
                .position(|h| h == MSISDN_COLUMN)
                .and_then(|i| cells.get(i))
                .and_then(|raw| parse_msisdn(raw))
                .is_some()
        })?;
        let key_index = grid
            .headers
            .iter()
            .position(|h| h == MSISDN_COLUMN)
            .ok_or_else(|| {
                RecError::InvalidInput(format!("subscriber file has no {MSISDN_COLUMN} column"))
            })?;

        let records = grid
            .rows
            .into_iter()
            .filter_map(|cells| {
                let msisdn = parse_msisdn(&cells[key_index])?;
                let fields = grid.headers.iter().cloned().zip(cells).collect();
                Some(SubscriberRecord { msisdn, fields })
            })
            .collect();

        Ok(Self {
            headers: grid.headers,
            records,
            skipped: grid.skipped,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ── Products ──────────────────────────────────────────────────────

/// One catalogue entry. Typed fields are `None` when the column is absent.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProductRecord {
    pub code:     Option<String>,
    pub name:     Option<String>,
    pub category: Option<String>,
    pub tier:     Option<String>,
    pub price:    Option<String>,
    pub fields:   Vec<(String, String)>,
}

impl ProductRecord {
    fn from_cells(headers: &[String], cells: Vec<String>) -> Self {
        let mut product = ProductRecord::default();
        for (header, value) in headers.iter().zip(cells) {
            let slot = match header.as_str() {
                "ProductCode" | "Code" => Some(&mut product.code),
                "ProductName" | "Name" => Some(&mut product.name),
                "Category" => Some(&mut product.category),
                "Tier" => Some(&mut product.tier),
                "ProductPrice" | "Price" => Some(&mut product.price),
                _ => None,
            };
            if let Some(slot) = slot {
                if slot.is_none() && !value.is_empty() {
                    *slot = Some(value.clone());
                }
            }
            product.fields.push((header.clone(), value));
        }
        product
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProductCatalogue {
    pub headers: Vec<String>,
    pub records: Vec<ProductRecord>,
    pub skipped: usize,
}

impl ProductCatalogue {
    pub fn load(path: impl AsRef<Path>, limit: Option<usize>) -> RecResult<Self> {
        let path = path.as_ref();
        let content = read_file_lossy(path)?;
        let catalogue = Self::from_reader(content.as_bytes(), limit)?;
        info!(
            "loaded {} products from {} ({} rows skipped)",
            catalogue.records.len(),
            path.display(),
            catalogue.skipped
        );
        Ok(catalogue)
    }

    pub fn from_reader<R: Read>(reader: R, limit: Option<usize>) -> RecResult<Self> {
        let grid = read_grid(reader, limit, |_, _| true)?;
        let records = grid
            .rows
            .into_iter()
            .map(|cells| ProductRecord::from_cells(&grid.headers, cells))
            .collect();
        Ok(Self {
            headers: grid.headers,
            records,
            skipped: grid.skipped,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
