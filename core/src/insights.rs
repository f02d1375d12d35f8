//! Bullet-point insights from the commentary part of a model response.
//!
//! Each bullet is classified by keyword into Upsell, CrossSell or Other.
//! Output is a stable three-way partition: every Upsell entry first,
//! then CrossSell, then Other, each group in source order.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InsightKind {
    Upsell,
    CrossSell,
    Other,
}

impl InsightKind {
    /// Label used in exports and the runner's tables.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Upsell => "Upsell",
            Self::CrossSell => "Cross-sell",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for InsightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightEntry {
    pub kind: InsightKind,
    pub text: String,
}

fn bullet_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*([-*•])(.*)$").expect("valid bullet regex"))
}

fn upsell_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)upsell|upgrade|higher|premium").expect("valid upsell regex"))
}

fn cross_sell_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)cross[^a-z]?sell|additional|complement|bundle")
            .expect("valid cross-sell regex")
    })
}

/// Body of a bullet line, or `None` when the line is not a bullet.
/// A `-` or `*` marker directly followed by the same marker (`**bold**`,
/// `---`) is not a bullet.
fn bullet_body(line: &str) -> Option<&str> {
    let caps = bullet_re().captures(line)?;
    let marker = caps.get(1)?.as_str();
    let rest = caps.get(2)?.as_str();
    if marker != "•" && rest.starts_with(marker) {
        return None;
    }
    Some(rest.trim_start())
}

/// Extract bullet items. A bullet runs until the next bullet line, a blank
/// line, or the end of input; continuation lines are joined with a space.
pub fn extract_bullets(text: &str) -> Vec<String> {
    let mut bullets = Vec::new();
    let mut current: Option<String> = None;

    for line in text.lines() {
        if let Some(body) = bullet_body(line) {
            bullets.extend(current.take());
            current = Some(body.trim().to_string());
        } else if line.trim().is_empty() {
            bullets.extend(current.take());
        } else if let Some(body) = current.as_mut() {
            if !body.is_empty() {
                body.push(' ');
            }
            body.push_str(line.trim());
        }
    }
    bullets.extend(current.take());

    bullets.retain(|b| !b.is_empty());
    bullets
}

/// Upsell keywords win over cross-sell keywords.
pub fn classify(text: &str) -> InsightKind {
    if upsell_re().is_match(text) {
        InsightKind::Upsell
    } else if cross_sell_re().is_match(text) {
        InsightKind::CrossSell
    } else {
        InsightKind::Other
    }
}

/// Classify and partition the bullets of `commentary`.
pub fn categorize(commentary: &str) -> Vec<InsightEntry> {
    let mut upsell = Vec::new();
    let mut cross_sell = Vec::new();
    let mut other = Vec::new();

    for text in extract_bullets(commentary) {
        let kind = classify(&text);
        let entry = InsightEntry { kind, text };
        match kind {
            InsightKind::Upsell => upsell.push(entry),
            InsightKind::CrossSell => cross_sell.push(entry),
            InsightKind::Other => other.push(entry),
        }
    }

    upsell.extend(cross_sell);
    upsell.extend(other);
    upsell
}

/// Display form of commentary: `*` bullets become `•`, nested ones indented.
pub fn format_commentary(text: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"^(\s*)\*\s+(.*)$").expect("valid star bullet regex"));

    text.trim()
        .lines()
        .map(|line| match re.captures(line) {
            Some(c) => {
                let body = c.get(2).map_or("", |m| m.as_str());
                if c.get(1).map_or(true, |m| m.as_str().is_empty()) {
                    format!("• {body}")
                } else {
                    format!("    • {body}")
                }
            }
            None => line.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
