//! Markdown backlog parser.
//!
//! A backlog document carries its machine-readable feature list in one of
//! two fenced export blocks ("JSON Export" preferred, "CSV Export" as the
//! fallback) and its priority tiers as bulleted subsections. This module
//! extracts both without interpreting them: classification happens later,
//! against the raw bullet text.

use serde::Deserialize;
use thiserror::Error;

use crate::models::{FeatureRecord, TierBullets, TierSet};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("no features found in JSON or CSV export blocks")]
    NoFeaturesFound,
}

/// Parse a backlog document into feature records and per-tier bullet text.
///
/// The JSON export block wins when present and well-formed; otherwise the
/// CSV block is consulted. Neither yielding a record is fatal — a backlog
/// without features has nothing to reconcile and an empty default would
/// mask an authoring mistake.
pub fn parse(markdown: &str, tiers: &TierSet) -> Result<(Vec<FeatureRecord>, TierBullets), ParseError> {
    let lines: Vec<&str> = markdown.lines().collect();

    let mut features = fenced_block_under(&lines, "JSON Export")
        .and_then(|block| parse_json_block(&block))
        .unwrap_or_default();

    if features.is_empty() {
        if let Some(block) = fenced_block_under(&lines, "CSV Export") {
            features = parse_csv_block(&block);
        }
    }

    if features.is_empty() {
        return Err(ParseError::NoFeaturesFound);
    }

    let mut bullets = TierBullets::default();
    for tier in tiers.tiers() {
        bullets.insert(&tier.title, tier_bullets(&lines, &tier.heading));
    }

    Ok((features, bullets))
}

/// Split a heading line into (level, text). Returns `None` for non-headings.
fn heading(line: &str) -> Option<(usize, &str)> {
    let trimmed = line.trim_start();
    let level = trimmed.bytes().take_while(|&b| b == b'#').count();
    if level == 0 {
        return None;
    }
    let rest = &trimmed[level..];
    if rest.is_empty() || rest.starts_with(' ') {
        Some((level, rest.trim()))
    } else {
        None
    }
}

/// Content of the first fenced code block following the named heading.
///
/// Gives up at the next heading: an export heading with no block directly
/// under it yields nothing rather than stealing a block from elsewhere.
fn fenced_block_under(lines: &[&str], title: &str) -> Option<String> {
    let start = lines
        .iter()
        .position(|line| matches!(heading(line), Some((_, text)) if text.eq_ignore_ascii_case(title)))?;

    let mut block = Vec::new();
    let mut in_fence = false;
    for line in &lines[start + 1..] {
        if line.trim_start().starts_with("```") {
            if in_fence {
                return Some(block.join("\n"));
            }
            in_fence = true;
            continue;
        }
        if in_fence {
            block.push(*line);
        } else if heading(line).is_some() {
            return None;
        }
    }
    None
}

#[derive(Debug, Deserialize)]
struct ExportRow {
    category: String,
    feature: String,
}

/// A JSON array of `{category, feature}` objects, array order preserved.
/// Malformed JSON is not fatal here; the caller falls through to CSV.
fn parse_json_block(block: &str) -> Option<Vec<FeatureRecord>> {
    let rows: Vec<ExportRow> = serde_json::from_str(block).ok()?;
    Some(
        rows.into_iter()
            .map(|row| FeatureRecord {
                category: row.category,
                feature: row.feature,
            })
            .collect(),
    )
}

/// Header line is skipped; each remaining line splits on the first comma
/// only (feature text may itself contain commas). Lines without a comma
/// are dropped.
fn parse_csv_block(block: &str) -> Vec<FeatureRecord> {
    block
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .skip(1)
        .filter_map(|line| {
            let (category, feature) = line.split_once(',')?;
            Some(FeatureRecord {
                category: category.trim().to_string(),
                feature: feature.trim().to_string(),
            })
        })
        .collect()
}

/// Case-insensitive comparison form that also erases hyphen variants, so
/// "Low-Lift", "Low‑Lift" (non-breaking hyphen), "Low–Lift" (en-dash), and
/// "LowLift" all compare equal.
fn normalize_heading(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '-' | '\u{2011}' | '\u{2013}' | '\u{2014}'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Top-level bullet lines under the tier heading, verbatim and trimmed.
///
/// The section runs from the matched heading to the next heading of the
/// same or higher level, or end of document. A missing section yields an
/// empty list. Nested bullet content is left alone.
fn tier_bullets(lines: &[&str], heading_text: &str) -> Vec<String> {
    let wanted = normalize_heading(heading_text);
    let Some((start, level)) = lines.iter().enumerate().find_map(|(i, line)| {
        let (level, text) = heading(line)?;
        normalize_heading(text).starts_with(&wanted).then_some((i, level))
    }) else {
        return Vec::new();
    };

    let mut bullets = Vec::new();
    for line in &lines[start + 1..] {
        if matches!(heading(line), Some((l, _)) if l <= level) {
            break;
        }
        if let Some(rest) = line.strip_prefix('-') {
            if rest.starts_with(char::is_whitespace) {
                bullets.push(rest.trim().to_string());
            }
        }
    }
    bullets
}
