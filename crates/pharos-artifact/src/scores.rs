use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::ArtifactError;
use crate::poller::ArtifactHandle;

/// The four headline report categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
  Performance,
  Accessibility,
  BestPractices,
  Seo,
}

impl Category {
  pub const ALL: [Category; 4] = [
    Category::Performance,
    Category::Accessibility,
    Category::BestPractices,
    Category::Seo,
  ];

  /// Key of the category object in the report.
  pub fn key(&self) -> &'static str {
    match self {
      Category::Performance => "performance",
      Category::Accessibility => "accessibility",
      Category::BestPractices => "best-practices",
      Category::Seo => "seo",
    }
  }

  /// Human-readable column label.
  pub fn label(&self) -> &'static str {
    match self {
      Category::Performance => "Performance",
      Category::Accessibility => "Accessibility",
      Category::BestPractices => "Best Practices",
      Category::Seo => "SEO",
    }
  }
}

/// Category scores as integer percentages in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSet {
  pub performance: u8,
  pub accessibility: u8,
  pub best_practices: u8,
  pub seo: u8,
}

impl ScoreSet {
  pub fn get(&self, category: Category) -> u8 {
    match category {
      Category::Performance => self.performance,
      Category::Accessibility => self.accessibility,
      Category::BestPractices => self.best_practices,
      Category::Seo => self.seo,
    }
  }

  /// Scores in [`Category::ALL`] order.
  pub fn values(&self) -> [u8; 4] {
    Category::ALL.map(|c| self.get(c))
  }
}

/// Read the report behind `handle` and extract its scores.
pub async fn extract_scores(handle: ArtifactHandle) -> Result<ScoreSet, ArtifactError> {
  let path = handle.into_path();
  let content = fs::read_to_string(&path)
    .await
    .map_err(|source| ArtifactError::Read {
      path: path.clone(),
      source,
    })?;

  let report: serde_json::Value =
    serde_json::from_str(&content).map_err(|e| ArtifactError::Malformed {
      path: path.clone(),
      reason: format!("invalid JSON: {}", e),
    })?;

  parse_scores(&report).map_err(|reason| ArtifactError::Malformed { path, reason })
}

/// Extract the four scores from a parsed report.
///
/// Categories are looked up under `categories` when present, as the audit
/// tool writes them, and at the top level otherwise. Every score must be a
/// fraction in `[0, 1]`; it is scaled to a percentage rounding half up.
pub fn parse_scores(report: &serde_json::Value) -> Result<ScoreSet, String> {
  let root = report
    .get("categories")
    .filter(|c| c.is_object())
    .unwrap_or(report);

  let score = |category: Category| -> Result<u8, String> {
    let object = root
      .get(category.key())
      .ok_or_else(|| format!("missing category '{}'", category.key()))?;
    let raw = object
      .get("score")
      .ok_or_else(|| format!("category '{}' has no score", category.key()))?;
    let fraction = raw
      .as_f64()
      .ok_or_else(|| format!("category '{}' has non-numeric score {}", category.key(), raw))?;
    to_percent(fraction)
      .ok_or_else(|| format!("category '{}' score {} outside [0, 1]", category.key(), fraction))
  };

  Ok(ScoreSet {
    performance: score(Category::Performance)?,
    accessibility: score(Category::Accessibility)?,
    best_practices: score(Category::BestPractices)?,
    seo: score(Category::Seo)?,
  })
}

fn to_percent(fraction: f64) -> Option<u8> {
  if !fraction.is_finite() || !(0.0..=1.0).contains(&fraction) {
    return None;
  }
  // f64::round rounds half away from zero, i.e. half up for non-negatives.
  Some((fraction * 100.0).round() as u8)
}
