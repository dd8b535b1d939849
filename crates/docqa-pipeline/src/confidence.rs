//! Per-source confidence heuristic shown next to each citation.
//!
//! The score only looks at retrieval rank, chunk length and page number; it
//! says nothing about semantic relevance.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConfidenceLevel {
    VeryHigh,
    High,
    Medium,
    Low,
    VeryLow,
}

impl ConfidenceLevel {
    pub fn from_percent(percent: u32) -> Self {
        match percent {
            90.. => Self::VeryHigh,
            75..=89 => Self::High,
            60..=74 => Self::Medium,
            40..=59 => Self::Low,
            _ => Self::VeryLow,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::VeryHigh => "Very High",
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
            Self::VeryLow => "Very Low",
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Confidence {
    pub percent: u32,
    pub level: ConfidenceLevel,
}

/// `rank` starts at 1, `char_len` is in characters, `page` is 1-indexed.
pub fn score(rank: usize, char_len: usize, page: u32) -> Confidence {
    let order = 1.0 - (rank as f64 - 1.0) * 0.15;
    let length = (char_len as f64 / 1000.0).min(1.0);
    let page_factor = (1.0 - (f64::from(page) - 1.0) * 0.05).max(0.8);
    let confidence = (order * length * page_factor).clamp(0.1, 1.0);
    // Truncation, not rounding.
    let percent = (confidence * 100.0) as u32;
    Confidence { percent, level: ConfidenceLevel::from_percent(percent) }
}
