use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An article record as delivered by the desk and rendered by the reading site.
///
/// Only `id`, `summary`, and the two scores feed the layout. Anything else the
/// caller sends (title, url, source, ...) is carried through `extra` untouched.
/// `cols`, `rows`, and `awards` are filled in by the optimizer; a record that
/// arrives with both `cols` and `rows` set is treated as pre-baked.
/// Both must be whole numbers; `validate_request` checks they fit the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zero_echo_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cols: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<u16>,
    #[serde(default)]
    pub awards: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Article {
    #[cfg(test)]
    pub fn new(id: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            summary: summary.into(),
            impact_score: None,
            zero_echo_score: None,
            cols: None,
            rows: None,
            awards: Vec::new(),
            extra: Map::new(),
        }
    }

    #[cfg(test)]
    pub fn with_scores(mut self, impact: f64, zero_echo: f64) -> Self {
        self.impact_score = Some(impact);
        self.zero_echo_score = Some(zero_echo);
        self
    }

    /// Impact score, missing treated as 0.
    pub fn impact(&self) -> f64 {
        self.impact_score.unwrap_or(0.0)
    }

    /// Zero-echo score, missing treated as 0.
    pub fn zero_echo(&self) -> f64 {
        self.zero_echo_score.unwrap_or(0.0)
    }

    /// `10 - zero_echo + impact`: the headline ranking key.
    pub fn combined_score(&self) -> f64 {
        10.0 - self.zero_echo() + self.impact()
    }

    /// Summary length in UTF-16 code units, which is what the renderer measures.
    pub fn summary_len(&self) -> usize {
        self.summary.encode_utf16().count()
    }

    /// True when the record already carries a footprint from an earlier layout.
    pub fn is_prebaked(&self) -> bool {
        self.cols.is_some() && self.rows.is_some()
    }
}
