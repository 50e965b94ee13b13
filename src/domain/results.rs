use serde::{Deserialize, Serialize};

/// Every ROM name seen during a refresh, in post then heading order.
/// Duplicates are kept.
pub type GamesIndex = Vec<String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRow {
    pub player_name: String,
    pub score: u64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub input_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub screenshot_url: Option<String>,
    /// Passthrough cells, aligned with [`ResultTable::extra_columns`].
    #[serde(default)]
    pub extra: Vec<String>,
}

/// Results of one ROM within a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultTable {
    pub rom: String,
    #[serde(default)]
    pub extra_columns: Vec<String>,
    pub rows: Vec<ResultRow>,
}

impl ResultTable {
    pub fn new(rom: impl Into<String>, extra_columns: Vec<String>) -> Self {
        Self {
            rom: rom.into(),
            extra_columns,
            rows: Vec::new(),
        }
    }
}
