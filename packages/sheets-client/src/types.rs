//! Sheets v4 `values` request and response types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How input data is interpreted by Sheets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueInputOption {
    /// Stored exactly as given. Strings starting with `=` stay text.
    #[default]
    Raw,
    /// Parsed as if typed into the UI (numbers, dates, formulas).
    UserEntered,
}

impl ValueInputOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueInputOption::Raw => "RAW",
            ValueInputOption::UserEntered => "USER_ENTERED",
        }
    }
}

/// A block of cell values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major_dimension: Option<String>,

    /// Row-major cells. Trailing empty cells and rows are omitted by the API.
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

/// Response of `values.append`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendValuesResponse {
    #[serde(default)]
    pub spreadsheet_id: Option<String>,

    /// The table the rows were appended after
    #[serde(default)]
    pub table_range: Option<String>,

    #[serde(default)]
    pub updates: Option<UpdateValuesResponse>,
}

impl AppendValuesResponse {
    /// Rows the API reports as written (0 when the field is absent).
    pub fn updated_rows(&self) -> usize {
        self.updates
            .as_ref()
            .and_then(|u| u.updated_rows)
            .unwrap_or(0) as usize
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateValuesResponse {
    #[serde(default)]
    pub updated_range: Option<String>,

    #[serde(default)]
    pub updated_rows: Option<u32>,

    #[serde(default)]
    pub updated_columns: Option<u32>,

    #[serde(default)]
    pub updated_cells: Option<u32>,
}
