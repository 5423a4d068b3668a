//! Report field lists

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, IndexSheetError, Result};

/// Fields exported when none are configured.
pub const DEFAULT_REPORT_FIELDS: [&str; 5] = ["host", "url", "type", "contentLength", "title"];

/// Ordered list of unique, non-blank field names.
///
/// The position of a field is its column in the sheet, so the order given by
/// the operator is preserved everywhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct FieldList(Vec<String>);

impl FieldList {
    /// Build a field list, rejecting empty lists, blank names and duplicates
    pub fn new<I, S>(fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = fields
            .into_iter()
            .map(|f| f.into().trim().to_string())
            .collect();

        if fields.is_empty() {
            let err = ConfigError::InvalidFields("at least one field is required".into());
            return Err(err.into());
        }

        let mut seen = HashSet::with_capacity(fields.len());
        for (pos, field) in fields.iter().enumerate() {
            if field.is_empty() {
                return Err(ConfigError::InvalidFields(format!(
                    "field #{} is empty",
                    pos + 1
                ))
                .into());
            }
            if !seen.insert(field.as_str()) {
                return Err(
                    ConfigError::InvalidFields(format!("field '{field}' is listed twice")).into(),
                );
            }
        }

        Ok(Self(fields))
    }

    /// Parse a comma separated list such as `host,url,title`
    pub fn parse(list: &str) -> Result<Self> {
        Self::new(list.split(','))
    }

    /// Number of fields (and data columns)
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl Default for FieldList {
    fn default() -> Self {
        Self(
            DEFAULT_REPORT_FIELDS
                .iter()
                .map(|f| f.to_string())
                .collect(),
        )
    }
}

impl FromStr for FieldList {
    type Err = IndexSheetError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<Vec<String>> for FieldList {
    type Error = IndexSheetError;

    fn try_from(fields: Vec<String>) -> Result<Self> {
        Self::new(fields)
    }
}

impl From<FieldList> for Vec<String> {
    fn from(fields: FieldList) -> Self {
        fields.0
    }
}

impl<'a> IntoIterator for &'a FieldList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for FieldList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(","))
    }
}
