// @awa-component: RVW-ReviewQuery
//
//! Review list options.
//!
//! A [`ReviewQuery`] is turned into two things: the outgoing query-string
//! pairs and a canonical JSON fragment used in the cache key. The fragment
//! only contains set fields, with keys in sorted order, so two queries with
//! the same values always map to the same cache entry.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ClientError;

/// Field the server sorts reviews by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    Date,
    Rating,
    Helpful,
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::Date => "date",
            SortBy::Rating => "rating",
            SortBy::Helpful => "helpful",
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortBy {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date" => Ok(SortBy::Date),
            "rating" => Ok(SortBy::Rating),
            "helpful" => Ok(SortBy::Helpful),
            other => Err(ClientError::InvalidOption(format!(
                "unknown sortBy '{other}' (expected date, rating or helpful)"
            ))),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(ClientError::InvalidOption(format!(
                "unknown sortOrder '{other}' (expected asc or desc)"
            ))),
        }
    }
}

/// Options for listing reviews. Unset fields are not sent.
///
/// `limit` is advisory to the server; the client never truncates or
/// re-sorts what comes back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortBy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
}

impl ReviewQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn sort_by(mut self, sort_by: SortBy) -> Self {
        self.sort_by = Some(sort_by);
        self
    }

    pub fn sort_order(mut self, sort_order: SortOrder) -> Self {
        self.sort_order = Some(sort_order);
        self
    }

    /// Query-string pairs for the set fields, in a fixed order.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(4);
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset", offset.to_string()));
        }
        if let Some(sort_by) = self.sort_by {
            pairs.push(("sortBy", sort_by.as_str().to_string()));
        }
        if let Some(sort_order) = self.sort_order {
            pairs.push(("sortOrder", sort_order.as_str().to_string()));
        }
        pairs
    }

    /// Canonical JSON encoding used in the review cache key.
    ///
    /// Set fields only, keys in lexicographic order; `{}` when nothing is
    /// set. Keys are fixed ASCII names, so only the values need JSON encoding.
    pub fn cache_fragment(&self) -> String {
        let mut fields: BTreeMap<&'static str, Value> = BTreeMap::new();
        if let Some(limit) = self.limit {
            fields.insert("limit", Value::from(limit));
        }
        if let Some(offset) = self.offset {
            fields.insert("offset", Value::from(offset));
        }
        if let Some(sort_by) = self.sort_by {
            fields.insert("sortBy", Value::from(sort_by.as_str()));
        }
        if let Some(sort_order) = self.sort_order {
            fields.insert("sortOrder", Value::from(sort_order.as_str()));
        }
        let body = fields
            .iter()
            .map(|(name, value)| format!("\"{name}\":{value}"))
            .collect::<Vec<_>>()
            .join(",");
        format!("{{{body}}}")
    }
}
