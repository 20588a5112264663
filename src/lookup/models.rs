use serde::{Deserialize, Serialize};

use crate::filters::DateFilter;

/// Parameters of one lookup: a customer, optionally narrowed to a model,
/// plus the page's date range.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LookupQuery {
    pub customer: String,
    pub model: Option<String>,
    pub filter: DateFilter,
}

impl LookupQuery {
    #[must_use]
    pub fn new(customer: impl Into<String>, model: Option<String>, filter: DateFilter) -> Self {
        Self {
            customer: customer.into(),
            model,
            filter,
        }
    }

    /// Query-string pairs in wire order.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("customer", self.customer.clone())];
        if let Some(model) = &self.model {
            pairs.push(("model", model.clone()));
        }
        pairs.extend(self.filter.query_pairs());
        pairs
    }
}

/// Response body of `GET /api/get-models-stations`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupResult {
    pub models: Vec<String>,
    pub stations: Vec<String>,
    #[serde(default)]
    pub count: Option<LookupCounts>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupCounts {
    pub models: u32,
    pub stations: u32,
}

impl LookupResult {
    #[must_use]
    pub fn new(models: Vec<String>, stations: Vec<String>) -> Self {
        let count = LookupCounts {
            models: u32::try_from(models.len()).unwrap_or(u32::MAX),
            stations: u32::try_from(stations.len()).unwrap_or(u32::MAX),
        };
        Self {
            models,
            stations,
            count: Some(count),
        }
    }

    /// Counts reported by the server, or the list lengths when it sent none.
    #[must_use]
    pub fn counts(&self) -> LookupCounts {
        self.count.unwrap_or_else(|| LookupCounts {
            models: u32::try_from(self.models.len()).unwrap_or(u32::MAX),
            stations: u32::try_from(self.stations.len()).unwrap_or(u32::MAX),
        })
    }
}
