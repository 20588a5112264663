use chrono::NaiveDate;
use serde::Serialize;

use super::selection::{Selection, non_empty};

/// ISO-8601 calendar date used by `start_date` / `end_date`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Active date range of the dashboard page.
///
/// Carried through untouched: it is forwarded to every lookup request and
/// appended to the submit URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct DateFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl DateFilter {
    #[must_use]
    pub fn new(start_date: Option<NaiveDate>, end_date: Option<NaiveDate>) -> Self {
        Self {
            start_date,
            end_date,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start_date.is_none() && self.end_date.is_none()
    }

    /// Query pairs for the set bounds, `start_date` first.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(2);
        if let Some(start) = self.start_date {
            pairs.push(("start_date", start.format(DATE_FORMAT).to_string()));
        }
        if let Some(end) = self.end_date {
            pairs.push(("end_date", end.format(DATE_FORMAT).to_string()));
        }
        pairs
    }
}

/// Filter state recovered from a dashboard URL such as
/// `/?customer=Acme&model=X1&start_date=2024-03-01&end_date=2024-03-31`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageQuery {
    pub selection: Selection,
    pub filter: DateFilter,
}

impl PageQuery {
    /// Parse a full or relative URL. Only the query component is read.
    #[must_use]
    pub fn from_url(url: &str) -> Self {
        let without_fragment = url.split_once('#').map_or(url, |(head, _)| head);
        match without_fragment.split_once('?') {
            Some((_, query)) => Self::parse(query),
            None => Self::default(),
        }
    }

    /// Parse a raw query string (without the leading `?`).
    ///
    /// The first occurrence of a key wins. Empty values count as absent and
    /// dates that are not `YYYY-MM-DD` are dropped.
    #[must_use]
    pub fn parse(query: &str) -> Self {
        let mut customer = None;
        let mut model = None;
        let mut station = None;
        let mut start_date = None;
        let mut end_date = None;

        for pair in query.trim_start_matches('?').split('&') {
            if pair.is_empty() {
                continue;
            }
            let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
            let (Some(key), Some(value)) = (decode_component(raw_key), decode_component(raw_value))
            else {
                continue;
            };

            let slot = match key.as_str() {
                "customer" => &mut customer,
                "model" => &mut model,
                "station" => &mut station,
                "start_date" => &mut start_date,
                "end_date" => &mut end_date,
                _ => {
                    tracing::trace!(key = %key, "Ignoring unknown query parameter");
                    continue;
                }
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }

        Self {
            selection: Selection {
                customer: customer.as_deref().and_then(non_empty),
                model: model.as_deref().and_then(non_empty),
                station: station.as_deref().and_then(non_empty),
            },
            filter: DateFilter {
                start_date: start_date.as_deref().and_then(|v| parse_date("start_date", v)),
                end_date: end_date.as_deref().and_then(|v| parse_date("end_date", v)),
            },
        }
    }
}

/// Form-urlencoded decoding: `+` is a space, then percent-escapes.
fn decode_component(raw: &str) -> Option<String> {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => Some(decoded.into_owned()),
        Err(e) => {
            tracing::warn!(raw = %raw, error = %e, "Dropping undecodable query component");
            None
        }
    }
}

fn parse_date(key: &str, value: &str) -> Option<NaiveDate> {
    if value.is_empty() {
        return None;
    }
    match NaiveDate::parse_from_str(value, DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(e) => {
            tracing::warn!(key, value, error = %e, "Ignoring malformed date filter");
            None
        }
    }
}
