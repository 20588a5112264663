use serde::Serialize;

/// Current customer/model/station choice.
///
/// Empty strings are stored as `None`; a model or station without a
/// customer carries no meaning and is cleared by the synchronizer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub customer: Option<String>,
    pub model: Option<String>,
    pub station: Option<String>,
}

impl Selection {
    #[must_use]
    pub fn new(customer: &str, model: &str, station: &str) -> Self {
        Self {
            customer: non_empty(customer),
            model: non_empty(model),
            station: non_empty(station),
        }
    }

    #[must_use]
    pub fn customer(&self) -> Option<&str> {
        self.customer.as_deref()
    }

    #[must_use]
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    #[must_use]
    pub fn station(&self) -> Option<&str> {
        self.station.as_deref()
    }
}

pub(crate) fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
