use serde::Serialize;
use std::collections::HashSet;

/// One `<option>` of a select field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionEntry {
    pub value: String,
    pub label: String,
    pub disabled: bool,
    pub italic: bool,
}

impl OptionEntry {
    /// Value-less entry such as "All Models" or "Select customer first".
    #[must_use]
    pub fn placeholder(label: impl Into<String>) -> Self {
        Self {
            value: String::new(),
            label: label.into(),
            disabled: false,
            italic: false,
        }
    }

    #[must_use]
    pub fn item(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            label: value.clone(),
            value,
            disabled: false,
            italic: false,
        }
    }

    /// Disabled, italic notice shown when a lookup returned no items.
    #[must_use]
    pub fn empty_notice(label: impl Into<String>) -> Self {
        Self {
            value: String::new(),
            label: label.into(),
            disabled: true,
            italic: true,
        }
    }
}

/// Ordered options of a field. Replaced wholesale, never edited in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OptionSet {
    entries: Vec<OptionEntry>,
}

impl OptionSet {
    #[must_use]
    pub fn placeholder_only(label: impl Into<String>) -> Self {
        Self {
            entries: vec![OptionEntry::placeholder(label)],
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[OptionEntry] {
        &self.entries
    }

    #[must_use]
    pub fn values(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.value.as_str()).collect()
    }

    #[must_use]
    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.label.as_str()).collect()
    }

    /// Whether `value` can be selected (placeholders and notices never match).
    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        !value.is_empty()
            && self
                .entries
                .iter()
                .any(|e| !e.disabled && e.value == value)
    }

    /// The first entry's label, i.e. what a closed select displays by default.
    #[must_use]
    pub fn display_label(&self) -> Option<&str> {
        self.entries.first().map(|e| e.label.as_str())
    }
}

/// Build a field's options from lookup items.
///
/// Non-empty `items` yield the placeholder followed by each distinct item in
/// the given order. Empty `items` yield a single disabled italic entry
/// carrying `empty_message`.
#[must_use]
pub fn populate_options(items: &[String], placeholder: &str, empty_message: &str) -> OptionSet {
    if items.is_empty() {
        return OptionSet {
            entries: vec![OptionEntry::empty_notice(empty_message)],
        };
    }

    let mut seen = HashSet::with_capacity(items.len());
    let mut entries = Vec::with_capacity(items.len() + 1);
    entries.push(OptionEntry::placeholder(placeholder));
    entries.extend(
        items
            .iter()
            .filter(|item| seen.insert(item.as_str()))
            .map(OptionEntry::item),
    );

    if entries.len() <= items.len() {
        tracing::debug!(
            placeholder,
            dropped = items.len() + 1 - entries.len(),
            "Dropped duplicate options"
        );
    }
    OptionSet { entries }
}

/// Lifecycle of a dependent field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldState {
    Disabled,
    Loading,
    Enabled,
}

/// Rendering projection of one dependent select.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldView {
    pub state: FieldState,
    pub options: OptionSet,
}

impl FieldView {
    #[must_use]
    pub fn disabled(label: &str) -> Self {
        Self {
            state: FieldState::Disabled,
            options: OptionSet::placeholder_only(label),
        }
    }

    #[must_use]
    pub fn loading(label: &str) -> Self {
        Self {
            state: FieldState::Loading,
            options: OptionSet::placeholder_only(label),
        }
    }

    #[must_use]
    pub fn enabled(options: OptionSet) -> Self {
        Self {
            state: FieldState::Enabled,
            options,
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.state == FieldState::Enabled
    }
}
