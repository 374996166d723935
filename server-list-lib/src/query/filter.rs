//! Per-column filter kinds and their stored values.
//!
//! Each [`FilterConfig`] kind drives three concerns, each handled by one
//! dispatch: the control to show ([`FilterConfig::control`]), how control
//! input becomes a stored value ([`FilterConfig::apply`]), and how a request
//! parameter is read back ([`FilterConfig::parse_param`]). Writing values out
//! as parameters lives on [`FilterValue::write_params`].

use serde::Deserialize;
use serde::Serialize;

use crate::error::FilterError;

/// A date range filter value, both ends as `YYYY-MM-DD` strings.
///
/// Either end may be empty; only non-empty ends are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RangeDate {
    /// Lower bound.
    pub from: String,
    /// Upper bound.
    pub to: String,
}

impl RangeDate {
    /// Creates a range.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Returns `true` if neither end is set.
    pub fn is_empty(&self) -> bool {
        self.from.is_empty() && self.to.is_empty()
    }
}

/// A stored filter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Boolean flag.
    Bool(bool),
    /// Numeric value.
    Number(f64),
    /// Free text, a date, or a select choice.
    Text(String),
    /// Date range.
    Range(RangeDate),
}

impl FilterValue {
    /// Returns `true` if this value would not be sent at all.
    pub fn is_empty(&self) -> bool {
        match self {
            FilterValue::Text(s) => s.is_empty(),
            FilterValue::Range(r) => r.is_empty(),
            FilterValue::Bool(_) | FilterValue::Number(_) => false,
        }
    }

    /// Textual form used in request parameters and control values.
    ///
    /// Ranges have no single textual form and yield an empty string.
    pub fn as_param(&self) -> String {
        match self {
            FilterValue::Bool(b) => b.to_string(),
            FilterValue::Number(n) => n.to_string(),
            FilterValue::Text(s) => s.clone(),
            FilterValue::Range(_) => String::new(),
        }
    }

    /// Appends this value as `filters[key]`, or as `filters[key][from]` /
    /// `filters[key][to]` for ranges. Empty values and empty range ends are
    /// skipped.
    pub fn write_params(&self, key: &str, params: &mut Vec<(String, String)>) {
        match self {
            FilterValue::Range(range) => {
                if !range.from.is_empty() {
                    params.push((format!("filters[{key}][from]"), range.from.clone()));
                }
                if !range.to.is_empty() {
                    params.push((format!("filters[{key}][to]"), range.to.clone()));
                }
            }
            scalar if !scalar.is_empty() => {
                params.push((format!("filters[{key}]"), scalar.as_param()));
            }
            _ => {}
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        FilterValue::Number(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Number(value as f64)
    }
}

impl From<i32> for FilterValue {
    fn from(value: i32) -> Self {
        FilterValue::Number(value.into())
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Bool(value)
    }
}

impl From<RangeDate> for FilterValue {
    fn from(value: RangeDate) -> Self {
        FilterValue::Range(value)
    }
}

/// A choice of a select filter.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectOption {
    /// Text shown in the picker.
    pub label: String,
    /// Value stored when chosen (text, number or boolean).
    pub value: FilterValue,
}

impl SelectOption {
    /// Creates an option.
    pub fn new(label: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Filter kind declared by a column.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterConfig {
    /// Free-text input.
    Text {
        /// Input placeholder; defaults to `Filtrar…`.
        placeholder: Option<String>,
    },
    /// Numeric input.
    Number {
        /// Input placeholder; defaults to `0`.
        placeholder: Option<String>,
    },
    /// Single date as `YYYY-MM-DD`.
    Date,
    /// Date range with independent ends.
    RangeDate,
    /// Tri-state: all / yes / no.
    Boolean,
    /// Fixed choices.
    Select {
        /// Available choices.
        options: Vec<SelectOption>,
        /// Label of the "no choice" entry; without one the picker has none.
        placeholder: Option<String>,
    },
}

/// An edit coming from a filter control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterEdit {
    /// New raw value of a single-value control (text box or picker).
    Input(String),
    /// New lower bound of a range control.
    From(String),
    /// New upper bound of a range control.
    To(String),
}

/// An entry of a picker control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerOption {
    /// Shown text.
    pub label: String,
    /// Raw value fed back through [`FilterEdit::Input`].
    pub value: String,
}

impl PickerOption {
    fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// The control a filter renders as, with its current value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterControl {
    /// Single-line input.
    TextInput {
        /// Placeholder text.
        placeholder: String,
        /// Current text.
        value: String,
        /// Whether a numeric keyboard should be used.
        numeric: bool,
    },
    /// Two side-by-side date inputs.
    RangeInputs {
        /// Current lower bound.
        from: String,
        /// Current upper bound.
        to: String,
        /// Placeholder of the lower bound.
        from_placeholder: String,
        /// Placeholder of the upper bound.
        to_placeholder: String,
    },
    /// Drop-down of fixed choices.
    Picker {
        /// Entries in display order.
        options: Vec<PickerOption>,
        /// Raw value of the chosen entry (`""` for none).
        selected: String,
    },
}

impl FilterConfig {
    /// Text filter without a custom placeholder.
    pub fn text() -> Self {
        FilterConfig::Text { placeholder: None }
    }

    /// Number filter without a custom placeholder.
    pub fn number() -> Self {
        FilterConfig::Number { placeholder: None }
    }

    /// Select filter over `options`.
    pub fn select(options: impl IntoIterator<Item = SelectOption>) -> Self {
        FilterConfig::Select {
            options: options.into_iter().collect(),
            placeholder: None,
        }
    }

    /// Short name of the kind.
    pub fn kind(&self) -> &'static str {
        match self {
            FilterConfig::Text { .. } => "text",
            FilterConfig::Number { .. } => "number",
            FilterConfig::Date => "date",
            FilterConfig::RangeDate => "range-date",
            FilterConfig::Boolean => "boolean",
            FilterConfig::Select { .. } => "select",
        }
    }

    /// The control for this filter showing `current`.
    pub fn control(&self, current: Option<&FilterValue>) -> FilterControl {
        let scalar = || match current {
            Some(FilterValue::Range(_)) | None => String::new(),
            Some(value) => value.as_param(),
        };
        match self {
            FilterConfig::Text { placeholder } => FilterControl::TextInput {
                placeholder: placeholder.clone().unwrap_or_else(|| "Filtrar…".to_string()),
                value: scalar(),
                numeric: false,
            },
            FilterConfig::Number { placeholder } => FilterControl::TextInput {
                placeholder: placeholder.clone().unwrap_or_else(|| "0".to_string()),
                value: scalar(),
                numeric: true,
            },
            FilterConfig::Date => FilterControl::TextInput {
                placeholder: "YYYY-MM-DD".to_string(),
                value: scalar(),
                numeric: false,
            },
            FilterConfig::RangeDate => {
                let range = match current {
                    Some(FilterValue::Range(range)) => range.clone(),
                    _ => RangeDate::default(),
                };
                FilterControl::RangeInputs {
                    from: range.from,
                    to: range.to,
                    from_placeholder: "Desde (YYYY-MM-DD)".to_string(),
                    to_placeholder: "Hasta (YYYY-MM-DD)".to_string(),
                }
            }
            FilterConfig::Boolean => FilterControl::Picker {
                options: vec![
                    PickerOption::new("Todos", ""),
                    PickerOption::new("Sí", "true"),
                    PickerOption::new("No", "false"),
                ],
                selected: scalar(),
            },
            FilterConfig::Select {
                options,
                placeholder,
            } => {
                let mut entries = Vec::with_capacity(options.len() + 1);
                if let Some(placeholder) = placeholder.as_ref().filter(|p| !p.is_empty()) {
                    entries.push(PickerOption::new(placeholder.clone(), ""));
                }
                entries.extend(
                    options
                        .iter()
                        .map(|o| PickerOption::new(o.label.clone(), o.value.as_param())),
                );
                FilterControl::Picker {
                    options: entries,
                    selected: scalar(),
                }
            }
        }
    }

    /// Turns a control edit into the value to store, given the stored
    /// `current` value. `Ok(None)` clears the filter.
    ///
    /// Range edits change one end and keep the other.
    ///
    /// # Errors
    ///
    /// [`FilterError::InvalidNumber`] if a number filter gets non-numeric
    /// input, [`FilterError::MismatchedEdit`] if the edit does not fit the
    /// kind.
    pub fn apply(
        &self,
        current: Option<&FilterValue>,
        edit: FilterEdit,
    ) -> Result<Option<FilterValue>, FilterError> {
        match (self, edit) {
            (FilterConfig::RangeDate, FilterEdit::From(from)) => {
                Ok(edit_range(current, |range| range.from = from))
            }
            (FilterConfig::RangeDate, FilterEdit::To(to)) => {
                Ok(edit_range(current, |range| range.to = to))
            }
            (FilterConfig::RangeDate, FilterEdit::Input(_))
            | (_, FilterEdit::From(_) | FilterEdit::To(_)) => Err(FilterError::MismatchedEdit {
                kind: self.kind(),
            }),
            (_, FilterEdit::Input(raw)) if raw.is_empty() => Ok(None),
            (FilterConfig::Number { .. }, FilterEdit::Input(raw)) => match parse_finite(&raw) {
                Some(n) => Ok(Some(FilterValue::Number(n))),
                None => Err(FilterError::InvalidNumber(raw)),
            },
            (_, FilterEdit::Input(raw)) => Ok(self.parse_param(&raw)),
        }
    }

    /// Reads a `filters[key]` parameter back into a stored value.
    ///
    /// Range ends arrive as separate parameters and are assembled by the
    /// caller; for a range filter this reads `raw` as the lower bound.
    pub fn parse_param(&self, raw: &str) -> Option<FilterValue> {
        if raw.is_empty() {
            return None;
        }
        let value = match self {
            FilterConfig::Text { .. } | FilterConfig::Date => FilterValue::Text(raw.to_string()),
            FilterConfig::Number { .. } => parse_finite(raw)
                .map(FilterValue::Number)
                .unwrap_or_else(|| FilterValue::Text(raw.to_string())),
            FilterConfig::Boolean => FilterValue::Bool(raw == "true"),
            FilterConfig::Select { options, .. } => options
                .iter()
                .find(|o| o.value.as_param() == raw)
                .map(|o| o.value.clone())
                .unwrap_or_else(|| FilterValue::Text(raw.to_string())),
            FilterConfig::RangeDate => FilterValue::Range(RangeDate::new(raw, "")),
        };
        Some(value)
    }
}

/// Parses a number, refusing `NaN` and infinities: a stored value must equal
/// itself for query comparison to hold.
fn parse_finite(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Changes one end of the stored range (or of an empty one). A range with
/// both ends empty is cleared.
fn edit_range(current: Option<&FilterValue>, edit: impl FnOnce(&mut RangeDate)) -> Option<FilterValue> {
    let mut range = match current {
        Some(FilterValue::Range(range)) => range.clone(),
        _ => RangeDate::default(),
    };
    edit(&mut range);
    (!range.is_empty()).then_some(FilterValue::Range(range))
}
