//! Column definitions.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;

use crate::error::ConfigError;
use crate::query::FilterConfig;

/// Horizontal alignment for default cell text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Requested width of a column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnWidth {
    /// Fixed width in logical pixels.
    Px(f64),
    /// Fraction of the viewport width, written as a percentage (`30.0` = 30%).
    Percent(f64),
}

impl FromStr for ColumnWidth {
    type Err = ConfigError;

    /// Parses `"120"` as pixels and `"30%"` as a percentage.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || ConfigError::InvalidWidth(s.to_string());
        match trimmed.strip_suffix('%') {
            Some(pct) => pct
                .trim()
                .parse::<f64>()
                .map(ColumnWidth::Percent)
                .map_err(|_| invalid()),
            None => trimmed
                .parse::<f64>()
                .map(ColumnWidth::Px)
                .map_err(|_| invalid()),
        }
    }
}

/// Produces the text of a cell from its row.
pub type CellRenderer<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;

/// A column of the list.
///
/// `key` identifies the column, names the sort field, names the filter and
/// locates the raw value for the default cell text. Keys must be unique
/// within a column set.
///
/// # Example
///
/// ```ignore
/// let columns = vec![
///     Column::new("id", "ID").sortable().width(ColumnWidth::Px(80.0)),
///     Column::new("name", "Nombre").sortable().filter(FilterConfig::text()),
///     Column::new("active", "Activo")
///         .filter(FilterConfig::Boolean)
///         .render(|u: &User| if u.active { "Sí".into() } else { "No".into() }),
/// ];
/// ```
pub struct Column<T> {
    /// Field key.
    pub key: String,
    /// Header text.
    pub header: String,
    /// Whether the header/chip requests a sort.
    pub sortable: bool,
    /// Requested width; `None` uses the minimum column width.
    pub width: Option<ColumnWidth>,
    /// Custom cell renderer; `None` stringifies the raw field value.
    pub render: Option<CellRenderer<T>>,
    /// Filter control shown in the filter panel.
    pub filter: Option<FilterConfig>,
    /// Alignment of default cell text.
    pub align: Alignment,
}

impl<T> Column<T> {
    /// Create a column with a key and header text.
    pub fn new(key: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            header: header.into(),
            sortable: false,
            width: None,
            render: None,
            filter: None,
            align: Alignment::Left,
        }
    }

    /// Make the column sortable.
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Set the requested width.
    pub fn width(mut self, width: ColumnWidth) -> Self {
        self.width = Some(width);
        self
    }

    /// Set a custom cell renderer.
    ///
    /// Called while the owning list's state is locked; it must not call back
    /// into the list.
    pub fn render(mut self, render: impl Fn(&T) -> String + Send + Sync + 'static) -> Self {
        self.render = Some(Arc::new(render));
        self
    }

    /// Attach a filter control.
    pub fn filter(mut self, filter: FilterConfig) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Set the alignment.
    pub fn align(mut self, align: Alignment) -> Self {
        self.align = align;
        self
    }
}

impl<T: Serialize> Column<T> {
    /// Text for this column's cell in `row`.
    ///
    /// Uses the custom renderer if one is set. Otherwise looks up `key` in the
    /// row's serialized form: strings as-is, other scalars in their JSON form,
    /// missing or `null` as an empty string.
    pub fn cell_text(&self, row: &T) -> String {
        if let Some(render) = &self.render {
            return render(row);
        }
        match serde_json::to_value(row) {
            Ok(serde_json::Value::Object(map)) => match map.get(&self.key) {
                None | Some(serde_json::Value::Null) => String::new(),
                Some(serde_json::Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
            },
            _ => String::new(),
        }
    }
}

impl<T> Clone for Column<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            header: self.header.clone(),
            sortable: self.sortable,
            width: self.width,
            render: self.render.clone(),
            filter: self.filter.clone(),
            align: self.align,
        }
    }
}

impl<T> fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("header", &self.header)
            .field("sortable", &self.sortable)
            .field("width", &self.width)
            .field("render", &self.render.is_some())
            .field("filter", &self.filter)
            .field("align", &self.align)
            .finish()
    }
}

/// Rejects column sets with repeated keys.
pub fn validate_columns<T>(columns: &[Column<T>]) -> Result<(), ConfigError> {
    let mut seen = std::collections::HashSet::new();
    for column in columns {
        if !seen.insert(column.key.as_str()) {
            return Err(ConfigError::DuplicateColumn(column.key.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_width() {
        assert_eq!("120".parse::<ColumnWidth>().unwrap(), ColumnWidth::Px(120.0));
        assert_eq!("30%".parse::<ColumnWidth>().unwrap(), ColumnWidth::Percent(30.0));
        assert!("wide".parse::<ColumnWidth>().is_err());
    }

    #[test]
    fn test_default_cell_text() {
        let row = json!({"id": 3, "name": "Ana", "active": true, "note": null});
        let text = |key: &str| Column::<serde_json::Value>::new(key, key).cell_text(&row);
        assert_eq!(text("id"), "3");
        assert_eq!(text("name"), "Ana");
        assert_eq!(text("active"), "true");
        assert_eq!(text("note"), "");
        assert_eq!(text("missing"), "");
    }

    #[test]
    fn test_custom_renderer_wins() {
        let column = Column::new("name", "Nombre")
            .render(|row: &serde_json::Value| format!("<{}>", row["name"].as_str().unwrap_or("")));
        assert_eq!(column.cell_text(&json!({"name": "Ana"})), "<Ana>");
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let columns = vec![
            Column::<serde_json::Value>::new("id", "ID"),
            Column::new("id", "Again"),
        ];
        assert!(matches!(
            validate_columns(&columns),
            Err(ConfigError::DuplicateColumn(key)) if key == "id"
        ));
    }
}
