//! Plain-text drawing of a list view.

use std::fmt::Write;

use server_list_lib::Alignment;
use server_list_lib::ListView;
use server_list_lib::query::FilterControl;
use server_list_lib::render::Body;
use server_list_lib::render::Footer;
use server_list_lib::render::PagerView;
use server_list_lib::render::TableView;

/// Logical pixels per terminal column.
const PX_PER_CHAR: f64 = 8.0;

fn fit(text: &str, width: usize, align: Alignment) -> String {
    let clipped: String = if text.chars().count() > width {
        let mut s: String = text.chars().take(width.saturating_sub(1)).collect();
        s.push('…');
        s
    } else {
        text.to_string()
    };
    match align {
        Alignment::Left => format!("{clipped:<width$}"),
        Alignment::Center => format!("{clipped:^width$}"),
        Alignment::Right => format!("{clipped:>width$}"),
    }
}

fn chars(px: f64) -> usize {
    ((px / PX_PER_CHAR).floor() as usize).max(3)
}

fn checkbox(selected: Option<bool>) -> &'static str {
    match selected {
        Some(true) => "[x] ",
        Some(false) => "[ ] ",
        None => "",
    }
}

fn table(out: &mut String, table: &TableView) {
    let header: Vec<String> = table
        .header
        .iter()
        .map(|h| {
            let label = match h.sort {
                Some(dir) => format!("{} {}", h.label, dir.arrow()),
                None => h.label.clone(),
            };
            fit(&label, chars(h.width), h.align)
        })
        .collect();
    let prefix = if table.header_checked.is_some() { "    " } else { "" };
    let _ = writeln!(out, "{prefix}{}", header.join(" "));
    let _ = writeln!(out, "{}", "-".repeat(chars(table.widths.total)));

    for row in &table.rows {
        let cells: Vec<String> = row
            .cells
            .iter()
            .map(|c| fit(&c.text, chars(c.width), c.align))
            .collect();
        let _ = write!(out, "{}{}", checkbox(row.selected), cells.join(" "));
        if !row.actions.is_empty() {
            let _ = write!(out, "  {}", row.actions.join(" | "));
        }
        out.push('\n');
    }
    if table.rows.len() < table.total_rows {
        let _ = writeln!(out, "({} de {} filas visibles)", table.rows.len(), table.total_rows);
    }
}

fn pager(out: &mut String, pager: &PagerView) {
    let prev = if pager.prev_enabled {
        format!("[{}]", PagerView::PREV_TEXT)
    } else {
        format!(" {} ", PagerView::PREV_TEXT)
    };
    let next = if pager.next_enabled {
        format!("[{}]", PagerView::NEXT_TEXT)
    } else {
        format!(" {} ", PagerView::NEXT_TEXT)
    };
    let _ = writeln!(out, "{prev}  {}  {next}", pager.label);
}

/// Draws `view` as text.
pub fn render(view: &ListView) -> String {
    let mut out = String::new();
    let toolbar = &view.toolbar;

    let search = if toolbar.search.is_empty() {
        toolbar.search_placeholder.to_string()
    } else {
        format!("{} (x)", toolbar.search)
    };
    let _ = write!(out, "{search}  Filas: {}", toolbar.per_page);
    if let Some(label) = toolbar.filter_toggle {
        let _ = write!(out, "  [{label}]");
    }
    if toolbar.selected_count > 0 {
        let _ = write!(out, "  {} seleccionados", toolbar.selected_count);
    }
    for action in &toolbar.bulk_actions {
        let _ = write!(out, "  [{action}]");
    }
    out.push('\n');

    if !view.sort_chips.is_empty() {
        let chips: Vec<String> = view.sort_chips.iter().map(|c| c.text()).collect();
        let _ = writeln!(out, "Orden: {}", chips.join(" | "));
    }

    for field in &view.filters {
        let value = match &field.control {
            FilterControl::TextInput {
                placeholder, value, ..
            } => {
                if value.is_empty() {
                    format!("<{placeholder}>")
                } else {
                    value.clone()
                }
            }
            FilterControl::RangeInputs { from, to, .. } => format!("{from} .. {to}"),
            FilterControl::Picker { options, selected } => options
                .iter()
                .find(|o| &o.value == selected)
                .map(|o| o.label.clone())
                .unwrap_or_default(),
        };
        let _ = writeln!(out, "  {}: {value}", field.label);
    }

    if let Some(error) = &view.error {
        let _ = writeln!(out, "! {error}");
    }

    if let Some(bar) = &view.select_all {
        let _ = writeln!(out, "{}{}", checkbox(Some(bar.checked)), bar.label);
    }

    match &view.body {
        Body::Loading(text) => {
            let _ = writeln!(out, "{text}");
        }
        Body::Empty(text) => {
            let _ = writeln!(out, "{text}");
        }
        Body::Cards(cards) => {
            for card in cards {
                let _ = write!(out, "{}#{}", checkbox(card.selected), card.key);
                if !card.actions.is_empty() {
                    let _ = write!(out, "  {}", card.actions.join(" | "));
                }
                out.push('\n');
                for cell in &card.cells {
                    let _ = writeln!(out, "  {}: {}", cell.label, cell.text);
                }
                if card.tile {
                    out.push('\n');
                }
            }
        }
        Body::Table(t) => table(&mut out, t),
    }

    match &view.footer {
        Footer::Pager(p) => pager(&mut out, p),
        Footer::LoadingMore(text) => {
            let _ = writeln!(out, "{text}");
        }
        Footer::None => {}
    }
    out
}
