//! Render model of a grid and its HTML form.
//!
//! A [`GridView`] is rebuilt from scratch on every committed response and
//! patched only for column visibility.

use std::fmt::Write as _;

use serde::Serialize;

use super::format::format_value;
use crate::config::{GridConfig, GridLabels};
use crate::models::{PaginationInfo, Row, SortDirection};

/// Everything a grid shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridView {
    /// Grid identifier.
    pub table_id: String,
    /// Table, placeholder or error.
    pub body: GridBody,
    /// Pagination control; empty when hidden.
    pub pagination: Vec<PageButton>,
    /// `Showing start–end / total`, or empty.
    pub records_info: String,
}

/// The part of the grid replaced by each render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum GridBody {
    /// A fetch is in flight.
    Loading {
        /// Loading label.
        message: String,
    },
    /// Rows to show.
    Table(TableView),
    /// The page has no rows.
    Empty {
        /// Empty-state label.
        message: String,
    },
    /// The fetch failed.
    Error {
        /// Failure text.
        message: String,
    },
}

/// Header and rows of a non-empty page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableView {
    /// One cell per field, in row order.
    pub headers: Vec<HeaderCell>,
    /// Formatted rows.
    pub rows: Vec<Vec<Cell>>,
}

/// A column header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderCell {
    /// Field name.
    pub field: String,
    /// Display label.
    pub label: String,
    /// Whether clicking sorts.
    pub sortable: bool,
    /// Direction if this is the current sort field.
    pub sort: Option<SortDirection>,
    /// Hidden by the column menu.
    pub hidden: bool,
}

/// A formatted cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cell {
    /// Field name.
    pub field: String,
    /// Display text.
    pub text: String,
    /// Hidden by the column menu.
    pub hidden: bool,
}

/// Role of a pagination button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageButtonKind {
    /// Jump to page 1.
    First,
    /// Previous page.
    Prev,
    /// A numbered page.
    Page,
    /// Next page.
    Next,
    /// Jump to the last page.
    Last,
}

/// A pagination button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageButton {
    /// Role.
    pub kind: PageButtonKind,
    /// Caption.
    pub label: String,
    /// Target page.
    pub page: u64,
    /// The current page's number button.
    pub active: bool,
    /// Not clickable.
    pub disabled: bool,
}

impl GridView {
    /// A view waiting for its first response.
    #[must_use]
    pub fn loading(config: &GridConfig) -> Self {
        Self {
            table_id: config.table_id.clone(),
            body: GridBody::Loading {
                message: config.labels.loading.clone(),
            },
            pagination: Vec::new(),
            records_info: String::new(),
        }
    }

    /// A view showing a failure in place of the body.
    #[must_use]
    pub fn error(config: &GridConfig, message: Option<&str>) -> Self {
        let message = message
            .filter(|m| !m.is_empty())
            .unwrap_or(config.labels.error.as_str())
            .to_string();
        Self {
            table_id: config.table_id.clone(),
            body: GridBody::Error { message },
            pagination: Vec::new(),
            records_info: String::new(),
        }
    }

    /// Renders a successful page.
    ///
    /// Headers follow the first row's field order. A page without rows shows
    /// the empty-state label, a `0–0 / 0` records line and no pagination.
    #[must_use]
    pub fn page(
        config: &GridConfig,
        rows: &[Row],
        pagination: &PaginationInfo,
        sort: (&str, SortDirection),
        visible_columns: &[String],
    ) -> Self {
        let Some(first) = rows.first() else {
            return Self {
                table_id: config.table_id.clone(),
                body: GridBody::Empty {
                    message: config.labels.empty.clone(),
                },
                pagination: Vec::new(),
                records_info: format!("{} 0–0 / 0", config.labels.records_prefix),
            };
        };

        let (start, end) = pagination.visible_range();
        let records_info = format!(
            "{} {start}–{end} / {}",
            config.labels.records_prefix, pagination.total_records
        );

        let is_hidden = |field: &str| {
            config.columns.iter().any(|c| c == field) && !visible_columns.iter().any(|c| c == field)
        };
        let (sort_field, sort_dir) = sort;

        let headers = first
            .keys()
            .map(|field| HeaderCell {
                field: field.clone(),
                label: config.label_for(field).to_string(),
                sortable: config.is_sortable(field),
                sort: (config.is_sortable(field) && field == sort_field).then_some(sort_dir),
                hidden: is_hidden(field.as_str()),
            })
            .collect();

        let rows = rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|(field, value)| Cell {
                        field: field.clone(),
                        text: format_value(value, config.format_for(field), &config.labels),
                        hidden: is_hidden(field.as_str()),
                    })
                    .collect()
            })
            .collect();

        let buttons = if config.pagination_enabled {
            pagination_buttons(pagination.page, pagination.total_pages, &config.labels)
        } else {
            Vec::new()
        };

        Self {
            table_id: config.table_id.clone(),
            body: GridBody::Table(TableView { headers, rows }),
            pagination: buttons,
            records_info,
        }
    }

    /// Re-applies column visibility to the rendered table.
    pub fn apply_visibility(&mut self, config: &GridConfig, visible_columns: &[String]) {
        let GridBody::Table(table) = &mut self.body else {
            return;
        };
        let is_hidden = |field: &str| {
            config.columns.iter().any(|c| c == field) && !visible_columns.iter().any(|c| c == field)
        };
        for header in &mut table.headers {
            header.hidden = is_hidden(header.field.as_str());
        }
        for cell in table.rows.iter_mut().flatten() {
            cell.hidden = is_hidden(cell.field.as_str());
        }
    }

    /// Returns true while a fetch is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self.body, GridBody::Loading { .. })
    }

    /// Returns the rendered table, if the body is one.
    #[must_use]
    pub const fn table(&self) -> Option<&TableView> {
        match &self.body {
            GridBody::Table(table) => Some(table),
            _ => None,
        }
    }

    /// Renders the view as an HTML fragment. All text is escaped.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        let _ = write!(
            html,
            r#"<div class="tablegrid" data-table="{}">"#,
            escape_html(&self.table_id)
        );

        match &self.body {
            GridBody::Loading { message } => {
                let _ = write!(html, r#"<div class="tablegrid-loading">{}</div>"#, escape_html(message));
            },
            GridBody::Empty { message } => {
                let _ = write!(html, r#"<div class="tablegrid-empty">{}</div>"#, escape_html(message));
            },
            GridBody::Error { message } => {
                let _ = write!(html, r#"<div class="tablegrid-error">{}</div>"#, escape_html(message));
            },
            GridBody::Table(table) => write_table(&mut html, table),
        }

        if !self.pagination.is_empty() {
            html.push_str(r#"<div class="tablegrid-pagination">"#);
            for button in &self.pagination {
                let mut class = String::from("page-btn");
                if button.active {
                    class.push_str(" active");
                }
                let _ = write!(
                    html,
                    r#"<button class="{class}" data-page="{}"{}>{}</button>"#,
                    button.page,
                    if button.disabled { " disabled" } else { "" },
                    escape_html(&button.label)
                );
            }
            html.push_str("</div>");
        }

        if !self.records_info.is_empty() {
            let _ = write!(
                html,
                r#"<div class="tablegrid-info">{}</div>"#,
                escape_html(&self.records_info)
            );
        }

        html.push_str("</div>");
        html
    }
}

fn write_table(html: &mut String, table: &TableView) {
    html.push_str(r#"<table class="tablegrid-table"><thead><tr>"#);
    for header in &table.headers {
        let mut class = Vec::new();
        if header.sortable {
            class.push("sortable");
        }
        match header.sort {
            Some(SortDirection::Asc) => class.push("sort-asc"),
            Some(SortDirection::Desc) => class.push("sort-desc"),
            None => {},
        }
        let _ = write!(
            html,
            r#"<th data-field="{}" class="{}"{}>{}</th>"#,
            escape_html(&header.field),
            class.join(" "),
            hidden_attr(header.hidden),
            escape_html(&header.label)
        );
    }
    html.push_str("</tr></thead><tbody>");
    for row in &table.rows {
        html.push_str("<tr>");
        for cell in row {
            let _ = write!(
                html,
                r#"<td data-field="{}"{}>{}</td>"#,
                escape_html(&cell.field),
                hidden_attr(cell.hidden),
                escape_html(&cell.text)
            );
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>");
}

const fn hidden_attr(hidden: bool) -> &'static str {
    if hidden { r#" style="display:none""# } else { "" }
}

/// Builds First, Prev, a window of up to five page numbers around `page`,
/// Next and Last. Returns nothing when there is at most one page.
#[must_use]
pub fn pagination_buttons(page: u64, total_pages: u64, labels: &GridLabels) -> Vec<PageButton> {
    if total_pages <= 1 {
        return Vec::new();
    }

    let page = page.max(1);
    let at_start = page <= 1;
    let at_end = page >= total_pages;
    let button = |kind, label: &str, target: u64, disabled: bool| PageButton {
        kind,
        label: label.to_string(),
        page: target,
        active: false,
        disabled,
    };

    let mut buttons = vec![
        button(PageButtonKind::First, &labels.first, 1, at_start),
        button(PageButtonKind::Prev, &labels.prev, page.saturating_sub(1).max(1), at_start),
    ];
    let window_start = page.saturating_sub(2).max(1);
    let window_end = total_pages.min(page + 2);
    for n in window_start..=window_end {
        buttons.push(PageButton {
            kind: PageButtonKind::Page,
            label: n.to_string(),
            page: n,
            active: n == page,
            disabled: false,
        });
    }
    buttons.push(button(PageButtonKind::Next, &labels.next, (page + 1).min(total_pages), at_end));
    buttons.push(button(PageButtonKind::Last, &labels.last, total_pages, at_end));
    buttons
}

/// Escapes text for HTML element content and attribute values.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
