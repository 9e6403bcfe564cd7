//! Column-based sorting, filtering and pagination over an in-memory list.
//!
//! The table owns its rows. Filters are predicates keyed by column id, so at most
//! one filter applies per column; sorting is stable and keyed by one column.

use std::cmp::Ordering;
use std::fmt;

/// Default number of rows per page.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Comparable, printable cell content.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    Empty,
}

impl CellValue {
    /// Total order across cells of one column. Empty cells sort first.
    pub fn compare(&self, other: &CellValue) -> Ordering {
        use CellValue::*;
        match (self, other) {
            (Empty, Empty) => Ordering::Equal,
            (Empty, _) => Ordering::Less,
            (_, Empty) => Ordering::Greater,
            (Int(a), Int(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Int(a), Float(b)) => (*a as f64).total_cmp(b),
            (Float(a), Int(b)) => a.total_cmp(&(*b as f64)),
            (Bool(a), Bool(b)) => a.cmp(b),
            (Text(a), Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
            _ => self.to_string().cmp(&other.to_string()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Int(v) => write!(f, "{v}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Text(v) => f.write_str(v),
            CellValue::Bool(true) => f.write_str("yes"),
            CellValue::Bool(false) => f.write_str("no"),
            CellValue::Empty => Ok(()),
        }
    }
}

pub struct Column<T> {
    pub id: &'static str,
    pub header: &'static str,
    pub accessor: fn(&T) -> CellValue,
}

impl<T> Column<T> {
    pub const fn new(id: &'static str, header: &'static str, accessor: fn(&T) -> CellValue) -> Self {
        Self { id, header, accessor }
    }

    pub fn value(&self, row: &T) -> CellValue {
        (self.accessor)(row)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn icon(self) -> &'static str {
        match self {
            SortDirection::Ascending => "↑",
            SortDirection::Descending => "↓",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub column: &'static str,
    pub direction: SortDirection,
}

pub type Predicate<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

pub struct TableState<T> {
    columns: Vec<Column<T>>,
    rows: Vec<T>,
    filters: Vec<(&'static str, Predicate<T>)>,
    sort: Option<SortState>,
    page: usize,
    page_size: usize,
    selected: usize,
}

impl<T> TableState<T> {
    pub fn new(columns: Vec<Column<T>>, page_size: usize) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            filters: Vec::new(),
            sort: None,
            page: 0,
            page_size: page_size.max(1),
            selected: 0,
        }
    }

    pub fn columns(&self) -> &[Column<T>] {
        &self.columns
    }

    pub fn column(&self, id: &str) -> Option<&Column<T>> {
        self.columns.iter().find(|column| column.id == id)
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    /// Replace the data. Sort and filters stay; the page is clamped to what exists.
    pub fn set_rows(&mut self, rows: Vec<T>) {
        self.rows = rows;
        self.clamp_position();
    }

    pub fn set_filter(&mut self, column: &'static str, predicate: Predicate<T>) {
        self.filters.retain(|(id, _)| *id != column);
        self.filters.push((column, predicate));
        self.reset_position();
    }

    pub fn clear_filter(&mut self, column: &str) {
        let before = self.filters.len();
        self.filters.retain(|(id, _)| *id != column);
        if self.filters.len() != before {
            self.reset_position();
        }
    }

    pub fn has_filter(&self, column: &str) -> bool {
        self.filters.iter().any(|(id, _)| *id == column)
    }

    pub fn sort(&self) -> Option<SortState> {
        self.sort
    }

    /// Unsorted or another column goes ascending; otherwise the direction flips.
    pub fn toggle_sort(&mut self, column: &'static str) {
        let direction = match self.sort {
            Some(SortState {
                column: current,
                direction: SortDirection::Ascending,
            }) if current == column => SortDirection::Descending,
            _ => SortDirection::Ascending,
        };
        self.sort = Some(SortState { column, direction });
        self.clamp_position();
    }

    pub fn clear_sort(&mut self) {
        self.sort = None;
    }

    /// Filtered then sorted view over every page.
    pub fn visible_rows(&self) -> Vec<&T> {
        let mut rows: Vec<&T> = self
            .rows
            .iter()
            .filter(|row| self.filters.iter().all(|(_, keep)| keep(row)))
            .collect();

        if let Some(sort) = self.sort {
            if let Some(column) = self.column(sort.column) {
                rows.sort_by(|a, b| {
                    let ord = column.value(a).compare(&column.value(b));
                    match sort.direction {
                        SortDirection::Ascending => ord,
                        SortDirection::Descending => ord.reverse(),
                    }
                });
            }
        }
        rows
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Zero-based current page.
    pub fn page(&self) -> usize {
        self.page
    }

    /// Never less than one, so an empty table still shows "page 1 of 1".
    pub fn page_count(&self) -> usize {
        let total = self.visible_rows().len();
        total.div_ceil(self.page_size).max(1)
    }

    pub fn page_rows(&self) -> Vec<&T> {
        self.visible_rows()
            .into_iter()
            .skip(self.page * self.page_size)
            .take(self.page_size)
            .collect()
    }

    pub fn next_page(&mut self) -> bool {
        if self.page + 1 < self.page_count() {
            self.page += 1;
            self.selected = 0;
            true
        } else {
            false
        }
    }

    pub fn prev_page(&mut self) -> bool {
        if self.page > 0 {
            self.page -= 1;
            self.selected = 0;
            true
        } else {
            false
        }
    }

    /// Index of the highlighted row within the current page.
    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_row(&self) -> Option<&T> {
        self.page_rows().get(self.selected).copied()
    }

    pub fn select_next(&mut self) {
        let len = self.page_rows().len();
        if len > 0 {
            self.selected = (self.selected + 1) % len;
        }
    }

    pub fn select_prev(&mut self) {
        let len = self.page_rows().len();
        if len > 0 {
            self.selected = if self.selected == 0 { len - 1 } else { self.selected - 1 };
        }
    }

    fn reset_position(&mut self) {
        self.page = 0;
        self.selected = 0;
    }

    fn clamp_position(&mut self) {
        let last_page = self.page_count() - 1;
        self.page = self.page.min(last_page);
        let len = self.page_rows().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }
}
