//! Sort, filter, search and paginate over the source list.
//!
//! The pipeline works on indices into the source records, so the records
//! themselves are never reordered or copied.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use tracing::trace;

use crate::domain::DashError;
use crate::records::{ProjectField, ProjectRecord};

pub const PAGE_SIZE: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    None,
    Client,
    Country,
    Date,
}

impl SortKey {
    pub fn field(self) -> Option<ProjectField> {
        match self {
            SortKey::None => None,
            SortKey::Client => Some(ProjectField::Client),
            SortKey::Country => Some(ProjectField::Country),
            SortKey::Date => Some(ProjectField::Date),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn arrow(self) -> &'static str {
        match self {
            SortOrder::Ascending => "▲",
            SortOrder::Descending => "▼",
        }
    }
}

/// Sort, filter, search and page selections of one table view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub sort_key: SortKey,
    pub sort_order: SortOrder,
    pub filters: BTreeMap<ProjectField, String>,
    pub search_query: String,
    pub current_page: usize, // 1-based
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            sort_key: SortKey::None,
            sort_order: SortOrder::Ascending,
            filters: BTreeMap::new(),
            search_query: String::new(),
            current_page: 1,
        }
    }
}

impl ViewState {
    /// Requesting the active key while ascending flips to descending,
    /// every other request sorts ascending.
    pub fn request_sort(&mut self, key: SortKey) {
        self.sort_order = if key == self.sort_key && self.sort_order == SortOrder::Ascending {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        };
        self.sort_key = key;
    }

    /// An empty pattern removes the filter for that field.
    pub fn set_filter(&mut self, field: ProjectField, pattern: &str) {
        if pattern.is_empty() {
            self.filters.remove(&field);
        } else {
            self.filters.insert(field, pattern.to_string());
        }
        self.current_page = 1;
    }

    pub fn set_search(&mut self, query: &str) {
        self.search_query = query.to_string();
        self.current_page = 1;
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.search_query.clear();
        self.current_page = 1;
    }

    pub fn has_filters(&self) -> bool {
        self.filters.values().any(|p| !p.is_empty()) || !self.search_query.is_empty()
    }

    pub fn set_page(&mut self, page: usize, total_pages: usize) -> Result<(), DashError> {
        if page == 0 || page > total_pages {
            return Err(DashError::PageOutOfRange {
                requested: page,
                total: total_pages,
            });
        }
        self.current_page = page;
        Ok(())
    }

    pub fn next_page(&mut self, total_pages: usize) -> bool {
        self.set_page(self.current_page + 1, total_pages).is_ok()
    }

    pub fn previous_page(&mut self) -> bool {
        if self.current_page > 1 {
            self.current_page -= 1;
            true
        } else {
            false
        }
    }
}

/// Result of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedPage {
    pub rows: Vec<usize>, // Indices into the source records, in display order
    pub page: usize,
    pub total_pages: usize,
    pub filtered_count: usize,
}

impl DerivedPage {
    pub fn items<'a>(&self, records: &'a [ProjectRecord]) -> Vec<&'a ProjectRecord> {
        self.rows.iter().map(|&idx| &records[idx]).collect()
    }
}

/// Stable ordering of the record indices by `key`.
///
/// Descending compares in reverse instead of reversing the result, so equal
/// keys keep their original relative order in both directions.
pub fn sort_indices(records: &[ProjectRecord], key: SortKey, order: SortOrder) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..records.len()).collect();
    if let Some(field) = key.field() {
        indices.sort_by(|&a, &b| {
            let ord: Ordering = records[a].get(field).cmp(records[b].get(field));
            match order {
                SortOrder::Ascending => ord,
                SortOrder::Descending => ord.reverse(),
            }
        });
    }
    indices
}

fn contains_ignore_case(value: &str, lowered_pattern: &str) -> bool {
    value.to_lowercase().contains(lowered_pattern)
}

pub fn matches_filters(record: &ProjectRecord, filters: &BTreeMap<ProjectField, String>) -> bool {
    filters
        .iter()
        .filter(|(_, pattern)| !pattern.is_empty())
        .all(|(&field, pattern)| contains_ignore_case(record.get(field), &pattern.to_lowercase()))
}

pub fn matches_search(record: &ProjectRecord, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let query = query.to_lowercase();
    ProjectField::ALL
        .iter()
        .any(|&field| contains_ignore_case(record.get(field), &query))
}

/// Never less than one, an empty result still has one (empty) page.
pub fn total_pages(filtered_count: usize) -> usize {
    filtered_count.div_ceil(PAGE_SIZE).max(1)
}

pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

pub fn derive(records: &[ProjectRecord], state: &ViewState) -> DerivedPage {
    let ordered = sort_indices(records, state.sort_key, state.sort_order);

    let matching: Vec<usize> = ordered
        .into_iter()
        .filter(|&idx| matches_filters(&records[idx], &state.filters))
        .filter(|&idx| matches_search(&records[idx], &state.search_query))
        .collect();

    let filtered_count = matching.len();
    let total_pages = total_pages(filtered_count);
    let page = clamp_page(state.current_page, total_pages);

    let rbegin = (page - 1) * PAGE_SIZE;
    let rend = std::cmp::min(rbegin + PAGE_SIZE, filtered_count);
    let rows = matching[rbegin..rend].to_vec();

    trace!(
        "Derived page {}/{}: {} of {} records match, rows {:?}",
        page,
        total_pages,
        filtered_count,
        records.len(),
        rows
    );

    DerivedPage {
        rows,
        page,
        total_pages,
        filtered_count,
    }
}
