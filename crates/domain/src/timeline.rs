use serde::{Deserialize, Serialize};

use crate::filter::FilterCriteria;
use crate::format::{PLACEHOLDER, format_timestamp};
use crate::operation::OperationRecord;
use crate::pagination::{PageSize, paginate, total_pages};

/// Token identifying one outstanding analysis request.
///
/// Results installed with a token older than the latest issued one are
/// discarded, so an overlapping request can never overwrite a newer result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestToken(u64);

/// Timeline state machine: the immutable original collection, the filtered
/// working selection, and the derived pagination state.
///
/// The working selection is a list of indices into the original collection,
/// which makes the subset-by-selection invariant structural: filtering can
/// only ever pick existing records and cannot reorder them.
#[derive(Debug, Clone)]
pub struct TimelineState {
    original: Vec<OperationRecord>,
    working: Vec<usize>,
    criteria: FilterCriteria,
    page_size: PageSize,
    page: usize,
    latest_request: u64,
}

impl TimelineState {
    /// Creates an empty timeline with the given page size.
    #[must_use]
    pub fn new(page_size: PageSize) -> Self {
        Self {
            original: Vec::new(),
            working: Vec::new(),
            criteria: FilterCriteria::default(),
            page_size,
            page: 1,
            latest_request: 0,
        }
    }

    /// Creates a timeline directly over a result set, with default paging.
    #[must_use]
    pub fn with_records(records: Vec<OperationRecord>) -> Self {
        let mut state = Self::new(PageSize::default());
        let token = state.begin_request();
        state.install(token, records);
        state
    }

    /// Registers a new outstanding analysis request and returns its token.
    pub fn begin_request(&mut self) -> RequestToken {
        self.latest_request += 1;
        RequestToken(self.latest_request)
    }

    /// Installs an analysis result, replacing all prior state wholesale.
    ///
    /// Records are ordered timestamp-descending on arrival (absent timestamps
    /// sort last); later filter passes preserve that order. Returns `false`
    /// and leaves the state untouched when the token is stale.
    pub fn install(&mut self, token: RequestToken, mut records: Vec<OperationRecord>) -> bool {
        if token.0 != self.latest_request {
            return false;
        }

        records.sort_by(|left, right| right.timestamp.cmp(&left.timestamp));

        self.original = records;
        self.criteria = FilterCriteria::default();
        self.working = (0..self.original.len()).collect();
        self.page = 1;
        true
    }

    /// Applies filter criteria over the original collection and resets to
    /// page one of the new working selection.
    pub fn apply_criteria(&mut self, criteria: FilterCriteria) {
        self.working = self
            .original
            .iter()
            .enumerate()
            .filter(|(_, record)| criteria.matches(record))
            .map(|(index, _)| index)
            .collect();
        self.criteria = criteria;
        self.page = 1;
    }

    /// Clears all criteria, restoring the full original collection.
    pub fn reset_criteria(&mut self) {
        self.apply_criteria(FilterCriteria::default());
    }

    /// Changes the page size and restarts from page one of the current
    /// working selection (filtered or not), never of the original.
    pub fn set_page_size(&mut self, page_size: PageSize) {
        self.page_size = page_size;
        self.page = 1;
    }

    /// Jumps to a page, clamped to the valid range.
    pub fn set_page(&mut self, page: usize) {
        self.page = page.clamp(1, self.total_pages());
    }

    /// Advances one page; a no-op on the last page.
    pub fn next_page(&mut self) {
        if self.page < self.total_pages() {
            self.page += 1;
        }
    }

    /// Goes back one page; a no-op on the first page.
    pub fn previous_page(&mut self) {
        if self.page > 1 {
            self.page -= 1;
        }
    }

    /// Returns the active criteria.
    #[must_use]
    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// Returns the current page number.
    #[must_use]
    pub fn page(&self) -> usize {
        self.page
    }

    /// Returns the total page count of the working selection.
    #[must_use]
    pub fn total_pages(&self) -> usize {
        total_pages(self.working.len(), self.page_size)
    }

    /// Returns the working selection size.
    #[must_use]
    pub fn working_len(&self) -> usize {
        self.working.len()
    }

    /// Recovers a record by its stable index into the original collection.
    #[must_use]
    pub fn record_at(&self, record_index: usize) -> Option<&OperationRecord> {
        self.original.get(record_index)
    }

    /// Builds the current page's view model from scratch.
    #[must_use]
    pub fn view(&self) -> TimelineView {
        let window = paginate(&self.working, self.page_size, self.page);

        let rows = window
            .items
            .iter()
            .filter_map(|&record_index| {
                self.original
                    .get(record_index)
                    .map(|record| TimelineRow::project(record_index, record))
            })
            .collect();

        TimelineView {
            rows,
            page: window.page,
            total_pages: window.total_pages,
            total_records: self.working.len(),
            page_label: format!("Page {} / {}", window.page, window.total_pages),
            previous_enabled: window.page > 1,
            next_enabled: window.page < window.total_pages,
            is_empty: self.working.is_empty(),
        }
    }
}

/// One rendered timeline table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineRow {
    /// Stable index into the original collection; enough identity for the
    /// detail projection to recover the record without replaying filters.
    pub record_index: usize,
    /// Formatted event time, `-` when absent.
    pub timestamp_label: String,
    /// Operation badge text.
    pub operation_label: String,
    /// Subject, falling back to the folder path, then `-`.
    pub display_label: String,
    /// Hover title (the untruncated subject, possibly empty).
    pub hover_title: String,
    /// Acting user, `-` when absent.
    pub user_label: String,
}

impl TimelineRow {
    fn project(record_index: usize, record: &OperationRecord) -> Self {
        let subject = record.subject.as_deref().filter(|text| !text.is_empty());
        let folder = record.folder.as_deref().filter(|text| !text.is_empty());

        Self {
            record_index,
            timestamp_label: format_timestamp(record.timestamp.as_ref()),
            operation_label: if record.operation.is_empty() {
                PLACEHOLDER.to_owned()
            } else {
                record.operation.clone()
            },
            display_label: subject.or(folder).unwrap_or(PLACEHOLDER).to_owned(),
            hover_title: subject.unwrap_or_default().to_owned(),
            user_label: record.user.as_deref().unwrap_or(PLACEHOLDER).to_owned(),
        }
    }
}

/// Complete view model of the timeline table and its pagination control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineView {
    /// Rows of the current page.
    pub rows: Vec<TimelineRow>,
    /// Current page, in `[1, total_pages]`.
    pub page: usize,
    /// Total page count (at least one).
    pub total_pages: usize,
    /// Working selection size after filtering.
    pub total_records: usize,
    /// Pagination label, e.g. `Page 2 / 5`.
    pub page_label: String,
    /// Whether the previous control is clickable.
    pub previous_enabled: bool,
    /// Whether the next control is clickable.
    pub next_enabled: bool,
    /// Whether the working selection is empty and the table should show its
    /// explicit "Aucune donnée" row instead.
    pub is_empty: bool,
}
