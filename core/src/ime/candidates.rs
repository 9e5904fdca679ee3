//! Candidate list with fixed-size paging.
//!
//! A page holds one candidate per selection key. Paging moves the window start
//! by exactly one page and wraps at both ends, so the start is always a
//! multiple of the page size inside the list.

/// Paging direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageDirection {
    Forward,
    Backward,
}

/// A paged list of candidates.
///
/// Entries are `None` for placeholder slots (a `%quick` null candidate): they
/// take a position on the page but cannot be committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateList {
    /// All candidates
    items: Vec<Option<String>>,

    /// Number of candidates per page
    page_size: usize,

    /// Index of the first candidate of the current page
    start: usize,
}

impl Default for CandidateList {
    fn default() -> Self {
        Self::new(10)
    }
}

impl CandidateList {
    /// Create an empty list.
    pub fn new(page_size: usize) -> Self {
        Self {
            items: Vec::new(),
            page_size: page_size.max(1),
            start: 0,
        }
    }

    /// Replace the candidates and go back to the first page.
    pub fn set_candidates(&mut self, items: Vec<Option<String>>) {
        self.items = items;
        self.start = 0;
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.start = 0;
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn items(&self) -> &[Option<String>] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Index of the first candidate of the current page.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Total number of pages (0 when empty).
    pub fn num_pages(&self) -> usize {
        self.items.len().div_ceil(self.page_size)
    }

    /// Current page (0-based).
    pub fn current_page(&self) -> usize {
        self.start / self.page_size
    }

    /// Candidates on the current page.
    pub fn window(&self) -> &[Option<String>] {
        let end = (self.start + self.page_size).min(self.items.len());
        &self.items[self.start.min(end)..end]
    }

    /// Current page for display, placeholders rendered as `null`.
    pub fn display_window(&self, null: &str) -> Vec<String> {
        self.window()
            .iter()
            .map(|c| c.clone().unwrap_or_else(|| null.to_string()))
            .collect()
    }

    /// Candidate at absolute `index`; `None` when out of range or a placeholder.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.items.get(index).and_then(|c| c.as_deref())
    }

    /// Candidate at position `offset` of the current page.
    pub fn get_in_window(&self, offset: usize) -> Option<&str> {
        if offset >= self.page_size {
            return None;
        }
        self.get(self.start + offset)
    }

    /// More than one page exists.
    pub fn can_cycle(&self) -> bool {
        self.items.len() > self.page_size
    }

    /// Another page follows the current one.
    pub fn has_next_page(&self) -> bool {
        self.start + self.page_size < self.items.len()
    }

    /// Move one page in `direction`, wrapping at both ends.
    ///
    /// Returns false (and leaves the list untouched) when there is only one
    /// page.
    pub fn cycle(&mut self, direction: PageDirection) -> bool {
        if !self.can_cycle() {
            return false;
        }
        let last = (self.items.len() - 1) / self.page_size * self.page_size;
        self.start = match direction {
            PageDirection::Forward if self.start >= last => 0,
            PageDirection::Forward => self.start + self.page_size,
            PageDirection::Backward if self.start == 0 => last,
            PageDirection::Backward => self.start - self.page_size,
        };
        true
    }

    /// Go back to the first page.
    pub fn reset_page(&mut self) {
        self.start = 0;
    }

    /// `now/total` when there is more than one page, empty otherwise.
    pub fn page_prompt(&self) -> String {
        let total = self.num_pages();
        if total > 1 {
            format!("{}/{}", self.current_page() + 1, total)
        } else {
            String::new()
        }
    }

    /// Clear the candidate list.
    pub fn clear(&mut self) {
        self.items.clear();
        self.start = 0;
    }
}
