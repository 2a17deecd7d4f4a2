//! Page arithmetic and per-context page memory.
//!
//! Out-of-range pages are clamped, never rejected. When the data behind a
//! [`Paginator`] shrinks or the page size changes, the current page is
//! re-clamped rather than reset, so a user on page 2 stays on page 2 as long as
//! page 2 still exists.
//!
//! An empty list has zero pages; the current page is still 1.

use crate::error::Result;
use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, warn};

/// One page of a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub current_page: usize,
    pub total_pages: usize,
}

/// `ceil(total_items / page_size)`.
///
/// # Panics
///
/// Panics if `page_size` is zero.
pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    assert!(page_size > 0, "page size must be positive");
    total_items.div_ceil(page_size)
}

/// Clamp `page` into `1..=max(1, total_pages)`.
pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

/// 1-based page that contains the 0-based `index`.
pub fn page_of_index(index: usize, page_size: usize) -> usize {
    assert!(page_size > 0, "page size must be positive");
    index / page_size + 1
}

/// Slice out page `page` (clamped) of `items`.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> Page<'_, T> {
    let total_pages = total_pages(items.len(), page_size);
    let current_page = clamp_page(page, total_pages);
    let start = ((current_page - 1) * page_size).min(items.len());
    let end = (start + page_size).min(items.len());

    Page {
        items: &items[start..end],
        current_page,
        total_pages,
    }
}

/// Parse the "jump to page" box. Non-numbers and pages below 1 are ignored.
pub fn parse_page_jump(input: &str, total_pages: usize) -> Option<usize> {
    match input.trim().parse::<usize>() {
        Ok(page) if page > 0 => Some(page.min(total_pages.max(1))),
        _ => None,
    }
}

/// Pagination state of one list view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginator {
    context: Option<String>,
    current_page: usize,
    page_size: usize,
    total_items: usize,
}

impl Paginator {
    pub fn new(total_items: usize, page_size: usize) -> Self {
        assert!(page_size > 0, "page size must be positive");
        Self {
            context: None,
            current_page: 1,
            page_size,
            total_items,
        }
    }

    /// Build a paginator for a named context, starting from the page last saved
    /// under that name. A saved page beyond the end is clamped.
    pub fn restore(
        context: impl Into<String>,
        store: &dyn PageStore,
        total_items: usize,
        page_size: usize,
    ) -> Self {
        let context = context.into();
        let mut paginator = Self::new(total_items, page_size);
        if let Some(saved) = store.load(&context) {
            debug!(context = %context, saved, "restoring saved page");
            paginator.set_page(saved);
        }
        paginator.context = Some(context);
        paginator
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_items(&self) -> usize {
        self.total_items
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.total_items, self.page_size)
    }

    /// Move to `page`, clamped. Returns the page actually selected.
    pub fn set_page(&mut self, page: usize) -> usize {
        self.current_page = clamp_page(page, self.total_pages());
        self.current_page
    }

    pub fn next_page(&mut self) -> usize {
        self.set_page(self.current_page.saturating_add(1))
    }

    pub fn prev_page(&mut self) -> usize {
        self.set_page(self.current_page.saturating_sub(1))
    }

    /// The backing list changed length; keep the current page if it still exists.
    pub fn set_total_items(&mut self, total_items: usize) {
        self.total_items = total_items;
        self.set_page(self.current_page);
    }

    /// # Panics
    ///
    /// Panics if `page_size` is zero.
    pub fn set_page_size(&mut self, page_size: usize) {
        assert!(page_size > 0, "page size must be positive");
        self.page_size = page_size;
        self.set_page(self.current_page);
    }

    /// Move to the page containing item `index`.
    pub fn jump_to_index(&mut self, index: usize) -> usize {
        self.set_page(page_of_index(index, self.page_size))
    }

    /// Page numbers to show around the current one.
    pub fn page_window(&self, radius: usize) -> RangeInclusive<usize> {
        let last = self.total_pages().max(1);
        let first = self.current_page.saturating_sub(radius).max(1);
        first..=self.current_page.saturating_add(radius).min(last)
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        paginate(items, self.current_page, self.page_size).items
    }

    /// Remember the current page under this paginator's context, if it has one.
    pub fn persist(&self, store: &dyn PageStore) {
        if let Some(context) = &self.context
            && let Err(e) = store.save(context, self.current_page)
        {
            warn!(context = %context, error = %e, "failed to save page");
        }
    }
}

/// Key-value memory of the last page per pagination context.
pub trait PageStore: Send + Sync {
    fn load(&self, key: &str) -> Option<usize>;
    fn save(&self, key: &str, page: usize) -> Result<()>;
}

/// Pages kept in memory only.
#[derive(Debug, Default)]
pub struct MemoryPageStore {
    pages: Mutex<HashMap<String, usize>>,
}

impl MemoryPageStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PageStore for MemoryPageStore {
    fn load(&self, key: &str) -> Option<usize> {
        self.pages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .copied()
    }

    fn save(&self, key: &str, page: usize) -> Result<()> {
        self.pages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), page);
        Ok(())
    }
}

/// Pages kept in a JSON file: `{"browse:cask": "3", ...}`.
///
/// Values are page numbers written as strings. Anything unreadable is treated
/// as "nothing saved".
#[derive(Debug, Clone)]
pub struct FilePageStore {
    path: PathBuf,
}

impl FilePageStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> HashMap<String, String> {
        std::fs::read_to_string(&self.path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }
}

impl PageStore for FilePageStore {
    fn load(&self, key: &str) -> Option<usize> {
        self.read_all().get(key)?.trim().parse().ok()
    }

    fn save(&self, key: &str, page: usize) -> Result<()> {
        let mut pages = self.read_all();
        pages.insert(key.to_string(), page.to_string());

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(&pages)?;
        std::fs::write(&self.path, json)?;

        Ok(())
    }
}
