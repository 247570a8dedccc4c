//! Page cache keyed by filter context
//!
//! Holds the last fetched page for every filter context seen so far. Each
//! replacement is stamped with a fresh generation so that work started
//! against an older list can tell it has been superseded.

use std::collections::HashMap;

use crate::filter::FilterContext;
use crate::models::{Page, Task};

/// The cached page for one filter context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedPage {
    /// Ordered task list as currently rendered
    pub tasks: Vec<Task>,
    pub page: u32,
    pub limit: u32,
    pub total: u32,
    pub total_pages: u32,
    /// Stamp of the fetch that produced this entry
    pub generation: u64,
    /// Count of local reorders committed since the fetch
    pub revision: u64,
    /// Set when the entry should be refetched in the background
    pub stale: bool,
}

impl CachedPage {
    /// Whether the task is part of this page
    pub fn contains(&self, task_id: &str) -> bool {
        self.tasks.iter().any(|t| t.id == task_id)
    }

    /// Index of a task within the page
    pub fn index_of(&self, task_id: &str) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == task_id)
    }

    /// Rewrite every task's position to its zero-based index.
    pub fn renumber(&mut self) {
        for (index, task) in self.tasks.iter_mut().enumerate() {
            task.position = u32::try_from(index).ok();
        }
    }
}

/// Map of filter context to cached page
#[derive(Debug, Default)]
pub struct TaskCache {
    entries: HashMap<FilterContext, CachedPage>,
    last_generation: u64,
}

impl TaskCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, filter: &FilterContext) -> Option<&CachedPage> {
        self.entries.get(filter)
    }

    pub fn get_mut(&mut self, filter: &FilterContext) -> Option<&mut CachedPage> {
        self.entries.get_mut(filter)
    }

    /// Replace the entry for `filter` wholesale with a fetched page.
    ///
    /// Returns the generation stamped on the new entry.
    pub fn replace(&mut self, filter: FilterContext, page: Page<Task>) -> u64 {
        self.last_generation += 1;
        let generation = self.last_generation;
        self.entries.insert(
            filter,
            CachedPage {
                tasks: page.items,
                page: page.page,
                limit: page.limit,
                total: page.total,
                total_pages: page.total_pages,
                generation,
                revision: 0,
                stale: false,
            },
        );
        generation
    }

    /// Flag one entry for refresh. Returns false if nothing is cached.
    pub fn invalidate(&mut self, filter: &FilterContext) -> bool {
        match self.entries.get_mut(filter) {
            Some(entry) => {
                entry.stale = true;
                true
            }
            None => false,
        }
    }

    /// Flag every entry for refresh (after a create, update, or delete).
    pub fn invalidate_all(&mut self) {
        for entry in self.entries.values_mut() {
            entry.stale = true;
        }
    }

    /// Whether `filter` has no entry or a stale one
    pub fn needs_fetch(&self, filter: &FilterContext) -> bool {
        self.entries.get(filter).is_none_or(|entry| entry.stale)
    }

    pub fn remove(&mut self, filter: &FilterContext) -> Option<CachedPage> {
        self.entries.remove(filter)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
