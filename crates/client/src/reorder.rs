//! Optimistic task reordering
//!
//! `ReorderController` owns the cached task lists and the active filter
//! context. A drag gesture is applied to the rendered list immediately,
//! persisted with a single `update_position` call when the gesture is
//! dropped, and rolled back to the pre-gesture order if that call fails.
//!
//! The commit is split in two so callers never have to hold the controller
//! across the network call:
//!
//! ```text
//! begin_drag_move* -> commit_drag_move -> Pending(move)
//!                                           |
//!                  update_position(...) ----+
//!                                           v
//!                                  resolve(move, result)
//! ```
//!
//! `resolve` checks the list generation first: if a fetch replaced the list
//! while the request was outstanding, the fetched list wins and is left
//! untouched.

use tracing::{debug, warn};

use crate::api::TaskApi;
use crate::cache::{CachedPage, TaskCache};
use crate::error::{ClientError, ClientResult};
use crate::filter::FilterContext;
use crate::models::{Page, Task};
use crate::notice::{Notice, POSITION_UPDATE_FAILED};

/// Move the element at `from` to `to`, shifting the elements in between by
/// one. Out-of-range indices return the list unchanged.
pub fn array_move<T: Clone>(items: &[T], from: usize, to: usize) -> Vec<T> {
    let mut moved = items.to_vec();
    if from >= moved.len() || to >= moved.len() || from == to {
        return moved;
    }
    let item = moved.remove(from);
    moved.insert(to, item);
    moved
}

/// Result of dropping a dragged task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitDecision {
    /// Dropped on itself or back at its original index; nothing to persist
    Unchanged,
    /// Dropped outside any task, or the list changed under the gesture
    Cancelled,
    /// The local list has been reordered and the position must be persisted
    Pending(PendingMove),
}

/// A locally applied move awaiting backend confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMove {
    /// Task that was moved
    pub task_id: String,
    /// Zero-based rank within the page to persist
    pub position: u32,
    /// Filter context the move was made under
    pub filter: FilterContext,
    /// Order before the gesture started
    pub snapshot: Vec<Task>,
    /// Generation of the list the move was applied to
    pub generation: u64,
    /// Local revision of that list after the move
    pub revision: u64,
}

/// How a pending move was reconciled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The backend accepted the position; the local order stands
    Committed,
    /// The backend rejected the position; the pre-gesture order was restored
    RolledBack(Vec<Task>),
    /// A fetch replaced the list meanwhile; nothing was changed locally
    Superseded,
    /// Later local moves sit on top of the failed one; the list was flagged
    /// for refetch instead of being reverted
    RefreshRequired,
}

/// An in-progress drag gesture
#[derive(Debug, Clone)]
struct Gesture {
    source_id: String,
    filter: FilterContext,
    generation: u64,
    snapshot: Vec<Task>,
}

/// Owner of the ordered task lists and the drag/reorder protocol
#[derive(Debug, Default)]
pub struct ReorderController {
    cache: TaskCache,
    filter: FilterContext,
    gesture: Option<Gesture>,
    fetching: Option<FilterContext>,
    in_flight: usize,
    notices: Vec<Notice>,
}

impl ReorderController {
    /// Create a controller for the given filter context
    pub fn new(filter: FilterContext) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    /// The active filter context
    pub fn filter(&self) -> &FilterContext {
        &self.filter
    }

    /// Switch to another filter context.
    ///
    /// Abandons any gesture in progress. Returns true when the new context
    /// has no usable cached list and should be fetched.
    pub fn set_filter(&mut self, filter: FilterContext) -> bool {
        if filter != self.filter {
            self.cancel_drag_move();
            self.filter = filter;
        }
        self.cache.needs_fetch(&self.filter)
    }

    /// The ordered task list for the active filter context
    pub fn tasks(&self) -> &[Task] {
        self.cache
            .get(&self.filter)
            .map(|entry| entry.tasks.as_slice())
            .unwrap_or(&[])
    }

    /// The cached page for the active filter context
    pub fn current_page(&self) -> Option<&CachedPage> {
        self.cache.get(&self.filter)
    }

    /// Whether the active list is missing or flagged for refresh
    pub fn needs_refresh(&self) -> bool {
        self.cache.needs_fetch(&self.filter)
    }

    /// Whether a fetch for the active filter context is outstanding
    pub fn is_fetching(&self) -> bool {
        self.fetching.as_ref() == Some(&self.filter)
    }

    /// Number of position updates awaiting `resolve`
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Id of the task currently being dragged
    pub fn dragging(&self) -> Option<&str> {
        self.gesture.as_ref().map(|g| g.source_id.as_str())
    }

    /// Flag every cached list for refresh.
    pub fn invalidate_all(&mut self) {
        self.cache.invalidate_all();
    }

    /// Drain notifications raised since the last call
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Mark the active filter context as being fetched and return it.
    pub fn begin_fetch(&mut self) -> FilterContext {
        self.fetching = Some(self.filter.clone());
        self.filter.clone()
    }

    /// Store the result of a fetch started with `begin_fetch`.
    ///
    /// A successful fetch replaces the cached list wholesale and wins over
    /// any gesture or position update still targeting the old list.
    ///
    /// # Errors
    ///
    /// Returns the fetch error unchanged; the cached list is kept.
    pub fn finish_fetch(
        &mut self,
        filter: FilterContext,
        result: ClientResult<Page<Task>>,
    ) -> ClientResult<()> {
        if self.fetching.as_ref() == Some(&filter) {
            self.fetching = None;
        }
        let page = result?;

        if self
            .gesture
            .as_ref()
            .is_some_and(|gesture| gesture.filter == filter)
        {
            self.gesture = None;
        }

        let generation = self.cache.replace(filter, page);
        debug!(generation, "task list replaced by fetch");
        Ok(())
    }

    /// Fetch the active filter context and store the result.
    ///
    /// # Errors
    ///
    /// Returns any error from the API client.
    pub async fn load<A: TaskApi>(&mut self, api: &A) -> ClientResult<()> {
        let filter = self.begin_fetch();
        let result = api.list(&filter).await;
        self.finish_fetch(filter, result)
    }

    /// Render an intermediate drag position.
    ///
    /// Reorders the active list so `source_id` sits where `over_id` was
    /// before the gesture started. Repeated calls within one gesture are
    /// idempotent. Returns false, leaving the list untouched, when either
    /// id is not in the list.
    pub fn begin_drag_move(&mut self, source_id: &str, over_id: &str) -> bool {
        let filter = self.filter.clone();
        let Some(entry) = self.cache.get_mut(&filter) else {
            return false;
        };

        let gesture_valid = self
            .gesture
            .as_ref()
            .is_some_and(|g| g.filter == filter && g.generation == entry.generation);
        let base = match (&self.gesture, gesture_valid) {
            (Some(gesture), true) => gesture.snapshot.as_slice(),
            _ => entry.tasks.as_slice(),
        };

        let (Some(from), Some(to)) = (index_in(base, source_id), index_in(base, over_id)) else {
            return false;
        };
        let moved = array_move(base, from, to);

        match &mut self.gesture {
            Some(gesture) if gesture_valid => gesture.source_id = source_id.to_string(),
            _ => {
                self.gesture = Some(Gesture {
                    source_id: source_id.to_string(),
                    filter,
                    generation: entry.generation,
                    snapshot: entry.tasks.clone(),
                });
            }
        }
        entry.tasks = moved;
        true
    }

    /// Drop the dragged task onto `over_id` and decide what to persist.
    ///
    /// Ends the gesture. Self-drops, zero-distance moves, and drops on an
    /// unknown task restore the pre-gesture order and send nothing. A real
    /// move is applied locally and returned as `Pending`; the caller sends
    /// `update_position` and hands the result to `resolve`.
    pub fn commit_drag_move(&mut self, source_id: &str, over_id: &str) -> CommitDecision {
        let gesture = self.gesture.take();
        let filter = self.filter.clone();
        let Some(entry) = self.cache.get_mut(&filter) else {
            return CommitDecision::Cancelled;
        };

        let snapshot = match gesture {
            Some(g) if g.filter == filter && g.generation == entry.generation => {
                // Undo intermediate renders; the move below is computed from scratch
                entry.tasks = g.snapshot.clone();
                g.snapshot
            }
            _ => entry.tasks.clone(),
        };

        if source_id == over_id {
            return CommitDecision::Unchanged;
        }
        let (Some(from), Some(to)) = (index_in(&snapshot, source_id), index_in(&snapshot, over_id))
        else {
            return CommitDecision::Cancelled;
        };
        if from == to {
            return CommitDecision::Unchanged;
        }
        let Ok(position) = u32::try_from(to) else {
            return CommitDecision::Cancelled;
        };

        entry.tasks = array_move(&snapshot, from, to);
        entry.revision += 1;
        self.in_flight += 1;
        debug!(task_id = source_id, from, to, "reorder applied locally");

        CommitDecision::Pending(PendingMove {
            task_id: source_id.to_string(),
            position,
            filter,
            snapshot,
            generation: entry.generation,
            revision: entry.revision,
        })
    }

    /// Abandon the gesture in progress and restore the pre-gesture order.
    pub fn cancel_drag_move(&mut self) {
        let Some(gesture) = self.gesture.take() else {
            return;
        };
        if let Some(entry) = self.cache.get_mut(&gesture.filter) {
            if entry.generation == gesture.generation {
                entry.tasks = gesture.snapshot;
            }
        }
    }

    /// Reconcile a pending move with the outcome of its position update.
    ///
    /// Failures always raise a "Failed to update position" notice. The list
    /// is only reverted when it is still the one the move was applied to
    /// and no later local move sits on top of it.
    pub fn resolve(&mut self, pending: PendingMove, result: ClientResult<()>) -> MoveOutcome {
        self.in_flight = self.in_flight.saturating_sub(1);

        if let Err(err) = &result {
            warn!(task_id = %pending.task_id, error = %err, "position update failed");
            self.notices.push(Notice::error(POSITION_UPDATE_FAILED));
        }

        let Some(entry) = self.cache.get_mut(&pending.filter) else {
            return MoveOutcome::Superseded;
        };
        if entry.generation != pending.generation || !entry.contains(&pending.task_id) {
            debug!(task_id = %pending.task_id, "list replaced while position update was outstanding");
            return MoveOutcome::Superseded;
        }

        match result {
            Ok(()) => {
                entry.renumber();
                entry.stale = true;
                MoveOutcome::Committed
            }
            Err(_) if entry.revision != pending.revision => {
                entry.stale = true;
                MoveOutcome::RefreshRequired
            }
            Err(_) => {
                entry.tasks = pending.snapshot.clone();
                if self
                    .gesture
                    .as_ref()
                    .is_some_and(|g| g.filter == pending.filter)
                {
                    self.gesture = None;
                }
                MoveOutcome::RolledBack(pending.snapshot)
            }
        }
    }

    /// Commit a drop and persist it in one step.
    ///
    /// Returns `None` when the drop needed no backend call.
    pub async fn commit_and_persist<A: TaskApi>(
        &mut self,
        api: &A,
        source_id: &str,
        over_id: &str,
    ) -> Option<MoveOutcome> {
        match self.commit_drag_move(source_id, over_id) {
            CommitDecision::Pending(pending) => {
                let result = api.update_position(&pending.task_id, pending.position).await;
                Some(self.resolve(pending, result))
            }
            CommitDecision::Unchanged | CommitDecision::Cancelled => None,
        }
    }
}

fn index_in(tasks: &[Task], task_id: &str) -> Option<usize> {
    tasks.iter().position(|t| t.id == task_id)
}

/// Convert a failed outcome into an error for callers that report errors
/// rather than render notices.
pub fn outcome_error(outcome: &MoveOutcome) -> Option<ClientError> {
    match outcome {
        MoveOutcome::RolledBack(_) | MoveOutcome::RefreshRequired => {
            Some(ClientError::validation(POSITION_UPDATE_FAILED))
        }
        MoveOutcome::Committed | MoveOutcome::Superseded => None,
    }
}
