use std::collections::HashSet;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{debug, info, warn};

use crate::events::{CellAssignment, CellUpdate};
use crate::pool::{HandleRegistry, Playable, PoolItem};

/// What a grid cell currently shows. The cell owns its playable reference;
/// replacing or clearing the cell revokes a transient handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellContent {
    key: String,
    playable: Playable,
}

impl CellContent {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn uri(&self) -> &str {
        self.playable.uri()
    }
}

/// Owns the sampling state for one grid: the clip pool, one shuffled traversal
/// order per dispensing cycle, the set of identities already dispensed this
/// cycle, a cursor into the order, and the per-cell pin mask.
///
/// Rules:
/// - Each pool identity is dispensed at most once between reshuffles.
/// - Pinned cells that already show content are never reassigned.
/// - An empty or exhausted pool clears cells; it never errors.
pub struct GridSampler {
    pool: Vec<PoolItem>,
    shuffled: Vec<usize>,
    shown: HashSet<String>,
    cursor: usize,
    pinned: Vec<bool>,
    cells: Vec<Option<CellContent>>,
    handles: HandleRegistry,
    rng: StdRng,
}

impl GridSampler {
    pub fn new(grid_size: usize, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        Self {
            pool: Vec::new(),
            shuffled: Vec::new(),
            shown: HashSet::new(),
            cursor: 0,
            pinned: vec![false; grid_size],
            cells: vec![None; grid_size],
            handles: HandleRegistry::default(),
            rng,
        }
    }

    /// Install a new pool. All derived shuffle state is invalidated; cells
    /// keep their content until the next refresh.
    pub fn replace_pool(&mut self, items: Vec<PoolItem>) {
        self.pool = items;
        self.shuffled.clear();
        self.shown.clear();
        self.cursor = 0;
    }

    /// Recompute the shuffled order, clear the shown set and reset the
    /// cursor, all before any `next_unshown` call can observe them.
    pub fn reshuffle(&mut self) {
        let mut order: Vec<usize> = (0..self.pool.len()).collect();
        order.shuffle(&mut self.rng);
        self.shuffled = order;
        self.shown.clear();
        self.cursor = 0;
        debug!(pool = self.pool.len(), "reshuffled clip pool");
    }

    /// The next pool item whose identity has not been dispensed this cycle,
    /// or `None` once the shuffled order is exhausted. The returned item's
    /// identity is recorded as shown.
    pub fn next_unshown(&mut self) -> Option<PoolItem> {
        self.next_unshown_index().map(|idx| self.pool[idx].clone())
    }

    fn next_unshown_index(&mut self) -> Option<usize> {
        while self.cursor < self.shuffled.len() {
            let idx = self.shuffled[self.cursor];
            self.cursor += 1;
            let key = self.pool[idx].key().to_string();
            if self.shown.insert(key) {
                return Some(idx);
            }
        }
        None
    }

    fn should_reshuffle(&self, force_reload: bool) -> bool {
        force_reload || self.shuffled.is_empty() || self.shown.len() >= self.pool.len()
    }

    /// Repopulate the grid in one pass over cells 0..grid_size.
    ///
    /// Reshuffles first when forced, when no shuffled order exists yet, or
    /// when every pool identity was already dispensed this cycle. Pinned
    /// cells with content are skipped. Once the order runs dry mid-pass the
    /// remaining unpinned cells are cleared; there is no second automatic
    /// reshuffle within one call.
    pub fn refresh_grid(&mut self, force_reload: bool) -> Vec<CellUpdate> {
        let mut updates = Vec::with_capacity(self.cells.len());
        if self.pool.is_empty() {
            info!("clip pool is empty; clearing unpinned cells");
            for cell in 0..self.cells.len() {
                if self.pinned[cell] && self.cells[cell].is_some() {
                    continue;
                }
                self.clear_cell(cell);
                updates.push(CellUpdate {
                    cell,
                    assignment: None,
                });
            }
            return updates;
        }

        if self.should_reshuffle(force_reload) {
            self.reshuffle();
        }

        for cell in 0..self.cells.len() {
            if self.pinned[cell] && self.cells[cell].is_some() {
                continue;
            }
            match self.next_unshown_index() {
                Some(idx) => {
                    let item = self.pool[idx].clone();
                    let assignment = self.assign_cell(cell, &item);
                    updates.push(CellUpdate {
                        cell,
                        assignment: Some(assignment),
                    });
                }
                None => {
                    self.clear_cell(cell);
                    updates.push(CellUpdate {
                        cell,
                        assignment: None,
                    });
                }
            }
        }
        updates
    }

    fn assign_cell(&mut self, cell: usize, item: &PoolItem) -> CellAssignment {
        self.clear_cell(cell);
        let playable = self.handles.create(item);
        let assignment = CellAssignment {
            key: item.key().to_string(),
            uri: playable.uri().to_string(),
        };
        self.cells[cell] = Some(CellContent {
            key: item.key().to_string(),
            playable,
        });
        assignment
    }

    fn clear_cell(&mut self, cell: usize) {
        if let Some(content) = self.cells[cell].take() {
            self.handles.revoke(&content.playable);
        }
    }

    pub fn set_pinned(&mut self, cell: usize, pinned: bool) {
        match self.pinned.get_mut(cell) {
            Some(slot) => *slot = pinned,
            None => warn!(cell, "pin request for cell outside the grid"),
        }
    }

    pub fn toggle_pinned(&mut self, cell: usize) {
        match self.pinned.get(cell).copied() {
            Some(current) => self.pinned[cell] = !current,
            None => warn!(cell, "pin toggle for cell outside the grid"),
        }
    }

    /// Resize the grid, keeping existing pins and contents by index. New
    /// slots start unpinned and empty; cells dropped by a shrink release
    /// their handles. Does not repopulate.
    pub fn resize_grid(&mut self, new_size: usize) {
        for cell in new_size..self.cells.len() {
            self.clear_cell(cell);
        }
        self.pinned.resize(new_size, false);
        self.cells.resize(new_size, None);
    }

    pub fn grid_size(&self) -> usize {
        self.cells.len()
    }

    pub fn pool_len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_pinned(&self, cell: usize) -> bool {
        self.pinned.get(cell).copied().unwrap_or(false)
    }

    pub fn cell(&self, cell: usize) -> Option<&CellContent> {
        self.cells.get(cell).and_then(|c| c.as_ref())
    }

    pub fn shown_len(&self) -> usize {
        self.shown.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Transient handles currently held by cells. Stays bounded by the grid
    /// size because replaced and cleared cells revoke.
    pub fn live_handles(&self) -> usize {
        self.handles.live_count()
    }
}
