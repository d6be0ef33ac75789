use crate::pool::PoolItem;

#[derive(Debug)]
pub enum PoolEvent {
    /// The user selected a new set of clips; all derived shuffle state is invalid.
    Replaced(Vec<PoolItem>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridCommand {
    Refresh { force: bool },
    ToggleAutoShuffle,
    SetPinned { cell: usize, pinned: bool },
    TogglePinned { cell: usize },
    GrowGrid,
    ShrinkGrid,
}

/// A playable reference handed to the presentation surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellAssignment {
    pub key: String,
    pub uri: String,
}

/// One cell's new content; `None` means "clear this cell".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellUpdate {
    pub cell: usize,
    pub assignment: Option<CellAssignment>,
}
