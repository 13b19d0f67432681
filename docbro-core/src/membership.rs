//! ABOUTME: Shelf-Box membership — an unordered many-to-many relation

use serde::{Deserialize, Serialize};

use crate::ids::{BoxId, ShelfId};

/// A single `(shelf, box)` membership row. Membership carries no ordering
/// (spec §3) and a box may belong to multiple shelves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub shelf_id: ShelfId,
    pub box_id: BoxId,
}

impl Membership {
    #[must_use]
    pub fn new(shelf_id: ShelfId, box_id: BoxId) -> Self {
        Self { shelf_id, box_id }
    }
}
