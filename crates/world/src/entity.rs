//! Entities as seen by the lighting engine.
//!
//! Only the state that decides whether and how brightly an entity glows is
//! modelled: where it is, whether it burns, and what it carries.

use lumen_core::{BlockPos, DimensionId, ItemType};
use serde::{Deserialize, Serialize};

/// Stable handle of an entity, unique across dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

/// Projectiles the engine knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectileKind {
    Arrow,
    /// Arrow carrying a lit torch.
    TorchArrow,
}

/// What an entity is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Mob,
    /// Dropped item stack.
    Item { stack: ItemType },
    ItemFrame { item: Option<ItemType> },
    FurnaceMinecart { fuel_ticks: u32 },
    Player {
        main_hand: Option<ItemType>,
        off_hand: Option<ItemType>,
    },
    Projectile {
        projectile: ProjectileKind,
        in_ground: bool,
    },
}

/// A live entity in some dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub dimension: DimensionId,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Fire ticks remaining (burning while > 0).
    pub fire_ticks: u32,
    pub in_water: bool,
    pub kind: EntityKind,
}

impl Entity {
    pub fn new(
        id: EntityId,
        dimension: DimensionId,
        x: f64,
        y: f64,
        z: f64,
        kind: EntityKind,
    ) -> Self {
        Self {
            id,
            dimension,
            x,
            y,
            z,
            fire_ticks: 0,
            in_water: false,
            kind,
        }
    }

    /// Voxel containing the entity's position.
    pub fn block_pos(&self) -> BlockPos {
        BlockPos::from_world(self.x, self.y, self.z)
    }

    pub fn set_position(&mut self, x: f64, y: f64, z: f64) {
        self.x = x;
        self.y = y;
        self.z = z;
    }

    /// Set the entity on fire; only ever extends the remaining duration.
    pub fn set_on_fire(&mut self, ticks: u32) {
        if ticks > self.fire_ticks {
            self.fire_ticks = ticks;
        }
    }

    pub fn is_burning(&self) -> bool {
        self.fire_ticks > 0
    }

    /// Burn down one tick of fire. Water puts the fire out immediately.
    pub fn update_fire(&mut self) {
        if self.in_water {
            self.fire_ticks = 0;
        } else {
            self.fire_ticks = self.fire_ticks.saturating_sub(1);
        }
    }
}

/// Read access to a world's entity population.
pub trait EntityWorld {
    /// Dimension this world represents.
    fn dimension(&self) -> DimensionId;

    /// Look up a live entity.
    fn entity(&self, id: EntityId) -> Option<&Entity>;

    /// Every entity currently in the world, in a stable order.
    fn entities(&self) -> impl Iterator<Item = &Entity>;

    /// Whether `id` is a live entity of this world.
    fn contains_entity(&self, id: EntityId) -> bool {
        self.entity(id)
            .is_some_and(|entity| entity.dimension == self.dimension())
    }
}
