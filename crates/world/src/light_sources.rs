//! Light-emitting entities: the emitter contract, registrations, and the
//! built-in classifiers that decide which entities glow.
//!
//! A classifier looks at a freshly observed entity and either declines or
//! produces a [`LightSource`]. The registration keeps a boxed [`Emitter`] that
//! re-derives the entity's brightness every tick; an emitter returning `None`
//! marks the registration as expired.

use std::fmt;

use lumen_core::{item, BlockPos, DimensionId};

use crate::entity::{Entity, EntityId, EntityKind, ProjectileKind};
use crate::lighting::MAX_LIGHT_LEVEL;

/// Light emitted by anything on fire.
pub const FIRE_LIGHT_LEVEL: u8 = 15;

/// Light emitted by a torch arrow in flight.
pub const TORCH_ARROW_LIGHT_LEVEL: u8 = 14;

/// Light emitted by a furnace minecart while it has fuel.
pub const FURNACE_MINECART_LIGHT_LEVEL: u8 = 13;

/// Broad category of a registration, for logs and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceKind {
    LitProjectile,
    BurningCreature,
    BurningItem,
    DroppedItem,
    ItemFrame,
    FurnaceMinecart,
    Player,
    /// Emitter supplied by an external classifier.
    Custom(&'static str),
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::LitProjectile => "lit_projectile",
            SourceKind::BurningCreature => "burning_creature",
            SourceKind::BurningItem => "burning_item",
            SourceKind::DroppedItem => "dropped_item",
            SourceKind::ItemFrame => "item_frame",
            SourceKind::FurnaceMinecart => "furnace_minecart",
            SourceKind::Player => "player",
            SourceKind::Custom(name) => name,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-kind emission behaviour of a tracked entity.
pub trait Emitter: fmt::Debug + Send {
    fn kind(&self) -> SourceKind;

    /// Advance one tick against the live entity and report its light level,
    /// or `None` once the entity no longer emits.
    fn emission(&mut self, entity: &Entity) -> Option<u8>;
}

/// Outcome of advancing a registration by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceState {
    Active,
    Expired,
}

/// A tracked emitter bound to one backing entity.
#[derive(Debug)]
pub struct LightSource {
    entity: EntityId,
    dimension: DimensionId,
    pos: BlockPos,
    recorded_pos: BlockPos,
    level: u8,
    emitter: Box<dyn Emitter>,
}

impl LightSource {
    /// Bind `emitter` to `entity` if it currently emits light.
    pub fn track(entity: &Entity, mut emitter: Box<dyn Emitter>) -> Option<Self> {
        let level = emitter.emission(entity)?;
        let pos = entity.block_pos();
        Some(Self {
            entity: entity.id,
            dimension: entity.dimension,
            pos,
            recorded_pos: pos,
            level: level.min(MAX_LIGHT_LEVEL),
            emitter,
        })
    }

    pub fn entity(&self) -> EntityId {
        self.entity
    }

    /// Dimension the backing entity lived in when registered.
    pub fn dimension(&self) -> DimensionId {
        self.dimension
    }

    pub fn kind(&self) -> SourceKind {
        self.emitter.kind()
    }

    /// Voxel the source currently lights.
    pub fn block_pos(&self) -> BlockPos {
        self.pos
    }

    pub fn light_level(&self) -> u8 {
        self.level
    }

    /// Refresh position and level from the live entity.
    pub fn advance(&mut self, entity: &Entity) -> SourceState {
        debug_assert_eq!(entity.id, self.entity);
        self.pos = entity.block_pos();
        match self.emitter.emission(entity) {
            Some(level) => {
                self.level = level.min(MAX_LIGHT_LEVEL);
                SourceState::Active
            }
            None => SourceState::Expired,
        }
    }

    /// If the source changed voxel since the last call, record the new one
    /// and return the old one.
    pub fn take_moved(&mut self) -> Option<BlockPos> {
        if self.pos == self.recorded_pos {
            return None;
        }
        Some(std::mem::replace(&mut self.recorded_pos, self.pos))
    }
}

/// Decides whether an entity should be tracked as a light source.
pub type Classifier = Box<dyn Fn(&Entity) -> Option<LightSource> + Send + Sync>;

/// Run `classifiers` in order; the first match wins.
pub fn classify(classifiers: &[Classifier], entity: &Entity) -> Option<LightSource> {
    classifiers.iter().find_map(|classifier| classifier(entity))
}

#[derive(Debug)]
pub struct LitProjectile;

impl Emitter for LitProjectile {
    fn kind(&self) -> SourceKind {
        SourceKind::LitProjectile
    }

    fn emission(&mut self, entity: &Entity) -> Option<u8> {
        match entity.kind {
            EntityKind::Projectile {
                projectile: ProjectileKind::TorchArrow,
                in_ground: false,
            } if !entity.in_water => Some(TORCH_ARROW_LIGHT_LEVEL),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct BurningCreature;

impl Emitter for BurningCreature {
    fn kind(&self) -> SourceKind {
        SourceKind::BurningCreature
    }

    fn emission(&mut self, entity: &Entity) -> Option<u8> {
        match entity.kind {
            EntityKind::Mob | EntityKind::Player { .. } if entity.is_burning() => {
                Some(FIRE_LIGHT_LEVEL)
            }
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct BurningItem;

impl Emitter for BurningItem {
    fn kind(&self) -> SourceKind {
        SourceKind::BurningItem
    }

    fn emission(&mut self, entity: &Entity) -> Option<u8> {
        match entity.kind {
            EntityKind::Item { .. } if entity.is_burning() => Some(FIRE_LIGHT_LEVEL),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct DroppedItem;

impl Emitter for DroppedItem {
    fn kind(&self) -> SourceKind {
        SourceKind::DroppedItem
    }

    fn emission(&mut self, entity: &Entity) -> Option<u8> {
        match entity.kind {
            EntityKind::Item { stack } if stack.is_luminous() => Some(stack.light_emission()),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct ItemFrame;

impl Emitter for ItemFrame {
    fn kind(&self) -> SourceKind {
        SourceKind::ItemFrame
    }

    fn emission(&mut self, entity: &Entity) -> Option<u8> {
        match entity.kind {
            EntityKind::ItemFrame { item: Some(item) } if item.is_luminous() => {
                Some(item.light_emission())
            }
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct FurnaceMinecart;

impl Emitter for FurnaceMinecart {
    fn kind(&self) -> SourceKind {
        SourceKind::FurnaceMinecart
    }

    fn emission(&mut self, entity: &Entity) -> Option<u8> {
        match entity.kind {
            EntityKind::FurnaceMinecart { fuel_ticks } if fuel_ticks > 0 => {
                Some(FURNACE_MINECART_LIGHT_LEVEL)
            }
            _ => None,
        }
    }
}

/// Player holding a glowing item in either hand.
#[derive(Debug)]
pub struct HeldLight;

impl Emitter for HeldLight {
    fn kind(&self) -> SourceKind {
        SourceKind::Player
    }

    fn emission(&mut self, entity: &Entity) -> Option<u8> {
        match entity.kind {
            EntityKind::Player {
                main_hand,
                off_hand,
            } => Some(item::brightest([main_hand, off_hand])).filter(|&level| level > 0),
            _ => None,
        }
    }
}

fn classifier<E>(make: fn() -> E) -> Classifier
where
    E: Emitter + 'static,
{
    Box::new(move |entity: &Entity| LightSource::track(entity, Box::new(make())))
}

/// Built-in classifiers in priority order.
pub fn builtin_classifiers() -> Vec<Classifier> {
    vec![
        classifier(|| LitProjectile),
        classifier(|| BurningCreature),
        classifier(|| BurningItem),
        classifier(|| DroppedItem),
        classifier(|| ItemFrame),
        classifier(|| FurnaceMinecart),
        classifier(|| HeldLight),
    ]
}

/// Classifiers run when the host reports a newly joined entity.
pub fn default_join_classifiers() -> Vec<Classifier> {
    builtin_classifiers()
}

/// Classifiers run by the per-tick discovery scan.
pub fn default_update_classifiers() -> Vec<Classifier> {
    builtin_classifiers()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::ItemType;

    fn entity(kind: EntityKind) -> Entity {
        Entity::new(EntityId(7), DimensionId::Overworld, 1.5, 70.2, -3.5, kind)
    }

    fn torch_arrow() -> Entity {
        entity(EntityKind::Projectile {
            projectile: ProjectileKind::TorchArrow,
            in_ground: false,
        })
    }

    #[test]
    fn track_declines_non_emitting_entities() {
        assert!(LightSource::track(&entity(EntityKind::Mob), Box::new(BurningCreature)).is_none());
        let plain_arrow = entity(EntityKind::Projectile {
            projectile: ProjectileKind::Arrow,
            in_ground: false,
        });
        assert!(classify(&builtin_classifiers(), &plain_arrow).is_none());
    }

    #[test]
    fn torch_arrow_lights_until_it_lands() {
        let mut arrow = torch_arrow();
        let mut source = LightSource::track(&arrow, Box::new(LitProjectile)).unwrap();
        assert_eq!(source.light_level(), TORCH_ARROW_LIGHT_LEVEL);
        assert_eq!(source.block_pos(), BlockPos::new(1, 70, -4));
        assert_eq!(source.kind(), SourceKind::LitProjectile);

        arrow.x += 2.0;
        assert_eq!(source.advance(&arrow), SourceState::Active);

        arrow.kind = EntityKind::Projectile {
            projectile: ProjectileKind::TorchArrow,
            in_ground: true,
        };
        assert_eq!(source.advance(&arrow), SourceState::Expired);
    }

    #[test]
    fn torch_arrow_in_water_goes_out() {
        let mut arrow = torch_arrow();
        let mut source = LightSource::track(&arrow, Box::new(LitProjectile)).unwrap();
        arrow.in_water = true;
        assert_eq!(source.advance(&arrow), SourceState::Expired);
    }

    #[test]
    fn take_moved_reports_previous_voxel_once() {
        let mut arrow = torch_arrow();
        let mut source = LightSource::track(&arrow, Box::new(LitProjectile)).unwrap();
        assert_eq!(source.take_moved(), None);

        // Moving inside the same voxel is not a move.
        arrow.x = 1.9;
        source.advance(&arrow);
        assert_eq!(source.take_moved(), None);

        arrow.x = 3.1;
        source.advance(&arrow);
        assert_eq!(source.take_moved(), Some(BlockPos::new(1, 70, -4)));
        assert_eq!(source.take_moved(), None);
        assert_eq!(source.block_pos(), BlockPos::new(3, 70, -4));
    }

    #[test]
    fn burning_creature_expires_when_fire_goes_out() {
        let mut mob = entity(EntityKind::Mob);
        mob.set_on_fire(1);
        let mut source = classify(&builtin_classifiers(), &mob).unwrap();
        assert_eq!(source.kind(), SourceKind::BurningCreature);
        assert_eq!(source.light_level(), FIRE_LIGHT_LEVEL);

        mob.update_fire();
        assert_eq!(source.advance(&mob), SourceState::Expired);
    }

    #[test]
    fn burning_item_wins_over_dropped_item() {
        let mut torch = entity(EntityKind::Item {
            stack: ItemType::Torch,
        });
        assert_eq!(
            classify(&builtin_classifiers(), &torch).unwrap().kind(),
            SourceKind::DroppedItem
        );
        torch.set_on_fire(20);
        let source = classify(&builtin_classifiers(), &torch).unwrap();
        assert_eq!(source.kind(), SourceKind::BurningItem);
        assert_eq!(source.light_level(), FIRE_LIGHT_LEVEL);
    }

    #[test]
    fn dropped_item_uses_item_emission() {
        let redstone = entity(EntityKind::Item {
            stack: ItemType::RedstoneTorch,
        });
        let source = classify(&builtin_classifiers(), &redstone).unwrap();
        assert_eq!(source.light_level(), 7);
        assert!(classify(
            &builtin_classifiers(),
            &entity(EntityKind::Item {
                stack: ItemType::Other(12)
            })
        )
        .is_none());
    }

    #[test]
    fn item_frame_expires_when_emptied() {
        let mut frame = entity(EntityKind::ItemFrame {
            item: Some(ItemType::Lantern),
        });
        let mut source = classify(&builtin_classifiers(), &frame).unwrap();
        assert_eq!(source.kind(), SourceKind::ItemFrame);
        assert_eq!(source.light_level(), 15);

        frame.kind = EntityKind::ItemFrame { item: None };
        assert_eq!(source.advance(&frame), SourceState::Expired);
    }

    #[test]
    fn furnace_minecart_expires_without_fuel() {
        let mut cart = entity(EntityKind::FurnaceMinecart { fuel_ticks: 100 });
        let mut source = classify(&builtin_classifiers(), &cart).unwrap();
        assert_eq!(source.light_level(), FURNACE_MINECART_LIGHT_LEVEL);

        cart.kind = EntityKind::FurnaceMinecart { fuel_ticks: 0 };
        assert_eq!(source.advance(&cart), SourceState::Expired);
    }

    #[test]
    fn player_level_follows_hands() {
        let mut player = entity(EntityKind::Player {
            main_hand: Some(ItemType::RedstoneTorch),
            off_hand: None,
        });
        let mut source = classify(&builtin_classifiers(), &player).unwrap();
        assert_eq!(source.kind(), SourceKind::Player);
        assert_eq!(source.light_level(), 7);

        player.kind = EntityKind::Player {
            main_hand: Some(ItemType::RedstoneTorch),
            off_hand: Some(ItemType::Torch),
        };
        assert_eq!(source.advance(&player), SourceState::Active);
        assert_eq!(source.light_level(), 14);

        player.kind = EntityKind::Player {
            main_hand: None,
            off_hand: None,
        };
        assert_eq!(source.advance(&player), SourceState::Expired);
    }

    #[test]
    fn burning_player_counts_as_burning_creature() {
        let mut player = entity(EntityKind::Player {
            main_hand: Some(ItemType::Torch),
            off_hand: None,
        });
        player.set_on_fire(5);
        let source = classify(&builtin_classifiers(), &player).unwrap();
        assert_eq!(source.kind(), SourceKind::BurningCreature);
    }

    #[test]
    fn source_kind_labels() {
        assert_eq!(SourceKind::LitProjectile.to_string(), "lit_projectile");
        assert_eq!(SourceKind::Custom("wisp").to_string(), "wisp");
    }
}
