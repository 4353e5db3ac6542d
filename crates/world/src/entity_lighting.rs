//! Registry of light-emitting entities for the active world.
//!
//! The host drives the registry from its tick loop and from its entity-join
//! hook. Each tick the registry prunes registrations whose entity is gone or
//! has stopped glowing, discovers new emitters among the entity population,
//! and relights around every source that moved or changed brightness.

use std::collections::HashSet;

use lumen_core::{BlockPos, DimensionId};
use tracing::debug;

use crate::entity::{EntityId, EntityWorld};
use crate::light_sources::{
    classify, default_join_classifiers, default_update_classifiers, Classifier, LightSource,
    SourceState,
};
use crate::lighting::{LightPropagator, LightStore, LightType, LightUpdate, MIN_LIGHT_LEVEL};

/// A world the registry can both observe and relight.
pub trait LightWorld: LightStore + EntityWorld {}

impl<T> LightWorld for T where T: LightStore + EntityWorld {}

/// Host tick boundary the registry is called at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickPhase {
    Start,
    End,
}

/// What one registry tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Registrations dropped because they belong to another dimension.
    pub foreign_dropped: usize,
    /// Registrations dropped because their entity left the world.
    pub despawned: usize,
    pub expired: usize,
    pub discovered: usize,
    /// Sources that changed voxel since the previous tick.
    pub moved: usize,
    pub recomputes: usize,
    /// Block-light writes across this tick's recomputes.
    pub writes: usize,
}

/// Cumulative counters over the registry's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LightingStats {
    pub ticks: u64,
    pub sources_added: u64,
    pub sources_removed: u64,
    pub sources_expired: u64,
    pub recomputes: u64,
    pub nodes_processed: u64,
    pub writes: u64,
    /// Largest single recompute, in queue pops.
    pub max_nodes_per_recompute: u64,
}

impl LightingStats {
    fn record(&mut self, update: &LightUpdate) {
        self.recomputes += 1;
        self.nodes_processed += update.nodes_processed as u64;
        self.writes += update.writes as u64;
        self.max_nodes_per_recompute = self
            .max_nodes_per_recompute
            .max(update.nodes_processed as u64);
    }
}

/// Highest level among `sources` of `dimension` sitting at `pos`.
fn contribution(sources: &[LightSource], dimension: DimensionId, pos: BlockPos) -> u8 {
    sources
        .iter()
        .filter(|source| source.dimension() == dimension && source.block_pos() == pos)
        .map(LightSource::light_level)
        .max()
        .unwrap_or(MIN_LIGHT_LEVEL)
}

/// Tracks light-emitting entities and keeps their block light current.
pub struct EntityLighting {
    sources: Vec<LightSource>,
    tracked: HashSet<EntityId>,
    propagator: LightPropagator,
    join_classifiers: Vec<Classifier>,
    update_classifiers: Vec<Classifier>,
    active: Option<DimensionId>,
    stats: LightingStats,
}

impl EntityLighting {
    /// Registry with the built-in classifiers installed.
    pub fn new() -> Self {
        Self::with_classifiers(default_join_classifiers(), default_update_classifiers())
    }

    pub fn with_classifiers(join: Vec<Classifier>, update: Vec<Classifier>) -> Self {
        Self {
            sources: Vec::new(),
            tracked: HashSet::new(),
            propagator: LightPropagator::new(),
            join_classifiers: join,
            update_classifiers: update,
            active: None,
            stats: LightingStats::default(),
        }
    }

    /// Append a classifier consulted when an entity joins the world.
    pub fn register_join_classifier(&mut self, classifier: Classifier) {
        self.join_classifiers.push(classifier);
    }

    /// Append a classifier consulted by the per-tick discovery scan.
    pub fn register_update_classifier(&mut self, classifier: Classifier) {
        self.update_classifiers.push(classifier);
    }

    /// Start tracking `source` and light its voxel.
    ///
    /// Returns `false` if the entity is already tracked or does not live in
    /// `world`.
    pub fn add<W: LightWorld>(&mut self, world: &mut W, source: LightSource) -> bool {
        let dimension = self.enter(world);
        if self.tracked.contains(&source.entity()) {
            return false;
        }
        if source.dimension() != dimension || !world.contains_entity(source.entity()) {
            return false;
        }

        let pos = source.block_pos();
        debug!(
            entity = source.entity().0,
            kind = %source.kind(),
            level = source.light_level(),
            pos = %pos,
            "light source added"
        );
        self.tracked.insert(source.entity());
        self.sources.push(source);
        self.stats.sources_added += 1;
        self.relight(world, dimension, pos);
        true
    }

    /// Stop tracking `entity` and darken around its last position.
    pub fn remove<W: LightWorld>(&mut self, world: &mut W, entity: EntityId) -> bool {
        let dimension = self.enter(world);
        let Some(index) = self.sources.iter().position(|s| s.entity() == entity) else {
            return false;
        };
        let source = self.sources.remove(index);
        self.tracked.remove(&entity);
        self.stats.sources_removed += 1;
        debug!(
            entity = entity.0,
            kind = %source.kind(),
            pos = %source.block_pos(),
            "light source removed"
        );
        self.relight(world, dimension, source.block_pos());
        true
    }

    /// Host hook for an entity entering the world.
    ///
    /// The first join classifier that matches decides the registration.
    pub fn on_entity_joined<W: LightWorld>(
        &mut self,
        world: &mut W,
        entity: EntityId,
    ) -> bool {
        let dimension = self.enter(world);
        if self.tracked.contains(&entity) {
            return false;
        }
        let source = match world.entity(entity) {
            Some(entity) if entity.dimension == dimension => {
                classify(&self.join_classifiers, entity)
            }
            _ => None,
        };
        match source {
            Some(source) => self.add(world, source),
            None => false,
        }
    }

    /// Per-tick maintenance; only runs at [`TickPhase::End`] with a world loaded.
    pub fn tick<W: LightWorld>(
        &mut self,
        world: Option<&mut W>,
        phase: TickPhase,
    ) -> TickSummary {
        let mut summary = TickSummary::default();
        if phase == TickPhase::Start {
            return summary;
        }
        let Some(world) = world else {
            return summary;
        };
        self.stats.ticks += 1;
        let recomputes_before = self.stats.recomputes;
        let writes_before = self.stats.writes;

        let dimension = world.dimension();
        self.active = Some(dimension);
        summary.foreign_dropped = self.drop_foreign(dimension);
        self.prune(world, dimension, &mut summary);
        self.discover(world, dimension, &mut summary);
        self.relight_changed(world, dimension, &mut summary);

        summary.recomputes = (self.stats.recomputes - recomputes_before) as usize;
        summary.writes = (self.stats.writes - writes_before) as usize;
        summary
    }

    fn prune<W: LightWorld>(
        &mut self,
        world: &mut W,
        dimension: DimensionId,
        summary: &mut TickSummary,
    ) {
        let mut darkened = Vec::new();
        let view: &W = world;
        let tracked = &mut self.tracked;
        let stats = &mut self.stats;

        self.sources.retain_mut(|source| {
            let live = view
                .entity(source.entity())
                .filter(|entity| entity.dimension == dimension);
            let Some(entity) = live else {
                debug!(
                    entity = source.entity().0,
                    kind = %source.kind(),
                    "light source left the world"
                );
                darkened.push(source.block_pos());
                tracked.remove(&source.entity());
                stats.sources_removed += 1;
                summary.despawned += 1;
                return false;
            };
            match source.advance(entity) {
                SourceState::Active => true,
                SourceState::Expired => {
                    debug!(
                        entity = source.entity().0,
                        kind = %source.kind(),
                        "light source expired"
                    );
                    darkened.push(source.block_pos());
                    // A source can move and go out on the same tick.
                    if let Some(previous) = source.take_moved() {
                        darkened.push(previous);
                    }
                    tracked.remove(&source.entity());
                    stats.sources_expired += 1;
                    summary.expired += 1;
                    false
                }
            }
        });

        for pos in darkened {
            self.relight(world, dimension, pos);
        }
    }

    fn discover<W: LightWorld>(
        &mut self,
        world: &mut W,
        dimension: DimensionId,
        summary: &mut TickSummary,
    ) {
        let found: Vec<LightSource> = world
            .entities()
            .filter(|entity| entity.dimension == dimension && !self.tracked.contains(&entity.id))
            .filter_map(|entity| classify(&self.update_classifiers, entity))
            .collect();
        for source in found {
            if self.add(world, source) {
                summary.discovered += 1;
            }
        }
    }

    fn relight_changed<W: LightWorld>(
        &mut self,
        world: &mut W,
        dimension: DimensionId,
        summary: &mut TickSummary,
    ) {
        for index in 0..self.sources.len() {
            let source = &mut self.sources[index];
            let pos = source.block_pos();
            if let Some(previous) = source.take_moved() {
                summary.moved += 1;
                self.relight(world, dimension, pos);
                self.relight(world, dimension, previous);
            } else if source.light_level() != world.light(LightType::BlockLight, pos) {
                self.relight(world, dimension, pos);
            }
        }
    }

    /// Light the registry's sources contribute at `pos` in the active world.
    pub fn light_contribution_at(&self, pos: BlockPos) -> u8 {
        match self.active {
            Some(dimension) => contribution(&self.sources, dimension, pos),
            None => MIN_LIGHT_LEVEL,
        }
    }

    /// Recompute block light around `pos` using the tracked sources as emitters.
    pub fn recompute<W: LightWorld>(&mut self, world: &mut W, pos: BlockPos) -> LightUpdate {
        let dimension = self.enter(world);
        self.relight(world, dimension, pos)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn is_tracked(&self, entity: EntityId) -> bool {
        self.tracked.contains(&entity)
    }

    /// Current registrations, in registration order.
    pub fn sources(&self) -> &[LightSource] {
        &self.sources
    }

    pub fn stats(&self) -> LightingStats {
        self.stats
    }

    /// Make `world` the active world.
    fn enter<W: EntityWorld>(&mut self, world: &W) -> DimensionId {
        let dimension = world.dimension();
        self.active = Some(dimension);
        self.drop_foreign(dimension);
        dimension
    }

    /// Drop registrations from any dimension but `dimension` without
    /// touching light. Returns how many were dropped.
    fn drop_foreign(&mut self, dimension: DimensionId) -> usize {
        let before = self.sources.len();
        let tracked = &mut self.tracked;
        self.sources.retain(|source| {
            let keep = source.dimension() == dimension;
            if !keep {
                tracked.remove(&source.entity());
            }
            keep
        });
        let dropped = before - self.sources.len();
        if dropped > 0 {
            debug!(%dimension, dropped, "dropped light sources from other dimensions");
        }
        dropped
    }

    fn relight<W: LightWorld>(
        &mut self,
        world: &mut W,
        dimension: DimensionId,
        pos: BlockPos,
    ) -> LightUpdate {
        let sources = &self.sources;
        let update = self
            .propagator
            .recompute(world, pos, |at| contribution(sources, dimension, at));
        self.stats.record(&update);
        update
    }
}

impl Default for EntityLighting {
    fn default() -> Self {
        Self::new()
    }
}
