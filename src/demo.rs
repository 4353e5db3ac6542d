//! Headless scenario that exercises the lighting registry.
//!
//! A small stone arena is populated with every built-in emitter kind:
//! torch arrows are fired and land, burning mobs wander until the fire
//! dies, players walk in circles swapping what they hold, and furnace
//! minecarts roll until their fuel runs out. All randomness is derived from
//! the configured seed, so two runs with the same config are identical.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use anyhow::Result;
use lumen_core::{scoped_rng, BlockPos, ItemType, SimTick};
use lumen_testkit::{EventRecord, JsonlSink};
use lumen_world::{
    BlockId, BlockTable, EntityId, EntityKind, EntityLighting, EntityWorld, LightingStats,
    ProjectileKind, TickPhase, TickSummary, VoxelWorld,
};
use rand::Rng;
use tracing::{debug, info, warn};

use crate::config::DemoConfig;

const ARENA_RADIUS: i32 = 24;
const ARROW_LAUNCH_INTERVAL: u64 = 25;
const ARROW_DESPAWN_TICKS: u64 = 40;
const PLAYER_SWAP_INTERVAL: u64 = 60;
const PLAYER_ORBIT_CENTER: (f64, f64) = (14.0, -14.0);
const PLAYER_ORBIT_RADIUS: f64 = 6.0;
const GRAVITY: f64 = 0.05;

/// Outcome of a demo run.
#[derive(Debug, Clone)]
pub struct DemoReport {
    pub ticks: u64,
    pub stats: LightingStats,
    pub active_sources: usize,
    pub by_kind: BTreeMap<String, usize>,
    /// Chunk light updates a renderer would have to remesh.
    pub dirty_chunks: usize,
    pub elapsed: Duration,
}

struct Projectile {
    id: EntityId,
    velocity: [f64; 3],
    landed_at: Option<SimTick>,
}

struct Demo {
    cfg: DemoConfig,
    world: VoxelWorld,
    lighting: EntityLighting,
    water: Option<BlockId>,
    projectiles: Vec<Projectile>,
    mobs: Vec<EntityId>,
    players: Vec<EntityId>,
    carts: Vec<EntityId>,
    arrows_launched: usize,
    tick: SimTick,
    events: Option<JsonlSink>,
    dirty_chunks: usize,
}

/// Run the configured scenario to completion.
pub fn run(cfg: DemoConfig, blocks: BlockTable) -> Result<DemoReport> {
    let started = Instant::now();
    let mut demo = Demo::new(cfg, blocks)?;
    demo.spawn_initial()?;
    for _ in 0..demo.cfg.ticks {
        demo.step()?;
    }
    demo.finish(started.elapsed())
}

impl Demo {
    fn new(cfg: DemoConfig, blocks: BlockTable) -> Result<Self> {
        let events = cfg
            .event_log_path
            .as_ref()
            .map(JsonlSink::create)
            .transpose()?;
        let water = blocks.id_by_name("water");
        let mut demo = Self {
            world: VoxelWorld::new(cfg.dimension, blocks),
            cfg,
            lighting: EntityLighting::new(),
            water,
            projectiles: Vec::new(),
            mobs: Vec::new(),
            players: Vec::new(),
            carts: Vec::new(),
            arrows_launched: 0,
            tick: SimTick::ZERO,
            events,
            dirty_chunks: 0,
        };
        demo.build_arena();
        Ok(demo)
    }

    fn build_arena(&mut self) {
        let floor = self.cfg.floor_y;
        let table = self.world.blocks();
        let stone = table.id_by_name("stone");
        let glass = table.id_by_name("glass");
        let leaves = table.id_by_name("leaves");

        match stone {
            Some(stone) => {
                for x in -ARENA_RADIUS..ARENA_RADIUS {
                    for z in -ARENA_RADIUS..ARENA_RADIUS {
                        self.world.set_block(BlockPos::new(x, floor, z), stone);
                    }
                }
                // A solid wall splitting the arena.
                for z in -6..=6 {
                    for y in 1..=3 {
                        self.world.set_block(BlockPos::new(-4, floor + y, z), stone);
                    }
                }
            }
            None => warn!("block table has no \"stone\"; arena has no floor"),
        }
        if let Some(glass) = glass {
            for z in -6..=6 {
                for y in 1..=3 {
                    self.world.set_block(BlockPos::new(8, floor + y, z), glass);
                }
            }
        }
        if let Some(leaves) = leaves {
            for x in 12..16 {
                for z in 12..16 {
                    self.world.set_block(BlockPos::new(x, floor + 1, z), leaves);
                }
            }
        }
        if let Some(water) = self.water {
            for x in -12..-8 {
                for z in -12..-8 {
                    self.world.set_block(BlockPos::new(x, floor + 1, z), water);
                }
            }
        }
        // Block edits above are not lit by the registry.
        self.world.take_dirty_chunks();
    }

    fn spawn_initial(&mut self) -> Result<()> {
        let floor = self.cfg.floor_y as f64 + 1.0;
        let seed = self.cfg.seed;

        for i in 0..self.cfg.dropped_torches {
            let mut rng = scoped_rng(seed, 0x1000 + i as u64, SimTick::ZERO);
            let (x, z) = arena_point(&mut rng);
            let id = self.world.spawn(
                x,
                floor,
                z,
                EntityKind::Item {
                    stack: ItemType::Torch,
                },
            );
            self.join(id)?;
        }

        for i in 0..self.cfg.burning_mobs {
            let mut rng = scoped_rng(seed, 0x2000 + i as u64, SimTick::ZERO);
            let (x, z) = arena_point(&mut rng);
            let id = self.world.spawn(x, floor, z, EntityKind::Mob);
            if let Some(mob) = self.world.entity_mut(id) {
                mob.set_on_fire(rng.gen_range(60..160));
            }
            self.mobs.push(id);
            self.join(id)?;
        }

        for _ in 0..self.cfg.torch_players {
            let (x, z) = PLAYER_ORBIT_CENTER;
            let id = self.world.spawn(
                x + PLAYER_ORBIT_RADIUS,
                floor,
                z,
                EntityKind::Player {
                    main_hand: Some(ItemType::Torch),
                    off_hand: None,
                },
            );
            self.players.push(id);
            self.join(id)?;
        }

        for i in 0..self.cfg.furnace_minecarts {
            let mut rng = scoped_rng(seed, 0x3000 + i as u64, SimTick::ZERO);
            let z = rng.gen_range(-ARENA_RADIUS + 2..ARENA_RADIUS - 2) as f64 + 0.5;
            let id = self.world.spawn(
                -(ARENA_RADIUS as f64) + 0.5,
                floor,
                z,
                EntityKind::FurnaceMinecart {
                    fuel_ticks: rng.gen_range(60..160),
                },
            );
            self.carts.push(id);
            self.join(id)?;
        }
        Ok(())
    }

    fn step(&mut self) -> Result<()> {
        self.lighting.tick(Some(&mut self.world), TickPhase::Start);

        self.launch_arrows()?;
        self.move_projectiles();
        self.move_mobs();
        self.move_players();
        self.move_carts();

        let summary = self.lighting.tick(Some(&mut self.world), TickPhase::End);
        self.dirty_chunks += self.world.take_dirty_chunks().len();
        self.record(summary)?;
        self.tick = self.tick.advance(1);
        Ok(())
    }

    fn join(&mut self, id: EntityId) -> Result<()> {
        if !self.lighting.on_entity_joined(&mut self.world, id) {
            return Ok(());
        }
        let Some(entity) = self.world.entity(id) else {
            return Ok(());
        };
        let payload = format!("entity={} pos={}", id.0, entity.block_pos());
        self.emit("source_joined", &payload)
    }

    fn launch_arrows(&mut self) -> Result<()> {
        if self.arrows_launched >= self.cfg.torch_arrows
            || self.tick.0 % ARROW_LAUNCH_INTERVAL != 0
        {
            return Ok(());
        }
        let arrow_hash = 0x4000 + self.arrows_launched as u64;
        let mut rng = scoped_rng(self.cfg.seed, arrow_hash, self.tick);
        let (x, z) = arena_point(&mut rng);
        let id = self.world.spawn(
            x,
            self.cfg.floor_y as f64 + 6.0,
            z,
            EntityKind::Projectile {
                projectile: ProjectileKind::TorchArrow,
                in_ground: false,
            },
        );
        self.projectiles.push(Projectile {
            id,
            velocity: [rng.gen_range(-0.4..0.4), 0.3, rng.gen_range(-0.4..0.4)],
            landed_at: None,
        });
        self.arrows_launched += 1;
        self.join(id)
    }

    fn move_projectiles(&mut self) {
        let ground = self.cfg.floor_y as f64 + 1.0;
        let tick = self.tick;
        let mut despawned = Vec::new();

        for projectile in &mut self.projectiles {
            if let Some(landed) = projectile.landed_at {
                if tick.0 - landed.0 >= ARROW_DESPAWN_TICKS {
                    despawned.push(projectile.id);
                }
                continue;
            }
            let Some(arrow) = self.world.entity(projectile.id) else {
                continue;
            };
            projectile.velocity[1] -= GRAVITY;
            let [vx, vy, vz] = projectile.velocity;
            let (x, y, z) = (arrow.x + vx, (arrow.y + vy).max(ground), arrow.z + vz);
            let landed = y <= ground;
            let in_water = self
                .water
                .is_some_and(|water| self.world.block(BlockPos::from_world(x, y, z)) == water);

            if let Some(arrow) = self.world.entity_mut(projectile.id) {
                arrow.set_position(x, y, z);
                arrow.in_water = in_water;
                if landed {
                    arrow.kind = EntityKind::Projectile {
                        projectile: ProjectileKind::TorchArrow,
                        in_ground: true,
                    };
                    projectile.landed_at = Some(tick);
                }
            }
        }

        for id in despawned {
            self.world.despawn(id);
            self.projectiles.retain(|p| p.id != id);
            debug!(entity = id.0, "arrow despawned");
        }
    }

    fn move_mobs(&mut self) {
        for &id in &self.mobs {
            let mut rng = scoped_rng(self.cfg.seed, id.0, self.tick);
            let Some(mob) = self.world.entity_mut(id) else {
                continue;
            };
            let x = clamp_to_arena(mob.x + rng.gen_range(-0.3..0.3));
            let z = clamp_to_arena(mob.z + rng.gen_range(-0.3..0.3));
            mob.set_position(x, mob.y, z);
            mob.update_fire();
        }
    }

    fn move_players(&mut self) {
        let swap = self.tick.0 > 0 && self.tick.0 % PLAYER_SWAP_INTERVAL == 0;
        for (index, &id) in self.players.iter().enumerate() {
            let Some(player) = self.world.entity_mut(id) else {
                continue;
            };
            let angle = self.tick.0 as f64 * 0.05 + index as f64;
            let (x, z) = PLAYER_ORBIT_CENTER;
            player.set_position(
                x + PLAYER_ORBIT_RADIUS * angle.cos(),
                player.y,
                z + PLAYER_ORBIT_RADIUS * angle.sin(),
            );
            if swap {
                if let EntityKind::Player { off_hand, .. } = &mut player.kind {
                    *off_hand = if off_hand.is_some() {
                        None
                    } else {
                        Some(ItemType::Glowstone)
                    };
                }
            }
        }
    }

    fn move_carts(&mut self) {
        for &id in &self.carts {
            let Some(cart) = self.world.entity_mut(id) else {
                continue;
            };
            if let EntityKind::FurnaceMinecart { fuel_ticks } = &mut cart.kind {
                if *fuel_ticks == 0 {
                    continue;
                }
                *fuel_ticks -= 1;
                let mut x = cart.x + 0.3;
                if x >= ARENA_RADIUS as f64 {
                    x = -(ARENA_RADIUS as f64) + 0.5;
                }
                cart.set_position(x, cart.y, cart.z);
            }
        }
    }

    fn record(&mut self, summary: TickSummary) -> Result<()> {
        let churn =
            summary.discovered + summary.expired + summary.despawned + summary.foreign_dropped;
        if churn == 0 {
            return Ok(());
        }
        debug!(tick = self.tick.0, ?summary, "lighting churn");
        let payload = format!(
            "discovered={} expired={} despawned={} foreign_dropped={} active={}",
            summary.discovered,
            summary.expired,
            summary.despawned,
            summary.foreign_dropped,
            self.lighting.len()
        );
        self.emit("sources_changed", &payload)
    }

    fn emit(&mut self, kind: &str, payload: &str) -> Result<()> {
        if let Some(sink) = self.events.as_mut() {
            sink.write(&EventRecord {
                tick: self.tick,
                kind,
                payload,
            })?;
        }
        Ok(())
    }

    fn finish(mut self, elapsed: Duration) -> Result<DemoReport> {
        let stats = self.lighting.stats();
        let payload = format!(
            "ticks={} added={} expired={} recomputes={}",
            self.tick.0, stats.sources_added, stats.sources_expired, stats.recomputes
        );
        self.emit("run_complete", &payload)?;
        if let Some(sink) = self.events.as_mut() {
            sink.flush()?;
        }

        let mut by_kind = BTreeMap::new();
        for source in self.lighting.sources() {
            *by_kind.entry(source.kind().to_string()).or_insert(0) += 1;
        }
        info!(
            ticks = self.tick.0,
            active = self.lighting.len(),
            entities = self.world.entity_count(),
            "demo finished"
        );
        Ok(DemoReport {
            ticks: self.tick.0,
            stats,
            active_sources: self.lighting.len(),
            by_kind,
            dirty_chunks: self.dirty_chunks,
            elapsed,
        })
    }
}

fn arena_point<R: Rng>(rng: &mut R) -> (f64, f64) {
    let x = rng.gen_range(-ARENA_RADIUS + 2..ARENA_RADIUS - 2) as f64 + 0.5;
    let z = rng.gen_range(-ARENA_RADIUS + 2..ARENA_RADIUS - 2) as f64 + 0.5;
    (x, z)
}

fn clamp_to_arena(value: f64) -> f64 {
    value.clamp(-(ARENA_RADIUS as f64) + 0.5, ARENA_RADIUS as f64 - 0.5)
}
