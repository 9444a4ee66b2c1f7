//! Scripted homesteader for headless runs.
//!
//! Without a player at the keyboard the engine still needs someone to issue
//! commands, otherwise a run only generates terrain. The [`Homesteader`]
//! plays a fixed routine once per step: collect what is ready, keep a few
//! fields planted, keep a small flock of laying hens, pickle the harvest,
//! fire bricks, and raise a temple once the top level is reached. When no
//! building site is in sight it walks east a chunk at a time.
//!
//! Every command goes through the public `Simulation` surface, so a
//! rejected command changes nothing and the routine simply tries again
//! next step.

use homestead_core::Simulation;
use homestead_economy::defaults::ids;
use homestead_types::{BuildingType, CHUNK_SIZE, TerrainType, TileCoord};
use tracing::{debug, info};

/// Tiles around the player the homesteader will work.
pub const DEFAULT_WORK_RADIUS: u32 = 6;

/// Fields kept under cultivation; replanting is cheaper than tilling.
const MAX_PLOTS: usize = 4;

/// Hens kept for eggs.
const MAX_PENS: usize = 4;

/// Bricks a temple needs.
const TEMPLE_BRICKS: u32 = 10;

/// A fixed, deterministic play routine.
#[derive(Debug, Clone)]
pub struct Homesteader {
    work_radius: u32,
    commands_issued: u64,
}

impl Homesteader {
    /// A homesteader working `work_radius` tiles around the player.
    pub const fn new(work_radius: u32) -> Self {
        Self {
            work_radius,
            commands_issued: 0,
        }
    }

    /// Successful commands issued so far.
    pub const fn commands_issued(&self) -> u64 {
        self.commands_issued
    }

    /// Play one step of the routine. Returns how many commands succeeded.
    pub fn act(&mut self, sim: &mut Simulation) -> u64 {
        let mut done: u64 = 0;
        done = done.saturating_add(collect(sim));
        done = done.saturating_add(self.tend_fields(sim));
        done = done.saturating_add(self.tend_pens(sim));
        done = done.saturating_add(preserve(sim));
        done = done.saturating_add(fire_bricks(sim));
        done = done.saturating_add(raise_temple(sim));
        self.commands_issued = self.commands_issued.saturating_add(done);
        done
    }

    fn tend_fields(&self, sim: &mut Simulation) -> u64 {
        let seed_item = sim.config().production.seed_item;
        if !sim.inventory().has(seed_item, 1) {
            return 0;
        }

        let empty: Option<TileCoord> = sim
            .farms()
            .iter()
            .find(|plot| !plot.has_seed)
            .map(|plot| plot.coord);
        if let Some(coord) = empty.or_else(|| self.free_tile(sim, |t| t.attributes().supports_crops)) {
            return u64::from(sim.plant_seed(coord).is_ok());
        }
        if sim.farms().len() >= MAX_PLOTS {
            return 0;
        }

        if !sim.inventory().has(ids::STONE_HOE, 1) && sim.can_craft(ids::STONE_HOE) {
            return u64::from(sim.craft(ids::STONE_HOE).is_ok());
        }
        let Some(coord) = self.free_tile(sim, |t| t == TerrainType::Dirt) else {
            return 0;
        };
        let Some(tool) = sim.find_usable_tool(coord) else {
            return 0;
        };
        u64::from(sim.try_convert_terrain(coord, tool).is_ok())
    }

    fn tend_pens(&self, sim: &mut Simulation) -> u64 {
        let feed_item = sim.config().production.feed_item;
        if sim.pens().len() >= MAX_PENS || !sim.inventory().has(feed_item, 1) {
            return 0;
        }
        let Some(coord) = self.free_tile(sim, |t| t.attributes().supports_livestock) else {
            return 0;
        };
        match sim.place_animal(coord, Some(ids::CHICKEN)) {
            Ok(species) => {
                debug!(%coord, %species, "Homesteader placed an animal");
                1
            }
            Err(_) => 0,
        }
    }

    /// The first generated tile near the player, in coordinate order, whose
    /// terrain passes `wanted` and which holds no production entity.
    fn free_tile(&self, sim: &Simulation, wanted: impl Fn(TerrainType) -> bool) -> Option<TileCoord> {
        sim.grid()
            .tiles_in_radius(sim.player_position(), self.work_radius)
            .filter(|tile| wanted(tile.terrain))
            .map(|tile| tile.coord)
            .find(|&coord| {
                sim.plot(coord).is_none() && sim.pen(coord).is_none() && sim.building(coord).is_none()
            })
    }
}

impl Default for Homesteader {
    fn default() -> Self {
        Self::new(DEFAULT_WORK_RADIUS)
    }
}

/// Harvest ripe plots and collect waiting livestock products.
fn collect(sim: &mut Simulation) -> u64 {
    let ripe: Vec<TileCoord> = sim
        .farms()
        .iter()
        .filter(|plot| plot.is_harvestable())
        .map(|plot| plot.coord)
        .collect();
    let ready: Vec<TileCoord> = sim
        .pens()
        .iter()
        .filter(|pen| pen.has_product)
        .map(|pen| pen.coord)
        .collect();

    let harvested = ripe.into_iter().filter(|&c| sim.harvest(c).is_ok()).count();
    let collected = ready.into_iter().filter(|&c| sim.harvest_product(c).is_ok()).count();
    u64::try_from(harvested.saturating_add(collected)).unwrap_or(u64::MAX)
}

/// Turn spare wheat into preserved food while salt lasts.
fn preserve(sim: &mut Simulation) -> u64 {
    if sim.can_craft(ids::PICKLED_VEGETABLES) {
        u64::from(sim.craft(ids::PICKLED_VEGETABLES).is_ok())
    } else {
        0
    }
}

/// Fire clay into bricks until a temple's worth is held.
fn fire_bricks(sim: &mut Simulation) -> u64 {
    if sim.inventory().has(ids::BRICK, TEMPLE_BRICKS) || !sim.can_craft(ids::BRICK) {
        return 0;
    }
    u64::from(sim.craft(ids::BRICK).is_ok())
}

/// Build a temple once the top level is reached, walking east one chunk per
/// step while no buildable tile is in view.
fn raise_temple(sim: &mut Simulation) -> u64 {
    let top = sim.config().progression.top_implemented_level;
    if sim.civilization_level().get() < top
        || sim.buildings().count_by_type(BuildingType::Temple) > 0
        || !sim.inventory().has(ids::BRICK, TEMPLE_BRICKS)
    {
        return 0;
    }

    let search = u32::try_from(sim.config().simulation.view_radius).unwrap_or(0);
    let site = sim
        .grid()
        .tiles_in_radius(sim.player_position(), search)
        .filter(|tile| tile.terrain.attributes().buildable)
        .map(|tile| tile.coord)
        .find(|&coord| sim.building(coord).is_none());

    match site {
        Some(coord) => match sim.build(coord, BuildingType::Temple) {
            Ok(()) => {
                info!(%coord, "Homesteader raised a temple");
                1
            }
            Err(_) => 0,
        },
        None => {
            let next = sim.player_position().offset(CHUNK_SIZE, 0);
            sim.set_player_position(next);
            debug!(to = %next, "Homesteader is looking for a building site");
            0
        }
    }
}
