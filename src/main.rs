//! Belt Slots demo entry point
//!
//! Runs a small scripted factory: a source feeding a belt line that turns
//! into the hub. Usage: `belt-slots [settings.json] [save.json]`

use belt_slots::persistence::SaveGame;
use belt_slots::sim::templates;
use belt_slots::sim::{BeltOrientation, TransportWorld, tick};
use belt_slots::{Direction, Item, ItemKind, Layer, Result, Settings};
use glam::IVec2;

/// Simulated seconds
const RUN_SECONDS: u32 = 30;

fn build_world(settings: &Settings) -> Result<(TransportWorld, u32, u32)> {
    let mut world = TransportWorld::new();

    // Source at (0, 4) pushing up through three straight belts, then a right
    // curve into the hub's left edge.
    let source = world.place(
        &templates::source(Direction::Top, Layer::Regular),
        IVec2::new(0, 4),
        settings,
    )?;
    for y in 1..4 {
        world.place(
            &templates::belt(BeltOrientation::Straight),
            IVec2::new(0, y),
            settings,
        )?;
    }
    world.place(
        &templates::belt(BeltOrientation::CurveRight),
        IVec2::new(0, 0),
        settings,
    )?;
    let hub = world.place(&templates::hub(), IVec2::new(1, -1), settings)?;

    Ok((world, source, hub))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => Settings::try_load(path)?,
        None => Settings::default(),
    };
    let save_path = args.next();

    let (mut world, source, hub) = build_world(&settings)?;

    let mut next_item = 1;
    let mut delivered = 0;
    let ticks = (RUN_SECONDS as f32 / settings.sim_dt) as u32;
    for _ in 0..ticks {
        if let Some(ejector) = world
            .building_mut(source)
            .and_then(|b| b.ejector.as_mut())
        {
            if let Some(slot) = ejector.first_free_slot(Layer::Regular) {
                if ejector.try_eject(slot, Item::new(next_item, ItemKind::Shape)) {
                    next_item += 1;
                }
            }
        }
        tick(&mut world, &settings, settings.sim_dt);
        if let Some(hub) = world.building_mut(hub) {
            delivered += hub.drain_received().len();
        }
    }

    log::info!(
        "After {} ticks: {} items produced, {} delivered to hub",
        world.time_ticks,
        next_item - 1,
        delivered
    );

    if let Some(path) = save_path {
        SaveGame::new(world).save(path)?;
    }

    Ok(())
}
