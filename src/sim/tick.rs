//! Fixed timestep transport step
//!
//! Advances every in-flight item and hands finished items to the neighbouring
//! building's acceptor. The step runs in two phases so that an item handed off
//! this tick is not advanced again until the next one, which keeps results
//! independent of building order.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::acceptor::ItemAcceptor;
use super::belt::Belt;
use super::ejector::ItemEjector;
use super::templates::BuildingTemplate;
use crate::direction::{Direction, Layer};
use crate::error::Result;
use crate::item::Item;
use crate::settings::Settings;

/// A placed building and its slot components
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Building {
    pub id: u32,
    /// World tile of the building's top-left corner
    pub origin: IVec2,
    pub dimensions: IVec2,
    #[serde(default)]
    pub belt: Option<Belt>,
    #[serde(default)]
    pub acceptor: Option<ItemAcceptor>,
    #[serde(default)]
    pub ejector: Option<ItemEjector>,
    /// Items consumed by a non-belt building, oldest first. Stand-in for the
    /// consumer's input buffer; whoever owns the consumer drains it with
    /// `drain_received`.
    #[serde(default)]
    pub received: Vec<Item>,
}

impl Building {
    pub fn contains(&self, world_tile: IVec2) -> bool {
        let local = world_tile - self.origin;
        local.x >= 0 && local.y >= 0 && local.x < self.dimensions.x && local.y < self.dimensions.y
    }

    /// Progress at which an item on this building's ejector is done
    pub fn ejector_length(&self, layer: Layer) -> f32 {
        self.belt.map_or(1.0, |b| b.effective_length(layer))
    }

    /// Whether acceptor slot `slot_index` can take `item` right now. Belts
    /// also need a free output slot to put it on.
    fn can_receive(&self, slot_index: usize, item: &Item, layer: Layer) -> bool {
        let Some(acceptor) = &self.acceptor else {
            return false;
        };
        if !acceptor.can_accept_item(slot_index, item) {
            return false;
        }
        match (&self.belt, &self.ejector) {
            (Some(_), Some(ejector)) => ejector.first_free_slot(layer).is_some(),
            (Some(_), None) => false,
            (None, _) => true,
        }
    }

    /// Take ownership of `item`. Hands the item back if a belt has no free
    /// output slot for it.
    fn receive(
        &mut self,
        slot_index: usize,
        direction: Direction,
        item: Item,
        layer: Layer,
    ) -> std::result::Result<(), Item> {
        match (&self.belt, self.ejector.as_mut()) {
            (Some(_), Some(ejector)) => {
                let free = ejector.first_free_slot(layer).ok_or(item)?;
                if !ejector.try_eject(free, item) {
                    return Err(item);
                }
            }
            (Some(_), None) => return Err(item),
            (None, _) => self.received.push(item),
        }
        if let Some(acceptor) = self.acceptor.as_mut() {
            acceptor.on_item_accepted(slot_index, direction, item);
        }
        Ok(())
    }

    /// Remove and return everything this building has consumed so far
    pub fn drain_received(&mut self) -> Vec<Item> {
        std::mem::take(&mut self.received)
    }
}

/// Counters for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Items moved to another building
    pub handoffs: u32,
    /// Items at the end of their slot that stayed put
    pub blocked: u32,
}

/// All buildings taking part in transport, sorted by id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportWorld {
    pub buildings: Vec<Building>,
    pub time_ticks: u64,
    next_id: u32,
}

impl Default for TransportWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl TransportWorld {
    pub fn new() -> Self {
        Self {
            buildings: Vec::new(),
            time_ticks: 0,
            next_id: 1,
        }
    }

    /// Allocate a new building ID
    pub fn next_building_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Place a building from its template. Returns the new building's id.
    pub fn place(
        &mut self,
        template: &BuildingTemplate,
        origin: IVec2,
        settings: &Settings,
    ) -> Result<u32> {
        let parts = template.instantiate(settings.max_consumption_animations)?;
        let id = self.next_building_id();
        self.buildings.push(Building {
            id,
            origin,
            dimensions: template.dimensions,
            belt: parts.belt,
            acceptor: parts.acceptor,
            ejector: parts.ejector,
            received: Vec::new(),
        });
        log::info!("Placed {} #{} at {}", template.name, id, origin);
        Ok(id)
    }

    pub fn remove(&mut self, id: u32) -> Option<Building> {
        let index = self.buildings.iter().position(|b| b.id == id)?;
        Some(self.buildings.remove(index))
    }

    pub fn building(&self, id: u32) -> Option<&Building> {
        self.buildings.iter().find(|b| b.id == id)
    }

    pub fn building_mut(&mut self, id: u32) -> Option<&mut Building> {
        self.buildings.iter_mut().find(|b| b.id == id)
    }

    /// Index of the building covering `world_tile`
    pub fn building_at(&self, world_tile: IVec2) -> Option<usize> {
        self.buildings.iter().position(|b| b.contains(world_tile))
    }

    /// Ensure buildings are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.buildings.sort_by_key(|b| b.id);
    }

    /// Find where the item on `(building, slot)` would go: target building
    /// index and acceptor slot index. `None` means backpressure.
    fn resolve_target(&self, building: usize, slot: usize) -> Option<(usize, usize)> {
        let source = &self.buildings[building];
        let ejector = source.ejector.as_ref()?;
        let ejector_slot = ejector.slot(slot);
        let item = ejector_slot.item.as_ref()?;

        let world_target = source.origin + ejector.slot_target_local_tile(slot);
        let target = self.building_at(world_target)?;
        let dest = &self.buildings[target];
        let located = dest.acceptor.as_ref()?.find_matching_slot(
            world_target - dest.origin,
            ejector_slot.direction,
            ejector_slot.layer,
        )?;

        dest.can_receive(located.index, item, ejector_slot.layer)
            .then_some((target, located.index))
    }
}

/// Advance the transport world by one fixed timestep
pub fn tick(world: &mut TransportWorld, settings: &Settings, dt: f32) -> TickReport {
    let mut report = TickReport::default();
    let step = settings.belt_speed * dt;
    world.time_ticks += 1;

    // Phase 1: move items along their slots
    for building in world.buildings.iter_mut() {
        if let Some(acceptor) = building.acceptor.as_mut() {
            acceptor.update_consumption_animations(dt, settings.consumption_animation_speed);
        }
        let lengths = [
            building.ejector_length(Layer::Regular),
            building.ejector_length(Layer::Wires),
        ];
        let Some(ejector) = building.ejector.as_mut() else {
            continue;
        };
        if !ejector.enabled {
            continue;
        }
        for i in 0..ejector.len() {
            let limit = match ejector.slot(i).layer {
                Layer::Regular => lengths[0],
                Layer::Wires => lengths[1],
            };
            ejector.advance_slot(i, step, limit);
        }
    }

    // Phase 2: hand finished items over
    let mut arrived: Vec<(usize, usize)> = Vec::new();
    for (b, building) in world.buildings.iter().enumerate() {
        let Some(ejector) = building.ejector.as_ref().filter(|e| e.enabled) else {
            continue;
        };
        for (i, slot) in ejector.slots().iter().enumerate() {
            if slot.item.is_some() && slot.progress >= building.ejector_length(slot.layer) {
                arrived.push((b, i));
            }
        }
    }

    for (b, i) in arrived {
        let Some((target, acceptor_slot)) = world.resolve_target(b, i) else {
            report.blocked += 1;
            continue;
        };

        // Removal and insertion back to back: the item is never in both
        // places and never in neither.
        let Some(ejector) = world.buildings[b].ejector.as_mut() else {
            continue;
        };
        let (direction, layer) = {
            let slot = ejector.slot(i);
            (slot.direction, slot.layer)
        };
        let Some(item) = ejector.take_slot_item(i) else {
            continue;
        };
        if let Err(item) =
            world.buildings[target].receive(acceptor_slot, direction.invert(), item, layer)
        {
            // Put it back on the slot it was just taken from
            let restored = world.buildings[b]
                .ejector
                .as_mut()
                .is_some_and(|e| e.try_eject(i, item));
            debug_assert!(restored, "item {} lost during hand-off", item.id);
            report.blocked += 1;
            continue;
        }
        report.handoffs += 1;

        log::debug!(
            "Item {} moved #{} -> #{} (slot {})",
            item.id,
            world.buildings[b].id,
            world.buildings[target].id,
            acceptor_slot
        );
    }

    if report.blocked > 0 {
        log::debug!("Tick {}: {} items waiting", world.time_ticks, report.blocked);
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::item::ItemKind;
    use crate::sim::belt::BeltOrientation;
    use crate::sim::templates;

    fn fast() -> Settings {
        // Every item reaches the end of its slot in a single tick
        Settings {
            belt_speed: 2.0 / SIM_DT,
            ..Default::default()
        }
    }

    #[test]
    fn test_item_waits_without_destination() {
        let settings = fast();
        let mut world = TransportWorld::new();
        let src = world
            .place(&templates::source(Direction::Top, Layer::Regular), IVec2::ZERO, &settings)
            .unwrap();
        let item = Item::new(1, ItemKind::Shape);
        world.building_mut(src).unwrap().ejector.as_mut().unwrap().try_eject(0, item);

        for _ in 0..5 {
            let report = tick(&mut world, &settings, SIM_DT);
            assert_eq!(report.blocked, 1);
        }
        let ejector = world.building(src).unwrap().ejector.as_ref().unwrap();
        assert_eq!(ejector.slot(0).item, Some(item));
        assert_eq!(ejector.slot(0).progress, 1.0);
    }

    #[test]
    fn test_disabled_ejector_is_skipped() {
        let settings = fast();
        let mut world = TransportWorld::new();
        let src = world
            .place(&templates::source(Direction::Top, Layer::Regular), IVec2::ZERO, &settings)
            .unwrap();
        world
            .place(&templates::hub(), IVec2::new(0, -4), &settings)
            .unwrap();
        {
            let ejector = world.building_mut(src).unwrap().ejector.as_mut().unwrap();
            ejector.try_eject(0, Item::new(1, ItemKind::Shape));
            ejector.enabled = false;
        }

        let report = tick(&mut world, &settings, SIM_DT);
        assert_eq!(report, TickReport::default());
        assert_eq!(world.building(src).unwrap().ejector.as_ref().unwrap().slot(0).progress, 0.0);
    }

    #[test]
    fn test_belt_forwards_item() {
        let settings = fast();
        let mut world = TransportWorld::new();
        let src = world
            .place(&templates::source(Direction::Top, Layer::Regular), IVec2::new(0, 2), &settings)
            .unwrap();
        let belt = world
            .place(&templates::belt(BeltOrientation::Straight), IVec2::new(0, 1), &settings)
            .unwrap();
        let item = Item::new(9, ItemKind::Color);
        world.building_mut(src).unwrap().ejector.as_mut().unwrap().try_eject(0, item);

        let report = tick(&mut world, &settings, SIM_DT);
        assert_eq!(report.handoffs, 1);

        let belt = world.building(belt).unwrap();
        assert_eq!(belt.ejector.as_ref().unwrap().slot(0).item, Some(item));
        assert_eq!(belt.ejector.as_ref().unwrap().slot(0).progress, 0.0);
        assert_eq!(belt.acceptor.as_ref().unwrap().consumption_animations().len(), 1);
        assert!(belt.received.is_empty());
    }

    #[test]
    fn test_rejected_receive_returns_item() {
        let settings = fast();
        let mut world = TransportWorld::new();
        let belt = world
            .place(&templates::belt(BeltOrientation::Straight), IVec2::ZERO, &settings)
            .unwrap();
        let b = world.building_mut(belt).unwrap();
        b.ejector.as_mut().unwrap().try_eject(0, Item::new(1, ItemKind::Shape));

        // Output slot is full: the item comes back instead of vanishing
        let second = Item::new(2, ItemKind::Shape);
        assert_eq!(b.receive(0, Direction::Bottom, second, Layer::Regular), Err(second));
        assert_eq!(b.ejector.as_ref().unwrap().slot(0).item.map(|i| i.id), Some(1));
        assert!(b.acceptor.as_ref().unwrap().consumption_animations().is_empty());
    }

    #[test]
    fn test_drain_received_empties_buffer() {
        let settings = fast();
        let mut world = TransportWorld::new();
        let src = world
            .place(&templates::source(Direction::Right, Layer::Regular), IVec2::ZERO, &settings)
            .unwrap();
        let hub = world.place(&templates::hub(), IVec2::new(1, -1), &settings).unwrap();
        world.building_mut(src).unwrap().ejector.as_mut().unwrap()
            .try_eject(0, Item::new(1, ItemKind::Shape));
        tick(&mut world, &settings, SIM_DT);

        let hub = world.building_mut(hub).unwrap();
        assert_eq!(hub.drain_received(), vec![Item::new(1, ItemKind::Shape)]);
        assert!(hub.received.is_empty());
        assert!(hub.drain_received().is_empty());
    }

    #[test]
    fn test_negative_belt_speed_does_not_reverse_items() {
        let settings = Settings {
            belt_speed: -1.0,
            ..Default::default()
        };
        let mut world = TransportWorld::new();
        let belt = world
            .place(&templates::belt(BeltOrientation::Straight), IVec2::ZERO, &settings)
            .unwrap();
        world.building_mut(belt).unwrap().ejector.as_mut().unwrap()
            .try_eject(0, Item::new(1, ItemKind::Shape));
        for _ in 0..10 {
            tick(&mut world, &settings, SIM_DT);
        }
        let b = world.building(belt).unwrap();
        let progress = b.ejector.as_ref().unwrap().slot(0).progress;
        assert_eq!(progress, 0.0);
        assert!(b.belt.unwrap().local_position(progress, Layer::Regular).is_ok());
    }

    #[test]
    fn test_determinism() {
        let settings = Settings::default();
        let build = || {
            let mut world = TransportWorld::new();
            let src = world
                .place(&templates::source(Direction::Right, Layer::Regular), IVec2::ZERO, &settings)
                .unwrap();
            world
                .place(&templates::hub(), IVec2::new(1, -1), &settings)
                .unwrap();
            world.building_mut(src).unwrap().ejector.as_mut().unwrap()
                .try_eject(0, Item::new(1, ItemKind::Shape));
            world
        };
        let mut w1 = build();
        let mut w2 = build();
        for _ in 0..200 {
            assert_eq!(
                tick(&mut w1, &settings, SIM_DT),
                tick(&mut w2, &settings, SIM_DT)
            );
        }
        assert_eq!(w1.buildings[1].received, w2.buildings[1].received);
        assert_eq!(w1.buildings[1].received.len(), 1);
    }
}
