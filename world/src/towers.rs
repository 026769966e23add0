//! Authoritative tower state management utilities.

use realm_defence_catalog::TowerTemplate;
use realm_defence_core::{TowerId, TowerInstance};
use realm_defence_system_builder::Placement;

/// Registry that stores towers and manages identifier allocation.
///
/// Entries stay sorted by identifier because identifiers only grow.
#[derive(Debug)]
pub(crate) struct TowerRegistry {
    entries: Vec<TowerInstance>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    /// Constructs a level 1 tower from `template` at the accepted placement.
    pub(crate) fn insert(&mut self, template: &TowerTemplate, placement: Placement) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().wrapping_add(1));
        self.entries.push(TowerInstance {
            id,
            template: template.id.clone(),
            spot: placement.spot,
            position: placement.position,
            level: 1,
            damage: template.damage,
            range: template.range,
            attack_interval: template.attack_interval(),
            projectile_speed: template.projectile_speed,
            cost: template.cost,
            invested: template.cost,
            last_attack: None,
            destroyed: false,
        });
        id
    }

    pub(crate) fn get(&self, id: TowerId) -> Option<&TowerInstance> {
        self.entries.iter().find(|tower| tower.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: TowerId) -> Option<&mut TowerInstance> {
        self.entries.iter_mut().find(|tower| tower.id == id)
    }

    /// Removes the tower, marking the returned copy as destroyed.
    pub(crate) fn remove(&mut self, id: TowerId) -> Option<TowerInstance> {
        let index = self.entries.iter().position(|tower| tower.id == id)?;
        let mut tower = self.entries.remove(index);
        tower.destroyed = true;
        Some(tower)
    }

    pub(crate) fn as_slice(&self) -> &[TowerInstance] {
        &self.entries
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [TowerInstance] {
        &mut self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use realm_defence_catalog::Catalog;

    fn placement(spot: usize) -> Placement {
        Placement {
            spot,
            position: Vec2::new(100.0 * spot as f32, 200.0),
        }
    }

    #[test]
    fn registry_starts_empty_with_zero_identifier() {
        let registry = TowerRegistry::new();
        assert!(registry.as_slice().is_empty());
        assert_eq!(registry.next_tower_id.get(), 0);
    }

    #[test]
    fn identifiers_are_never_reused() {
        let catalog = Catalog::builtin();
        let archer = catalog.tower("archer").expect("archer exists");
        let mut registry = TowerRegistry::new();

        let first = registry.insert(archer, placement(0));
        let removed = registry.remove(first).expect("tower was inserted");
        assert!(removed.destroyed);
        let second = registry.insert(archer, placement(1));

        assert_ne!(first, second);
        assert!(registry.get(first).is_none());
        assert_eq!(registry.get(second).map(|tower| tower.spot), Some(1));
    }

    #[test]
    fn inserted_tower_copies_template_stats() {
        let catalog = Catalog::builtin();
        let warrior = catalog.tower("warrior").expect("warrior exists");
        let mut registry = TowerRegistry::new();
        let id = registry.insert(warrior, placement(2));

        let tower = registry.get_mut(id).expect("tower exists");
        assert_eq!(tower.level, 1);
        assert_eq!(tower.damage, 25);
        assert_eq!(tower.projectile_speed, None);
        assert_eq!(tower.invested, 75);
    }
}
