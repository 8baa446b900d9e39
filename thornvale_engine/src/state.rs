//! Mutable per-playthrough state.
//!
//! [`GameState`] is exclusively owned and mutated by the engine; every
//! other component reads it through engine accessors. The whole struct
//! serializes to a flat JSON snapshot for save/load.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thornvale_data::{AttrValue, DialogNode, Id, Quest};
use variantly::Variantly;

/// Where an entity currently is.
///
/// The "inventory" sentinel from the status tables becomes a typed variant
/// here; everything else is `At` some node (a room, or a character holding
/// an item).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Variantly)]
#[serde(rename_all = "snake_case")]
pub enum Place {
    Inventory,
    At(Id),
}

pub const STAT_HEALTH: &str = "health";
pub const STAT_ENERGY: &str = "energy";
pub const MAX_HEALTH: i64 = 100;

/// The living snapshot of one playthrough.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub current_location: Id,
    pub inventory: Vec<Id>,
    pub quests: BTreeMap<Id, Quest>,
    pub player_stats: BTreeMap<String, AttrValue>,
    pub current_dialog: Option<DialogNode>,
    pub game_log: Vec<String>,
    /// One place per entity; replaces the parallel status arrays.
    pub places: BTreeMap<Id, Place>,
    /// Non-location status facts, keyed entity -> attribute -> value.
    pub facts: BTreeMap<Id, BTreeMap<String, AttrValue>>,
    /// Passages opened at runtime (door unlocks), replayed onto the graph
    /// when a snapshot is restored.
    pub opened_passages: Vec<(Id, Id)>,
    /// Terminal latch; one-way, no reset.
    pub ended: bool,
}

impl Default for GameState {
    fn default() -> Self {
        let mut player_stats = BTreeMap::new();
        player_stats.insert(STAT_HEALTH.to_string(), AttrValue::Int(MAX_HEALTH));
        player_stats.insert(STAT_ENERGY.to_string(), AttrValue::Int(100));
        Self {
            current_location: String::new(),
            inventory: Vec::new(),
            quests: BTreeMap::new(),
            player_stats,
            current_dialog: None,
            game_log: Vec::new(),
            places: BTreeMap::new(),
            facts: BTreeMap::new(),
            opened_passages: Vec::new(),
            ended: false,
        }
    }
}

impl GameState {
    /// Append a line to the player-visible log.
    ///
    /// Once the terminal latch is set the log never grows again; the
    /// end-game banner is the last thing written.
    pub fn log(&mut self, line: impl Into<String>) {
        if self.ended {
            return;
        }
        self.game_log.push(line.into());
    }

    pub fn last_log(&self) -> Option<&str> {
        self.game_log.last().map(String::as_str)
    }

    pub fn in_dialog(&self) -> bool {
        self.current_dialog.is_some()
    }

    pub fn holds(&self, item_id: &str) -> bool {
        self.inventory.iter().any(|id| id == item_id)
    }

    pub fn place_of(&self, entity_id: &str) -> Option<&Place> {
        self.places.get(entity_id)
    }

    pub fn health(&self) -> i64 {
        self.player_stats
            .get(STAT_HEALTH)
            .and_then(AttrValue::as_int)
            .unwrap_or(0)
    }

    pub fn set_health(&mut self, value: i64) {
        self.player_stats
            .insert(STAT_HEALTH.to_string(), AttrValue::Int(value.clamp(0, MAX_HEALTH)));
    }

    /// Move an item into the inventory: one transition covering both the
    /// place map and the inventory list, so no caller can observe them
    /// disagreeing.
    pub fn stow_item(&mut self, item_id: &str) {
        self.places.insert(item_id.to_string(), Place::Inventory);
        if !self.holds(item_id) {
            self.inventory.push(item_id.to_string());
        }
    }

    /// Move an item out of the inventory to `place` (a room, a character,
    /// or gone entirely when `None` for consumed items).
    pub fn release_item(&mut self, item_id: &str, place: Option<Place>) {
        match place {
            Some(place) => {
                self.places.insert(item_id.to_string(), place);
            },
            None => {
                self.places.remove(item_id);
            },
        }
        self.inventory.retain(|id| id != item_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_latch_blocks_after_end() {
        let mut state = GameState::default();
        state.log("before");
        state.ended = true;
        state.log("after");
        assert_eq!(state.game_log, vec!["before".to_string()]);
    }

    #[test]
    fn stow_and_release_stay_consistent() {
        let mut state = GameState::default();
        state.places.insert("item_1".into(), Place::At("loc_1".into()));

        state.stow_item("item_1");
        assert!(state.holds("item_1"));
        assert_eq!(state.place_of("item_1"), Some(&Place::Inventory));

        // stowing twice must not duplicate the inventory entry
        state.stow_item("item_1");
        assert_eq!(state.inventory.len(), 1);

        state.release_item("item_1", Some(Place::At("loc_2".into())));
        assert!(!state.holds("item_1"));
        assert_eq!(state.place_of("item_1"), Some(&Place::At("loc_2".into())));
    }

    #[test]
    fn releasing_to_nowhere_removes_the_place() {
        let mut state = GameState::default();
        state.stow_item("item_1");
        state.release_item("item_1", None);
        assert!(state.place_of("item_1").is_none());
        assert!(!state.holds("item_1"));
    }

    #[test]
    fn health_clamps_to_bounds() {
        let mut state = GameState::default();
        state.set_health(250);
        assert_eq!(state.health(), MAX_HEALTH);
        state.set_health(-10);
        assert_eq!(state.health(), 0);
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let mut state = GameState::default();
        state.current_location = "loc_1".into();
        state.stow_item("item_3");
        state.opened_passages.push(("loc_3".into(), "loc_5".into()));
        state.log("You find yourself in Town Square.");

        let json = serde_json::to_string(&state).unwrap();
        let back: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(back.current_location, "loc_1");
        assert!(back.holds("item_3"));
        assert_eq!(back.opened_passages.len(), 1);
        assert_eq!(back.last_log(), Some("You find yourself in Town Square."));
    }
}
