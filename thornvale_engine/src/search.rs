//! Noun-phrase resolution.
//!
//! Command handlers take the player's noun phrase and resolve it against
//! the currently visible candidate set for the command: inventory for
//! inventory-adjacent commands, room contents for location-adjacent ones.
//! Matching is case-insensitive substring on the display name (or exact
//! id), and the first match in enumeration order wins; there is no
//! disambiguation prompt.

use thiserror::Error;
use thornvale_data::Node;

use crate::engine::GameEngine;

/// Candidate sets a noun phrase may be resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    Inventory,
    RoomItems,
    RoomCharacters,
    RoomObjects,
    Exits,
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("no visible entity matches '{0}'")]
    NoMatch(String),
}

/// Resolve `phrase` against the given scopes in order.
pub fn find_target<'a>(
    engine: &'a GameEngine,
    phrase: &str,
    scopes: &[SearchScope],
) -> Result<&'a Node, SearchError> {
    let needle = phrase.trim().to_lowercase();
    if needle.is_empty() {
        return Err(SearchError::NoMatch(phrase.trim().to_string()));
    }
    for scope in scopes {
        let candidates: Vec<&Node> = match scope {
            SearchScope::Inventory => engine
                .state()
                .inventory
                .iter()
                .filter_map(|id| engine.world().node(id))
                .collect(),
            SearchScope::RoomItems => engine.items_in_location(),
            SearchScope::RoomCharacters => engine.characters_in_location(),
            SearchScope::RoomObjects => engine.objects_in_location(),
            SearchScope::Exits => engine.connected_locations(),
        };
        let found = candidates
            .into_iter()
            .find(|node| node.name.to_lowercase().contains(&needle) || node.id.to_lowercase() == needle);
        if let Some(node) = found {
            return Ok(node);
        }
    }
    Err(SearchError::NoMatch(phrase.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use thornvale_data::{AttrValue, Edge, EdgeKind, NodeKind, StatusRow, WorldTables};

    fn tables() -> WorldTables {
        let node = |id: &str, kind: NodeKind, name: &str| Node {
            id: id.into(),
            kind,
            subtype: String::new(),
            name: name.into(),
            description: String::new(),
        };
        WorldTables {
            nodes: vec![
                node("loc_1", NodeKind::Location, "Town Square"),
                node("loc_2", NodeKind::Location, "Forest Edge"),
                node("item_2", NodeKind::Item, "Rusty Sword"),
                node("item_9", NodeKind::Item, "Sword of Dawn"),
                node("char_2", NodeKind::Character, "Grim"),
            ],
            edges: vec![Edge {
                id: "edge_1".into(),
                source: "loc_1".into(),
                target: "loc_2".into(),
                kind: EdgeKind::Path,
                description: String::new(),
            }],
            item_status: vec![
                StatusRow {
                    entity_id: "item_2".into(),
                    player_id: "player_1".into(),
                    attribute: "location".into(),
                    value: AttrValue::Text("loc_1".into()),
                },
                StatusRow {
                    entity_id: "item_9".into(),
                    player_id: "player_1".into(),
                    attribute: "location".into(),
                    value: AttrValue::Text("loc_1".into()),
                },
            ],
            character_status: vec![StatusRow {
                entity_id: "char_2".into(),
                player_id: "player_1".into(),
                attribute: "location".into(),
                value: AttrValue::Text("loc_1".into()),
            }],
            ..WorldTables::default()
        }
    }

    fn engine() -> GameEngine {
        let mut engine = GameEngine::new(tables(), GameConfig::default());
        engine.initialize("loc_1");
        engine
    }

    #[test]
    fn matches_by_substring_case_insensitively() {
        let engine = engine();
        let node = find_target(&engine, "RUSTY", &[SearchScope::RoomItems]).unwrap();
        assert_eq!(node.id, "item_2");
    }

    #[test]
    fn matches_by_exact_id() {
        let engine = engine();
        let node = find_target(&engine, "char_2", &[SearchScope::RoomCharacters]).unwrap();
        assert_eq!(node.name, "Grim");
    }

    #[test]
    fn first_match_in_enumeration_order_wins() {
        let engine = engine();
        // both items contain "sword"; enumeration order over the place map
        // is deterministic (sorted by id)
        let node = find_target(&engine, "sword", &[SearchScope::RoomItems]).unwrap();
        assert_eq!(node.id, "item_2");
    }

    #[test]
    fn scopes_are_tried_in_order() {
        let engine = engine();
        let node = find_target(&engine, "grim", &[SearchScope::RoomItems, SearchScope::RoomCharacters]).unwrap();
        assert_eq!(node.id, "char_2");
    }

    #[test]
    fn exits_scope_finds_connected_locations() {
        let engine = engine();
        let node = find_target(&engine, "forest", &[SearchScope::Exits]).unwrap();
        assert_eq!(node.id, "loc_2");
    }

    #[test]
    fn no_match_is_an_error() {
        let engine = engine();
        assert!(find_target(&engine, "dragon", &[SearchScope::RoomItems]).is_err());
        assert!(find_target(&engine, "", &[SearchScope::RoomItems]).is_err());
    }
}
