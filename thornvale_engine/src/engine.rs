//! The world engine: single source of truth for all state transitions.
//!
//! Every other component reads and mutates game state only through the
//! methods here. Mutating operations validate their preconditions, append
//! a line describing the outcome to the game log (the only player-visible
//! channel), and return a success flag; user mistakes are log lines, never
//! errors.

use std::collections::HashSet;

use anyhow::{Context, Result};
use log::{debug, info, warn};
use thornvale_data::{AttrValue, DialogNode, Node, NodeKind, QuestStatus, ResponseEffect, WorldTables};

use crate::config::GameConfig;
use crate::dialog::{self, match_response};
use crate::flavor::{CannedFlavor, FALLBACK_LINE, FlavorProvider};
use crate::item::ItemKind;
use crate::state::{GameState, Place};
use crate::world::WorldData;

pub struct GameEngine {
    world: WorldData,
    state: GameState,
    config: GameConfig,
    flavor: Box<dyn FlavorProvider>,
}

impl GameEngine {
    /// Build an engine over a loaded table bundle.
    ///
    /// The status tables seed the place map and fact store here; an empty
    /// bundle (failed load upstream) yields a playable, degraded world.
    pub fn new(tables: WorldTables, config: GameConfig) -> Self {
        let mut state = GameState::default();
        seed_status(&mut state, &tables);
        let world = WorldData::from_tables(tables);
        Self {
            world,
            state,
            config,
            flavor: Box::new(CannedFlavor),
        }
    }

    /// Swap in a different flavor-text collaborator.
    pub fn with_flavor(mut self, provider: Box<dyn FlavorProvider>) -> Self {
        self.flavor = provider;
        self
    }

    /// Place the player, write the opening log line, and auto-start the
    /// configured main quest.
    pub fn initialize(&mut self, start_location: &str) {
        self.state.current_location = start_location.to_string();
        let name = self
            .world
            .node(start_location)
            .map_or_else(|| "an unknown location".to_string(), |node| node.name.clone());
        self.append_log(format!("You find yourself in {name}."));
        info!("game initialized at '{start_location}' ({name})");

        let main_quest = self.config.main_quest.clone();
        if !main_quest.is_empty() {
            self.start_quest(&main_quest);
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn world(&self) -> &WorldData {
        &self.world
    }

    /// Append a line to the player-visible log (respects the end latch).
    pub fn append_log(&mut self, line: impl Into<String>) {
        let line = line.into();
        debug!("log: {line}");
        self.state.log(line);
    }

    // ---- queries ---------------------------------------------------------

    /// Locations reachable from here, in edge declaration order.
    pub fn connected_locations(&self) -> Vec<&Node> {
        if self.state.ended {
            return Vec::new();
        }
        self.world
            .graph
            .outgoing(&self.state.current_location)
            .into_iter()
            .filter_map(|edge| self.world.node(&edge.target))
            .filter(|node| node.kind == NodeKind::Location)
            .collect()
    }

    pub fn items_in_location(&self) -> Vec<&Node> {
        self.nodes_placed_here(NodeKind::Item)
    }

    /// Characters present in the current location.
    ///
    /// Presence comes from the place store alone: a character with no
    /// location fact is nowhere. No static-fallback union.
    pub fn characters_in_location(&self) -> Vec<&Node> {
        self.nodes_placed_here(NodeKind::Character)
    }

    fn nodes_placed_here(&self, kind: NodeKind) -> Vec<&Node> {
        self.state
            .places
            .iter()
            .filter(|(_, place)| matches!(place, Place::At(id) if *id == self.state.current_location))
            .filter_map(|(entity_id, _)| self.world.node(entity_id))
            .filter(|node| node.kind == kind)
            .collect()
    }

    /// Objects linked from the current location by an edge.
    pub fn objects_in_location(&self) -> Vec<&Node> {
        self.world
            .graph
            .outgoing(&self.state.current_location)
            .into_iter()
            .filter_map(|edge| self.world.node(&edge.target))
            .filter(|node| node.kind == NodeKind::Object)
            .collect()
    }

    /// Compose the room description, log it, and return it.
    pub fn look_around(&mut self) -> String {
        if self.state.ended {
            return "Game Over".to_string();
        }
        let Some(location) = self.world.node(&self.state.current_location) else {
            return "You're lost in an unknown place.".to_string();
        };

        let mut description = format!("{}: {}\n", location.name, location.description);

        let exits = self.connected_locations();
        if exits.is_empty() {
            description.push_str("\nThere are no visible exits.\n");
        } else {
            description.push_str("\nExits lead to:\n");
            for exit in exits {
                description.push_str(&format!("- {}\n", exit.name));
            }
        }

        let items = self.items_in_location();
        if !items.is_empty() {
            description.push_str("\nYou can see:\n");
            for item in items {
                description.push_str(&format!("- {}\n", item.name));
            }
        }

        let characters = self.characters_in_location();
        if !characters.is_empty() {
            description.push_str("\nCharacters here:\n");
            for character in characters {
                description.push_str(&format!("- {}\n", character.name));
            }
        }

        let objects = self.objects_in_location();
        if !objects.is_empty() {
            description.push_str("\nObjects of interest:\n");
            for object in objects {
                description.push_str(&format!("- {}\n", object.name));
            }
        }

        self.append_log(description.clone());
        description
    }

    /// Show name, description, and (for items) static attributes of a
    /// currently visible entity.
    pub fn examine(&mut self, id: &str) -> String {
        if self.state.ended {
            return "Game Over".to_string();
        }
        let Some((kind, name, node_description)) = self
            .world
            .node(id)
            .map(|node| (node.kind, node.name.clone(), node.description.clone()))
        else {
            self.append_log("You don't see that here.");
            return "Not found".to_string();
        };

        let visible = match kind {
            NodeKind::Item => self.state.holds(id) || self.items_in_location().iter().any(|n| n.id == id),
            NodeKind::Character => self.characters_in_location().iter().any(|n| n.id == id),
            NodeKind::Object => self.objects_in_location().iter().any(|n| n.id == id),
            NodeKind::Location => true,
        };
        if !visible {
            let line = if kind == NodeKind::Character {
                "You don't see them here."
            } else {
                "You don't see that here."
            };
            self.append_log(line);
            return "Not found".to_string();
        }

        let mut description = format!("{name}: {node_description}");
        if kind == NodeKind::Item {
            if let Some(profile) = self.world.item_profile(id) {
                if !profile.display.is_empty() {
                    description.push_str("\nAttributes:");
                    for (attribute, value) in &profile.display {
                        description.push_str(&format!("\n- {attribute}: {value}"));
                    }
                }
            }
        }

        self.append_log(description.clone());
        description
    }

    pub fn inventory_list(&mut self) -> String {
        if self.state.ended {
            return "Game Over".to_string();
        }
        if self.state.inventory.is_empty() {
            self.append_log("Your inventory is empty.");
            return "Inventory: Empty".to_string();
        }
        let mut result = "Inventory:".to_string();
        for item_id in &self.state.inventory {
            if let Some(item) = self.world.node(item_id) {
                result.push_str(&format!("\n- {}", item.name));
            }
        }
        self.append_log(result.clone());
        result
    }

    pub fn quest_list(&mut self) -> String {
        if self.state.ended {
            return "Game Over".to_string();
        }
        if self.state.quests.is_empty() {
            self.append_log("You don't have any active quests.");
            return "Quests: None".to_string();
        }
        let mut result = "Active Quests:".to_string();
        for quest in self.state.quests.values() {
            result.push_str(&format!("\n- {} ({})", quest.title, quest.status));
            result.push_str(&format!("\n  {}", quest.description));
        }
        self.append_log(result.clone());
        result
    }

    // ---- movement and inventory -----------------------------------------

    /// Move to a neighboring location; fails unless the target is among
    /// the currently connected locations.
    pub fn move_to_location(&mut self, location_id: &str) -> bool {
        if self.state.ended {
            return false;
        }
        let target = self
            .connected_locations()
            .into_iter()
            .find(|node| node.id == location_id)
            .map(|node| (node.name.clone(), node.description.clone()));

        let Some((name, description)) = target else {
            self.append_log("You can't go there from here.");
            return false;
        };

        self.state.current_location = location_id.to_string();
        info!("moved to '{location_id}' ({name})");
        self.append_log(format!("You move to {name}. {description}"));
        true
    }

    pub fn take_item(&mut self, item_id: &str) -> bool {
        if self.state.ended {
            return false;
        }
        if !self.items_in_location().iter().any(|node| node.id == item_id) {
            self.append_log("You don't see that item here.");
            return false;
        }
        let name = self.world.name_of(item_id).to_string();
        self.state.stow_item(item_id);
        self.append_log(format!("You pick up the {name}."));
        true
    }

    pub fn drop_item(&mut self, item_id: &str) -> bool {
        if self.state.ended {
            return false;
        }
        if !self.state.holds(item_id) {
            self.append_log("You don't have that item.");
            return false;
        }
        if self.world.node(item_id).is_none() {
            self.append_log("That item doesn't exist.");
            return false;
        }
        let name = self.world.name_of(item_id).to_string();
        let here = self.state.current_location.clone();
        self.state.release_item(item_id, Some(Place::At(here)));
        self.append_log(format!("You drop the {name}."));
        true
    }

    // ---- item use --------------------------------------------------------

    /// Use an inventory item, optionally on a target, dispatching on the
    /// item's kind.
    pub fn use_item(&mut self, item_id: &str, target_id: Option<&str>) -> bool {
        if self.state.ended {
            return false;
        }
        if !self.state.holds(item_id) {
            self.append_log("You don't have that item.");
            return false;
        }
        let Some(node) = self.world.node(item_id) else {
            return false;
        };
        let name = node.name.clone();
        let Some(profile) = self.world.item_profile(item_id).cloned() else {
            return self.use_failure(&name);
        };

        match profile.kind {
            ItemKind::Potion => match profile.heal_amount {
                Some(heal) => {
                    self.state.set_health(self.state.health() + heal);
                    let health = self.state.health();
                    self.append_log(format!(
                        "You drink the {name} and feel revitalized. Health: {health}/100"
                    ));
                    self.state.release_item(item_id, None);
                    true
                },
                None => self.use_failure(&name),
            },
            ItemKind::Key => self.use_key(&name, profile.unlock, target_id),
            ItemKind::Artifact => self.deliver_artifact(item_id, &name, profile.completes_quest.as_deref(), target_id),
            ItemKind::Weapon => self.attack_with(&name, profile.attack_bonus, target_id),
            ItemKind::Other => self.use_failure(&name),
        }
    }

    fn use_failure(&mut self, item_name: &str) -> bool {
        self.append_log(format!("You're not sure how to use the {item_name} here."));
        false
    }

    /// Unlock a door: synthesize direct bidirectional passages between the
    /// two rooms the door connects. Idempotent; repeated unlocks never
    /// duplicate edges.
    fn use_key(&mut self, item_name: &str, can_unlock: bool, target_id: Option<&str>) -> bool {
        let Some(target_id) = target_id else {
            return self.use_failure(item_name);
        };
        let Some((is_door, door_name)) = self
            .world
            .node(target_id)
            .map(|node| (node.kind == NodeKind::Object && node.subtype == "door", node.name.clone()))
        else {
            self.append_log("You don't see that here.");
            return false;
        };
        if !is_door {
            return self.use_failure(item_name);
        }
        if !can_unlock {
            self.append_log(format!("The {item_name} doesn't fit the {door_name}."));
            return false;
        }

        // the door's structural edges point at the rooms it joins
        let rooms: Vec<String> = self
            .world
            .graph
            .touching(target_id)
            .into_iter()
            .map(|edge| {
                if edge.source == target_id {
                    edge.target.clone()
                } else {
                    edge.source.clone()
                }
            })
            .take(2)
            .collect();
        let [room_a, room_b] = rooms.as_slice() else {
            warn!("door '{target_id}' does not connect two rooms");
            return self.use_failure(item_name);
        };
        let (room_a, room_b) = (room_a.clone(), room_b.clone());

        self.append_log(format!("You use the {item_name} to unlock the {door_name}."));
        let description = format!("Path through {door_name}");
        if self.world.graph.insert_passage(&room_a, &room_b, description.clone()) {
            self.state.opened_passages.push((room_a.clone(), room_b.clone()));
        }
        if self.world.graph.insert_passage(&room_b, &room_a, description) {
            self.state.opened_passages.push((room_b, room_a));
        }
        true
    }

    /// Hand a quest artifact to the quest giver, completing the quest and
    /// ending the game.
    fn deliver_artifact(
        &mut self,
        item_id: &str,
        item_name: &str,
        completes_quest: Option<&str>,
        target_id: Option<&str>,
    ) -> bool {
        let Some(target_id) = target_id else {
            return self.use_failure(item_name);
        };
        let Some((target_kind, target_name)) = self
            .world
            .node(target_id)
            .map(|node| (node.kind, node.name.clone()))
        else {
            self.append_log("You don't see that here.");
            return false;
        };
        if target_kind != NodeKind::Character {
            return self.use_failure(item_name);
        }
        if !self.characters_in_location().iter().any(|node| node.id == target_id) {
            self.append_log("That character isn't here.");
            return false;
        }

        let quest_id = completes_quest.and_then(|quest_id| {
            self.state
                .quests
                .get(quest_id)
                .filter(|quest| quest.status == QuestStatus::InProgress && quest.giver == target_id)
                .map(|quest| quest.id.clone())
        });
        let Some(quest_id) = quest_id else {
            return self.use_failure(item_name);
        };

        self.append_log(format!("You give the {item_name} to {target_name}."));
        self.append_log(format!("{target_name} examines the {item_name} with great interest."));
        self.append_log("\"Incredible! You actually found it! As promised, here's your reward.\"");

        self.state.release_item(item_id, Some(Place::At(target_id.to_string())));
        self.complete_quest(&quest_id);
        self.end_game();
        true
    }

    /// Combat is flavor-only: a damage line, no persistent health effect.
    fn attack_with(&mut self, item_name: &str, attack_bonus: Option<i64>, target_id: Option<&str>) -> bool {
        let Some(target_id) = target_id else {
            self.append_log(format!(
                "You brandish the {item_name} menacingly, but there's nothing to attack."
            ));
            return false;
        };
        let target = self.world.node(target_id);
        if !target.is_some_and(|node| node.kind == NodeKind::Character) {
            self.append_log("That's not something you can attack.");
            return false;
        }
        if !self.characters_in_location().iter().any(|node| node.id == target_id) {
            self.append_log("That character isn't here.");
            return false;
        }
        let target_name = self.world.name_of(target_id).to_string();
        let damage = attack_bonus.unwrap_or(1);
        self.append_log(format!(
            "You attack {target_name} with the {item_name} for {damage} damage!"
        ));
        true
    }

    // ---- conversation ----------------------------------------------------

    /// Open a conversation with a character who is physically present.
    pub fn talk_to(&mut self, character_id: &str) -> bool {
        if self.state.ended {
            return false;
        }
        let Some(character) = self.world.node(character_id).cloned() else {
            self.append_log("You don't see them here.");
            return false;
        };
        if character.kind != NodeKind::Character {
            self.append_log("You don't see them here.");
            return false;
        }
        if !self.characters_in_location().iter().any(|node| node.id == character_id) {
            self.append_log("That character isn't here.");
            return false;
        }

        if character.subtype == self.config.flavor_subtype {
            let npc = character;
            match self.flavor.reply(&npc, "") {
                Ok(reply) => {
                    let node = dialog::synthetic_node(&npc.id, reply);
                    self.present_dialog(&node);
                },
                Err(err) => {
                    warn!("flavor provider failed for '{}': {err:#}", npc.id);
                    self.append_log(format!("{} {FALLBACK_LINE}", npc.name));
                },
            }
            return true;
        }

        let Some(root) = self.world.root_dialog(character_id).cloned() else {
            let name = character.name.clone();
            self.append_log(format!("{name} doesn't seem interested in talking."));
            return false;
        };
        self.present_dialog(&root);
        true
    }

    /// Advance the active conversation by response index or label text.
    pub fn respond_to_dialog(&mut self, selection: &str) -> bool {
        if self.state.ended {
            return false;
        }
        let Some(dialog) = self.state.current_dialog.clone() else {
            self.append_log("You're not in a conversation.");
            return false;
        };
        let Some(index) = match_response(&dialog, selection) else {
            self.append_log("That's not a valid response option.");
            return false;
        };
        let response = dialog.responses[index].clone();

        if let Some(ResponseEffect::DeliverItem { item_id, .. }) = &response.effect {
            if !self.state.holds(item_id) {
                let name = self.world.name_of(item_id).to_string();
                self.append_log(format!("You don't have the {name}."));
                return false;
            }
        }

        self.append_log(format!("You: \"{}\"", response.text));

        let next = response
            .next_id
            .as_deref()
            .and_then(|id| self.world.dialog(id))
            .cloned();

        // a delivery effect fires on traversing this response edge
        if let Some(ResponseEffect::DeliverItem { item_id, quest_id }) = &response.effect {
            if let Some(node) = &next {
                self.speaker_line(node);
            }
            self.state.current_dialog = None;
            let giver = next
                .as_ref()
                .map_or_else(|| dialog.npc_id.clone(), |node| node.npc_id.clone());
            self.state.release_item(item_id, Some(Place::At(giver)));
            let quest_id = quest_id.clone();
            self.complete_quest(&quest_id);
            self.end_game();
            return true;
        }

        match next {
            Some(node) => {
                self.present_dialog(&node);
                if node.responses.is_empty() {
                    self.append_log("The conversation ends.");
                }
            },
            None => {
                self.state.current_dialog = None;
                self.append_log("The conversation ends.");
            },
        }
        true
    }

    /// Explicitly leave the current conversation.
    pub fn end_conversation(&mut self) -> bool {
        if self.state.current_dialog.is_none() {
            self.append_log("You're not in a conversation.");
            return false;
        }
        self.state.current_dialog = None;
        self.append_log("The conversation ends.");
        true
    }

    fn speaker_line(&mut self, node: &DialogNode) {
        let line = match self.world.node(&node.npc_id) {
            Some(npc) => format!("{}: \"{}\"", npc.name, node.text),
            None => format!("\"{}\"", node.text),
        };
        self.append_log(line);
    }

    /// Log a dialog node and update the conversation state: a node with
    /// responses keeps the conversation open, a terminal node closes it.
    fn present_dialog(&mut self, node: &DialogNode) {
        self.speaker_line(node);
        if node.responses.is_empty() {
            self.state.current_dialog = None;
            return;
        }
        self.state.current_dialog = Some(node.clone());
        self.append_log("You can respond with:");
        let options: Vec<String> = node
            .responses
            .iter()
            .enumerate()
            .map(|(i, response)| format!("{}. {}", i + 1, response.text))
            .collect();
        for option in options {
            self.append_log(option);
        }
    }

    // ---- quests and endgame ----------------------------------------------

    pub fn start_quest(&mut self, quest_id: &str) -> bool {
        if self.state.ended {
            return false;
        }
        let Some(template) = self.world.quest_template(quest_id) else {
            self.append_log("That quest doesn't exist.");
            return false;
        };
        let mut quest = template.clone();
        if self.state.quests.contains_key(quest_id) {
            let title = quest.title;
            self.append_log(format!("You've already started the quest \"{title}\"."));
            return false;
        }
        quest.status = QuestStatus::InProgress;
        let (title, description) = (quest.title.clone(), quest.description.clone());
        self.state.quests.insert(quest_id.to_string(), quest);
        info!("quest started: '{quest_id}'");
        self.append_log(format!("New quest started: {title}"));
        self.append_log(description);
        true
    }

    pub fn complete_quest(&mut self, quest_id: &str) -> bool {
        let Some((title, rewards, status)) = self
            .state
            .quests
            .get(quest_id)
            .map(|quest| (quest.title.clone(), quest.rewards.clone(), quest.status))
        else {
            self.append_log("You haven't started that quest.");
            return false;
        };
        if status == QuestStatus::Completed {
            self.append_log("You've already completed that quest.");
            return false;
        }
        if let Some(quest) = self.state.quests.get_mut(quest_id) {
            quest.status = QuestStatus::Completed;
        }
        info!("quest completed: '{quest_id}'");
        self.append_log(format!("Quest completed: {title}"));
        self.append_log(format!("Rewards: {rewards}"));
        true
    }

    /// Flip the terminal latch. The banner is the last thing the log will
    /// ever record; afterwards every mutating call is a refused no-op.
    pub fn end_game(&mut self) {
        if self.state.ended {
            return;
        }
        self.append_log("=== Congratulations! ===");
        self.append_log("Thanks for playing! The game is now complete.");
        self.state.ended = true;
        info!("end-game latch set");
    }

    // ---- persistence -----------------------------------------------------

    /// Serialize the entire game state as flat JSON text.
    ///
    /// # Errors
    /// Fails only if serialization itself fails, which would indicate a
    /// bug rather than a user condition.
    pub fn save_game(&self) -> Result<String> {
        serde_json::to_string(&self.state).context("serializing game state")
    }

    /// Restore a snapshot. A corrupt payload is reported and discarded,
    /// leaving the current state untouched.
    pub fn load_game(&mut self, payload: &str) -> bool {
        match serde_json::from_str::<GameState>(payload) {
            Ok(new_state) => {
                self.state = new_state;
                let passages = self.state.opened_passages.clone();
                for (from, to) in passages {
                    self.world
                        .graph
                        .insert_passage(&from, &to, "Path through an unlocked door".to_string());
                }
                self.append_log("Game loaded.");
                info!("snapshot restored at '{}'", self.state.current_location);
                true
            },
            Err(err) => {
                warn!("failed to load saved game: {err}");
                self.append_log("Failed to load saved game; your current game is untouched.");
                false
            },
        }
    }
}

/// Seed the place map and fact store from the three status tables.
fn seed_status(state: &mut GameState, tables: &WorldTables) {
    let item_ids: HashSet<&str> = tables
        .nodes
        .iter()
        .filter(|node| node.kind == NodeKind::Item)
        .map(|node| node.id.as_str())
        .collect();

    for row in tables.item_status.iter().chain(&tables.character_status) {
        if row.attribute == "location" {
            match &row.value {
                AttrValue::Text(place) if place == "inventory" => {
                    if item_ids.contains(row.entity_id.as_str()) {
                        state.stow_item(&row.entity_id);
                    } else {
                        warn!("non-item '{}' placed in inventory; row ignored", row.entity_id);
                    }
                },
                AttrValue::Text(place) => {
                    state.places.insert(row.entity_id.clone(), Place::At(place.clone()));
                },
                other => {
                    warn!("location row for '{}' has non-text value {other}; ignored", row.entity_id);
                },
            }
        } else {
            state
                .facts
                .entry(row.entity_id.clone())
                .or_default()
                .insert(row.attribute.clone(), row.value.clone());
        }
    }

    for row in &tables.object_status {
        state
            .facts
            .entry(row.entity_id.clone())
            .or_default()
            .insert(row.attribute.clone(), row.value.clone());
    }
}
