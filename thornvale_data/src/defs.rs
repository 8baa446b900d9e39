use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier used across world-table references.
pub type Id = String;

/// The four kinds of addressable world entity.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Location,
    Character,
    Item,
    Object,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Location => write!(f, "location"),
            NodeKind::Character => write!(f, "character"),
            NodeKind::Item => write!(f, "item"),
            NodeKind::Object => write!(f, "object"),
        }
    }
}

/// A static entity template. Identity is `id`; mutable facts live in the
/// status tables, never on the node itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: Id,
    pub kind: NodeKind,
    pub subtype: String,
    pub name: String,
    pub description: String,
}

/// Kinds of directed relationship between two nodes.
///
/// `Path` and `Passage` are traversable connections; `Connects` is a
/// structural link (e.g. a door edge pointing at the rooms it joins).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Path,
    Passage,
    Connects,
}

impl EdgeKind {
    /// Traversable edges can carry the player; structural edges cannot.
    pub fn traversable(self) -> bool {
        matches!(self, EdgeKind::Path | EdgeKind::Passage)
    }
}

/// A directed relationship between two nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub id: Id,
    pub source: Id,
    pub target: Id,
    pub kind: EdgeKind,
    pub description: String,
}

/// Value type for attribute and status rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Bool(b) => write!(f, "{b}"),
            AttrValue::Int(n) => write!(f, "{n}"),
            AttrValue::Text(s) => write!(f, "{s}"),
        }
    }
}

impl AttrValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Int(n) => Some(*n),
            _ => None,
        }
    }
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Static capability fact about an item template (heal amount, attack
/// bonus, unlock capability, which quest it completes). Many-to-one with
/// the item node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemAttributeRow {
    pub item_id: Id,
    pub attribute: String,
    pub value: AttrValue,
}

/// Mutable runtime fact about an entity, principally `location`.
///
/// One row shape serves all three status tables (item, character, object).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusRow {
    pub entity_id: Id,
    pub player_id: Id,
    pub attribute: String,
    pub value: AttrValue,
}

/// Side effect attached to a dialog response edge.
///
/// Modeled explicitly rather than keyed off a dialog-node id so the
/// general traversal stays generic and content carries no magic constants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ResponseEffect {
    /// Hand the named item to the quest giver, completing the quest.
    DeliverItem { item_id: Id, quest_id: Id },
}

/// One selectable reply on a dialog node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogResponse {
    pub text: String,
    pub next_id: Option<Id>,
    #[serde(default)]
    pub effect: Option<ResponseEffect>,
}

/// One turn of a scripted conversation tree.
///
/// `parent_id` records authoring structure only; traversal follows the
/// `responses[].next_id` links. A node with `parent_id == None` is the
/// root of its character's tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogNode {
    pub id: Id,
    pub npc_id: Id,
    pub parent_id: Option<Id>,
    pub text: String,
    #[serde(default)]
    pub responses: Vec<DialogResponse>,
}

/// Lifecycle status of a quest.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestStatus {
    NotStarted,
    InProgress,
    Completed,
    Failed,
}

impl fmt::Display for QuestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestStatus::NotStarted => write!(f, "not started"),
            QuestStatus::InProgress => write!(f, "in progress"),
            QuestStatus::Completed => write!(f, "completed"),
            QuestStatus::Failed => write!(f, "failed"),
        }
    }
}

/// A named objective with a lifecycle status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quest {
    pub id: Id,
    pub title: String,
    pub description: String,
    pub giver: Id,
    pub requirements: String,
    pub victory_condition: String,
    pub rewards: String,
    pub status: QuestStatus,
}

/// The complete bundle of world tables handed to the engine at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldTables {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub item_attributes: Vec<ItemAttributeRow>,
    #[serde(default)]
    pub item_status: Vec<StatusRow>,
    #[serde(default)]
    pub character_status: Vec<StatusRow>,
    #[serde(default)]
    pub object_status: Vec<StatusRow>,
    #[serde(default)]
    pub dialogs: Vec<DialogNode>,
    #[serde(default)]
    pub quests: Vec<Quest>,
}

impl WorldTables {
    /// True if no table holds any rows (the degraded "nothing loaded" state).
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
            && self.edges.is_empty()
            && self.item_attributes.is_empty()
            && self.item_status.is_empty()
            && self.character_status.is_empty()
            && self.object_status.is_empty()
            && self.dialogs.is_empty()
            && self.quests.is_empty()
    }
}
