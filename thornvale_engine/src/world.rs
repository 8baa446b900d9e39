//! Static world data and the connection graph.
//!
//! [`WorldData`] is built once from a loaded [`WorldTables`] bundle and is
//! read-only for the rest of the run, with one controlled exception: the
//! engine may insert new `Passage` edges when a door is unlocked.

use std::collections::{HashMap, HashSet};

use log::{info, warn};
use thornvale_data::{DialogNode, Edge, EdgeKind, Id, Node, NodeKind, Quest, WorldTables};

use crate::item::ItemProfile;

/// Adjacency structure over the edge table.
///
/// Edges keep their declaration order (queries over them must be stable
/// and deterministic), with a per-source index for neighbor lookups and a
/// `(source, target)` pair set so passage insertion is O(1) and idempotent.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    edges: Vec<Edge>,
    by_source: HashMap<Id, Vec<usize>>,
    pairs: HashSet<(Id, Id)>,
}

impl Graph {
    pub fn from_edges(edges: Vec<Edge>) -> Self {
        let mut graph = Graph::default();
        for edge in edges {
            graph.push_edge(edge);
        }
        graph
    }

    fn push_edge(&mut self, edge: Edge) {
        self.pairs.insert((edge.source.clone(), edge.target.clone()));
        self.by_source.entry(edge.source.clone()).or_default().push(self.edges.len());
        self.edges.push(edge);
    }

    /// Edges leaving `source`, in declaration order.
    pub fn outgoing(&self, source: &str) -> Vec<&Edge> {
        self.by_source
            .get(source)
            .map(|indexes| indexes.iter().map(|&i| &self.edges[i]).collect())
            .unwrap_or_default()
    }

    /// Edges touching `node` from either end, in declaration order.
    pub fn touching(&self, node: &str) -> Vec<&Edge> {
        self.edges
            .iter()
            .filter(|edge| edge.source == node || edge.target == node)
            .collect()
    }

    pub fn has_edge(&self, source: &str, target: &str) -> bool {
        self.pairs.contains(&(source.to_string(), target.to_string()))
    }

    /// Insert a traversable `Passage` edge from `source` to `target`.
    ///
    /// Returns false without modifying the graph if any edge already links
    /// the pair in that direction, so repeated unlocks cannot duplicate
    /// connections.
    pub fn insert_passage(&mut self, source: &str, target: &str, description: String) -> bool {
        if self.has_edge(source, target) {
            return false;
        }
        self.push_edge(Edge {
            id: format!("edge_{source}_{target}"),
            source: source.to_string(),
            target: target.to_string(),
            kind: EdgeKind::Passage,
            description,
        });
        true
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

/// Indexed, read-only view of the loaded world tables.
#[derive(Debug, Clone, Default)]
pub struct WorldData {
    nodes: HashMap<Id, Node>,
    pub graph: Graph,
    items: HashMap<Id, ItemProfile>,
    dialogs: HashMap<Id, DialogNode>,
    dialog_roots: HashMap<Id, Id>,
    quests: HashMap<Id, Quest>,
}

impl WorldData {
    /// Index a loaded table bundle.
    ///
    /// Duplicate ids keep the first occurrence; later rows are dropped with
    /// a warning so a malformed data set degrades instead of failing.
    pub fn from_tables(tables: WorldTables) -> Self {
        let mut nodes: HashMap<Id, Node> = HashMap::new();
        for node in tables.nodes {
            if nodes.contains_key(&node.id) {
                warn!("duplicate node id '{}' dropped", node.id);
                continue;
            }
            nodes.insert(node.id.clone(), node);
        }

        let mut attr_rows: HashMap<Id, Vec<_>> = HashMap::new();
        for row in tables.item_attributes {
            attr_rows.entry(row.item_id.clone()).or_default().push(row);
        }
        let items = nodes
            .values()
            .filter(|node| node.kind == NodeKind::Item)
            .map(|node| {
                let rows = attr_rows.remove(&node.id).unwrap_or_default();
                (node.id.clone(), ItemProfile::from_rows(&node.subtype, rows))
            })
            .collect();

        let mut dialogs: HashMap<Id, DialogNode> = HashMap::new();
        let mut dialog_roots: HashMap<Id, Id> = HashMap::new();
        for dialog in tables.dialogs {
            if dialog.parent_id.is_none() {
                // first declared root per character wins
                dialog_roots.entry(dialog.npc_id.clone()).or_insert_with(|| dialog.id.clone());
            }
            if dialogs.insert(dialog.id.clone(), dialog).is_some() {
                warn!("duplicate dialog id overwritten");
            }
        }

        let mut quests: HashMap<Id, Quest> = HashMap::new();
        for quest in tables.quests {
            if quests.insert(quest.id.clone(), quest).is_some() {
                warn!("duplicate quest id overwritten");
            }
        }

        let graph = Graph::from_edges(tables.edges);
        info!(
            "world indexed: {} nodes, {} edges, {} dialogs, {} quests",
            nodes.len(),
            graph.edge_count(),
            dialogs.len(),
            quests.len()
        );

        Self {
            nodes,
            graph,
            items,
            dialogs,
            dialog_roots,
            quests,
        }
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Display name for an id, falling back to the id itself for dangling
    /// references so a degraded world stays printable.
    pub fn name_of<'a>(&'a self, id: &'a str) -> &'a str {
        self.nodes.get(id).map_or(id, |node| node.name.as_str())
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn item_profile(&self, id: &str) -> Option<&ItemProfile> {
        self.items.get(id)
    }

    pub fn dialog(&self, id: &str) -> Option<&DialogNode> {
        self.dialogs.get(id)
    }

    /// The root dialog node for a character, if it has a scripted tree.
    pub fn root_dialog(&self, npc_id: &str) -> Option<&DialogNode> {
        self.dialog_roots.get(npc_id).and_then(|id| self.dialogs.get(id))
    }

    pub fn quest_template(&self, id: &str) -> Option<&Quest> {
        self.quests.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(id: &str, source: &str, target: &str, kind: EdgeKind) -> Edge {
        Edge {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            kind,
            description: String::new(),
        }
    }

    #[test]
    fn outgoing_preserves_declaration_order() {
        let graph = Graph::from_edges(vec![
            edge("e1", "a", "b", EdgeKind::Path),
            edge("e2", "a", "c", EdgeKind::Path),
            edge("e3", "b", "a", EdgeKind::Path),
        ]);
        let targets: Vec<_> = graph.outgoing("a").iter().map(|e| e.target.clone()).collect();
        assert_eq!(targets, vec!["b".to_string(), "c".to_string()]);
    }

    #[test]
    fn insert_passage_is_idempotent() {
        let mut graph = Graph::from_edges(vec![]);
        assert!(graph.insert_passage("a", "b", "through the door".into()));
        assert!(!graph.insert_passage("a", "b", "through the door".into()));
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.has_edge("a", "b"));
        assert!(!graph.has_edge("b", "a"));
    }

    #[test]
    fn insert_passage_respects_preexisting_edges() {
        let mut graph = Graph::from_edges(vec![edge("e1", "a", "b", EdgeKind::Path)]);
        assert!(!graph.insert_passage("a", "b", "dup".into()));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn touching_finds_both_directions() {
        let graph = Graph::from_edges(vec![
            edge("e1", "room", "door", EdgeKind::Connects),
            edge("e2", "cellar", "door", EdgeKind::Connects),
            edge("e3", "room", "yard", EdgeKind::Path),
        ]);
        let touching: Vec<_> = graph.touching("door").iter().map(|e| e.id.clone()).collect();
        assert_eq!(touching, vec!["e1".to_string(), "e2".to_string()]);
    }

    #[test]
    fn duplicate_nodes_keep_first() {
        let tables = WorldTables {
            nodes: vec![
                Node {
                    id: "loc_1".into(),
                    kind: NodeKind::Location,
                    subtype: "outdoor".into(),
                    name: "First".into(),
                    description: String::new(),
                },
                Node {
                    id: "loc_1".into(),
                    kind: NodeKind::Location,
                    subtype: "outdoor".into(),
                    name: "Second".into(),
                    description: String::new(),
                },
            ],
            ..WorldTables::default()
        };
        let world = WorldData::from_tables(tables);
        assert_eq!(world.name_of("loc_1"), "First");
    }

    #[test]
    fn name_of_falls_back_to_id() {
        let world = WorldData::from_tables(WorldTables::default());
        assert_eq!(world.name_of("loc_x"), "loc_x");
    }
}
