use std::collections::HashSet;
use std::fmt;

use crate::*;

/// Validation error for malformed or missing references in a `WorldTables`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    DuplicateId { kind: &'static str, id: String },
    MissingReference { kind: &'static str, id: String, context: String },
    InvalidValue { context: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::DuplicateId { kind, id } => {
                write!(f, "duplicate {kind} id '{id}'")
            },
            ValidationError::MissingReference { kind, id, context } => {
                write!(f, "missing {kind} '{id}' ({context})")
            },
            ValidationError::InvalidValue { context } => {
                write!(f, "invalid value ({context})")
            },
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate cross-references and basic invariants in a loaded bundle.
///
/// Returns every problem found; an empty vector means the tables are
/// internally consistent. The engine treats a non-empty result as a
/// degraded-but-playable condition, not a fatal one.
pub fn validate_tables(tables: &WorldTables) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let mut nodes = HashSet::new();
    track_ids("node", tables.nodes.iter().map(|n| n.id.as_str()), &mut nodes, &mut errors);

    let mut dialogs = HashSet::new();
    track_ids(
        "dialog",
        tables.dialogs.iter().map(|d| d.id.as_str()),
        &mut dialogs,
        &mut errors,
    );

    let mut quests = HashSet::new();
    track_ids(
        "quest",
        tables.quests.iter().map(|q| q.id.as_str()),
        &mut quests,
        &mut errors,
    );

    let mut edge_ids = HashSet::new();
    track_ids(
        "edge",
        tables.edges.iter().map(|e| e.id.as_str()),
        &mut edge_ids,
        &mut errors,
    );

    for edge in &tables.edges {
        check_ref("node", &edge.source, &nodes, format!("edge '{}' source", edge.id), &mut errors);
        check_ref("node", &edge.target, &nodes, format!("edge '{}' target", edge.id), &mut errors);
    }

    for row in &tables.item_attributes {
        check_ref(
            "node",
            &row.item_id,
            &nodes,
            format!("item attribute '{}'", row.attribute),
            &mut errors,
        );
    }

    for (table, rows) in [
        ("item_status", &tables.item_status),
        ("character_status", &tables.character_status),
        ("object_status", &tables.object_status),
    ] {
        for row in rows {
            check_ref(
                "node",
                &row.entity_id,
                &nodes,
                format!("{table} row '{}'", row.attribute),
                &mut errors,
            );
        }
    }

    for dialog in &tables.dialogs {
        check_ref("node", &dialog.npc_id, &nodes, format!("dialog '{}' npc", dialog.id), &mut errors);
        if let Some(parent) = &dialog.parent_id {
            check_ref("dialog", parent, &dialogs, format!("dialog '{}' parent", dialog.id), &mut errors);
        }
        for (idx, response) in dialog.responses.iter().enumerate() {
            if response.text.trim().is_empty() {
                errors.push(ValidationError::InvalidValue {
                    context: format!("dialog '{}' response {} has empty text", dialog.id, idx + 1),
                });
            }
            // A dangling next_id is tolerated at runtime (the conversation
            // just ends), so it is not flagged here.
            if let Some(ResponseEffect::DeliverItem { item_id, quest_id }) = &response.effect {
                check_ref(
                    "node",
                    item_id,
                    &nodes,
                    format!("dialog '{}' response {} delivery item", dialog.id, idx + 1),
                    &mut errors,
                );
                check_ref(
                    "quest",
                    quest_id,
                    &quests,
                    format!("dialog '{}' response {} delivery quest", dialog.id, idx + 1),
                    &mut errors,
                );
            }
        }
    }

    for quest in &tables.quests {
        check_ref("node", &quest.giver, &nodes, format!("quest '{}' giver", quest.id), &mut errors);
    }

    errors
}

fn track_ids<'a>(
    kind: &'static str,
    ids: impl Iterator<Item = &'a str>,
    seen: &mut HashSet<String>,
    errors: &mut Vec<ValidationError>,
) {
    for id in ids {
        if id.trim().is_empty() {
            errors.push(ValidationError::InvalidValue {
                context: format!("{kind} with empty id"),
            });
            continue;
        }
        if !seen.insert(id.to_string()) {
            errors.push(ValidationError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
}

fn check_ref(
    kind: &'static str,
    id: &str,
    known: &HashSet<String>,
    context: String,
    errors: &mut Vec<ValidationError>,
) {
    if !known.contains(id) {
        errors.push(ValidationError::MissingReference {
            kind,
            id: id.to_string(),
            context,
        });
    }
}
