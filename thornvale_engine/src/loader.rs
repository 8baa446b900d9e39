//! TSV world-table loader.
//!
//! The default world provider: reads the eight tab-separated tables from a
//! data directory into a [`WorldTables`] bundle. Any other mechanism that
//! produces the same bundle (embedded literals, a database) would serve
//! the engine equally well.
//!
//! Row-level problems (unknown kinds, bad values) are logged and the row
//! skipped; only missing files or unreadable headers fail a whole table.
//! `load_tables_or_empty` turns even that into an empty bundle so a data
//! failure leaves the game degraded but inspectable.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use log::{error, info, warn};
use thornvale_data::{
    AttrValue, DialogNode, DialogResponse, Edge, EdgeKind, ItemAttributeRow, Node, NodeKind, Quest, QuestStatus,
    ResponseEffect, StatusRow, WorldTables, validate_tables,
};

/// Load all eight tables from `dir`.
///
/// # Errors
/// Fails if a table file is missing, unreadable, or lacks a required
/// column.
pub fn load_tables(dir: &Path) -> Result<WorldTables> {
    let tables = WorldTables {
        nodes: parse_nodes(&read_table(&dir.join("nodes.tsv"))?),
        edges: parse_edges(&read_table(&dir.join("edges.tsv"))?),
        item_attributes: parse_item_attributes(&read_table(&dir.join("item_attributes.tsv"))?),
        item_status: parse_status(&read_table(&dir.join("item_status.tsv"))?, "item_id")?,
        character_status: parse_status(&read_table(&dir.join("character_status.tsv"))?, "character_id")?,
        object_status: parse_status(&read_table(&dir.join("object_status.tsv"))?, "object_id")?,
        dialogs: parse_dialogs(&read_table(&dir.join("dialogs.tsv"))?),
        quests: parse_quests(&read_table(&dir.join("quests.tsv"))?),
    };
    info!(
        "world tables loaded from {}: {} nodes, {} edges, {} dialogs, {} quests",
        dir.display(),
        tables.nodes.len(),
        tables.edges.len(),
        tables.dialogs.len(),
        tables.quests.len()
    );
    Ok(tables)
}

/// Load tables, degrading to an empty bundle on failure.
///
/// Validation problems are warnings; the world stays playable either way.
pub fn load_tables_or_empty(dir: &Path) -> WorldTables {
    match load_tables(dir) {
        Ok(tables) => {
            for issue in validate_tables(&tables) {
                warn!("world data: {issue}");
            }
            tables
        },
        Err(err) => {
            error!("failed to load world data from {}: {err:#}", dir.display());
            WorldTables::default()
        },
    }
}

struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    fn column(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|header| header == name)
            .with_context(|| format!("missing column '{name}'"))
    }
}

fn read_table(path: &Path) -> Result<Table> {
    let content = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    parse_table(&content).with_context(|| format!("parsing {}", path.display()))
}

fn parse_table(content: &str) -> Result<Table> {
    let mut lines = content.lines().filter(|line| !line.trim().is_empty());
    let Some(header_line) = lines.next() else {
        bail!("table has no header row");
    };
    let headers: Vec<String> = header_line.split('\t').map(|h| h.trim().to_string()).collect();
    let rows = lines
        .map(|line| {
            let mut row: Vec<String> = line.split('\t').map(|f| f.trim().to_string()).collect();
            row.resize(headers.len(), String::new());
            row
        })
        .collect();
    Ok(Table { headers, rows })
}

/// Coerce a raw field the way the tables expect: booleans, then integers,
/// then plain text.
pub fn parse_attr_value(raw: &str) -> AttrValue {
    match raw {
        "true" => AttrValue::Bool(true),
        "false" => AttrValue::Bool(false),
        _ => raw
            .parse::<i64>()
            .map_or_else(|_| AttrValue::Text(raw.to_string()), AttrValue::Int),
    }
}

fn parse_nodes(table: &Table) -> Vec<Node> {
    let Ok((id, kind, subtype, name, description)) = (|| {
        anyhow::Ok((
            table.column("id")?,
            table.column("type")?,
            table.column("subtype")?,
            table.column("name")?,
            table.column("description")?,
        ))
    })() else {
        warn!("nodes table missing required columns; no nodes loaded");
        return Vec::new();
    };

    table
        .rows
        .iter()
        .filter_map(|row| {
            let kind = match row[kind].as_str() {
                "location" => NodeKind::Location,
                "character" => NodeKind::Character,
                "item" => NodeKind::Item,
                "object" => NodeKind::Object,
                other => {
                    warn!("node '{}' has unknown type '{other}'; skipped", row[id]);
                    return None;
                },
            };
            Some(Node {
                id: row[id].clone(),
                kind,
                subtype: row[subtype].clone(),
                name: row[name].clone(),
                description: row[description].clone(),
            })
        })
        .collect()
}

fn parse_edges(table: &Table) -> Vec<Edge> {
    let Ok((id, source, target, kind, description)) = (|| {
        anyhow::Ok((
            table.column("id")?,
            table.column("source")?,
            table.column("target")?,
            table.column("type")?,
            table.column("description")?,
        ))
    })() else {
        warn!("edges table missing required columns; no edges loaded");
        return Vec::new();
    };

    table
        .rows
        .iter()
        .filter_map(|row| {
            let kind = match row[kind].as_str() {
                "path" => EdgeKind::Path,
                "passage" => EdgeKind::Passage,
                "connects" => EdgeKind::Connects,
                other => {
                    warn!("edge '{}' has unknown type '{other}'; skipped", row[id]);
                    return None;
                },
            };
            Some(Edge {
                id: row[id].clone(),
                source: row[source].clone(),
                target: row[target].clone(),
                kind,
                description: row[description].clone(),
            })
        })
        .collect()
}

fn parse_item_attributes(table: &Table) -> Vec<ItemAttributeRow> {
    let Ok((item_id, attribute, value)) = (|| {
        anyhow::Ok((table.column("item_id")?, table.column("attribute")?, table.column("value")?))
    })() else {
        warn!("item_attributes table missing required columns; none loaded");
        return Vec::new();
    };

    table
        .rows
        .iter()
        .map(|row| ItemAttributeRow {
            item_id: row[item_id].clone(),
            attribute: row[attribute].clone(),
            value: parse_attr_value(&row[value]),
        })
        .collect()
}

fn parse_status(table: &Table, id_column: &str) -> Result<Vec<StatusRow>> {
    let entity_id = table.column(id_column)?;
    let player_id = table.column("player_id")?;
    let attribute = table.column("attribute")?;
    let value = table.column("value")?;

    Ok(table
        .rows
        .iter()
        .map(|row| StatusRow {
            entity_id: row[entity_id].clone(),
            player_id: row[player_id].clone(),
            attribute: row[attribute].clone(),
            value: parse_attr_value(&row[value]),
        })
        .collect())
}

fn parse_dialogs(table: &Table) -> Vec<DialogNode> {
    let Ok((id, npc_id, parent_id, text, responses)) = (|| {
        anyhow::Ok((
            table.column("id")?,
            table.column("npc_id")?,
            table.column("parent_id")?,
            table.column("text")?,
            table.column("responses")?,
        ))
    })() else {
        warn!("dialogs table missing required columns; no dialogs loaded");
        return Vec::new();
    };

    table
        .rows
        .iter()
        .filter_map(|row| {
            let parsed = match parse_responses(&row[responses]) {
                Ok(parsed) => parsed,
                Err(err) => {
                    warn!("dialog '{}' has malformed responses ({err}); skipped", row[id]);
                    return None;
                },
            };
            Some(DialogNode {
                id: row[id].clone(),
                npc_id: row[npc_id].clone(),
                parent_id: optional_id(&row[parent_id]),
                text: row[text].clone(),
                responses: parsed,
            })
        })
        .collect()
}

fn parse_quests(table: &Table) -> Vec<Quest> {
    let Ok((id, title, description, giver, requirements, victory, rewards, status)) = (|| {
        anyhow::Ok((
            table.column("id")?,
            table.column("title")?,
            table.column("description")?,
            table.column("giver")?,
            table.column("requirements")?,
            table.column("victory_condition")?,
            table.column("rewards")?,
            table.column("status")?,
        ))
    })() else {
        warn!("quests table missing required columns; no quests loaded");
        return Vec::new();
    };

    table
        .rows
        .iter()
        .map(|row| Quest {
            id: row[id].clone(),
            title: row[title].clone(),
            description: row[description].clone(),
            giver: row[giver].clone(),
            requirements: row[requirements].clone(),
            victory_condition: row[victory].clone(),
            rewards: row[rewards].clone(),
            status: match row[status].as_str() {
                "in_progress" => QuestStatus::InProgress,
                "completed" => QuestStatus::Completed,
                "failed" => QuestStatus::Failed,
                _ => QuestStatus::NotStarted,
            },
        })
        .collect()
}

/// Empty or "-" means no reference.
fn optional_id(raw: &str) -> Option<String> {
    match raw {
        "" | "-" => None,
        id => Some(id.to_string()),
    }
}

/// Response list syntax: entries separated by `;`, each
/// `text -> next_id`, with an optional `[deliver <item> <quest>]` effect
/// suffix. A missing or "-" next id means the response ends the
/// conversation.
fn parse_responses(raw: &str) -> Result<Vec<DialogResponse>> {
    if raw.is_empty() || raw == "-" {
        return Ok(Vec::new());
    }
    raw.split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(parse_response)
        .collect()
}

fn parse_response(entry: &str) -> Result<DialogResponse> {
    let (body, effect) = match entry.split_once('[') {
        Some((body, rest)) => {
            let suffix = rest.trim().strip_suffix(']').context("unterminated effect suffix")?;
            (body.trim(), Some(parse_effect(suffix.trim())?))
        },
        None => (entry.trim(), None),
    };
    let (text, next_id) = match body.split_once("->") {
        Some((text, next)) => (text.trim(), optional_id(next.trim())),
        None => (body, None),
    };
    if text.is_empty() {
        bail!("response with empty label");
    }
    Ok(DialogResponse {
        text: text.to_string(),
        next_id,
        effect,
    })
}

fn parse_effect(raw: &str) -> Result<ResponseEffect> {
    let parts: Vec<&str> = raw.split_whitespace().collect();
    match parts.as_slice() {
        ["deliver", item, quest] => Ok(ResponseEffect::DeliverItem {
            item_id: (*item).to_string(),
            quest_id: (*quest).to_string(),
        }),
        _ => bail!("unrecognized response effect '{raw}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attr_values_coerce() {
        assert_eq!(parse_attr_value("true"), AttrValue::Bool(true));
        assert_eq!(parse_attr_value("false"), AttrValue::Bool(false));
        assert_eq!(parse_attr_value("20"), AttrValue::Int(20));
        assert_eq!(parse_attr_value("-3"), AttrValue::Int(-3));
        assert_eq!(parse_attr_value("loc_1"), AttrValue::Text("loc_1".into()));
    }

    #[test]
    fn nodes_parse_and_skip_unknown_kinds() {
        let table = parse_table(
            "id\ttype\tsubtype\tname\tdescription\n\
             loc_1\tlocation\toutdoor\tTown Square\tThe center.\n\
             bad_1\twidget\t\tBroken\tNope.\n\
             item_1\titem\tpotion\tHealing Potion\tRestores health.",
        )
        .unwrap();
        let nodes = parse_nodes(&table);
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].kind, NodeKind::Location);
        assert_eq!(nodes[1].subtype, "potion");
    }

    #[test]
    fn responses_parse_links_and_effects() {
        let responses =
            parse_responses("Yes, please -> dialog_4;No, thank you -> dialog_3;Here it is -> dialog_12 [deliver item_4 quest_4]")
                .unwrap();
        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0].next_id.as_deref(), Some("dialog_4"));
        assert!(responses[0].effect.is_none());
        assert_eq!(
            responses[2].effect,
            Some(ResponseEffect::DeliverItem {
                item_id: "item_4".into(),
                quest_id: "quest_4".into(),
            })
        );
    }

    #[test]
    fn terminal_responses_have_no_next() {
        let responses = parse_responses("Thanks ->;Farewell -> -").unwrap();
        assert_eq!(responses[0].next_id, None);
        assert_eq!(responses[1].next_id, None);
        assert!(parse_responses("-").unwrap().is_empty());
        assert!(parse_responses("").unwrap().is_empty());
    }

    #[test]
    fn malformed_effect_is_an_error() {
        assert!(parse_responses("Hand it over -> d1 [blarg]").is_err());
        assert!(parse_responses("Hand it over -> d1 [deliver item_4").is_err());
    }

    #[test]
    fn status_rows_unify_across_id_columns() {
        let table = parse_table(
            "character_id\tplayer_id\tattribute\tvalue\n\
             char_1\tplayer_1\tlocation\tloc_1\n\
             char_1\tplayer_1\thealth\t100",
        )
        .unwrap();
        let rows = parse_status(&table, "character_id").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].entity_id, "char_1");
        assert_eq!(rows[1].value, AttrValue::Int(100));
    }

    #[test]
    fn missing_directory_degrades_to_empty() {
        let tables = load_tables_or_empty(Path::new("/definitely/not/here"));
        assert!(tables.is_empty());
    }

    #[test]
    fn full_directory_loads() {
        let dir = tempfile::tempdir().unwrap();
        let write = |name: &str, content: &str| fs::write(dir.path().join(name), content).unwrap();
        write(
            "nodes.tsv",
            "id\ttype\tsubtype\tname\tdescription\nloc_1\tlocation\toutdoor\tTown Square\tThe center.",
        );
        write("edges.tsv", "id\tsource\ttarget\ttype\tdescription");
        write("item_attributes.tsv", "item_id\tattribute\tvalue");
        write("item_status.tsv", "item_id\tplayer_id\tattribute\tvalue");
        write("character_status.tsv", "character_id\tplayer_id\tattribute\tvalue");
        write("object_status.tsv", "object_id\tplayer_id\tattribute\tvalue");
        write("dialogs.tsv", "id\tnpc_id\tparent_id\ttext\tresponses");
        write(
            "quests.tsv",
            "id\ttitle\tdescription\tgiver\trequirements\tvictory_condition\trewards\tstatus",
        );

        let tables = load_tables(dir.path()).unwrap();
        assert_eq!(tables.nodes.len(), 1);
        assert!(tables.edges.is_empty());
    }
}
