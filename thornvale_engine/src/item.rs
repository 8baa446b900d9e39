//! Typed item capabilities.
//!
//! The item table stores flat attribute rows; this module turns them into
//! a closed [`ItemKind`] plus a typed [`ItemProfile`] so the `use` dispatch
//! is matched exhaustively instead of comparing subtype strings at every
//! call site.

use thornvale_data::{AttrValue, Id, ItemAttributeRow};
use variantly::Variantly;

/// Closed set of item categories recognized by the use-item dispatch.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Variantly)]
pub enum ItemKind {
    Potion,
    Key,
    Artifact,
    Weapon,
    /// Anything else; usable only as a failed "not sure how" attempt.
    Other,
}

impl ItemKind {
    pub fn from_subtype(subtype: &str) -> Self {
        match subtype {
            "potion" => ItemKind::Potion,
            "key" => ItemKind::Key,
            "artifact" => ItemKind::Artifact,
            "weapon" => ItemKind::Weapon,
            _ => ItemKind::Other,
        }
    }
}

/// Static capabilities of one item template.
#[derive(Debug, Clone)]
pub struct ItemProfile {
    pub kind: ItemKind,
    pub heal_amount: Option<i64>,
    pub attack_bonus: Option<i64>,
    pub unlock: bool,
    pub completes_quest: Option<Id>,
    /// Raw rows in declaration order, kept for `examine` display.
    pub display: Vec<(String, AttrValue)>,
}

impl ItemProfile {
    pub fn from_rows(subtype: &str, rows: Vec<ItemAttributeRow>) -> Self {
        let mut profile = Self {
            kind: ItemKind::from_subtype(subtype),
            heal_amount: None,
            attack_bonus: None,
            unlock: false,
            completes_quest: None,
            display: Vec::with_capacity(rows.len()),
        };
        for row in rows {
            match row.attribute.as_str() {
                "heal_amount" => profile.heal_amount = row.value.as_int(),
                "attack_bonus" => profile.attack_bonus = row.value.as_int(),
                "unlock" => profile.unlock = row.value.as_bool().unwrap_or(false),
                "completes_quest" => {
                    profile.completes_quest = row.value.as_text().map(str::to_string);
                },
                _ => {},
            }
            profile.display.push((row.attribute, row.value));
        }
        profile
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(attribute: &str, value: AttrValue) -> ItemAttributeRow {
        ItemAttributeRow {
            item_id: "item_1".into(),
            attribute: attribute.into(),
            value,
        }
    }

    #[test]
    fn kind_from_subtype() {
        assert_eq!(ItemKind::from_subtype("potion"), ItemKind::Potion);
        assert_eq!(ItemKind::from_subtype("key"), ItemKind::Key);
        assert_eq!(ItemKind::from_subtype("artifact"), ItemKind::Artifact);
        assert_eq!(ItemKind::from_subtype("weapon"), ItemKind::Weapon);
        assert_eq!(ItemKind::from_subtype("trinket"), ItemKind::Other);
    }

    #[test]
    fn profile_collects_typed_fields() {
        let profile = ItemProfile::from_rows(
            "key",
            vec![
                row("unlock", AttrValue::Bool(true)),
                row("completes_quest", AttrValue::Text("quest_4".into())),
            ],
        );
        assert!(profile.kind.is_key());
        assert!(profile.unlock);
        assert_eq!(profile.completes_quest.as_deref(), Some("quest_4"));
        assert_eq!(profile.display.len(), 2);
    }

    #[test]
    fn wrongly_typed_values_ignored() {
        let profile = ItemProfile::from_rows("potion", vec![row("heal_amount", AttrValue::Text("lots".into()))]);
        assert_eq!(profile.heal_amount, None);
        // still shown to the player on examine
        assert_eq!(profile.display.len(), 1);
    }
}
