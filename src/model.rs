//! Input data model – character sheets and item cards as read from JSON.
//!
//! Every optional field defaults when absent or `null`, so a document with
//! missing optional data still deserializes. Structural problems (wrong types,
//! out-of-range columns) are reported by [`crate::loader`] before assembly.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// A display field that may be written either as a number or as text
/// (`"speed": 30` and `"speed": "30 ft"` are both accepted).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DisplayValue {
    Int(i64),
    Text(String),
}

impl DisplayValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            DisplayValue::Int(n) => Some(*n),
            DisplayValue::Text(_) => None,
        }
    }
}

impl fmt::Display for DisplayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayValue::Int(n) => write!(f, "{n}"),
            DisplayValue::Text(s) => f.write_str(s),
        }
    }
}

/// Text of an optional display value, empty when absent.
pub fn display_or_empty(value: &Option<DisplayValue>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

/// Drop `null` object members at every depth so they take their field
/// default. Array elements stay in place.
pub(crate) fn strip_nulls(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            map.values_mut().for_each(strip_nulls);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_nulls),
        _ => {}
    }
}

// ---------------------------------------------------------------------------
// Content blocks
// ---------------------------------------------------------------------------

/// A tagged content object. The tag selects the renderer; the remaining
/// fields are kept as raw JSON and decoded by that renderer into its own
/// typed shape, so new content types need no change here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type", default = "ContentBlock::default_tag", deserialize_with = "ContentBlock::de_tag")]
    pub tag: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ContentBlock {
    pub const DEFAULT_TAG: &'static str = "text";

    fn default_tag() -> String {
        Self::DEFAULT_TAG.to_string()
    }

    fn de_tag<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(Self::default_tag))
    }

    pub fn new(tag: &str, fields: Map<String, Value>) -> Self {
        Self {
            tag: tag.to_string(),
            fields,
        }
    }

    /// Build a block from a typed body. Bodies that do not serialize to a
    /// JSON object produce an empty block, which the renderer reports.
    pub fn encode<T: Serialize>(tag: &str, body: &T) -> Self {
        let fields = match serde_json::to_value(body) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => {
                log::warn!("content body for '{tag}' is not a JSON object");
                Map::new()
            }
        };
        Self::new(tag, fields)
    }

    /// Decode the fields into the renderer's typed shape. `null` members
    /// decode as if absent.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        let mut value = Value::Object(self.fields.clone());
        strip_nulls(&mut value);
        serde_json::from_value(value)
    }
}

impl Default for ContentBlock {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TAG, Map::new())
    }
}

// ---------------------------------------------------------------------------
// Pages and sections (item cards)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionVariant {
    #[default]
    Default,
    Lore,
    Highlight,
}

/// A titled or untitled sub-area of a page, holding exactly one content block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    #[serde(default = "Section::default_column")]
    pub column: usize,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub variant: SectionVariant,
    #[serde(default)]
    pub flex_grow: bool,
    #[serde(default)]
    pub content: ContentBlock,
}

impl Section {
    fn default_column() -> usize {
        1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    #[serde(default = "PageLayout::default_columns")]
    pub columns: usize,
    #[serde(default = "PageLayout::default_gap")]
    pub gap: String,
}

impl PageLayout {
    fn default_columns() -> usize {
        2
    }

    fn default_gap() -> String {
        "3mm".to_string()
    }
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            columns: Self::default_columns(),
            gap: Self::default_gap(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub layout: PageLayout,
    #[serde(default)]
    pub sections: Vec<Section>,
}

// ---------------------------------------------------------------------------
// Item
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemStat {
    pub label: String,
    pub value: String,
    #[serde(rename = "class")]
    pub css_class: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemHeader {
    pub name: String,
    pub subtitle: String,
    pub image: String,
    pub stats: Vec<ItemStat>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemFooter {
    pub left: String,
    pub right: String,
}

/// Root of the single-card item document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Item {
    pub header: ItemHeader,
    pub footer: ItemFooter,
    pub pages: Vec<Page>,
}

// ---------------------------------------------------------------------------
// Character sheet
// ---------------------------------------------------------------------------

/// The six abilities in sheet order: (key, display abbreviation).
pub const ABILITIES: [(&str, &str); 6] = [
    ("strength", "STR"),
    ("dexterity", "DEX"),
    ("constitution", "CON"),
    ("intelligence", "INT"),
    ("wisdom", "WIS"),
    ("charisma", "CHA"),
];

/// The eighteen skills in sheet order: (key, governing ability key).
pub const SKILLS: [(&str, &str); 18] = [
    ("acrobatics", "dexterity"),
    ("animal_handling", "wisdom"),
    ("arcana", "intelligence"),
    ("athletics", "strength"),
    ("deception", "charisma"),
    ("history", "intelligence"),
    ("insight", "wisdom"),
    ("intimidation", "charisma"),
    ("investigation", "intelligence"),
    ("medicine", "wisdom"),
    ("nature", "intelligence"),
    ("perception", "wisdom"),
    ("performance", "charisma"),
    ("persuasion", "charisma"),
    ("religion", "intelligence"),
    ("sleight_of_hand", "dexterity"),
    ("stealth", "dexterity"),
    ("survival", "wisdom"),
];

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetMeta {
    pub portrait: String,
    pub gallery: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterHeader {
    pub character_name: String,
    pub class_level: String,
    pub background: String,
    pub player_name: String,
    pub race: String,
    pub alignment: String,
    pub experience_points: Option<DisplayValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScore {
    pub score: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Proficiency {
    pub proficient: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HitDice {
    pub total: Option<DisplayValue>,
    pub current: Option<DisplayValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeathSaves {
    pub successes: u8,
    pub failures: u8,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Combat {
    pub armor_class: Option<i32>,
    /// `null` or absent means "derive from dexterity".
    pub initiative: Option<DisplayValue>,
    pub speed: Option<DisplayValue>,
    pub hp_maximum: Option<i32>,
    pub hp_current: Option<i32>,
    pub hp_temporary: Option<i32>,
    pub hit_dice: HitDice,
    pub death_saves: DeathSaves,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Attack {
    pub name: String,
    pub atk_bonus: String,
    pub damage_type: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Personality {
    pub traits: String,
    pub ideals: String,
    pub bonds: String,
    pub flaws: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Currency {
    pub cp: i64,
    pub sp: i64,
    pub ep: i64,
    pub gp: i64,
    pub pp: i64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Appearance {
    pub age: String,
    pub height: String,
    pub weight: String,
    pub eyes: String,
    pub skin: String,
    pub hair: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Allies {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NamedText {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Companion {
    pub name: String,
    pub size: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub armor_class: Option<DisplayValue>,
    pub hit_points: Option<DisplayValue>,
    pub hp_notes: String,
    pub speed: String,
    /// Scores keyed by `str`, `dex`, … `cha`.
    pub abilities: BTreeMap<String, i32>,
    pub skills: String,
    pub senses: String,
    pub traits: Vec<NamedText>,
    pub actions: Vec<NamedText>,
    pub commands: Vec<String>,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KnownSpell {
    pub name: String,
    pub prepared: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpellLevelSlots {
    pub slots_total: u32,
    pub slots_expended: u32,
    pub known: Vec<KnownSpell>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Spellcasting {
    pub class: String,
    /// Casting ability, by name (`"Wisdom"`) or abbreviation (`"WIS"`).
    pub ability: String,
    pub spell_save_dc: Option<DisplayValue>,
    pub spell_attack_bonus: Option<DisplayValue>,
    pub cantrips: Vec<String>,
    /// Keyed by spell level `"1"` … `"9"`.
    pub spells: BTreeMap<String, SpellLevelSlots>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NamedDesc {
    pub name: String,
    pub desc: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TurnStructure {
    pub title: Option<String>,
    pub phases: Vec<NamedDesc>,
    pub reaction: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Cover {
    #[serde(rename = "type")]
    pub kind: String,
    pub bonus: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatReference {
    pub actions: Vec<NamedDesc>,
    pub conditions_quick: Vec<NamedDesc>,
    pub cover: Vec<Cover>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponCard {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub damage: String,
    pub properties: String,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpellCard {
    pub name: String,
    pub level: String,
    pub casting_time: String,
    pub range: String,
    pub duration: String,
    pub description: String,
}

/// Static rule lookups printed on the quick-reference page.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Reference {
    pub turn_structure: Option<TurnStructure>,
    pub combat_reference: Option<CombatReference>,
    pub weapons: Vec<WeaponCard>,
    pub spells: Vec<SpellCard>,
    pub features: Vec<NamedText>,
}

/// Root of the four-page character sheet.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterSheet {
    pub meta: SheetMeta,
    pub header: CharacterHeader,
    pub proficiency_bonus: Option<i32>,
    pub abilities: BTreeMap<String, AbilityScore>,
    pub saving_throws: BTreeMap<String, Proficiency>,
    pub skills: BTreeMap<String, Proficiency>,
    pub inspiration: bool,
    pub passive_perception: Option<i32>,
    pub combat: Combat,
    pub attacks: Vec<Attack>,
    pub personality: Personality,
    pub equipment: Vec<String>,
    pub proficiencies_languages: Vec<String>,
    pub features_traits: Vec<String>,
    pub additional_features_traits: Vec<String>,
    pub treasure: Vec<String>,
    pub currency: Currency,
    pub appearance: Appearance,
    pub character_appearance_description: String,
    pub backstory: String,
    pub allies_organizations: Allies,
    pub companion: Option<Companion>,
    pub spellcasting: Option<Spellcasting>,
    pub reference: Option<Reference>,
}

impl CharacterSheet {
    pub fn score(&self, ability: &str) -> Option<i32> {
        self.abilities.get(ability).map(|a| a.score)
    }

    pub fn save_proficient(&self, ability: &str) -> bool {
        self.saving_throws.get(ability).is_some_and(|p| p.proficient)
    }

    pub fn skill_proficient(&self, skill: &str) -> bool {
        self.skills.get(skill).is_some_and(|p| p.proficient)
    }
}

// ---------------------------------------------------------------------------
// Input discriminator
// ---------------------------------------------------------------------------

/// One input document: `"type": "item"` selects an item card, anything else
/// (or no `type` at all) a character sheet.
#[derive(Debug, Clone, PartialEq)]
pub enum SheetInput {
    Character(Box<CharacterSheet>),
    Item(Item),
}

impl SheetInput {
    /// Decode a parsed JSON value, dispatching on its `type` field.
    pub fn from_value(mut value: Value) -> Result<Self, serde_json::Error> {
        strip_nulls(&mut value);
        let is_item = value.get("type").and_then(Value::as_str) == Some("item");
        if is_item {
            Ok(SheetInput::Item(serde_json::from_value(value)?))
        } else {
            Ok(SheetInput::Character(Box::new(serde_json::from_value(value)?)))
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Self::from_value(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn content_block_defaults_to_text() {
        let block: ContentBlock = serde_json::from_value(json!({"text": "hi"})).unwrap();
        assert_eq!(block.tag, "text");
        assert_eq!(block.fields.get("text"), Some(&json!("hi")));
    }

    #[test]
    fn content_block_keeps_unknown_fields() {
        let block: ContentBlock =
            serde_json::from_value(json!({"type": "not_a_real_type", "sparkle": 3})).unwrap();
        assert_eq!(block.tag, "not_a_real_type");
        assert_eq!(block.fields.get("sparkle"), Some(&json!(3)));
    }

    #[test]
    fn discriminator_selects_document_kind() {
        let item = SheetInput::from_json(r#"{"type": "item", "header": {"name": "Blade"}}"#).unwrap();
        assert!(matches!(item, SheetInput::Item(ref i) if i.header.name == "Blade"));

        let character = SheetInput::from_json(r#"{"header": {"character_name": "Kazrek"}}"#).unwrap();
        assert!(matches!(character, SheetInput::Character(_)));

        let other = SheetInput::from_json(r#"{"type": "monster"}"#).unwrap();
        assert!(matches!(other, SheetInput::Character(_)));
    }

    #[test]
    fn null_optional_records_deserialize() {
        let sheet: CharacterSheet = serde_json::from_value(json!({
            "companion": null,
            "spellcasting": null,
            "combat": {"initiative": null, "speed": "30 ft"}
        }))
        .unwrap();
        assert!(sheet.companion.is_none());
        assert!(sheet.spellcasting.is_none());
        assert!(sheet.combat.initiative.is_none());
        assert_eq!(sheet.combat.speed, Some(DisplayValue::Text("30 ft".into())));
    }

    #[test]
    fn null_tag_falls_back_to_text() {
        let block: ContentBlock = serde_json::from_value(json!({"type": null, "text": "hi"})).unwrap();
        assert_eq!(block.tag, "text");
    }

    #[test]
    fn null_members_decode_as_absent() {
        #[derive(Debug, Default, Deserialize)]
        #[serde(default)]
        struct Body {
            text: String,
            items: Vec<String>,
        }
        let block: ContentBlock = serde_json::from_value(json!({"text": null, "items": null})).unwrap();
        let body: Body = block.decode().unwrap();
        assert!(body.text.is_empty());
        assert!(body.items.is_empty());
    }

    #[test]
    fn null_optional_fields_take_defaults() {
        let input = SheetInput::from_value(json!({
            "type": "item",
            "header": {"name": "X", "image": null, "subtitle": null, "stats": null},
            "footer": {"left": null, "right": null},
            "pages": [{"layout": {"columns": null}, "sections": [{"title": null, "content": null}]}]
        }))
        .unwrap();
        let SheetInput::Item(item) = input else { panic!("expected item") };
        assert_eq!(item.header.image, "");
        assert_eq!(item.pages[0].layout.columns, 2);
        assert_eq!(item.pages[0].sections[0].content.tag, "text");
    }

    #[test]
    fn section_defaults() {
        let section: Section = serde_json::from_value(json!({"content": {"type": "bullets", "items": []}})).unwrap();
        assert_eq!(section.column, 1);
        assert_eq!(section.variant, SectionVariant::Default);
        assert!(!section.flex_grow);
    }
}
