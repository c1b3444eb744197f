//! Character-sheet content renderers.
//!
//! These cover the stat blocks of the four-page sheet. Their bodies are public
//! so the sheet binder can build blocks from a [`crate::model::CharacterSheet`];
//! the same tags can also appear in hand-written item sections, and every one
//! of them can be overridden through the registry like any other renderer.
//!
//! Display values arrive pre-formatted. A value that is `null` where a number
//! is expected could not be derived and renders as the `—` placeholder.

use serde::{Deserialize, Serialize};

use crate::components::{BoxBuilder, Row};
use crate::derived::{self, Derived};
use crate::fragment::{Fragment, TableFragment};
use crate::markup::Run;
use crate::model::{
    Attack, CombatReference, Companion, ContentBlock, Currency, DeathSaves, HitDice, ItemStat, NamedText, SpellCard,
    TurnStructure, WeaponCard,
};
use crate::registry::{typed, RenderContext, RendererRegistry};
use crate::renderers::{de_scalar, strong};

pub const ATTACK_ROWS: usize = 5;
pub const SPELL_ROWS: usize = 8;
/// Upper bound on blank padding rows, whatever `min_rows` asks for.
pub const MAX_PADDED_ROWS: usize = 40;

/// Install every renderer in this module.
pub fn register_builtins(registry: &mut RendererRegistry) {
    registry
        .register("ability_scores", render_ability_scores)
        .register("saving_throws", render_saving_throws)
        .register("skills", render_skills)
        .register("attacks", render_attacks)
        .register("combat_stats", render_combat_stats)
        .register("hit_points", render_hit_points)
        .register("hit_dice_death", render_hit_dice_death)
        .register("currency", render_currency)
        .register("spell_level", render_spell_level)
        .register("gallery", render_gallery)
        .register("weapon_card", render_weapon_cards)
        .register("spell_card", render_spell_cards)
        .register("feature_card", render_feature_cards)
        .register("turn_structure", render_turn_structure)
        .register("combat_reference", render_combat_reference)
        .register("companion", render_companion)
        .register("notes", render_notes)
        .register("trait_box", render_trait_box)
        .register("item_stats", render_item_stats);
}

fn de_opt_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Array(_)) | Some(serde_json::Value::Object(_)) => {
            Err(serde::de::Error::custom("expected a string or number"))
        }
        Some(scalar) => Ok(Some(crate::renderers::scalar_text(&scalar))),
    }
}

fn value_or_unavailable(role: &str, value: &Option<String>) -> Fragment {
    match value {
        Some(v) => Fragment::literal(role, v.as_str()),
        None => Fragment::unavailable(),
    }
}

/// The filled/empty circle in front of a proficiency row.
fn marker(filled: bool) -> Fragment {
    let role = if filled { "marker marker--filled" } else { "marker" };
    Fragment::literal(role, "")
}

fn markers(role: &str, filled: u8, total: u8) -> Fragment {
    Fragment::group(role, (0..total).map(|i| marker(i < filled)).collect())
}

// ---------------------------------------------------------------------------
// Abilities, saves and skills
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbilityEntry {
    pub name: String,
    #[serde(deserialize_with = "de_opt_scalar")]
    pub score: Option<String>,
    #[serde(deserialize_with = "de_opt_scalar")]
    pub modifier: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbilityScoresBody {
    pub abilities: Vec<AbilityEntry>,
}

fn render_ability_scores(block: &ContentBlock, _ctx: &RenderContext<'_>) -> Fragment {
    typed(block, |body: AbilityScoresBody| {
        let boxes = body
            .abilities
            .iter()
            .map(|a| {
                BoxBuilder::new()
                    .role("ability-score")
                    .title(&a.name)
                    .centered(true)
                    .child(value_or_unavailable("value-large", &a.score))
                    .child(value_or_unavailable("ability-modifier", &a.modifier))
                    .build()
            })
            .collect();
        Fragment::group("ability-block", boxes)
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckEntry {
    pub name: String,
    #[serde(deserialize_with = "de_opt_scalar")]
    pub modifier: Option<String>,
    pub proficient: bool,
    /// Governing ability abbreviation, shown after skill names.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ability: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SavingThrowsBody {
    pub saves: Vec<CheckEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillsBody {
    pub skills: Vec<CheckEntry>,
}

fn check_rows(role: &str, entries: &[CheckEntry]) -> Fragment {
    let rows = entries
        .iter()
        .map(|e| {
            let mut name = vec![Run::plain(e.name.as_str())];
            if !e.ability.is_empty() {
                name.push(Run::plain(format!(" ({})", e.ability)));
            }
            Fragment::group(
                "check-row",
                vec![
                    marker(e.proficient),
                    value_or_unavailable("check-mod", &e.modifier),
                    Fragment::Text(crate::fragment::TextFragment {
                        role: "check-name".to_string(),
                        runs: name,
                        italic: false,
                    }),
                ],
            )
        })
        .collect();
    Fragment::group(role, rows)
}

fn render_saving_throws(block: &ContentBlock, _ctx: &RenderContext<'_>) -> Fragment {
    typed(block, |body: SavingThrowsBody| check_rows("saving-throws", &body.saves))
}

fn render_skills(block: &ContentBlock, _ctx: &RenderContext<'_>) -> Fragment {
    typed(block, |body: SkillsBody| check_rows("skills", &body.skills))
}

// ---------------------------------------------------------------------------
// Attacks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttacksBody {
    pub attacks: Vec<Attack>,
    pub min_rows: usize,
}

impl Default for AttacksBody {
    fn default() -> Self {
        Self {
            attacks: Vec::new(),
            min_rows: ATTACK_ROWS,
        }
    }
}

/// Every attack is listed; blank rows pad the table up to `min_rows`.
fn render_attacks(block: &ContentBlock, ctx: &RenderContext<'_>) -> Fragment {
    typed(block, |body: AttacksBody| {
        let mut rows: Vec<Vec<Vec<Run>>> = body
            .attacks
            .iter()
            .map(|a| vec![ctx.runs(&a.name), ctx.runs(&a.atk_bonus), ctx.runs(&a.damage_type)])
            .collect();
        let min_rows = body.min_rows.min(MAX_PADDED_ROWS);
        while rows.len() < min_rows {
            rows.push(vec![Vec::new(), Vec::new(), Vec::new()]);
        }
        Fragment::Table(TableFragment {
            role: "attack-table".to_string(),
            headers: vec!["Name".into(), "Atk Bonus".into(), "Damage/Type".into()],
            rows,
            footer: None,
        })
    })
}

// ---------------------------------------------------------------------------
// Combat block
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatEntry {
    pub label: String,
    #[serde(deserialize_with = "de_opt_scalar")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatStatsBody {
    pub stats: Vec<StatEntry>,
}

fn render_combat_stats(block: &ContentBlock, _ctx: &RenderContext<'_>) -> Fragment {
    typed(block, |body: CombatStatsBody| {
        let mut row = Row::new().role("combat-row");
        for stat in &body.stats {
            let cell = BoxBuilder::new()
                .role("combat-stat")
                .title(&stat.label)
                .title_bottom()
                .centered(true)
                .child(value_or_unavailable("value-xlarge", &stat.value))
                .build();
            row = row.grow_child(cell, 1);
        }
        row.build()
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HitPointsBody {
    #[serde(deserialize_with = "de_scalar")]
    pub hp_maximum: String,
    #[serde(deserialize_with = "de_scalar")]
    pub hp_current: String,
    #[serde(deserialize_with = "de_scalar")]
    pub hp_temporary: String,
}

fn render_hit_points(block: &ContentBlock, _ctx: &RenderContext<'_>) -> Fragment {
    typed(block, |body: HitPointsBody| {
        let current = BoxBuilder::new()
            .role("hp-section")
            .title("Current Hit Points")
            .title_bottom()
            .child(Fragment::group(
                "hp-max-row",
                vec![
                    Fragment::literal("hp-max-label", "Hit Point Maximum"),
                    Fragment::literal("hp-max-value", body.hp_maximum),
                ],
            ))
            .child(Fragment::literal("hp-current", body.hp_current))
            .build();
        let temporary = BoxBuilder::new()
            .role("hp-temp")
            .title("Temporary Hit Points")
            .title_bottom()
            .child(Fragment::literal("hp-temp-value", body.hp_temporary))
            .build();
        Fragment::group("hit-points", vec![current, temporary])
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HitDiceDeathBody {
    pub hit_dice: HitDice,
    pub death_saves: DeathSaves,
}

fn render_hit_dice_death(block: &ContentBlock, _ctx: &RenderContext<'_>) -> Fragment {
    typed(block, |body: HitDiceDeathBody| {
        let total = crate::model::display_or_empty(&body.hit_dice.total);
        let dice = BoxBuilder::new()
            .role("hitdice-box")
            .title("Hit Dice")
            .title_bottom()
            .child(Fragment::literal("hitdice-total", format!("Total: {total}")))
            .child(Fragment::literal(
                "hitdice-value",
                crate::model::display_or_empty(&body.hit_dice.current),
            ))
            .build();
        let saves = &body.death_saves;
        let death = BoxBuilder::new()
            .role("death-box")
            .title("Death Saves")
            .title_bottom()
            .child(Fragment::group(
                "death-row",
                vec![
                    Fragment::literal("death-label", "Successes"),
                    markers("death-circles", saves.successes.min(3), 3),
                ],
            ))
            .child(Fragment::group(
                "death-row",
                vec![
                    Fragment::literal("death-label", "Failures"),
                    markers("death-circles", saves.failures.min(3), 3),
                ],
            ))
            .build();
        Row::new().role("hitdice-death-row").grow_child(dice, 1).grow_child(death, 1).build()
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyBody {
    pub currency: Currency,
}

fn render_currency(block: &ContentBlock, _ctx: &RenderContext<'_>) -> Fragment {
    typed(block, |body: CurrencyBody| {
        let c = body.currency;
        let coins = [
            ("cp", "Copper", c.cp),
            ("sp", "Silver", c.sp),
            ("ep", "Electrum", c.ep),
            ("gp", "Gold", c.gp),
            ("pp", "Platinum", c.pp),
        ]
        .into_iter()
        .map(|(key, label, amount)| {
            Fragment::group(
                &format!("coin coin--{key}"),
                vec![
                    Fragment::literal("coin-value", amount.to_string()),
                    Fragment::literal("coin-label", label),
                ],
            )
        })
        .collect();
        Fragment::group("coin-row", coins)
    })
}

// ---------------------------------------------------------------------------
// Spellcasting
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpellEntry {
    pub name: String,
    pub prepared: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpellLevelBody {
    /// 0 for cantrips.
    pub level: u8,
    pub slots_total: u32,
    pub slots_expended: u32,
    pub spells: Vec<SpellEntry>,
    pub min_rows: usize,
}

impl Default for SpellLevelBody {
    fn default() -> Self {
        Self {
            level: 0,
            slots_total: 0,
            slots_expended: 0,
            spells: Vec::new(),
            min_rows: SPELL_ROWS,
        }
    }
}

fn render_spell_level(block: &ContentBlock, _ctx: &RenderContext<'_>) -> Fragment {
    typed(block, |body: SpellLevelBody| {
        let heading = if body.level == 0 {
            Fragment::literal("spell-level-title", "Cantrips")
        } else {
            Fragment::group(
                "spell-slots",
                vec![
                    Fragment::literal("spell-slots-label", "Slots:"),
                    Fragment::literal("spell-slot-box", body.slots_total.to_string()),
                    Fragment::literal("spell-slots-label", "Used:"),
                    Fragment::literal("spell-slot-box", body.slots_expended.to_string()),
                ],
            )
        };
        let header = Fragment::group(
            "spell-level-header",
            vec![Fragment::literal("spell-level-num", body.level.to_string()), heading],
        );

        let mut rows: Vec<Fragment> = body
            .spells
            .iter()
            .map(|s| Fragment::group("spell-item", vec![marker(s.prepared), Fragment::literal("spell-name", s.name.as_str())]))
            .collect();
        let min_rows = body.min_rows.min(MAX_PADDED_ROWS);
        while rows.len() < min_rows {
            rows.push(Fragment::group("spell-item", vec![marker(false), Fragment::literal("spell-name", "")]));
        }

        let role = if body.level == 0 { "spell-level cantrips" } else { "spell-level" };
        BoxBuilder::new()
            .role(role)
            .child(header)
            .child(Fragment::group("spell-list", rows))
            .build()
    })
}

// ---------------------------------------------------------------------------
// Gallery
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryBody {
    pub images: Vec<String>,
}

fn render_gallery(block: &ContentBlock, _ctx: &RenderContext<'_>) -> Fragment {
    typed(block, |body: GalleryBody| {
        let images = body
            .images
            .iter()
            .map(|src| Fragment::image("gallery-image", src, "Character Art"))
            .collect();
        Fragment::group("gallery", images)
    })
}

// ---------------------------------------------------------------------------
// Reference cards
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponCardsBody {
    pub weapons: Vec<WeaponCard>,
}

fn render_weapon_cards(block: &ContentBlock, ctx: &RenderContext<'_>) -> Fragment {
    typed(block, |body: WeaponCardsBody| {
        let cards = body
            .weapons
            .iter()
            .map(|w| {
                Fragment::group(
                    "ref-card weapon-card",
                    vec![
                        strong("weapon-name", &w.name),
                        Fragment::literal("weapon-type", w.kind.as_str()),
                        Fragment::literal("weapon-damage", w.damage.as_str()),
                        Fragment::literal("weapon-properties", w.properties.as_str()),
                        ctx.text("weapon-notes", &w.notes),
                    ],
                )
            })
            .collect();
        Fragment::group("weapon-cards", cards)
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpellCardsBody {
    pub spells: Vec<SpellCard>,
}

fn render_spell_cards(block: &ContentBlock, ctx: &RenderContext<'_>) -> Fragment {
    typed(block, |body: SpellCardsBody| {
        let cards = body
            .spells
            .iter()
            .map(|s| {
                let mut title = vec![strong("spell-card-name", &s.name)];
                if !s.level.is_empty() {
                    title.push(Fragment::literal("spell-level-tag", format!("({})", s.level)));
                }
                Fragment::group(
                    "ref-card spell-card",
                    vec![
                        Fragment::group("spell-card-title", title),
                        Fragment::group(
                            "spell-meta",
                            vec![
                                labelled("Cast:", &s.casting_time),
                                labelled("Range:", &s.range),
                                labelled("Duration:", &s.duration),
                            ],
                        ),
                        ctx.text("spell-desc", &s.description),
                    ],
                )
            })
            .collect();
        Fragment::group("spell-cards", cards)
    })
}

fn labelled(label: &str, value: &str) -> Fragment {
    Fragment::Text(crate::fragment::TextFragment {
        role: "meta".to_string(),
        runs: vec![Run::strong(label), Run::plain(format!(" {value}"))],
        italic: false,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureCardsBody {
    pub features: Vec<NamedText>,
}

fn render_feature_cards(block: &ContentBlock, ctx: &RenderContext<'_>) -> Fragment {
    typed(block, |body: FeatureCardsBody| {
        let cards = body
            .features
            .iter()
            .map(|f| {
                Fragment::group(
                    "ref-card feature-card",
                    vec![strong("feature-name", &f.name), ctx.text("feature-desc", &f.description)],
                )
            })
            .collect();
        Fragment::group("feature-cards", cards)
    })
}

fn named_rows(ctx: &RenderContext<'_>, role: &str, rows: impl IntoIterator<Item = (String, String)>) -> Vec<Fragment> {
    rows.into_iter()
        .map(|(name, desc)| Fragment::group(role, vec![strong("ref-name", &name), ctx.text("ref-desc", &desc)]))
        .collect()
}

fn render_turn_structure(block: &ContentBlock, ctx: &RenderContext<'_>) -> Fragment {
    typed(block, |body: TurnStructure| {
        let title = body.title.as_deref().unwrap_or("Your Turn");
        let phases = body.phases.iter().map(|p| (p.name.clone(), p.desc.clone()));
        BoxBuilder::new()
            .role("ref-box turn-box")
            .child(Fragment::literal("ref-section-title", title))
            .children(named_rows(ctx, "turn-phase", phases))
            .children(named_rows(ctx, "turn-reaction", [("Reaction".to_string(), body.reaction.clone())]))
            .build()
    })
}

fn render_combat_reference(block: &ContentBlock, ctx: &RenderContext<'_>) -> Fragment {
    typed(block, |body: CombatReference| {
        let actions = body.actions.iter().map(|a| (a.name.clone(), a.desc.clone()));
        let conditions = body.conditions_quick.iter().map(|c| (c.name.clone(), c.desc.clone()));
        let cover = body.cover.iter().map(|c| (c.kind.clone(), c.bonus.clone()));
        BoxBuilder::new()
            .role("ref-box combat-ref-box")
            .child(Fragment::literal("ref-section-title", "Actions"))
            .children(named_rows(ctx, "combat-action", actions))
            .child(Fragment::literal("ref-section-title", "Conditions"))
            .children(named_rows(ctx, "combat-condition", conditions))
            .child(Fragment::literal("ref-section-title", "Cover"))
            .children(named_rows(ctx, "combat-cover", cover))
            .build()
    })
}

// ---------------------------------------------------------------------------
// Companion
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanionBody {
    pub companion: Option<Companion>,
}

/// Companion ability keys, in stat-block order.
const COMPANION_ABILITIES: [&str; 6] = ["str", "dex", "con", "int", "wis", "cha"];

/// A missing or empty companion renders as an empty group.
fn render_companion(block: &ContentBlock, ctx: &RenderContext<'_>) -> Fragment {
    typed(block, |body: CompanionBody| {
        let Some(c) = body.companion.filter(|c| *c != Companion::default()) else {
            return Fragment::group("companion", Vec::new());
        };

        let mut header = vec![Fragment::group(
            "companion-header",
            vec![
                strong("companion-name", &c.name),
                Fragment::literal("companion-type", format!("{} {}", c.size, c.kind).trim().to_string()),
            ],
        )];
        if !c.image.is_empty() {
            let alt = if c.name.is_empty() { "Companion" } else { c.name.as_str() };
            header.push(Fragment::image("companion-portrait", &c.image, alt));
        }

        let hp = crate::model::display_or_empty(&c.hit_points);
        let hp = if c.hp_notes.is_empty() { hp } else { format!("{hp} ({})", c.hp_notes) };
        let stats = Fragment::group(
            "companion-stats",
            vec![
                labelled("AC", &crate::model::display_or_empty(&c.armor_class)),
                labelled("HP", &hp),
                labelled("Speed", &c.speed),
            ],
        );

        let abilities = COMPANION_ABILITIES
            .iter()
            .map(|key| {
                let score = c.abilities.get(*key).copied().unwrap_or(10);
                let modifier = match derived::ability_modifier(score) {
                    Derived::Value(m) => Fragment::literal("companion-ability-mod", format!("({})", derived::Modifier(m))),
                    Derived::Unavailable => Fragment::unavailable(),
                };
                Fragment::group(
                    "companion-ability",
                    vec![
                        Fragment::literal("companion-ability-name", key.to_uppercase()),
                        Fragment::literal("companion-ability-score", score.to_string()),
                        modifier,
                    ],
                )
            })
            .collect();

        let senses = Fragment::group(
            "companion-stats",
            vec![labelled("Skills", &c.skills), labelled("Senses", &c.senses)],
        );

        let entries = |role: &str, items: &[NamedText]| -> Vec<Fragment> {
            named_rows(ctx, role, items.iter().map(|t| (format!("{}.", t.name), t.description.clone())))
        };

        BoxBuilder::new()
            .role("companion-block")
            .fill(true)
            .child(Fragment::group("companion-header-row", header))
            .child(stats)
            .child(Fragment::group("companion-abilities", abilities))
            .child(senses)
            .child(
                BoxBuilder::new()
                    .role("companion-section")
                    .title("Traits")
                    .children(entries("companion-trait", &c.traits))
                    .build(),
            )
            .child(
                BoxBuilder::new()
                    .role("companion-section")
                    .title("Actions")
                    .children(entries("companion-action", &c.actions))
                    .build(),
            )
            .child(
                BoxBuilder::new()
                    .role("companion-section")
                    .title("Commands")
                    .child(crate::renderers::bullet_list(ctx, "companion-commands", &c.commands))
                    .build(),
            )
            .build()
    })
}

// ---------------------------------------------------------------------------
// Notes, trait boxes and item stats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotesBody {
    pub title: String,
}

impl Default for NotesBody {
    fn default() -> Self {
        Self {
            title: "Notes".to_string(),
        }
    }
}

fn render_notes(block: &ContentBlock, _ctx: &RenderContext<'_>) -> Fragment {
    typed(block, |body: NotesBody| {
        BoxBuilder::new()
            .role("notes-box")
            .title(&body.title)
            .fill(true)
            .child(Fragment::literal("notes-lines", ""))
            .build()
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraitBoxBody {
    pub label: String,
    pub text: String,
}

fn render_trait_box(block: &ContentBlock, ctx: &RenderContext<'_>) -> Fragment {
    typed(block, |body: TraitBoxBody| {
        BoxBuilder::new()
            .role("trait-box")
            .title(&body.label)
            .title_bottom()
            .child(ctx.text("trait-content", &body.text))
            .build()
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemStatsBody {
    pub stats: Vec<ItemStat>,
}

fn render_item_stats(block: &ContentBlock, _ctx: &RenderContext<'_>) -> Fragment {
    typed(block, |body: ItemStatsBody| {
        let stats = body
            .stats
            .iter()
            .map(|s| {
                let value_role = if s.css_class.is_empty() {
                    "item-stat-value".to_string()
                } else {
                    format!("item-stat-value item-stat-value--{}", s.css_class)
                };
                Fragment::group(
                    "item-stat",
                    vec![
                        Fragment::literal("item-stat-label", s.label.as_str()),
                        Fragment::literal(&value_role, s.value.as_str()),
                    ],
                )
            })
            .collect();
        Fragment::group("item-stats", stats)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::PlaceholderKind;
    use crate::registry::RenderOptions;
    use serde_json::json;

    fn render(value: serde_json::Value) -> Fragment {
        let registry = RendererRegistry::with_builtins();
        let block: ContentBlock = serde_json::from_value(value).unwrap();
        registry.render_block(&block, RenderOptions::default())
    }

    #[test]
    fn attacks_pad_to_min_rows_without_truncating() {
        let frag = render(json!({"type": "attacks", "attacks": [{"name": "Longbow", "atk_bonus": "+7", "damage_type": "1d8+4 P"}]}));
        let Fragment::Table(t) = &frag else { panic!("expected table") };
        assert_eq!(t.rows.len(), ATTACK_ROWS);
        assert!(t.rows[1].iter().all(Vec::is_empty));

        let many: Vec<_> = (0..7).map(|i| json!({"name": format!("Attack {i}")})).collect();
        let frag = render(json!({"type": "attacks", "attacks": many}));
        let Fragment::Table(t) = &frag else { panic!("expected table") };
        assert_eq!(t.rows.len(), 7);
    }

    #[test]
    fn padding_is_capped_for_huge_min_rows() {
        let frag = render(json!({"type": "attacks", "attacks": [], "min_rows": 1_000_000_000_000u64}));
        let Fragment::Table(t) = &frag else { panic!("expected table") };
        assert_eq!(t.rows.len(), MAX_PADDED_ROWS);

        let frag = render(json!({"type": "spell_level", "level": 1, "min_rows": 1_000_000_000_000u64}));
        let Fragment::Box(b) = &frag else { panic!("expected box") };
        let Fragment::Group(list) = &b.body[1] else { panic!("expected spell list") };
        assert_eq!(list.children.len(), MAX_PADDED_ROWS);
    }

    #[test]
    fn null_modifier_renders_unavailable() {
        let frag = render(json!({
            "type": "ability_scores",
            "abilities": [{"name": "STR", "score": 16, "modifier": "+3"}, {"name": "DEX", "score": null, "modifier": null}]
        }));
        assert_eq!(frag.plain_text(), "STR 16 +3 DEX — —");
        let diags = frag.diagnostics();
        assert_eq!(diags.len(), 2);
        assert!(diags.iter().all(|p| p.kind == PlaceholderKind::Unavailable));
    }

    #[test]
    fn skills_show_governing_ability() {
        let frag = render(json!({
            "type": "skills",
            "skills": [{"name": "Stealth", "modifier": "+7", "proficient": true, "ability": "DEX"}]
        }));
        assert_eq!(frag.plain_text(), "+7 Stealth (DEX)");
    }

    #[test]
    fn spell_level_pads_and_labels_cantrips() {
        let frag = render(json!({"type": "spell_level", "level": 0, "spells": [{"name": "Guidance"}]}));
        let Fragment::Box(b) = &frag else { panic!("expected box") };
        assert_eq!(b.role.as_deref(), Some("spell-level cantrips"));
        let Fragment::Group(list) = &b.body[1] else { panic!("expected spell list") };
        assert_eq!(list.children.len(), SPELL_ROWS);
        assert!(frag.plain_text().starts_with("0 Cantrips Guidance"));

        let frag = render(json!({"type": "spell_level", "level": 2, "slots_total": 2, "slots_expended": 1}));
        assert!(frag.plain_text().starts_with("2 Slots: 2 Used: 1"));
    }

    #[test]
    fn empty_companion_renders_nothing() {
        for body in [json!({"type": "companion", "companion": null}), json!({"type": "companion"})] {
            let frag = render(body);
            assert_eq!(frag.plain_text(), "");
            assert!(frag.diagnostics().is_empty());
        }
    }

    #[test]
    fn companion_modifiers_are_derived() {
        let frag = render(json!({
            "type": "companion",
            "companion": {"name": "Wolf", "size": "Medium", "type": "beast", "abilities": {"str": 12, "dex": 15}}
        }));
        let text = frag.plain_text();
        assert!(text.starts_with("Wolf Medium beast"));
        assert!(text.contains("STR 12 (+1)"));
        assert!(text.contains("DEX 15 (+2)"));
        assert!(text.contains("CON 10 (+0)"));
    }

    #[test]
    fn death_saves_fill_markers() {
        let frag = render(json!({"type": "hit_dice_death", "hit_dice": {"total": "5d10", "current": 3}, "death_saves": {"successes": 2}}));
        let mut filled = 0;
        frag.visit(&mut |node| {
            if let Fragment::Text(t) = node {
                if t.role == "marker marker--filled" {
                    filled += 1;
                }
            }
        });
        assert_eq!(filled, 2);
        assert!(frag.plain_text().contains("Total: 5d10"));
    }

    #[test]
    fn currency_keeps_denomination_order() {
        let frag = render(json!({"type": "currency", "currency": {"gp": 75, "cp": 3}}));
        assert_eq!(frag.plain_text(), "3 Copper 0 Silver 0 Electrum 75 Gold 0 Platinum");
    }

    #[test]
    fn item_stats_carry_value_class() {
        let frag = render(json!({"type": "item_stats", "stats": [{"label": "Damage", "value": "1d8", "class": "damage"}]}));
        let mut roles = Vec::new();
        frag.visit(&mut |node| {
            if let Fragment::Text(t) = node {
                roles.push(t.role.clone());
            }
        });
        assert_eq!(roles, vec!["item-stat-label", "item-stat-value item-stat-value--damage"]);
    }
}
