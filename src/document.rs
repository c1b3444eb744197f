//! Document assembly – character sheets and item cards.
//!
//! The character sheet is the four static page schemas in [`crate::schema`]
//! filled by a [`CharacterBinder`], which derives the display values the
//! input leaves out. An item card is built directly from its pages: each
//! page is a grid whose sections are placed by their `column`, with the
//! static header and footer on the first page.
//!
//! Assembly is pure. It reads no files and no clock, so the same input and
//! registry always give the same [`Document`].

use serde_json::json;

use crate::components::{BoxBuilder, Col, Grid};
use crate::derived::{self, Derived, Modifier};
use crate::fragment::{Document, DocumentKind, DocumentMeta, Fragment, Gap};
use crate::model::{
    display_or_empty, CharacterSheet, ContentBlock, DisplayValue, Item, Page, Section, SectionVariant, SheetInput,
    Spellcasting, ABILITIES, SKILLS,
};
use crate::registry::{RenderContext, RenderOptions, RendererRegistry};
use crate::schema::{self, Binding, SlotBinder, SlotKey, CHARACTER_PAGES, ITEM_FOOTER, ITEM_HEADER};
use crate::sheet_renderers::{
    AbilityEntry, AbilityScoresBody, AttacksBody, CheckEntry, CombatStatsBody, CompanionBody, CurrencyBody,
    FeatureCardsBody, GalleryBody, HitDiceDeathBody, HitPointsBody, ItemStatsBody, SavingThrowsBody, SkillsBody,
    SpellCardsBody, SpellEntry, SpellLevelBody, StatEntry, WeaponCardsBody, ATTACK_ROWS, SPELL_ROWS,
};

/// Assemble any input document.
pub fn assemble(input: &SheetInput, registry: &RendererRegistry, options: RenderOptions) -> Document {
    let ctx = RenderContext::new(registry).with_options(options);
    match input {
        SheetInput::Character(sheet) => assemble_character(sheet, &ctx),
        SheetInput::Item(item) => assemble_item(item, &ctx),
    }
}

// ---------------------------------------------------------------------------
// Character sheet
// ---------------------------------------------------------------------------

pub fn assemble_character(sheet: &CharacterSheet, ctx: &RenderContext<'_>) -> Document {
    let binder = CharacterBinder::new(sheet);
    let pages = CHARACTER_PAGES
        .iter()
        .filter_map(|page| schema::build(page, &binder, ctx))
        .collect();
    let name = non_empty(&sheet.header.character_name).unwrap_or("Character");
    log::debug!("assembled character sheet for {name}");
    Document {
        meta: DocumentMeta {
            title: format!("{name} - Character Sheet"),
            kind: DocumentKind::CharacterSheet,
            generated_at: None,
        },
        pages,
    }
}

/// Binds character-sheet slots, deriving missing display values.
pub struct CharacterBinder<'a> {
    sheet: &'a CharacterSheet,
    proficiency: Derived<i32>,
}

impl<'a> CharacterBinder<'a> {
    pub fn new(sheet: &'a CharacterSheet) -> Self {
        Self {
            sheet,
            proficiency: derived::effective_proficiency(sheet.proficiency_bonus, &sheet.header.class_level),
        }
    }

    fn modifier(&self, ability: &str) -> Derived<i32> {
        match self.sheet.score(ability) {
            Some(score) => derived::ability_modifier(score),
            None => Derived::Unavailable,
        }
    }

    fn ability_scores(&self) -> Binding {
        let abilities = ABILITIES
            .iter()
            .map(|(key, abbr)| AbilityEntry {
                name: abbr.to_string(),
                score: self.sheet.score(key).map(|s| s.to_string()),
                modifier: derived::signed(self.modifier(key)),
            })
            .collect();
        content("ability_scores", &AbilityScoresBody { abilities })
    }

    fn saving_throws(&self) -> Binding {
        let saves = ABILITIES
            .iter()
            .map(|(key, _)| {
                let proficient = self.sheet.save_proficient(key);
                CheckEntry {
                    name: title_case(key),
                    modifier: derived::signed(derived::check_modifier(self.modifier(key), proficient, self.proficiency)),
                    proficient,
                    ability: String::new(),
                }
            })
            .collect();
        content("saving_throws", &SavingThrowsBody { saves })
    }

    fn skills(&self) -> Binding {
        let skills = SKILLS
            .iter()
            .map(|(key, ability)| {
                let proficient = self.sheet.skill_proficient(key);
                CheckEntry {
                    name: title_case(key),
                    modifier: derived::signed(derived::check_modifier(self.modifier(ability), proficient, self.proficiency)),
                    proficient,
                    ability: title_case(&ability[..3]),
                }
            })
            .collect();
        content("skills", &SkillsBody { skills })
    }

    fn passive_perception(&self) -> Binding {
        if let Some(explicit) = self.sheet.passive_perception {
            return Binding::Value(explicit.to_string());
        }
        let value = derived::passive_perception(
            self.modifier("wisdom"),
            self.sheet.skill_proficient("perception"),
            self.proficiency,
        );
        derived_binding(value.map(|v| v.to_string()).value())
    }

    fn combat_stats(&self) -> Binding {
        let combat = &self.sheet.combat;
        let initiative = match &combat.initiative {
            Some(DisplayValue::Int(n)) => Some(Modifier(clamp_i32(*n)).to_string()),
            Some(DisplayValue::Text(text)) => Some(text.clone()),
            None => derived::signed(derived::initiative(None, self.sheet.score("dexterity"))),
        };
        let stats = vec![
            StatEntry {
                label: "Armor Class".into(),
                value: combat.armor_class.map(|ac| ac.to_string()),
            },
            StatEntry {
                label: "Initiative".into(),
                value: initiative,
            },
            StatEntry {
                label: "Speed".into(),
                value: Some(display_or_empty(&combat.speed)),
            },
        ];
        content("combat_stats", &CombatStatsBody { stats })
    }

    fn spellcasting(&self) -> Option<&'a Spellcasting> {
        self.sheet.spellcasting.as_ref()
    }

    /// Modifier of the casting ability, given by name or abbreviation.
    fn casting_modifier(&self, spellcasting: &Spellcasting) -> Derived<i32> {
        let wanted = spellcasting.ability.trim().to_ascii_lowercase();
        if wanted.len() < 3 {
            return Derived::Unavailable;
        }
        ABILITIES
            .iter()
            .find(|(key, abbr)| **key == wanted || abbr.eq_ignore_ascii_case(&wanted) || key.starts_with(&wanted))
            .map_or(Derived::Unavailable, |(key, _)| self.modifier(key))
    }

    fn spell_save_dc(&self) -> Binding {
        let Some(sc) = self.spellcasting() else {
            return Binding::Empty;
        };
        match &sc.spell_save_dc {
            Some(explicit) => Binding::Value(explicit.to_string()),
            None => derived_binding(
                derived::spell_save_dc(self.casting_modifier(sc), self.proficiency)
                    .map(|v| v.to_string())
                    .value(),
            ),
        }
    }

    fn spell_attack_bonus(&self) -> Binding {
        let Some(sc) = self.spellcasting() else {
            return Binding::Empty;
        };
        match &sc.spell_attack_bonus {
            Some(DisplayValue::Int(n)) => Binding::Value(Modifier(clamp_i32(*n)).to_string()),
            Some(DisplayValue::Text(text)) => Binding::Value(text.clone()),
            None => derived_binding(derived::signed(derived::spell_attack_bonus(
                self.casting_modifier(sc),
                self.proficiency,
            ))),
        }
    }

    /// Cantrips (level 0) or one spell level; blank boxes without
    /// spellcasting data.
    fn spell_level(&self, level: u8) -> Binding {
        let mut body = SpellLevelBody {
            level,
            min_rows: SPELL_ROWS,
            ..SpellLevelBody::default()
        };
        if let Some(sc) = self.spellcasting() {
            if level == 0 {
                body.spells = sc
                    .cantrips
                    .iter()
                    .map(|name| SpellEntry {
                        name: name.clone(),
                        prepared: false,
                    })
                    .collect();
            } else if let Some(slots) = sc.spells.get(&level.to_string()) {
                body.slots_total = slots.slots_total;
                body.slots_expended = slots.slots_expended;
                body.spells = slots
                    .known
                    .iter()
                    .map(|s| SpellEntry {
                        name: s.name.clone(),
                        prepared: s.prepared,
                    })
                    .collect();
            }
        }
        content("spell_level", &body)
    }
}

impl SlotBinder for CharacterBinder<'_> {
    fn bind(&self, key: SlotKey) -> Binding {
        let sheet = self.sheet;
        let header = &sheet.header;
        let reference = sheet.reference.as_ref();
        match key {
            SlotKey::CharacterName => Binding::Value(header.character_name.clone()),
            SlotKey::ClassLevel => Binding::Value(header.class_level.clone()),
            SlotKey::Background => Binding::Value(header.background.clone()),
            SlotKey::PlayerName => Binding::Value(header.player_name.clone()),
            SlotKey::Race => Binding::Value(header.race.clone()),
            SlotKey::Alignment => Binding::Value(header.alignment.clone()),
            SlotKey::Experience => Binding::Value(display_or_empty(&header.experience_points)),
            SlotKey::Portrait => match non_empty(&sheet.meta.portrait) {
                Some(src) => Binding::Fragment(Fragment::image("portrait", src, "Character Portrait")),
                None => Binding::Empty,
            },

            SlotKey::AbilityScores => self.ability_scores(),
            SlotKey::Inspiration => Binding::Value(if sheet.inspiration { "X" } else { "" }.to_string()),
            SlotKey::ProficiencyBonus => derived_binding(derived::signed(self.proficiency)),
            SlotKey::SavingThrows => self.saving_throws(),
            SlotKey::Skills => self.skills(),
            SlotKey::PassivePerception => self.passive_perception(),
            SlotKey::Proficiencies => styled_list(&sheet.proficiencies_languages, "styled-list prof-list"),

            SlotKey::CombatStats => self.combat_stats(),
            SlotKey::HitPoints => {
                let hp = |v: Option<i32>| v.map(|n| n.to_string()).unwrap_or_default();
                content(
                    "hit_points",
                    &HitPointsBody {
                        hp_maximum: hp(sheet.combat.hp_maximum),
                        hp_current: hp(sheet.combat.hp_current),
                        hp_temporary: hp(sheet.combat.hp_temporary),
                    },
                )
            }
            SlotKey::HitDiceDeath => content(
                "hit_dice_death",
                &HitDiceDeathBody {
                    hit_dice: sheet.combat.hit_dice.clone(),
                    death_saves: sheet.combat.death_saves,
                },
            ),
            SlotKey::Attacks => content(
                "attacks",
                &AttacksBody {
                    attacks: sheet.attacks.clone(),
                    min_rows: ATTACK_ROWS,
                },
            ),
            SlotKey::Currency => content("currency", &CurrencyBody { currency: sheet.currency }),
            SlotKey::Equipment => styled_list(&sheet.equipment, "styled-list"),
            SlotKey::PersonalityTraits => text_block(&sheet.personality.traits),
            SlotKey::Ideals => text_block(&sheet.personality.ideals),
            SlotKey::Bonds => text_block(&sheet.personality.bonds),
            SlotKey::Flaws => text_block(&sheet.personality.flaws),
            SlotKey::Features => styled_list(&sheet.features_traits, "styled-list"),
            SlotKey::Gallery if sheet.meta.gallery.is_empty() => Binding::Empty,
            SlotKey::Gallery => content(
                "gallery",
                &GalleryBody {
                    images: sheet.meta.gallery.clone(),
                },
            ),

            SlotKey::Age => Binding::Value(sheet.appearance.age.clone()),
            SlotKey::Height => Binding::Value(sheet.appearance.height.clone()),
            SlotKey::Weight => Binding::Value(sheet.appearance.weight.clone()),
            SlotKey::Eyes => Binding::Value(sheet.appearance.eyes.clone()),
            SlotKey::Skin => Binding::Value(sheet.appearance.skin.clone()),
            SlotKey::Hair => Binding::Value(sheet.appearance.hair.clone()),
            SlotKey::Appearance => paragraphs(&sheet.character_appearance_description),
            SlotKey::Backstory => paragraphs(&sheet.backstory),
            SlotKey::AlliesName => Binding::Value(sheet.allies_organizations.name.clone()),
            SlotKey::Allies => paragraphs(&sheet.allies_organizations.description),
            SlotKey::AdditionalFeatures => styled_list(&sheet.additional_features_traits, "styled-list"),
            SlotKey::Treasure => styled_list(&sheet.treasure, "styled-list"),

            SlotKey::SpellcastingClass => {
                Binding::Value(self.spellcasting().map(|sc| sc.class.clone()).unwrap_or_default())
            }
            SlotKey::SpellAbility => Binding::Value(self.spellcasting().map(|sc| sc.ability.clone()).unwrap_or_default()),
            SlotKey::SpellSaveDc => self.spell_save_dc(),
            SlotKey::SpellAttackBonus => self.spell_attack_bonus(),
            SlotKey::SpellLevel(level) => self.spell_level(level),

            SlotKey::TurnStructure => match reference.and_then(|r| r.turn_structure.as_ref()) {
                Some(turn) => content("turn_structure", turn),
                None => Binding::Empty,
            },
            SlotKey::CombatReference => match reference.and_then(|r| r.combat_reference.as_ref()) {
                Some(combat) => content("combat_reference", combat),
                None => Binding::Empty,
            },
            SlotKey::Weapons => content(
                "weapon_card",
                &WeaponCardsBody {
                    weapons: reference.map(|r| r.weapons.clone()).unwrap_or_default(),
                },
            ),
            SlotKey::SpellCards => content(
                "spell_card",
                &SpellCardsBody {
                    spells: reference.map(|r| r.spells.clone()).unwrap_or_default(),
                },
            ),
            SlotKey::FeatureCards => match reference.filter(|r| !r.features.is_empty()) {
                Some(r) => content(
                    "feature_card",
                    &FeatureCardsBody {
                        features: r.features.clone(),
                    },
                ),
                None => Binding::Empty,
            },
            SlotKey::Companion => match &sheet.companion {
                Some(companion) => content(
                    "companion",
                    &CompanionBody {
                        companion: Some(companion.clone()),
                    },
                ),
                None => Binding::Empty,
            },

            SlotKey::ItemImage
            | SlotKey::ItemName
            | SlotKey::ItemSubtitle
            | SlotKey::ItemStats
            | SlotKey::FooterLeft
            | SlotKey::FooterRight => Binding::Unbound,
        }
    }
}

// ---------------------------------------------------------------------------
// Item card
// ---------------------------------------------------------------------------

pub fn assemble_item(item: &Item, ctx: &RenderContext<'_>) -> Document {
    let binder = ItemBinder { item };
    let mut pages: Vec<Fragment> = item
        .pages
        .iter()
        .enumerate()
        .map(|(i, page)| item_page(page, i == 0, &binder, ctx))
        .collect();
    if pages.is_empty() {
        // A card with no pages still shows its header and footer.
        pages.push(item_page(&Page::default(), true, &binder, ctx));
    }
    let name = non_empty(&item.header.name).unwrap_or("Magic Item");
    log::debug!("assembled item card '{name}' with {} page(s)", pages.len());
    Document {
        meta: DocumentMeta {
            title: format!("{name} - Magic Item"),
            kind: DocumentKind::Item,
            generated_at: None,
        },
        pages,
    }
}

fn item_page(page: &Page, first: bool, binder: &ItemBinder<'_>, ctx: &RenderContext<'_>) -> Fragment {
    let mut grid = Grid::new(page.layout.columns)
        .role("item-columns")
        .gap(gap_from_css(&page.layout.gap));
    for section in &page.sections {
        grid.place_or_degrade(section.column, section_fragment(section, ctx));
    }

    let mut body = Col::new().role("page-body");
    if first {
        if let Some(header) = schema::build(&ITEM_HEADER, binder, ctx) {
            body = body.child(header);
        }
    }
    body = body.grow_child(grid.build(), 1);
    if first {
        if let Some(footer) = schema::build(&ITEM_FOOTER, binder, ctx) {
            body = body.child(footer);
        }
    }
    body.build()
}

/// A section is a box whose role follows its variant and whose body is the
/// rendered content block.
pub fn section_fragment(section: &Section, ctx: &RenderContext<'_>) -> Fragment {
    let role = match section.variant {
        SectionVariant::Default => "section",
        SectionVariant::Lore => "section section--lore",
        SectionVariant::Highlight => "section section--highlight",
    };
    let mut builder = BoxBuilder::new().role(role).fill(section.flex_grow);
    if let Some(title) = section.title.as_deref().and_then(non_empty) {
        builder = builder.title(title);
    }
    builder.child(ctx.registry.render(&section.content, ctx)).build()
}

/// Map a CSS length such as `"3mm"` onto the nearest spacing step.
fn gap_from_css(gap: &str) -> Gap {
    let number: String = gap.chars().take_while(|c| c.is_ascii_digit() || *c == '.').collect();
    match number.parse::<f32>() {
        Ok(mm) if mm <= 0.0 => Gap::None,
        Ok(mm) if mm <= 1.0 => Gap::Xs,
        Ok(mm) if mm <= 2.0 => Gap::Sm,
        Ok(mm) if mm <= 4.0 => Gap::Md,
        Ok(_) => Gap::Lg,
        Err(_) => Gap::Md,
    }
}

/// Binds the item header and footer slots.
pub struct ItemBinder<'a> {
    item: &'a Item,
}

impl SlotBinder for ItemBinder<'_> {
    fn bind(&self, key: SlotKey) -> Binding {
        let header = &self.item.header;
        match key {
            SlotKey::ItemImage => match non_empty(&header.image) {
                Some(src) => Binding::Fragment(Fragment::image("item-image", src, &header.name)),
                None => Binding::Empty,
            },
            SlotKey::ItemName => Binding::Value(header.name.clone()),
            SlotKey::ItemSubtitle => Binding::Value(header.subtitle.clone()),
            SlotKey::ItemStats => content(
                "item_stats",
                &ItemStatsBody {
                    stats: header.stats.clone(),
                },
            ),
            SlotKey::FooterLeft => Binding::Value(self.item.footer.left.clone()),
            SlotKey::FooterRight => Binding::Value(self.item.footer.right.clone()),
            _ => Binding::Unbound,
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn content<T: serde::Serialize>(tag: &str, body: &T) -> Binding {
    Binding::Content(ContentBlock::encode(tag, body))
}

fn text_block(text: &str) -> Binding {
    content("text", &json!({ "text": text, "class": "trait-content" }))
}

fn paragraphs(text: &str) -> Binding {
    content("paragraphs", &json!({ "text": text, "class": "text-content" }))
}

fn styled_list(items: &[String], class: &str) -> Binding {
    content("styled_list", &json!({ "items": items, "class": class }))
}

fn derived_binding(value: Option<String>) -> Binding {
    match value {
        Some(v) => Binding::Value(v),
        None => Binding::Fragment(Fragment::unavailable()),
    }
}

fn non_empty(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn clamp_i32(n: i64) -> i32 {
    n.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// `"animal_handling"` → `"Animal Handling"`.
fn title_case(key: &str) -> String {
    key.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
