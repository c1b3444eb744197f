//! Static page schemas.
//!
//! Every page of the character sheet, plus the item header and footer, is a
//! `static` tree of layout nodes with named [`SlotKey`] holes. One walker,
//! [`build`], turns a schema into fragments, asking a [`SlotBinder`] what
//! goes in each slot. The schemas hold no data and no document logic.

use crate::components::{BoxBuilder, Col, FlexBuilder, Grid, Row};
use crate::fragment::{Fragment, TitlePosition};
use crate::model::ContentBlock;
use crate::registry::RenderContext;

/// Named holes in the page schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotKey {
    // Page 1
    CharacterName,
    ClassLevel,
    Background,
    PlayerName,
    Race,
    Alignment,
    Experience,
    Portrait,
    AbilityScores,
    Inspiration,
    ProficiencyBonus,
    SavingThrows,
    Skills,
    PassivePerception,
    Proficiencies,
    CombatStats,
    HitPoints,
    HitDiceDeath,
    Attacks,
    Currency,
    Equipment,
    PersonalityTraits,
    Ideals,
    Bonds,
    Flaws,
    Features,
    Gallery,
    // Page 2
    Age,
    Height,
    Weight,
    Eyes,
    Skin,
    Hair,
    Appearance,
    Backstory,
    AlliesName,
    Allies,
    AdditionalFeatures,
    Treasure,
    // Page 3
    SpellcastingClass,
    SpellAbility,
    SpellSaveDc,
    SpellAttackBonus,
    /// 0 is the cantrip list.
    SpellLevel(u8),
    // Page 4
    TurnStructure,
    CombatReference,
    Weapons,
    SpellCards,
    FeatureCards,
    Companion,
    // Item
    ItemImage,
    ItemName,
    ItemSubtitle,
    ItemStats,
    FooterLeft,
    FooterRight,
}

/// What an empty slot turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    /// An empty value, keeping the slot's space.
    Blank,
    /// A `—` placeholder.
    Dash,
    /// Nothing at all.
    Omit,
}

/// A binder's answer for one slot.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    /// Rendered through the registry.
    Content(ContentBlock),
    /// Plain display text; an empty string counts as [`Binding::Empty`].
    Value(String),
    /// A fragment built by the binder itself.
    Fragment(Fragment),
    /// No data; the slot's [`EmptyState`] decides.
    Empty,
    /// The binder does not know this slot.
    Unbound,
}

/// Supplies slot values for one document type.
pub trait SlotBinder {
    fn bind(&self, key: SlotKey) -> Binding;
}

#[derive(Debug, Clone, Copy)]
pub struct BoxNode {
    pub role: &'static str,
    pub title: Option<&'static str>,
    pub title_position: TitlePosition,
    pub fill: bool,
    pub centered: bool,
    pub body: &'static [Node],
}

impl BoxNode {
    pub const PLAIN: BoxNode = BoxNode {
        role: "box",
        title: None,
        title_position: TitlePosition::Top,
        fill: false,
        centered: false,
        body: &[],
    };
}

/// One node of a page schema.
#[derive(Debug, Clone, Copy)]
pub enum Node {
    Box(BoxNode),
    Row(&'static str, &'static [Node]),
    Col(&'static str, &'static [Node]),
    /// A flex child that takes a share of the remaining space.
    Grow(u32, &'static Node),
    /// `(role, column count, (1-based column, child) placements)`.
    Grid(&'static str, usize, &'static [(usize, Node)]),
    /// `(key, role of plain values, empty-state policy)`.
    Slot(SlotKey, &'static str, EmptyState),
    /// Fixed text: `(role, text)`.
    Label(&'static str, &'static str),
}

// ---------------------------------------------------------------------------
// Schema shorthands
// ---------------------------------------------------------------------------

macro_rules! slot {
    ($key:expr, $role:literal) => {
        Node::Slot($key, $role, EmptyState::Blank)
    };
    ($key:expr, $role:literal, $empty:ident) => {
        Node::Slot($key, $role, EmptyState::$empty)
    };
}

/// Box with its label under the body.
macro_rules! labelled {
    ($role:literal, $title:literal, [$($body:expr),* $(,)?]) => {
        Node::Box(BoxNode {
            role: $role,
            title: Some($title),
            title_position: TitlePosition::Bottom,
            body: &[$($body),*],
            ..BoxNode::PLAIN
        })
    };
}

/// Box with its label above the body.
macro_rules! titled {
    ($role:literal, $title:literal, [$($body:expr),* $(,)?]) => {
        Node::Box(BoxNode {
            role: $role,
            title: Some($title),
            body: &[$($body),*],
            ..BoxNode::PLAIN
        })
    };
}

/// Like `titled!`, filling the remaining space of its column.
macro_rules! titled_fill {
    ($role:literal, $title:literal, [$($body:expr),* $(,)?]) => {
        Node::Box(BoxNode {
            role: $role,
            title: Some($title),
            fill: true,
            body: &[$($body),*],
            ..BoxNode::PLAIN
        })
    };
}

/// Small centered header field with a value and a label.
macro_rules! info_field {
    ($key:expr, $title:literal) => {
        Node::Box(BoxNode {
            role: "info-field",
            title: Some($title),
            title_position: TitlePosition::Bottom,
            centered: true,
            body: &[slot!($key, "value-medium")],
            ..BoxNode::PLAIN
        })
    };
}

const BRAND: Node = Node::Label("header-brand", "Dungeons & Dragons");

const NOTES_LINES: Node = Node::Label("notes-lines", "");

// ---------------------------------------------------------------------------
// Character sheet
// ---------------------------------------------------------------------------

static PAGE_MAIN: Node = Node::Col(
    "page-body",
    &[
        Node::Row(
            "page-header",
            &[
                Node::Col(
                    "header-left",
                    &[
                        BRAND,
                        Node::Row(
                            "header-name-row",
                            &[
                                slot!(SlotKey::Portrait, "portrait", Omit),
                                Node::Grow(1, &labelled!("header-name", "Character Name", [slot!(SlotKey::CharacterName, "value-large")])),
                            ],
                        ),
                    ],
                ),
                Node::Grow(
                    1,
                    &Node::Grid(
                        "header-right",
                        3,
                        &[
                            (1, info_field!(SlotKey::ClassLevel, "Class & Level")),
                            (2, info_field!(SlotKey::Background, "Background")),
                            (3, info_field!(SlotKey::PlayerName, "Player Name")),
                            (1, info_field!(SlotKey::Race, "Race")),
                            (2, info_field!(SlotKey::Alignment, "Alignment")),
                            (3, info_field!(SlotKey::Experience, "Experience Points")),
                        ],
                    ),
                ),
            ],
        ),
        Node::Grow(
            1,
            &Node::Grid(
                "main-content",
                3,
                &[
                    (
                        1,
                        Node::Row(
                            "left-section",
                            &[
                                Node::Col("abilities-column", &[slot!(SlotKey::AbilityScores, "abilities")]),
                                Node::Grow(
                                    1,
                                    &Node::Col(
                                        "stats-column",
                                        &[
                                            labelled!("stat-row", "Inspiration", [slot!(SlotKey::Inspiration, "stat-circle")]),
                                            labelled!(
                                                "stat-row",
                                                "Proficiency Bonus",
                                                [slot!(SlotKey::ProficiencyBonus, "stat-circle", Dash)]
                                            ),
                                            titled!("saves-skills-box", "Saving Throws", [slot!(SlotKey::SavingThrows, "saves")]),
                                            titled_fill!("saves-skills-box", "Skills", [slot!(SlotKey::Skills, "skills")]),
                                        ],
                                    ),
                                ),
                            ],
                        ),
                    ),
                    (
                        1,
                        labelled!(
                            "passive-box",
                            "Passive Wisdom (Perception)",
                            [slot!(SlotKey::PassivePerception, "passive-value", Dash)]
                        ),
                    ),
                    (
                        1,
                        labelled!(
                            "proficiencies-box",
                            "Other Proficiencies & Languages",
                            [slot!(SlotKey::Proficiencies, "list")]
                        ),
                    ),
                    (2, slot!(SlotKey::CombatStats, "combat")),
                    (2, slot!(SlotKey::HitPoints, "hit-points")),
                    (2, slot!(SlotKey::HitDiceDeath, "hit-dice")),
                    (2, titled!("attacks-box", "Attacks & Spellcasting", [slot!(SlotKey::Attacks, "attacks")])),
                    (
                        2,
                        labelled!(
                            "equipment-box",
                            "Equipment",
                            [slot!(SlotKey::Currency, "currency"), slot!(SlotKey::Equipment, "list")]
                        ),
                    ),
                    (3, labelled!("trait-box", "Personality Traits", [slot!(SlotKey::PersonalityTraits, "trait-content")])),
                    (3, labelled!("trait-box", "Ideals", [slot!(SlotKey::Ideals, "trait-content")])),
                    (3, labelled!("trait-box", "Bonds", [slot!(SlotKey::Bonds, "trait-content")])),
                    (3, labelled!("trait-box", "Flaws", [slot!(SlotKey::Flaws, "trait-content")])),
                    (3, labelled!("trait-box", "Features & Traits", [slot!(SlotKey::Features, "list")])),
                    (3, titled_fill!("notes-box", "Notes", [NOTES_LINES])),
                ],
            ),
        ),
        slot!(SlotKey::Gallery, "gallery", Omit),
    ],
);

static PAGE_BACKGROUND: Node = Node::Col(
    "page-body",
    &[
        Node::Row(
            "page-header",
            &[
                Node::Col(
                    "header-left",
                    &[
                        BRAND,
                        labelled!("header-name", "Character Name", [slot!(SlotKey::CharacterName, "value-large")]),
                    ],
                ),
                Node::Grow(
                    1,
                    &Node::Grid(
                        "header-right",
                        3,
                        &[
                            (1, info_field!(SlotKey::Age, "Age")),
                            (2, info_field!(SlotKey::Height, "Height")),
                            (3, info_field!(SlotKey::Weight, "Weight")),
                            (1, info_field!(SlotKey::Eyes, "Eyes")),
                            (2, info_field!(SlotKey::Skin, "Skin")),
                            (3, info_field!(SlotKey::Hair, "Hair")),
                        ],
                    ),
                ),
            ],
        ),
        Node::Grid(
            "page2-columns",
            2,
            &[
                (1, titled!("large-box", "Character Appearance", [slot!(SlotKey::Appearance, "text")])),
                (1, titled_fill!("large-box", "Character Backstory", [slot!(SlotKey::Backstory, "text")])),
                (
                    2,
                    titled!(
                        "large-box",
                        "Allies & Organizations",
                        [slot!(SlotKey::AlliesName, "allies-name", Omit), slot!(SlotKey::Allies, "text")]
                    ),
                ),
                (2, titled!("large-box", "Additional Features & Traits", [slot!(SlotKey::AdditionalFeatures, "list")])),
                (2, titled_fill!("large-box", "Treasure", [slot!(SlotKey::Treasure, "list")])),
            ],
        ),
        Node::Grow(1, &titled_fill!("large-box notes-box", "Notes", [NOTES_LINES])),
    ],
);

static PAGE_SPELLS: Node = Node::Col(
    "page-body",
    &[
        Node::Row(
            "page-header",
            &[
                Node::Col(
                    "header-left",
                    &[
                        BRAND,
                        labelled!(
                            "header-name",
                            "Spellcasting Class",
                            [slot!(SlotKey::SpellcastingClass, "value-large")]
                        ),
                    ],
                ),
                Node::Grow(
                    1,
                    &Node::Grid(
                        "header-right",
                        3,
                        &[
                            (1, info_field!(SlotKey::SpellAbility, "Spellcasting Ability")),
                            (2, info_field!(SlotKey::SpellSaveDc, "Spell Save DC")),
                            (3, info_field!(SlotKey::SpellAttackBonus, "Spell Attack Bonus")),
                        ],
                    ),
                ),
            ],
        ),
        Node::Grow(
            1,
            &Node::Grid(
                "spell-grid",
                3,
                &[
                    (1, slot!(SlotKey::SpellLevel(0), "spells")),
                    (2, slot!(SlotKey::SpellLevel(1), "spells")),
                    (3, slot!(SlotKey::SpellLevel(2), "spells")),
                    (1, slot!(SlotKey::SpellLevel(3), "spells")),
                    (2, slot!(SlotKey::SpellLevel(4), "spells")),
                    (3, slot!(SlotKey::SpellLevel(5), "spells")),
                    (1, slot!(SlotKey::SpellLevel(6), "spells")),
                    (2, slot!(SlotKey::SpellLevel(7), "spells")),
                    (3, slot!(SlotKey::SpellLevel(8), "spells")),
                    (1, slot!(SlotKey::SpellLevel(9), "spells")),
                    (2, titled_fill!("spell-level notes-box", "Notes", [NOTES_LINES])),
                    (3, titled_fill!("spell-level notes-box", "Notes", [NOTES_LINES])),
                ],
            ),
        ),
    ],
);

static PAGE_REFERENCE: Node = Node::Col(
    "page-body",
    &[
        Node::Row(
            "page-header",
            &[
                Node::Col(
                    "header-left",
                    &[
                        BRAND,
                        Node::Box(BoxNode {
                            role: "header-name",
                            title: Some("Quick Reference"),
                            title_position: TitlePosition::Top,
                            body: &[slot!(SlotKey::CharacterName, "value-large")],
                            ..BoxNode::PLAIN
                        }),
                    ],
                ),
                Node::Grow(
                    1,
                    &Node::Grid(
                        "header-right",
                        3,
                        &[
                            (1, info_field!(SlotKey::ClassLevel, "Class & Level")),
                            (2, info_field!(SlotKey::ProficiencyBonus, "Proficiency Bonus")),
                            (3, info_field!(SlotKey::SpellSaveDc, "Spell Save DC")),
                        ],
                    ),
                ),
            ],
        ),
        Node::Grow(
            1,
            &Node::Grid(
                "page4-grid",
                2,
                &[
                    (1, slot!(SlotKey::TurnStructure, "reference", Omit)),
                    (1, slot!(SlotKey::CombatReference, "reference", Omit)),
                    (1, titled_fill!("ref-box", "Weapons", [slot!(SlotKey::Weapons, "reference")])),
                    (2, titled!("ref-box", "Spells", [slot!(SlotKey::SpellCards, "reference")])),
                    (2, slot!(SlotKey::FeatureCards, "reference", Omit)),
                    (2, slot!(SlotKey::Companion, "companion", Omit)),
                ],
            ),
        ),
    ],
);

/// The four character-sheet pages: main stats, background, spellcasting,
/// quick reference.
pub static CHARACTER_PAGES: [&Node; 4] = [&PAGE_MAIN, &PAGE_BACKGROUND, &PAGE_SPELLS, &PAGE_REFERENCE];

// ---------------------------------------------------------------------------
// Item card
// ---------------------------------------------------------------------------

pub static ITEM_HEADER: Node = Node::Row(
    "item-header",
    &[
        slot!(SlotKey::ItemImage, "item-image", Omit),
        Node::Grow(
            1,
            &Node::Col(
                "item-title-block",
                &[
                    Node::Col(
                        "item-title-group",
                        &[
                            slot!(SlotKey::ItemName, "item-name"),
                            slot!(SlotKey::ItemSubtitle, "item-subtitle", Omit),
                        ],
                    ),
                    slot!(SlotKey::ItemStats, "item-stats"),
                ],
            ),
        ),
    ],
);

pub static ITEM_FOOTER: Node = Node::Row(
    "item-footer",
    &[
        Node::Grow(1, &slot!(SlotKey::FooterLeft, "footer-left")),
        slot!(SlotKey::FooterRight, "market-value"),
    ],
);

// ---------------------------------------------------------------------------
// Walker
// ---------------------------------------------------------------------------

/// Build the fragment for `node`. `None` means the node was omitted.
pub fn build(node: &Node, binder: &dyn SlotBinder, ctx: &RenderContext<'_>) -> Option<Fragment> {
    match node {
        Node::Box(b) => {
            let mut builder = BoxBuilder::new()
                .role(b.role)
                .title_at(b.title_position)
                .fill(b.fill)
                .centered(b.centered);
            if let Some(title) = b.title {
                builder = builder.title(title);
            }
            let body = b.body.iter().filter_map(|child| build(child, binder, ctx));
            Some(builder.children(body).build())
        }
        Node::Row(role, children) => Some(build_flex(Row::new().role(role), children, binder, ctx)),
        Node::Col(role, children) => Some(build_flex(Col::new().role(role), children, binder, ctx)),
        Node::Grow(_, inner) => build(inner, binder, ctx),
        Node::Grid(role, columns, cells) => {
            let mut grid = Grid::new(*columns).role(role);
            for (column, cell) in cells.iter() {
                if let Some(fragment) = build(cell, binder, ctx) {
                    grid.place_or_degrade(*column, fragment);
                }
            }
            Some(grid.build())
        }
        Node::Slot(key, role, empty) => build_slot(*key, role, *empty, binder, ctx),
        Node::Label(role, text) => Some(Fragment::literal(role, *text)),
    }
}

fn build_flex(mut flex: FlexBuilder, children: &[Node], binder: &dyn SlotBinder, ctx: &RenderContext<'_>) -> Fragment {
    for child in children {
        let grow = match child {
            Node::Grow(grow, _) => *grow,
            _ => 0,
        };
        if let Some(fragment) = build(child, binder, ctx) {
            flex = flex.grow_child(fragment, grow);
        }
    }
    flex.build()
}

fn build_slot(
    key: SlotKey,
    role: &str,
    empty: EmptyState,
    binder: &dyn SlotBinder,
    ctx: &RenderContext<'_>,
) -> Option<Fragment> {
    match binder.bind(key) {
        Binding::Content(block) => Some(ctx.registry.render(&block, ctx)),
        Binding::Fragment(fragment) => Some(fragment),
        Binding::Value(value) if !value.is_empty() => Some(Fragment::literal(role, value)),
        Binding::Value(_) | Binding::Empty => match empty {
            EmptyState::Blank => Some(Fragment::literal(role, "")),
            EmptyState::Dash => Some(Fragment::dash()),
            EmptyState::Omit => None,
        },
        Binding::Unbound => {
            log::warn!("no binding for slot {key:?}");
            Some(Fragment::warning(format!("[unbound slot: {key:?}]")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::PlaceholderKind;
    use crate::registry::RendererRegistry;

    /// Binds every slot to its debug name.
    struct EchoBinder;

    impl SlotBinder for EchoBinder {
        fn bind(&self, key: SlotKey) -> Binding {
            Binding::Value(format!("{key:?}"))
        }
    }

    struct EmptyBinder;

    impl SlotBinder for EmptyBinder {
        fn bind(&self, _key: SlotKey) -> Binding {
            Binding::Empty
        }
    }

    fn collect_slots(node: &Node, out: &mut Vec<SlotKey>) {
        match node {
            Node::Box(b) => b.body.iter().for_each(|n| collect_slots(n, out)),
            Node::Row(_, children) | Node::Col(_, children) => children.iter().for_each(|n| collect_slots(n, out)),
            Node::Grow(_, inner) => collect_slots(inner, out),
            Node::Grid(_, _, cells) => cells.iter().for_each(|(_, n)| collect_slots(n, out)),
            Node::Slot(key, _, _) => out.push(*key),
            Node::Label(..) => {}
        }
    }

    fn grid_columns_in_range(node: &Node) -> bool {
        match node {
            Node::Box(b) => b.body.iter().all(grid_columns_in_range),
            Node::Row(_, children) | Node::Col(_, children) => children.iter().all(grid_columns_in_range),
            Node::Grow(_, inner) => grid_columns_in_range(inner),
            Node::Grid(_, columns, cells) => cells
                .iter()
                .all(|(c, n)| (1..=*columns).contains(c) && grid_columns_in_range(n)),
            Node::Slot(..) | Node::Label(..) => true,
        }
    }

    #[test]
    fn static_schemas_place_within_their_grids() {
        for page in CHARACTER_PAGES {
            assert!(grid_columns_in_range(page));
        }
        assert!(grid_columns_in_range(&ITEM_HEADER));
        assert!(grid_columns_in_range(&ITEM_FOOTER));
    }

    #[test]
    fn every_spell_level_has_a_slot() {
        let mut slots = Vec::new();
        collect_slots(CHARACTER_PAGES[2], &mut slots);
        for level in 0..=9 {
            assert!(slots.contains(&SlotKey::SpellLevel(level)), "level {level}");
        }
    }

    #[test]
    fn walker_fills_slots_in_schema_order() {
        let registry = RendererRegistry::empty();
        let ctx = RenderContext::new(&registry);
        let footer = build(&ITEM_FOOTER, &EchoBinder, &ctx).unwrap();
        assert_eq!(footer.plain_text(), "FooterLeft FooterRight");
        let Fragment::Row(row) = footer else { panic!("expected row") };
        assert_eq!(row.children[0].grow, 1);
        assert_eq!(row.children[1].grow, 0);
    }

    #[test]
    fn empty_states_apply() {
        let registry = RendererRegistry::empty();
        let ctx = RenderContext::new(&registry);
        let header = build(&ITEM_HEADER, &EmptyBinder, &ctx).unwrap();
        // Image and subtitle are omitted; name and stats stay blank.
        let Fragment::Row(row) = &header else { panic!("expected row") };
        assert_eq!(row.children.len(), 1);
        assert!(header.diagnostics().is_empty());

        let page = build(CHARACTER_PAGES[0], &EmptyBinder, &ctx).unwrap();
        let dashes = {
            let mut n = 0;
            page.visit(&mut |f| {
                if let Fragment::Placeholder(p) = f {
                    if p.kind == PlaceholderKind::Empty {
                        n += 1;
                    }
                }
            });
            n
        };
        // Proficiency bonus and passive perception.
        assert_eq!(dashes, 2);
    }

    #[test]
    fn unbound_slot_is_flagged() {
        struct NoneBinder;
        impl SlotBinder for NoneBinder {
            fn bind(&self, _key: SlotKey) -> Binding {
                Binding::Unbound
            }
        }
        let registry = RendererRegistry::empty();
        let ctx = RenderContext::new(&registry);
        let footer = build(&ITEM_FOOTER, &NoneBinder, &ctx).unwrap();
        assert_eq!(footer.diagnostics().len(), 2);
    }
}
