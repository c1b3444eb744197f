//! Sample input documents for testing and demonstration.
//!
//! Each sample exercises a different part of the input model.

/// A level 5 ranger with a beast companion, spellcasting and a reference page.
pub fn character_sample() -> &'static str {
    r##"{
    "meta": {"portrait": "", "gallery": []},
    "header": {
        "character_name": "Kazrek Stonewarden",
        "class_level": "Ranger 5",
        "background": "Outlander",
        "player_name": "Sam",
        "race": "Hill Dwarf",
        "alignment": "Neutral Good",
        "experience_points": 6500
    },
    "abilities": {
        "strength": {"score": 12},
        "dexterity": {"score": 14},
        "constitution": {"score": 15},
        "intelligence": {"score": 10},
        "wisdom": {"score": 16},
        "charisma": {"score": 8}
    },
    "saving_throws": {
        "strength": {"proficient": true},
        "dexterity": {"proficient": true}
    },
    "skills": {
        "animal_handling": {"proficient": true},
        "perception": {"proficient": true},
        "stealth": {"proficient": true},
        "survival": {"proficient": true}
    },
    "inspiration": false,
    "combat": {
        "armor_class": 15,
        "initiative": null,
        "speed": "25 ft",
        "hp_maximum": 44,
        "hp_current": 44,
        "hp_temporary": 0,
        "hit_dice": {"total": "5d10", "current": 5},
        "death_saves": {"successes": 0, "failures": 0}
    },
    "attacks": [
        {"name": "Longbow", "atk_bonus": "+7", "damage_type": "1d8+2 piercing"},
        {"name": "Shortsword", "atk_bonus": "+5", "damage_type": "1d6+2 piercing"}
    ],
    "personality": {
        "traits": "I watch the horizon more than the people in front of me.",
        "ideals": "**Freedom.** The wilds belong to no crown.",
        "bonds": "My wolf Ash is the only family I still have.",
        "flaws": "I trust animals far more than strangers."
    },
    "equipment": ["Longbow and 20 arrows", "Two shortswords", "Explorer's pack", "Hunting trap"],
    "proficiencies_languages": ["Common, Dwarvish, Sylvan", "Light and medium armor, shields", "Simple and martial weapons"],
    "features_traits": ["Favored Enemy: Orcs", "Natural Explorer: Forest", "Primeval Awareness"],
    "additional_features_traits": ["Dwarven Resilience: advantage on saves against poison"],
    "treasure": ["Carved bone whistle"],
    "currency": {"cp": 12, "sp": 30, "ep": 0, "gp": 47, "pp": 0},
    "appearance": {"age": "87", "height": "4'6\"", "weight": "160 lb", "eyes": "Grey", "skin": "Weathered", "hair": "Red, braided"},
    "character_appearance_description": "A stocky dwarf in a moss-green cloak.",
    "backstory": "Raised on the edge of the Thornwood.\n\nLeft the hold after the orc raids and never went back.",
    "allies_organizations": {"name": "The Emerald Enclave", "description": "Keepers of the natural balance."},
    "companion": {
        "name": "Ash",
        "size": "Medium",
        "type": "beast",
        "armor_class": 13,
        "hit_points": 11,
        "hp_notes": "2d8+2",
        "speed": "40 ft",
        "abilities": {"str": 12, "dex": 15, "con": 12, "int": 3, "wis": 12, "cha": 6},
        "skills": "Perception +3, Stealth +4",
        "senses": "passive Perception 13",
        "traits": [{"name": "Keen Hearing and Smell", "description": "Advantage on Perception checks that rely on hearing or smell."}],
        "actions": [{"name": "Bite", "description": "+4 to hit, 2d4+2 piercing. Strength DC 11 or knocked prone."}],
        "commands": ["Attack", "Dash", "Help"],
        "image": ""
    },
    "spellcasting": {
        "class": "Ranger",
        "ability": "Wisdom",
        "spell_save_dc": null,
        "spell_attack_bonus": null,
        "cantrips": [],
        "spells": {
            "1": {"slots_total": 4, "slots_expended": 1, "known": [
                {"name": "Hunter's Mark", "prepared": true},
                {"name": "Goodberry", "prepared": true},
                {"name": "Cure Wounds", "prepared": true}
            ]},
            "2": {"slots_total": 2, "slots_expended": 0, "known": [
                {"name": "Pass without Trace", "prepared": true}
            ]}
        }
    },
    "reference": {
        "turn_structure": {
            "phases": [
                {"name": "Move", "desc": "Up to your speed, split around actions."},
                {"name": "Action", "desc": "Attack, cast a spell, Dash, Dodge, Help, Hide."},
                {"name": "Bonus Action", "desc": "Hunter's Mark, or command Ash."}
            ],
            "reaction": "Opportunity attack when a creature leaves your reach."
        },
        "combat_reference": {
            "actions": [{"name": "Dodge", "desc": "Attacks against you have disadvantage."}],
            "conditions_quick": [{"name": "Prone", "desc": "Melee attacks against you have advantage."}],
            "cover": [{"type": "Half", "bonus": "+2 AC"}, {"type": "Three-quarters", "bonus": "+5 AC"}]
        },
        "weapons": [
            {"name": "Longbow", "type": "Martial ranged", "damage": "1d8 piercing", "properties": "Ammunition (150/600), heavy, two-handed", "notes": ""}
        ],
        "spells": [
            {"name": "Hunter's Mark", "level": "1st", "casting_time": "1 bonus action", "range": "90 ft", "duration": "Concentration, 1 hour", "description": "Extra **1d6** damage to the marked target."}
        ],
        "features": [{"name": "Extra Attack", "description": "Attack twice when you take the Attack action."}]
    }
}"##
}

/// A two-page magic item card exercising most content types.
pub fn item_sample() -> &'static str {
    r##"{
    "type": "item",
    "header": {
        "name": "Frostbite Blade",
        "subtitle": "Weapon (longsword), rare, requires attunement",
        "image": "",
        "stats": [
            {"label": "Damage", "value": "1d8 + 1d6 cold", "class": "damage"},
            {"label": "Weight", "value": "3 lb", "class": ""}
        ]
    },
    "footer": {"left": "Forged in the Spine of the World", "right": "Item #7"},
    "pages": [
        {
            "layout": {"columns": 2, "gap": "3mm"},
            "sections": [
                {"column": 1, "title": "Lore", "variant": "lore", "content": {
                    "type": "text_italic",
                    "text": "The blade hums in the cold and weeps in the heat."
                }},
                {"column": 1, "title": "Properties", "content": {
                    "type": "properties",
                    "items": [
                        {"icon": "❄", "name": "Frost Edge", "desc": "Deals an extra **1d6** cold damage."},
                        {"icon": "🔥", "name": "Fire Resistance", "desc": "While attuned you resist fire damage."}
                    ]
                }},
                {"column": 2, "title": "Charges", "variant": "highlight", "content": {
                    "type": "table",
                    "columns": ["Charges", "Effect"],
                    "rows": [["1", "Ice Knife"], ["3", "Cone of Cold"]],
                    "footer": "Regains 1d3 charges at dawn."
                }},
                {"column": 2, "title": "Upgrade", "flex_grow": true, "content": {
                    "type": "comparison",
                    "items": [{"before": "1d6", "after": "2d6"}, {"before": 3, "after": 5}]
                }}
            ]
        },
        {
            "layout": {"columns": 1},
            "sections": [
                {"title": "Tales", "content": {
                    "type": "mixed",
                    "blocks": [
                        {"type": "quote", "text": "Cold iron remembers.", "attribution": "Bruenor"},
                        {"type": "tales", "items": [{"title": "The Long Winter", "desc": "It froze a river solid for a season."}]},
                        {"type": "bullets", "items": ["Found in a frozen barrow", "Last wielded by a frost giant"]}
                    ]
                }}
            ]
        }
    ]
}"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SheetInput;

    #[test]
    fn samples_parse() {
        assert!(matches!(
            SheetInput::from_json(character_sample()).unwrap(),
            SheetInput::Character(_)
        ));
        assert!(matches!(SheetInput::from_json(item_sample()).unwrap(), SheetInput::Item(_)));
    }

    #[test]
    fn samples_pass_validation() {
        for sample in [character_sample(), item_sample()] {
            crate::loader::parse_str(sample).unwrap();
        }
    }
}
