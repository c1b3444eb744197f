//! Loader – reads one input document and rejects structural problems before
//! assembly.
//!
//! The assembly core tolerates anything the types admit, degrading to
//! placeholders. The loader is the strict gate in front of it: a layout that
//! cannot be honoured is a [`ForgeError::Schema`] here, not a warning later.

use std::fs;
use std::path::Path;

use crate::error::{ForgeError, Result};
use crate::model::{CharacterSheet, Item, SheetInput};

/// Column counts a page layout may declare.
pub const ALLOWED_COLUMNS: [usize; 2] = [1, 2];

/// Read, parse and validate an input file.
pub fn load_file(path: &Path) -> Result<SheetInput> {
    let text = fs::read_to_string(path).map_err(|source| ForgeError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let input = parse_str(&text)?;
    log::info!("loaded '{}'", path.display());
    Ok(input)
}

/// Parse and validate an input document held in memory.
pub fn parse_str(json: &str) -> Result<SheetInput> {
    let input = SheetInput::from_json(json)?;
    validate(&input)?;
    Ok(input)
}

/// Check the invariants the types cannot express.
pub fn validate(input: &SheetInput) -> Result<()> {
    match input {
        SheetInput::Character(sheet) => validate_character(sheet),
        SheetInput::Item(item) => validate_item(item),
    }
}

fn validate_item(item: &Item) -> Result<()> {
    for (p, page) in item.pages.iter().enumerate() {
        let columns = page.layout.columns;
        if !ALLOWED_COLUMNS.contains(&columns) {
            return Err(ForgeError::schema(
                format!("pages[{p}].layout.columns"),
                format!("must be 1 or 2, got {columns}"),
            ));
        }
        for (s, section) in page.sections.iter().enumerate() {
            if section.column < 1 || section.column > columns {
                return Err(ForgeError::schema(
                    format!("pages[{p}].sections[{s}].column"),
                    format!("must be between 1 and {columns}, got {}", section.column),
                ));
            }
        }
    }
    Ok(())
}

fn validate_character(sheet: &CharacterSheet) -> Result<()> {
    let saves = &sheet.combat.death_saves;
    if saves.successes > 3 || saves.failures > 3 {
        return Err(ForgeError::schema(
            "combat.death_saves",
            format!(
                "at most 3 successes and 3 failures, got {} and {}",
                saves.successes, saves.failures
            ),
        ));
    }
    if let Some(spellcasting) = &sheet.spellcasting {
        for (key, level) in &spellcasting.spells {
            if !matches!(key.parse::<u8>(), Ok(1..=9)) {
                return Err(ForgeError::schema(
                    format!("spellcasting.spells.{key}"),
                    "spell level keys must be 1 through 9",
                ));
            }
            if level.slots_expended > level.slots_total {
                log::warn!(
                    "spellcasting.spells.{key}: {} slots expended of {}",
                    level.slots_expended,
                    level.slots_total
                );
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn item_with(columns: usize, column: usize) -> String {
        format!(
            r#"{{"type": "item", "header": {{"name": "Blade"}},
                "pages": [{{"layout": {{"columns": {columns}}},
                            "sections": [{{"column": {column}, "content": {{"type": "text", "text": "x"}}}}]}}]}}"#
        )
    }

    #[test]
    fn accepts_columns_in_range() {
        assert!(parse_str(&item_with(2, 2)).is_ok());
        assert!(parse_str(&item_with(1, 1)).is_ok());
    }

    #[test]
    fn rejects_section_beyond_layout() {
        let err = parse_str(&item_with(2, 3)).unwrap_err();
        match err {
            ForgeError::Schema { path, message } => {
                assert_eq!(path, "pages[0].sections[0].column");
                assert!(message.contains("got 3"));
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_column_zero() {
        assert!(matches!(parse_str(&item_with(2, 0)), Err(ForgeError::Schema { .. })));
    }

    #[test]
    fn rejects_three_column_layout() {
        let err = parse_str(&item_with(3, 1)).unwrap_err();
        assert!(matches!(err, ForgeError::Schema { ref path, .. } if path == "pages[0].layout.columns"));
    }

    #[test]
    fn rejects_bad_spell_level_key() {
        let json = r#"{"spellcasting": {"ability": "Wisdom", "spells": {"cantrip": {"slots_total": 1}}}}"#;
        assert!(matches!(parse_str(json), Err(ForgeError::Schema { .. })));
    }

    #[test]
    fn rejects_too_many_death_saves() {
        let json = r#"{"combat": {"death_saves": {"successes": 4}}}"#;
        assert!(matches!(parse_str(json), Err(ForgeError::Schema { .. })));
    }

    #[test]
    fn null_optional_fields_are_not_errors() {
        let item = r#"{"type": "item",
            "header": {"name": "X", "image": null, "subtitle": null, "stats": null},
            "footer": {"left": null, "right": null},
            "pages": [{"layout": {"columns": 1, "gap": null},
                       "sections": [{"column": null, "variant": null, "content": {"type": null, "text": null}}]}]}"#;
        assert!(matches!(parse_str(item).unwrap(), SheetInput::Item(_)));

        let character = r#"{"meta": {"portrait": null, "gallery": null},
            "header": {"character_name": null, "experience_points": null},
            "personality": {"flaws": null},
            "appearance": {"eyes": null},
            "backstory": null,
            "equipment": null,
            "proficiencies_languages": null,
            "allies_organizations": null,
            "combat": {"hit_dice": null, "death_saves": null},
            "companion": {"name": "Ash", "traits": null, "abilities": null},
            "spellcasting": {"ability": null, "spells": null},
            "reference": {"turn_structure": {"title": null, "phases": null}}}"#;
        let SheetInput::Character(sheet) = parse_str(character).unwrap() else {
            panic!("expected character sheet");
        };
        assert!(sheet.backstory.is_empty());
        assert!(sheet.equipment.is_empty());
        assert_eq!(sheet.companion.map(|c| c.name), Some("Ash".to_string()));
    }

    #[test]
    fn invalid_json_is_a_json_error() {
        assert!(matches!(parse_str("{not json"), Err(ForgeError::Json(_))));
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(item_with(1, 1).as_bytes()).unwrap();
        let input = load_file(file.path()).unwrap();
        assert!(matches!(input, SheetInput::Item(_)));
    }

    #[test]
    fn missing_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let err = load_file(&path).unwrap_err();
        assert!(err.to_string().contains("absent.json"));
    }
}
