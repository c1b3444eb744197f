//! Derived values – display conveniences computed from other fields.
//!
//! None of this is a rules engine. Every function is total: inputs outside
//! the supported range produce [`Derived::Unavailable`], which the assemblers
//! render as a `—` placeholder instead of failing the document.

use std::fmt;

/// Inclusive range of ability scores the calculator accepts.
pub const SCORE_RANGE: std::ops::RangeInclusive<i32> = 1..=30;
/// Inclusive range of character levels with a proficiency band.
pub const LEVEL_RANGE: std::ops::RangeInclusive<i32> = 1..=20;

/// A derived value, or the marker that it could not be derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Derived<T> {
    Value(T),
    Unavailable,
}

impl<T> Derived<T> {
    pub fn value(self) -> Option<T> {
        match self {
            Derived::Value(v) => Some(v),
            Derived::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Derived::Value(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Derived<U> {
        match self {
            Derived::Value(v) => Derived::Value(f(v)),
            Derived::Unavailable => Derived::Unavailable,
        }
    }

    /// Combine with another derived value; unavailable if either side is.
    pub fn zip<U>(self, other: Derived<U>) -> Derived<(T, U)> {
        match (self, other) {
            (Derived::Value(a), Derived::Value(b)) => Derived::Value((a, b)),
            _ => Derived::Unavailable,
        }
    }
}

impl<T> From<Option<T>> for Derived<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Derived::Value(v),
            None => Derived::Unavailable,
        }
    }
}

/// A signed modifier, displayed with an explicit sign (`+2`, `+0`, `-1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Modifier(pub i32);

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 >= 0 {
            write!(f, "+{}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// `floor((score - 10) / 2)` for scores in [`SCORE_RANGE`].
pub fn ability_modifier(score: i32) -> Derived<i32> {
    if !SCORE_RANGE.contains(&score) {
        return Derived::Unavailable;
    }
    // Integer division truncates toward zero; floor it explicitly.
    Derived::Value((score - 10).div_euclid(2))
}

/// Proficiency bonus band for a character level (1–4 → 2 … 17–20 → 6).
pub fn proficiency_bonus(level: i32) -> Derived<i32> {
    if !LEVEL_RANGE.contains(&level) {
        return Derived::Unavailable;
    }
    Derived::Value((level - 1) / 4 + 2)
}

/// Total character level from a class/level descriptor.
///
/// Every integer token is summed, so `"Ranger 5"` is 5 and
/// `"Fighter 3 / Rogue 2"` is 5. A descriptor with no digits is unavailable.
pub fn parse_level(class_level: &str) -> Derived<i32> {
    let mut total: Option<i32> = None;
    for token in class_level
        .split(|c: char| !c.is_ascii_digit())
        .filter(|t| !t.is_empty())
    {
        match token.parse::<i32>() {
            Ok(n) => total = Some(total.unwrap_or(0).saturating_add(n)),
            Err(_) => return Derived::Unavailable,
        }
    }
    total.into()
}

/// Proficiency bonus to display: explicit input always wins over the level
/// band derived from `class_level`.
pub fn effective_proficiency(explicit: Option<i32>, class_level: &str) -> Derived<i32> {
    match explicit {
        Some(bonus) => Derived::Value(bonus),
        None => match parse_level(class_level) {
            Derived::Value(level) => proficiency_bonus(level),
            Derived::Unavailable => Derived::Unavailable,
        },
    }
}

/// Modifier for a save or skill: the ability modifier, plus the proficiency
/// bonus when proficient. Proficiency is only needed when it applies.
pub fn check_modifier(ability_mod: Derived<i32>, proficient: bool, prof: Derived<i32>) -> Derived<i32> {
    if proficient {
        ability_mod.zip(prof).map(|(m, p)| m + p)
    } else {
        ability_mod
    }
}

/// Initiative defaults to the dexterity modifier when not supplied.
pub fn initiative(explicit: Option<i32>, dexterity_score: Option<i32>) -> Derived<i32> {
    match explicit {
        Some(v) => Derived::Value(v),
        None => match dexterity_score {
            Some(score) => ability_modifier(score),
            None => Derived::Unavailable,
        },
    }
}

/// `10 + wisdom modifier (+ proficiency if proficient in Perception)`.
pub fn passive_perception(wisdom_mod: Derived<i32>, proficient: bool, prof: Derived<i32>) -> Derived<i32> {
    check_modifier(wisdom_mod, proficient, prof).map(|m| 10 + m)
}

/// `8 + proficiency + casting modifier`.
pub fn spell_save_dc(casting_mod: Derived<i32>, prof: Derived<i32>) -> Derived<i32> {
    casting_mod.zip(prof).map(|(m, p)| 8 + p + m)
}

/// `proficiency + casting modifier`.
pub fn spell_attack_bonus(casting_mod: Derived<i32>, prof: Derived<i32>) -> Derived<i32> {
    casting_mod.zip(prof).map(|(m, p)| p + m)
}

/// Format a derived modifier for display, `None` when unavailable.
pub fn signed(value: Derived<i32>) -> Option<String> {
    value.value().map(|v| Modifier(v).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifier_matches_floor_formula_over_full_range() {
        let mut previous = i32::MIN;
        for score in SCORE_RANGE {
            let expected = ((score - 10) as f64 / 2.0).floor() as i32;
            let got = ability_modifier(score).value().unwrap();
            assert_eq!(got, expected, "score {score}");
            assert!(got >= previous, "modifier must be monotonic at {score}");
            previous = got;
        }
    }

    #[test]
    fn modifier_out_of_range_is_unavailable() {
        assert_eq!(ability_modifier(0), Derived::Unavailable);
        assert_eq!(ability_modifier(31), Derived::Unavailable);
        assert_eq!(ability_modifier(-4), Derived::Unavailable);
    }

    #[test]
    fn low_scores_round_down() {
        assert_eq!(ability_modifier(1), Derived::Value(-5));
        assert_eq!(ability_modifier(9), Derived::Value(-1));
        assert_eq!(ability_modifier(10), Derived::Value(0));
        assert_eq!(ability_modifier(11), Derived::Value(0));
        assert_eq!(ability_modifier(30), Derived::Value(10));
    }

    #[test]
    fn proficiency_band_boundaries() {
        let table = [
            (1, 2),
            (4, 2),
            (5, 3),
            (8, 3),
            (9, 4),
            (12, 4),
            (13, 5),
            (16, 5),
            (17, 6),
            (20, 6),
        ];
        for (level, bonus) in table {
            assert_eq!(proficiency_bonus(level), Derived::Value(bonus), "level {level}");
        }
        assert_eq!(proficiency_bonus(0), Derived::Unavailable);
        assert_eq!(proficiency_bonus(21), Derived::Unavailable);
    }

    #[test]
    fn level_parsing() {
        assert_eq!(parse_level("Ranger 5"), Derived::Value(5));
        assert_eq!(parse_level("Fighter 3 / Rogue 2"), Derived::Value(5));
        assert_eq!(parse_level("Wizard"), Derived::Unavailable);
        assert_eq!(parse_level(""), Derived::Unavailable);
        assert_eq!(parse_level("Bard 99999999999999"), Derived::Unavailable);
    }

    #[test]
    fn explicit_proficiency_wins() {
        assert_eq!(effective_proficiency(Some(7), "Ranger 5"), Derived::Value(7));
        assert_eq!(effective_proficiency(None, "Ranger 5"), Derived::Value(3));
        assert_eq!(effective_proficiency(None, "Ranger"), Derived::Unavailable);
    }

    #[test]
    fn initiative_defaults_to_dexterity() {
        assert_eq!(initiative(None, Some(14)), Derived::Value(2));
        assert_eq!(initiative(Some(5), Some(14)), Derived::Value(5));
        assert_eq!(initiative(None, None), Derived::Unavailable);
        assert_eq!(signed(initiative(None, Some(14))).as_deref(), Some("+2"));
    }

    #[test]
    fn passive_perception_adds_proficiency_only_when_proficient() {
        let wis = ability_modifier(14);
        assert_eq!(passive_perception(wis, false, Derived::Value(3)), Derived::Value(12));
        assert_eq!(passive_perception(wis, true, Derived::Value(3)), Derived::Value(15));
        assert_eq!(passive_perception(wis, false, Derived::Unavailable), Derived::Value(12));
        assert_eq!(passive_perception(wis, true, Derived::Unavailable), Derived::Unavailable);
    }

    #[test]
    fn spell_numbers() {
        let wis = ability_modifier(16);
        assert_eq!(spell_save_dc(wis, Derived::Value(3)), Derived::Value(14));
        assert_eq!(spell_attack_bonus(wis, Derived::Value(3)), Derived::Value(6));
    }

    #[test]
    fn modifier_display_has_explicit_sign() {
        assert_eq!(Modifier(2).to_string(), "+2");
        assert_eq!(Modifier(0).to_string(), "+0");
        assert_eq!(Modifier(-1).to_string(), "-1");
    }
}
