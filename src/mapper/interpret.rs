//! Turning raw tokens into terminal and gate keys.
//!
//! Sceneries file their stands in inconsistent ways, so this is a heuristic:
//! the leading digit of a number is usually the terminal, a letter prefix is
//! either a terminal or a stray side marker, and three-digit numbers without
//! a prefix are remote parking.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::{InterpretedPosition, RawPosition};

/// Letters that mark a side or a sub-stand rather than a terminal.
const SIDE_LETTERS: [&str; 5] = ["A", "B", "L", "R", "C"];

/// Stand-in number when a token has no digits.
const NO_NUMBER: &str = "-1";

static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(Gate|Parking)?([A-Z]+)?(\d+)?([A-Z]\b)?").expect("static pattern")
});

/// The parts of a position token.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TokenParts {
    pub kind: String,
    pub prefix: String,
    pub number: String,
    pub suffix: String,
}

/// Splits a token, with spaces removed, into kind word, letter prefix,
/// digits and letter suffix.
pub fn split_token(token: &str) -> TokenParts {
    let compact: String = token.chars().filter(|c| *c != ' ').collect();
    let group = |caps: &regex::Captures<'_>, i| {
        caps.get(i)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default()
    };
    let Some(caps) = TOKEN.captures(&compact) else {
        return TokenParts {
            number: NO_NUMBER.into(),
            ..TokenParts::default()
        };
    };
    let number = group(&caps, 3);
    TokenParts {
        kind: group(&caps, 1),
        prefix: group(&caps, 2),
        number: if number.is_empty() {
            NO_NUMBER.into()
        } else {
            number
        },
        suffix: group(&caps, 4),
    }
}

/// Files a raw position under a terminal and gate.
pub fn interpret_position(raw: &RawPosition) -> InterpretedPosition {
    let TokenParts {
        prefix,
        number,
        suffix,
        ..
    } = split_token(&raw.token);

    let mut gate = format!("{number}{suffix}");
    let mut terminal: String = number.chars().take(1).collect();
    let digits = number.len();

    if !prefix.is_empty() && !SIDE_LETTERS.contains(&prefix.as_str()) {
        terminal.clone_from(&prefix);
    } else if !prefix.is_empty() {
        if digits == 1 {
            terminal = "Terminal".into();
        } else if suffix.is_empty() {
            gate = format!("{number}{prefix}");
        }
    } else if digits == 3 {
        terminal = "Parking".into();
    } else if digits == 1 {
        terminal = "1".into();
    }

    InterpretedPosition {
        position_id: format!("Terminal {terminal} Gate {gate}"),
        terminal,
        gate,
        kind: raw.category,
        raw: raw.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::model::{Category, NavigationCoordinate};

    fn raw(token: &str, category: Category) -> RawPosition {
        RawPosition {
            token: token.into(),
            full_text: token.into(),
            coordinate: NavigationCoordinate::default(),
            menu_title: String::new(),
            depth: 1,
            category,
        }
    }

    fn keys(token: &str) -> (String, String) {
        let p = interpret_position(&raw(token, Category::Gate));
        (p.terminal, p.gate)
    }

    fn pair(terminal: &str, gate: &str) -> (String, String) {
        (terminal.into(), gate.into())
    }

    #[test]
    fn leading_digit_is_the_terminal() {
        assert_eq!(keys("11B"), pair("1", "11B"));
        assert_eq!(keys("25"), pair("2", "25"));
    }

    #[test]
    fn single_digits_go_to_terminal_one() {
        assert_eq!(keys("5A"), pair("1", "5A"));
        assert_eq!(keys("7"), pair("1", "7"));
    }

    #[test]
    fn three_digits_without_prefix_are_parking() {
        assert_eq!(keys("101"), pair("Parking", "101"));
    }

    #[test]
    fn other_prefixes_name_the_terminal() {
        assert_eq!(keys("Z52H"), pair("Z", "52H"));
        assert_eq!(keys("V19"), pair("V", "19"));
        assert_eq!(keys("Stand 501"), pair("Stand", "501"));
        assert_eq!(keys("Cargo Parking 101"), pair("CargoParking", "101"));
    }

    #[test]
    fn side_letters_move_behind_the_number() {
        assert_eq!(keys("A25"), pair("2", "25A"));
        assert_eq!(keys("A42B"), pair("4", "42B"));
        assert_eq!(keys("A5"), pair("Terminal", "5"));
    }

    #[test]
    fn kind_word_is_split_off() {
        let parts = split_token("Parking 12");

        assert_eq!(parts.kind, "Parking");
        assert_eq!(parts.prefix, "");
        assert_eq!(parts.number, "12");
    }

    #[test]
    fn token_without_digits_gets_placeholder_number() {
        let parts = split_token("Apron");

        assert_eq!(parts.prefix, "Apron");
        assert_eq!(parts.number, "-1");
        assert_eq!(keys("Apron"), pair("Apron", "-1"));
    }

    #[test]
    fn keeps_category_and_raw_record() {
        let p = interpret_position(&raw("Stand 501", Category::Parking));

        assert_eq!(p.kind, Category::Parking);
        assert_eq!(p.position_id, "Terminal Stand Gate 501");
        assert_eq!(p.raw.token, "Stand 501");
    }
}
