//! Parsing the free-text gate strings the ATC client hands out.
//!
//! Strings look like `Terminal 1 Gate 5A`, `International Gate 25A`,
//! `Pier C Gate 14 R` or just `Gate 5`. The gate identifier is read from the
//! end, the terminal keyword from the start, and whatever is left in the
//! middle describes the terminal.

use regex::Regex;

use crate::model::AssignmentRequest;

const NOISE_WORDS: &str = r"(?i)\b(overflow|gate|remote|stand|parking|terminal)\b";
const GATE_AT_END: &str = r"(?i)([A-Z])?(\d+)\s*([A-Z])?\s*$";

/// A gate string split into terminal and gate parts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedGate {
    /// Digits without leading zeros.
    pub gate_number: String,
    /// Letter in front of the number (`V` in `V05`).
    pub gate_prefix: String,
    /// Letter behind the number (`A` in `05A`).
    pub gate_suffix: String,
    /// Capitalized terminal keyword plus any descriptor, e.g. `Pier`.
    pub terminal_name: String,
    /// Single letter or digit naming the terminal, e.g. `C`.
    pub terminal_number: String,
    /// The trimmed input.
    pub raw: String,
}

impl ParsedGate {
    /// The request that puts the aircraft at this gate.
    pub fn to_request(&self, airport: &str) -> AssignmentRequest {
        AssignmentRequest {
            airport: airport.to_uppercase(),
            terminal: self.terminal_name.clone(),
            terminal_number: self.terminal_number.clone(),
            gate_letter: self.gate_prefix.clone(),
            gate_number: self.gate_number.clone(),
            gate_suffix: self.gate_suffix.clone(),
            airline: String::new(),
            wait_for_ground: true,
        }
    }
}

impl std::fmt::Display for ParsedGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::new();
        if !self.terminal_name.is_empty() {
            parts.push(format!("Terminal: {}", self.terminal_name));
        }
        if !self.terminal_number.is_empty() {
            parts.push(self.terminal_number.clone());
        }
        if !self.gate_number.is_empty() {
            parts.push(format!(
                "Gate: {}{}{}",
                self.gate_prefix, self.gate_number, self.gate_suffix
            ));
        }
        if parts.is_empty() {
            write!(f, "Raw: {}", self.raw)
        } else {
            write!(f, "{}", parts.join(" | "))
        }
    }
}

/// Parses gate strings, recognising a configurable set of terminal keywords.
#[derive(Debug, Clone)]
pub struct GateParser {
    terminal: Regex,
    gate: Regex,
    noise: Regex,
}

impl GateParser {
    /// Builds a parser for `keywords`, e.g. `Terminal`, `Pier`, `Concourse`.
    pub fn new(keywords: &[String]) -> Result<Self, regex::Error> {
        let alternatives = keywords
            .iter()
            .map(|k| regex::escape(k))
            .collect::<Vec<_>>()
            .join("|");
        Ok(Self {
            terminal: Regex::new(&format!(r"(?i)\b({alternatives})\b"))?,
            gate: Regex::new(GATE_AT_END)?,
            noise: Regex::new(NOISE_WORDS)?,
        })
    }

    /// Parses `text`. Returns `None` for an empty or blank string.
    pub fn parse(&self, text: &str) -> Option<ParsedGate> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let mut parsed = ParsedGate {
            raw: text.to_string(),
            ..ParsedGate::default()
        };

        let rest = match self.gate.captures(text) {
            Some(caps) => {
                let group = |i| caps.get(i).map_or("", |m| m.as_str());
                let digits = group(2).trim_start_matches('0');
                parsed.gate_number = if digits.is_empty() { "0" } else { digits }.to_string();
                parsed.gate_prefix = group(1).to_uppercase();
                // A prefixed gate carries no suffix: `V05A` is gate V5.
                if parsed.gate_prefix.is_empty() {
                    parsed.gate_suffix = group(3).to_uppercase();
                }
                let start = caps.get(0).map_or(text.len(), |m| m.start());
                text[..start].trim()
            }
            None => text,
        };

        if let Some(keyword) = self.terminal.find(rest) {
            let name = capitalize(keyword.as_str());
            let middle = self.noise.replace_all(&rest[keyword.end()..], "");
            let words: Vec<&str> = middle.split_whitespace().collect();
            match words.split_first() {
                Some((first, tail)) if is_terminal_number(first) => {
                    parsed.terminal_number = first.to_uppercase();
                    parsed.terminal_name = join_name(&name, tail);
                }
                _ => parsed.terminal_name = join_name(&name, &words),
            }
        } else if text.to_lowercase().contains("gate") {
            parsed.terminal_name = "Terminal".to_string();
        }

        Some(parsed)
    }
}

fn is_terminal_number(word: &str) -> bool {
    let mut chars = word.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_alphanumeric())
}

fn join_name(keyword: &str, words: &[&str]) -> String {
    if words.is_empty() {
        keyword.to_string()
    } else {
        format!("{keyword} {}", words.join(" "))
    }
}

/// First letter uppercased, the rest lowercased.
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::config::Config;

    fn parser() -> GateParser {
        GateParser::new(&Config::default().terminal_keywords).unwrap()
    }

    #[test]
    fn terminal_number_and_gate() {
        let gate = parser().parse("Terminal 7 7").unwrap();

        assert_eq!(gate.terminal_name, "Terminal");
        assert_eq!(gate.terminal_number, "7");
        assert_eq!(gate.gate_number, "7");
        assert_eq!(gate.raw, "Terminal 7 7");
    }

    #[test]
    fn bare_gate_defaults_to_terminal() {
        let gate = parser().parse("Gate 5").unwrap();

        assert_eq!(gate.terminal_name, "Terminal");
        assert_eq!(gate.terminal_number, "");
        assert_eq!(gate.gate_number, "5");
    }

    #[test]
    fn suffix_and_noise_words() {
        let gate = parser().parse("International Gate 25A").unwrap();

        assert_eq!(gate.terminal_name, "International");
        assert_eq!(gate.gate_number, "25");
        assert_eq!(gate.gate_suffix, "A");
    }

    #[test]
    fn letter_terminal_and_spaced_suffix() {
        let gate = parser().parse("Pier C Gate 14 R").unwrap();

        assert_eq!(gate.terminal_name, "Pier");
        assert_eq!(gate.terminal_number, "C");
        assert_eq!(gate.gate_number, "14");
        assert_eq!(gate.gate_suffix, "R");
    }

    #[test]
    fn prefix_and_leading_zeros() {
        let gate = parser().parse("Gate V05").unwrap();

        assert_eq!(gate.gate_prefix, "V");
        assert_eq!(gate.gate_number, "5");
        assert_eq!(parser().parse("Stand 000").unwrap().gate_number, "0");
    }

    #[test]
    fn multi_word_descriptor_is_kept() {
        let gate = parser().parse("terminal North Wing 12").unwrap();

        assert_eq!(gate.terminal_name, "Terminal North Wing");
        assert_eq!(gate.terminal_number, "");
        assert_eq!(gate.gate_number, "12");
    }

    #[test]
    fn empty_string_is_nothing() {
        assert!(parser().parse("").is_none());
        assert!(parser().parse("   ").is_none());
    }

    #[test]
    fn text_without_gate_keeps_raw_value() {
        let gate = parser().parse("Overflow").unwrap();

        assert_eq!(gate.gate_number, "");
        assert_eq!(gate.terminal_name, "");
        assert_eq!(gate.to_string(), "Raw: Overflow");
    }

    #[test]
    fn converts_to_request() {
        let request = parser().parse("Pier C Gate V14").unwrap().to_request("edds");

        assert_eq!(request.airport, "EDDS");
        assert_eq!(request.terminal_label(), "Pier C");
        assert_eq!(request.gate_designator(), "V14");
        assert!(request.wait_for_ground);
    }

    #[test]
    fn prefix_takes_precedence_over_suffix() {
        let gate = parser().parse("Gate V05A").unwrap();

        assert_eq!(gate.gate_prefix, "V");
        assert_eq!(gate.gate_number, "5");
        assert_eq!(gate.gate_suffix, "");
        assert_eq!(gate.to_request("EDDS").gate_designator(), "V5");
    }
}
