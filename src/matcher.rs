//! Gate matching: find the inventory position that best fits a requested
//! terminal and gate.
//!
//! Requests and sceneries rarely spell a gate the same way (`V19` against
//! `Gate V 19`, `Terminal 1` against `1`), so an exact key lookup is tried
//! first and a weighted fuzzy score decides otherwise.

pub mod similarity;

use std::sync::LazyLock;

use regex::Regex;

use crate::config::MatchingWeights;
use crate::model::{AirportInventory, InterpretedPosition};

static TRAILING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)([A-Z])?$").expect("static pattern"));

/// A gate designator split into its searchable parts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GateComponents {
    /// Everything before the number, uppercased (`V`, `STAND`).
    pub prefix: String,
    pub number: String,
    /// Letter directly after the number, uppercased.
    pub suffix: String,
}

impl GateComponents {
    /// The parts joined back together.
    pub fn reconstructed(&self) -> String {
        format!("{}{}{}", self.prefix, self.number, self.suffix)
    }
}

/// Splits a gate designator: `V19` is `V`/`19`, `5A` is `5`/`A`,
/// `Stand 501` is `STAND`/`501`.
pub fn parse_gate_components(text: &str) -> GateComponents {
    let text = text.trim();
    let Some(caps) = TRAILING_NUMBER.captures(text) else {
        return GateComponents {
            prefix: text.to_uppercase(),
            ..GateComponents::default()
        };
    };
    let start = caps.get(0).map_or(text.len(), |m| m.start());
    GateComponents {
        prefix: text[..start].trim().to_uppercase(),
        number: caps
            .get(1)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default(),
        suffix: caps
            .get(2)
            .map(|m| m.as_str().to_uppercase())
            .unwrap_or_default(),
    }
}

/// Per-component similarity, each on a 0 to 100 scale.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ComponentScores {
    pub gate_number: f64,
    /// Prefix similarity, averaged with the suffix check when either side
    /// has a suffix.
    pub gate_prefix: f64,
    pub terminal: f64,
}

/// The winning position for a query.
#[derive(Debug, Clone, PartialEq)]
pub struct GateMatch {
    pub position: InterpretedPosition,
    /// Terminal and gate matched an inventory key verbatim.
    pub exact: bool,
    pub score: f64,
    /// Absent for exact matches.
    pub components: Option<ComponentScores>,
}

/// Scores inventory positions against requested gates.
#[derive(Debug, Clone, Copy)]
pub struct GateMatcher {
    weights: MatchingWeights,
}

impl Default for GateMatcher {
    fn default() -> Self {
        Self::new(MatchingWeights::default())
    }
}

impl GateMatcher {
    pub fn new(weights: MatchingWeights) -> Self {
        Self { weights }
    }

    /// Weighted similarity between a query and a candidate, with the
    /// component scores it was built from.
    pub fn score(
        &self,
        query: &GateComponents,
        query_terminal: &str,
        candidate: &GateComponents,
        candidate_terminal: &str,
    ) -> (f64, ComponentScores) {
        let query_number = strip_zeros(&query.number);
        let candidate_number = strip_zeros(&candidate.number);
        let gate_number = if query_number.is_empty() || candidate_number.is_empty() {
            0.0
        } else if query_number == candidate_number {
            100.0
        } else {
            similarity::ratio(query_number, candidate_number)
        };

        let mut gate_prefix = if query.prefix.is_empty() && candidate.prefix.is_empty() {
            0.0
        } else {
            similarity::ratio(&query.prefix, &candidate.prefix)
        };
        if !query.suffix.is_empty() || !candidate.suffix.is_empty() {
            let suffix = if query.suffix == candidate.suffix { 100.0 } else { 0.0 };
            gate_prefix = f64::midpoint(gate_prefix, suffix);
        }

        let terminal = similarity::token_set_ratio(
            &query_terminal.to_lowercase(),
            &candidate_terminal.to_lowercase(),
        );

        let scores = ComponentScores {
            gate_number,
            gate_prefix,
            terminal,
        };
        let total = gate_number * self.weights.gate_number
            + gate_prefix * self.weights.gate_prefix
            + terminal * self.weights.terminal;
        tracing::trace!(
            "score of {candidate_terminal}/{}: number={gate_number:.1} prefix={gate_prefix:.1} \
             terminal={terminal:.1} -> {total:.1}",
            candidate.reconstructed()
        );
        (total, scores)
    }

    /// The best position for `terminal` and `gate`.
    ///
    /// An exact key match wins outright. Otherwise every position is scored
    /// and the highest wins; ties go to the one seen first. `None` only for
    /// an empty inventory.
    pub fn find_best_match(
        &self,
        inventory: &AirportInventory,
        terminal: &str,
        gate: &str,
    ) -> Option<GateMatch> {
        if let Some(position) = inventory.get(terminal, gate) {
            tracing::info!("exact match: {terminal} {gate}");
            return Some(GateMatch {
                position: position.clone(),
                exact: true,
                score: 100.0,
                components: None,
            });
        }

        let query = parse_gate_components(gate);
        let mut best: Option<(f64, ComponentScores, &InterpretedPosition)> = None;
        for position in inventory.positions() {
            let candidate = parse_gate_components(&position.gate);
            let (score, components) = self.score(&query, terminal, &candidate, &position.terminal);
            if best.as_ref().is_none_or(|(top, ..)| score > *top) {
                best = Some((score, components, position));
            }
        }

        let (score, components, position) = best?;
        tracing::info!(
            "best fuzzy match for {terminal} {gate}: {} with score {score:.1} \
             (num={:.0}, prefix={:.0}, term={:.0})",
            position.position_id,
            components.gate_number,
            components.gate_prefix,
            components.terminal
        );
        Some(GateMatch {
            position: position.clone(),
            exact: false,
            score,
            components: Some(components),
        })
    }
}

/// Drops leading zeros, keeping a lone `0`.
fn strip_zeros(number: &str) -> &str {
    let stripped = number.trim_start_matches('0');
    if stripped.is_empty() && !number.is_empty() {
        "0"
    } else {
        stripped
    }
}
