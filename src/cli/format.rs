//! Output formatting for CLI display.

use std::fmt::Write;

use gate_director::matcher::GateMatch;
use gate_director::model::{AirportInventory, Category, InterpretedPosition};
use gate_director::telemetry::{GateEvent, ParsedGate, TelemetryUpdate};

fn category(kind: Category) -> &'static str {
    match kind {
        Category::Gate => "gate",
        Category::Parking => "parking",
    }
}

/// One position on one line: keys, category, and the option it came from.
pub(super) fn format_position(position: &InterpretedPosition) -> String {
    format!(
        "terminal '{}' gate '{}' [{}] ← {}",
        position.terminal,
        position.gate,
        category(position.kind),
        position.raw.full_text
    )
}

pub(super) fn format_parsed_gate(parsed: &ParsedGate) -> String {
    let terminal = format!("{} {}", parsed.terminal_name, parsed.terminal_number);
    let terminal = match terminal.trim() {
        "" => "-",
        t => t,
    };
    format!(
        "terminal: {terminal}\ngate: {}{}{}",
        parsed.gate_prefix, parsed.gate_number, parsed.gate_suffix
    )
}

pub(super) fn format_match(found: &GateMatch) -> String {
    let mut out = if found.exact {
        format!("exact match: {}", format_position(&found.position))
    } else {
        format!(
            "best match ({:.1}): {}",
            found.score,
            format_position(&found.position)
        )
    };
    if let Some(c) = &found.components {
        let _ = write!(
            out,
            "\n  gate number {:.1}, prefix {:.1}, terminal {:.1}",
            c.gate_number, c.gate_prefix, c.terminal
        );
    }
    out
}

/// Positions grouped by terminal, one line each.
pub(super) fn format_inventory(inventory: &AirportInventory) -> String {
    let mut out = format!(
        "{} ({} positions, mapped {})\n",
        inventory.airport,
        inventory.len(),
        inventory.created
    );
    for (terminal, gates) in &inventory.terminals {
        let _ = writeln!(out, "{terminal}:");
        for (gate, position) in gates {
            let _ = writeln!(
                out,
                "  {gate:<8} [{}] {}",
                category(position.kind),
                position.raw.full_text
            );
        }
    }
    out
}

pub(super) fn format_update(update: &TelemetryUpdate) -> String {
    let flight = &update.flight;
    let field = |value: &Option<String>| value.as_deref().unwrap_or("-").to_string();
    let mut out = format!(
        "at {} | {} → {} | {}{}",
        field(&flight.current_airport),
        field(&flight.departure_airport),
        field(&flight.destination_airport),
        flight.airline.as_deref().unwrap_or(""),
        flight.flight_number.as_deref().unwrap_or("")
    );
    match &update.event {
        Some(GateEvent::GateAssigned { gate, .. }) => {
            let _ = write!(out, "\n  gate assigned: {gate}");
        }
        Some(GateEvent::GateCleared) => out.push_str("\n  gate cleared"),
        None => {}
    }
    out
}
