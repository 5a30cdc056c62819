//! CLI interface for gate-director.
//!
//! Every subcommand is non-interactive and works offline against the stored
//! inventories and the telemetry feed. Driving the addon itself needs a
//! simulator link, which the embedding application supplies.

mod format;

use std::path::PathBuf;
use std::thread;

use clap::{Parser, Subcommand, ValueEnum};

use gate_director::config::Config;
use gate_director::inventory::Inventories;
use gate_director::mapper::interpret_position;
use gate_director::matcher::GateMatcher;
use gate_director::model::{Category, NavigationCoordinate, RawPosition};
use gate_director::storage::Storage;
use gate_director::telemetry::{GateEvent, GateParser, TelemetryMonitor};

use format::{format_inventory, format_match, format_parsed_gate, format_position, format_update};

/// gate-director: assign ground-service gates from ATC gate strings.
#[derive(Debug, Parser)]
#[command(name = "gate-director", after_long_help = USAGE_HELP)]
pub struct Cli {
    /// Config file to use instead of `~/.gate-director/config.toml`.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

const USAGE_HELP: &str = r#"Examples:
  gate-director parse-gate "Terminal 1 Gate 5A" --airport EDDS
  gate-director interpret "Gate 11B"
  gate-director inventory list
  gate-director inventory show EDDS
  gate-director match EDDS 1 5A
  gate-director watch --once"#;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Split a free-text gate string into terminal and gate parts.
    ParseGate {
        /// The gate string, e.g. "Pier C Gate 14 R".
        text: String,

        /// Also print the assignment request for this airport.
        #[arg(long)]
        airport: Option<String>,
    },

    /// File a menu token under its terminal and gate key.
    Interpret {
        /// Token as the mapper captures it, e.g. "11B" or "Stand 501".
        token: String,

        /// Pattern family the token came from.
        #[arg(long, value_enum, default_value = "gate")]
        category: CategoryArg,
    },

    /// Inspect stored airport inventories.
    Inventory {
        #[command(subcommand)]
        command: InventoryCommand,
    },

    /// Find the stored position that best matches a terminal and gate.
    Match {
        /// ICAO code of the airport.
        airport: String,
        /// Terminal key, e.g. "1" or "Terminal1".
        terminal: String,
        /// Gate designator, e.g. "5A".
        gate: String,
    },

    /// Follow the telemetry feed and print flight and gate changes.
    Watch {
        /// Feed file to poll instead of the configured one.
        #[arg(long)]
        feed: Option<PathBuf>,

        /// Poll once and exit.
        #[arg(long)]
        once: bool,
    },

    /// Show the active configuration.
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum InventoryCommand {
    /// List airports with a stored inventory.
    List,

    /// Print the positions of one airport.
    Show {
        /// ICAO code of the airport.
        airport: String,

        /// Print the interpreted inventory as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the configuration as TOML.
    Show,
    /// Print the config file path.
    Path,
}

/// CLI-facing position category, mapped to the domain `Category`.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CategoryArg {
    Gate,
    Parking,
}

impl CategoryArg {
    fn to_domain(self) -> Category {
        match self {
            Self::Gate => Category::Gate,
            Self::Parking => Category::Parking,
        }
    }
}

/// Run a parsed command, returning an error message on failure.
pub fn run(cli: Cli, config: &Config) -> Result<(), String> {
    match cli.command {
        Command::ParseGate { text, airport } => cmd_parse_gate(config, &text, airport.as_deref()),
        Command::Interpret { token, category } => {
            cmd_interpret(&token, category.to_domain());
            Ok(())
        }
        Command::Inventory { command } => match command {
            InventoryCommand::List => cmd_inventory_list(config),
            InventoryCommand::Show { airport, json } => cmd_inventory_show(config, &airport, json),
        },
        Command::Match {
            airport,
            terminal,
            gate,
        } => cmd_match(config, &airport, &terminal, &gate),
        Command::Watch { feed, once } => cmd_watch(config, feed, once),
        Command::Config { command } => match command {
            ConfigCommand::Show => cmd_config_show(config),
            ConfigCommand::Path => cmd_config_path(cli.config),
        },
    }
}

fn cmd_parse_gate(config: &Config, text: &str, airport: Option<&str>) -> Result<(), String> {
    let parser = GateParser::new(&config.terminal_keywords)
        .map_err(|e| format!("invalid terminal keywords: {e}"))?;
    let parsed = parser
        .parse(text)
        .ok_or_else(|| format!("no gate found in '{text}'"))?;

    println!("{}", format_parsed_gate(&parsed));
    if let Some(airport) = airport {
        let request = parsed.to_request(airport);
        println!(
            "request: {} terminal '{}' gate '{}'",
            request.airport,
            request.terminal_label(),
            request.gate_designator()
        );
    }
    Ok(())
}

fn cmd_interpret(token: &str, category: Category) {
    let raw = RawPosition {
        token: token.to_string(),
        full_text: token.to_string(),
        coordinate: NavigationCoordinate::default(),
        menu_title: String::new(),
        depth: 1,
        category,
    };
    println!("{}", format_position(&interpret_position(&raw)));
}

fn cmd_inventory_list(config: &Config) -> Result<(), String> {
    let storage = open_storage(config)?;
    let airports = storage
        .list_airports()
        .map_err(|e| format!("failed to list inventories: {e}"))?;

    if airports.is_empty() {
        println!("No inventories");
        return Ok(());
    }
    for airport in &airports {
        println!("{airport}");
    }
    Ok(())
}

fn cmd_inventory_show(config: &Config, airport: &str, json: bool) -> Result<(), String> {
    let inventories = Inventories::new(open_storage(config)?);
    let inventory = inventories
        .load(airport)
        .map_err(|e| format!("failed to load inventory: {e}"))?
        .ok_or_else(|| format!("no inventory for {}", airport.to_uppercase()))?;

    if json {
        let json = serde_json::to_string_pretty(inventory.as_ref())
            .map_err(|e| format!("failed to serialize inventory: {e}"))?;
        println!("{json}");
    } else {
        print!("{}", format_inventory(&inventory));
    }
    Ok(())
}

fn cmd_match(config: &Config, airport: &str, terminal: &str, gate: &str) -> Result<(), String> {
    let inventories = Inventories::new(open_storage(config)?);
    let inventory = inventories
        .load(airport)
        .map_err(|e| format!("failed to load inventory: {e}"))?
        .ok_or_else(|| format!("no inventory for {}", airport.to_uppercase()))?;

    let found = GateMatcher::new(config.matching)
        .find_best_match(&inventory, terminal, gate)
        .ok_or_else(|| format!("inventory for {} has no positions", inventory.airport))?;
    println!("{}", format_match(&found));
    Ok(())
}

fn cmd_watch(config: &Config, feed: Option<PathBuf>, once: bool) -> Result<(), String> {
    let path = feed
        .or_else(|| config.flight_json())
        .ok_or("could not determine the telemetry feed path; pass --feed")?;
    let mut monitor = TelemetryMonitor::new(path, config)
        .map_err(|e| format!("invalid terminal keywords: {e}"))?;
    eprintln!("Watching {}", monitor.path().display());

    loop {
        if let Some(update) = monitor.poll() {
            println!("{}", format_update(&update));
            if let Some(GateEvent::GateAssigned { gate, airport }) = &update.event {
                let airport = airport
                    .as_deref()
                    .or(update.flight.current_airport.as_deref());
                if let Some(airport) = airport {
                    let request = gate.to_request(airport);
                    println!(
                        "  would assign {} terminal '{}' gate '{}'",
                        request.airport,
                        request.terminal_label(),
                        request.gate_designator()
                    );
                }
            }
        } else if once {
            return Err("could not read the telemetry feed".to_string());
        }
        if once {
            return Ok(());
        }
        thread::sleep(config.timing.telemetry_poll());
    }
}

fn cmd_config_show(config: &Config) -> Result<(), String> {
    let toml = config
        .to_toml()
        .map_err(|e| format!("failed to render config: {e}"))?;
    print!("{toml}");
    Ok(())
}

fn cmd_config_path(explicit: Option<PathBuf>) -> Result<(), String> {
    let path = explicit
        .or_else(Config::path)
        .ok_or("could not determine home directory")?;
    println!("{}", path.display());
    Ok(())
}

fn open_storage(config: &Config) -> Result<Storage, String> {
    let root = config
        .inventory_root()
        .ok_or("could not determine home directory")?;
    Storage::new(root).map_err(|e| format!("failed to open inventory storage: {e}"))
}
