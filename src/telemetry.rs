//! Telemetry feed: the ATC client's `flight.json`.
//!
//! The client rewrites the file every few seconds. Each poll publishes the
//! current airport to the director and turns a new assigned gate into an
//! assignment request.

mod gate_parser;

pub use gate_parser::{GateParser, ParsedGate};

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use serde_json::Value;

use crate::config::Config;
use crate::director::DirectorHandle;

/// The fields of the feed the director cares about.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FlightData {
    pub current_airport: Option<String>,
    pub destination_airport: Option<String>,
    pub departure_airport: Option<String>,
    pub airline: Option<String>,
    pub flight_number: Option<String>,
    pub assigned_gate: Option<String>,
}

impl FlightData {
    /// Extracts flight data from the feed document. Missing fields are `None`.
    pub fn from_json(value: &Value) -> Self {
        let flight = |field: &str| text(value, &format!("/flight_details/current_flight/{field}"));
        Self {
            current_airport: text(value, "/flight_details/current_airport"),
            destination_airport: flight("flight_destination"),
            departure_airport: flight("flight_origin"),
            airline: flight("airline"),
            flight_number: flight("flight_number"),
            assigned_gate: flight("assigned_gate"),
        }
    }
}

/// A non-empty string or number at `pointer`.
fn text(value: &Value, pointer: &str) -> Option<String> {
    match value.pointer(pointer)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A change in the assigned gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateEvent {
    /// A new gate string appeared. `airport` is the destination, if known.
    GateAssigned {
        gate: ParsedGate,
        airport: Option<String>,
    },
    /// The assigned gate went away.
    GateCleared,
}

/// One field-level difference between two feed documents.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldChange {
    Added { path: String, value: Value },
    Changed { path: String, old: Value, new: Value },
    Removed { path: String, value: Value },
}

impl std::fmt::Display for FieldChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Added { path, value } => write!(f, "ADDED: {path} = {value}"),
            Self::Changed { path, old, new } => write!(f, "CHANGED: {path} = {old} -> {new}"),
            Self::Removed { path, value } => write!(f, "REMOVED: {path} = {value}"),
        }
    }
}

/// Field-level differences between two documents, walking nested objects.
pub fn diff(old: &Value, new: &Value) -> Vec<FieldChange> {
    let mut changes = Vec::new();
    diff_into(old, new, "", &mut changes);
    changes
}

fn diff_into(old: &Value, new: &Value, path: &str, changes: &mut Vec<FieldChange>) {
    let (Value::Object(old), Value::Object(new)) = (old, new) else {
        if old != new {
            changes.push(FieldChange::Changed {
                path: path.to_string(),
                old: old.clone(),
                new: new.clone(),
            });
        }
        return;
    };
    let join = |key: &str| {
        if path.is_empty() {
            key.to_string()
        } else {
            format!("{path}.{key}")
        }
    };
    for (key, value) in new {
        match old.get(key) {
            None => changes.push(FieldChange::Added {
                path: join(key),
                value: value.clone(),
            }),
            Some(previous) => diff_into(previous, value, &join(key), changes),
        }
    }
    for (key, value) in old {
        if !new.contains_key(key) {
            changes.push(FieldChange::Removed {
                path: join(key),
                value: value.clone(),
            });
        }
    }
}

/// What one poll produced.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryUpdate {
    pub flight: FlightData,
    pub event: Option<GateEvent>,
}

/// Polls the feed file and tracks the assigned gate.
pub struct TelemetryMonitor {
    path: PathBuf,
    parser: GateParser,
    interval: Duration,
    previous: Option<Value>,
    current_gate: Option<String>,
}

impl TelemetryMonitor {
    pub fn new(path: impl Into<PathBuf>, config: &Config) -> Result<Self, regex::Error> {
        Ok(Self {
            path: path.into(),
            parser: GateParser::new(&config.terminal_keywords)?,
            interval: config.timing.telemetry_poll(),
            previous: None,
            current_gate: None,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the feed once. Returns `None` when it cannot be read or parsed;
    /// the failure is logged and the next poll tries again.
    pub fn poll(&mut self) -> Option<TelemetryUpdate> {
        let document = match read_document(&self.path) {
            Ok(document) => document,
            Err(e) => {
                tracing::error!("failed to read {}: {e}", self.path.display());
                return None;
            }
        };

        match &self.previous {
            None => tracing::info!("telemetry feed found at {}", self.path.display()),
            Some(previous) if *previous != document => {
                for change in diff(previous, &document) {
                    tracing::debug!("{change}");
                }
            }
            Some(_) => {}
        }

        let flight = FlightData::from_json(&document);
        let event = self.track_gate(&flight);
        self.previous = Some(document);
        Some(TelemetryUpdate { flight, event })
    }

    fn track_gate(&mut self, flight: &FlightData) -> Option<GateEvent> {
        let Some(raw) = flight.assigned_gate.as_deref() else {
            return self.current_gate.take().map(|_| {
                tracing::info!("gate cleared");
                GateEvent::GateCleared
            });
        };
        if self.current_gate.as_deref() == Some(raw) {
            return None;
        }
        self.current_gate = Some(raw.to_string());
        let gate = self.parser.parse(raw)?;
        tracing::info!("gate assigned: {gate}");
        Some(GateEvent::GateAssigned {
            gate,
            airport: flight.destination_airport.clone(),
        })
    }

    /// Polls until `running` drops, feeding `director`.
    pub fn run(mut self, director: &DirectorHandle, running: &Arc<AtomicBool>) {
        tracing::info!("monitoring {}", self.path.display());
        while running.load(Ordering::Relaxed) {
            if let Some(update) = self.poll() {
                publish(&update, director);
            }
            thread::sleep(self.interval);
        }
        tracing::info!("telemetry monitor stopped");
    }
}

/// Hands one poll's result to the director.
pub fn publish(update: &TelemetryUpdate, director: &DirectorHandle) {
    director.update_flight(&update.flight);
    if let Some(GateEvent::GateAssigned { gate, airport }) = &update.event {
        match airport.as_deref().or(update.flight.current_airport.as_deref()) {
            Some(airport) => director.submit(gate.to_request(airport)),
            None => tracing::warn!("gate {gate} assigned without a known airport, ignoring"),
        }
    }
}

/// Errors reading the feed file.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn read_document(path: &Path) -> Result<Value, FeedError> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;
    use tempfile::TempDir;

    use crate::director::Director;
    use crate::session::{Session, SessionError};
    use crate::testing::test_config;

    fn feed(gate: Option<&str>) -> Value {
        json!({
            "flight_details": {
                "current_airport": "EDDM",
                "current_flight": {
                    "flight_origin": "EDDM",
                    "flight_destination": "EDDS",
                    "airline": "DLH",
                    "flight_number": 1234,
                    "assigned_gate": gate,
                }
            }
        })
    }

    fn monitor() -> (TempDir, TelemetryMonitor) {
        let dir = TempDir::new().unwrap();
        let monitor = TelemetryMonitor::new(dir.path().join("flight.json"), &test_config()).unwrap();
        (dir, monitor)
    }

    fn write(monitor: &TelemetryMonitor, value: &Value) {
        fs::write(monitor.path(), value.to_string()).unwrap();
    }

    fn director() -> (Director, DirectorHandle) {
        let (director, handle, _outcomes) = Director::new(
            Box::new(|| -> Result<Box<dyn Session>, SessionError> {
                Err(SessionError::NoPositions("unused".into()))
            }),
            &test_config(),
        );
        (director, handle)
    }

    fn assigned(gate: &str, destination: Option<&str>, current: Option<&str>) -> TelemetryUpdate {
        TelemetryUpdate {
            flight: FlightData {
                current_airport: current.map(Into::into),
                destination_airport: destination.map(Into::into),
                ..FlightData::default()
            },
            event: Some(GateEvent::GateAssigned {
                gate: GateParser::new(&test_config().terminal_keywords)
                    .unwrap()
                    .parse(gate)
                    .unwrap(),
                airport: destination.map(Into::into),
            }),
        }
    }

    #[test]
    fn extracts_flight_fields() {
        let flight = FlightData::from_json(&feed(Some("Gate 5A")));

        assert_eq!(flight.current_airport.as_deref(), Some("EDDM"));
        assert_eq!(flight.destination_airport.as_deref(), Some("EDDS"));
        assert_eq!(flight.departure_airport.as_deref(), Some("EDDM"));
        assert_eq!(flight.flight_number.as_deref(), Some("1234"));
        assert_eq!(flight.assigned_gate.as_deref(), Some("Gate 5A"));
        assert_eq!(FlightData::from_json(&json!({})), FlightData::default());
    }

    #[test]
    fn new_gate_is_reported_once() {
        let (_dir, mut monitor) = monitor();
        write(&monitor, &feed(Some("Terminal 1 Gate 5A")));

        let first = monitor.poll().unwrap();
        let second = monitor.poll().unwrap();

        let Some(GateEvent::GateAssigned { gate, airport }) = first.event else {
            panic!("expected an assignment, got {:?}", first.event);
        };
        assert_eq!(gate.terminal_number, "1");
        assert_eq!(gate.gate_suffix, "A");
        assert_eq!(airport.as_deref(), Some("EDDS"));
        assert!(second.event.is_none());
    }

    #[test]
    fn changed_gate_is_reported_again() {
        let (_dir, mut monitor) = monitor();
        write(&monitor, &feed(Some("Gate 5A")));
        monitor.poll();
        write(&monitor, &feed(Some("Gate 12")));

        let update = monitor.poll().unwrap();

        assert!(matches!(
            update.event,
            Some(GateEvent::GateAssigned { ref gate, .. }) if gate.gate_number == "12"
        ));
    }

    #[test]
    fn removed_gate_is_cleared() {
        let (_dir, mut monitor) = monitor();
        write(&monitor, &feed(Some("Gate 5A")));
        monitor.poll();
        write(&monitor, &feed(None));

        assert_eq!(monitor.poll().unwrap().event, Some(GateEvent::GateCleared));
        assert_eq!(monitor.poll().unwrap().event, None);
    }

    #[test]
    fn unreadable_feed_skips_the_poll() {
        let (_dir, mut monitor) = monitor();
        assert!(monitor.poll().is_none());

        fs::write(monitor.path(), "{ truncated").unwrap();
        assert!(monitor.poll().is_none());
    }

    #[test]
    fn diff_walks_nested_objects() {
        let old = json!({"a": 1, "b": {"c": "x", "d": true}, "gone": 0});
        let new = json!({"a": 2, "b": {"c": "x", "e": null}});

        let changes: Vec<String> = diff(&old, &new).iter().map(ToString::to_string).collect();

        assert_eq!(
            changes,
            vec![
                "CHANGED: a = 1 -> 2",
                "ADDED: b.e = null",
                "REMOVED: b.d = true",
                "REMOVED: gone = 0",
            ]
        );
    }

    #[test]
    fn gate_is_queued_for_the_destination() {
        let (director, handle) = director();

        publish(&assigned("Gate 5A", Some("edds"), Some("EDDM")), &handle);

        let queued = director.drain_queue();
        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0].airport, "EDDS");
        assert_eq!(queued[0].gate_number, "5");
        assert!(queued[0].wait_for_ground);
    }

    #[test]
    fn gate_falls_back_to_the_current_airport() {
        let (director, handle) = director();

        publish(&assigned("Gate 12", None, Some("EDDM")), &handle);

        let queued = director.drain_queue();
        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0].airport, "EDDM");
    }

    #[test]
    fn gate_without_any_airport_is_dropped() {
        let (director, handle) = director();

        publish(&assigned("Gate 12", None, None), &handle);

        assert!(director.drain_queue().is_empty());
    }

    #[test]
    fn every_update_moves_the_current_airport() {
        let (director, handle) = director();
        let update = TelemetryUpdate {
            flight: FlightData {
                current_airport: Some("EDDM".into()),
                ..FlightData::default()
            },
            event: None,
        };

        publish(&update, &handle);

        assert_eq!(director.active_airport().as_deref(), Some("EDDM"));
        assert!(director.drain_queue().is_empty());
    }

    #[test]
    fn run_feeds_the_director_until_stopped() {
        let dir = TempDir::new().unwrap();
        let mut config = test_config();
        config.timing.telemetry_poll_ms = 1;
        let monitor = TelemetryMonitor::new(dir.path().join("flight.json"), &config).unwrap();
        write(&monitor, &feed(Some("Gate 5A")));
        let (director, handle) = director();
        let running = Arc::new(AtomicBool::new(true));

        let worker = {
            let handle = handle.clone();
            let running = Arc::clone(&running);
            thread::spawn(move || monitor.run(&handle, &running))
        };
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while director.active_airport().is_none() && std::time::Instant::now() < deadline {
            thread::sleep(Duration::from_millis(2));
        }
        running.store(false, Ordering::Relaxed);
        worker.join().unwrap();

        let queued = director.drain_queue();
        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0].airport, "EDDS");
        assert_eq!(director.active_airport().as_deref(), Some("EDDM"));
    }
}
