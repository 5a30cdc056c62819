//! The assignment director: a single consumer draining a queue of gate
//! requests.
//!
//! Producers (the telemetry monitor, the CLI) hold a [`DirectorHandle`].
//! Only the director thread ever touches the session, so at most one
//! assignment is in flight. While idle on the ground at an airport it has
//! not seen yet, the director maps it ahead of time.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError};
use parking_lot::Mutex;

use crate::config::Config;
use crate::matcher::GateMatch;
use crate::model::AssignmentRequest;
use crate::retry::RetryPolicy;
use crate::session::{Session, SessionError};
use crate::telemetry::FlightData;

/// Outcomes kept for a receiver that is not keeping up.
const OUTCOME_BACKLOG: usize = 64;

/// Builds the session on first use, and again after it failed to build.
pub type SessionFactory =
    Box<dyn FnMut() -> Result<Box<dyn Session>, SessionError> + Send>;

/// The result of one request, after its retry.
#[derive(Debug, Clone)]
pub struct AssignmentOutcome {
    pub request: AssignmentRequest,
    /// The position that was assigned, on success.
    pub assigned: Option<GateMatch>,
    /// The last error, on failure.
    pub error: Option<String>,
    /// Attempts made, including the retry.
    pub attempts: u32,
}

impl AssignmentOutcome {
    pub fn success(&self) -> bool {
        self.assigned.is_some()
    }
}

#[derive(Default)]
struct Airports {
    current: Option<String>,
    override_: Option<String>,
}

impl Airports {
    fn active(&self) -> Option<String> {
        self.override_.clone().or_else(|| self.current.clone())
    }
}

/// Producer side of the director. Cheap to clone.
#[derive(Clone)]
pub struct DirectorHandle {
    queue: Sender<AssignmentRequest>,
    airports: Arc<Mutex<Airports>>,
    running: Arc<AtomicBool>,
}

impl DirectorHandle {
    /// Queues a request. Dropped with a warning once the director is gone.
    pub fn submit(&self, request: AssignmentRequest) {
        tracing::info!(
            "queued {} {} at {}",
            request.terminal_label(),
            request.gate_designator(),
            request.airport
        );
        if self.queue.send(request).is_err() {
            tracing::warn!("director has stopped, request dropped");
        }
    }

    /// Records where the aircraft currently is.
    pub fn update_flight(&self, flight: &FlightData) {
        let current = flight.current_airport.as_deref().map(str::to_uppercase);
        let mut airports = self.airports.lock();
        if airports.current != current {
            tracing::debug!("current airport: {current:?}");
            airports.current = current;
        }
    }

    /// Forces the airport used for mapping and assignments.
    pub fn set_airport_override(&self, airport: Option<String>) {
        let airport = airport.map(|a| a.to_uppercase());
        tracing::info!("airport override: {airport:?}");
        self.airports.lock().override_ = airport;
    }

    /// Asks the director and anything sharing its running flag to stop.
    pub fn stop(&self) {
        tracing::info!("stopping director");
        self.running.store(false, Ordering::Relaxed);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// The running flag, for sessions and producers that should stop with
    /// the director.
    pub fn running(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }
}

/// Consumer side: owns the session and processes requests in order.
pub struct Director {
    queue: Receiver<AssignmentRequest>,
    airports: Arc<Mutex<Airports>>,
    running: Arc<AtomicBool>,
    outcomes: Sender<AssignmentOutcome>,
    factory: SessionFactory,
    session: Option<Box<dyn Session>>,
    mapped: HashSet<String>,
    /// Airports whose pre-map failure has already been reported.
    premap_failures: HashSet<String>,
    queue_timeout: Duration,
    retry: RetryPolicy,
}

impl Director {
    /// Creates a director, its producer handle, and the outcome stream.
    ///
    /// The stream holds at most a fixed backlog of undelivered outcomes.
    /// Beyond that, new outcomes are logged and dropped, so a caller that
    /// does not care about them can simply drop the receiver.
    pub fn new(
        factory: SessionFactory,
        config: &Config,
    ) -> (Self, DirectorHandle, Receiver<AssignmentOutcome>) {
        Self::with_running(factory, config, Arc::new(AtomicBool::new(true)))
    }

    /// Like [`Director::new`], sharing an existing running flag.
    pub fn with_running(
        factory: SessionFactory,
        config: &Config,
        running: Arc<AtomicBool>,
    ) -> (Self, DirectorHandle, Receiver<AssignmentOutcome>) {
        let (queue_tx, queue_rx) = crossbeam_channel::unbounded();
        let (outcome_tx, outcome_rx) = crossbeam_channel::bounded(OUTCOME_BACKLOG);
        let airports = Arc::new(Mutex::new(Airports::default()));
        let handle = DirectorHandle {
            queue: queue_tx,
            airports: Arc::clone(&airports),
            running: Arc::clone(&running),
        };
        let director = Self {
            queue: queue_rx,
            airports,
            running,
            outcomes: outcome_tx,
            factory,
            session: None,
            mapped: HashSet::new(),
            premap_failures: HashSet::new(),
            queue_timeout: config.timing.queue_timeout(),
            retry: config.assignment_policy(),
        };
        (director, handle, outcome_rx)
    }

    /// Runs the loop on its own thread.
    pub fn spawn(self) -> std::io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("director".into())
            .spawn(move || self.run())
    }

    /// Processes requests until stopped or every handle is dropped.
    pub fn run(mut self) {
        tracing::info!("director ready, waiting for gate assignments");
        while self.running.load(Ordering::Relaxed) {
            self.premap_active();
            match self.queue.recv_timeout(self.queue_timeout) {
                Ok(request) => {
                    let outcome = self.process(request);
                    self.report(outcome);
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        if let Some(mut session) = self.session.take() {
            if let Err(e) = session.close() {
                tracing::warn!("failed to close session: {e}");
            }
        }
        tracing::info!("director stopped");
    }

    fn report(&self, outcome: AssignmentOutcome) {
        match self.outcomes.try_send(outcome) {
            Ok(()) | Err(TrySendError::Disconnected(_)) => {}
            Err(TrySendError::Full(outcome)) => tracing::warn!(
                "outcome backlog full, dropping result for {} {}",
                outcome.request.terminal_label(),
                outcome.request.gate_designator()
            ),
        }
    }

    /// Carries out one request, resetting the menu between attempts.
    /// The default policy makes exactly one retry.
    pub fn process(&mut self, mut request: AssignmentRequest) -> AssignmentOutcome {
        if let Some(airport) = self.airports.lock().override_.clone() {
            request.airport = airport;
        }
        tracing::info!("processing {request:?}");

        let mut attempts = 0;
        let mut error = None;
        let retry = self.retry;
        for attempt in retry.attempts() {
            let session = match self.session() {
                Ok(session) => session,
                Err(e) => {
                    error = Some(e.to_string());
                    break;
                }
            };
            attempts = attempt;
            match session.assign(&request) {
                Ok(assigned) => {
                    tracing::info!(
                        "assigned {} (exact: {}, score {:.1})",
                        assigned.position.position_id,
                        assigned.exact,
                        assigned.score
                    );
                    self.mapped.insert(request.airport.to_uppercase());
                    return AssignmentOutcome {
                        request,
                        assigned: Some(assigned),
                        error: None,
                        attempts,
                    };
                }
                Err(e) if attempt < retry.max_attempts => {
                    tracing::warn!("assignment failed (attempt {attempt}), retrying: {e}");
                    if let Err(e) = session.reset_menu() {
                        tracing::warn!("failed to reset menu: {e}");
                    }
                    retry.pause();
                    error = Some(e.to_string());
                }
                Err(e) => {
                    tracing::error!("assignment failed after retry: {e}");
                    error = Some(e.to_string());
                }
            }
        }
        AssignmentOutcome {
            request,
            assigned: None,
            error,
            attempts,
        }
    }

    /// Maps the active airport once, if the aircraft is on the ground there.
    ///
    /// Failures are retried on every idle loop but reported once per airport.
    fn premap_active(&mut self) {
        let Some(airport) = self.airports.lock().active() else {
            return;
        };
        if self.mapped.contains(&airport) {
            return;
        }
        let session = match self.session() {
            Ok(session) => session,
            Err(e) => {
                self.premap_failed(airport, &e);
                return;
            }
        };
        match session.on_ground() {
            Ok(true) => {}
            Ok(false) => return,
            Err(e) => {
                self.premap_failed(airport, &e);
                return;
            }
        }
        tracing::info!("pre-mapping {airport}");
        match session.premap(&airport) {
            Ok(()) => {
                tracing::info!("pre-mapped {airport}");
                self.premap_failures.remove(&airport);
                self.mapped.insert(airport);
            }
            Err(e) => self.premap_failed(airport, &e),
        }
    }

    fn premap_failed(&mut self, airport: String, error: &SessionError) {
        if self.premap_failures.insert(airport.clone()) {
            tracing::warn!("cannot pre-map {airport}: {error}");
        } else {
            tracing::debug!("still cannot pre-map {airport}: {error}");
        }
    }

    fn session(&mut self) -> Result<&mut dyn Session, SessionError> {
        let session = match self.session.take() {
            Some(session) => session,
            None => {
                tracing::info!("connecting to the addon");
                (self.factory)()?
            }
        };
        Ok(&mut **self.session.insert(session))
    }
}

#[cfg(test)]
impl Director {
    /// Requests waiting in the queue, removed from it.
    pub(crate) fn drain_queue(&self) -> Vec<AssignmentRequest> {
        self.queue.try_iter().collect()
    }

    pub(crate) fn active_airport(&self) -> Option<String> {
        self.airports.lock().active()
    }
}
