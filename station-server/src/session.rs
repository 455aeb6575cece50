//! Live-search session engine.
//!
//! A session owns everything with a lifetime: the current ranked list, the
//! last reliable bearing, the periodic refresh task, and the in-flight
//! route enhancement. Collaborators sit behind the [`StationSource`] and
//! [`RouteSource`] traits so the engine can be driven with mocks in tests.
//!
//! Concurrency model:
//! - fetch-and-rank cycles run one at a time, on the session's background
//!   task (timer tick, or a policy change requesting an immediate refresh)
//! - location ticks only touch in-memory distances and re-sort, so they may
//!   interleave freely with a running cycle
//! - route enhancement runs out of band; every cycle carries a sequence
//!   number, and results tagged with a superseded number are discarded
//!   rather than overwriting fresher data

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::domain::{FuelKind, FuelStation, GeoPoint, LocationSample, StationCandidate, StationId};
use crate::prices::{CachedPriceClient, MockPriceClient, PriceClient, PriceError, StationFeed};
use crate::ranker::{self, DistanceSource, InvalidPolicy, Policy, UsedMode};
use crate::routing::{RouteLeg, RoutingClient, RoutingError};

/// How many destinations go into one routing request.
const ROUTE_BATCH_SIZE: usize = 10;

/// How many times the session waits for a first location fix.
const MAX_LOCATION_RETRIES: u32 = 5;

/// Delay between location-fix attempts.
const LOCATION_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Notice published when the session gives up waiting for a location.
pub const NO_LOCATION_NOTICE: &str = "no location fix available: live search stopped";

/// Source of raw station candidates (the fuel-price feed).
pub trait StationSource: Send + Sync + 'static {
    /// Fetch raw records near a point; see
    /// [`PriceClient::fetch_nearby`](crate::prices::PriceClient::fetch_nearby).
    fn fetch_nearby(
        &self,
        point: GeoPoint,
        radius_km: f64,
        fuel: FuelKind,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<StationCandidate>, PriceError>> + Send;
}

/// Source of road distances (the directions API).
pub trait RouteSource: Send + Sync + 'static {
    /// Road legs from one origin to many destinations, one entry per
    /// destination in input order; failed elements are `None`.
    fn fetch_route_matrix(
        &self,
        origin: GeoPoint,
        destinations: &[GeoPoint],
    ) -> impl Future<Output = Result<Vec<Option<RouteLeg>>, RoutingError>> + Send;
}

impl StationSource for PriceClient {
    fn fetch_nearby(
        &self,
        point: GeoPoint,
        radius_km: f64,
        fuel: FuelKind,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<StationCandidate>, PriceError>> + Send {
        PriceClient::fetch_nearby(self, point, radius_km, fuel, limit)
    }
}

impl StationSource for CachedPriceClient {
    fn fetch_nearby(
        &self,
        point: GeoPoint,
        radius_km: f64,
        fuel: FuelKind,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<StationCandidate>, PriceError>> + Send {
        async move {
            CachedPriceClient::fetch_nearby(self, point, radius_km, fuel, limit)
                .await
                .map(|entry| (*entry).clone())
        }
    }
}

impl StationSource for MockPriceClient {
    fn fetch_nearby(
        &self,
        point: GeoPoint,
        radius_km: f64,
        fuel: FuelKind,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<StationCandidate>, PriceError>> + Send {
        MockPriceClient::fetch_nearby(self, point, radius_km, fuel, limit)
    }
}

impl StationSource for StationFeed {
    fn fetch_nearby(
        &self,
        point: GeoPoint,
        radius_km: f64,
        fuel: FuelKind,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<StationCandidate>, PriceError>> + Send {
        async move {
            match self {
                StationFeed::Cached(client) => client
                    .fetch_nearby(point, radius_km, fuel, limit)
                    .await
                    .map(|entry| (*entry).clone()),
                StationFeed::Mock(mock) => mock.fetch_nearby(point, radius_km, fuel, limit).await,
            }
        }
    }
}

impl RouteSource for RoutingClient {
    fn fetch_route_matrix(
        &self,
        origin: GeoPoint,
        destinations: &[GeoPoint],
    ) -> impl Future<Output = Result<Vec<Option<RouteLeg>>, RoutingError>> + Send {
        RoutingClient::fetch_route_matrix(self, origin, destinations)
    }
}

/// Errors surfaced by session control operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The session is already running
    #[error("live search is already active")]
    AlreadyActive,

    /// The supplied policy failed validation
    #[error(transparent)]
    InvalidPolicy(#[from] InvalidPolicy),
}

/// Commands handled by the session's background task.
enum SessionCommand {
    /// Re-run a fetch cycle now and restart the periodic timer from zero.
    Refresh,
}

/// Session state guarded by one mutex.
///
/// Every mutation goes through this single lock, which is what makes the
/// interleaving of cycles, location ticks, and route callbacks safe.
struct SessionState {
    policy: Policy,
    location: Option<LocationSample>,
    last_good_bearing: Option<f64>,
    stations: Vec<FuelStation>,
    used_mode: Option<UsedMode>,
    notice: Option<String>,
    cycle_seq: u64,
    last_cycle_at: Option<DateTime<Utc>>,
    active: bool,
}

/// Read-only copy of the session state for rendering.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub active: bool,
    pub stations: Vec<FuelStation>,
    pub used_mode: Option<UsedMode>,
    pub notice: Option<String>,
    pub policy: Policy,
    pub location: Option<LocationSample>,
    pub last_cycle_at: Option<DateTime<Utc>>,
}

/// Handles owned while the background task is alive.
struct TaskHandles {
    cmd_tx: mpsc::Sender<SessionCommand>,
    task: JoinHandle<()>,
}

/// A live fuel-station search.
///
/// One session per process: the phone list, the widget, and the car screen
/// are all renderers of the same snapshot.
pub struct LiveSearchSession<S, R> {
    stations_source: Arc<S>,
    routes: Arc<R>,
    state: Arc<Mutex<SessionState>>,
    handles: Mutex<Option<TaskHandles>>,
}

impl<S: StationSource, R: RouteSource> LiveSearchSession<S, R> {
    /// Create an inactive session with the given collaborators and policy.
    pub fn new(stations_source: S, routes: R, policy: Policy) -> Self {
        Self {
            stations_source: Arc::new(stations_source),
            routes: Arc::new(routes),
            state: Arc::new(Mutex::new(SessionState {
                policy,
                location: None,
                last_good_bearing: None,
                stations: Vec::new(),
                used_mode: None,
                notice: None,
                cycle_seq: 0,
                last_cycle_at: None,
                active: false,
            })),
            handles: Mutex::new(None),
        }
    }

    /// Whether the background task is running.
    pub fn is_active(&self) -> bool {
        self.handles.lock().unwrap().is_some()
    }

    /// The current policy.
    pub fn policy(&self) -> Policy {
        self.state.lock().unwrap().policy.clone()
    }

    /// Deliver a location sample.
    ///
    /// Always records the fix and, when the sample carries a trustworthy
    /// heading, refreshes the remembered bearing — even before the search
    /// starts, so the first cycle can already filter directionally. While
    /// stations are on display their air distances are recomputed and the
    /// list re-sorted; route distances are left untouched.
    pub fn update_location(&self, sample: LocationSample) {
        let mut st = self.state.lock().unwrap();

        if let Some(heading) = sample.reliable_heading(st.policy.heading_accuracy_max_deg) {
            st.last_good_bearing = Some(heading);
        }
        st.location = Some(sample);

        if st.active && !st.stations.is_empty() {
            let sort = st.policy.sort;
            let fuel = st.policy.fuel;
            ranker::refresh_air_distances(&mut st.stations, sample.point, sort, fuel);
        }
    }

    /// Start the live search.
    ///
    /// Runs a fetch cycle immediately (once a location fix exists; the task
    /// waits a bounded number of attempts for one) and then refreshes on
    /// the policy's interval until [`stop`](Self::stop).
    pub fn start(&self) -> Result<(), SessionError> {
        let mut handles = self.handles.lock().unwrap();
        if handles.is_some() {
            return Err(SessionError::AlreadyActive);
        }

        {
            let mut st = self.state.lock().unwrap();
            st.active = true;
            st.notice = None;
            st.used_mode = None;
            st.stations.clear();
        }

        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let task = tokio::spawn(session_task(
            self.stations_source.clone(),
            self.routes.clone(),
            self.state.clone(),
            cmd_rx,
        ));
        *handles = Some(TaskHandles { cmd_tx, task });

        info!("live search started");
        Ok(())
    }

    /// Stop the live search and clear all session-scoped state.
    ///
    /// In-flight fetch or routing work is cancelled or, where it cannot be
    /// interrupted, invalidated: bumping the cycle sequence makes any
    /// still-running enhancement discard its results.
    ///
    /// Returns `false` if the session was not active.
    pub fn stop(&self) -> bool {
        let Some(handles) = self.handles.lock().unwrap().take() else {
            return false;
        };
        handles.task.abort();

        let mut st = self.state.lock().unwrap();
        st.active = false;
        st.cycle_seq += 1;
        st.stations.clear();
        st.last_good_bearing = None;
        st.used_mode = None;
        st.notice = None;
        st.last_cycle_at = None;

        info!("live search stopped");
        true
    }

    /// Replace the policy.
    ///
    /// While the search is active this cancels the pending timer, runs a
    /// fresh cycle immediately, and reschedules the timer from zero.
    pub async fn set_policy(&self, policy: Policy) -> Result<(), SessionError> {
        policy.validate()?;

        {
            let mut st = self.state.lock().unwrap();
            st.policy = policy;
        }

        let cmd_tx = self
            .handles
            .lock()
            .unwrap()
            .as_ref()
            .map(|h| h.cmd_tx.clone());
        if let Some(cmd_tx) = cmd_tx {
            // The task only dies when aborted by stop(), which also clears
            // the handle; a send error here just means we raced with that.
            let _ = cmd_tx.send(SessionCommand::Refresh).await;
        }

        Ok(())
    }

    /// Immutable copy of the current state for rendering.
    pub fn snapshot(&self) -> SessionSnapshot {
        let st = self.state.lock().unwrap();
        SessionSnapshot {
            active: st.active,
            stations: st.stations.clone(),
            used_mode: st.used_mode,
            notice: st.notice.clone(),
            policy: st.policy.clone(),
            location: st.location,
            last_cycle_at: st.last_cycle_at,
        }
    }
}

/// Background task: wait for a location, then fetch on a timer and on
/// refresh commands until aborted.
async fn session_task<S: StationSource, R: RouteSource>(
    stations_source: Arc<S>,
    routes: Arc<R>,
    state: Arc<Mutex<SessionState>>,
    mut cmd_rx: mpsc::Receiver<SessionCommand>,
) {
    // Bounded wait for the first fix.
    let mut attempts = 0u32;
    loop {
        if state.lock().unwrap().location.is_some() {
            break;
        }
        if attempts >= MAX_LOCATION_RETRIES {
            warn!("no location fix after {MAX_LOCATION_RETRIES} attempts; giving up");
            let mut st = state.lock().unwrap();
            st.active = false;
            st.notice = Some(NO_LOCATION_NOTICE.to_string());
            return;
        }
        attempts += 1;
        tokio::time::sleep(LOCATION_RETRY_DELAY).await;
    }

    run_cycle(&stations_source, &routes, &state).await;

    let mut interval = new_interval(&state);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                run_cycle(&stations_source, &routes, &state).await;
            }
            cmd = cmd_rx.recv() => match cmd {
                Some(SessionCommand::Refresh) => {
                    // Policy changed: immediate cycle, timer from zero.
                    run_cycle(&stations_source, &routes, &state).await;
                    interval = new_interval(&state);
                }
                None => return,
            }
        }
    }
}

/// Build the periodic timer for the current policy.
///
/// The first tick is pushed a full period out (a fresh tokio interval would
/// otherwise tick immediately, double-running the cycle just executed).
fn new_interval(state: &Arc<Mutex<SessionState>>) -> tokio::time::Interval {
    let period = state.lock().unwrap().policy.update_interval();
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.reset();
    interval
}

/// One fetch-and-rank cycle.
async fn run_cycle<S: StationSource, R: RouteSource>(
    stations_source: &Arc<S>,
    routes: &Arc<R>,
    state: &Arc<Mutex<SessionState>>,
) {
    let (location, policy, last_good_bearing, seq) = {
        let mut st = state.lock().unwrap();
        let Some(location) = st.location else {
            return;
        };
        st.cycle_seq += 1;
        (location, st.policy.clone(), st.last_good_bearing, st.cycle_seq)
    };

    debug!(seq, fuel = %policy.fuel, radius_km = policy.search_radius_km, "fetch cycle");

    let fetched = stations_source
        .fetch_nearby(
            location.point,
            policy.search_radius_km,
            policy.fuel,
            policy.fetch_limit(),
        )
        .await;

    let candidates = match fetched {
        Ok(candidates) => candidates,
        Err(err) => {
            warn!(error = %err, "station fetch failed");
            let hint = if err.is_retryable() {
                "will retry"
            } else {
                "check configuration"
            };
            let mut st = state.lock().unwrap();
            if st.cycle_seq == seq {
                // Keep whatever was on display; the next cycle retries.
                st.notice = Some(format!("station fetch failed ({err}); {hint}"));
                st.last_cycle_at = Some(Utc::now());
            }
            return;
        }
    };

    let outcome = ranker::run(&location, candidates, &policy, last_good_bearing);

    let targets: Vec<(StationId, GeoPoint)> = outcome
        .stations
        .iter()
        .map(|s| (s.id.clone(), s.point))
        .collect();

    {
        let mut st = state.lock().unwrap();
        if st.cycle_seq != seq {
            // A newer cycle (or a stop) superseded this one while the fetch
            // was in flight.
            return;
        }
        st.stations = outcome.stations;
        st.used_mode = Some(outcome.used_mode);
        st.notice = outcome.notice;
        st.last_cycle_at = Some(Utc::now());
    }

    if policy.distance_source == DistanceSource::PreferRoute && !targets.is_empty() {
        // Out of band so the primary list renders without waiting on the
        // routing collaborator.
        tokio::spawn(enhance_routes(
            routes.clone(),
            state.clone(),
            location.point,
            targets,
            seq,
        ));
    }
}

/// Fill in road distances for the stations published by cycle `seq`.
///
/// Destinations go out in batches; results are applied in request order,
/// matched by station id so concurrent re-sorts cannot shift them onto the
/// wrong station. A failed batch degrades those stations to air distance;
/// a stale sequence number discards everything.
async fn enhance_routes<R: RouteSource>(
    routes: Arc<R>,
    state: Arc<Mutex<SessionState>>,
    origin: GeoPoint,
    targets: Vec<(StationId, GeoPoint)>,
    seq: u64,
) {
    for batch in targets.chunks(ROUTE_BATCH_SIZE) {
        let points: Vec<GeoPoint> = batch.iter().map(|(_, p)| *p).collect();

        let legs = match routes.fetch_route_matrix(origin, &points).await {
            Ok(legs) => legs,
            Err(err) => {
                warn!(error = %err, "route batch failed; keeping air distances");
                continue;
            }
        };

        let mut st = state.lock().unwrap();
        if st.cycle_seq != seq {
            debug!(seq, current = st.cycle_seq, "discarding stale route results");
            return;
        }

        for ((id, _), leg) in batch.iter().zip(legs) {
            if let Some(leg) = leg
                && let Some(station) = st.stations.iter_mut().find(|s| &s.id == id)
            {
                station.route_distance_km = Some(leg.distance_km);
                station.route_duration_secs = Some(leg.duration_secs);
            }
        }

        let sort = st.policy.sort;
        let fuel = st.policy.fuel;
        ranker::sort_stations(&mut st.stations, sort, fuel);
    }
}
