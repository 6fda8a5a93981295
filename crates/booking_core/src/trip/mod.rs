//! Ride lifecycle orchestration: the trip-tracking state machine.
//!
//! Once a ride exists, [`TripMonitor`] keeps the client view synchronized
//! with the ride-state service: an immediate fetch, then one tick per
//! interval until a terminal status is observed or the view is torn down.
//! Each tick asks the service to advance the simulated driver, then fetches
//! the snapshot that the view replaces wholesale; the fetch is the
//! authoritative read whenever the two disagree.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::geo::{GeoPoint, RouteGeometry};
use crate::rides::{Ride, RideId, RideService, RideServiceError, RideStatus};
use crate::routing::RouteProvider;
use crate::task::{spawn_polling, PollHandle, PollToken, Tick};

#[derive(Debug, Error)]
pub enum TripError {
    #[error("trip is not in a cancellable state")]
    NotCancellable,
    #[error(transparent)]
    Service(#[from] RideServiceError),
}

/// What the trip view should currently show.
#[derive(Debug, Clone, PartialEq)]
pub enum TripView {
    /// Monitoring has started but no snapshot has arrived yet.
    Loading,
    /// The latest snapshot, plus the drawable route when available.
    Active(ActiveTrip),
    /// Terminal empty state: no ride to show (absent, unlocatable, or
    /// cancelled). Nothing will be fetched after this.
    NotFound,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveTrip {
    pub ride: Ride,
    pub route: Option<RouteGeometry>,
}

/// Tracks one ride until it reaches a terminal state.
///
/// Dropping the monitor tears the polling loop down; an in-flight fetch at
/// that moment is aborted and its response discarded.
pub struct TripMonitor {
    view_rx: watch::Receiver<TripView>,
    active: Option<ActiveMonitor>,
}

struct ActiveMonitor {
    inner: Arc<MonitorInner>,
    handle: PollHandle,
}

struct MonitorInner {
    ride_id: RideId,
    rides: Arc<dyn RideService>,
    router: Option<Arc<dyn RouteProvider>>,
    view: watch::Sender<TripView>,
    route_cache: Mutex<RouteCache>,
}

#[derive(Default)]
struct RouteCache {
    endpoints: Option<(GeoPoint, GeoPoint)>,
    route: Option<RouteGeometry>,
}

impl TripMonitor {
    /// Start tracking. A missing ride id settles straight into the terminal
    /// not-found view without issuing a single fetch.
    pub fn start(
        ride_id: Option<RideId>,
        rides: Arc<dyn RideService>,
        router: Option<Arc<dyn RouteProvider>>,
        interval: Duration,
    ) -> Self {
        let Some(ride_id) = ride_id else {
            let (_, view_rx) = watch::channel(TripView::NotFound);
            return Self {
                view_rx,
                active: None,
            };
        };

        let (view_tx, view_rx) = watch::channel(TripView::Loading);
        let inner = Arc::new(MonitorInner {
            ride_id,
            rides,
            router,
            view: view_tx,
            route_cache: Mutex::new(RouteCache::default()),
        });

        let tick_inner = Arc::clone(&inner);
        let handle = spawn_polling(interval, move |token| {
            let inner = Arc::clone(&tick_inner);
            async move { run_tick(inner, token).await }
        });

        Self {
            view_rx,
            active: Some(ActiveMonitor { inner, handle }),
        }
    }

    /// Watch the trip view.
    pub fn view(&self) -> watch::Receiver<TripView> {
        self.view_rx.clone()
    }

    /// Current view snapshot.
    pub fn current(&self) -> TripView {
        self.view_rx.borrow().clone()
    }

    /// User-initiated cancellation. Allowed only while the latest snapshot
    /// is non-terminal; on success polling halts and the view settles into
    /// the terminal empty state. On failure the snapshot is left untouched
    /// and the error is returned; cancellation is never retried here.
    pub async fn cancel(&self) -> Result<(), TripError> {
        let Some(active) = &self.active else {
            return Err(TripError::NotCancellable);
        };
        let cancellable = matches!(
            &*active.inner.view.borrow(),
            TripView::Active(trip) if !trip.ride.status.is_terminal()
        );
        if !cancellable {
            return Err(TripError::NotCancellable);
        }

        active
            .inner
            .rides
            .set_status(&active.inner.ride_id, RideStatus::Cancelled)
            .await?;
        active.handle.stop();
        active.inner.view.send_replace(TripView::NotFound);
        Ok(())
    }

    /// Tear the polling loop down without changing the view.
    pub fn stop(&self) {
        if let Some(active) = &self.active {
            active.handle.stop();
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.active
            .as_ref()
            .map_or(true, |active| active.handle.is_cancelled())
    }
}

async fn run_tick(inner: Arc<MonitorInner>, token: PollToken) -> Tick {
    // Advance first. Failures are irrelevant to the tick: the fetch below is
    // the freshest read of server state and always wins.
    if let Err(err) = inner.rides.advance_driver(&inner.ride_id).await {
        debug!(ride = %inner.ride_id, error = %err, "driver advance skipped");
    }

    let fetched = inner.rides.fetch(&inner.ride_id).await;
    if token.is_cancelled() {
        return Tick::Stop;
    }

    match fetched {
        Ok(Some(ride)) => {
            let route = refresh_route(&inner, &ride).await;
            if token.is_cancelled() {
                return Tick::Stop;
            }
            let terminal = ride.status.is_terminal();
            let view = if ride.status == RideStatus::Cancelled {
                TripView::NotFound
            } else {
                TripView::Active(ActiveTrip { ride, route })
            };
            inner.view.send_replace(view);
            if terminal {
                Tick::Stop
            } else {
                Tick::Continue
            }
        }
        Ok(None) => {
            inner.view.send_replace(TripView::NotFound);
            Tick::Stop
        }
        Err(RideServiceError::Malformed(reason)) => {
            warn!(ride = %inner.ride_id, %reason, "ride snapshot rejected");
            inner.view.send_replace(TripView::NotFound);
            Tick::Stop
        }
        Err(err) => {
            // Transient failure: keep the current snapshot and let the next
            // scheduled tick self-heal.
            warn!(ride = %inner.ride_id, error = %err, "trip poll tick failed");
            Tick::Continue
        }
    }
}

/// Re-derive the drawable route when the snapshot's endpoints change.
/// Best-effort: a routing failure keeps whatever was displayed before and
/// never affects ride status.
async fn refresh_route(inner: &MonitorInner, ride: &Ride) -> Option<RouteGeometry> {
    let router = inner.router.as_ref()?;

    let cached = {
        let cache = inner.route_cache.lock().expect("route cache lock");
        match &cache.endpoints {
            Some((pickup, dropoff)) if *pickup == ride.pickup && *dropoff == ride.dropoff => {
                return cache.route.clone();
            }
            _ => cache.route.clone(),
        }
    };

    match router.route(&ride.pickup, &ride.dropoff).await {
        Ok(route) => {
            let mut cache = inner.route_cache.lock().expect("route cache lock");
            cache.endpoints = Some((ride.pickup.clone(), ride.dropoff.clone()));
            cache.route = Some(route.clone());
            Some(route)
        }
        Err(err) => {
            warn!(ride = %ride.id, error = %err, "route refresh failed");
            cached
        }
    }
}
