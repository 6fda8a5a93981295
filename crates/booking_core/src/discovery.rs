//! Active-trip discovery: a background affordance, not a critical path.
//!
//! Scans the user's ride history for an unresolved trip so navigation can
//! offer a way back to it. Collaborator failures are swallowed to "no active
//! trip"; this must never surface an error dialog.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::debug;

use crate::rides::{Ride, RideId, RideService, RideStatus};
use crate::task::{spawn_polling, PollHandle, Tick};

/// First ride in the user's history that is still `booked` or `ongoing`.
///
/// A missing or guest identity yields `None` without a collaborator call.
/// Repeated calls with unchanged server state return the same result.
pub async fn find_active(rides: &dyn RideService, user_id: Option<&str>) -> Option<Ride> {
    let user = match user_id {
        Some(user) if !user.is_empty() && !user.eq_ignore_ascii_case("guest") => user,
        _ => return None,
    };
    match rides.for_user(user).await {
        Ok(history) => history
            .into_iter()
            .find(|ride| matches!(ride.status, RideStatus::Booked | RideStatus::Ongoing)),
        Err(err) => {
            debug!(user = %user, error = %err, "active-trip scan failed");
            None
        }
    }
}

/// One-shot post-payment resume check: the service's latest ride, if it is
/// still unresolved. Anything else (absent, terminal, or an error) is the
/// empty state.
pub async fn resume_after_payment(rides: &dyn RideService) -> Option<RideId> {
    match rides.latest().await {
        Ok(Some(ride)) if matches!(ride.status, RideStatus::Booked | RideStatus::Ongoing) => {
            Some(ride.id)
        }
        Ok(_) => None,
        Err(err) => {
            debug!(error = %err, "post-payment resume check failed");
            None
        }
    }
}

/// Background poll over the user's ride history.
pub struct ActiveTripWatcher {
    rx: watch::Receiver<Option<Ride>>,
    handle: PollHandle,
}

impl ActiveTripWatcher {
    /// Start scanning on the given cadence. The first scan runs
    /// immediately.
    pub fn start(
        rides: Arc<dyn RideService>,
        user_id: Option<String>,
        interval: Duration,
    ) -> Self {
        let (tx, rx) = watch::channel(None);
        let tx = Arc::new(tx);

        let handle = spawn_polling(interval, move |token| {
            let rides = Arc::clone(&rides);
            let user_id = user_id.clone();
            let tx = Arc::clone(&tx);
            async move {
                let active = find_active(rides.as_ref(), user_id.as_deref()).await;
                if token.is_cancelled() {
                    return Tick::Stop;
                }
                tx.send_replace(active);
                Tick::Continue
            }
        });

        Self { rx, handle }
    }

    /// Watch the discovered trip.
    pub fn updates(&self) -> watch::Receiver<Option<Ride>> {
        self.rx.clone()
    }

    /// Latest scan result.
    pub fn current(&self) -> Option<Ride> {
        self.rx.borrow().clone()
    }

    /// Rescan immediately, for when the view regains foreground focus.
    pub fn refresh_now(&self) {
        self.handle.wake_now();
    }

    /// Stop scanning.
    pub fn stop(&self) {
        self.handle.stop();
    }
}
