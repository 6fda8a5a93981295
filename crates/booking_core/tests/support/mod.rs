#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use booking_core::geo::{GeoPoint, RouteGeometry};
use booking_core::geocode::{GeocodeError, GeocodeProvider};
use booking_core::payment::{
    PaymentAuthorization, PaymentConfirmation, PaymentDetails, PaymentError, PaymentGateway,
};
use booking_core::rides::{
    Driver, NewRide, Ride, RideId, RideService, RideServiceError, RideStatus,
};
use booking_core::routing::{RouteProvider, RoutingError};

/// A representative snapshot for tests that need one on hand.
pub fn sample_ride(status: RideStatus) -> Ride {
    Ride {
        id: RideId::from("ride-1"),
        user_id: "user-7".to_string(),
        pickup: GeoPoint::new("Law Garden, Ahmedabad", 23.03, 72.58),
        dropoff: GeoPoint::new("Sabarmati Riverfront", 23.05, 72.60),
        distance_km: 6.2,
        car_type: "Mini".to_string(),
        price: 74.4,
        status,
        driver: None,
        payment_ref: "pay_123".to_string(),
    }
}

pub fn sample_driver() -> Driver {
    Driver {
        name: "Ravi".to_string(),
        car_number: "GJ 01 AB 1234".to_string(),
        lat: 23.031,
        lon: 72.582,
    }
}

#[derive(Default)]
struct RideState {
    ride: Option<Ride>,
    /// Status applied to the held ride on each fetch, in order; the last
    /// applied status then repeats.
    fetch_statuses: VecDeque<RideStatus>,
    /// Status the advance-driver call claims, regardless of the held ride.
    advance_reports: Option<RideStatus>,
    transport_failures: usize,
    fetch_malformed: bool,
    fetch_delay: Option<Duration>,
    fail_create: bool,
    fail_status_update: bool,
    history: Vec<Ride>,
    fail_history: bool,
    latest: Option<Ride>,
    created: usize,
}

/// Scriptable in-memory stand-in for the ride-state service.
#[derive(Default)]
pub struct FakeRideService {
    state: Mutex<RideState>,
    pub fetch_calls: AtomicUsize,
    pub advance_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
    pub status_calls: AtomicUsize,
    pub history_calls: AtomicUsize,
}

impl FakeRideService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold this snapshot as the current server-side ride.
    pub fn with_ride(self, ride: Ride) -> Self {
        self.state.lock().expect("state lock").ride = Some(ride);
        self
    }

    /// Apply these statuses to the held ride, one per fetch.
    pub fn with_scripted_statuses(self, statuses: impl IntoIterator<Item = RideStatus>) -> Self {
        self.state.lock().expect("state lock").fetch_statuses = statuses.into_iter().collect();
        self
    }

    /// The advance-driver call will claim this status.
    pub fn with_advance_reporting(self, status: RideStatus) -> Self {
        self.state.lock().expect("state lock").advance_reports = Some(status);
        self
    }

    /// The next `count` fetches fail at the transport level.
    pub fn with_transport_failures(self, count: usize) -> Self {
        self.state.lock().expect("state lock").transport_failures = count;
        self
    }

    /// The next fetch returns a body that fails strict deserialization.
    pub fn with_malformed_fetch(self) -> Self {
        self.state.lock().expect("state lock").fetch_malformed = true;
        self
    }

    /// Every fetch suspends this long before answering.
    pub fn with_fetch_delay(self, delay: Duration) -> Self {
        self.state.lock().expect("state lock").fetch_delay = Some(delay);
        self
    }

    pub fn with_failing_create(self) -> Self {
        self.state.lock().expect("state lock").fail_create = true;
        self
    }

    pub fn with_failing_status_update(self) -> Self {
        self.state.lock().expect("state lock").fail_status_update = true;
        self
    }

    pub fn with_history(self, rides: Vec<Ride>) -> Self {
        self.state.lock().expect("state lock").history = rides;
        self
    }

    pub fn with_failing_history(self) -> Self {
        self.state.lock().expect("state lock").fail_history = true;
        self
    }

    pub fn with_latest(self, ride: Ride) -> Self {
        self.state.lock().expect("state lock").latest = Some(ride);
        self
    }

    /// Mid-test mutation: move the pickup, as a re-created ride would.
    pub fn set_pickup(&self, pickup: GeoPoint) {
        let mut state = self.state.lock().expect("state lock");
        if let Some(ride) = state.ride.as_mut() {
            ride.pickup = pickup;
        }
    }

    /// Mid-test mutation: replace the user's ride history.
    pub fn set_history(&self, rides: Vec<Ride>) {
        self.state.lock().expect("state lock").history = rides;
    }

    /// Status of the held ride, as the service currently sees it.
    pub fn current_status(&self) -> Option<RideStatus> {
        self.state
            .lock()
            .expect("state lock")
            .ride
            .as_ref()
            .map(|ride| ride.status)
    }
}

#[async_trait]
impl RideService for FakeRideService {
    async fn create(&self, ride: &NewRide) -> Result<Ride, RideServiceError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().expect("state lock");
        if state.fail_create {
            return Err(RideServiceError::Status(500));
        }
        state.created += 1;
        let created = Ride {
            id: RideId(format!("ride-{}", state.created)),
            user_id: ride.user_id.clone(),
            pickup: ride.pickup.clone(),
            dropoff: ride.dropoff.clone(),
            distance_km: ride.distance_km,
            car_type: ride.car_type.clone(),
            price: ride.price,
            status: ride.status,
            driver: None,
            payment_ref: ride.payment_ref.clone(),
        };
        state.ride = Some(created.clone());
        state.latest = Some(created.clone());
        Ok(created)
    }

    async fn fetch(&self, _id: &RideId) -> Result<Option<Ride>, RideServiceError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.state.lock().expect("state lock").fetch_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mut state = self.state.lock().expect("state lock");
        if state.transport_failures > 0 {
            state.transport_failures -= 1;
            return Err(RideServiceError::Status(500));
        }
        if state.fetch_malformed {
            state.fetch_malformed = false;
            return Err(RideServiceError::Malformed(
                "missing field `price`".to_string(),
            ));
        }
        if let Some(next) = state.fetch_statuses.pop_front() {
            if let Some(ride) = state.ride.as_mut() {
                ride.status = next;
            }
        }
        Ok(state.ride.clone())
    }

    async fn for_user(&self, _user_id: &str) -> Result<Vec<Ride>, RideServiceError> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().expect("state lock");
        if state.fail_history {
            return Err(RideServiceError::Status(500));
        }
        Ok(state.history.clone())
    }

    async fn latest(&self) -> Result<Option<Ride>, RideServiceError> {
        Ok(self.state.lock().expect("state lock").latest.clone())
    }

    async fn set_status(&self, _id: &RideId, status: RideStatus) -> Result<Ride, RideServiceError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().expect("state lock");
        if state.fail_status_update {
            return Err(RideServiceError::Status(500));
        }
        match state.ride.as_mut() {
            Some(ride) => {
                ride.status = status;
                Ok(ride.clone())
            }
            None => Err(RideServiceError::Status(404)),
        }
    }

    async fn advance_driver(&self, _id: &RideId) -> Result<Ride, RideServiceError> {
        self.advance_calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().expect("state lock");
        match &state.ride {
            Some(ride) => {
                let mut reported = ride.clone();
                if let Some(status) = state.advance_reports {
                    reported.status = status;
                }
                Ok(reported)
            }
            None => Err(RideServiceError::Status(404)),
        }
    }
}

/// Route provider that draws a straight segment and counts invocations.
pub struct CountingRouter {
    pub calls: AtomicUsize,
    fail: bool,
    distance_km: f64,
}

impl CountingRouter {
    pub fn new(distance_km: f64) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: false,
            distance_km,
        }
    }

    pub fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: true,
            distance_km: 0.0,
        }
    }
}

#[async_trait]
impl RouteProvider for CountingRouter {
    async fn route(
        &self,
        pickup: &GeoPoint,
        dropoff: &GeoPoint,
    ) -> Result<RouteGeometry, RoutingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(RoutingError::NoRoute);
        }
        Ok(RouteGeometry {
            waypoints: vec![(pickup.lat, pickup.lon), (dropoff.lat, dropoff.lon)],
            distance_km: self.distance_km,
        })
    }
}

/// Geocoder with canned answers and a configurable response delay.
pub struct FakeGeocoder {
    delay: Duration,
    results: Mutex<HashMap<String, Vec<GeoPoint>>>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeGeocoder {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            results: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_candidates(self, text: &str, candidates: Vec<GeoPoint>) -> Self {
        self.results
            .lock()
            .expect("results lock")
            .insert(text.to_string(), candidates);
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl GeocodeProvider for FakeGeocoder {
    async fn search(&self, text: &str, _limit: usize) -> Result<Vec<GeoPoint>, GeocodeError> {
        self.calls
            .lock()
            .expect("calls lock")
            .push(text.to_string());
        tokio::time::sleep(self.delay).await;
        Ok(self
            .results
            .lock()
            .expect("results lock")
            .get(text)
            .cloned()
            .unwrap_or_default())
    }
}

/// Payment gateway with scripted authorize/confirm outcomes.
pub struct FakeGateway {
    authorize_ok: bool,
    confirm_ok: bool,
    pub authorize_calls: AtomicUsize,
    pub confirm_calls: AtomicUsize,
}

impl FakeGateway {
    pub fn succeeding() -> Self {
        Self::new(true, true)
    }

    pub fn declining_authorization() -> Self {
        Self::new(false, true)
    }

    pub fn declining_confirmation() -> Self {
        Self::new(true, false)
    }

    fn new(authorize_ok: bool, confirm_ok: bool) -> Self {
        Self {
            authorize_ok,
            confirm_ok,
            authorize_calls: AtomicUsize::new(0),
            confirm_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_authorization(
        &self,
        amount_minor_units: i64,
    ) -> Result<PaymentAuthorization, PaymentError> {
        self.authorize_calls.fetch_add(1, Ordering::SeqCst);
        if self.authorize_ok {
            Ok(PaymentAuthorization {
                client_secret: "sec_fake".to_string(),
                amount_minor_units,
            })
        } else {
            Err(PaymentError::Authorization("card declined".to_string()))
        }
    }

    async fn confirm(
        &self,
        authorization: PaymentAuthorization,
        _details: &PaymentDetails,
    ) -> Result<PaymentConfirmation, PaymentError> {
        self.confirm_calls.fetch_add(1, Ordering::SeqCst);
        if self.confirm_ok {
            Ok(PaymentConfirmation {
                payment_reference: format!("pay_for_{}", authorization.amount_minor_units),
            })
        } else {
            Err(PaymentError::Confirmation("insufficient funds".to_string()))
        }
    }
}
