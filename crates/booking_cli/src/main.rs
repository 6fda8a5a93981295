use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::signal;
use tracing::info;

use booking_core::config::AppConfig;
use booking_core::booking::book_trip;
use booking_core::discovery::{find_active, resume_after_payment};
use booking_core::geocode::{GeocodeProvider, HttpGeocoder};
use booking_core::payment::{HttpPaymentGateway, PaymentDetails};
use booking_core::proposal::TripProposal;
use booking_core::rides::{HttpRideService, RideId, RideService};
use booking_core::routing::{HttpRouteClient, RouteProvider};
use booking_core::trip::{ActiveTrip, TripMonitor, TripView};
use booking_core::vehicles;

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "booking",
    about = "Terminal client for the ride-booking service"
)]
struct Cli {
    /// Path to a TOML config file; defaults plus env overrides otherwise
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the vehicle classes and their per-km rates
    Classes,
    /// Book a ride end-to-end: resolve, route, price, pay, then track it
    Book {
        /// Pickup address text
        pickup: String,
        /// Dropoff address text
        dropoff: String,
        /// Vehicle class name
        #[arg(long, default_value = "Mini")]
        car: String,
        /// User identity; guest when omitted
        #[arg(long)]
        user: Option<String>,
        /// Opaque payment-method token
        #[arg(long, default_value = "tok_visa")]
        payment_token: String,
    },
    /// Track an existing ride until it settles (ctrl-c cancels the trip)
    Watch {
        ride_id: String,
    },
    /// Resume tracking after a payment redirect
    Resume,
    /// List a user's ride history and flag the active trip, if any
    History {
        user: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref()).await?;
    let rides = Arc::new(HttpRideService::new(&config.rides));

    match cli.command {
        Commands::Classes => {
            for class in vehicles::catalog() {
                println!(
                    "{:<10} {} seats  ₹{}/km  {}",
                    class.name, class.seat_capacity, class.per_km_rate, class.description
                );
            }
            Ok(())
        }
        Commands::Book {
            pickup,
            dropoff,
            car,
            user,
            payment_token,
        } => {
            book(
                &config,
                rides,
                &pickup,
                &dropoff,
                &car,
                user.as_deref(),
                payment_token,
            )
            .await
        }
        Commands::Watch { ride_id } => {
            watch(&config, rides, RideId(ride_id)).await
        }
        Commands::Resume => match resume_after_payment(rides.as_ref()).await {
            Some(ride_id) => watch(&config, rides, ride_id).await,
            None => {
                println!("No trip status available.");
                Ok(())
            }
        },
        Commands::History { user } => history(rides, &user).await,
    }
}

// ── Booking flow ───────────────────────────────────────────────────

async fn book(
    config: &AppConfig,
    rides: Arc<HttpRideService>,
    pickup_text: &str,
    dropoff_text: &str,
    car: &str,
    user: Option<&str>,
    payment_token: String,
) -> anyhow::Result<()> {
    let geocoder = HttpGeocoder::new(&config.geocoding);
    let pickup = resolve(&geocoder, pickup_text, config).await?;
    let dropoff = resolve(&geocoder, dropoff_text, config).await?;
    println!("pickup:  {}", pickup.label);
    println!("dropoff: {}", dropoff.label);

    let router = Arc::new(HttpRouteClient::new(&config.routing));
    let route = router.route(&pickup, &dropoff).await?;
    println!("route:   {:.1} km", route.distance_km);

    let proposal = TripProposal::build(
        Some(pickup),
        Some(dropoff),
        Some(route.distance_km),
        Some(car),
    )?;
    println!("fare:    ₹{:.2} ({})", proposal.amount, proposal.car_type);

    // Same boundary the web client crosses between booking and payment:
    // flatten the proposal, then reconstruct it on the paying side.
    let params: HashMap<String, String> = proposal.to_handoff().into_iter().collect();
    let proposal = TripProposal::from_handoff(&params)?;

    let gateway = Arc::new(HttpPaymentGateway::new(&config.payment));
    let details = PaymentDetails {
        method_token: payment_token,
    };
    let user = user.unwrap_or("guest");
    let ride = book_trip(gateway, rides.as_ref(), user, &proposal, &details).await?;
    info!(ride = %ride.id, "ride created");
    println!("booked ride {}; tracking trip", ride.id);

    watch(config, rides, ride.id).await
}

async fn resolve(
    geocoder: &HttpGeocoder,
    text: &str,
    config: &AppConfig,
) -> anyhow::Result<booking_core::geo::GeoPoint> {
    geocoder
        .search(text, config.geocoding.limit)
        .await?
        .into_iter()
        .next()
        .with_context(|| format!("no location matches {text:?}"))
}

// ── Trip tracking ──────────────────────────────────────────────────

async fn watch(
    config: &AppConfig,
    rides: Arc<HttpRideService>,
    ride_id: RideId,
) -> anyhow::Result<()> {
    let router: Arc<dyn RouteProvider> = Arc::new(HttpRouteClient::new(&config.routing));
    let monitor = TripMonitor::start(
        Some(ride_id),
        rides,
        Some(router),
        config.polling.trip_interval(),
    );

    let mut view = monitor.view();
    loop {
        let current = view.borrow_and_update().clone();
        match current {
            TripView::Loading => {}
            TripView::Active(trip) => {
                print_trip(&trip);
                if trip.ride.status.is_terminal() {
                    println!("Trip finished. Thanks for riding.");
                    break;
                }
            }
            TripView::NotFound => {
                println!("No ride booked yet. No trip status available.");
                break;
            }
        }

        tokio::select! {
            changed = view.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = signal::ctrl_c() => {
                match monitor.cancel().await {
                    Ok(()) => println!("Trip cancelled."),
                    Err(err) => eprintln!("could not cancel: {err}"),
                }
                break;
            }
        }
    }
    Ok(())
}

fn print_trip(trip: &ActiveTrip) {
    let ride = &trip.ride;
    print!(
        "[{}] {} → {}  ₹{:.2}",
        ride.status, ride.pickup.label, ride.dropoff.label, ride.price
    );
    if let Some(driver) = &ride.driver {
        print!("  driver {} ({}) at {:.4},{:.4}", driver.name, driver.car_number, driver.lat, driver.lon);
    }
    if let Some(route) = &trip.route {
        print!("  route {} points", route.waypoints.len());
    }
    println!();
}

// ── History ────────────────────────────────────────────────────────

async fn history(rides: Arc<HttpRideService>, user: &str) -> anyhow::Result<()> {
    let trips = rides.for_user(user).await?;
    if trips.is_empty() {
        println!("No trips yet.");
        return Ok(());
    }
    for ride in &trips {
        println!(
            "{}  [{}]  {} → {}  ₹{:.2}",
            ride.id, ride.status, ride.pickup.label, ride.dropoff.label, ride.price
        );
    }
    if let Some(active) = find_active(rides.as_ref(), Some(user)).await {
        println!("Active trip: {} ({})", active.id, active.status);
    }
    Ok(())
}
