//! Static vehicle-class reference data.
//!
//! The catalog is read-only for the lifetime of a session and is the
//! validation universe for proposal building: a proposal's car type must
//! name one of these classes.

use serde::{Deserialize, Serialize};

/// One bookable vehicle class. Rates are INR per kilometre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleClass {
    pub id: u32,
    pub name: String,
    pub seat_capacity: u8,
    pub per_km_rate: f64,
    pub description: String,
    pub image_ref: String,
}

/// The built-in vehicle catalog, cheapest first.
pub fn catalog() -> Vec<VehicleClass> {
    vec![
        VehicleClass {
            id: 1,
            name: "Mini".to_string(),
            seat_capacity: 4,
            per_km_rate: 12.0,
            description: "Compact rides at everyday prices".to_string(),
            image_ref: "/mini.png".to_string(),
        },
        VehicleClass {
            id: 2,
            name: "Sedan".to_string(),
            seat_capacity: 4,
            per_km_rate: 15.0,
            description: "Comfortable sedans with extra legroom".to_string(),
            image_ref: "/sedan.png".to_string(),
        },
        VehicleClass {
            id: 3,
            name: "SUV".to_string(),
            seat_capacity: 6,
            per_km_rate: 20.0,
            description: "Room for groups and luggage".to_string(),
            image_ref: "/suv.png".to_string(),
        },
        VehicleClass {
            id: 4,
            name: "Premium".to_string(),
            seat_capacity: 4,
            per_km_rate: 25.0,
            description: "High-end cars with top-rated drivers".to_string(),
            image_ref: "/premium.png".to_string(),
        },
    ]
}

/// Look up a vehicle class by name, case-insensitively.
pub fn find(name: &str) -> Option<VehicleClass> {
    catalog()
        .into_iter()
        .find(|class| class.name.eq_ignore_ascii_case(name))
}
