use chrono::Utc;
use tracing::info;

use crate::models::Location;

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

/// Built-in demo catalog used when no catalog file is configured
pub fn demo_locations() -> Vec<Location> {
    info!("📋 Loading built-in demo catalog");

    vec![
        Location {
            id: "loc_arts_district_loft".to_string(),
            title: "Arts District Loft".to_string(),
            address: "811 E 3rd St, Los Angeles, CA 90013".to_string(),
            price: 175.0,
            images: strings(&["https://images.example.com/arts-loft/1.jpg"]),
            amenities: strings(&["WiFi", "Natural Light", "Freight Elevator"]),
            property_type: Some("Residential - Loft".to_string()),
            instant_booking: true,
            created_at: Utc::now(),
        },
        Location {
            id: "loc_vernon_warehouse".to_string(),
            title: "Vernon Brick Warehouse".to_string(),
            address: "4500 S Alameda St, Vernon, CA 90058".to_string(),
            price: 250.0,
            images: strings(&["https://images.example.com/vernon/1.jpg"]),
            amenities: strings(&["Loading Dock", "Parking", "Power Drops"]),
            property_type: Some("Commercial - Warehouse".to_string()),
            instant_booking: false,
            created_at: Utc::now(),
        },
        Location {
            id: "loc_silver_lake_studio".to_string(),
            title: "Silver Lake Daylight Studio".to_string(),
            address: "2900 Sunset Blvd, Los Angeles, CA 90026".to_string(),
            price: 95.0,
            images: strings(&[
                "https://images.example.com/silver-lake/1.jpg",
                "https://images.example.com/silver-lake/2.jpg",
            ]),
            amenities: strings(&["Cyclorama", "WiFi", "Makeup Station"]),
            property_type: Some("photo-studio".to_string()),
            instant_booking: true,
            created_at: Utc::now(),
        },
        Location {
            id: "loc_malibu_beach_house".to_string(),
            title: "Malibu Beach House".to_string(),
            address: "22000 Pacific Coast Hwy, Malibu, CA 90265".to_string(),
            price: 450.0,
            images: strings(&["https://images.example.com/malibu/1.jpg"]),
            amenities: strings(&["Ocean View", "Pool", "Parking"]),
            property_type: Some("Residential - House".to_string()),
            instant_booking: false,
            created_at: Utc::now(),
        },
        Location {
            id: "loc_dtla_rooftop".to_string(),
            title: "DTLA Skyline Rooftop".to_string(),
            address: "600 W 7th St, Los Angeles, CA 90017".to_string(),
            price: 320.0,
            images: vec![],
            amenities: strings(&["Skyline View", "Restrooms"]),
            property_type: Some("Event Space - Rooftop".to_string()),
            instant_booking: true,
            created_at: Utc::now(),
        },
    ]
}
