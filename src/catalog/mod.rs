//! In-memory listings used by pages and the demo binary when no backend
//! table is available for properties.

use crate::models::{
    Address, Agent, Coordinates, Currency, ListingType, Property, PropertyImage, PropertyType,
};
use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;

fn listed(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(9, 0, 0))
        .map(|naive| naive.and_utc())
        .unwrap_or_else(Utc::now)
}

fn agent(id: &str, name: &str, email: &str, phone: &str, agency: &str) -> Agent {
    Agent {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        phone: phone.to_string(),
        agency: agency.to_string(),
        bio: None,
        license: None,
        profile_image: None,
    }
}

fn address(street: &str, city: &str, state: &str, zip_code: &str) -> Address {
    Address {
        street: street.to_string(),
        city: city.to_string(),
        state: state.to_string(),
        zip_code: zip_code.to_string(),
        country: "USA".to_string(),
    }
}

fn images(id: &str, count: usize) -> Vec<PropertyImage> {
    (0..count)
        .map(|i| PropertyImage {
            url: format!("https://images.example.com/properties/{}/{}.jpg", id, i + 1),
            alt: format!("Photo {}", i + 1),
            is_primary: i == 0,
        })
        .collect()
}

fn features(list: &[&str]) -> Vec<String> {
    list.iter().map(|f| f.to_string()).collect()
}

/// Sample listings across several cities, agents and listing types
pub fn sample_properties() -> Vec<Property> {
    debug!("Loading sample property catalog");

    let sarah = Agent {
        bio: Some("Residential specialist covering central Texas.".to_string()),
        license: Some("TX-558201".to_string()),
        ..agent("agent-1", "Sarah Johnson", "sarah@premierrealty.com", "(512) 555-0101", "Premier Realty")
    };
    let michael = agent("agent-2", "Michael Chen", "michael@coastalhomes.com", "(305) 555-0144", "Coastal Homes");
    let emily = agent("agent-3", "Emily Davis", "emily@urbanliving.com", "(212) 555-0178", "Urban Living Realty");
    let david = agent("agent-4", "David Martinez", "david@premierrealty.com", "(312) 555-0190", "Premier Realty");

    vec![
        Property {
            id: "prop-1".to_string(),
            title: "Modern Family Home".to_string(),
            description: "Open floor plan with a renovated kitchen and a landscaped backyard.".to_string(),
            price: 450_000.0,
            currency: Currency::Usd,
            property_type: PropertyType::House,
            listing_type: ListingType::Sale,
            bedrooms: 4,
            bathrooms: 3,
            garage: 2,
            area: Some(220.0),
            address: address("1247 Oak Valley Dr", "Austin", "TX", "78704"),
            images: images("prop-1", 3),
            features: features(&["Garden", "Pool", "Garage", "Air Conditioning"]),
            agent: sarah.clone(),
            coordinates: Some(Coordinates::new(30.2672, -97.7431)),
            views: 120,
            created_at: listed(2024, 3, 1),
            updated_at: listed(2024, 3, 5),
            is_active: true,
            is_featured: true,
        },
        Property {
            id: "prop-2".to_string(),
            title: "Downtown Luxury Condo".to_string(),
            description: "Corner unit with skyline views, concierge and rooftop pool.".to_string(),
            price: 520_000.0,
            currency: Currency::Usd,
            property_type: PropertyType::Condo,
            listing_type: ListingType::Sale,
            bedrooms: 2,
            bathrooms: 2,
            garage: 1,
            area: Some(110.0),
            address: address("500 Brickell Ave #1804", "Miami", "FL", "33131"),
            images: images("prop-2", 2),
            features: features(&["Pool", "Gym", "Doorman", "Balcony"]),
            agent: michael.clone(),
            coordinates: Some(Coordinates::new(25.7617, -80.1918)),
            views: 340,
            created_at: listed(2024, 2, 15),
            updated_at: listed(2024, 2, 20),
            is_active: true,
            is_featured: false,
        },
        Property {
            id: "prop-3".to_string(),
            title: "Beachfront Villa".to_string(),
            description: "Private beach access, infinity pool and tropical gardens.".to_string(),
            price: 1_250_000.0,
            currency: Currency::Usd,
            property_type: PropertyType::Villa,
            listing_type: ListingType::Sale,
            bedrooms: 5,
            bathrooms: 4,
            garage: 2,
            area: Some(410.0),
            address: address("88 Ocean Dr", "Miami Beach", "FL", "33139"),
            images: images("prop-3", 4),
            features: features(&["Pool", "Garden", "Ocean View", "Garage"]),
            agent: michael,
            coordinates: Some(Coordinates::new(25.7907, -80.1300)),
            views: 890,
            created_at: listed(2024, 1, 20),
            updated_at: listed(2024, 2, 2),
            is_active: true,
            is_featured: true,
        },
        Property {
            id: "prop-4".to_string(),
            title: "Cozy City Apartment".to_string(),
            description: "Bright one-bedroom close to the subway and parks.".to_string(),
            price: 2_200.0,
            currency: Currency::Usd,
            property_type: PropertyType::Apartment,
            listing_type: ListingType::Rent,
            bedrooms: 1,
            bathrooms: 1,
            garage: 0,
            area: Some(55.0),
            address: address("210 W 77th St", "New York", "NY", "10024"),
            images: images("prop-4", 2),
            features: features(&["Elevator", "Balcony"]),
            agent: emily.clone(),
            coordinates: Some(Coordinates::new(40.7128, -74.0060)),
            views: 210,
            created_at: listed(2024, 3, 10),
            updated_at: listed(2024, 3, 10),
            is_active: true,
            is_featured: false,
        },
        Property {
            id: "prop-5".to_string(),
            title: "Suburban Townhouse".to_string(),
            description: "Three levels, attached garage and a small private garden.".to_string(),
            price: 385_000.0,
            currency: Currency::Usd,
            property_type: PropertyType::Townhouse,
            listing_type: ListingType::Sale,
            bedrooms: 3,
            bathrooms: 2,
            garage: 1,
            area: Some(160.0),
            address: address("3300 Shoal Creek Blvd", "Austin", "TX", "78756"),
            images: images("prop-5", 2),
            features: features(&["Garage", "Garden"]),
            agent: sarah,
            coordinates: Some(Coordinates::new(30.3072, -97.7559)),
            views: 75,
            created_at: listed(2024, 2, 1),
            updated_at: listed(2024, 2, 1),
            is_active: true,
            is_featured: false,
        },
        Property {
            id: "prop-6".to_string(),
            title: "Historic Brownstone".to_string(),
            description: "Restored 1890s brownstone with original woodwork and fireplaces.".to_string(),
            price: 495_000.0,
            currency: Currency::Usd,
            property_type: PropertyType::House,
            listing_type: ListingType::Sale,
            bedrooms: 3,
            bathrooms: 2,
            garage: 0,
            area: Some(190.0),
            address: address("42 Beacon St", "Boston", "MA", "02108"),
            images: images("prop-6", 3),
            features: features(&["Fireplace", "Garden"]),
            agent: emily,
            coordinates: Some(Coordinates::new(42.3601, -71.0589)),
            views: 160,
            created_at: listed(2023, 12, 5),
            updated_at: listed(2024, 1, 8),
            is_active: true,
            is_featured: false,
        },
        Property {
            id: "prop-7".to_string(),
            title: "Commercial Retail Space".to_string(),
            description: "Street-level retail unit with high foot traffic.".to_string(),
            price: 8_500.0,
            currency: Currency::Usd,
            property_type: PropertyType::Commercial,
            listing_type: ListingType::Rent,
            bedrooms: 0,
            bathrooms: 2,
            garage: 0,
            area: Some(300.0),
            address: address("875 N Michigan Ave", "Chicago", "IL", "60611"),
            images: images("prop-7", 1),
            features: features(&["Parking"]),
            agent: david.clone(),
            coordinates: None,
            views: 45,
            created_at: listed(2024, 3, 12),
            updated_at: listed(2024, 3, 12),
            is_active: true,
            is_featured: false,
        },
        Property {
            id: "prop-8".to_string(),
            title: "Lakeside Land Parcel".to_string(),
            description: "Two wooded acres with lake access, ready for a custom build.".to_string(),
            price: 150_000.0,
            currency: Currency::Usd,
            property_type: PropertyType::Land,
            listing_type: ListingType::Sale,
            bedrooms: 0,
            bathrooms: 0,
            garage: 0,
            area: Some(8_100.0),
            address: address("Lakeshore Rd", "South Lake Tahoe", "CA", "96150"),
            images: vec![],
            features: vec![],
            agent: david,
            coordinates: Some(Coordinates::new(38.9399, -119.9772)),
            views: 30,
            created_at: listed(2023, 11, 20),
            updated_at: listed(2023, 11, 20),
            is_active: true,
            is_featured: false,
        },
    ]
}
