use proptest::prelude::*;
use proptest::test_runner::Config;
use realty_hub::catalog::sample_properties;
use realty_hub::map::{haversine_distance, Bounds};
use realty_hub::models::Coordinates;
use realty_hub::search::{filter_properties, SearchFilters};
use realty_hub::Property;

fn coordinates() -> impl Strategy<Value = Coordinates> {
    (-90.0_f64..=90.0, -180.0_f64..=180.0).prop_map(|(lat, lng)| Coordinates::new(lat, lng))
}

fn bounds() -> impl Strategy<Value = Bounds> {
    (-80.0_f64..80.0, 0.0_f64..10.0, -170.0_f64..170.0, 0.0_f64..10.0)
        .prop_map(|(south, height, west, width)| Bounds::new(south + height, south, west + width, west))
}

fn listings_priced(prices: &[u32]) -> Vec<Property> {
    let template = sample_properties().remove(0);
    prices
        .iter()
        .enumerate()
        .map(|(i, price)| Property {
            id: format!("gen-{}", i),
            price: f64::from(*price),
            ..template.clone()
        })
        .collect()
}

proptest! {
    #![proptest_config(Config::with_cases(256))]

    #[test]
    fn distance_to_self_is_zero(a in coordinates()) {
        prop_assert_eq!(haversine_distance(a, a), 0.0);
    }

    #[test]
    fn distance_is_symmetric(a in coordinates(), b in coordinates()) {
        let ab = haversine_distance(a, b);
        let ba = haversine_distance(b, a);
        prop_assert!(ab >= 0.0);
        prop_assert!((ab - ba).abs() < 1e-9, "{} vs {}", ab, ba);
    }

    #[test]
    fn bounds_contain_their_edges(b in bounds(), t in 0.0_f64..=1.0) {
        let lat = (b.south + t * (b.north - b.south)).min(b.north);
        let lng = (b.west + t * (b.east - b.west)).min(b.east);

        for point in [
            Coordinates::new(b.north, lng),
            Coordinates::new(b.south, lng),
            Coordinates::new(lat, b.east),
            Coordinates::new(lat, b.west),
            Coordinates::new(b.north, b.east),
            Coordinates::new(b.south, b.west),
        ] {
            prop_assert!(b.contains(point), "{:?} not in {:?}", point, b);
        }
        prop_assert!(!b.contains(Coordinates::new(b.north + 1e-6, lng)));
        prop_assert!(!b.contains(Coordinates::new(lat, b.west - 1e-6)));
    }

    #[test]
    fn price_filter_keeps_exactly_the_inclusive_range(
        prices in prop::collection::vec(0_u32..2_000_000, 1..40),
        lo in any::<prop::sample::Index>(),
        hi in any::<prop::sample::Index>(),
    ) {
        let a = f64::from(prices[lo.index(prices.len())]);
        let b = f64::from(prices[hi.index(prices.len())]);
        let (min, max) = (a.min(b), a.max(b));

        let listings = listings_priced(&prices);
        let filters = SearchFilters {
            min_price: Some(min),
            max_price: Some(max),
            ..SearchFilters::default()
        };
        let result = filter_properties(&listings, &filters);
        let kept: Vec<&str> = result.iter().map(|p| p.id.as_str()).collect();
        let expected: Vec<&str> = listings
            .iter()
            .filter(|p| p.price >= min && p.price <= max)
            .map(|p| p.id.as_str())
            .collect();

        prop_assert_eq!(kept, expected);
    }
}
