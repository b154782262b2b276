use crate::models::{Currency, ListingType, Property};

/// Groups the integer part with commas: 1234567 -> "1,234,567"
fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Display price rounded to whole units, with "/mo" appended for rentals
pub fn format_price(amount: f64, currency: Currency, listing_type: ListingType) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let whole = amount.abs().round() as u64;
    let base = format!("{}{}{}", sign, currency.symbol(), group_thousands(whole));
    match listing_type {
        ListingType::Sale => base,
        ListingType::Rent => format!("{}/mo", base),
    }
}

pub fn format_property_price(property: &Property) -> String {
    format_price(property.price, property.currency, property.listing_type)
}

/// Price per square metre, when the listing has a positive area
pub fn price_per_area(property: &Property) -> Option<f64> {
    property
        .area
        .filter(|area| *area > 0.0)
        .map(|area| property.price / area)
}

pub fn format_area(area: f64) -> String {
    format!("{} m²", group_thousands(area.round() as u64))
}
