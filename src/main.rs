use anyhow::Context;
use realty_hub::backend::mock::{DEMO_EMAIL, DEMO_PASSWORD};
use realty_hub::comparison::ComparisonTray;
use realty_hub::i18n::Translator;
use realty_hub::map::{fit_bounds, haversine_distance};
use realty_hub::mortgage::{summarize, MortgageInput};
use realty_hub::reporting::ErrorReporter;
use realty_hub::search::{format_property_price, search_properties, SearchFilters, SortBy};
use realty_hub::toast::ToastQueue;
use realty_hub::{catalog, connect, AuthContext, Config, ListingType};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("🏠 Realty Hub");
    info!("==========================================");

    let config = Config::from_env();
    let translator = Translator::new(config.locale)?;
    let reporter = ErrorReporter::new();
    let mut toasts = ToastQueue::new();

    let properties = catalog::sample_properties();
    info!("{}", translator.t("search.title"));

    // Search: homes for sale, 3+ bedrooms, most expensive first
    let filters = SearchFilters {
        listing_type: Some(ListingType::Sale),
        min_bedrooms: Some(3),
        sort_by: Some(SortBy::PriceDesc),
        ..SearchFilters::default()
    };
    let results = search_properties(&properties, &filters);
    let count = results.len().to_string();
    info!("{}", translator.t_with("search.results", &[("count", count.as_str())]));

    for (i, property) in results.iter().enumerate() {
        println!("{}. {} ({})", i + 1, property.title, format_property_price(property));
        println!("   {} bd, {} ba", property.bedrooms, property.bathrooms);
        println!("   {}", property.address);
        println!("   Agent: {} ({})", property.agent.name, property.agent.agency);
        if !property.features.is_empty() {
            println!("   Features: {}", property.features.join(", "));
        }
        println!();
    }

    if let Some(view) = fit_bounds(&results) {
        info!(
            "🗺️  Map centre {:.4}, {:.4} at zoom {}",
            view.center.lat, view.center.lng, view.zoom
        );
        if let (Some(first), Some(last)) = (
            results.first().and_then(|p| p.coordinates),
            results.last().and_then(|p| p.coordinates),
        ) {
            info!("Spread of results: {:.0} km", haversine_distance(first, last));
        }
    }

    // Compare the top listings
    let mut tray = ComparisonTray::new();
    for property in results.iter().take(4) {
        if let Err(e) = tray.add(property.clone()) {
            toasts.warning(translator.t_with("compare.full", &[("max", "3")]));
            warn!("{}", e);
        }
    }
    for row in tray.comparison_rows() {
        println!("{:<10} {}", row.label, row.values.join(" | "));
    }
    println!();

    if let Some(top) = results.first() {
        let summary = summarize(&MortgageInput {
            price: top.price,
            down_payment: top.price * 0.2,
            annual_rate_percent: 6.5,
            term_years: 30,
        })
        .context("Mortgage estimate failed")?;
        info!(
            "💰 {}: {:.2} ({:.0} interest over 30 years)",
            translator.t("mortgage.monthly_payment"),
            summary.monthly_payment,
            summary.total_interest
        );
    }

    // Favorites and saved searches go through the backend
    let backend = connect(&config).context("Failed to create backend client")?;
    let auth = AuthContext::new(Arc::clone(&backend));

    if config.is_mock() {
        match auth.sign_in(DEMO_EMAIL, DEMO_PASSWORD).await {
            Ok(profile) => {
                toasts.success(translator.t_with("auth.welcome", &[("name", profile.full_name.as_str())]));
                if let Some(top) = results.first() {
                    auth.toggle_favorite(&top.id).await?;
                }
                let saved = auth.save_search("Family homes", filters.clone()).await?;
                info!("💾 Saved search '{}' ({})", saved.name, saved.id);
                info!("❤️  Favorites: {:?}", auth.favorites().await);
                auth.sign_out().await?;
            }
            Err(e) => {
                reporter.report_error("AUTH_FAILED", "main", &e);
                toasts.error(translator.t("common.error"), e.to_string());
            }
        }
    } else {
        info!("Hosted backend configured; skipping demo sign-in");
    }

    for toast in toasts.active() {
        info!("🔔 [{:?}] {}", toast.kind, toast.title);
    }
    if reporter.total() > 0 {
        warn!("{} errors reported", reporter.total());
    }

    // Save results for other tools
    let json = serde_json::to_string_pretty(&results)?;
    tokio::fs::write("search_results.json", json).await?;
    info!("💾 Saved {} results to search_results.json", results.len());

    Ok(())
}
