use std::path::PathBuf;
use std::sync::Arc;

use bagtrack::error::AppError;
use bagtrack::kit::{
    format_weight, ExpirationSweep, ItemCategory, ItemDraft, KitService, RecommendationCatalog,
    UserDraft, WeightUnit,
};
use chrono::{Duration, Local, NaiveDate};
use clap::Args;

use crate::infra::{InMemoryItemRepository, InMemoryMailOutbox, InMemoryUserRepository};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Evaluation date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Weight unit for the summary section (g, kg, oz, lb)
    #[arg(long)]
    pub(crate) unit: Option<String>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct CatalogListingArgs {
    /// Restrict the listing to one category (e.g. Medical, Tools)
    #[arg(long)]
    pub(crate) category: Option<String>,
    /// Show essential entries only
    #[arg(long)]
    pub(crate) essential: bool,
    /// Load the catalog from a CSV export instead of the built-in list
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
}

pub(crate) fn run_catalog_listing(args: CatalogListingArgs) -> Result<(), AppError> {
    let CatalogListingArgs {
        category,
        essential,
        csv,
    } = args;

    let catalog = match csv {
        Some(path) => {
            let file = std::fs::File::open(&path)?;
            let import = RecommendationCatalog::from_reader(file)?;
            if import.assumed_gram_units > 0 {
                println!(
                    "Note: {} row(s) had unknown weight units and were read as grams",
                    import.assumed_gram_units
                );
            }
            import.catalog
        }
        None => RecommendationCatalog::builtin(),
    };

    let category = match category.as_deref() {
        Some(raw) => match ItemCategory::from_label(raw) {
            Some(category) => Some(category),
            None => {
                println!("Unknown category '{raw}'; nothing to list");
                return Ok(());
            }
        },
        None => None,
    };

    let entries: Vec<_> = catalog
        .entries()
        .iter()
        .filter(|entry| category.map_or(true, |wanted| entry.category == wanted))
        .filter(|entry| !essential || entry.is_essential)
        .collect();

    if entries.is_empty() {
        println!("No catalog entries match");
        return Ok(());
    }

    println!("Recommended emergency bag items");
    for entry in entries {
        let marker = if entry.is_essential {
            "essential"
        } else {
            "optional"
        };
        println!(
            "- {} ({}) | {} | {} | popularity {}",
            entry.name,
            entry.category.label(),
            format_weight(entry.average_weight, entry.weight_unit),
            marker,
            entry.popularity
        );
        println!("    {}", entry.description);
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { today, unit } = args;

    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let unit = match unit.as_deref() {
        None => WeightUnit::Kilograms,
        Some(raw) => {
            let coerced = WeightUnit::coerce(raw);
            if coerced.assumed_grams {
                println!("Unknown unit '{raw}', showing the summary in grams");
            }
            coerced.unit
        }
    };

    println!("Emergency bag demo (evaluated {today})");

    let items = Arc::new(InMemoryItemRepository::default());
    let users = Arc::new(InMemoryUserRepository::default());
    let outbox = Arc::new(InMemoryMailOutbox::default());
    let service = KitService::new(
        Arc::clone(&items),
        Arc::clone(&users),
        Arc::clone(&outbox),
    );

    let profile = match service.register_user(UserDraft {
        email: "avery@example.com".to_string(),
        first_name: "Avery".to_string(),
        last_name: "Quinn".to_string(),
        height: Some(175.0),
        weight: Some(70.0),
    }) {
        Ok(profile) => profile,
        Err(err) => {
            println!("  Registration rejected: {}", err);
            return Ok(());
        }
    };
    let profile = match service.confirm_email(&profile.id) {
        Ok(profile) => profile,
        Err(err) => {
            println!("  Verification unavailable: {}", err);
            return Ok(());
        }
    };
    println!(
        "Demo account {} ({} {}, body weight {} kg)",
        profile.email,
        profile.first_name,
        profile.last_name,
        profile.weight.unwrap_or(0.0)
    );

    for draft in demo_items(today) {
        if let Err(err) = service.create_item(&profile.id, draft) {
            println!("  Item rejected: {}", err);
        }
    }

    let summary = match service.kit_summary(&profile.id, unit, today) {
        Ok(summary) => summary,
        Err(err) => {
            println!("  Summary unavailable: {}", err);
            return Ok(());
        }
    };

    println!("\nBag contents");
    for view in &summary.items {
        let expiry_note = match view.days_until_expiration {
            Some(days) if days < 0 => format!(" ({} days past expiry)", -days),
            Some(days) => format!(" (expires in {days} days)"),
            None => String::new(),
        };
        println!(
            "- {} x{} | {} | {} | {}{}",
            view.name,
            view.quantity,
            view.weight_display,
            view.category_label,
            view.expiration.band.label(),
            expiry_note
        );
    }

    println!("\nDashboard summary");
    println!(
        "- {} items | total {} | {} expiring soon",
        summary.item_count, summary.total_weight_display, summary.expiring_soon
    );
    match &summary.safety {
        Some(safety) => println!(
            "- Carry check: {} ({:.0}% of the recommended maximum)",
            safety.message, safety.percentage
        ),
        None => println!("- Carry check unavailable: no body weight on file"),
    }

    let alerts = match service.expiration_alerts(&profile.id, today) {
        Ok(alerts) => alerts,
        Err(err) => {
            println!("  Alert lookup unavailable: {}", err);
            return Ok(());
        }
    };
    if alerts.is_empty() {
        println!("\nExpiring within 30 days: none");
    } else {
        println!("\nExpiring within 30 days");
        for item in &alerts {
            match item.expiration_date {
                Some(date) => println!("- {} on {}", item.name, date.format("%B %-d, %Y")),
                None => println!("- {}", item.name),
            }
        }
    }

    let sweep = ExpirationSweep::new(items, users, Arc::clone(&outbox));
    match sweep.run(today) {
        Ok(report) => {
            println!(
                "\nDaily sweep: {} subscriber(s), {} notified, {} without matches, {} failure(s)",
                report.subscribers, report.notified, report.without_matches, report.failures
            );
            for message in outbox.messages() {
                println!("- queued \"{}\" -> {}", message.subject, message.to);
            }
        }
        Err(err) => println!("  Sweep unavailable: {}", err),
    }

    println!("\nTop essential recommendations");
    let catalog = RecommendationCatalog::builtin();
    for entry in catalog.essentials().into_iter().take(5) {
        println!(
            "- {} ({}) | {}",
            entry.name,
            entry.category.label(),
            format_weight(entry.average_weight, entry.weight_unit)
        );
    }

    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("\nDashboard payload:\n{}", json),
        Err(err) => println!("\nDashboard payload unavailable: {}", err),
    }

    Ok(())
}

fn demo_items(today: NaiveDate) -> Vec<ItemDraft> {
    let draft = |name: &str, category, weight, unit| ItemDraft {
        name: name.to_string(),
        category,
        weight,
        weight_unit: unit,
        quantity: 1,
        expiration_date: None,
        notes: None,
        is_essential: false,
    };

    let mut first_aid = draft("First Aid Kit", ItemCategory::Medical, 250.0, WeightUnit::Grams);
    first_aid.is_essential = true;

    let mut water = draft("Water Pouches", ItemCategory::Water, 500.0, WeightUnit::Grams);
    water.quantity = 2;
    water.expiration_date = Some(today + Duration::days(10));

    let mut medication = draft(
        "Allergy Medication",
        ItemCategory::Medical,
        100.0,
        WeightUnit::Grams,
    );
    medication.expiration_date = Some(today + Duration::days(3));
    medication.is_essential = true;

    let mut antiseptic = draft(
        "Antiseptic Wipes",
        ItemCategory::Medical,
        60.0,
        WeightUnit::Grams,
    );
    antiseptic.expiration_date = Some(today - Duration::days(2));

    let blanket = draft(
        "Emergency Blanket",
        ItemCategory::Other,
        60.0,
        WeightUnit::Grams,
    );

    vec![first_aid, water, medication, antiseptic, blanket]
}
