//! Seed a store with sample products and customers.
//!
//! Reads a seed plan from YAML (or uses the built-in sample), validates it,
//! then creates products and customers through the Admin API.

use std::path::Path;

use tracing::{error, info};

use shop_persona_proxy::seeder::{self, SeedOutcome, SeedPlan};
use shop_persona_proxy::services::{CustomerService, ProductService};

use super::{Target, connect};

/// Seed from `file_path`, or the built-in sample when `None`.
///
/// # Errors
///
/// Returns an error if configuration is missing, the file cannot be read or
/// the plan is invalid. Failures of individual entries are reported, not
/// returned.
pub async fn run(
    target: &Target,
    file_path: Option<&str>,
    dry_run: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let plan = match file_path {
        Some(file_path) => {
            let path = Path::new(file_path);
            if !path.exists() {
                return Err(format!("File not found: {file_path}").into());
            }
            info!(path = %file_path, "Loading seed plan from file");
            SeedPlan::from_file(path).await?
        }
        None => {
            info!("Using built-in sample seed plan");
            SeedPlan::sample()
        }
    };

    info!(
        products = plan.products.len(),
        customers = plan.customers.len(),
        "Parsed seed plan"
    );

    let errors = plan.validate();
    if !errors.is_empty() {
        error!("Seed plan validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    info!("Seed plan validated successfully");
    if dry_run {
        info!("Dry run, nothing created");
        return Ok(());
    }

    let (client, session) = connect(target)?;
    let products = ProductService::new(client.clone());
    let customers = CustomerService::new(client, products.clone());

    info!(shop = %session.shop(), "Starting seeding process");
    let report = seeder::seed(&customers, &products, &session, &plan).await;

    // Print summary
    info!("Seeding complete!");
    for entry in report.products.iter().chain(report.customers.iter()) {
        match entry.outcome {
            SeedOutcome::Created(id) => info!("  {}: created ({id})", entry.key),
            SeedOutcome::AlreadyExists => info!(
                "  {}: already exists ({})",
                entry.key,
                entry.outcome.id()
            ),
        }
    }
    info!("  Created: {}", report.created());
    info!("  Skipped (already exist): {}", report.already_existing());

    if !report.errors.is_empty() {
        error!("  Errors: {}", report.errors.len());
        for (key, err) in &report.errors {
            error!("    - {key}: {err}");
        }
    }

    Ok(())
}
