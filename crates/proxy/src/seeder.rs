//! Seed a store with sample products and customers.
//!
//! Products are created first so customers can reference them by handle.
//! A handle that already existed upstream is looked up so re-runs still
//! assign it.
//! Entries that already exist upstream are reported, not treated as errors,
//! and a failed entry never stops the batch.
//!
//! ## YAML Format
//!
//! ```yaml
//! products:
//!   - title: Premium Widget
//!     handle: premium-widget
//!     price: "19.99"
//!     image_url: https://cdn.example.com/widget.png
//!
//! customers:
//!   - first_name: John
//!     last_name: Doe
//!     email: john.doe@example.com
//!     profile_image_url: https://cdn.example.com/john.png
//!     assigned_product: premium-widget
//! ```

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::Deserialize;
use shop_persona_core::{Price, ProductId};
use thiserror::Error;
use tracing::{error, info, instrument, warn};

use crate::models::{CustomerCreateRequest, ProductCreateRequest};
use crate::services::{CustomerService, ProductService};
use crate::shopify::{ApiError, Session};

/// Errors that stop a seed run before it starts.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// A product to create.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductSeed {
    pub title: String,
    pub handle: String,
    pub price: Price,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A customer to create.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerSeed {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub profile_image_url: Option<String>,
    /// Handle of a product in the same plan.
    #[serde(default)]
    pub assigned_product: Option<String>,
    /// Numeric id of an existing product. Ignored when `assigned_product` is set.
    #[serde(default)]
    pub assigned_product_id: Option<i64>,
}

/// Everything a seed run creates.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedPlan {
    #[serde(default)]
    pub products: Vec<ProductSeed>,
    #[serde(default)]
    pub customers: Vec<CustomerSeed>,
}

impl SeedPlan {
    /// Parse a plan from YAML.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::Config` if the YAML does not describe a plan.
    pub fn from_yaml(content: &str) -> Result<Self, SeedError> {
        serde_yaml::from_str(content)
            .map_err(|e| SeedError::Config(format!("Failed to parse YAML: {e}")))
    }

    /// Read and parse a plan file.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::Io` if the file cannot be read, `SeedError::Config`
    /// if it cannot be parsed.
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SeedError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| SeedError::Io(format!("Failed to read {}: {e}", path.display())))?;
        Self::from_yaml(&content)
    }

    /// The built-in demo catalogue.
    #[must_use]
    pub fn sample() -> Self {
        let product = |title: &str, handle: &str, cents: u32, image: &str| ProductSeed {
            title: title.to_string(),
            handle: handle.to_string(),
            price: Price::from_cents(cents),
            image_url: Some(format!("https://cdn.shopify.com/s/files/sample/{image}")),
            description: None,
        };
        let customer = |first: &str, last: &str, product: Option<&str>| CustomerSeed {
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: format!("{}.{}@example.com", first.to_lowercase(), last.to_lowercase()),
            profile_image_url: product.map(|_| {
                format!(
                    "https://cdn.shopify.com/s/files/sample/avatars/{}.png",
                    first.to_lowercase()
                )
            }),
            assigned_product: product.map(String::from),
            assigned_product_id: None,
        };

        Self {
            products: vec![
                product("Premium Widget", "premium-widget", 1999, "premium-widget.png"),
                product("Classic Tee", "classic-tee", 2400, "classic-tee.png"),
                product("Travel Mug", "travel-mug", 1450, "travel-mug.png"),
            ],
            customers: vec![
                customer("John", "Doe", Some("premium-widget")),
                customer("Jane", "Smith", Some("travel-mug")),
                customer("Alex", "Rivera", None),
            ],
        }
    }

    /// Check the plan for problems that would make entries fail.
    ///
    /// Returns one message per problem; empty means valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut handles = HashSet::new();

        for (i, product) in self.products.iter().enumerate() {
            if product.title.trim().is_empty() {
                errors.push(format!("Product at index {i} has an empty title"));
            }
            if product.handle.trim().is_empty() {
                errors.push(format!("Product at index {i} has an empty handle"));
            } else if !handles.insert(product.handle.as_str()) {
                errors.push(format!("Duplicate product handle: {}", product.handle));
            }
        }

        let mut emails = HashSet::new();
        for (i, customer) in self.customers.iter().enumerate() {
            if !customer.email.contains('@') {
                errors.push(format!(
                    "Customer at index {i} has an invalid email: '{}'",
                    customer.email
                ));
            } else if !emails.insert(customer.email.to_lowercase()) {
                errors.push(format!("Duplicate customer email: {}", customer.email));
            }
            if let Some(handle) = &customer.assigned_product
                && !handles.contains(handle.as_str())
            {
                errors.push(format!(
                    "Customer {} references unknown product handle: {handle}",
                    customer.email
                ));
            }
        }

        errors
    }
}

/// What happened to one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Created(i64),
    AlreadyExists,
}

impl SeedOutcome {
    /// Id reported for entries that already existed.
    pub const ALREADY_EXISTS_ID: i64 = -1;

    /// The new id, or [`Self::ALREADY_EXISTS_ID`].
    #[must_use]
    pub const fn id(self) -> i64 {
        match self {
            Self::Created(id) => id,
            Self::AlreadyExists => Self::ALREADY_EXISTS_ID,
        }
    }
}

/// One seeded entry, keyed by product handle or customer email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedEntry {
    pub key: String,
    pub outcome: SeedOutcome,
}

/// Result of a seed run.
#[derive(Debug, Default)]
pub struct SeedReport {
    pub products: Vec<SeedEntry>,
    pub customers: Vec<SeedEntry>,
    /// Failed entries (key, error message).
    pub errors: Vec<(String, String)>,
}

impl SeedReport {
    /// Number of entries created.
    #[must_use]
    pub fn created(&self) -> usize {
        self.entries()
            .filter(|e| matches!(e.outcome, SeedOutcome::Created(_)))
            .count()
    }

    /// Number of entries that already existed.
    #[must_use]
    pub fn already_existing(&self) -> usize {
        self.entries()
            .filter(|e| e.outcome == SeedOutcome::AlreadyExists)
            .count()
    }

    fn entries(&self) -> impl Iterator<Item = &SeedEntry> {
        self.products.iter().chain(self.customers.iter())
    }
}

/// Create every product, then every customer, in `plan`.
#[instrument(skip_all, fields(shop = %session.shop(), products = plan.products.len(), customers = plan.customers.len()))]
pub async fn seed(
    customers: &CustomerService,
    products: &ProductService,
    session: &Session,
    plan: &SeedPlan,
) -> SeedReport {
    let mut report = SeedReport::default();
    let mut created_products: HashMap<&str, ProductId> = HashMap::new();

    for seed in &plan.products {
        let request = ProductCreateRequest {
            title: seed.title.clone(),
            handle: seed.handle.clone(),
            price: seed.price,
            image_url: seed.image_url.clone(),
            description: seed.description.clone(),
        };
        let result = products.create(session, &request).await;

        if let Ok(id) = &result {
            created_products.insert(seed.handle.as_str(), *id);
        }
        record(&mut report.products, &mut report.errors, &seed.handle, result.map(i64::from));
    }

    for seed in &plan.customers {
        let assigned_product_id = match &seed.assigned_product {
            Some(handle) => match created_products.get(handle.as_str()) {
                Some(id) => Some(*id),
                None => lookup_existing(products, session, &seed.email, handle).await,
            },
            None => seed.assigned_product_id.map(ProductId::new),
        };

        let request = CustomerCreateRequest {
            first_name: seed.first_name.clone(),
            last_name: seed.last_name.clone(),
            email: seed.email.clone(),
            profile_image_url: seed.profile_image_url.clone(),
            assigned_product_id,
        };
        let result = customers.create(session, &request).await;
        record(&mut report.customers, &mut report.errors, &seed.email, result.map(i64::from));
    }

    info!(
        created = report.created(),
        already_existing = report.already_existing(),
        errors = report.errors.len(),
        "Seeding complete"
    );

    report
}

/// Resolve a product handle that was not created in this run, e.g. one left
/// by an earlier partial seed.
async fn lookup_existing(
    products: &ProductService,
    session: &Session,
    email: &str,
    handle: &str,
) -> Option<ProductId> {
    match products.get_by_handle(session, handle).await {
        Ok(Some(product)) => {
            info!(email, handle, product_id = %product.id, "Assigned existing product");
            Some(product.id)
        }
        Ok(None) => {
            warn!(email, handle, "Assigned product not found, skipping assignment");
            None
        }
        Err(e) => {
            warn!(email, handle, error = %e, "Assigned product lookup failed, skipping assignment");
            None
        }
    }
}

fn record(
    entries: &mut Vec<SeedEntry>,
    errors: &mut Vec<(String, String)>,
    key: &str,
    result: Result<i64, ApiError>,
) {
    let outcome = match result {
        Ok(id) => {
            info!(key, id, "Created");
            SeedOutcome::Created(id)
        }
        Err(e) if e.is_already_exists() => {
            info!(key, "Already exists, skipping");
            SeedOutcome::AlreadyExists
        }
        Err(e) => {
            error!(key, error = %e, "Failed to seed entry");
            errors.push((key.to_string(), e.to_string()));
            return;
        }
    };

    entries.push(SeedEntry {
        key: key.to_string(),
        outcome,
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_plan() {
        let yaml = r#"
products:
  - title: Premium Widget
    handle: premium-widget
    price: "19.99"

customers:
  - first_name: John
    last_name: Doe
    email: john@example.com
    assigned_product: premium-widget
  - first_name: Jane
    last_name: Smith
    email: jane@example.com
    assigned_product_id: 456
"#;

        let plan = SeedPlan::from_yaml(yaml).unwrap();
        assert_eq!(plan.products.len(), 1);
        assert_eq!(plan.products[0].price.to_string(), "19.99");
        assert!(plan.products[0].image_url.is_none());
        assert_eq!(plan.customers.len(), 2);
        assert_eq!(
            plan.customers[0].assigned_product.as_deref(),
            Some("premium-widget")
        );
        assert_eq!(plan.customers[1].assigned_product_id, Some(456));
        assert!(plan.validate().is_empty());
    }

    #[test]
    fn test_parse_yaml_rejects_bad_price() {
        let yaml = r#"
products:
  - title: Widget
    handle: widget
    price: "cheap"
"#;
        assert!(matches!(SeedPlan::from_yaml(yaml), Err(SeedError::Config(_))));
    }

    #[test]
    fn test_sample_plan_is_valid() {
        let plan = SeedPlan::sample();
        assert_eq!(plan.products.len(), 3);
        assert_eq!(plan.products[0].price.to_string(), "19.99");
        assert_eq!(plan.customers[0].email, "john.doe@example.com");
        assert!(plan.validate().is_empty());
    }

    #[test]
    fn test_validate_reports_problems() {
        let mut plan = SeedPlan::sample();
        plan.products[1].handle = "premium-widget".to_string();
        plan.customers[1].email = "not-an-email".to_string();
        plan.customers[2].assigned_product = Some("missing".to_string());

        let errors = plan.validate();
        assert_eq!(errors.len(), 3, "{errors:?}");
        assert!(errors[0].contains("Duplicate product handle"));
        assert!(errors[1].contains("invalid email"));
        assert!(errors[2].contains("unknown product handle"));
    }

    #[test]
    fn test_outcome_ids() {
        assert_eq!(SeedOutcome::Created(42).id(), 42);
        assert_eq!(SeedOutcome::AlreadyExists.id(), -1);
    }

    #[test]
    fn test_record_keeps_going_after_errors() {
        let mut entries = Vec::new();
        let mut errors = Vec::new();

        record(&mut entries, &mut errors, "a", Ok(1));
        record(
            &mut entries,
            &mut errors,
            "b",
            Err(ApiError::Client {
                operation: "CreateCustomer".to_string(),
                message: "HTTP 422 Unprocessable Entity".to_string(),
                status: 422,
                body: Some(r#"{"errors":{"email":["has already been taken"]}}"#.to_string()),
            }),
        );
        record(
            &mut entries,
            &mut errors,
            "c",
            Err(ApiError::CreationFailed("no id".to_string())),
        );

        assert_eq!(
            entries,
            vec![
                SeedEntry {
                    key: "a".to_string(),
                    outcome: SeedOutcome::Created(1)
                },
                SeedEntry {
                    key: "b".to_string(),
                    outcome: SeedOutcome::AlreadyExists
                },
            ]
        );
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].0, "c");
    }
}
