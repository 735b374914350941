//! Seed runs against a mock store.

use httpmock::prelude::*;
use serde_json::json;

use shop_persona_core::{CustomerId, ProductId};
use shop_persona_integration_tests::{API_ROOT, MockStore, fast_retry, product_node};
use shop_persona_proxy::seeder::{self, SeedOutcome, SeedPlan};
use shop_persona_proxy::services::{CustomerService, ProductService};
use shop_persona_proxy::shopify::RetryPolicy;

fn services(store: &MockStore, retry: RetryPolicy) -> (CustomerService, ProductService) {
    let client = store.client(retry);
    let products = ProductService::new(client.clone());
    (CustomerService::new(client, products.clone()), products)
}

#[tokio::test]
async fn test_seed_sample_reports_each_outcome_and_continues() {
    let store = MockStore::start();
    let products_path = format!("{API_ROOT}/products.json");
    let customers_path = format!("{API_ROOT}/customers.json");

    let widget = store.server.mock(|when, then| {
        when.method(POST)
            .path(products_path.clone())
            .body_includes("premium-widget");
        then.status(201).json_body(json!({"product": {"id": 456}}));
    });
    let _tee = store.server.mock(|when, then| {
        when.method(POST)
            .path(products_path.clone())
            .body_includes("classic-tee");
        then.status(422)
            .json_body(json!({"errors": {"handle": ["has already been taken"]}}));
    });
    let _mug = store.server.mock(|when, then| {
        when.method(POST)
            .path(products_path.clone())
            .body_includes("travel-mug");
        then.status(201).json_body(json!({"product": {"id": 457}}));
    });

    // John is assigned the widget created above.
    let john = store.server.mock(|when, then| {
        when.method(POST)
            .path(customers_path.clone())
            .body_includes("john.doe@example.com")
            .body_includes(r#""key":"assigned_product_id""#)
            .body_includes(r#""value":"456""#);
        then.status(422)
            .json_body(json!({"errors": {"email": ["has already been taken"]}}));
    });
    let jane = store.server.mock(|when, then| {
        when.method(POST)
            .path(customers_path.clone())
            .body_includes("jane.smith@example.com");
        then.status(500).body("boom");
    });
    let alex = store.server.mock(|when, then| {
        when.method(POST)
            .path(customers_path.clone())
            .body_includes("alex.rivera@example.com");
        then.status(201).json_body(json!({"customer": {"id": 9001}}));
    });

    let (customers, products) = services(&store, fast_retry(1));
    let report = seeder::seed(&customers, &products, &store.session(), &SeedPlan::sample()).await;

    widget.assert_hits(1);
    john.assert_hits(1);
    jane.assert_hits(2);
    alex.assert_hits(1);

    let product_ids: Vec<i64> = report.products.iter().map(|e| e.outcome.id()).collect();
    assert_eq!(product_ids, vec![456, -1, 457]);

    assert_eq!(report.customers.len(), 2);
    assert_eq!(report.customers[0].key, "john.doe@example.com");
    assert_eq!(report.customers[0].outcome, SeedOutcome::AlreadyExists);
    assert_eq!(report.customers[0].outcome.id(), -1);
    assert_eq!(report.customers[1].key, "alex.rivera@example.com");
    assert_eq!(report.customers[1].outcome, SeedOutcome::Created(9001));

    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].0, "jane.smith@example.com");
    assert_eq!(report.created(), 3);
    assert_eq!(report.already_existing(), 2);
}

#[tokio::test]
async fn test_seed_yaml_plan_with_existing_product_id() {
    let store = MockStore::start();
    let customer = store.server.mock(|when, then| {
        when.method(POST)
            .path(format!("{API_ROOT}/customers.json"))
            .json_body(json!({
                "customer": {
                    "first_name": "Rita",
                    "last_name": "Moreno",
                    "email": "rita@example.com",
                    "verified_email": true,
                    "metafields": [{
                        "namespace": "personalization",
                        "key": "assigned_product_id",
                        "value": "321",
                        "type": "single_line_text_field"
                    }]
                }
            }));
        then.status(201).json_body(json!({"customer": {"id": 42}}));
    });

    let plan = SeedPlan::from_yaml(
        r"
customers:
  - first_name: Rita
    last_name: Moreno
    email: rita@example.com
    assigned_product_id: 321
",
    )
    .unwrap_or_default();
    assert!(plan.validate().is_empty());

    let (customers, products) = services(&store, RetryPolicy::no_retry());
    let report = seeder::seed(&customers, &products, &store.session(), &plan).await;

    customer.assert_hits(1);
    assert!(report.products.is_empty());
    assert_eq!(report.customers[0].outcome, SeedOutcome::Created(42));
    assert!(report.errors.is_empty());
}

#[tokio::test]
async fn test_created_customer_is_personalized_with_seeded_product() {
    let store = MockStore::start();
    let _product = store.server.mock(|when, then| {
        when.method(POST).path(format!("{API_ROOT}/products.json"));
        then.status(201).json_body(json!({"product": {"id": 456}}));
    });
    let created = store.server.mock(|when, then| {
        when.method(POST)
            .path(format!("{API_ROOT}/customers.json"))
            .body_includes(r#""value":"456""#);
        then.status(201).json_body(json!({"customer": {"id": 123}}));
    });

    let mut plan = SeedPlan::sample();
    plan.products.truncate(1);
    plan.customers.truncate(1);

    let (customers, products) = services(&store, RetryPolicy::no_retry());
    let report = seeder::seed(&customers, &products, &store.session(), &plan).await;

    created.assert_hits(1);
    assert_eq!(report.products[0].outcome.id(), 456);
    assert_eq!(report.customers[0].outcome.id(), 123);

    // The new customer's metafields now point at the seeded product.
    let _metafields = store.mock_metafields(
        123,
        json!([{"namespace": "personalization", "key": "assigned_product_id", "value": "456"}]),
    );
    let metafields = customers.metafields(&store.session(), CustomerId::new(123)).await;
    assert_eq!(metafields.assigned_product_id, Some(ProductId::new(456)));
}

#[tokio::test]
async fn test_rerun_assigns_product_that_already_exists() {
    let store = MockStore::start();
    let _widget = store.server.mock(|when, then| {
        when.method(POST)
            .path(format!("{API_ROOT}/products.json"))
            .body_includes("premium-widget");
        then.status(422)
            .json_body(json!({"errors": {"handle": ["has already been taken"]}}));
    });
    let lookup = store.mock_product_by_handle(
        "premium-widget",
        &[product_node(
            456,
            "Premium Widget",
            "premium-widget",
            "19.99",
            "ACTIVE",
            true,
            None,
        )],
    );
    let john = store.server.mock(|when, then| {
        when.method(POST)
            .path(format!("{API_ROOT}/customers.json"))
            .body_includes(r#""key":"assigned_product_id""#)
            .body_includes(r#""value":"456""#);
        then.status(201).json_body(json!({"customer": {"id": 123}}));
    });

    let mut plan = SeedPlan::sample();
    plan.products.truncate(1);
    plan.customers.truncate(1);

    let (customers, products) = services(&store, RetryPolicy::no_retry());
    let report = seeder::seed(&customers, &products, &store.session(), &plan).await;

    lookup.assert_hits(1);
    john.assert_hits(1);
    assert_eq!(report.products[0].outcome, SeedOutcome::AlreadyExists);
    assert_eq!(report.customers[0].outcome, SeedOutcome::Created(123));
    assert!(report.errors.is_empty());
}

#[tokio::test]
async fn test_unknown_existing_handle_seeds_customer_without_assignment() {
    let store = MockStore::start();
    let _widget = store.server.mock(|when, then| {
        when.method(POST).path(format!("{API_ROOT}/products.json"));
        then.status(500).body("boom");
    });
    let lookup = store.mock_product_by_handle("premium-widget", &[]);
    let john = store.server.mock(|when, then| {
        when.method(POST)
            .path(format!("{API_ROOT}/customers.json"))
            .body_includes("john.doe@example.com");
        then.status(201).json_body(json!({"customer": {"id": 123}}));
    });

    let mut plan = SeedPlan::sample();
    plan.products.truncate(1);
    plan.customers.truncate(1);

    let (customers, products) = services(&store, RetryPolicy::no_retry());
    let report = seeder::seed(&customers, &products, &store.session(), &plan).await;

    lookup.assert_hits(1);
    john.assert_hits(1);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.customers[0].outcome, SeedOutcome::Created(123));
}
