//! End-to-end transactions against a file world state in a temp home.

use supplychain_core::{ContractError, Product, TxTimestamp};
use supplychain_state::{execute_at, FileWorldState, StateError};
use tempfile::TempDir;

fn at(seconds: i64) -> TxTimestamp {
    TxTimestamp::new(1_714_039_200 + seconds, 0)
}

fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn init_ledger_then_get_all_products_returns_seeds() {
    init_logging();
    let home = TempDir::new().unwrap();

    let init = execute_at(home.path(), "InitLedger", &[], at(0)).expect("init");
    let commit = init.commit.expect("mutations commit");
    assert_eq!(commit.written, vec!["p1", "p2"]);
    assert!(init.payload.is_empty());

    let all = execute_at(home.path(), "GetAllProducts", &[], at(1)).expect("scan");
    assert!(all.commit.is_none(), "read-only calls never commit");
    let products: Vec<Product> = serde_json::from_slice(&all.payload).expect("decode");
    let names: Vec<&str> = products.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Laptop", "Smartphone"]);
}

#[test]
fn duplicate_create_fails_and_commits_nothing() {
    init_logging();
    let home = TempDir::new().unwrap();
    execute_at(home.path(), "InitLedger", &[], at(0)).expect("init");
    let state = FileWorldState::open_at(home.path()).unwrap();
    let before = state.get("p1").unwrap();

    let err = execute_at(
        home.path(),
        "CreateProduct",
        &args(&["p1", "Other", "Somebody", "", ""]),
        at(5),
    )
    .unwrap_err();

    assert!(
        matches!(err, StateError::Contract(ContractError::DuplicateId { .. })),
        "got: {err}"
    );
    assert_eq!(err.to_string(), "product with ID p1 already exists");
    assert_eq!(state.get("p1").unwrap(), before);
}

#[test]
fn update_and_transfer_persist_across_transactions() {
    init_logging();
    let home = TempDir::new().unwrap();
    execute_at(
        home.path(),
        "CreateProduct",
        &args(&["crate-7", "Crate", "Farm Co", "apples", "Produce"]),
        at(0),
    )
    .expect("create");
    execute_at(
        home.path(),
        "UpdateProduct",
        &args(&["crate-7", "Shipped", "Farm Co", "apples, 20kg", "Produce"]),
        at(60),
    )
    .expect("update");
    execute_at(
        home.path(),
        "TransferOwnership",
        &args(&["crate-7", "Grocer Ltd"]),
        at(120),
    )
    .expect("transfer");

    let query = execute_at(home.path(), "QueryProduct", &args(&["crate-7"]), at(180)).expect("query");
    let product: Product = serde_json::from_slice(&query.payload).unwrap();
    assert_eq!(product.status, "Shipped");
    assert_eq!(product.owner, "Grocer Ltd");
    assert_eq!(product.description, "apples, 20kg");
    assert_eq!(product.created_at, "2024-04-25T10:00:00Z");
    assert_eq!(product.updated_at, "2024-04-25T10:02:00Z");
}

#[test]
fn stored_bytes_equal_the_query_payload() {
    let home = TempDir::new().unwrap();
    execute_at(home.path(), "InitLedger", &[], at(0)).expect("init");
    let state = FileWorldState::open_at(home.path()).unwrap();

    let query = execute_at(home.path(), "QueryProduct", &args(&["p2"]), at(1)).expect("query");
    assert_eq!(Some(query.payload), state.get("p2").unwrap());
}

#[test]
fn unknown_function_and_bad_arity_touch_nothing() {
    let home = TempDir::new().unwrap();
    let unknown = execute_at(home.path(), "DeleteProduct", &args(&["p1"]), at(0)).unwrap_err();
    assert!(matches!(unknown, StateError::Contract(ContractError::UnknownFunction(_))));

    let arity = execute_at(home.path(), "TransferOwnership", &args(&["p1"]), at(0)).unwrap_err();
    assert!(matches!(
        arity,
        StateError::Contract(ContractError::InvalidArguments { expected: 2, actual: 1, .. })
    ));

    let state = FileWorldState::open_at(home.path()).unwrap();
    assert!(state.is_empty().unwrap());
}

#[test]
fn missing_product_is_not_found() {
    let home = TempDir::new().unwrap();
    let err = execute_at(home.path(), "QueryProduct", &args(&["ghost"]), at(0)).unwrap_err();
    assert_eq!(err.to_string(), "product with ID ghost does not exist");
}

#[test]
fn query_of_absent_long_id_is_not_found() {
    init_logging();
    let home = TempDir::new().unwrap();
    let id = "x".repeat(130);

    let err = execute_at(home.path(), "QueryProduct", &args(&[id.as_str()]), at(0)).unwrap_err();
    assert!(
        matches!(&err, StateError::Contract(ContractError::NotFound { id: missing }) if *missing == id),
        "got: {err}"
    );

    let exists = execute_at(home.path(), "ProductExists", &args(&[id.as_str()]), at(1)).expect("exists");
    assert_eq!(exists.payload, b"false");
}

#[test]
fn create_with_unstorable_id_is_storage_write_failure() {
    init_logging();
    for len in [121, 130] {
        let home = TempDir::new().unwrap();
        let id = "y".repeat(len);

        let err = execute_at(
            home.path(),
            "CreateProduct",
            &args(&[id.as_str(), "Pallet", "Depot", "", ""]),
            at(0),
        )
        .unwrap_err();
        assert!(
            matches!(&err, StateError::Contract(ContractError::StorageWriteFailure { key, .. }) if *key == id),
            "len {len}, got: {err}"
        );
        assert!(FileWorldState::open_at(home.path()).unwrap().is_empty().unwrap());
    }
}
