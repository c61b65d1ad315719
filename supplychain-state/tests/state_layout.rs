//! On-disk layout of the world state under a home directory.

use assert_fs::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use supplychain_core::TxTimestamp;
use supplychain_state::{execute_at, FileWorldState};

const T0: i64 = 1_714_039_200;

#[test]
fn init_ledger_writes_one_file_per_seed_product() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    execute_at(home.path(), "InitLedger", &[], TxTimestamp::new(T0, 0)).expect("init");

    let laptop = home.child(".supplychain/state/7031.json");
    laptop.assert(predicate::path::exists());
    laptop.assert(predicate::str::contains(r#""owner":"CompanyA""#));
    laptop.assert(predicate::str::contains(r#""created_at":"2024-04-25T10:00:00Z""#));
    home.child(".supplychain/state/7032.json")
        .assert(predicate::str::starts_with(r#"{"id":"p2","name":"Smartphone""#));
    home.child(".supplychain/state/7031.json.tmp")
        .assert(predicate::path::missing());
}

#[test]
fn rejected_invocation_leaves_no_files() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let args = vec!["ghost".to_string(), "Nobody".to_string()];
    execute_at(home.path(), "TransferOwnership", &args, TxTimestamp::new(T0, 0)).unwrap_err();

    let state = FileWorldState::open_at(home.path()).expect("open");
    assert!(state.is_empty().expect("len"));
    home.child(".supplychain/state/67686f7374.json")
        .assert(predicate::path::missing());
}

#[rstest]
#[case("p1", "7031.json")]
#[case("a/b", "612f62.json")]
#[case("品", "e59381.json")]
#[case("P1", "5031.json")]
fn keys_map_to_hex_file_names(#[case] key: &str, #[case] file_name: &str) {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let state = FileWorldState::open_at(home.path()).expect("open");
    state.put(key, b"{}").expect("put");

    home.child(".supplychain/state")
        .child(file_name)
        .assert(predicate::path::is_file());
    assert_eq!(state.range("", "").expect("range")[0].key, key);
}
