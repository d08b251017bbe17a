//! One validator shared across threads.

mod common;

use std::thread;

use common::{Address, User, valid_address, valid_user};
use pretty_assertions::assert_eq;
use tagcheck::Validator;

#[test]
fn concurrent_first_use_derives_consistent_schemas() {
    let validator = Validator::new();

    let results: Vec<Vec<String>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let validator = &validator;
                scope.spawn(move || {
                    let user = User {
                        age: 131 + i,
                        addresses: vec![Address {
                            phone: String::new(),
                            ..valid_address()
                        }],
                        ..valid_user()
                    };
                    let err = validator.validate_record(&user).unwrap_err();
                    err.violations()
                        .unwrap()
                        .iter()
                        .map(|v| v.namespace().to_owned())
                        .collect()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for namespaces in results {
        assert_eq!(namespaces, vec!["User.Age", "User.Addresses[0].Phone"]);
    }
    assert_eq!(validator.cached_schemas(), 2);
}

#[test]
fn clones_share_the_schema_cache() {
    let validator = Validator::new();
    let clone = validator.clone();

    thread::spawn(move || clone.validate_record(&valid_user()))
        .join()
        .unwrap()
        .unwrap();

    assert_eq!(validator.cached_schemas(), 2);
}
