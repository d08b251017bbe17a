//! Diving into sequences and maps.

mod common;

use std::collections::{BTreeMap, HashMap};

use common::{pairs, summary};
use pretty_assertions::assert_eq;
use rstest::rstest;
use tagcheck::{Error, InvalidInputError, Record, SchemaBuilder, Validator};

#[derive(Debug, Clone, Default)]
struct Inventory {
    tags: Vec<String>,
    matrix: Vec<Vec<u32>>,
    stock: BTreeMap<String, i64>,
    aliases: HashMap<String, String>,
    notes: Option<Vec<String>>,
}

impl Record for Inventory {
    const NAME: &'static str = "Inventory";

    fn describe(schema: &mut SchemaBuilder<Self>) {
        schema.field("Tags", |i| &i.tags).rules("max=3,dive,required,lowercase");
        schema.field("Matrix", |i| &i.matrix).rules("dive,min=1,dive,lte=9");
        schema
            .field("Stock", |i| &i.stock)
            .rules("dive,keys,alpha,endkeys,gte=0");
        schema
            .field("Aliases", |i| &i.aliases)
            .rules("dive,keys,min=2,endkeys,required");
        schema.field("Notes", |i| &i.notes).rules("omitempty,dive,min=2");
    }
}

fn inventory() -> Inventory {
    Inventory {
        tags: vec!["red".to_owned(), "blue".to_owned()],
        matrix: vec![vec![1, 2], vec![3]],
        stock: BTreeMap::from([("apples".to_owned(), 4), ("pears".to_owned(), 0)]),
        aliases: HashMap::from([("nyc".to_owned(), "New York".to_owned())]),
        notes: None,
    }
}

#[test]
fn valid_collections_pass() {
    assert!(Validator::new().validate_record(&inventory()).is_ok());
}

#[test]
fn empty_collections_without_required_pass() {
    let input = Inventory {
        tags: Vec::new(),
        matrix: Vec::new(),
        stock: BTreeMap::new(),
        aliases: HashMap::new(),
        notes: Some(Vec::new()),
    };
    assert!(Validator::new().validate_record(&input).is_ok());
}

#[test]
fn sequence_elements_are_indexed() {
    let input = Inventory {
        tags: vec!["ok".to_owned(), String::new(), "Loud".to_owned()],
        ..inventory()
    };

    let err = Validator::new().validate_record(&input).unwrap_err();
    assert_eq!(
        summary(&err),
        pairs(&[
            ("Inventory.Tags[1]", "required"),
            ("Inventory.Tags[2]", "lowercase"),
        ])
    );
    let v = err.violations().unwrap().find("Inventory.Tags[2]").unwrap();
    assert_eq!(v.field(), "Tags[2]");
    assert_eq!(v.type_name(), "string");
}

#[test]
fn collection_rules_run_before_elements() {
    let input = Inventory {
        tags: vec!["a".into(), "b".into(), "c".into(), "D".into()],
        ..inventory()
    };

    let err = Validator::new().validate_record(&input).unwrap_err();
    assert_eq!(
        summary(&err),
        pairs(&[("Inventory.Tags", "max"), ("Inventory.Tags[3]", "lowercase")])
    );
}

#[test]
fn nested_dive_walks_inner_sequences() {
    let input = Inventory {
        matrix: vec![vec![1, 12], Vec::new(), vec![3, 4, 10]],
        ..inventory()
    };

    let err = Validator::new().validate_record(&input).unwrap_err();
    assert_eq!(
        summary(&err),
        pairs(&[
            ("Inventory.Matrix[0][1]", "lte"),
            ("Inventory.Matrix[1]", "min"),
            ("Inventory.Matrix[2][2]", "lte"),
        ])
    );
}

#[test]
fn map_keys_and_values_share_the_key_path() {
    let input = Inventory {
        stock: BTreeMap::from([("apples".to_owned(), -1), ("b4d".to_owned(), 2)]),
        ..inventory()
    };

    let err = Validator::new().validate_record(&input).unwrap_err();
    assert_eq!(
        summary(&err),
        pairs(&[("Inventory.Stock[apples]", "gte"), ("Inventory.Stock[b4d]", "alpha")])
    );
}

#[test]
fn hash_map_entries_are_walked_in_key_order() {
    let input = Inventory {
        aliases: HashMap::from([
            ("z".to_owned(), "Zurich".to_owned()),
            ("la".to_owned(), String::new()),
            ("b".to_owned(), "Berlin".to_owned()),
        ]),
        ..inventory()
    };

    let err = Validator::new().validate_record(&input).unwrap_err();
    assert_eq!(
        summary(&err),
        pairs(&[
            ("Inventory.Aliases[b]", "min"),
            ("Inventory.Aliases[la]", "required"),
            ("Inventory.Aliases[z]", "min"),
        ])
    );
}

#[test]
fn present_optional_collection_is_dived() {
    let input = Inventory {
        notes: Some(vec!["fine".to_owned(), "x".to_owned()]),
        ..inventory()
    };

    let err = Validator::new().validate_record(&input).unwrap_err();
    assert_eq!(summary(&err), pairs(&[("Inventory.Notes[1]", "min")]));
}

#[derive(Debug, Clone, Default)]
struct Draft {
    sections: Option<Vec<String>>,
}

impl Record for Draft {
    const NAME: &'static str = "Draft";

    fn describe(schema: &mut SchemaBuilder<Self>) {
        schema.field("Sections", |d| &d.sections).rules("dive,required");
    }
}

#[test]
fn absent_dive_target_is_invalid_input() {
    let err = Validator::new()
        .validate_record(&Draft::default())
        .unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidInput(InvalidInputError::AbsentDiveTarget { ref namespace }) if namespace == "Draft.Sections"
    ));
}

#[rstest]
#[case(Some(vec!["intro".to_owned()]), true)]
#[case(Some(vec![String::new()]), false)]
#[case(Some(Vec::new()), true)]
fn present_dive_target(#[case] sections: Option<Vec<String>>, #[case] valid: bool) {
    let result = Validator::new().validate_record(&Draft { sections });
    assert_eq!(result.is_ok(), valid);
}
