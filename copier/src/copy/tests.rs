#![allow(
    clippy::expect_used,
    clippy::float_cmp,
    reason = "tests fail loudly and compare exact parsed values"
)]

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::json;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

use crate::{
    Converter, CopyOptions, CopySettings, DynamicList, DynamicMap, Error, Record, ShapeCache,
    TypeKey, copy, copy_with_options,
};

/// Route engine events to the test output, filtered by `RUST_LOG`
fn init_tracing() {
    let _ = Registry::default()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}

fn parsing_converters() -> CopyOptions {
    CopyOptions::new()
        .with_converter(Converter::from_fn(|text: &String| text.parse::<i64>()))
        .with_converter(Converter::from_fn(|text: &String| text.parse::<f64>()))
}

#[derive(Debug, Clone, Default, PartialEq, Record)]
#[copier(rename_all = "PascalCase")]
struct Inner {
    role:  String,
    level: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Record)]
#[copier(rename_all = "PascalCase", methods)]
struct TestStruct {
    field_string:     String,
    field_int:        i64,
    field_float:      f64,
    #[copier("-")]
    field_tag_ignore: String,
    #[copier("FieldB")]
    field_a:          String,
    super_rule:       String,
    level_set:        i64,
    nested:           Inner,
}

#[struct_copier::methods(rename_all = "PascalCase")]
impl TestStruct {
    fn role(&mut self, role: String) { self.super_rule = format!("Super {role}"); }

    fn level(&mut self, level: i64) { self.level_set = level; }
}

// ============================================================================
// MAPPING SOURCES
// ============================================================================

#[test]
fn mapping_source_fills_fields_through_converters_and_setters() {
    init_tracing();
    let source = DynamicMap::new()
        .with("FieldString", "aaa".to_string())
        .with("FieldInt", "11".to_string())
        .with("FieldFloat", "1.22".to_string())
        .with("Role", "role".to_string());

    let mut destination = TestStruct::default();
    copy_with_options(&mut destination, &source, &parsing_converters()).expect("copy succeeds");

    assert_eq!(destination.field_string, "aaa");
    assert_eq!(destination.field_int, 11);
    assert_eq!(destination.field_float, 1.22);
    assert_eq!(destination.super_rule, "Super role");
}

#[test]
fn json_document_source() {
    init_tracing();
    let source = DynamicMap::from_json(&json!({
        "FieldString": "aaa",
        "FieldInt": "11",
        "Role": "role"
    }))
    .expect("object source");

    let mut destination = TestStruct::default();
    copy_with_options(&mut destination, &source, &parsing_converters()).expect("copy succeeds");

    assert_eq!(destination.field_string, "aaa");
    assert_eq!(destination.field_int, 11);
    assert_eq!(destination.super_rule, "Super role");
}

#[test]
fn ignored_field_keeps_its_value() {
    init_tracing();
    let source = DynamicMap::new()
        .with("FieldTagIgnore", "new".to_string())
        .with("field_tag_ignore", "new".to_string());

    let mut destination = TestStruct {
        field_tag_ignore: "orig".to_string(),
        ..TestStruct::default()
    };
    copy(&mut destination, &source).expect("unmatched members are not errors");

    assert_eq!(destination.field_tag_ignore, "orig");
}

#[test]
fn renamed_field_reads_only_its_new_name() {
    init_tracing();
    let source = DynamicMap::new()
        .with("FieldA", "from declared name".to_string())
        .with("FieldB", "from rename".to_string());

    let mut destination = TestStruct::default();
    copy(&mut destination, &source).expect("copy succeeds");

    assert_eq!(destination.field_a, "from rename");
}

#[test]
fn setter_receives_converted_argument() {
    init_tracing();
    let mut destination = TestStruct::default();

    let source = DynamicMap::new().with("Level", "7".to_string());
    copy_with_options(&mut destination, &source, &parsing_converters()).expect("converted");
    assert_eq!(destination.level_set, 7);

    let source = DynamicMap::new().with("Level", 8_i64);
    copy(&mut destination, &source).expect("direct argument");
    assert_eq!(destination.level_set, 8);
}

#[test]
fn nested_mapping_copies_recursively() {
    init_tracing();
    let source = DynamicMap::from_json(&json!({
        "Nested": { "Role": "admin", "Level": 3 },
        "FieldString": "outer"
    }))
    .expect("object source");

    let mut destination = TestStruct::default();
    copy(&mut destination, &source).expect("copy succeeds");

    assert_eq!(
        destination.nested,
        Inner {
            role:  "admin".to_string(),
            level: 3,
        }
    );
    assert_eq!(destination.field_string, "outer");
}

#[test]
fn unmatched_members_are_skipped_silently() {
    init_tracing();
    let source = DynamicMap::new().with("Unknown", 1_i64).with("fieldstring", "x".to_string());

    let mut destination = TestStruct::default();
    copy(&mut destination, &source).expect("partial overlap is fine");

    assert_eq!(destination, TestStruct::default());
}

// ============================================================================
// AGGREGATED ERRORS
// ============================================================================

#[test]
fn converter_failure_is_aggregated_while_other_members_copy() {
    init_tracing();
    let source = DynamicMap::new()
        .with("FieldString", "aaa".to_string())
        .with("FieldInt", "eleven".to_string())
        .with("Role", "role".to_string());

    let mut destination = TestStruct::default();
    let report = copy_with_options(&mut destination, &source, &parsing_converters())
        .expect_err("the converter fails");

    let errors = report.current_context().members();
    assert_eq!(errors.len(), 1);
    assert!(matches!(&errors[0], Error::Conversion { path, .. } if path == ".FieldInt"));
    assert_eq!(destination.field_string, "aaa");
    assert_eq!(destination.super_rule, "Super role");
}

#[test]
fn missing_converter_is_a_type_mismatch() {
    init_tracing();
    let source = DynamicMap::new()
        .with("FieldInt", "11".to_string())
        .with("FieldFloat", 2_i64)
        .with("FieldString", "aaa".to_string());

    let mut destination = TestStruct::default();
    let report = copy(&mut destination, &source).expect_err("no conversion path");

    let error = report.current_context();
    assert!(!error.is_fatal());
    let paths: Vec<_> = error.members().iter().filter_map(Error::path).collect();
    assert_eq!(paths, [".FieldFloat", ".FieldInt"]);
    assert!(
        error
            .members()
            .iter()
            .all(|member| matches!(member, Error::TypeMismatch { .. }))
    );
    assert_eq!(destination.field_string, "aaa");
}

// ============================================================================
// SEQUENCES
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Record)]
struct Playlist {
    tracks:  Vec<String>,
    plays:   Vec<i64>,
    members: Vec<Inner>,
}

#[test]
fn sequences_resize_to_the_source_length() {
    init_tracing();
    let source = DynamicMap::from_json(&json!({
        "tracks": ["x"],
        "plays": ["1", "x", "3"],
        "members": [{ "Role": "lead", "Level": 2 }]
    }))
    .expect("object source");

    let mut destination = Playlist {
        tracks: vec!["a".to_string(), "b".to_string(), "c".to_string()],
        ..Playlist::default()
    };
    let report = copy_with_options(&mut destination, &source, &parsing_converters())
        .expect_err("one element fails to convert");

    assert_eq!(destination.tracks, ["x"]);
    assert_eq!(destination.plays, [1, 0, 3]);
    assert_eq!(
        destination.members,
        [Inner {
            role:  "lead".to_string(),
            level: 2,
        }]
    );

    let errors = report.current_context().members();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].path(), Some(".plays[1]"));
}

#[test]
fn top_level_sequences_copy_element_wise() {
    init_tracing();
    let mut destination = vec![9_i64; 4];
    copy(&mut destination, &vec![1_i64, 2]).expect("same element type");
    assert_eq!(destination, [1, 2]);

    let mut dynamic = DynamicList::new().with("stale".to_string());
    copy(&mut dynamic, &vec![1_i64, 2]).expect("dynamic lists take copies");
    assert_eq!(dynamic.len(), 2);
    assert!(dynamic.get(0).is_some_and(|item| item.is::<i64>()));
}

// ============================================================================
// RECURSION
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Record)]
struct Leaf {
    c: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Record)]
struct Branch {
    b: Leaf,
    d: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Record)]
struct Trunk {
    top: i64,
    a:   Branch,
}

fn three_levels() -> DynamicMap {
    DynamicMap::from_json(&json!({ "top": 1, "a": { "d": 4, "b": { "c": 3 } } }))
        .expect("object source")
}

#[test]
fn recursion_limit_aborts_only_the_offending_branch() {
    init_tracing();
    let mut destination = Trunk::default();
    let report = copy_with_options(&mut destination, &three_levels(), &CopyOptions::new().max_depth(1))
        .expect_err("level two is too deep");

    assert_eq!(destination.top, 1);
    assert_eq!(destination.a.d, 4);
    assert_eq!(destination.a.b.c, 0);

    let errors = report.current_context().members();
    assert_eq!(errors.len(), 1);
    assert!(
        matches!(&errors[0], Error::RecursionLimit { path, limit: 1 } if path == ".a.b")
    );
}

#[test]
fn default_limit_copies_every_level() {
    init_tracing();
    let mut destination = Trunk::default();
    copy(&mut destination, &three_levels()).expect("well within the default limit");
    assert_eq!(destination.a.b.c, 3);
}

// ============================================================================
// OPTIONS
// ============================================================================

#[test]
fn ignore_empty_skips_zero_values() {
    init_tracing();
    let source = DynamicMap::new()
        .with("FieldString", String::new())
        .with("FieldInt", 0_i64);
    let populated = || TestStruct {
        field_string: "keep".to_string(),
        field_int: 5,
        ..TestStruct::default()
    };

    let settings: CopySettings =
        serde_json::from_value(json!({ "ignore_empty": true })).expect("valid settings");
    let mut destination = populated();
    copy_with_options(&mut destination, &source, &CopyOptions::from_settings(settings))
        .expect("copy succeeds");
    assert_eq!(destination.field_string, "keep");
    assert_eq!(destination.field_int, 5);

    let mut destination = populated();
    copy(&mut destination, &source).expect("copy succeeds");
    assert_eq!(destination.field_string, "");
    assert_eq!(destination.field_int, 0);
}

#[test]
fn ignore_empty_skips_records_whose_fields_are_all_empty() {
    init_tracing();
    let admin = Inner {
        role:  "admin".to_string(),
        level: 3,
    };
    let options = CopyOptions::new().ignore_empty(true);
    let mut destination = TestStruct {
        nested: admin.clone(),
        ..TestStruct::default()
    };

    let source = DynamicMap::new().with("Nested", Inner::default());
    copy_with_options(&mut destination, &source, &options).expect("copy succeeds");
    assert_eq!(destination.nested, admin);

    let partial = Inner {
        role:  String::new(),
        level: 7,
    };
    let source = DynamicMap::new().with("Nested", partial.clone());
    copy_with_options(&mut destination, &source, &options).expect("copy succeeds");
    assert_eq!(destination.nested, partial);
}

#[derive(Debug, Clone, Default, PartialEq, Record)]
struct Credentials {
    user:   String,
    #[copier(ignore)]
    secret: String,
}

#[derive(Debug, Clone, Default, PartialEq, Record)]
struct Session {
    credentials: Credentials,
}

#[test]
fn deep_copy_recurses_into_identical_records() {
    init_tracing();
    let source = Session {
        credentials: Credentials {
            user:   "new".to_string(),
            secret: "leaked".to_string(),
        },
    };
    let existing = || Session {
        credentials: Credentials {
            user:   "old".to_string(),
            secret: "kept".to_string(),
        },
    };

    let mut whole = existing();
    copy(&mut whole, &source).expect("copy succeeds");
    assert_eq!(whole.credentials.secret, "leaked");

    let mut deep = existing();
    copy_with_options(&mut deep, &source, &CopyOptions::new().deep_copy(true)).expect("copy succeeds");
    assert_eq!(deep.credentials.user, "new");
    assert_eq!(deep.credentials.secret, "kept");
}

#[test]
fn injected_shape_cache_is_used() {
    init_tracing();
    let cache = Arc::new(ShapeCache::new());
    let options = CopyOptions::new().with_shape_cache(Arc::clone(&cache));

    let mut destination = Credentials::default();
    let source = DynamicMap::new().with("user", "ada".to_string());
    copy_with_options(&mut destination, &source, &options).expect("copy succeeds");

    assert!(cache.contains(TypeKey::of::<Credentials>()));
    assert_eq!(cache.len(), 1);
}

// ============================================================================
// METHODS, TAGS AND OPTIONALS
// ============================================================================

#[derive(Debug, Clone, Default, Record)]
#[copier(methods)]
struct Person {
    first: String,
    last:  String,
}

#[struct_copier::methods]
impl Person {
    fn full_name(&self) -> String { format!("{} {}", self.first, self.last) }
}

fn ada() -> Person {
    Person {
        first: "Ada".to_string(),
        last:  "Lovelace".to_string(),
    }
}

#[test]
fn getters_are_read_as_source_members() {
    init_tracing();
    let mut typed: BTreeMap<String, String> = BTreeMap::new();
    copy(&mut typed, &ada()).expect("copy succeeds");
    assert_eq!(typed.get("full_name").map(String::as_str), Some("Ada Lovelace"));
    assert_eq!(typed.len(), 3);

    let mut dynamic = DynamicMap::new();
    copy(&mut dynamic, &ada()).expect("copy succeeds");
    assert_eq!(dynamic.get_as::<String>("first").map(String::as_str), Some("Ada"));
    assert_eq!(dynamic.get_as::<String>("full_name").map(String::as_str), Some("Ada Lovelace"));
}

#[derive(Debug, Clone, Default, Record)]
#[copier(methods)]
struct Alias {
    name: String,
}

#[struct_copier::methods]
impl Alias {
    #[copier(rename = "name")]
    fn shout(&self) -> String { self.name.to_uppercase() }
}

#[derive(Debug, Clone, Default, Record)]
#[copier(methods)]
struct Recorder {
    #[copier(ignore)]
    calls: u32,
    #[copier(ignore)]
    last:  String,
}

#[struct_copier::methods]
impl Recorder {
    fn name(&mut self, value: String) {
        self.calls += 1;
        self.last = value;
    }
}

#[test]
fn destination_member_is_written_at_most_once() {
    init_tracing();
    let mut destination = Recorder::default();
    copy(
        &mut destination,
        &Alias {
            name: "ada".to_string(),
        },
    )
    .expect("copy succeeds");

    assert_eq!(destination.calls, 1);
    assert_eq!(destination.last, "ada");
}

#[test]
fn mapping_entry_is_written_at_most_once() {
    init_tracing();
    let source = Alias {
        name: "ada".to_string(),
    };

    let mut typed: BTreeMap<String, String> = BTreeMap::new();
    copy(&mut typed, &source).expect("copy succeeds");
    assert_eq!(typed.get("name").map(String::as_str), Some("ada"));

    let mut dynamic = DynamicMap::new();
    copy(&mut dynamic, &source).expect("copy succeeds");
    assert_eq!(dynamic.get_as::<String>("name").map(String::as_str), Some("ada"));
}

#[derive(Debug, Clone, Default, Record)]
struct Labelled {
    #[copier(rename = "a,b")]
    value: String,
}

#[test]
fn renamed_member_may_contain_the_tag_separator() {
    init_tracing();
    let source = DynamicMap::new().with("a,b", "joined".to_string());

    let mut destination = Labelled::default();
    copy(&mut destination, &source).expect("the shape builds");

    assert_eq!(destination.value, "joined");
}

#[derive(Debug, Clone, Default, Record)]
struct Account {
    #[copier(must)]
    id:   i64,
    name: String,
}

#[test]
fn required_field_left_unpopulated_is_reported() {
    init_tracing();
    let mut destination = Account::default();
    let source = DynamicMap::new().with("name", "savings".to_string());
    let report = copy(&mut destination, &source).expect_err("id was never copied");

    let errors = report.current_context().members();
    assert_eq!(errors.len(), 1);
    assert!(matches!(&errors[0], Error::MissingRequired { path } if path == ".id"));
    assert_eq!(destination.name, "savings");

    let source = DynamicMap::new().with("id", 7_i64);
    copy(&mut destination, &source).expect("id is present");
    assert_eq!(destination.id, 7);
}

#[derive(Debug, Clone, Default, Record)]
struct Profile {
    nickname: Option<String>,
    age:      Option<i64>,
    email:    Option<String>,
}

#[test]
fn option_fields_accept_inner_values_and_skip_nulls() {
    init_tracing();
    let source = DynamicMap::from_json(&json!({ "nickname": "nick", "age": "42", "email": null }))
        .expect("object source");

    let mut destination = Profile {
        email: Some("old@example.com".to_string()),
        ..Profile::default()
    };
    copy_with_options(&mut destination, &source, &parsing_converters()).expect("copy succeeds");

    assert_eq!(destination.nickname.as_deref(), Some("nick"));
    assert_eq!(destination.age, Some(42));
    assert_eq!(destination.email.as_deref(), Some("old@example.com"));
}

// ============================================================================
// MAPPING DESTINATIONS AND SHAPE ERRORS
// ============================================================================

#[test]
fn typed_map_destination_drops_entries_that_failed() {
    init_tracing();
    let mut destination = BTreeMap::from([("keep".to_string(), 9_i64)]);
    let source = DynamicMap::new().with("a", 1_i64).with("b", "x".to_string());

    let report = copy(&mut destination, &source).expect_err("b does not fit");

    assert_eq!(destination, BTreeMap::from([("a".to_string(), 1), ("keep".to_string(), 9)]));
    assert_eq!(report.current_context().members()[0].path(), Some(".b"));
}

#[test]
fn typed_map_drops_nested_entries_that_failed() {
    init_tracing();
    let lead = Inner {
        role:  "lead".to_string(),
        level: 1,
    };
    let mut destination = BTreeMap::from([("kept".to_string(), lead.clone())]);
    let source = DynamicMap::from_json(&json!({
        "kept": { "Level": "bad" },
        "x": { "Level": "bad" }
    }))
    .expect("object source");

    let report = copy(&mut destination, &source).expect_err("Level does not fit an i64");

    assert!(!destination.contains_key("x"));
    assert_eq!(destination.get("kept"), Some(&lead));
    let paths: Vec<_> = report
        .current_context()
        .members()
        .iter()
        .filter_map(Error::path)
        .collect();
    assert_eq!(paths, [".kept.Level", ".x.Level"]);
}

#[test]
fn dynamic_map_entries_merge_structured_values() {
    init_tracing();
    let mut destination = DynamicMap::from_json(&json!({ "inner": { "x": 1 }, "label": "old" }))
        .expect("object destination");
    let source = DynamicMap::from_json(&json!({ "inner": { "y": 2 }, "label": "new" }))
        .expect("object source");

    copy(&mut destination, &source).expect("copy succeeds");

    let inner = destination.get_as::<DynamicMap>("inner").expect("inner stays a map");
    assert_eq!(inner.get_as::<i64>("x"), Some(&1));
    assert_eq!(inner.get_as::<i64>("y"), Some(&2));
    assert_eq!(destination.get_as::<String>("label").map(String::as_str), Some("new"));
}

#[test]
fn non_structured_destinations_are_rejected_up_front() {
    init_tracing();
    let source = DynamicMap::new().with("FieldString", "aaa".to_string());

    let report = copy(&mut 5_i64, &source).expect_err("a plain value has no members");
    assert!(report.current_context().is_fatal());

    let mut absent: Option<Inner> = None;
    let report = copy(&mut absent, &source).expect_err("an absent destination");
    assert!(report.current_context().is_fatal());
    assert!(absent.is_none());

    let report = copy(&mut TestStruct::default(), &DynamicList::new()).expect_err("kinds differ");
    assert!(report.current_context().is_fatal());
}
