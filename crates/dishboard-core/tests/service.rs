//! Mutation service integration tests.

use dishboard_core::seed::seed_if_empty;
use dishboard_core::{DishService, DishboardCoreError, ErrorKind, MemoryDishStore};
use dishboard_protocol::{CreateDish, DishEvent, DishPatch};
use dishboard_test_utils::{FlakyStore, RecordingSink, create_body};
use pretty_assertions::assert_eq;
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;

fn service() -> (DishService, RecordingSink) {
    let sink = RecordingSink::new();
    let service = DishService::new(Arc::new(MemoryDishStore::new()), Arc::new(sink.clone()));
    (service, sink)
}

/// Creates publish one event each and list returns name order.
#[test]
fn create_publishes_and_list_sorts_by_name() {
    let (service, sink) = service();
    service.create(create_body("dish-001", "Paella")).expect("create");
    service.create(create_body("dish-002", "Gazpacho")).expect("create");
    let created = service
        .create(create_body("dish-010", "Tiramisu"))
        .expect("create");

    assert!(!created.is_published);
    let names: Vec<String> = service
        .list()
        .expect("list")
        .into_iter()
        .map(|dish| dish.dish_name)
        .collect();
    assert_eq!(names, vec!["Gazpacho", "Paella", "Tiramisu"]);
    assert_eq!(
        sink.names(),
        vec!["dish-created", "dish-created", "dish-created"]
    );
    assert_eq!(
        sink.events().last(),
        Some(&DishEvent::DishCreated { dish: created })
    );
}

/// A duplicate id fails with no side effect and no event.
#[test]
fn duplicate_create_is_rejected_without_side_effects() {
    let (service, sink) = service();
    let original = service.create(create_body("dish-001", "Paella")).expect("create");
    sink.clear();

    let err = service
        .create(create_body("dish-001", "Imposter"))
        .expect_err("duplicate");
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.to_string(), "Dish with ID dish-001 already exists");
    assert_eq!(service.list().expect("list"), vec![original]);
    assert!(sink.events().is_empty());
}

/// Missing or blank required fields are validation failures.
#[test]
fn create_requires_all_fields() {
    let (service, sink) = service();
    for body in [
        CreateDish {
            dish_id: Some("dish-001".to_string()),
            dish_name: Some("Paella".to_string()),
            ..CreateDish::default()
        },
        CreateDish::new("dish-001", "  ", "https://img/x.jpg"),
    ] {
        let err = service.create(body).expect_err("invalid");
        assert_eq!(
            err.to_string(),
            "Please provide dishId, dishName, and imageUrl"
        );
    }
    assert!(sink.events().is_empty());
}

/// Explicit publish flag on create is honoured.
#[test]
fn create_honours_publish_flag() {
    let (service, _sink) = service();
    let dish = service
        .create(create_body("dish-001", "Paella").published(true))
        .expect("create");
    assert!(dish.is_published);
}

/// Update applies only supplied fields.
#[test]
fn update_applies_partial_patch() {
    let (service, sink) = service();
    let created = service.create(create_body("dish-001", "Paella")).expect("create");
    sink.clear();

    let updated = service
        .update(
            "dish-001",
            DishPatch {
                dish_name: Some("Seafood Paella".to_string()),
                ..DishPatch::default()
            },
        )
        .expect("update");
    assert_eq!(updated.dish_name, "Seafood Paella");
    assert_eq!(updated.image_url, created.image_url);
    assert_eq!(updated.is_published, created.is_published);
    assert_eq!(
        sink.events(),
        vec![DishEvent::DishUpdated {
            dish_id: "dish-001".to_string(),
            dish: updated,
        }]
    );
}

/// Blank replacement values are rejected before touching the store.
#[test]
fn update_rejects_blank_fields() {
    let (service, sink) = service();
    service.create(create_body("dish-001", "Paella")).expect("create");
    sink.clear();
    let err = service
        .update(
            "dish-001",
            DishPatch {
                image_url: Some(String::new()),
                ..DishPatch::default()
            },
        )
        .expect_err("blank url");
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(sink.events().is_empty());
}

/// Toggling twice returns the flag to its original value.
#[test]
fn toggle_is_an_involution() {
    let (service, sink) = service();
    service.create(create_body("dish-010", "Tiramisu")).expect("create");
    sink.clear();

    let first = service.toggle("dish-010").expect("toggle");
    assert!(first.is_published);
    let second = service.toggle("dish-010").expect("toggle");
    assert!(!second.is_published);

    let flags: Vec<bool> = sink
        .events()
        .into_iter()
        .map(|event| match event {
            DishEvent::PublishStatusUpdated { is_published, .. } => is_published,
            other => panic!("unexpected event: {other:?}"),
        })
        .collect();
    assert_eq!(flags, vec![true, false]);
}

/// Unknown ids fail with not-found and publish nothing.
#[test]
fn unknown_dish_operations_are_not_found() {
    let (service, sink) = service();
    let results = [
        service.delete("dish-404").map(|_| ()),
        service.toggle("dish-404").map(|_| ()),
        service
            .update("dish-404", DishPatch::publish_status(true))
            .map(|_| ()),
    ];
    for result in results {
        let err = result.expect_err("not found");
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "Dish with ID dish-404 not found");
    }
    assert!(sink.events().is_empty());
}

/// Delete removes the record and publishes its id.
#[test]
fn delete_publishes_dish_id() {
    let (service, sink) = service();
    service.create(create_body("dish-001", "Paella")).expect("create");
    sink.clear();
    service.delete("dish-001").expect("delete");
    assert!(service.list().expect("list").is_empty());
    assert_eq!(
        sink.events(),
        vec![DishEvent::DishDeleted {
            dish_id: "dish-001".to_string()
        }]
    );
}

/// A failed store write surfaces as a store error with no event.
#[test]
fn store_failure_publishes_nothing() {
    let store = Arc::new(FlakyStore::new());
    let sink = RecordingSink::new();
    let service = DishService::new(store.clone(), Arc::new(sink.clone()));
    service.create(create_body("dish-001", "Paella")).expect("create");
    sink.clear();

    store.fail_writes(true);
    let err = service.toggle("dish-001").expect_err("store failure");
    assert!(matches!(err, DishboardCoreError::Store(_)));
    assert_eq!(err.kind(), ErrorKind::Store);
    assert!(service.create(create_body("dish-002", "Soup")).is_err());
    assert!(service.delete("dish-001").is_err());
    assert!(sink.events().is_empty());

    store.fail_writes(false);
    assert!(!service.list().expect("list")[0].is_published);
}

/// Seeding fills an empty store once and never publishes.
#[test]
fn seed_fills_empty_store_without_events() {
    let temp = tempdir().expect("tempdir");
    let seed_path = temp.path().join("seed.json");
    fs::write(
        &seed_path,
        r#"[
            {"dishId": "dish-001", "dishName": "Paella", "imageUrl": "https://img/1.jpg"},
            {"dishId": "dish-002", "dishName": "Ramen", "imageUrl": "https://img/2.jpg", "isPublished": true}
        ]"#,
    )
    .expect("write seed");

    let (service, sink) = service();
    assert_eq!(seed_if_empty(&service, &seed_path).expect("seed"), 2);
    assert_eq!(seed_if_empty(&service, &seed_path).expect("seed again"), 0);
    assert_eq!(service.list().expect("list").len(), 2);
    assert!(sink.events().is_empty());
}

/// An invalid entry anywhere in the seed file aborts before any insert.
#[test]
fn seed_with_invalid_entry_inserts_nothing() {
    let temp = tempdir().expect("tempdir");
    let seed_path = temp.path().join("seed.json");
    fs::write(
        &seed_path,
        r#"[
            {"dishId": "dish-001", "dishName": "Paella", "imageUrl": "https://img/1.jpg"},
            {"dishId": "dish-002", "dishName": "Ramen"}
        ]"#,
    )
    .expect("write seed");

    let (service, sink) = service();
    let err = seed_if_empty(&service, &seed_path).expect_err("invalid seed");
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(service.list().expect("list").is_empty());
    assert!(sink.events().is_empty());
}
