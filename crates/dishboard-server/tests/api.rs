//! REST router tests driven through `tower::ServiceExt::oneshot`.

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use dishboard_core::{DishService, DishStore, MemoryDishStore};
use dishboard_protocol::{DishEvent, ListResponse};
use dishboard_config::{BroadcastConfig, ConfigError, DishboardConfig};
use dishboard_server::{AppState, EventBus, ServerError, build_state, router};
use dishboard_test_utils::FlakyStore;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

fn app_with_store(store: Arc<dyn DishStore>) -> (Router, EventBus) {
    let events = EventBus::new(64);
    let service = DishService::new(store, Arc::new(events.clone()));
    (router(AppState::new(service, events.clone())), events)
}

fn app() -> (Router, EventBus) {
    app_with_store(Arc::new(MemoryDishStore::new()))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn dish_body(id: &str, name: &str) -> Value {
    json!({"dishId": id, "dishName": name, "imageUrl": format!("https://img.example/{id}.jpg")})
}

#[tokio::test]
async fn create_then_list_sorted_by_name() {
    let (app, _events) = app();
    for (id, name) in [("dish-002", "ramen"), ("dish-001", "Paella"), ("dish-010", "Tiramisu")] {
        let (status, body) = send(&app, Method::POST, "/api/dishes", Some(dish_body(id, name))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Dish created successfully");
        assert_eq!(body["data"]["isPublished"], false);
    }

    let (status, body) = send(&app, Method::GET, "/api/dishes", None).await;
    assert_eq!(status, StatusCode::OK);
    let list: ListResponse = serde_json::from_value(body).expect("list envelope");
    assert!(list.success);
    assert_eq!(list.count, 3);
    let names: Vec<&str> = list.data.iter().map(|dish| dish.dish_name.as_str()).collect();
    assert_eq!(names, vec!["Paella", "ramen", "Tiramisu"]);
}

#[tokio::test]
async fn create_validation_failures_are_bad_requests() {
    let (app, _events) = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/dishes",
        Some(json!({"dishId": "dish-001", "dishName": "Paella"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"success": false, "message": "Please provide dishId, dishName, and imageUrl"})
    );

    send(&app, Method::POST, "/api/dishes", Some(dish_body("dish-001", "Paella"))).await;
    let (status, body) = send(&app, Method::POST, "/api/dishes", Some(dish_body("dish-001", "Other"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Dish with ID dish-001 already exists");
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let (app, _events) = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/dishes")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let body: Value = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn update_toggle_and_delete_flow() {
    let (app, _events) = app();
    send(&app, Method::POST, "/api/dishes", Some(dish_body("dish-010", "Tiramisu"))).await;

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/dishes/dish-010",
        Some(json!({"dishName": "Classic Tiramisu", "dishId": "ignored"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Dish updated successfully");
    assert_eq!(body["data"]["dishId"], "dish-010");
    assert_eq!(body["data"]["dishName"], "Classic Tiramisu");

    let (status, body) = send(&app, Method::PUT, "/api/dishes/dish-010/toggle", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Dish published successfully");
    assert_eq!(body["data"]["isPublished"], true);

    let (_, body) = send(&app, Method::PUT, "/api/dishes/dish-010/toggle", None).await;
    assert_eq!(body["message"], "Dish unpublished successfully");
    assert_eq!(body["data"]["isPublished"], false);

    let (status, body) = send(&app, Method::DELETE, "/api/dishes/dish-010", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"success": true, "message": "Dish deleted successfully", "data": {}})
    );
}

#[tokio::test]
async fn unknown_dish_is_not_found_without_broadcast() {
    let (app, events) = app();
    let mut receiver = events.subscribe();

    for (method, uri) in [
        (Method::DELETE, "/api/dishes/dish-404"),
        (Method::PUT, "/api/dishes/dish-404/toggle"),
    ] {
        let (status, body) = send(&app, method, uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body,
            json!({"success": false, "message": "Dish with ID dish-404 not found"})
        );
    }
    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/dishes/dish-404",
        Some(json!({"isPublished": true})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(receiver.try_recv().is_err());
}

#[tokio::test]
async fn update_without_body_checks_the_dish_first() {
    let (app, events) = app();
    let mut receiver = events.subscribe();
    let (status, body) = send(&app, Method::PUT, "/api/dishes/dish-404", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({"success": false, "message": "Dish with ID dish-404 not found"})
    );
    assert!(receiver.try_recv().is_err());

    send(&app, Method::POST, "/api/dishes", Some(dish_body("dish-001", "Paella"))).await;
    let created = receiver.try_recv().expect("created event");
    assert_eq!(created.name(), "dish-created");

    let (status, body) = send(&app, Method::PUT, "/api/dishes/dish-001", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Dish updated successfully");
    assert_eq!(body["data"]["dishName"], "Paella");
    assert_eq!(receiver.try_recv().expect("updated event").name(), "dish-updated");
}

#[tokio::test]
async fn zero_broadcast_capacity_is_a_config_error() {
    let config = DishboardConfig::builder()
        .broadcast(BroadcastConfig { capacity: 0 })
        .build();
    let err = build_state(&config).err().expect("config error");
    assert!(matches!(
        err,
        ServerError::Config(ConfigError::InvalidField { ref path, .. }) if path == "broadcast.capacity"
    ));
}

#[tokio::test]
async fn mutations_reach_subscribers() {
    let (app, events) = app();
    let mut receiver = events.subscribe();
    send(&app, Method::POST, "/api/dishes", Some(dish_body("dish-001", "Paella"))).await;
    send(&app, Method::PUT, "/api/dishes/dish-001/toggle", None).await;

    let created = receiver.try_recv().expect("created event");
    assert_eq!(created.name(), "dish-created");
    match receiver.try_recv().expect("toggle event") {
        DishEvent::PublishStatusUpdated {
            dish_id,
            is_published,
            ..
        } => {
            assert_eq!(dish_id, "dish-001");
            assert!(is_published);
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn store_failure_is_internal_error() {
    let store = Arc::new(FlakyStore::new());
    let (app, events) = app_with_store(store.clone());
    send(&app, Method::POST, "/api/dishes", Some(dish_body("dish-001", "Paella"))).await;
    let mut receiver = events.subscribe();

    store.fail_writes(true);
    let (status, body) = send(&app, Method::PUT, "/api/dishes/dish-001/toggle", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "store unavailable: write rejected");
    assert!(receiver.try_recv().is_err());
}

#[tokio::test]
async fn health_and_unmatched_routes() {
    let (app, _events) = app();
    let (status, body) = send(&app, Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Server is running");
    assert!(body["timestamp"].is_string());

    for (method, uri) in [(Method::GET, "/api/nothing"), (Method::PATCH, "/api/dishes")] {
        let (status, body) = send(&app, method, uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"success": false, "message": "Route not found"}));
    }
}
