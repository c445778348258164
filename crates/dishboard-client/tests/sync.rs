//! Client sync layer against a live server.

use dishboard_client::{
    ConnectionState, Dashboard, DishClient, NoticeLevel, ReconnectPolicy, Subscriber, SyncPhase,
};
use dishboard_core::{DishService, MemoryDishStore};
use dishboard_protocol::{DishEvent, DishPatch};
use dishboard_server::{AppState, DishServer, EventBus};
use dishboard_test_utils::create_body;
use pretty_assertions::assert_eq;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::timeout;

struct Running {
    address: SocketAddr,
    stop: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

async fn start_server() -> Running {
    let events = EventBus::new(64);
    let service = DishService::new(Arc::new(MemoryDishStore::new()), Arc::new(events.clone()));
    let server = DishServer::bind_with_state("127.0.0.1:0", AppState::new(service, events))
        .await
        .expect("bind");
    let address = server.local_addr().expect("addr");
    let (stop, stopped) = oneshot::channel::<()>();
    let handle = tokio::spawn(async move {
        server
            .serve(async {
                let _ = stopped.await;
            })
            .await
            .expect("serve");
    });
    Running {
        address,
        stop,
        handle,
    }
}

fn client_for(address: SocketAddr) -> DishClient {
    DishClient::new(format!("http://{address}"))
}

async fn wait_for_state(
    state: &mut watch::Receiver<ConnectionState>,
    wanted: ConnectionState,
) {
    timeout(Duration::from_secs(5), state.wait_for(|current| *current == wanted))
        .await
        .expect("state within timeout")
        .expect("subscriber alive");
}

async fn next_event(events: &mut mpsc::Receiver<DishEvent>) -> DishEvent {
    timeout(Duration::from_secs(5), events.recv())
        .await
        .expect("event within timeout")
        .expect("subscriber alive")
}

fn names(dashboard: &Dashboard) -> Vec<String> {
    dashboard
        .dishes()
        .iter()
        .map(|dish| dish.dish_name.clone())
        .collect()
}

#[tokio::test]
async fn remote_mutations_flow_into_local_collection() {
    let server = start_server().await;
    let writer = client_for(server.address);
    writer
        .create(&create_body("dish-002", "Ramen"))
        .await
        .expect("seed dish");

    let mut dashboard = Dashboard::new(client_for(server.address), 5);
    assert_eq!(dashboard.mount().await, &SyncPhase::Ready);
    assert_eq!(names(&dashboard), vec!["Ramen"]);

    let (sender, mut events) = mpsc::channel(16);
    let subscriber = Subscriber::spawn(
        dashboard.client().websocket_url().expect("ws url"),
        ReconnectPolicy::never(),
        sender,
    );
    let mut state = subscriber.watch_state();
    wait_for_state(&mut state, ConnectionState::Connected).await;

    writer
        .create(&create_body("dish-010", "Tiramisu"))
        .await
        .expect("create");
    writer
        .create(&create_body("dish-001", "Paella"))
        .await
        .expect("create");
    writer.toggle("dish-010").await.expect("toggle");
    writer
        .update(
            "dish-002",
            &DishPatch {
                dish_name: Some("Udon".to_string()),
                ..DishPatch::default()
            },
        )
        .await
        .expect("update");
    writer.delete("dish-001").await.expect("delete");

    for _ in 0..5 {
        let event = next_event(&mut events).await;
        assert!(dashboard.handle_event(&event));
    }

    assert_eq!(names(&dashboard), vec!["Tiramisu", "Udon"]);
    let tiramisu = dashboard
        .dishes()
        .iter()
        .find(|dish| dish.dish_id == "dish-010")
        .expect("tiramisu");
    assert!(tiramisu.is_published);

    subscriber.stop();
    let _ = server.stop.send(());
    server.handle.await.expect("server task");
}

#[tokio::test]
async fn local_toggle_is_optimistic_and_echo_is_a_no_op() {
    let server = start_server().await;
    let mut dashboard = Dashboard::new(client_for(server.address), 5);
    dashboard
        .create(&create_body("dish-010", "Tiramisu"))
        .await
        .expect("create");
    assert_eq!(dashboard.phase(), &SyncPhase::Ready);
    assert_eq!(names(&dashboard), vec!["Tiramisu"]);

    let (sender, mut events) = mpsc::channel(16);
    let subscriber = Subscriber::spawn(
        dashboard.client().websocket_url().expect("ws url"),
        ReconnectPolicy::never(),
        sender,
    );
    wait_for_state(&mut subscriber.watch_state(), ConnectionState::Connected).await;

    let toggled = dashboard.toggle("dish-010").await.expect("toggle");
    assert!(toggled.is_published);
    assert!(dashboard.dishes()[0].is_published);

    let echo = next_event(&mut events).await;
    assert!(matches!(echo, DishEvent::PublishStatusUpdated { .. }));
    assert!(!dashboard.handle_event(&echo));

    let notices = dashboard.notices().drain();
    let texts: Vec<&str> = notices.iter().map(|n| n.text.as_str()).collect();
    assert_eq!(
        texts,
        vec!["Dish created successfully", "Dish published successfully"]
    );

    subscriber.stop();
    let _ = server.stop.send(());
    server.handle.await.expect("server task");
}

#[tokio::test]
async fn failed_mutation_leaves_state_and_queues_error_notice() {
    let server = start_server().await;
    let mut dashboard = Dashboard::new(client_for(server.address), 5);
    dashboard.mount().await;
    dashboard
        .create(&create_body("dish-001", "Paella"))
        .await
        .expect("create");
    let before = dashboard.dishes().to_vec();
    dashboard.notices().drain();

    let err = dashboard.delete("dish-404").await.expect_err("not found");
    assert_eq!(err.notice_text(), "Dish with ID dish-404 not found");
    assert!(dashboard.toggle("dish-404").await.is_err());
    assert_eq!(dashboard.dishes(), before.as_slice());

    let notices = dashboard.notices().drain();
    assert_eq!(notices.len(), 2);
    assert!(notices.iter().all(|n| n.level == NoticeLevel::Error));

    let _ = server.stop.send(());
    server.handle.await.expect("server task");
}

#[tokio::test]
async fn events_are_dropped_until_ready() {
    let mut dashboard = Dashboard::new(DishClient::new("http://127.0.0.1:9"), 5);
    let event = DishEvent::DishDeleted {
        dish_id: "dish-001".to_string(),
    };
    assert!(!dashboard.handle_event(&event));
}

#[tokio::test]
async fn failed_mount_enters_error_state_and_retry_recovers() {
    // Reserve a port, then release it so the first mount is refused.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("reserve port");
    let address = listener.local_addr().expect("addr");
    drop(listener);

    let mut dashboard = Dashboard::new(client_for(address), 5);
    assert!(matches!(dashboard.mount().await, SyncPhase::Failed { .. }));
    assert!(matches!(dashboard.retry().await, SyncPhase::Failed { .. }));

    let events = EventBus::new(8);
    let service = DishService::new(Arc::new(MemoryDishStore::new()), Arc::new(events.clone()));
    let server = DishServer::bind_with_state(&address.to_string(), AppState::new(service, events))
        .await
        .expect("rebind");
    let (stop, stopped) = oneshot::channel::<()>();
    let handle = tokio::spawn(async move {
        server
            .serve(async {
                let _ = stopped.await;
            })
            .await
            .expect("serve");
    });

    assert_eq!(dashboard.retry().await, &SyncPhase::Ready);
    assert!(dashboard.dishes().is_empty());

    let _ = stop.send(());
    handle.await.expect("server task");
}

#[tokio::test]
async fn subscriber_gives_up_after_retry_budget() {
    let server = start_server().await;
    let (sender, _events) = mpsc::channel(16);
    let subscriber = Subscriber::spawn(
        format!("ws://{}/ws", server.address),
        ReconnectPolicy::new(2, Duration::from_millis(20)),
        sender,
    );
    let mut state = subscriber.watch_state();
    wait_for_state(&mut state, ConnectionState::Connected).await;

    let _ = server.stop.send(());
    server.handle.await.expect("server task");

    wait_for_state(&mut state, ConnectionState::Disconnected).await;
    assert_eq!(subscriber.state(), ConnectionState::Disconnected);
}
