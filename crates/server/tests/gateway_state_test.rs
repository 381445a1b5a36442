use parley_server::ws::events::ServerEvent;
use parley_server::ws::gateway::GatewayState;
use tokio::sync::mpsc;

fn make_tx() -> (mpsc::UnboundedSender<String>, mpsc::UnboundedReceiver<String>) {
    mpsc::unbounded_channel()
}

#[tokio::test]
async fn client_ids_are_unique() {
    let gw = GatewayState::new();
    let a = gw.next_client_id().await;
    let b = gw.next_client_id().await;
    assert_ne!(a, b);
}

#[tokio::test]
async fn broadcast_all_reaches_every_client() {
    let gw = GatewayState::new();
    let (tx1, mut rx1) = make_tx();
    let (tx2, mut rx2) = make_tx();

    let cid1 = gw.next_client_id().await;
    let cid2 = gw.next_client_id().await;
    gw.register(cid1, tx1).await;
    gw.register(cid2, tx2).await;

    let event = ServerEvent::UserCount { count: 2 };
    gw.broadcast_all(&event, None).await;

    assert!(rx1.try_recv().is_ok());
    assert!(rx2.try_recv().is_ok());
}

#[tokio::test]
async fn broadcast_all_honors_exclude() {
    let gw = GatewayState::new();
    let (tx1, mut rx1) = make_tx();
    let (tx2, mut rx2) = make_tx();

    let cid1 = gw.next_client_id().await;
    let cid2 = gw.next_client_id().await;
    gw.register(cid1, tx1).await;
    gw.register(cid2, tx2).await;

    let event = ServerEvent::UserTyping {
        name: "alice".into(),
        typing: true,
    };
    gw.broadcast_all(&event, Some(cid1)).await;

    assert!(rx1.try_recv().is_err());
    assert!(rx2.try_recv().is_ok());
}

#[tokio::test]
async fn send_to_targets_one_client() {
    let gw = GatewayState::new();
    let (tx1, mut rx1) = make_tx();
    let (tx2, mut rx2) = make_tx();

    let cid1 = gw.next_client_id().await;
    let cid2 = gw.next_client_id().await;
    gw.register(cid1, tx1).await;
    gw.register(cid2, tx2).await;

    let event = ServerEvent::Error {
        message: "hello".into(),
    };
    gw.send_to(cid2, &event).await;

    assert!(rx1.try_recv().is_err());
    assert!(rx2.try_recv().is_ok());
}

#[tokio::test]
async fn events_serialize_with_snake_case_tags() {
    let gw = GatewayState::new();
    let (tx, mut rx) = make_tx();
    let cid = gw.next_client_id().await;
    gw.register(cid, tx).await;

    gw.send_to(
        cid,
        &ServerEvent::UserJoined {
            name: "alice".into(),
            timestamp: "2024-01-01T00:00:00.000Z".into(),
        },
    )
    .await;

    let raw = rx.try_recv().unwrap();
    let v: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(v["type"], "user_joined");
    assert_eq!(v["name"], "alice");
}

#[tokio::test]
async fn unregistered_client_receives_nothing() {
    let gw = GatewayState::new();
    let (tx, mut rx) = make_tx();
    let cid = gw.next_client_id().await;
    gw.register(cid, tx).await;
    assert_eq!(gw.client_count().await, 1);

    gw.unregister(cid).await;
    assert_eq!(gw.client_count().await, 0);

    gw.broadcast_all(&ServerEvent::UserCount { count: 0 }, None).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn broadcast_ignores_closed_receivers() {
    let gw = GatewayState::new();
    let (tx1, rx1) = make_tx();
    let (tx2, mut rx2) = make_tx();

    let cid1 = gw.next_client_id().await;
    let cid2 = gw.next_client_id().await;
    gw.register(cid1, tx1).await;
    gw.register(cid2, tx2).await;

    // A client whose receive side is gone is just skipped, not an error
    drop(rx1);
    gw.broadcast_all(&ServerEvent::UserCount { count: 2 }, None).await;

    assert!(rx2.try_recv().is_ok());
}
