use tether_client::{CallEvent, ExitReason, MemoryStore};

use crate::integration::{create_party, init_tracing};
use crate::utils::{settle, wait_for_event};

#[tokio::test]
async fn test_double_hang_up_writes_ended_once() {
    init_tracing();

    let store = MemoryStore::new();
    let mut caller = create_party(&store);
    let room_id = caller.controller.start().await.expect("Failed to start call");

    caller.controller.hang_up().await;
    caller.controller.hang_up().await;

    let status_writes = store
        .writes_to("rooms", room_id.as_str())
        .iter()
        .filter(|w| w.contains_key("status"))
        .count();
    assert_eq!(status_writes, 1);

    let streams = caller.devices.streams().await;
    assert_eq!(streams.len(), 1);
    assert!(streams[0].all_stopped());
    assert!(caller.transports.only().await.is_closed());

    let exit = wait_for_event(&mut caller.events, |e| matches!(e, CallEvent::Exit(_))).await;
    assert_eq!(exit, Some(CallEvent::Exit(ExitReason::HungUp)));

    settle().await;
    assert!(caller.events.try_recv().is_err(), "Expected a single exit");
}

#[tokio::test]
async fn test_hang_up_before_start_is_harmless() {
    init_tracing();

    let store = MemoryStore::new();
    let mut caller = create_party(&store);

    caller.controller.hang_up().await;

    assert!(store.document_ids("rooms").is_empty());
    assert!(caller.events.try_recv().is_err());
}
