use tether_client::{CallError, CallEvent, ExitReason, MemoryStore};

use crate::integration::{create_party_with, init_tracing};
use crate::utils::{FakeMediaDevices, wait_for_event};

#[tokio::test]
async fn test_media_denied_leaves_no_room() {
    init_tracing();

    let store = MemoryStore::new();
    let mut caller = create_party_with(&store, FakeMediaDevices::denying());

    let err = caller.controller.start().await.unwrap_err();

    assert!(matches!(err, CallError::MediaDenied(_)));
    assert_eq!(caller.devices.calls(), 1);
    assert!(store.document_ids("rooms").is_empty());
    assert!(caller.transports.created().await.is_empty());
    assert!(caller.controller.room_id().is_none());

    let exit = wait_for_event(&mut caller.events, |e| matches!(e, CallEvent::Exit(_))).await;
    assert!(matches!(exit, Some(CallEvent::Exit(ExitReason::Failed(_)))));
}

#[tokio::test]
async fn test_store_outage_ends_attempt() {
    init_tracing();

    let store = MemoryStore::new();
    store.set_offline(true);
    let mut caller = create_party_with(&store, FakeMediaDevices::new());

    let err = caller.controller.start().await.unwrap_err();

    assert!(matches!(err, CallError::Store(_)));
    let streams = caller.devices.streams().await;
    assert!(streams[0].all_stopped(), "Captured media must be released");

    let exit = wait_for_event(&mut caller.events, |e| matches!(e, CallEvent::Exit(_))).await;
    assert!(matches!(exit, Some(CallEvent::Exit(ExitReason::Failed(_)))));
}
