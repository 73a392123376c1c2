use tether_client::{CallError, MemoryStore};
use tether_core::RoomId;

use crate::integration::{create_party, init_tracing};

#[tokio::test]
async fn test_controller_is_single_use() {
    init_tracing();

    let store = MemoryStore::new();
    let caller = create_party(&store);
    let room_id = caller.controller.start().await.expect("Failed to start call");

    let err = caller.controller.start().await.unwrap_err();
    assert!(matches!(err, CallError::InvalidState(_)));

    let err = caller.controller.join(&room_id).await.unwrap_err();
    assert!(matches!(err, CallError::InvalidState(_)));

    caller.controller.hang_up().await;
    let err = caller
        .controller
        .join(&RoomId::from("other"))
        .await
        .unwrap_err();
    assert!(matches!(err, CallError::InvalidState(_)));
    assert_eq!(store.document_ids("rooms").len(), 1);
}
