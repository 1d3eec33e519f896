use crate::common::*;
use emotebank::*;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

#[tokio::test]
async fn create_uploads_inserts_and_notifies() {
    let mut h = harness(2, &[1]);
    let emote = h.service.create_emote("blobcat", 7, STATIC_IMG).await.unwrap();

    assert_eq!(emote.name, "blobcat");
    assert_eq!(emote.owner, 7);
    assert_eq!(emote.shard_id, 1);
    assert!(!emote.animated);
    assert!(emote.id >= 100_000_000_000_000_000);
    assert_eq!(h.platform.uploads(), 1);

    let found = h.service.find("BLOBCAT").await.unwrap();
    assert_eq!(found.id, emote.id);

    let events = drain(&mut h.audit);
    assert!(matches!(&events[..], [AuditEvent::Created { emote: e, .. }] if e.id == emote.id));
}

#[tokio::test]
async fn gif_is_created_as_animated() {
    let h = harness(2, &[1]);
    let emote = h.service.create_emote("party", 7, ANIMATED_IMG).await.unwrap();
    assert!(emote.animated);
    assert_eq!(emote.render(), format!("<a:party:{}>", emote.id));
}

#[tokio::test]
async fn duplicate_names_are_rejected_before_upload() {
    let h = harness(5, &[1]);
    h.service.create_emote("blobcat", 1, STATIC_IMG).await.unwrap();
    let err = h.service.create_emote("BlobCat", 2, STATIC_IMG).await.unwrap_err();
    assert!(matches!(err, EmoteError::AlreadyExists { .. }));
    assert_eq!(h.platform.uploads(), 1);
}

#[tokio::test]
async fn invalid_input_never_reaches_the_platform() {
    let h = harness(5, &[1]);
    assert!(matches!(
        h.service.create_emote("x", 1, STATIC_IMG).await,
        Err(EmoteError::InvalidName { .. })
    ));
    assert!(matches!(
        h.service.create_emote("has space", 1, STATIC_IMG).await,
        Err(EmoteError::InvalidName { .. })
    ));
    assert!(matches!(
        h.service.create_emote("textfile", 1, b"just some text").await,
        Err(EmoteError::InvalidContent(_))
    ));
    assert_eq!(h.platform.uploads(), 0);
}

#[tokio::test]
async fn sequential_fill_ends_in_capacity_exhausted() {
    let h = harness(2, &[1, 2]);
    for i in 0..4 {
        h.service.create_emote(&format!("static_{}", i), 1, STATIC_IMG).await.unwrap();
    }

    let err = h.service.create_emote("one_too_many", 1, STATIC_IMG).await.unwrap_err();
    assert!(matches!(err, EmoteError::CapacityExhausted { animated: false }));
    assert!(!err.is_internal());

    // animated slots are counted separately
    h.service.create_emote("still_fits", 1, ANIMATED_IMG).await.unwrap();

    for (shard, count) in h.store.shard_usage(false).unwrap() {
        assert_eq!(count, 2, "shard {} should be exactly full", shard);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creations_never_overfill_a_shard() {
    let h = harness(3, &[1, 2]);

    let tasks: Vec<_> = (0..12)
        .map(|i| {
            let service = h.service.clone();
            tokio::spawn(async move { service.create_emote(&format!("race_{}", i), 1, STATIC_IMG).await })
        })
        .collect();

    let mut created = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => created += 1,
            Err(EmoteError::CapacityExhausted { .. }) | Err(EmoteError::ShardFull { .. }) => {}
            Err(other) => panic!("unexpected error: {}", other),
        }
    }

    assert!(created <= 6);
    for (shard, count) in h.store.shard_usage(false).unwrap() {
        assert!(count <= 3, "shard {} holds {} static emotes", shard, count);
    }
    // every upload that lost the race was rolled back
    assert_eq!(h.platform.live_count(), created);

    // whatever room is left can still be filled sequentially
    let mut extra = 0;
    while h.service.create_emote(&format!("late_{}", extra), 1, STATIC_IMG).await.is_ok() {
        extra += 1;
    }
    assert_eq!(created + extra, 6);
}

/// Service over a registry whose inserts misbehave.
fn faulty_service(
    config: &Config,
    fault: InsertFault,
) -> (Arc<EmoteStore>, Arc<FakePlatform>, EmoteService, UnboundedReceiver<AuditEvent>) {
    let store = Arc::new(EmoteStore::open_in_memory(5).unwrap());
    store.register_shard(1).unwrap();
    let platform = Arc::new(FakePlatform::default());
    let (audit_log, audit) = ChannelAuditLog::new();
    let service = EmoteService::new(
        config,
        Arc::new(FaultyInserts(store.clone(), fault)),
        platform.clone(),
        Arc::new(audit_log),
    );
    (store, platform, service, audit)
}

#[tokio::test]
async fn failed_insert_rolls_back_the_upload() {
    let (_, platform, service, mut audit) = faulty_service(&Config::default(), InsertFault::Error);

    let err = service.create_emote("blobcat", 1, STATIC_IMG).await.unwrap_err();
    assert!(err.is_internal());
    assert_eq!(err.user_message(), "an internal error occurred, please try again later");

    let calls = platform.calls();
    assert_eq!(calls.len(), 2);
    let Call::Upload { id, .. } = &calls[0] else { panic!("expected upload first, got {:?}", calls) };
    assert_eq!(calls[1], Call::DeleteEmote { shard_id: 1, id: *id });
    assert_eq!(platform.live_count(), 0);
    assert!(drain(&mut audit).is_empty());
}

#[tokio::test]
async fn stalled_insert_times_out_and_rolls_back_the_upload() {
    let mut config = Config::default();
    config.timeouts.registry_secs = 1;
    let (store, platform, service, mut audit) = faulty_service(&config, InsertFault::Stall(Duration::from_secs(5)));

    let err = service.create_emote("blobcat", 1, STATIC_IMG).await.unwrap_err();
    match &err {
        EmoteError::ExternalTimeout { operation, after } => {
            assert_eq!(operation, "insert");
            assert_eq!(*after, Duration::from_secs(1));
        }
        other => panic!("expected a timeout, got {}", other),
    }
    assert_eq!(err.user_message(), "that took too long, please try again later");

    let calls = platform.calls();
    let Call::Upload { id, .. } = &calls[0] else { panic!("expected upload first, got {:?}", calls) };
    assert_eq!(calls[1..], [Call::DeleteEmote { shard_id: 1, id: *id }]);
    assert_eq!(platform.live_count(), 0);
    assert!(matches!(store.find_by_name("blobcat").await, Err(EmoteError::NotFound { .. })));
    assert!(drain(&mut audit).is_empty());
}

#[tokio::test]
async fn slow_upload_times_out_without_touching_the_registry() {
    let mut config = Config::default();
    config.timeouts.platform_secs = 1;
    let mut h = harness_with(config, &[1]);
    h.platform.upload_delay_ms.store(3_000, Ordering::SeqCst);

    let err = h.service.create_emote("blobcat", 1, STATIC_IMG).await.unwrap_err();
    assert!(matches!(&err, EmoteError::ExternalTimeout { operation, .. } if operation == "upload_emote"));
    assert!(!err.is_internal());
    assert!(h.platform.calls().is_empty());
    assert!(matches!(h.service.find("blobcat").await, Err(EmoteError::NotFound { .. })));
    assert!(drain(&mut h.audit).is_empty());

    // nothing was left half-created
    h.platform.upload_delay_ms.store(0, Ordering::SeqCst);
    h.service.create_emote("blobcat", 1, STATIC_IMG).await.unwrap();
    assert_eq!(h.platform.live_count(), 1);
}

#[tokio::test]
async fn only_the_owner_can_remove() {
    let mut h = harness(1, &[1]);
    let emote = h.service.create_emote("blobcat", 7, STATIC_IMG).await.unwrap();
    drain(&mut h.audit);

    let err = h.service.remove_emote("blobcat", Authority::Owner(8)).await.unwrap_err();
    assert!(matches!(err, EmoteError::PermissionDenied { .. }));
    assert_eq!(h.platform.live_count(), 1);

    h.service.remove_emote("blobcat", Authority::Owner(7)).await.unwrap();
    assert!(matches!(h.service.find("blobcat").await, Err(EmoteError::NotFound { .. })));
    assert_eq!(h.platform.live_count(), 0);
    assert!(matches!(&drain(&mut h.audit)[..], [AuditEvent::Removed { emote: e, .. }] if e.id == emote.id));
}

#[tokio::test]
async fn removal_frees_the_shard_slot() {
    let h = harness(1, &[1]);
    h.service.create_emote("first", 1, STATIC_IMG).await.unwrap();
    assert!(matches!(
        h.service.create_emote("second", 1, STATIC_IMG).await,
        Err(EmoteError::CapacityExhausted { .. })
    ));

    h.service.remove_emote("first", Authority::System).await.unwrap();
    h.service.create_emote("second", 1, STATIC_IMG).await.unwrap();
}

#[tokio::test]
async fn rename_updates_registry_and_platform() {
    let h = harness(5, &[1]);
    let emote = h.service.create_emote("blobcat", 7, STATIC_IMG).await.unwrap();
    h.service.create_emote("taken", 7, STATIC_IMG).await.unwrap();

    assert!(matches!(
        h.service.rename_emote("blobcat", "catblob", Authority::Owner(8)).await,
        Err(EmoteError::PermissionDenied { .. })
    ));
    assert!(matches!(
        h.service.rename_emote("blobcat", "TAKEN", Authority::Owner(7)).await,
        Err(EmoteError::AlreadyExists { .. })
    ));

    let renamed = h.service.rename_emote("blobcat", "catblob", Authority::Owner(7)).await.unwrap();
    assert_eq!(renamed.id, emote.id);
    assert!(renamed.modified.is_some());
    assert!(h.platform.calls().contains(&Call::RenameEmote { id: emote.id, name: "catblob".into() }));
    assert!(matches!(h.service.find("blobcat").await, Err(EmoteError::NotFound { .. })));
}

#[tokio::test]
async fn failed_platform_rename_is_reverted() {
    let h = harness(5, &[1]);
    h.service.create_emote("blobcat", 7, STATIC_IMG).await.unwrap();
    h.platform.fail_renames.store(true, Ordering::SeqCst);

    let err = h.service.rename_emote("blobcat", "catblob", Authority::Owner(7)).await.unwrap_err();
    assert!(matches!(err, EmoteError::Platform { .. }));
    assert_eq!(h.service.find("blobcat").await.unwrap().name, "blobcat");
    assert!(h.service.find("catblob").await.is_err());
}

#[tokio::test]
async fn describe_and_preserve_are_owner_only() {
    let h = harness(5, &[1]);
    h.service.create_emote("blobcat", 7, STATIC_IMG).await.unwrap();

    let long = "x".repeat(501);
    assert!(matches!(
        h.service.describe_emote("blobcat", Some(long), Authority::Owner(7)).await,
        Err(EmoteError::DescriptionTooLong { len: 501, max: 500 })
    ));
    let described = h
        .service
        .describe_emote("blobcat", Some("a cat made of blob".into()), Authority::Owner(7))
        .await
        .unwrap();
    assert_eq!(described.description.as_deref(), Some("a cat made of blob"));

    assert!(matches!(
        h.service.set_preserved("blobcat", true, Authority::Owner(8)).await,
        Err(EmoteError::PermissionDenied { .. })
    ));
    assert!(h.service.set_preserved("blobcat", true, Authority::System).await.unwrap().preserved);
}

#[tokio::test]
async fn usage_is_logged_for_everyone_but_the_owner() {
    let h = harness(5, &[1]);
    let blob = h.service.create_emote("blobcat", 7, STATIC_IMG).await.unwrap();

    let res = h.service.resolve_extract("look :blobcat: :blobcat:").await;
    assert_eq!(h.service.log_usage(&res, 7).await.unwrap(), 0);
    assert_eq!(h.service.log_usage(&res, 8).await.unwrap(), 1);
    assert_eq!(h.store.count_usage(blob.id).await.unwrap(), 1);
}
