//! Checkpoint history integration tests

use cabinetkit_core::{HistoryError, NoticeLevel};
use cabinetkit_designer::{AutoTickOutcome, CheckpointKind};
use cabinetkit_settings::Config;
use chrono::Duration;

use crate::common::{base, fixture, fixture_with, start_time};

fn manual_only() -> Config {
    let mut config = Config::default();
    config.history.auto_checkpoint_enabled = false;
    config
}

#[test]
fn test_manual_capacity_drops_oldest() {
    let fx = fixture_with(manual_only());
    let history = &fx.state.history;

    for i in 0..25 {
        fx.clock.advance(Duration::seconds(1));
        fx.add(base(300.0 + i as f64));
        assert!(history.create_checkpoint());
    }

    assert_eq!(history.past_len(), 20);
    let oldest = history.checkpoint(0).unwrap();
    assert_eq!(oldest.saved_at(), start_time() + Duration::seconds(6));
    assert_eq!(oldest.document.cabinets.len(), 6);
}

#[test]
fn test_auto_capacity_is_larger() {
    let fx = fixture();
    for _ in 0..60 {
        fx.clock.advance(Duration::seconds(1));
        fx.state.history.create_checkpoint();
    }
    assert_eq!(fx.state.history.past_len(), 50);

    fx.state.history.set_auto_checkpointing(false);
    assert_eq!(fx.state.history.past_len(), 20);
}

#[test]
fn test_manual_checkpoint_clears_future() {
    let fx = fixture_with(manual_only());
    let history = &fx.state.history;
    history.create_checkpoint();
    history.create_checkpoint();
    history.delete_checkpoint(1).unwrap();
    history.create_checkpoint();

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    assert!(rt.block_on(history.undo()));
    assert_eq!(history.future_len(), 1);

    history.create_checkpoint();
    assert_eq!(history.future_len(), 0);
    assert!(!history.can_redo());
}

#[test]
fn test_identical_content_is_not_recorded() {
    let fx = fixture();
    let history = &fx.state.history;
    fx.add(base(600.0));

    fx.clock.advance(Duration::seconds(5));
    assert!(matches!(
        history.auto_checkpoint_tick(),
        AutoTickOutcome::Recorded { .. }
    ));
    fx.clock.advance(Duration::seconds(5));
    assert_eq!(history.auto_checkpoint_tick(), AutoTickOutcome::Unchanged);
    assert_eq!(history.past_len(), 1);

    fx.add(base(450.0));
    fx.clock.advance(Duration::seconds(5));
    assert!(matches!(
        history.auto_checkpoint_tick(),
        AutoTickOutcome::Recorded { .. }
    ));
    assert_eq!(history.past_len(), 2);
}

#[test]
fn test_manual_checkpoint_counts_as_last_content() {
    let fx = fixture();
    fx.add(base(600.0));
    fx.state.history.create_checkpoint();
    fx.clock.advance(Duration::seconds(5));
    assert_eq!(
        fx.state.history.auto_checkpoint_tick(),
        AutoTickOutcome::Unchanged
    );
}

#[test]
fn test_auto_tick_disabled() {
    let fx = fixture_with(manual_only());
    fx.add(base(600.0));
    assert_eq!(
        fx.state.history.auto_checkpoint_tick(),
        AutoTickOutcome::Disabled
    );
    assert_eq!(fx.state.history.past_len(), 0);
}

#[test]
fn test_decay_keeps_manual_and_thins_autos() {
    let mut config = Config::default();
    config.history.max_checkpoints_with_auto = 1000;
    let fx = fixture_with(config);
    let history = &fx.state.history;
    let id = fx.add(base(600.0));

    assert!(history.create_checkpoint());

    for i in 1..=300 {
        fx.clock.advance(Duration::seconds(5));
        fx.state.scene.write().cabinet_mut(&id).unwrap().position.x = i as f64;
        history.auto_checkpoint_tick();
    }

    let now = start_time() + Duration::seconds(1500);
    let summaries = history.checkpoints();

    let manual: Vec<_> = summaries
        .iter()
        .filter(|s| s.kind == CheckpointKind::Manual)
        .collect();
    assert_eq!(manual.len(), 1);
    assert_eq!(manual[0].saved_at, start_time());

    let autos: Vec<_> = summaries
        .iter()
        .filter(|s| s.kind == CheckpointKind::Auto)
        .collect();
    assert!(autos
        .iter()
        .all(|s| now - s.saved_at <= Duration::minutes(20)));

    let dense = autos
        .iter()
        .filter(|s| now - s.saved_at < Duration::seconds(60))
        .count();
    assert_eq!(dense, 12);

    let mut buckets: Vec<_> = autos
        .iter()
        .filter(|s| now - s.saved_at >= Duration::seconds(60))
        .map(|s| s.saved_at.timestamp().div_euclid(60))
        .collect();
    let sparse = buckets.len();
    buckets.dedup();
    assert_eq!(buckets.len(), sparse, "one auto checkpoint per minute");
    assert!((18..=20).contains(&sparse));
}

#[tokio::test]
async fn test_undo_redo_walk() {
    let fx = fixture_with(manual_only());
    let history = &fx.state.history;

    fx.add(base(600.0));
    history.create_checkpoint();
    fx.add(base(450.0));
    history.create_checkpoint();
    fx.add(base(300.0));

    assert!(history.undo().await);
    assert_eq!(fx.cabinet_count(), 2);
    assert_eq!((history.past_len(), history.future_len()), (1, 1));

    assert!(history.undo().await);
    assert_eq!(fx.cabinet_count(), 1);
    assert_eq!((history.past_len(), history.future_len()), (0, 2));

    assert!(!history.undo().await);
    assert_eq!(fx.restore_count(), 2);

    assert!(history.redo().await);
    assert_eq!(fx.cabinet_count(), 1);
    assert!(history.redo().await);
    assert_eq!(fx.cabinet_count(), 2);
    assert!(!history.redo().await);
    assert_eq!((history.past_len(), history.future_len()), (2, 0));
}

#[tokio::test]
async fn test_concurrent_undo_restores_once() {
    let fx = fixture_with(manual_only());
    let history = &fx.state.history;

    fx.add(base(600.0));
    history.create_checkpoint();
    fx.add(base(450.0));
    history.create_checkpoint();

    let (first, second) = tokio::join!(history.undo(), history.undo());

    assert!(first ^ second);
    assert_eq!(fx.restore_count(), 1);
    assert_eq!((history.past_len(), history.future_len()), (1, 1));
    assert!(!history.is_restoring());
}

#[tokio::test]
async fn test_checkpoint_ignored_while_restoring() {
    let fx = fixture();
    let guard = fx.state.restorer.try_begin();
    assert!(guard.is_some());

    fx.add(base(600.0));
    assert!(!fx.state.history.create_checkpoint());
    assert_eq!(
        fx.state.history.auto_checkpoint_tick(),
        AutoTickOutcome::Restoring
    );
    assert!(!fx.state.history.reset_history(None));
    assert!(!fx.state.history.can_undo());
    assert!(!fx.state.history.undo().await);
    assert_eq!(fx.state.history.past_len(), 0);

    drop(guard);
    assert!(fx.state.history.create_checkpoint());
}

#[tokio::test]
async fn test_jump_is_idempotent() {
    let fx = fixture_with(manual_only());
    let history = &fx.state.history;

    for width in [600.0, 450.0, 300.0] {
        fx.add(base(width));
        history.create_checkpoint();
    }

    assert_eq!(history.jump_to(1).await, Ok(true));
    let first = fx.structure();
    assert_eq!((history.past_len(), history.future_len()), (2, 1));

    assert_eq!(history.jump_to(1).await, Ok(true));
    let second = fx.structure();
    assert_eq!((history.past_len(), history.future_len()), (2, 1));

    assert_eq!(first, second);
    assert_eq!(first.len(), 2);

    assert_eq!(history.jump_to(2).await, Ok(true));
    assert_eq!(fx.cabinet_count(), 3);
    assert_eq!((history.past_len(), history.future_len()), (3, 0));
}

#[tokio::test]
async fn test_jump_out_of_range() {
    let fx = fixture();
    fx.state.history.create_checkpoint();
    assert_eq!(
        fx.state.history.jump_to(3).await,
        Err(HistoryError::IndexOutOfRange { index: 3, len: 1 })
    );
    assert!(!fx.state.history.is_restoring());
}

#[tokio::test]
async fn test_delete_checkpoint_does_not_restore() {
    let fx = fixture_with(manual_only());
    let history = &fx.state.history;

    for width in [600.0, 450.0, 300.0] {
        fx.add(base(width));
        history.create_checkpoint();
    }
    history.undo().await;
    let restores = fx.restore_count();

    // Combined: [c0, c1] past, [c2] future
    let removed = history.delete_checkpoint(2).unwrap();
    assert_eq!(removed.document.cabinets.len(), 3);
    assert_eq!(history.future_len(), 0);

    let removed = history.delete_checkpoint(0).unwrap();
    assert_eq!(removed.document.cabinets.len(), 1);
    assert_eq!(history.past_len(), 1);

    assert!(history.delete_checkpoint(5).is_err());
    assert_eq!(fx.restore_count(), restores);
}

#[test]
fn test_reset_history_seeds_one_manual() {
    let fx = fixture();
    fx.add(base(600.0));
    fx.state.history.create_checkpoint();
    fx.state.history.create_checkpoint();

    assert!(fx.state.history.reset_history(None));
    let summaries = fx.state.history.checkpoints();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].kind, CheckpointKind::Manual);
    assert_eq!(summaries[0].cabinet_count, 1);
    assert!(summaries[0].in_past);
}

#[tokio::test]
async fn test_load_room_resets_history() {
    let fx = fixture();
    fx.add(base(600.0));
    fx.state.history.create_checkpoint();
    fx.state.history.create_checkpoint();

    let mut other = cabinetkit_designer::RoomDocument::new("Scullery");
    other.cabinets.push(cabinetkit_designer::SavedCabinet::new(
        "a".into(),
        cabinetkit_designer::CabinetType::Tall,
        cabinetkit_designer::Dimensions::new(600.0, 2100.0, 560.0),
    ));

    let report = fx.state.history.load_room(&other).await.unwrap().unwrap();
    assert_eq!(report.created.len(), 1);
    assert_eq!(fx.state.history.past_len(), 1);
    assert_eq!(fx.state.history.future_len(), 0);
    assert_eq!(fx.state.scene.read().room.name, "Scullery");
    assert!(fx
        .notices
        .lock()
        .iter()
        .any(|n| n.level == NoticeLevel::Info && n.message == "Loaded room 'Scullery'"));

    // The seeded checkpoint matches the live scene, so the next tick is a no-op.
    assert_eq!(
        fx.state.history.auto_checkpoint_tick(),
        AutoTickOutcome::Unchanged
    );
}

#[tokio::test]
async fn test_load_room_ignored_while_restoring() {
    let fx = fixture();
    fx.add(base(600.0));
    fx.state.history.create_checkpoint();

    let mut other = cabinetkit_designer::RoomDocument::new("Scullery");
    other.cabinets.push(cabinetkit_designer::SavedCabinet::new(
        "a".into(),
        cabinetkit_designer::CabinetType::Tall,
        cabinetkit_designer::Dimensions::new(600.0, 2100.0, 560.0),
    ));

    let guard = fx.state.restorer.try_begin();
    assert!(guard.is_some());
    assert!(matches!(fx.state.history.load_room(&other).await, Ok(None)));
    drop(guard);

    assert_eq!(fx.restore_count(), 0);
    assert_eq!(fx.cabinet_count(), 1);
    assert_eq!(fx.state.scene.read().room.name, "Untitled Room");
    assert_eq!(fx.state.history.past_len(), 1);
    assert!(fx.notices.lock().is_empty());
    assert!(!fx.state.history.is_restoring());
}

#[tokio::test(start_paused = true)]
async fn test_auto_checkpoint_loop_stops_on_shutdown() {
    let fx = fixture();
    let history = fx.state.history.clone();
    fx.add(base(600.0));

    let (tx, rx) = tokio::sync::watch::channel(false);
    let task = tokio::spawn(async move { history.run_auto_checkpoints(rx).await });

    tokio::time::sleep(std::time::Duration::from_secs(12)).await;
    assert_eq!(fx.state.history.past_len(), 1);

    tx.send(true).unwrap();
    task.await.unwrap();
}
