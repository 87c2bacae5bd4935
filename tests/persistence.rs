mod common;

use city_of_choices::error::GameError;
use city_of_choices::model::character::Stats;
use city_of_choices::model::game_save::GameSave;
use city_of_choices::model::inventory::InventoryItem;

use common::*;

#[test]
fn snapshot_and_restore_round_trip() {
    let mut session = started_session(|backend| {
        backend.grant("key");
    });
    session.resolve_choice(RUN).unwrap();
    let save = session.snapshot();
    assert_eq!(save.current_stage, "alley");
    assert_eq!(save.current_stats, Stats { fear: 20, sanity: 95 });

    session.resolve_choice(0).unwrap();
    session.resolve_choice(RUN).unwrap();
    assert_eq!(session.store().character.as_ref().unwrap().fear, 40);

    let outcome = session.restore(save.clone()).unwrap();

    assert_eq!(outcome.stage, "alley");
    assert!(!outcome.ending_reached);
    assert_eq!(session.snapshot(), save);
    assert_eq!(
        session.store().node.as_ref().map(|n| n.stage.as_str()),
        Some("alley")
    );
}

#[test]
fn save_then_load_through_the_backend() {
    let mut session = started_session(|_| {});
    session.resolve_choice(TAKE_LAMP).unwrap();
    let saved = session.save_game().unwrap();
    assert_eq!(session.backend().inner.saved(), Some(&saved));

    session.resolve_choice(0).unwrap();
    let outcome = session.load_game().unwrap();

    assert_eq!(outcome.stage, "alley");
    assert_eq!(outcome.items_without_id, 0);
    assert!(session.store().has_unused("lamp"));
    assert_eq!(session.store().current_stage, "alley");
}

#[test]
fn loading_without_a_save_fails() {
    let mut session = started_session(|_| {});

    let err = session.load_game().unwrap_err();

    match err {
        GameError::Api(api) => {
            assert_eq!(api.status, 404);
            assert_eq!(api.message, "No saved game found");
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(session.store().current_stage, "start_city");
}

#[test]
fn failed_scene_fetch_changes_nothing() {
    let mut session = started_session(|_| {});
    session.resolve_choice(RUN).unwrap();
    let save = session.snapshot();
    session.resolve_choice(0).unwrap();

    session.backend_mut().fail("fetch_scene");
    let before = session.store().clone();
    let err = session.restore(save).unwrap_err();

    assert!(matches!(err, GameError::Network(_)));
    let after = session.store();
    assert_eq!(after.current_stage, before.current_stage);
    assert_eq!(after.character, before.character);
    assert_eq!(after.inventory, before.inventory);
    assert!(!after.is_loading);
}

#[test]
fn restoring_an_ending_ends_the_game() {
    let mut session = started_session(|_| {});
    let save = GameSave {
        current_stage: "ending_lost_forever".into(),
        choice_history: vec!["ending_lost_forever".into()],
        current_stats: Stats { fear: 70, sanity: 30 },
        inventory_snapshot: vec![InventoryItem::new(9, "coin", "")],
    };

    let outcome = session.restore(save).unwrap();

    assert!(outcome.ending_reached);
    let store = session.store();
    assert!(store.game_ended);
    assert!(store.inventory.is_empty());
}

#[test]
fn items_without_ids_are_counted() {
    let mut session = started_session(|_| {});
    let mut orphan = InventoryItem::new(1, "rope", "");
    orphan.id = None;
    let save = GameSave {
        current_stage: "alley".into(),
        choice_history: vec!["alley".into()],
        current_stats: Stats { fear: 150, sanity: -3 },
        inventory_snapshot: vec![orphan],
    };

    let outcome = session.restore(save).unwrap();

    assert_eq!(outcome.items_without_id, 1);
    assert_eq!(outcome.warnings.len(), 1);
    let character = session.store().character.as_ref().unwrap();
    assert_eq!((character.fear, character.sanity), (100, 0));
    assert!(session.store().has_unused("rope"));
}
