//! Combat lifecycle scenario tests
//!
//! Starting and ending combat, sibling encounters, the combat log and
//! concurrent operations on one encounter.

use std::sync::Arc;

use combatd::combat::{
    CombatError, CombatEventKind, Condition, Conditions, EncounterStatus, ParticipantKey, StartOptions,
};

use crate::harness::{monster, TestWorld, CAMPAIGN, ENCOUNTER};

const SIDE_ENCOUNTER: u64 = 2;
const OTHER_CAMPAIGN_ENCOUNTER: u64 = 3;

fn campaign_world() -> TestWorld {
    TestWorld::builder()
        .player(1, "Aria", 20, 2)
        .monster(1, "Goblin", 7, 0)
        .encounter(SIDE_ENCOUNTER, CAMPAIGN, "Side Passage")
        .monster_in(SIDE_ENCOUNTER, monster(2, "Rat", 3, 1, false))
        .encounter(OTHER_CAMPAIGN_ENCOUNTER, CAMPAIGN + 1, "Elsewhere")
        .build()
}

#[tokio::test]
async fn test_end_is_idempotent() {
    let world = campaign_world();

    // Ending a combat that never started is fine
    let status = world.manager.end_combat(ENCOUNTER, false).await.expect("end failed");
    assert_eq!(status, EncounterStatus::Pending);

    world.start().await;
    let status = world.manager.end_combat(ENCOUNTER, true).await.expect("end failed");
    assert_eq!(status, EncounterStatus::Completed);
    let status = world.manager.end_combat(ENCOUNTER, true).await.expect("end failed");
    assert_eq!(status, EncounterStatus::Completed);

    let snapshot = world.manager.initiative(ENCOUNTER).await.expect("initiative failed");
    assert!(snapshot.participants.is_empty());
    assert_eq!(snapshot.current_round, 1);
}

#[tokio::test]
async fn test_restart_gives_fresh_entries() {
    let world = campaign_world();
    world.start().await;
    let first_combat = world
        .manager
        .initiative(ENCOUNTER)
        .await
        .expect("initiative failed")
        .combat_id;
    let aria = world.entry(ParticipantKey::player(1)).await;
    world
        .manager
        .set_conditions(aria, Conditions::from_list([Condition::standard("prone")]))
        .await
        .expect("conditions failed");
    world.manager.set_removed(aria, true).await.expect("remove failed");
    world.manager.end_combat(ENCOUNTER, false).await.expect("end failed");

    world.start().await;
    let snapshot = world.manager.initiative(ENCOUNTER).await.expect("initiative failed");
    assert_ne!(snapshot.combat_id, first_combat);
    let view = world.view(ParticipantKey::player(1)).await;
    assert_ne!(view.entry.id, aria);
    assert!(view.entry.conditions.is_empty());
    assert!(!view.entry.is_removed_from_combat);

    // The old entry is gone
    let err = world.manager.heal(aria, 1).await.unwrap_err();
    assert!(matches!(err, CombatError::NotFound(_)));
}

#[tokio::test]
async fn test_already_active() {
    let world = campaign_world();
    world.start().await;
    let err = world
        .manager
        .start_combat(ENCOUNTER, StartOptions::auto())
        .await
        .unwrap_err();
    assert_eq!(err, CombatError::AlreadyActive(ENCOUNTER));
}

#[tokio::test]
async fn test_sibling_encounter_is_deactivated() {
    let world = campaign_world();
    world.start().await;

    world
        .manager
        .start_combat(SIDE_ENCOUNTER, StartOptions::auto())
        .await
        .expect("Failed to start side encounter");

    let main = world.manager.initiative(ENCOUNTER).await.expect("initiative failed");
    assert_eq!(main.status, EncounterStatus::Pending);
    assert!(main.participants.is_empty());
    let side = world.manager.initiative(SIDE_ENCOUNTER).await.expect("initiative failed");
    assert_eq!(side.status, EncounterStatus::Active);
    assert_eq!(side.participants.len(), 2);

    // Other campaigns are left alone, and this one has nobody to fight
    let err = world
        .manager
        .start_combat(OTHER_CAMPAIGN_ENCOUNTER, StartOptions::auto())
        .await
        .unwrap_err();
    assert_eq!(err, CombatError::NoParticipants);
    let side = world.manager.initiative(SIDE_ENCOUNTER).await.expect("initiative failed");
    assert_eq!(side.status, EncounterStatus::Active);
}

#[tokio::test]
async fn test_combat_log_follows_the_fight() {
    let world = TestWorld::builder()
        .player(1, "Aria", 20, 2)
        .monster(1, "Goblin", 7, 0)
        .rolls(&[15, 8])
        .build();
    world.start().await;
    let goblin = world.entry(ParticipantKey::monster(1)).await;

    world.manager.advance_turn(ENCOUNTER).await.expect("advance failed");
    world.manager.damage(goblin, 7).await.expect("damage failed");
    world.manager.end_combat(ENCOUNTER, true).await.expect("end failed");

    let log = world.manager.combat_log(ENCOUNTER).await.expect("log failed");
    let kinds: Vec<CombatEventKind> = log.iter().map(|e| e.kind).collect();
    assert_eq!(kinds.first(), Some(&CombatEventKind::CombatStarted));
    assert_eq!(kinds.last(), Some(&CombatEventKind::CombatEnded));
    assert!(kinds.contains(&CombatEventKind::Damage));
    assert!(kinds.contains(&CombatEventKind::Died));
    assert!(kinds.contains(&CombatEventKind::Removed));

    // Survives the end, cleared by the next start
    world.start().await;
    let log = world.manager.combat_log(ENCOUNTER).await.expect("log failed");
    assert!(!log.iter().any(|e| e.kind == CombatEventKind::Died));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_damage_is_serialized() {
    let world = TestWorld::builder()
        .player(1, "Aria", 20, 2)
        .monster(1, "Ogre", 100, 0)
        .build();
    world.start().await;
    let ogre = world.entry(ParticipantKey::monster(1)).await;

    let manager = Arc::clone(&world.manager);
    let tasks: Vec<_> = (0..20)
        .map(|_| {
            let manager = Arc::clone(&manager);
            tokio::spawn(async move { manager.damage(ogre, 3).await })
        })
        .collect();
    for task in tasks {
        task.await.expect("task panicked").expect("damage failed");
    }

    assert_eq!(world.hp(ParticipantKey::monster(1)), 40);
}
