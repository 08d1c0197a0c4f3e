//! Hit point scenario tests

use combatd::combat::{CombatError, ParticipantKey, UNCONSCIOUS};

use crate::harness::TestWorld;

fn duel() -> TestWorld {
    TestWorld::builder()
        .player(1, "Aria", 20, 2)
        .monster(1, "Ogre", 59, -1)
        .rolls(&[15, 8])
        .build()
}

#[tokio::test]
async fn test_temp_hp_absorbs_damage_first() {
    let world = duel();
    world.start().await;
    let aria = world.entry(ParticipantKey::player(1)).await;

    let view = world.manager.add_temp_hp(aria, 10).await.expect("temp hp failed");
    assert_eq!(view.entry.temp_hp, 10);

    let view = world.manager.apply_hp(aria, 15).await.expect("apply failed");
    assert_eq!(view.entry.temp_hp, 5);
    assert_eq!(view.current_hp, 20);

    // Current HP is still 20, so asking for 5 is 15 damage against 5 temp
    let view = world.manager.apply_hp(aria, 5).await.expect("apply failed");
    assert_eq!(view.entry.temp_hp, 0);
    assert_eq!(view.current_hp, 10);
    assert_eq!(world.hp(ParticipantKey::player(1)), 10);
}

#[tokio::test]
async fn test_big_hit_spills_past_temp_hp() {
    let world = duel();
    world.start().await;
    let aria = world.entry(ParticipantKey::player(1)).await;
    world.manager.add_temp_hp(aria, 10).await.expect("temp hp failed");

    let view = world.manager.apply_hp(aria, 5).await.expect("apply failed");
    assert_eq!(view.entry.temp_hp, 0);
    assert_eq!(view.current_hp, 15);
}

#[tokio::test]
async fn test_healing_leaves_temp_hp_and_caps() {
    let world = duel();
    world.start().await;
    let aria = world.entry(ParticipantKey::player(1)).await;

    world.manager.damage(aria, 12).await.expect("damage failed");
    world.manager.add_temp_hp(aria, 4).await.expect("temp hp failed");

    let view = world.manager.heal(aria, 5).await.expect("heal failed");
    assert_eq!(view.current_hp, 13);
    assert_eq!(view.entry.temp_hp, 4);

    let view = world.manager.apply_hp(aria, 99).await.expect("apply failed");
    assert_eq!(view.current_hp, 20);
}

#[tokio::test]
async fn test_temp_hp_stacks() {
    let world = duel();
    world.start().await;
    let aria = world.entry(ParticipantKey::player(1)).await;

    world.manager.add_temp_hp(aria, 3).await.expect("temp hp failed");
    let view = world.manager.add_temp_hp(aria, 4).await.expect("temp hp failed");
    assert_eq!(view.entry.temp_hp, 7);

    let err = world.manager.add_temp_hp(aria, -1).await.unwrap_err();
    assert!(matches!(err, CombatError::OutOfRange(_)));
    assert_eq!(world.view(ParticipantKey::player(1)).await.entry.temp_hp, 7);
}

#[tokio::test]
async fn test_unconscious_toggles_once() {
    let world = duel();
    world.start().await;
    let aria = world.entry(ParticipantKey::player(1)).await;

    let view = world.manager.damage(aria, 50).await.expect("damage failed");
    assert_eq!(view.current_hp, 0);
    let count = view.entry.conditions.iter().filter(|c| c.is_named(UNCONSCIOUS)).count();
    assert_eq!(count, 1);

    let view = world.manager.damage(aria, 3).await.expect("damage failed");
    let count = view.entry.conditions.iter().filter(|c| c.is_named(UNCONSCIOUS)).count();
    assert_eq!(count, 1);

    let view = world.manager.heal(aria, 6).await.expect("heal failed");
    assert_eq!(view.current_hp, 6);
    assert!(!view.entry.conditions.has(UNCONSCIOUS));
    assert!(!view.entry.vitality.is_dying());
}

#[tokio::test]
async fn test_negative_amounts_rejected() {
    let world = duel();
    world.start().await;
    let ogre = world.entry(ParticipantKey::monster(1)).await;

    assert!(matches!(world.manager.damage(ogre, -5).await, Err(CombatError::OutOfRange(_))));
    assert!(matches!(world.manager.heal(ogre, -5).await, Err(CombatError::OutOfRange(_))));
    assert_eq!(world.hp(ParticipantKey::monster(1)), 59);
}

#[tokio::test]
async fn test_unknown_entry() {
    let world = duel();
    world.start().await;
    let err = world.manager.apply_hp(9999, 1).await.unwrap_err();
    assert!(matches!(err, CombatError::NotFound(_)));
}

#[tokio::test]
async fn test_lowest_possible_hp_request() {
    let world = duel();
    world.start().await;
    let aria = world.entry(ParticipantKey::player(1)).await;
    world.manager.add_temp_hp(aria, 5).await.expect("temp hp failed");

    let view = world.manager.apply_hp(aria, i32::MIN).await.expect("apply failed");
    assert_eq!(view.current_hp, 0);
    assert_eq!(view.entry.temp_hp, 0);
    assert!(view.entry.conditions.has(UNCONSCIOUS));
    assert_eq!(world.hp(ParticipantKey::player(1)), 0);

    let view = world.manager.apply_hp(aria, i32::MAX).await.expect("apply failed");
    assert_eq!(view.current_hp, 20);
}

#[tokio::test]
async fn test_temp_hp_overflow_rejected() {
    let world = duel();
    world.start().await;
    let aria = world.entry(ParticipantKey::player(1)).await;

    world.manager.add_temp_hp(aria, i32::MAX).await.expect("temp hp failed");
    let err = world.manager.add_temp_hp(aria, 1).await.unwrap_err();
    assert!(matches!(err, CombatError::OutOfRange(_)));
    assert_eq!(world.view(ParticipantKey::player(1)).await.entry.temp_hp, i32::MAX);
}
