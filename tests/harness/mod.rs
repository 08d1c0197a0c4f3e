//! Integration Test Harness
//!
//! - `TestWorld` - In-memory roster with a `CombatManager` over scripted dice
//! - `WorldBuilder` - Adds players, monsters and encounters to a world
//!
//! # Example
//!
//! ```rust,ignore
//! use harness::{TestWorld, ENCOUNTER};
//!
//! #[tokio::test]
//! async fn test_goblin_fight() {
//!     let world = TestWorld::builder()
//!         .player(1, "Aria", 20, 2)
//!         .monster(1, "Goblin", 7, 0)
//!         .rolls(&[15, 8])
//!         .build();
//!
//!     let order = world.start().await;
//!     assert_eq!(order[0].entry.name, "Aria");
//! }
//! ```

mod world;

pub use world::{monster, TestWorld, WorldBuilder, CAMPAIGN, ENCOUNTER};
