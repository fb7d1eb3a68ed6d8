//! Test Helper Utilities
//!
//! Shared utilities for testing ranko-core

#![allow(dead_code)]

pub mod log_capture;
pub mod senders;

use std::sync::Arc;

use ranko_common::config::DispatchMode;
use ranko_common::db::{Criteria, Item, NewItem, NewRanking, Ranking, User};
use ranko_common::{SqliteStore, Store};
use ranko_core::notify::PushSender;
use ranko_core::{Engine, EngineConfig};

pub use log_capture::LogCapture;
pub use senders::{FailingSender, RecordingSender};

/// An engine over a private in-memory store, with the pieces tests poke at
pub struct World {
    pub engine: Engine,
    pub store: Arc<SqliteStore>,
    pub sender: Arc<RecordingSender>,
}

/// Engine with inline dispatch and a recording sender
pub async fn world() -> World {
    world_with(EngineConfig {
        dispatch: DispatchMode::Inline,
        ..Default::default()
    })
    .await
}

pub async fn world_with(config: EngineConfig) -> World {
    let sender = Arc::new(RecordingSender::default());
    let (engine, store) = engine_with_sender(sender.clone(), config).await;
    World {
        engine,
        store,
        sender,
    }
}

pub async fn engine_with_sender(
    sender: Arc<dyn PushSender>,
    config: EngineConfig,
) -> (Engine, Arc<SqliteStore>) {
    let store = Arc::new(SqliteStore::in_memory().await.unwrap());
    let engine = Engine::new(store.clone() as Arc<dyn Store>, sender, config);
    (engine, store)
}

/// Push destination registered for a test account
pub fn destination_of(email: &str) -> String {
    format!("ExponentPushToken[{email}]")
}

/// Register an account that can receive pushes
pub async fn register(engine: &Engine, email: &str, name: &str) -> User {
    engine
        .accounts
        .register_user(email, name, Some(&destination_of(email)))
        .await
        .unwrap()
}

pub async fn create_ranking(engine: &Engine, owner: &User, name: &str) -> Ranking {
    engine
        .rankings
        .create_ranking(
            &owner.id,
            NewRanking {
                name: name.to_string(),
                description: format!("{name} around town"),
                ..Default::default()
            },
        )
        .await
        .unwrap()
}

pub async fn create_criteria(engine: &Engine, ranking: &Ranking, user: &User, name: &str) -> Criteria {
    engine
        .rankings
        .create_criteria(&ranking.id, &user.id, name)
        .await
        .unwrap()
}

pub async fn create_item(engine: &Engine, ranking: &Ranking, user: &User, name: &str) -> Item {
    engine
        .items
        .create_item(
            &ranking.id,
            &user.id,
            NewItem {
                name: name.to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap()
}

/// Invite `user` into the ranking on behalf of `inviter` and accept it
pub async fn join(engine: &Engine, ranking: &Ranking, inviter: &User, user: &User) {
    let invite = engine
        .invites
        .create_invite(&ranking.id, &user.email, &inviter.id)
        .await
        .unwrap();
    engine
        .invites
        .accept_invite(&invite.id, &user.id)
        .await
        .unwrap();
}

/// A ranking owned by `owner` with one item and a "Taste" criteria
pub struct Seeded {
    pub owner: User,
    pub ranking: Ranking,
    pub item: Item,
    pub taste: Criteria,
}

pub async fn seed(engine: &Engine) -> Seeded {
    let owner = register(engine, "owner@example.com", "Owner").await;
    let ranking = create_ranking(engine, &owner, "Pizza places").await;
    let taste = create_criteria(engine, &ranking, &owner, "Taste").await;
    let item = create_item(engine, &ranking, &owner, "Pizza").await;

    Seeded {
        owner,
        ranking,
        item,
        taste,
    }
}
