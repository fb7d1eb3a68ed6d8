//! Item registry tests

mod helpers;

use helpers::*;
use ranko_common::db::{Geolocation, NewItem};
use ranko_core::{DomainError, Entity};

#[tokio::test]
async fn test_create_item_with_details() {
    let w = world().await;
    let s = seed(&w.engine).await;

    let item = w
        .engine
        .items
        .create_item(
            &s.ranking.id,
            &s.owner.id,
            NewItem {
                name: " Napoli ".into(),
                description: Some("Wood oven".into()),
                link: Some("https://napoli.example".into()),
                geolocation: Some(Geolocation {
                    latitude: -23.55,
                    longitude: -46.63,
                }),
                photos: vec!["photos/1.jpg".into(), "photos/2.jpg".into()],
            },
        )
        .await
        .unwrap();

    assert_eq!(item.name, "Napoli");
    assert_eq!(item.creator_id, s.owner.id);
    assert_eq!(item.photos, vec!["photos/1.jpg", "photos/2.jpg"]);
    assert_eq!(
        item.geolocation(),
        Some(Geolocation {
            latitude: -23.55,
            longitude: -46.63
        })
    );
}

#[tokio::test]
async fn test_create_item_rejects_bad_input() {
    let w = world().await;
    let s = seed(&w.engine).await;

    let bad_inputs = [
        NewItem {
            name: "   ".into(),
            ..Default::default()
        },
        NewItem {
            name: "Napoli".into(),
            link: Some("ftp://napoli.example".into()),
            ..Default::default()
        },
        NewItem {
            name: "Napoli".into(),
            geolocation: Some(Geolocation {
                latitude: 120.0,
                longitude: 0.0,
            }),
            ..Default::default()
        },
    ];

    for data in bad_inputs {
        let err = w
            .engine
            .items
            .create_item(&s.ranking.id, &s.owner.id, data)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "VALIDATION_FAILED");
    }
}

#[tokio::test]
async fn test_non_member_cannot_create_item() {
    let w = world().await;
    let s = seed(&w.engine).await;
    let outsider = register(&w.engine, "outsider@example.com", "Outsider").await;

    let err = w
        .engine
        .items
        .create_item(
            &s.ranking.id,
            &outsider.id,
            NewItem {
                name: "Sneaky".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::NotAuthorized);
}

#[tokio::test]
async fn test_list_items_requires_membership() {
    let w = world().await;
    let s = seed(&w.engine).await;
    let outsider = register(&w.engine, "outsider@example.com", "Outsider").await;

    let err = w
        .engine
        .items
        .list_items(&s.ranking.id, &outsider.id)
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::NotAuthorized);

    // Same answer for a ranking that does not exist
    let err = w
        .engine
        .items
        .list_items("no-such-ranking", &outsider.id)
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::NotAuthorized);
}

#[tokio::test]
async fn test_list_items_carries_averages() {
    let w = world().await;
    let s = seed(&w.engine).await;
    let unscored = create_item(&w.engine, &s.ranking, &s.owner, "Calzone").await;

    w.engine
        .scores
        .upsert_score(&s.item.id, &s.owner.id, &s.taste.id, 9.0)
        .await
        .unwrap();

    let items = w
        .engine
        .items
        .list_items(&s.ranking.id, &s.owner.id)
        .await
        .unwrap();

    assert_eq!(items.len(), 2);
    let pizza = items.iter().find(|i| i.item.id == s.item.id).unwrap();
    let calzone = items.iter().find(|i| i.item.id == unscored.id).unwrap();
    assert_eq!(pizza.average_score, 9.0);
    assert_eq!(calzone.average_score, 0.0);

    let json = serde_json::to_value(pizza).unwrap();
    assert_eq!(json["name"], "Pizza");
    assert_eq!(json["average_score"], 9.0);
}

#[tokio::test]
async fn test_delete_item() {
    let w = world().await;
    let s = seed(&w.engine).await;
    let outsider = register(&w.engine, "outsider@example.com", "Outsider").await;

    let err = w
        .engine
        .items
        .delete_item(&s.item.id, &outsider.id)
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::NotAuthorized);

    w.engine
        .items
        .delete_item(&s.item.id, &s.owner.id)
        .await
        .unwrap();

    let err = w
        .engine
        .items
        .delete_item(&s.item.id, &s.owner.id)
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::NotFound(Entity::Item));
    assert!(w
        .engine
        .items
        .list_items(&s.ranking.id, &s.owner.id)
        .await
        .unwrap()
        .is_empty());
}
