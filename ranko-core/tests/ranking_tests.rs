//! Rankings, criteria, accounts and abuse reports

mod helpers;

use helpers::*;
use ranko_common::db::{RankingPatch, ReportTarget};
use ranko_core::{DomainError, Entity};

#[tokio::test]
async fn test_register_user_normalizes_and_rejects_duplicates() {
    let w = world().await;

    let user = w
        .engine
        .accounts
        .register_user(" Ana@Example.com ", " Ana ", Some("  "))
        .await
        .unwrap();
    assert_eq!(user.email, "ana@example.com");
    assert_eq!(user.name, "Ana");
    assert_eq!(user.push_destination, None);

    let err = w
        .engine
        .accounts
        .register_user("ana@example.com", "Other Ana", None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "VALIDATION_FAILED");

    let err = w
        .engine
        .accounts
        .register_user("not-an-email", "Nobody", None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "VALIDATION_FAILED");
}

#[tokio::test]
async fn test_profile_hides_private_fields() {
    let w = world().await;
    let user = register(&w.engine, "ana@example.com", "Ana").await;

    let profile = w.engine.accounts.profile(&user.id).await.unwrap();
    let json = serde_json::to_value(&profile).unwrap();

    assert_eq!(json["name"], "Ana");
    assert!(json.get("email").is_none());
    assert!(json.get("push_destination").is_none());

    let err = w.engine.accounts.profile("missing").await.unwrap_err();
    assert_eq!(err, DomainError::NotAuthorized);
}

#[tokio::test]
async fn test_create_ranking_makes_owner_member() {
    let w = world().await;
    let owner = register(&w.engine, "owner@example.com", "Owner").await;

    let ranking = create_ranking(&w.engine, &owner, "Tacos").await;

    assert_eq!(ranking.owner_id, owner.id);
    let fetched = w
        .engine
        .rankings
        .get_ranking(&ranking.id, &owner.id)
        .await
        .unwrap();
    assert_eq!(fetched.name, "Tacos");
}

#[tokio::test]
async fn test_create_ranking_requires_known_user_and_name() {
    let w = world().await;
    let owner = register(&w.engine, "owner@example.com", "Owner").await;

    let err = w
        .engine
        .rankings
        .create_ranking("ghost", Default::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "VALIDATION_FAILED");

    let err = w
        .engine
        .rankings
        .create_ranking(
            "ghost",
            ranko_common::db::NewRanking {
                name: "Tacos".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::NotAuthorized);

    assert!(w
        .engine
        .rankings
        .list_rankings_for_user(&owner.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_update_ranking_by_member() {
    let w = world().await;
    let s = seed(&w.engine).await;
    let member = register(&w.engine, "member@example.com", "Member").await;
    join(&w.engine, &s.ranking, &s.owner, &member).await;

    let updated = w
        .engine
        .rankings
        .update_ranking(
            &s.ranking.id,
            &member.id,
            RankingPatch {
                description: Some("Best slices".into()),
                geolocation_enabled: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "Pizza places");
    assert_eq!(updated.description, "Best slices");
    assert!(updated.geolocation_enabled);
}

#[tokio::test]
async fn test_only_owner_deletes_ranking() {
    let w = world().await;
    let s = seed(&w.engine).await;
    let member = register(&w.engine, "member@example.com", "Member").await;
    join(&w.engine, &s.ranking, &s.owner, &member).await;

    let err = w
        .engine
        .rankings
        .delete_ranking(&s.ranking.id, &member.id)
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::NotAuthorized);

    w.engine
        .rankings
        .delete_ranking(&s.ranking.id, &s.owner.id)
        .await
        .unwrap();

    let err = w
        .engine
        .rankings
        .get_ranking(&s.ranking.id, &s.owner.id)
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::NotFound(Entity::Ranking));
    assert!(w
        .engine
        .rankings
        .list_rankings_for_user(&member.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_criteria_names_unique_per_ranking() {
    let w = world().await;
    let s = seed(&w.engine).await;
    let other = create_ranking(&w.engine, &s.owner, "Burgers").await;

    let err = w
        .engine
        .rankings
        .create_criteria(&s.ranking.id, &s.owner.id, "Taste")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "VALIDATION_FAILED");

    // Same name in another ranking is fine
    create_criteria(&w.engine, &other, &s.owner, "Taste").await;

    let names: Vec<String> = w
        .engine
        .rankings
        .list_criteria(&s.ranking.id, &s.owner.id)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Taste"]);
}

#[tokio::test]
async fn test_report_ranking() {
    let w = world().await;
    let s = seed(&w.engine).await;
    let outsider = register(&w.engine, "outsider@example.com", "Outsider").await;

    let report = w
        .engine
        .reports
        .report_ranking(&s.ranking.id, &outsider.id, "Offensive banner")
        .await
        .unwrap();

    assert_eq!(report.target_type, ReportTarget::Ranking);
    assert_eq!(report.item_id, None);
    assert_eq!(report.reporter_id, outsider.id);
}

#[tokio::test]
async fn test_report_item_checks_references() {
    let w = world().await;
    let s = seed(&w.engine).await;
    let other = create_ranking(&w.engine, &s.owner, "Burgers").await;

    let report = w
        .engine
        .reports
        .report_item(&s.ranking.id, &s.item.id, &s.owner.id, "Spam photo")
        .await
        .unwrap();
    assert_eq!(report.target_type, ReportTarget::Item);
    assert_eq!(report.item_id.as_deref(), Some(s.item.id.as_str()));

    let err = w
        .engine
        .reports
        .report_item(&s.ranking.id, "missing-item", &s.owner.id, "Spam")
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::NotFound(Entity::Item));

    let err = w
        .engine
        .reports
        .report_item(&other.id, &s.item.id, &s.owner.id, "Spam")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "VALIDATION_FAILED");

    let err = w
        .engine
        .reports
        .report_item(&s.ranking.id, &s.item.id, &s.owner.id, "   ")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "VALIDATION_FAILED");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM abuse_reports")
        .fetch_one(w.store.pool())
        .await
        .unwrap();
    assert_eq!(count, 1);
}
