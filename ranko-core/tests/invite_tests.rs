//! Invite lifecycle tests
//!
//! An invite row exists only while pending; accept, decline and cancel all
//! consume it.

mod helpers;

use helpers::*;
use ranko_common::Store;
use ranko_core::{DomainError, Entity};

#[tokio::test]
async fn test_accept_creates_membership_and_consumes_invite() {
    let w = world().await;
    let s = seed(&w.engine).await;
    let guest = register(&w.engine, "guest@example.com", "Guest").await;

    let invite = w
        .engine
        .invites
        .create_invite(&s.ranking.id, "guest@example.com", &s.owner.id)
        .await
        .unwrap();
    let membership = w
        .engine
        .invites
        .accept_invite(&invite.id, &guest.id)
        .await
        .unwrap();

    assert_eq!(membership.user_id, guest.id);
    assert!(w
        .store
        .get_membership(&s.ranking.id, &guest.id)
        .await
        .unwrap()
        .is_some());
    assert!(w.store.get_invite(&invite.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_invite_email_is_normalized() {
    let w = world().await;
    let s = seed(&w.engine).await;

    let invite = w
        .engine
        .invites
        .create_invite(&s.ranking.id, "  Guest@Example.COM ", &s.owner.id)
        .await
        .unwrap();
    assert_eq!(invite.email, "guest@example.com");

    let err = w
        .engine
        .invites
        .create_invite(&s.ranking.id, "guest@example.com", &s.owner.id)
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::DuplicateInvite);
}

#[tokio::test]
async fn test_invite_existing_member_fails_without_row() {
    let w = world().await;
    let s = seed(&w.engine).await;
    let member = register(&w.engine, "member@example.com", "Member").await;
    join(&w.engine, &s.ranking, &s.owner, &member).await;

    let err = w
        .engine
        .invites
        .create_invite(&s.ranking.id, "member@example.com", &s.owner.id)
        .await
        .unwrap_err();

    assert_eq!(err, DomainError::AlreadyMember);
    assert!(w
        .store
        .pending_invite(&s.ranking.id, "member@example.com")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_non_member_cannot_invite() {
    let w = world().await;
    let s = seed(&w.engine).await;
    let outsider = register(&w.engine, "outsider@example.com", "Outsider").await;

    let err = w
        .engine
        .invites
        .create_invite(&s.ranking.id, "friend@example.com", &outsider.id)
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::NotAuthorized);
}

#[tokio::test]
async fn test_invite_into_deleted_ranking_is_not_found() {
    let w = world().await;
    let s = seed(&w.engine).await;
    w.engine
        .rankings
        .delete_ranking(&s.ranking.id, &s.owner.id)
        .await
        .unwrap();

    let err = w
        .engine
        .invites
        .create_invite(&s.ranking.id, "friend@example.com", &s.owner.id)
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::NotFound(Entity::Ranking));
}

#[tokio::test]
async fn test_accept_with_other_account_is_email_mismatch() {
    let w = world().await;
    let s = seed(&w.engine).await;
    let intruder = register(&w.engine, "intruder@example.com", "Intruder").await;

    let invite = w
        .engine
        .invites
        .create_invite(&s.ranking.id, "guest@example.com", &s.owner.id)
        .await
        .unwrap();

    let err = w
        .engine
        .invites
        .accept_invite(&invite.id, &intruder.id)
        .await
        .unwrap_err();

    assert_eq!(err, DomainError::EmailMismatch);
    assert!(w.store.get_invite(&invite.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_accept_is_retriable_when_membership_exists() {
    let w = world().await;
    let s = seed(&w.engine).await;
    let guest = register(&w.engine, "guest@example.com", "Guest").await;
    let invite = w
        .engine
        .invites
        .create_invite(&s.ranking.id, &guest.email, &s.owner.id)
        .await
        .unwrap();

    // An earlier attempt got as far as the membership
    let existing = w
        .store
        .add_membership(&guest.id, &s.ranking.id)
        .await
        .unwrap();

    let membership = w
        .engine
        .invites
        .accept_invite(&invite.id, &guest.id)
        .await
        .unwrap();

    assert_eq!(membership.id, existing.id);
    assert!(w.store.get_invite(&invite.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_second_accept_is_not_found() {
    let w = world().await;
    let s = seed(&w.engine).await;
    let guest = register(&w.engine, "guest@example.com", "Guest").await;
    let invite = w
        .engine
        .invites
        .create_invite(&s.ranking.id, &guest.email, &s.owner.id)
        .await
        .unwrap();

    w.engine
        .invites
        .accept_invite(&invite.id, &guest.id)
        .await
        .unwrap();
    let err = w
        .engine
        .invites
        .accept_invite(&invite.id, &guest.id)
        .await
        .unwrap_err();

    assert_eq!(err, DomainError::NotFound(Entity::Invite));
}

#[tokio::test]
async fn test_decline_twice_fails_second_time() {
    let w = world().await;
    let s = seed(&w.engine).await;
    let guest = register(&w.engine, "guest@example.com", "Guest").await;
    let invite = w
        .engine
        .invites
        .create_invite(&s.ranking.id, &guest.email, &s.owner.id)
        .await
        .unwrap();

    w.engine
        .invites
        .decline_invite(&invite.id, &guest.id)
        .await
        .unwrap();
    let err = w
        .engine
        .invites
        .decline_invite(&invite.id, &guest.id)
        .await
        .unwrap_err();

    assert_eq!(err, DomainError::NotFound(Entity::Invite));
    assert!(w
        .store
        .get_membership(&s.ranking.id, &guest.id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_cancel_twice_fails_second_time() {
    let w = world().await;
    let s = seed(&w.engine).await;
    let invite = w
        .engine
        .invites
        .create_invite(&s.ranking.id, "guest@example.com", &s.owner.id)
        .await
        .unwrap();

    w.engine
        .invites
        .cancel_invite(&invite.id, &s.owner.id)
        .await
        .unwrap();
    let err = w
        .engine
        .invites
        .cancel_invite(&invite.id, &s.owner.id)
        .await
        .unwrap_err();

    assert_eq!(err, DomainError::NotFound(Entity::Invite));
}

#[tokio::test]
async fn test_cancel_by_other_member_allowed() {
    let w = world().await;
    let s = seed(&w.engine).await;
    let member = register(&w.engine, "member@example.com", "Member").await;
    join(&w.engine, &s.ranking, &s.owner, &member).await;

    let invite = w
        .engine
        .invites
        .create_invite(&s.ranking.id, "guest@example.com", &s.owner.id)
        .await
        .unwrap();

    w.engine
        .invites
        .cancel_invite(&invite.id, &member.id)
        .await
        .unwrap();
    assert!(w.store.get_invite(&invite.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_cancel_by_outsider_is_validation_failure() {
    let w = world().await;
    let s = seed(&w.engine).await;
    let outsider = register(&w.engine, "outsider@example.com", "Outsider").await;
    let invite = w
        .engine
        .invites
        .create_invite(&s.ranking.id, "guest@example.com", &s.owner.id)
        .await
        .unwrap();

    let err = w
        .engine
        .invites
        .cancel_invite(&invite.id, &outsider.id)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "VALIDATION_FAILED");
    assert!(w.store.get_invite(&invite.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_list_invites() {
    let w = world().await;
    let s = seed(&w.engine).await;
    let outsider = register(&w.engine, "outsider@example.com", "Outsider").await;

    w.engine
        .invites
        .create_invite(&s.ranking.id, "a@example.com", &s.owner.id)
        .await
        .unwrap();
    w.engine
        .invites
        .create_invite(&s.ranking.id, "b@example.com", &s.owner.id)
        .await
        .unwrap();

    let by_email = w
        .engine
        .invites
        .list_invites_by_email("A@example.com")
        .await
        .unwrap();
    assert_eq!(by_email.len(), 1);
    assert_eq!(by_email[0].ranking_id, s.ranking.id);

    let by_ranking = w
        .engine
        .invites
        .list_invites_by_ranking(&s.ranking.id, &s.owner.id)
        .await
        .unwrap();
    assert_eq!(by_ranking.len(), 2);

    let err = w
        .engine
        .invites
        .list_invites_by_ranking(&s.ranking.id, &outsider.id)
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::NotAuthorized);
}

#[tokio::test]
async fn test_invite_notifications() {
    let w = world().await;
    let s = seed(&w.engine).await;
    let member = register(&w.engine, "member@example.com", "Member").await;
    join(&w.engine, &s.ranking, &s.owner, &member).await;
    let guest = register(&w.engine, "guest@example.com", "Guest").await;
    w.sender.clear();

    // Invitee hears about the invite
    let invite = w
        .engine
        .invites
        .create_invite(&s.ranking.id, &guest.email, &s.owner.id)
        .await
        .unwrap();
    assert_eq!(w.sender.destinations(), vec![destination_of("guest@example.com")]);
    assert_eq!(w.sender.titles(), vec!["New invite"]);
    w.sender.clear();

    // Everyone but the new member hears about the join
    w.engine
        .invites
        .accept_invite(&invite.id, &guest.id)
        .await
        .unwrap();
    let mut destinations = w.sender.destinations();
    destinations.sort();
    assert_eq!(
        destinations,
        vec![
            destination_of("member@example.com"),
            destination_of("owner@example.com"),
        ]
    );
    assert!(w.sender.titles().iter().all(|t| t == "New member"));
}

#[tokio::test]
async fn test_decline_notifies_members() {
    let w = world().await;
    let s = seed(&w.engine).await;
    let guest = register(&w.engine, "guest@example.com", "Guest").await;
    let invite = w
        .engine
        .invites
        .create_invite(&s.ranking.id, &guest.email, &s.owner.id)
        .await
        .unwrap();
    w.sender.clear();

    w.engine
        .invites
        .decline_invite(&invite.id, &guest.id)
        .await
        .unwrap();

    let sent = w.sender.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, destination_of("owner@example.com"));
    assert!(sent[0].1.body.contains("guest@example.com"));
}

#[tokio::test]
async fn test_invite_to_unregistered_email_sends_nothing() {
    let w = world().await;
    let s = seed(&w.engine).await;
    w.sender.clear();

    w.engine
        .invites
        .create_invite(&s.ranking.id, "nobody@example.com", &s.owner.id)
        .await
        .unwrap();

    assert_eq!(w.sender.count(), 0);
}
