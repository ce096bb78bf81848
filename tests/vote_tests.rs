/// Attachment index tests (votes)
///
/// Run with: cargo test --test vote_tests
use std::sync::Arc;

use chrono::{Duration, Utc};
use tripplan::core::{EntityId, EntityType, ObjectRef, PlanError};
use tripplan::model::{CreateDestination, CreatePlanner, CreateUser, Destination, User, VoteDirection};
use tripplan::service::TripPlanDb;
use tripplan::storage::{Collection, MemoryStore};

async fn setup() -> (TripPlanDb<MemoryStore>, User, Destination) {
    let db = TripPlanDb::new(Arc::new(MemoryStore::new()));
    let user = db
        .create_user(CreateUser {
            user_name: "jdoe".to_string(),
            preferred_name: "John Doe".to_string(),
        })
        .await
        .unwrap();
    let planner = db
        .create_planner(CreatePlanner {
            created_by: user.id.clone(),
            name: "Island hop".to_string(),
            description: None,
            start_date: Utc::now(),
            end_date: Utc::now() + Duration::days(4),
            ro_users: Vec::new(),
            rw_users: Vec::new(),
            invites: Vec::new(),
        })
        .await
        .unwrap();
    let destination = db
        .create_destination(
            &user.id,
            &planner.id,
            CreateDestination {
                created_by: user.id.clone(),
                name: "Salt Spring".to_string(),
                start_date: Utc::now(),
                end_date: Utc::now() + Duration::days(1),
            },
        )
        .await
        .unwrap();
    (db, user, destination)
}

#[tokio::test]
async fn test_cast_and_read_votes() {
    let (db, user, destination) = setup().await;
    let target = ObjectRef::new(EntityType::Destination, destination.id.clone());

    db.cast_vote(&target, &user.id, VoteDirection::Up)
        .await
        .unwrap();

    let tally = db.get_votes(&target).await.unwrap();
    assert_eq!(tally.up_votes, vec![user.id.clone()]);
    assert!(tally.down_votes.is_empty());
}

#[tokio::test]
async fn test_switching_direction_moves_the_vote() {
    let (db, user, destination) = setup().await;
    let target = ObjectRef::new(EntityType::Destination, destination.id.clone());

    // 1. Up, then down: the id appears in exactly one array
    db.cast_vote(&target, &user.id, VoteDirection::Up)
        .await
        .unwrap();
    let tally = db
        .cast_vote(&target, &user.id, VoteDirection::Down)
        .await
        .unwrap();
    assert!(tally.up_votes.is_empty());
    assert_eq!(tally.down_votes, vec![user.id.clone()]);

    // 2. Casting the same direction again changes nothing
    let again = db
        .cast_vote(&target, &user.id, VoteDirection::Down)
        .await
        .unwrap();
    assert_eq!(again.down_votes.len(), 1);
}

#[tokio::test]
async fn test_retract_clears_both_directions() {
    let (db, user, destination) = setup().await;
    let target = ObjectRef::new(EntityType::Destination, destination.id.clone());

    db.cast_vote(&target, &user.id, VoteDirection::Up)
        .await
        .unwrap();
    let tally = db.retract_vote(&target, &user.id).await.unwrap();
    assert!(tally.up_votes.is_empty());
    assert!(tally.down_votes.is_empty());
}

#[tokio::test]
async fn test_votes_die_with_their_entity() {
    let (db, user, destination) = setup().await;
    let target = ObjectRef::new(EntityType::Destination, destination.id.clone());

    db.cast_vote(&target, &user.id, VoteDirection::Up)
        .await
        .unwrap();
    assert_eq!(db.store().len(Collection::VoteThreads).await.unwrap(), 1);

    db.delete_entity(&user.id, &target).await.unwrap();
    assert_eq!(db.store().len(Collection::VoteThreads).await.unwrap(), 0);
}

#[tokio::test]
async fn test_voting_as_a_missing_user_is_not_found() {
    let (db, _, destination) = setup().await;
    let target = ObjectRef::new(EntityType::Destination, destination.id.clone());

    let ghost = EntityId::generate();
    let err = db
        .cast_vote(&target, &ghost, VoteDirection::Up)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PlanError::RecordNotFound {
            kind: EntityType::User,
            ..
        }
    ));
}
