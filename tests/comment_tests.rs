/// Attachment index tests (comments)
///
/// Threads are keyed by `(id, collection)` and live independently of the
/// entities they hang off; authorship failures are indistinguishable from
/// missing comments.
/// Run with: cargo test --test comment_tests
use std::sync::Arc;

use chrono::{Duration, Utc};
use tripplan::core::{EntityId, EntityType, ObjectRef, PlanError};
use tripplan::model::{
    Activity, CreateActivity, CreateComment, CreateDestination, CreatePlanner, CreateUser, User,
};
use tripplan::service::TripPlanDb;
use tripplan::storage::MemoryStore;

async fn setup_with_activities(n: usize) -> (TripPlanDb<MemoryStore>, User, Vec<Activity>) {
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
            name: "Coastline loop".to_string(),
            description: None,
            start_date: Utc::now(),
            end_date: Utc::now() + Duration::days(5),
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
                name: "Tofino".to_string(),
                start_date: Utc::now(),
                end_date: Utc::now() + Duration::days(2),
            },
        )
        .await
        .unwrap();

    let mut activities = Vec::with_capacity(n);
    for i in 0..n {
        let activity = db
            .create_activity(
                &user.id,
                &planner.id,
                &destination.id,
                CreateActivity {
                    created_by: user.id.clone(),
                    name: format!("Surf session {i}"),
                    start_date: Utc::now(),
                    duration: 120,
                    location: None,
                },
            )
            .await
            .unwrap();
        activities.push(activity);
    }
    (db, user, activities)
}

fn comment(user: &User, title: &str) -> CreateComment {
    CreateComment {
        created_by: user.id.clone(),
        title: title.to_string(),
        content: "noted".to_string(),
    }
}

#[tokio::test]
async fn test_comment_round_trip() {
    let (db, user, activities) = setup_with_activities(1).await;
    let target = ObjectRef::new(EntityType::Activity, activities[0].id.clone());

    // 1. First comment lazily creates the thread
    let first = db.add_comment(&target, comment(&user, "waves")).await.unwrap();

    // 2. The thread resolves to full records
    let thread = db.get_comments(&target).await.unwrap();
    assert_eq!(thread.len(), 1);
    assert_eq!(thread[0].id, first.id);
    assert_eq!(thread[0].title, "waves");

    // 3. Direct lookup works too
    let fetched = db.get_comment(&first.id).await.unwrap();
    assert_eq!(fetched.content, "noted");
}

#[tokio::test]
async fn test_commentless_entity_reads_as_empty_list() {
    let (db, _, activities) = setup_with_activities(1).await;
    let target = ObjectRef::new(EntityType::Activity, activities[0].id.clone());

    // no thread exists yet; that is a value, not an error
    let thread = db.get_comments(&target).await.unwrap();
    assert!(thread.is_empty());
}

#[tokio::test]
async fn test_threads_are_isolated_between_siblings() {
    let (db, user, activities) = setup_with_activities(2).await;
    let first = ObjectRef::new(EntityType::Activity, activities[0].id.clone());
    let second = ObjectRef::new(EntityType::Activity, activities[1].id.clone());

    // 1. Comment on both siblings
    db.add_comment(&first, comment(&user, "keep me")).await.unwrap();
    db.add_comment(&second, comment(&user, "goes away"))
        .await
        .unwrap();

    // 2. Cascade-delete the second activity
    db.delete_entity(&user.id, &second).await.unwrap();

    // 3. The first sibling's thread is untouched
    let thread = db.get_comments(&first).await.unwrap();
    assert_eq!(thread.len(), 1);
    assert_eq!(thread[0].title, "keep me");

    // 4. The deleted sibling's thread is gone
    let gone = db.get_comments(&second).await.unwrap();
    assert!(gone.is_empty());
}

#[tokio::test]
async fn test_author_can_remove_their_comment() {
    let (db, user, activities) = setup_with_activities(1).await;
    let target = ObjectRef::new(EntityType::Activity, activities[0].id.clone());

    let created = db.add_comment(&target, comment(&user, "typo")).await.unwrap();
    let removed = db
        .remove_comment(&target, &created.id, &user.id)
        .await
        .unwrap();
    assert_eq!(removed.id, created.id);

    assert!(db.get_comments(&target).await.unwrap().is_empty());
    let err = db.get_comment(&created.id).await.unwrap_err();
    assert!(matches!(err, PlanError::RecordNotFound { .. }));
}

#[tokio::test]
async fn test_non_author_removal_matches_missing_comment() {
    let (db, author, activities) = setup_with_activities(1).await;
    let stranger = db
        .create_user(CreateUser {
            user_name: "msmith".to_string(),
            preferred_name: "Mary Smith".to_string(),
        })
        .await
        .unwrap();
    let target = ObjectRef::new(EntityType::Activity, activities[0].id.clone());
    let created = db
        .add_comment(&target, comment(&author, "mine"))
        .await
        .unwrap();

    // 1. A non-author gets the exact outcome a missing comment id gives
    let as_stranger = db
        .remove_comment(&target, &created.id, &stranger.id)
        .await
        .unwrap_err();
    let missing_id = EntityId::generate();
    let as_missing = db
        .remove_comment(&target, &missing_id, &author.id)
        .await
        .unwrap_err();
    assert!(matches!(as_stranger, PlanError::RecordNotFound { kind: EntityType::Comment, .. }));
    assert!(matches!(as_missing, PlanError::RecordNotFound { kind: EntityType::Comment, .. }));

    // 2. And the comment is still there for its author
    let thread = db.get_comments(&target).await.unwrap();
    assert_eq!(thread.len(), 1);
}

#[tokio::test]
async fn test_commenting_on_a_missing_entity_is_not_found() {
    let (db, user, _) = setup_with_activities(0).await;
    let ghost = ObjectRef::new(EntityType::Activity, EntityId::generate());

    let err = db
        .add_comment(&ghost, comment(&user, "hello?"))
        .await
        .unwrap_err();
    assert!(matches!(err, PlanError::RecordNotFound { .. }));
}

#[tokio::test]
async fn test_removing_a_comment_purges_its_own_thread() {
    let (db, user, activities) = setup_with_activities(1).await;
    let target = ObjectRef::new(EntityType::Activity, activities[0].id.clone());

    // 1. Comment, then a reply thread hanging off the comment itself
    let parent = db.add_comment(&target, comment(&user, "top")).await.unwrap();
    let parent_ref = ObjectRef::new(EntityType::Comment, parent.id.clone());
    db.add_comment(&parent_ref, comment(&user, "reply"))
        .await
        .unwrap();

    // 2. Removing the parent comment takes the reply thread with it
    db.remove_comment(&target, &parent.id, &user.id)
        .await
        .unwrap();
    assert!(db.get_comments(&parent_ref).await.unwrap().is_empty());
    assert_eq!(
        db.store()
            .len(tripplan::Collection::Comments)
            .await
            .unwrap(),
        0
    );
}
