//! Integration tests for discussion threads.
//!
//! - Messages come back as a forest with replies ordered by id
//! - Replies must point at a message of the same page
//! - Removal either cascades through the subtree or promotes the replies

mod common;

use assert_matches::assert_matches;
use wikistore_core::message_tree::NO_PARENT;
use wikistore_core::types::MessageId;
use wikistore_db::error::DbError;
use wikistore_db::executor::CommandExecutor;
use wikistore_db::models::message::{CreateMessage, MessageThread, UpdateMessage};
use wikistore_db::repositories::{MessageRepo, PageRepo};

use common::{at, open_store};

fn post(parent: MessageId, subject: &str) -> CreateMessage {
    CreateMessage {
        parent,
        username: "bob".to_string(),
        posted_at: at(3, 8),
        subject: subject.to_string(),
        body: format!("{subject} body"),
    }
}

async fn add(db: &CommandExecutor, parent: MessageId, subject: &str) -> MessageId {
    MessageRepo::add(db, "Home", &post(parent, subject))
        .await
        .unwrap()
        .id
}

/// Subjects of a forest, with replies nested in parentheses.
fn shape(threads: &[MessageThread]) -> String {
    threads
        .iter()
        .map(|thread| {
            if thread.replies.is_empty() {
                thread.message.subject.clone()
            } else {
                format!("{}({})", thread.message.subject, shape(&thread.replies))
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ---------------------------------------------------------------------------
// Forest
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_assembles_forest_in_id_order() {
    let (_dir, store) = open_store().await;
    let db = store.executor();
    PageRepo::add(db, "Home", at(1, 9)).await.unwrap();

    let a = add(db, NO_PARENT, "a").await;
    let b = add(db, NO_PARENT, "b").await;
    let a1 = add(db, a, "a1").await;
    add(db, b, "b1").await;
    add(db, a1, "a1x").await;
    add(db, a, "a2").await;

    let threads = MessageRepo::list(db, "Home").await.unwrap();

    assert_eq!(shape(&threads), "a(a1(a1x) a2) b(b1)");
    assert_eq!(threads.iter().map(MessageThread::len).sum::<usize>(), 6);
    assert_eq!(MessageRepo::count(db, "Home").await.unwrap(), 6);
}

#[tokio::test]
async fn messages_are_scoped_to_their_page() {
    let (_dir, store) = open_store().await;
    let db = store.executor();
    PageRepo::add(db, "Home", at(1, 9)).await.unwrap();
    PageRepo::add(db, "Other", at(1, 9)).await.unwrap();
    let root = add(db, NO_PARENT, "root").await;

    let result = MessageRepo::add(db, "Other", &post(root, "stray")).await;

    assert_matches!(result, Err(DbError::NotFound { entity: "message", .. }));
    assert!(MessageRepo::list(db, "Other").await.unwrap().is_empty());
    assert_eq!(MessageRepo::find(db, "Other", root).await.unwrap(), None);
}

#[tokio::test]
async fn message_on_missing_page_is_a_constraint_violation() {
    let (_dir, store) = open_store().await;
    let result = MessageRepo::add(store.executor(), "Nope", &post(NO_PARENT, "hi")).await;
    assert_matches!(result, Err(DbError::Constraint { .. }));
}

#[tokio::test]
async fn modify_keeps_the_parent_link() {
    let (_dir, store) = open_store().await;
    let db = store.executor();
    PageRepo::add(db, "Home", at(1, 9)).await.unwrap();
    let root = add(db, NO_PARENT, "root").await;
    let reply = add(db, root, "reply").await;

    let update = UpdateMessage {
        username: "carol".to_string(),
        posted_at: at(4, 10),
        subject: "edited".to_string(),
        body: "new body".to_string(),
    };
    let modified = MessageRepo::modify(db, "Home", reply, &update).await.unwrap();

    assert_eq!(modified.parent, root);
    assert_eq!(modified.subject, "edited");
    assert_eq!(MessageRepo::find(db, "Home", reply).await.unwrap(), Some(modified));
    assert_matches!(
        MessageRepo::modify(db, "Home", 999, &update).await,
        Err(DbError::NotFound { .. })
    );
}

#[tokio::test]
async fn page_rename_moves_the_discussion() {
    let (_dir, store) = open_store().await;
    let db = store.executor();
    PageRepo::add(db, "Home", at(1, 9)).await.unwrap();
    let root = add(db, NO_PARENT, "root").await;
    add(db, root, "reply").await;

    PageRepo::rename(db, "Home", "Start").await.unwrap();

    assert_eq!(shape(&MessageRepo::list(db, "Start").await.unwrap()), "root(reply)");
    assert_eq!(MessageRepo::count(db, "Home").await.unwrap(), 0);
}

// ---------------------------------------------------------------------------
// Removal
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cascading_remove_deletes_the_subtree() {
    let (_dir, store) = open_store().await;
    let db = store.executor();
    PageRepo::add(db, "Home", at(1, 9)).await.unwrap();
    let a = add(db, NO_PARENT, "a").await;
    let a1 = add(db, a, "a1").await;
    add(db, a1, "a1x").await;
    add(db, a, "a2").await;
    add(db, NO_PARENT, "b").await;

    MessageRepo::remove(db, "Home", a, true).await.unwrap();

    assert_eq!(shape(&MessageRepo::list(db, "Home").await.unwrap()), "b");
    assert_eq!(MessageRepo::count(db, "Home").await.unwrap(), 1);
}

#[tokio::test]
async fn non_cascading_remove_promotes_replies() {
    let (_dir, store) = open_store().await;
    let db = store.executor();
    PageRepo::add(db, "Home", at(1, 9)).await.unwrap();
    let a = add(db, NO_PARENT, "a").await;
    let a1 = add(db, a, "a1").await;
    add(db, a1, "a1x").await;
    add(db, a1, "a1y").await;

    MessageRepo::remove(db, "Home", a1, false).await.unwrap();
    assert_eq!(shape(&MessageRepo::list(db, "Home").await.unwrap()), "a(a1x a1y)");

    MessageRepo::remove(db, "Home", a, false).await.unwrap();
    assert_eq!(shape(&MessageRepo::list(db, "Home").await.unwrap()), "a1x a1y");
}

#[tokio::test]
async fn removing_a_missing_message_fails() {
    let (_dir, store) = open_store().await;
    let db = store.executor();
    PageRepo::add(db, "Home", at(1, 9)).await.unwrap();
    add(db, NO_PARENT, "a").await;

    for cascade in [true, false] {
        assert_matches!(
            MessageRepo::remove(db, "Home", 42, cascade).await,
            Err(DbError::NotFound { entity: "message", .. })
        );
    }
    assert_eq!(MessageRepo::count(db, "Home").await.unwrap(), 1);
}

#[tokio::test]
async fn page_removal_deletes_its_messages() {
    let (_dir, store) = open_store().await;
    let db = store.executor();
    PageRepo::add(db, "Home", at(1, 9)).await.unwrap();
    add(db, NO_PARENT, "a").await;

    PageRepo::remove(db, "Home").await.unwrap();

    assert_eq!(MessageRepo::count(db, "Home").await.unwrap(), 0);
}
