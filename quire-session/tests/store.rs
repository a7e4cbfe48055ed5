use std::sync::Arc;
use std::time::Duration;

use quire_session::SessionStore;
use quire_types::{SessionId, Turn};

#[tokio::test]
async fn commits_persist_across_checkouts() {
    let store = SessionStore::new();
    let id = SessionId::new("alpha");

    {
        let mut session = store.checkout(&id).await;
        session.commit([Turn::user("hi")]);
        session.commit([Turn::agent("hello")]);
    }

    let mut session = store.checkout(&id).await;
    assert_eq!(session.len(), 2);
    session.commit([Turn::user("again")]);
    drop(session);

    assert_eq!(
        store.history(&id).await.unwrap(),
        vec![Turn::user("hi"), Turn::agent("hello"), Turn::user("again")]
    );
}

#[tokio::test]
async fn sessions_are_isolated() {
    let store = SessionStore::new();
    let a = SessionId::new("a");
    let b = SessionId::new("b");

    store.checkout(&a).await.commit([Turn::user("for a")]);
    store.checkout(&b).await.commit([Turn::user("for b")]);

    assert_eq!(store.history(&a).await.unwrap(), vec![Turn::user("for a")]);
    assert_eq!(store.history(&b).await.unwrap(), vec![Turn::user("for b")]);
    assert_eq!(store.len().await, 2);
}

#[tokio::test]
async fn same_session_runs_serialize() {
    let store = Arc::new(SessionStore::new());
    let id = SessionId::new("shared");
    let first = store.checkout(&id).await;

    let waiter = {
        let store = Arc::clone(&store);
        let id = id.clone();
        tokio::spawn(async move {
            let mut session = store.checkout(&id).await;
            session.commit([Turn::user("second")]);
        })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!waiter.is_finished());

    let mut first = first;
    first.commit([Turn::user("first")]);
    drop(first);
    waiter.await.unwrap();

    assert_eq!(
        store.history(&id).await.unwrap(),
        vec![Turn::user("first"), Turn::user("second")]
    );
}

#[tokio::test]
async fn other_sessions_do_not_wait() {
    let store = SessionStore::new();
    let _held = store.checkout(&SessionId::new("busy")).await;
    let free = tokio::time::timeout(
        Duration::from_millis(200),
        store.checkout(&SessionId::new("free")),
    )
    .await;
    assert!(free.is_ok());
}

#[tokio::test]
async fn dropped_checkout_keeps_only_committed_turns() {
    let store = SessionStore::new();
    let id = SessionId::new("cancel");

    let run = {
        let store = &store;
        let id = id.clone();
        async move {
            let mut session = store.checkout(&id).await;
            session.commit([Turn::user("committed")]);
            std::future::pending::<()>().await;
        }
    };
    let _ = tokio::time::timeout(Duration::from_millis(20), run).await;

    assert_eq!(
        store.history(&id).await.unwrap(),
        vec![Turn::user("committed")]
    );
}
