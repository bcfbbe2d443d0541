//! Credential store integration tests
//!
//! Covers the source precedence and cache round-trip guarantees through
//! the public API. Environment-variable tests serialize on a mutex since
//! the process environment is shared.

mod common;

use common::record_with;
use snow_feedback::session::{
    CredentialStore,
    credentials::{ENV_ROUTE_COOKIE, ENV_SESSION_COOKIE, ENV_USER_TOKEN, ROUTE_COOKIE, SESSION_COOKIE},
};
use std::sync::Mutex;
use tempfile::TempDir;

static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

fn clear_env() {
    unsafe {
        std::env::remove_var(ENV_USER_TOKEN);
        std::env::remove_var(ENV_ROUTE_COOKIE);
        std::env::remove_var(ENV_SESSION_COOKIE);
    }
}

#[tokio::test]
async fn test_environment_wins_over_existing_cache_file() {
    let _lock = ENV_TEST_MUTEX.lock().unwrap();

    let dir = TempDir::new().unwrap();
    let store = CredentialStore::new(dir.path().join("session.json"));
    store
        .save(&record_with("cached_token", "cached_session"))
        .await
        .unwrap();

    unsafe {
        std::env::set_var(ENV_USER_TOKEN, "env_token");
        std::env::set_var(ENV_ROUTE_COOKIE, "env_route");
        std::env::set_var(ENV_SESSION_COOKIE, "env_session");
    }

    let record = store.load().await;
    clear_env();

    assert_eq!(record.token.as_deref(), Some("env_token"));
    assert_eq!(
        record.cookies.get(SESSION_COOKIE).map(String::as_str),
        Some("env_session")
    );
    assert_eq!(
        record.cookies.get(ROUTE_COOKIE).map(String::as_str),
        Some("env_route")
    );
    assert!(record.is_usable());
}

#[tokio::test]
async fn test_incomplete_environment_does_not_take_precedence() {
    let _lock = ENV_TEST_MUTEX.lock().unwrap();

    let dir = TempDir::new().unwrap();
    let store = CredentialStore::new(dir.path().join("session.json"));
    store
        .save(&record_with("cached_token", "cached_session"))
        .await
        .unwrap();

    // Two of three set: the cache file must win
    unsafe {
        std::env::set_var(ENV_USER_TOKEN, "env_token");
        std::env::set_var(ENV_ROUTE_COOKIE, "env_route");
    }

    let record = store.load().await;
    clear_env();

    assert_eq!(record.token.as_deref(), Some("cached_token"));
}

#[tokio::test]
async fn test_save_then_load_round_trips() {
    let _lock = ENV_TEST_MUTEX.lock().unwrap();
    clear_env();

    let dir = TempDir::new().unwrap();
    let store = CredentialStore::new(dir.path().join("session.json"));

    let record = record_with("round_trip_token", "round_trip_session");
    store.save(&record).await.unwrap();

    let loaded = store.load().await;
    assert_eq!(loaded.cookies, record.cookies);
    assert_eq!(loaded.token, record.token);
    assert!(loaded.is_usable());
}

#[tokio::test]
async fn test_save_overwrites_previous_record() {
    let _lock = ENV_TEST_MUTEX.lock().unwrap();
    clear_env();

    let dir = TempDir::new().unwrap();
    let store = CredentialStore::new(dir.path().join("session.json"));

    store.save(&record_with("first", "s1")).await.unwrap();
    store.save(&record_with("second", "s2")).await.unwrap();

    let loaded = store.load().await;
    assert_eq!(loaded.token.as_deref(), Some("second"));
}

#[tokio::test]
async fn test_malformed_cache_file_is_not_fatal() {
    let _lock = ENV_TEST_MUTEX.lock().unwrap();
    clear_env();

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session.json");
    tokio::fs::write(&path, "{ this is not json").await.unwrap();

    let record = CredentialStore::new(path).load().await;
    assert!(!record.is_usable());
    assert!(record.cookies.is_empty());
}

#[tokio::test]
async fn test_save_creates_missing_parent_directories() {
    let _lock = ENV_TEST_MUTEX.lock().unwrap();
    clear_env();

    let dir = TempDir::new().unwrap();
    let store = CredentialStore::new(dir.path().join("nested").join("deeper").join("session.json"));

    store.save(&record_with("token", "session")).await.unwrap();
    assert!(store.load().await.is_usable());
}
