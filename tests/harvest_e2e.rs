//! End-to-end harvests against a mock portal, driven through the library.

mod common;

use common::*;
use portal_harvest::config::load_config;
use portal_harvest::error::HarvestError;
use portal_harvest::harvest::{run_harvest, RunOptions};
use portal_harvest::models::PersonRecord;
use portal_harvest::progress::NoProgress;
use portal_harvest::store::RecordStore;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn scenario_saves_only_the_valid_profile() {
    let server = MockServer::start().await;
    mount_login(&server, LOGIN_PAGE).await;
    mount_scenario(&server).await;
    let env = setup_env(&server.uri(), 1, 4);
    let cfg = load_config(&env.config_path).unwrap();

    let summary = run_harvest(&cfg, RunOptions::default(), &NoProgress)
        .await
        .unwrap();
    assert_eq!(summary.attempted, 3);
    assert_eq!(summary.saved, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.skipped, 1);

    let store = RecordStore::open(&env.db_path).await.unwrap();
    assert_eq!(store.count().await.unwrap(), 1);
    assert_eq!(
        store.get(1).await.unwrap(),
        Some(PersonRecord {
            uid: 1,
            name: "Asha Rao".to_string(),
            local_address: String::new(),
            permanent_address: "12 Lake Road, Nashik".to_string(),
            national_id: String::new(),
            phone: "+91 98765 43210".to_string(),
        })
    );
    store.close().await;
}

#[tokio::test]
async fn missing_token_aborts_before_any_fetch() {
    let server = MockServer::start().await;
    mount_login(&server, "<html><body><p>maintenance</p></body></html>").await;
    Mock::given(method("GET"))
        .and(path("/user/profile.php"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let env = setup_env(&server.uri(), 1, 4);
    let cfg = load_config(&env.config_path).unwrap();

    // A row from an earlier run must survive untouched.
    let earlier = PersonRecord {
        uid: 7,
        name: "Earlier Run".to_string(),
        local_address: String::new(),
        permanent_address: String::new(),
        national_id: String::new(),
        phone: "1".to_string(),
    };
    let store = RecordStore::open(&env.db_path).await.unwrap();
    store.upsert(&earlier).await.unwrap();
    store.close().await;

    let err = run_harvest(&cfg, RunOptions::default(), &NoProgress)
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<HarvestError>(),
        Some(HarvestError::Authentication(_))
    ));

    let store = RecordStore::open(&env.db_path).await.unwrap();
    assert_eq!(store.all().await.unwrap(), vec![earlier]);
    store.close().await;
}

#[tokio::test]
async fn rerun_rewrites_identical_rows() {
    let server = MockServer::start().await;
    mount_login(&server, LOGIN_PAGE).await;
    mount_scenario(&server).await;
    let env = setup_env(&server.uri(), 1, 4);
    let cfg = load_config(&env.config_path).unwrap();

    run_harvest(&cfg, RunOptions::default(), &NoProgress)
        .await
        .unwrap();
    let store = RecordStore::open(&env.db_path).await.unwrap();
    let first = store.all().await.unwrap();
    store.close().await;

    let summary = run_harvest(&cfg, RunOptions::default(), &NoProgress)
        .await
        .unwrap();
    assert_eq!(summary.saved, 1);

    let store = RecordStore::open(&env.db_path).await.unwrap();
    assert_eq!(store.all().await.unwrap(), first);
    store.close().await;
}

#[tokio::test]
async fn run_options_override_config_range() {
    let server = MockServer::start().await;
    mount_login(&server, LOGIN_PAGE).await;
    mount_scenario(&server).await;
    let env = setup_env(&server.uri(), 1, 4);
    let cfg = load_config(&env.config_path).unwrap();

    let options = RunOptions {
        start: Some(2),
        end: Some(3),
        delay_ms: Some(0),
    };
    let summary = run_harvest(&cfg, options, &NoProgress).await.unwrap();

    assert_eq!(summary.attempted, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.saved, 0);
}

#[tokio::test]
async fn inverted_override_range_is_rejected() {
    let server = MockServer::start().await;
    let env = setup_env(&server.uri(), 1, 4);
    let cfg = load_config(&env.config_path).unwrap();

    let options = RunOptions {
        start: Some(10),
        end: Some(5),
        delay_ms: None,
    };
    let err = run_harvest(&cfg, options, &NoProgress).await.unwrap_err();
    assert!(err.to_string().contains("must be <="));
}

#[tokio::test]
async fn negative_override_start_is_rejected() {
    let server = MockServer::start().await;
    let env = setup_env(&server.uri(), 1, 4);
    let cfg = load_config(&env.config_path).unwrap();

    let options = RunOptions {
        start: Some(-2),
        end: Some(i64::MAX),
        delay_ms: None,
    };
    let err = run_harvest(&cfg, options, &NoProgress).await.unwrap_err();
    assert!(err.to_string().contains("must not be negative"));
    assert!(server.received_requests().await.unwrap().is_empty());
}
