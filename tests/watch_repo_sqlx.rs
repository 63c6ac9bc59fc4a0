use sqlx::AnyPool;
use sqlx::any::AnyPoolOptions;

use pnw_sentinel::db::schema;
use pnw_sentinel::watch::model::WatchPatch;
use pnw_sentinel::watch::repository::WatchRepository;
use pnw_sentinel::watch::repository_sqlx::SqlxWatchRepository;

async fn setup_db() -> AnyPool {
    sqlx::any::install_default_drivers();

    let db_name: u64 = rand::random();
    let conn_str = format!("sqlite:file:watch{}?mode=memory&cache=shared", db_name);

    let pool = AnyPoolOptions::new()
        .max_connections(5)
        .connect(&conn_str)
        .await
        .unwrap();

    schema::migrate(&pool).await.unwrap();
    pool
}

#[tokio::test]
async fn first_upsert_creates_with_defaults() {
    let repo = SqlxWatchRepository::new(setup_db().await);

    let w = repo
        .upsert_watch("u1", 9, WatchPatch::default())
        .await
        .unwrap();

    assert!(w.dm_enabled);
    assert!(!w.in_range_only);
    assert_eq!(w.bank_abs_usd_floor, None);
    assert_eq!(w.beige_lead_minutes, None);

    let listed = repo.list_watches("u1").await.unwrap();
    assert_eq!(listed, vec![w]);
}

#[tokio::test]
async fn upsert_merges_and_retains_omitted_fields() {
    let repo = SqlxWatchRepository::new(setup_db().await);

    repo.upsert_watch(
        "u1",
        9,
        WatchPatch {
            bank_abs_usd_floor: Some(5_000_000.0),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    // Second patch touches a different field; the floor must survive.
    let w = repo
        .upsert_watch(
            "u1",
            9,
            WatchPatch {
                beige_lead_minutes: Some(240),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(w.bank_abs_usd_floor, Some(5_000_000.0));
    assert_eq!(w.beige_lead_minutes, Some(240));
    assert!(w.dm_enabled);
}

#[tokio::test]
async fn watchers_of_excludes_dm_disabled() {
    let repo = SqlxWatchRepository::new(setup_db().await);

    repo.upsert_watch("u1", 9, WatchPatch::default())
        .await
        .unwrap();
    repo.upsert_watch(
        "u2",
        9,
        WatchPatch {
            dm_enabled: Some(false),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    repo.upsert_watch("u3", 10, WatchPatch::default())
        .await
        .unwrap();

    let watchers = repo.watchers_of(9).await.unwrap();
    assert_eq!(watchers.len(), 1);
    assert_eq!(watchers[0].user_id, "u1");
}

#[tokio::test]
async fn remove_watch_reports_existence() {
    let repo = SqlxWatchRepository::new(setup_db().await);

    repo.upsert_watch("u1", 9, WatchPatch::default())
        .await
        .unwrap();

    assert!(repo.remove_watch("u1", 9).await.unwrap());
    assert!(!repo.remove_watch("u1", 9).await.unwrap());
    assert!(repo.list_watches("u1").await.unwrap().is_empty());
}

#[tokio::test]
async fn watched_subjects_are_distinct() {
    let repo = SqlxWatchRepository::new(setup_db().await);

    repo.upsert_watch("u1", 9, WatchPatch::default())
        .await
        .unwrap();
    repo.upsert_watch("u2", 9, WatchPatch::default())
        .await
        .unwrap();
    repo.upsert_watch("u1", 10, WatchPatch::default())
        .await
        .unwrap();

    let subjects = repo.watched_subjects().await.unwrap();
    assert_eq!(subjects, vec![9, 10]);
}
