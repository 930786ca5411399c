//! Integration tests for the PostgreSQL adapters. They need a database
//! reachable through `DATABASE_URL`; run them with `--ignored`.

use sqlx::PgPool;
use storyflow_catalog::application::cache::CatalogCache;
use storyflow_catalog::application::source::CatalogSource;
use storyflow_core::error::DomainError;
use storyflow_core::ids::{PlayerId, StoryId};
use storyflow_ledger::application::ports::PlayerStateStore;
use storyflow_ledger::domain::stats::PlayerStats;
use storyflow_store::pg_catalog_source::PgCatalogSource;
use storyflow_store::pg_player_store::PgPlayerStateStore;
use uuid::Uuid;

async fn seed_catalog(pool: &PgPool) {
    sqlx::raw_sql(
        r#"
        INSERT INTO stories (id, title, description, order_index) VALUES (1, 'Plaza', '', 1);
        INSERT INTO stories (id, title, description, dependency_story_id, order_index)
            VALUES (99, 'Tunnels', '', 1, 2);
        INSERT INTO flow_steps (id, story_id, order_index, step_type, next_step_id)
            VALUES (11, 1, 1, 'pregunta', NULL), (10, 1, 0, 'narrativo', 11);
        UPDATE flow_steps SET decision_options = '"[{\"texto\":\"go\",\"siguiente_paso_id\":10}]"'
            WHERE id = 11;
        INSERT INTO media_resources (id, kind, file, metadata)
            VALUES (5, '3d_model', 'market.glb', '[{"meshName":"a","contentType":"image"}]');
        INSERT INTO rewards (id, name, value) VALUES (7, 'Old map', 50);
        INSERT INTO characters (id, name) VALUES (3, 'Marta');
        "#,
    )
    .execute(pool)
    .await
    .unwrap();
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_catalog_loads_from_tables(pool: PgPool) {
    seed_catalog(&pool).await;
    let source = PgCatalogSource::new(pool);

    let catalog = CatalogCache::load(&source).await.unwrap();
    let steps = source.fetch_steps_by_story(StoryId(1)).await.unwrap();

    assert_eq!(catalog.stories().len(), 2);
    assert!(catalog.media(storyflow_core::ids::MediaId(5)).is_some());
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0].id, 10);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_player_profile_insert_then_update(pool: PgPool) {
    let store = PgPlayerStateStore::new(pool);
    let mut stats = PlayerStats::new(PlayerId(Uuid::new_v4()));
    stats.apply_xp(120);
    stats.version = 1;

    store.put_player_stats(&stats, 0).await.unwrap();
    stats.visited_stories.push(StoryId(1));
    stats.version = 2;
    store.put_player_stats(&stats, 1).await.unwrap();

    let loaded = store.get_player_stats(stats.player_id).await.unwrap().unwrap();
    assert_eq!(loaded, stats);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_player_profile_stale_write_conflicts(pool: PgPool) {
    let store = PgPlayerStateStore::new(pool);
    let mut stats = PlayerStats::new(PlayerId(Uuid::new_v4()));
    stats.version = 1;
    store.put_player_stats(&stats, 0).await.unwrap();

    let result = store.put_player_stats(&stats, 0).await;

    match result {
        Err(DomainError::ConcurrencyConflict { expected, actual, .. }) => {
            assert_eq!(expected, 0);
            assert_eq!(actual, 1);
        }
        other => panic!("expected ConcurrencyConflict, got {other:?}"),
    }
}
