use std::env;
use std::future::Future;

use diesel_async::{AsyncConnection, AsyncPgConnection};
use dotenvy::dotenv;
use stakesync::{PostgresRepo, RedisCheckpointStore, Repo, RepoMigrations};

use crate::db;

pub async fn new_repo() -> PostgresRepo {
    PostgresRepo::new(db::database_url().as_str(), 1).await.unwrap()
}

/// Raw connection to the test Redis, for seeding and cleaning up keys
pub async fn redis_conn() -> redis::aio::MultiplexedConnection {
    redis::Client::open(db::redis_url())
        .unwrap()
        .get_multiplexed_async_connection()
        .await
        .unwrap()
}

pub async fn new_checkpoint_store() -> RedisCheckpointStore {
    RedisCheckpointStore::new(redis_conn().await)
}

/// Runs `test_fn` with a connection inside a transaction that is never committed
pub async fn run_test<TestFn, Fut>(test_fn: TestFn)
where
    TestFn: FnOnce(AsyncPgConnection) -> Fut,
    Fut: Future<Output = ()>,
{
    if should_setup_test_db() {
        db::setup();
    }

    let repo = new_repo().await;
    repo.migrate(&PostgresRepo::get_internal_migrations()).await.unwrap();

    let mut conn = repo.get_pool().dedicated_connection().await.unwrap();
    conn.begin_test_transaction().await.unwrap();

    test_fn(conn).await;
}

fn should_setup_test_db() -> bool {
    dotenv().ok();

    env::var("SETUP_TEST_DB").is_ok()
}
