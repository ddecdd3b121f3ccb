use stakesync::{PostgresRepo, Repo, RepoMigrations};
use stakesync_tests::{db, test_runner};

#[tokio::main]
async fn main() {
    db::setup();

    let repo = test_runner::new_repo().await;
    repo.migrate(&PostgresRepo::get_internal_migrations())
        .await
        .unwrap();
}
