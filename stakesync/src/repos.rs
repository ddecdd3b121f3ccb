mod postgres_repo;
mod repo;

pub use postgres_repo::{Conn as PostgresRepoConn, Pool as PostgresRepoPool, PostgresRepo, PostgresRepoTxn};
pub use repo::{Repo, RepoError, RepoMigrations, RepoTxn, SQLikeMigrations};
