use crate::repos::repo::{RepoMigrations, SQLikeMigrations};

use super::PostgresRepo;

impl RepoMigrations for PostgresRepo {
    fn create_contract_events_migration() -> &'static [&'static str] {
        SQLikeMigrations::create_contract_events()
    }

    fn create_pool_info_migration() -> &'static [&'static str] {
        SQLikeMigrations::create_pool_info()
    }

    fn create_chain_contracts_migration() -> &'static [&'static str] {
        SQLikeMigrations::create_chain_contracts()
    }

    fn create_chain_endpoints_migration() -> &'static [&'static str] {
        SQLikeMigrations::create_chain_endpoints()
    }
}
