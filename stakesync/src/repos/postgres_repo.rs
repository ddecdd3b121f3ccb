mod migrations;

use std::fmt::Debug;

use diesel::{ExpressionMethods, QueryDsl};
use diesel_async::pooled_connection::{AsyncDieselConnectionManager, PoolError};
use diesel_async::{scoped_futures::ScopedFutureExt, AsyncConnection, AsyncPgConnection, RunQueryDsl};
use futures_core::future::BoxFuture;

use super::repo::{Repo, RepoError, RepoTxn};
use crate::contracts::{ChainEndpoint, Contract, ContractRecord};
use crate::events::{RawEvent, UnsavedRawEvent};
use crate::pools::{Pool as PoolRow, UnsavedPool};
use crate::{Source, SyncError};

pub type Conn<'a> = bb8::PooledConnection<'a, AsyncDieselConnectionManager<AsyncPgConnection>>;
pub type Pool = bb8::Pool<AsyncDieselConnectionManager<AsyncPgConnection>>;

impl From<diesel::result::Error> for RepoError {
    fn from(value: diesel::result::Error) -> Self {
        RepoError::Unknown(value.to_string())
    }
}

impl From<bb8::RunError<PoolError>> for RepoError {
    fn from(value: bb8::RunError<PoolError>) -> Self {
        RepoError::NotConnected(value.to_string())
    }
}

#[derive(Clone)]
pub struct PostgresRepo {
    pool: Pool,
}

impl Debug for PostgresRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresRepo").field("state", &self.pool.state()).finish()
    }
}

impl PostgresRepo {
    pub async fn new(url: &str, max_connections: u32) -> Result<Self, RepoError> {
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(url);
        let pool = bb8::Pool::builder()
            .max_size(max_connections)
            .build(manager)
            .await
            .map_err(|error| RepoError::NotConnected(error.to_string()))?;

        Ok(Self { pool })
    }

    pub fn from_pool(pool: Pool) -> Self {
        Self { pool }
    }

    pub fn get_pool(&self) -> &Pool {
        &self.pool
    }

    pub async fn get_conn(&self) -> Result<Conn<'_>, RepoError> {
        Ok(self.pool.get().await?)
    }
}

#[async_trait::async_trait]
impl Repo for PostgresRepo {
    async fn migrate(&self, migrations: &[&str]) -> Result<(), RepoError> {
        let mut conn = self.get_conn().await?;

        for migration in migrations {
            diesel::sql_query(*migration).execute(&mut *conn).await?;
        }

        Ok(())
    }

    async fn get_all_contracts(&self) -> Result<Vec<Contract>, RepoError> {
        use crate::diesel::schema::{chain_contracts, chain_endpoints};

        let mut conn = self.get_conn().await?;

        let records: Vec<ContractRecord> = chain_contracts::table
            .order_by(chain_contracts::id.asc())
            .load(&mut *conn)
            .await?;
        let endpoints: Vec<ChainEndpoint> = chain_endpoints::table
            .order_by(chain_endpoints::id.asc())
            .load(&mut *conn)
            .await?;

        Ok(Contract::from_records(records, &endpoints))
    }

    async fn run_in_transaction<T, F>(&self, repo_ops: F) -> Result<T, SyncError>
    where
        T: Send + 'static,
        F: for<'t> FnOnce(&'t mut dyn RepoTxn) -> BoxFuture<'t, Result<T, SyncError>>
            + Send
            + 'static,
    {
        let mut conn = self.get_conn().await?;
        let conn: &mut AsyncPgConnection = &mut conn;

        conn.transaction::<T, SyncError, _>(|conn| {
            async move {
                let mut txn = PostgresRepoTxn { conn };

                repo_ops(&mut txn).await
            }
            .scope_boxed()
        })
        .await
    }
}

/// `RepoTxn` over a connection that is inside an open transaction
pub struct PostgresRepoTxn<'a> {
    conn: &'a mut AsyncPgConnection,
}

impl<'a> PostgresRepoTxn<'a> {
    pub fn new(conn: &'a mut AsyncPgConnection) -> Self {
        Self { conn }
    }
}

fn db_chain_id(source: &Source) -> Result<i64, RepoError> {
    i64::try_from(source.chain_id)
        .map_err(|_| RepoError::Unknown(format!("chain id {} out of range", source.chain_id)))
}

#[async_trait::async_trait]
impl<'a> RepoTxn for PostgresRepoTxn<'a> {
    async fn raw_event_exists(
        &mut self,
        source: &Source,
        transaction_hash: &str,
        log_index: Option<i32>,
    ) -> Result<bool, RepoError> {
        use crate::diesel::schema::contract_events;

        let chain_id = db_chain_id(source)?;
        let same_transaction = contract_events::table
            .filter(contract_events::chain_id.eq(chain_id))
            .filter(contract_events::contract_address.eq(&source.contract_address))
            .filter(contract_events::transaction_hash.eq(transaction_hash));

        let count: i64 = match log_index {
            Some(log_index) => {
                same_transaction
                    .filter(contract_events::log_index.eq(log_index))
                    .count()
                    .get_result(&mut *self.conn)
                    .await?
            }
            None => same_transaction.count().get_result(&mut *self.conn).await?,
        };

        Ok(count > 0)
    }

    async fn create_raw_event(&mut self, raw_event: &UnsavedRawEvent) -> Result<(), RepoError> {
        use crate::diesel::schema::contract_events;

        diesel::insert_into(contract_events::table)
            .values(raw_event)
            .execute(&mut *self.conn)
            .await?;

        Ok(())
    }

    async fn get_raw_events(&mut self, source: &Source) -> Result<Vec<RawEvent>, RepoError> {
        use crate::diesel::schema::contract_events;

        let chain_id = db_chain_id(source)?;

        Ok(contract_events::table
            .filter(contract_events::chain_id.eq(chain_id))
            .filter(contract_events::contract_address.eq(&source.contract_address))
            .order_by((
                contract_events::block_number.asc(),
                contract_events::log_index.asc(),
            ))
            .load(&mut *self.conn)
            .await?)
    }

    async fn pool_exists_by_created_tx(&mut self, created_tx: &str) -> Result<bool, RepoError> {
        use crate::diesel::schema::pool_info;

        let count: i64 = pool_info::table
            .filter(pool_info::created_tx.eq(created_tx))
            .count()
            .get_result(&mut *self.conn)
            .await?;

        Ok(count > 0)
    }

    async fn count_pools(&mut self, contract_address: &str) -> Result<i64, RepoError> {
        use crate::diesel::schema::pool_info;

        Ok(pool_info::table
            .filter(pool_info::contract_address.eq(contract_address))
            .count()
            .get_result(&mut *self.conn)
            .await?)
    }

    async fn create_pool(&mut self, pool: &UnsavedPool) -> Result<(), RepoError> {
        use crate::diesel::schema::pool_info;

        diesel::insert_into(pool_info::table)
            .values(pool)
            .execute(&mut *self.conn)
            .await?;

        Ok(())
    }

    async fn get_pools(&mut self, contract_address: &str) -> Result<Vec<PoolRow>, RepoError> {
        use crate::diesel::schema::pool_info;

        Ok(pool_info::table
            .filter(pool_info::contract_address.eq(contract_address))
            .order_by(pool_info::pool_id.asc())
            .load(&mut *self.conn)
            .await?)
    }
}
