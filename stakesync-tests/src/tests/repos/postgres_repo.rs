// These run against the database at TEST_DATABASE_URL:
// cargo test -p stakesync-tests -- --ignored
#[cfg(test)]
mod raw_events {
    use stakesync::events::UnsavedRawEvent;
    use stakesync::{PostgresRepoTxn, RepoTxn};

    use crate::factory::{add_pool_log, block_timestamp, deposit_log, stake_source};
    use crate::test_runner;

    #[tokio::test]
    #[ignore]
    pub async fn finds_created_raw_events_by_transaction_hash() {
        test_runner::run_test(|mut conn| async move {
            let mut txn = PostgresRepoTxn::new(&mut conn);
            let source = stake_source();
            let raw_event =
                UnsavedRawEvent::new(&add_pool_log(100, 7), &source, "AddPool", block_timestamp(100))
                    .unwrap();

            assert!(!txn.raw_event_exists(&source, &raw_event.transaction_hash, None).await.unwrap());

            txn.create_raw_event(&raw_event).await.unwrap();

            assert!(txn.raw_event_exists(&source, &raw_event.transaction_hash, None).await.unwrap());
            assert!(txn
                .raw_event_exists(&source, &raw_event.transaction_hash, Some(raw_event.log_index))
                .await
                .unwrap());
            assert!(!txn
                .raw_event_exists(&source, &raw_event.transaction_hash, Some(raw_event.log_index + 1))
                .await
                .unwrap());

            let raw_events = txn.get_raw_events(&source).await.unwrap();
            assert_eq!(raw_events.len(), 1);
            assert_eq!(raw_events[0].event_name, "AddPool");
            assert_eq!(raw_events[0].topic0, raw_event.topic0);
            assert_eq!(raw_events[0].block_timestamp, block_timestamp(100) as i64);
        })
        .await;
    }

    #[tokio::test]
    #[ignore]
    pub async fn rejects_the_same_log_twice() {
        test_runner::run_test(|mut conn| async move {
            let mut txn = PostgresRepoTxn::new(&mut conn);
            let source = stake_source();
            let raw_event =
                UnsavedRawEvent::new(&deposit_log(100, 3), &source, "Deposit", block_timestamp(100))
                    .unwrap();

            txn.create_raw_event(&raw_event).await.unwrap();

            assert!(txn.create_raw_event(&raw_event).await.is_err());
        })
        .await;
    }
}

#[cfg(test)]
mod pools {
    use chrono::{DateTime, Utc};
    use stakesync::pools::UnsavedPool;
    use stakesync::{PostgresRepoTxn, RepoTxn};

    use crate::factory::{stake_source, STAKE_CREATED_TX_HASH};
    use crate::test_runner;

    fn unsaved_pool(pool_id: i32, created_tx: &str) -> UnsavedPool {
        UnsavedPool {
            pool_id,
            contract_address: stake_source().contract_address,
            st_token_address: "0x7dfd6013cf8d92b751e63d481b51fe0e4c5abf5e".to_string(),
            pool_weight: 500.0,
            last_reward_block: 7_000_100,
            min_deposit_amount: 2.0,
            unstake_locked_blocks: 100,
            is_active: true,
            created_block: 7_000_050,
            created_tx: created_tx.to_string(),
            created_at: DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap(),
        }
    }

    #[tokio::test]
    #[ignore]
    pub async fn counts_and_returns_created_pools() {
        test_runner::run_test(|mut conn| async move {
            let mut txn = PostgresRepoTxn::new(&mut conn);
            let contract_address = stake_source().contract_address;

            assert_eq!(txn.count_pools(&contract_address).await.unwrap(), 0);
            assert!(!txn.pool_exists_by_created_tx(STAKE_CREATED_TX_HASH).await.unwrap());

            txn.create_pool(&unsaved_pool(0, STAKE_CREATED_TX_HASH)).await.unwrap();
            txn.create_pool(&unsaved_pool(1, "0x01")).await.unwrap();

            assert_eq!(txn.count_pools(&contract_address).await.unwrap(), 2);
            assert_eq!(txn.count_pools("0x0000000000000000000000000000000000000002").await.unwrap(), 0);
            assert!(txn.pool_exists_by_created_tx(STAKE_CREATED_TX_HASH).await.unwrap());

            let pools = txn.get_pools(&contract_address).await.unwrap();
            let pool_ids: Vec<_> = pools.iter().map(|pool| pool.pool_id).collect();
            assert_eq!(pool_ids, vec![0, 1]);
            assert_eq!(pools[0].min_deposit_amount, 2.0);
            assert_eq!(pools[0].created_at.timestamp(), 1_700_000_000);
        })
        .await;
    }
}
