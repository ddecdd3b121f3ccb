#[cfg(test)]
mod windows {
    use std::sync::Arc;

    use stakesync::syncer::Window;
    use stakesync::TickOutcome;

    use crate::factory::{stake_contract, stake_source, FakeChainReader, STAKE_CREATED_BLOCK};
    use crate::memory::{MemoryCheckpointStore, MemoryRepo};
    use crate::sync_task;

    #[tokio::test]
    pub async fn bootstraps_from_block_after_creation() {
        let repo = MemoryRepo::new();
        let chain_reader = Arc::new(FakeChainReader::with_stake_contract(STAKE_CREATED_BLOCK + 100));
        let checkpoints = Arc::new(MemoryCheckpointStore::new());
        let task = sync_task(&stake_contract(), &repo, &chain_reader, &checkpoints);

        let outcome = task.tick().await.unwrap();

        let expected_window = Window {
            start: STAKE_CREATED_BLOCK + 1,
            end: STAKE_CREATED_BLOCK + 10,
        };
        assert!(matches!(outcome, TickOutcome::Synced { window, .. } if window == expected_window));
        assert_eq!(
            chain_reader.queried_ranges(),
            vec![(STAKE_CREATED_BLOCK + 1, STAKE_CREATED_BLOCK + 10)]
        );
        assert_eq!(
            checkpoints.height(&stake_source()).await,
            Some(STAKE_CREATED_BLOCK + 10)
        );
    }

    #[tokio::test]
    pub async fn resumes_after_checkpoint() {
        let repo = MemoryRepo::new();
        let chain_reader = Arc::new(FakeChainReader::with_stake_contract(7_000_500));
        let checkpoints = Arc::new(MemoryCheckpointStore::with_height(&stake_source(), 7_000_050).await);
        let task = sync_task(&stake_contract(), &repo, &chain_reader, &checkpoints);

        task.tick().await.unwrap();

        assert_eq!(chain_reader.queried_ranges(), vec![(7_000_051, 7_000_060)]);
        assert_eq!(checkpoints.height(&stake_source()).await, Some(7_000_060));
    }

    #[tokio::test]
    pub async fn clamps_window_to_current_height() {
        let repo = MemoryRepo::new();
        let chain_reader = Arc::new(FakeChainReader::with_stake_contract(105));
        let checkpoints = Arc::new(MemoryCheckpointStore::with_height(&stake_source(), 99).await);
        let task = sync_task(&stake_contract(), &repo, &chain_reader, &checkpoints);

        let outcome = task.tick().await.unwrap();

        assert!(matches!(
            outcome,
            TickOutcome::Synced { window: Window { start: 100, end: 105 }, .. }
        ));
        assert_eq!(checkpoints.height(&stake_source()).await, Some(105));
    }

    #[tokio::test]
    pub async fn idles_until_chain_moves_past_next_block() {
        let repo = MemoryRepo::new();
        let chain_reader = Arc::new(FakeChainReader::with_stake_contract(100));
        let checkpoints = Arc::new(MemoryCheckpointStore::with_height(&stake_source(), 99).await);
        let task = sync_task(&stake_contract(), &repo, &chain_reader, &checkpoints);

        let outcome = task.tick().await.unwrap();

        assert_eq!(outcome, TickOutcome::Idle { start: 100, current: 100 });
        assert!(chain_reader.filters().is_empty());
        assert!(checkpoints.history().await.is_empty());
        assert_eq!(checkpoints.height(&stake_source()).await, Some(99));
    }

    #[tokio::test]
    pub async fn advances_checkpoint_monotonically_without_gaps() {
        let repo = MemoryRepo::new();
        let chain_reader = Arc::new(FakeChainReader::with_stake_contract(STAKE_CREATED_BLOCK + 10));
        let checkpoints = Arc::new(MemoryCheckpointStore::new());
        let task = sync_task(&stake_contract(), &repo, &chain_reader, &checkpoints);

        for current_block in [
            STAKE_CREATED_BLOCK + 10,
            STAKE_CREATED_BLOCK + 14,
            STAKE_CREATED_BLOCK + 14,
            STAKE_CREATED_BLOCK + 40,
            STAKE_CREATED_BLOCK + 41,
        ] {
            chain_reader.set_current_block(current_block);
            task.tick().await.unwrap();
        }

        let ranges = chain_reader.queried_ranges();
        assert_eq!(ranges.first().map(|(from, _)| *from), Some(STAKE_CREATED_BLOCK + 1));
        for pair in ranges.windows(2) {
            let ((_, previous_to), (next_from, _)) = (pair[0], pair[1]);
            assert_eq!(next_from, previous_to + 1);
        }

        let history = checkpoints.history().await;
        assert!(history.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(history.last().copied(), ranges.last().map(|(_, to)| *to));
    }
}

#[cfg(test)]
mod logs {
    use std::sync::Arc;

    use stakesync::TickOutcome;

    use crate::factory::{
        add_pool_log, deposit_log, malformed_add_pool_log, set_meta_node_log, stake_contract,
        stake_source, unknown_log, FakeChainReader,
    };
    use crate::memory::{MemoryCheckpointStore, MemoryRepo};
    use crate::sync_task;

    async fn sync_window(
        logs: Vec<ethers::types::Log>,
    ) -> (MemoryRepo, Arc<MemoryCheckpointStore>, TickOutcome) {
        let repo = MemoryRepo::new();
        let chain_reader = Arc::new(FakeChainReader::with_stake_contract(200).with_logs(logs));
        let checkpoints = Arc::new(MemoryCheckpointStore::with_height(&stake_source(), 99).await);
        let task = sync_task(&stake_contract(), &repo, &chain_reader, &checkpoints);

        let outcome = task.tick().await.unwrap();

        (repo, checkpoints, outcome)
    }

    #[tokio::test]
    pub async fn records_raw_events_in_order() {
        let (repo, _checkpoints, _outcome) = sync_window(vec![
            add_pool_log(100, 1),
            deposit_log(101, 2),
            deposit_log(105, 3),
        ])
        .await;

        let raw_events = repo.raw_events().await;
        let names: Vec<_> = raw_events.iter().map(|e| e.event_name.as_str()).collect();
        assert_eq!(names, vec!["AddPool", "Deposit", "Deposit"]);

        let add_pool = &raw_events[0];
        assert_eq!(add_pool.chain_id as u64, stake_source().chain_id);
        assert_eq!(add_pool.contract_address, stake_source().contract_address);
        assert_eq!(add_pool.block_number, 100);
        assert_eq!(
            add_pool.block_timestamp as u64,
            crate::factory::block_timestamp(100)
        );
        assert!(add_pool.topic3.is_some());
        assert!(add_pool.data.starts_with("0x"));
    }

    #[tokio::test]
    pub async fn skips_unknown_event_signatures() {
        let (repo, checkpoints, outcome) =
            sync_window(vec![unknown_log(100, 1), add_pool_log(101, 2)]).await;

        let raw_events = repo.raw_events().await;
        assert_eq!(raw_events.len(), 1);
        assert_eq!(raw_events[0].event_name, "AddPool");

        let TickOutcome::Synced { summary, .. } = outcome else {
            panic!("expected a synced window");
        };
        assert_eq!(summary.unrecognized, 1);
        assert_eq!(summary.synced, 1);
        assert_eq!(summary.failed, 0);
        assert_eq!(checkpoints.height(&stake_source()).await, Some(109));
    }

    #[tokio::test]
    pub async fn records_raw_event_of_events_without_handler() {
        let (repo, _checkpoints, outcome) = sync_window(vec![set_meta_node_log(100, 1)]).await;

        let raw_events = repo.raw_events().await;
        assert_eq!(raw_events.len(), 1);
        assert_eq!(raw_events[0].event_name, "SetMetaNode");
        assert!(repo.pools().await.is_empty());
        assert!(matches!(outcome, TickOutcome::Synced { summary, .. } if summary.synced == 1));
    }

    #[tokio::test]
    pub async fn rolls_back_only_the_failing_log() {
        let (repo, checkpoints, outcome) = sync_window(vec![
            add_pool_log(100, 1),
            add_pool_log(101, 2),
            malformed_add_pool_log(102, 3),
            add_pool_log(103, 4),
            add_pool_log(104, 5),
        ])
        .await;

        let raw_events = repo.raw_events().await;
        assert_eq!(raw_events.len(), 4);
        assert!(raw_events.iter().all(|raw_event| raw_event.block_number != 102));
        assert_eq!(repo.pools().await.len(), 4);

        let TickOutcome::Synced { summary, window } = outcome else {
            panic!("expected a synced window");
        };
        assert_eq!(summary.synced, 4);
        assert_eq!(summary.failed, 1);
        assert_eq!(checkpoints.height(&stake_source()).await, Some(window.end));
    }

    #[tokio::test]
    pub async fn syncs_each_transaction_once() {
        let repo = MemoryRepo::new();
        let logs = vec![add_pool_log(100, 1), deposit_log(102, 2)];
        let chain_reader = Arc::new(FakeChainReader::with_stake_contract(200).with_logs(logs));
        let checkpoints = Arc::new(MemoryCheckpointStore::with_height(&stake_source(), 99).await);
        let task = sync_task(&stake_contract(), &repo, &chain_reader, &checkpoints);

        task.tick().await.unwrap();
        checkpoints.rewind(&stake_source(), 99).await;
        let outcome = task.tick().await.unwrap();

        assert_eq!(repo.raw_events().await.len(), 2);
        assert_eq!(repo.pools().await.len(), 1);
        assert!(matches!(
            outcome,
            TickOutcome::Synced { summary, .. } if summary.already_synced == 2 && summary.synced == 0
        ));
    }
}

#[cfg(test)]
mod idempotency_keys {
    use std::sync::Arc;

    use ethers::types::U256;
    use stakesync::{Config, IdempotencyKey};

    use crate::factory::{
        deposit_log, stake_contract, stake_source, tx_hash, FakeChainReader,
    };
    use crate::memory::{MemoryCheckpointStore, MemoryRepo};
    use crate::sync_task_with_config;

    async fn sync_two_logs_of_one_transaction(idempotency_key: IdempotencyKey) -> usize {
        let mut second_log = deposit_log(100, 2);
        second_log.transaction_hash = Some(tx_hash(1));
        second_log.log_index = Some(U256::from(7));
        let logs = vec![deposit_log(100, 1), second_log];

        let repo = MemoryRepo::new();
        let chain_reader = Arc::new(FakeChainReader::with_stake_contract(200).with_logs(logs));
        let checkpoints = Arc::new(MemoryCheckpointStore::with_height(&stake_source(), 99).await);
        let config = Config::new().with_idempotency_key(idempotency_key);
        let task = sync_task_with_config(&stake_contract(), &repo, &chain_reader, &checkpoints, &config);

        task.tick().await.unwrap();

        repo.raw_events().await.len()
    }

    #[tokio::test]
    pub async fn keeps_first_log_of_a_transaction_by_default() {
        assert_eq!(
            sync_two_logs_of_one_transaction(IdempotencyKey::TransactionHash).await,
            1
        );
    }

    #[tokio::test]
    pub async fn keeps_every_log_when_keyed_by_log_index() {
        assert_eq!(
            sync_two_logs_of_one_transaction(IdempotencyKey::TransactionHashAndLogIndex).await,
            2
        );
    }
}

#[cfg(test)]
mod failures {
    use std::sync::Arc;
    use std::time::Duration;

    use stakesync::{CheckpointError, Config, Contract, SyncError, SyncTask, TickOutcome};

    use crate::factory::{
        add_pool_log, stake_contract, stake_source, FakeChainReader, STAKE_ABI,
        STAKE_CREATED_TX_HASH,
    };
    use crate::memory::{MemoryCheckpointStore, MemoryRepo};
    use crate::{sync_task, sync_task_with_config};

    #[tokio::test]
    pub async fn leaves_checkpoint_when_chain_reader_fails() {
        let repo = MemoryRepo::new();
        let chain_reader =
            Arc::new(FakeChainReader::with_stake_contract(200).with_logs(vec![add_pool_log(100, 1)]));
        let checkpoints = Arc::new(MemoryCheckpointStore::with_height(&stake_source(), 99).await);
        let task = sync_task(&stake_contract(), &repo, &chain_reader, &checkpoints);

        chain_reader.fail_get_logs(true);
        assert!(matches!(task.tick().await, Err(SyncError::ChainReader(_))));
        assert!(checkpoints.history().await.is_empty());
        assert!(repo.raw_events().await.is_empty());

        chain_reader.fail_get_logs(false);
        task.tick().await.unwrap();
        assert_eq!(chain_reader.queried_ranges(), vec![(100, 109), (100, 109)]);
        assert_eq!(checkpoints.height(&stake_source()).await, Some(109));
        assert_eq!(repo.raw_events().await.len(), 1);
    }

    #[tokio::test]
    pub async fn retries_window_when_checkpoint_cannot_be_stored() {
        let repo = MemoryRepo::new();
        let chain_reader =
            Arc::new(FakeChainReader::with_stake_contract(200).with_logs(vec![add_pool_log(100, 1)]));
        let checkpoints = Arc::new(MemoryCheckpointStore::with_height(&stake_source(), 99).await);
        let task = sync_task(&stake_contract(), &repo, &chain_reader, &checkpoints);

        checkpoints.fail_set_height(true);
        assert!(matches!(
            task.tick().await,
            Err(SyncError::Checkpoint(CheckpointError::Redis(_)))
        ));
        assert_eq!(checkpoints.height(&stake_source()).await, Some(99));
        assert_eq!(repo.raw_events().await.len(), 1);

        checkpoints.fail_set_height(false);
        let Ok(TickOutcome::Synced { summary, .. }) = task.tick().await else {
            panic!("expected the window to be synced again");
        };
        assert_eq!(summary.synced, 0);
        assert_eq!(summary.already_synced, 1);
        assert_eq!(chain_reader.queried_ranges(), vec![(100, 109), (100, 109)]);
        assert_eq!(checkpoints.height(&stake_source()).await, Some(109));
        assert_eq!(repo.raw_events().await.len(), 1);
        assert_eq!(repo.pools().await.len(), 1);
    }

    #[tokio::test]
    pub async fn rejects_checkpoints_without_a_next_block() {
        let repo = MemoryRepo::new();
        let chain_reader = Arc::new(FakeChainReader::with_stake_contract(200));
        let checkpoints =
            Arc::new(MemoryCheckpointStore::with_height(&stake_source(), u64::MAX).await);
        let task = sync_task(&stake_contract(), &repo, &chain_reader, &checkpoints);

        assert!(matches!(
            task.tick().await,
            Err(SyncError::Checkpoint(CheckpointError::Invalid { .. }))
        ));
        assert!(chain_reader.filters().is_empty());
        assert!(checkpoints.history().await.is_empty());
    }

    #[tokio::test]
    pub async fn fails_bootstrap_without_creation_receipt() {
        let repo = MemoryRepo::new();
        let chain_reader = Arc::new(FakeChainReader::new(200));
        let checkpoints = Arc::new(MemoryCheckpointStore::new());
        let task = sync_task(&stake_contract(), &repo, &chain_reader, &checkpoints);

        assert!(matches!(task.tick().await, Err(SyncError::MissingReceipt(_))));
        assert!(chain_reader.filters().is_empty());
        assert!(checkpoints.history().await.is_empty());
    }

    #[tokio::test]
    pub async fn abandons_ticks_past_their_deadline() {
        let repo = MemoryRepo::new();
        let chain_reader = Arc::new(
            FakeChainReader::with_stake_contract(200).with_get_logs_delay(Duration::from_millis(500)),
        );
        let checkpoints = Arc::new(MemoryCheckpointStore::with_height(&stake_source(), 99).await);
        let config = Config::new().with_tick_timeout_ms(20);
        let task = sync_task_with_config(&stake_contract(), &repo, &chain_reader, &checkpoints, &config);

        assert!(matches!(task.tick().await, Err(SyncError::Timeout(20))));
        assert!(checkpoints.history().await.is_empty());
    }

    #[tokio::test]
    pub async fn rejects_unparseable_abis() {
        let contract = Contract::new("Broken", stake_source(), "[{", STAKE_CREATED_TX_HASH);

        let task = SyncTask::new(
            &contract,
            MemoryRepo::new(),
            Arc::new(FakeChainReader::new(0)),
            Arc::new(MemoryCheckpointStore::new()),
            &Config::new(),
        );

        assert!(matches!(task, Err(SyncError::InvalidContract(_))));
    }

    #[tokio::test]
    pub async fn rejects_invalid_creation_transaction_hashes() {
        let contract = Contract::new("Stake", stake_source(), STAKE_ABI, "0x1234");

        let task = SyncTask::new(
            &contract,
            MemoryRepo::new(),
            Arc::new(FakeChainReader::new(0)),
            Arc::new(MemoryCheckpointStore::new()),
            &Config::new(),
        );

        assert!(matches!(task, Err(SyncError::InvalidContract(_))));
    }
}

#[cfg(test)]
mod running {
    use std::sync::Arc;
    use std::time::Duration;

    use stakesync::{Config, StakeSyncError};
    use tokio_util::sync::CancellationToken;

    use crate::factory::{add_pool_log, stake_contract, stake_source, FakeChainReader};
    use crate::memory::{MemoryCheckpointStore, MemoryRepo};

    #[tokio::test]
    pub async fn syncs_until_cancelled() {
        let repo = MemoryRepo::new();
        let chain_reader =
            Arc::new(FakeChainReader::with_stake_contract(130).with_logs(vec![add_pool_log(125, 1)]));
        let checkpoints = Arc::new(MemoryCheckpointStore::with_height(&stake_source(), 99).await);
        let config = Config::new()
            .add_contract(stake_contract())
            .with_poll_interval_ms(5);
        let cancellation_token = CancellationToken::new();

        let handles = stakesync::start(
            &config,
            &repo,
            checkpoints.clone(),
            |_contract| Ok(chain_reader.clone()),
            &cancellation_token,
        )
        .unwrap();

        tokio::time::timeout(Duration::from_secs(5), async {
            while checkpoints.height(&stake_source()).await != Some(129) {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();

        cancellation_token.cancel();
        for handle in handles {
            tokio::time::timeout(Duration::from_secs(5), handle)
                .await
                .unwrap()
                .unwrap();
        }

        assert_eq!(repo.raw_events().await.len(), 1);
        assert_eq!(repo.pools().await.len(), 1);
    }

    #[tokio::test]
    pub async fn refuses_to_start_without_contracts() {
        let chain_reader = Arc::new(FakeChainReader::new(0));

        let started = stakesync::start(
            &Config::new(),
            &MemoryRepo::new(),
            Arc::new(MemoryCheckpointStore::new()),
            |_contract| Ok(chain_reader.clone()),
            &CancellationToken::new(),
        );

        assert!(matches!(started, Err(StakeSyncError::Config(_))));
    }
}
