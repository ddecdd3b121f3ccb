pub mod schema {
    diesel::table! {
      contract_events (id) {
          id -> Int8,
          chain_id -> Int8,
          contract_address -> VarChar,
          event_name -> VarChar,
          topic0 -> VarChar,
          topic1 -> Nullable<VarChar>,
          topic2 -> Nullable<VarChar>,
          topic3 -> Nullable<VarChar>,
          data -> Text,
          block_number -> Int8,
          block_timestamp -> Int8,
          transaction_hash -> VarChar,
          log_index -> Int4,
          inserted_at -> Timestamptz,
      }
    }

    diesel::table! {
      pool_info (id) {
          id -> Int8,
          pool_id -> Int4,
          contract_address -> VarChar,
          st_token_address -> VarChar,
          pool_weight -> Float8,
          last_reward_block -> Int8,
          min_deposit_amount -> Float8,
          unstake_locked_blocks -> Int4,
          is_active -> Bool,
          created_block -> Int8,
          created_tx -> VarChar,
          created_at -> Timestamptz,
      }
    }

    diesel::table! {
      chain_contracts (id) {
          id -> Int4,
          chain_id -> Int8,
          contract_name -> VarChar,
          abi -> Text,
          contract_address -> VarChar,
          created_tx_hash -> VarChar,
      }
    }

    diesel::table! {
      chain_endpoints (id) {
          id -> Int4,
          chain_id -> Int8,
          url -> VarChar,
      }
    }
}
