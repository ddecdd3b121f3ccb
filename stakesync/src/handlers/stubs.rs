use tracing::debug;

use super::{EventHandler, HandlerContext, HandlerError};
use crate::repos::RepoTxn;

macro_rules! stub_handler {
    ($(#[$meta:meta])* $handler:ident, $event_name:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $handler;

        #[async_trait::async_trait]
        impl EventHandler for $handler {
            fn event_name(&self) -> &'static str {
                $event_name
            }

            async fn handle_event<'a>(
                &self,
                _txn: &mut dyn RepoTxn,
                context: HandlerContext<'a>,
            ) -> Result<(), HandlerError> {
                debug!(
                    event = $event_name,
                    source = %context.source,
                    tx_hash = ?context.log.transaction_hash,
                    "no decoded table for event, raw event only"
                );

                Ok(())
            }
        }
    };
}

stub_handler!(
    /// Records `Deposit` through the raw event ledger only
    DepositHandler,
    "Deposit"
);
stub_handler!(ClaimHandler, "Claim");
stub_handler!(RequestUnstakeHandler, "RequestUnstake");
stub_handler!(WithdrawHandler, "Withdraw");
