//! Whirlpool state reader.

use super::pda;
use super::whirlpool::{Position, TickArray, Whirlpool};
use crate::AccountFetcher;
use crate::anchor::{fetch_account, fetch_account_opt};
use crate::error::ProtocolError;
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use tracing::debug;

/// Reads Whirlpool accounts through an [`AccountFetcher`].
pub struct WhirlpoolReader<F: AccountFetcher> {
    fetcher: Arc<F>,
    program_id: Pubkey,
}

impl<F: AccountFetcher> WhirlpoolReader<F> {
    pub fn new(fetcher: Arc<F>, program_id: Pubkey) -> Self {
        Self { fetcher, program_id }
    }

    pub async fn get_whirlpool(&self, address: &Pubkey) -> Result<Whirlpool, ProtocolError> {
        debug!(pool = %address, "Fetching whirlpool");
        fetch_account(self.fetcher.as_ref(), address).await
    }

    pub async fn get_position(&self, address: &Pubkey) -> Result<Position, ProtocolError> {
        debug!(position = %address, "Fetching position");
        fetch_account(self.fetcher.as_ref(), address).await
    }

    /// Position by its mint.
    pub async fn get_position_by_mint(&self, position_mint: &Pubkey) -> Result<Position, ProtocolError> {
        let (address, _) = pda::position_address(&self.program_id, position_mint);
        self.get_position(&address).await
    }

    pub async fn get_tick_array(&self, address: &Pubkey) -> Result<TickArray, ProtocolError> {
        fetch_account(self.fetcher.as_ref(), address).await
    }

    /// Tick array of `whirlpool` starting at `start_tick_index`, `None` when
    /// it has not been initialized.
    pub async fn find_tick_array(
        &self,
        whirlpool: &Pubkey,
        start_tick_index: i32,
    ) -> Result<Option<TickArray>, ProtocolError> {
        let (address, _) = pda::tick_array_address(&self.program_id, whirlpool, start_tick_index);
        fetch_account_opt(self.fetcher.as_ref(), &address).await
    }

    /// Tick array holding the pool's current tick.
    pub async fn current_tick_array(
        &self,
        whirlpool_address: &Pubkey,
        whirlpool: &Whirlpool,
    ) -> Result<TickArray, ProtocolError> {
        let (address, start) = pda::tick_array_from_tick_index(
            &self.program_id,
            whirlpool_address,
            whirlpool.tick_current_index,
            whirlpool.tick_spacing,
            0,
        )?;
        debug!(pool = %whirlpool_address, start, "Fetching current tick array");
        self.get_tick_array(&address).await
    }
}
