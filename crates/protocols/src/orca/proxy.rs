//! Instruction builders for the Whirlpool proxy program.
//!
//! Every proxy method takes the Whirlpool program as its first account and
//! forwards the remaining accounts to the matching Whirlpool instruction.

use super::pda;
use super::whirlpool::{Position, Whirlpool};
use crate::anchor::instruction_data;
use crate::error::ProtocolError;
use crate::programs::{
    ASSOCIATED_TOKEN_PROGRAM_ID, RENT_SYSVAR_ID, SYSTEM_PROGRAM_ID, TOKEN_PROGRAM_ID,
    WHIRLPOOL_PROGRAM_ID, WHIRLPOOL_PROXY_PROGRAM_ID,
};
use crate::spl::get_associated_token_address;
use borsh::BorshSerialize;
use moai_domain::math::tick_array::MAX_SWAP_TICK_ARRAYS;
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};

pub const PROXY_INITIALIZE_POOL_DISCRIMINATOR: [u8; 8] = [173, 5, 238, 44, 102, 188, 177, 139];
pub const PROXY_INITIALIZE_TICK_ARRAY_DISCRIMINATOR: [u8; 8] = [37, 104, 240, 164, 91, 224, 116, 237];
pub const PROXY_OPEN_POSITION_DISCRIMINATOR: [u8; 8] = [132, 25, 14, 151, 120, 136, 194, 196];
pub const PROXY_INCREASE_LIQUIDITY_DISCRIMINATOR: [u8; 8] = [226, 97, 26, 222, 75, 125, 88, 92];
pub const PROXY_SWAP_DISCRIMINATOR: [u8; 8] = [19, 44, 130, 148, 72, 56, 44, 238];
pub const PROXY_UPDATE_FEES_AND_REWARDS_DISCRIMINATOR: [u8; 8] = [66, 159, 203, 74, 240, 23, 234, 77];
pub const PROXY_COLLECT_FEES_DISCRIMINATOR: [u8; 8] = [153, 243, 249, 250, 63, 227, 141, 231];

#[derive(BorshSerialize)]
struct InitializePoolArgs {
    tick_spacing: u16,
    initial_sqrt_price: u128,
}

#[derive(BorshSerialize)]
struct InitializeTickArrayArgs {
    start_tick_index: i32,
}

#[derive(BorshSerialize)]
struct OpenPositionArgs {
    tick_lower_index: i32,
    tick_upper_index: i32,
}

#[derive(BorshSerialize)]
struct IncreaseLiquidityArgs {
    liquidity: u128,
    token_max_a: u64,
    token_max_b: u64,
}

/// Arguments of `proxy_swap`.
#[derive(BorshSerialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapParams {
    pub amount: u64,
    /// Minimum output for exact-in swaps, maximum input for exact-out swaps.
    pub other_amount_threshold: u64,
    pub sqrt_price_limit: u128,
    pub amount_specified_is_input: bool,
    pub a_to_b: bool,
}

/// Accounts of `proxy_initialize_pool`.
#[derive(Debug, Clone, Copy)]
pub struct InitializePoolAccounts {
    pub whirlpools_config: Pubkey,
    pub token_mint_a: Pubkey,
    pub token_mint_b: Pubkey,
    pub funder: Pubkey,
    pub whirlpool: Pubkey,
    /// Fresh keypair, signs.
    pub token_vault_a: Pubkey,
    /// Fresh keypair, signs.
    pub token_vault_b: Pubkey,
    pub fee_tier: Pubkey,
}

/// Accounts of `proxy_open_position`.
#[derive(Debug, Clone, Copy)]
pub struct OpenPositionAccounts {
    pub funder: Pubkey,
    pub owner: Pubkey,
    pub position: Pubkey,
    /// Fresh keypair, signs.
    pub position_mint: Pubkey,
    pub position_token_account: Pubkey,
    pub whirlpool: Pubkey,
}

/// Accounts shared by the liquidity and fee instructions of one position.
#[derive(Debug, Clone, Copy)]
pub struct PositionAccounts {
    pub whirlpool: Pubkey,
    pub position_authority: Pubkey,
    pub position: Pubkey,
    pub position_token_account: Pubkey,
    pub token_owner_account_a: Pubkey,
    pub token_owner_account_b: Pubkey,
    pub token_vault_a: Pubkey,
    pub token_vault_b: Pubkey,
    pub tick_array_lower: Pubkey,
    pub tick_array_upper: Pubkey,
}

/// Accounts of `proxy_swap`.
#[derive(Debug, Clone, Copy)]
pub struct SwapAccounts {
    pub token_authority: Pubkey,
    pub whirlpool: Pubkey,
    pub token_owner_account_a: Pubkey,
    pub token_vault_a: Pubkey,
    pub token_owner_account_b: Pubkey,
    pub token_vault_b: Pubkey,
    pub tick_arrays: [Pubkey; MAX_SWAP_TICK_ARRAYS],
    pub oracle: Pubkey,
}

/// Builder for proxy instructions.
#[derive(Debug, Clone, Copy)]
pub struct WhirlpoolProxy {
    /// Proxy program ID.
    pub program_id: Pubkey,
    /// Whirlpool program the proxy forwards to.
    pub whirlpool_program_id: Pubkey,
}

impl Default for WhirlpoolProxy {
    fn default() -> Self {
        Self::new(WHIRLPOOL_PROXY_PROGRAM_ID, WHIRLPOOL_PROGRAM_ID)
    }
}

impl WhirlpoolProxy {
    pub fn new(program_id: Pubkey, whirlpool_program_id: Pubkey) -> Self {
        Self {
            program_id,
            whirlpool_program_id,
        }
    }

    /// Derives the accounts of a new pool. Mints must already be ordered.
    #[allow(clippy::too_many_arguments)]
    pub fn initialize_pool_accounts(
        &self,
        whirlpools_config: Pubkey,
        token_mint_a: Pubkey,
        token_mint_b: Pubkey,
        funder: Pubkey,
        token_vault_a: Pubkey,
        token_vault_b: Pubkey,
        tick_spacing: u16,
    ) -> InitializePoolAccounts {
        let program = &self.whirlpool_program_id;
        InitializePoolAccounts {
            whirlpools_config,
            token_mint_a,
            token_mint_b,
            funder,
            whirlpool: pda::whirlpool_address(program, &whirlpools_config, &token_mint_a, &token_mint_b, tick_spacing).0,
            token_vault_a,
            token_vault_b,
            fee_tier: pda::fee_tier_address(program, &whirlpools_config, tick_spacing).0,
        }
    }

    /// Derives the accounts of a position minted to `owner`.
    pub fn open_position_accounts(
        &self,
        whirlpool: Pubkey,
        funder: Pubkey,
        owner: Pubkey,
        position_mint: Pubkey,
    ) -> OpenPositionAccounts {
        OpenPositionAccounts {
            funder,
            owner,
            position: pda::position_address(&self.whirlpool_program_id, &position_mint).0,
            position_mint,
            position_token_account: get_associated_token_address(&owner, &position_mint),
            whirlpool,
        }
    }

    /// Derives the accounts for managing `position` with `owner`'s associated
    /// token accounts.
    pub fn position_accounts(
        &self,
        whirlpool_address: Pubkey,
        whirlpool: &Whirlpool,
        position_address: Pubkey,
        position: &Position,
        owner: Pubkey,
    ) -> Result<PositionAccounts, ProtocolError> {
        let program = &self.whirlpool_program_id;
        let (tick_array_lower, _) = pda::tick_array_from_tick_index(
            program,
            &whirlpool_address,
            position.tick_lower_index,
            whirlpool.tick_spacing,
            0,
        )?;
        let (tick_array_upper, _) = pda::tick_array_from_tick_index(
            program,
            &whirlpool_address,
            position.tick_upper_index,
            whirlpool.tick_spacing,
            0,
        )?;

        Ok(PositionAccounts {
            whirlpool: whirlpool_address,
            position_authority: owner,
            position: position_address,
            position_token_account: get_associated_token_address(&owner, &position.position_mint),
            token_owner_account_a: get_associated_token_address(&owner, &whirlpool.token_mint_a),
            token_owner_account_b: get_associated_token_address(&owner, &whirlpool.token_mint_b),
            token_vault_a: whirlpool.token_vault_a,
            token_vault_b: whirlpool.token_vault_b,
            tick_array_lower,
            tick_array_upper,
        })
    }

    /// Derives the swap accounts from the pool's current tick.
    pub fn swap_accounts(
        &self,
        whirlpool_address: Pubkey,
        whirlpool: &Whirlpool,
        owner: Pubkey,
        a_to_b: bool,
    ) -> Result<SwapAccounts, ProtocolError> {
        let program = &self.whirlpool_program_id;
        let tick_arrays = pda::swap_tick_arrays(
            program,
            &whirlpool_address,
            whirlpool.tick_current_index,
            whirlpool.tick_spacing,
            a_to_b,
        )?;

        Ok(SwapAccounts {
            token_authority: owner,
            whirlpool: whirlpool_address,
            token_owner_account_a: get_associated_token_address(&owner, &whirlpool.token_mint_a),
            token_vault_a: whirlpool.token_vault_a,
            token_owner_account_b: get_associated_token_address(&owner, &whirlpool.token_mint_b),
            token_vault_b: whirlpool.token_vault_b,
            tick_arrays,
            oracle: pda::oracle_address(program, &whirlpool_address).0,
        })
    }

    pub fn initialize_pool(
        &self,
        accounts: &InitializePoolAccounts,
        tick_spacing: u16,
        initial_sqrt_price: u128,
    ) -> Result<Instruction, ProtocolError> {
        let args = InitializePoolArgs {
            tick_spacing,
            initial_sqrt_price,
        };
        let data = instruction_data("proxy_initialize_pool", PROXY_INITIALIZE_POOL_DISCRIMINATOR, &args)?;
        Ok(self.instruction(
            vec![
                AccountMeta::new_readonly(accounts.whirlpools_config, false), // whirlpools_config
                AccountMeta::new_readonly(accounts.token_mint_a, false),      // token_mint_a
                AccountMeta::new_readonly(accounts.token_mint_b, false),      // token_mint_b
                AccountMeta::new(accounts.funder, true),                      // funder
                AccountMeta::new(accounts.whirlpool, false),                  // whirlpool
                AccountMeta::new(accounts.token_vault_a, true),               // token_vault_a
                AccountMeta::new(accounts.token_vault_b, true),               // token_vault_b
                AccountMeta::new_readonly(accounts.fee_tier, false),          // fee_tier
                AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),           // token_program
                AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),          // system_program
                AccountMeta::new_readonly(RENT_SYSVAR_ID, false),             // rent
            ],
            data,
        ))
    }

    pub fn initialize_tick_array(
        &self,
        whirlpool: &Pubkey,
        funder: &Pubkey,
        start_tick_index: i32,
    ) -> Result<Instruction, ProtocolError> {
        let (tick_array, _) = pda::tick_array_address(&self.whirlpool_program_id, whirlpool, start_tick_index);
        let data = instruction_data(
            "proxy_initialize_tick_array",
            PROXY_INITIALIZE_TICK_ARRAY_DISCRIMINATOR,
            &InitializeTickArrayArgs { start_tick_index },
        )?;
        Ok(self.instruction(
            vec![
                AccountMeta::new_readonly(*whirlpool, false),        // whirlpool
                AccountMeta::new(*funder, true),                     // funder
                AccountMeta::new(tick_array, false),                 // tick_array
                AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false), // system_program
            ],
            data,
        ))
    }

    pub fn open_position(
        &self,
        accounts: &OpenPositionAccounts,
        tick_lower_index: i32,
        tick_upper_index: i32,
    ) -> Result<Instruction, ProtocolError> {
        let args = OpenPositionArgs {
            tick_lower_index,
            tick_upper_index,
        };
        let data = instruction_data("proxy_open_position", PROXY_OPEN_POSITION_DISCRIMINATOR, &args)?;
        Ok(self.instruction(
            vec![
                AccountMeta::new(accounts.funder, true),                       // funder
                AccountMeta::new_readonly(accounts.owner, false),              // owner
                AccountMeta::new(accounts.position, false),                    // position
                AccountMeta::new(accounts.position_mint, true),                // position_mint
                AccountMeta::new(accounts.position_token_account, false),      // position_token_account
                AccountMeta::new_readonly(accounts.whirlpool, false),          // whirlpool
                AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),            // token_program
                AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),           // system_program
                AccountMeta::new_readonly(RENT_SYSVAR_ID, false),              // rent
                AccountMeta::new_readonly(ASSOCIATED_TOKEN_PROGRAM_ID, false), // associated_token_program
            ],
            data,
        ))
    }

    pub fn increase_liquidity(
        &self,
        accounts: &PositionAccounts,
        liquidity: u128,
        token_max_a: u64,
        token_max_b: u64,
    ) -> Result<Instruction, ProtocolError> {
        let args = IncreaseLiquidityArgs {
            liquidity,
            token_max_a,
            token_max_b,
        };
        let data = instruction_data(
            "proxy_increase_liquidity",
            PROXY_INCREASE_LIQUIDITY_DISCRIMINATOR,
            &args,
        )?;
        Ok(self.instruction(
            vec![
                AccountMeta::new(accounts.whirlpool, false),                       // whirlpool
                AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),                // token_program
                AccountMeta::new_readonly(accounts.position_authority, true),      // position_authority
                AccountMeta::new(accounts.position, false),                        // position
                AccountMeta::new_readonly(accounts.position_token_account, false), // position_token_account
                AccountMeta::new(accounts.token_owner_account_a, false),           // token_owner_account_a
                AccountMeta::new(accounts.token_owner_account_b, false),           // token_owner_account_b
                AccountMeta::new(accounts.token_vault_a, false),                   // token_vault_a
                AccountMeta::new(accounts.token_vault_b, false),                   // token_vault_b
                AccountMeta::new(accounts.tick_array_lower, false),                // tick_array_lower
                AccountMeta::new(accounts.tick_array_upper, false),                // tick_array_upper
            ],
            data,
        ))
    }

    pub fn swap(&self, accounts: &SwapAccounts, params: &SwapParams) -> Result<Instruction, ProtocolError> {
        let data = instruction_data("proxy_swap", PROXY_SWAP_DISCRIMINATOR, params)?;
        let [tick_array_0, tick_array_1, tick_array_2] = accounts.tick_arrays;
        Ok(self.instruction(
            vec![
                AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),         // token_program
                AccountMeta::new_readonly(accounts.token_authority, true),  // token_authority
                AccountMeta::new(accounts.whirlpool, false),                // whirlpool
                AccountMeta::new(accounts.token_owner_account_a, false),    // token_owner_account_a
                AccountMeta::new(accounts.token_vault_a, false),            // token_vault_a
                AccountMeta::new(accounts.token_owner_account_b, false),    // token_owner_account_b
                AccountMeta::new(accounts.token_vault_b, false),            // token_vault_b
                AccountMeta::new(tick_array_0, false),                      // tick_array_0
                AccountMeta::new(tick_array_1, false),                      // tick_array_1
                AccountMeta::new(tick_array_2, false),                      // tick_array_2
                AccountMeta::new_readonly(accounts.oracle, false),          // oracle
            ],
            data,
        ))
    }

    pub fn update_fees_and_rewards(&self, accounts: &PositionAccounts) -> Instruction {
        self.instruction(
            vec![
                AccountMeta::new(accounts.whirlpool, false),                 // whirlpool
                AccountMeta::new(accounts.position, false),                  // position
                AccountMeta::new_readonly(accounts.tick_array_lower, false), // tick_array_lower
                AccountMeta::new_readonly(accounts.tick_array_upper, false), // tick_array_upper
            ],
            PROXY_UPDATE_FEES_AND_REWARDS_DISCRIMINATOR.to_vec(),
        )
    }

    pub fn collect_fees(&self, accounts: &PositionAccounts) -> Instruction {
        self.instruction(
            vec![
                AccountMeta::new_readonly(accounts.whirlpool, false),              // whirlpool
                AccountMeta::new_readonly(accounts.position_authority, true),      // position_authority
                AccountMeta::new(accounts.position, false),                        // position
                AccountMeta::new_readonly(accounts.position_token_account, false), // position_token_account
                AccountMeta::new(accounts.token_owner_account_a, false),           // token_owner_account_a
                AccountMeta::new(accounts.token_vault_a, false),                   // token_vault_a
                AccountMeta::new(accounts.token_owner_account_b, false),           // token_owner_account_b
                AccountMeta::new(accounts.token_vault_b, false),                   // token_vault_b
                AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),                // token_program
            ],
            PROXY_COLLECT_FEES_DISCRIMINATOR.to_vec(),
        )
    }

    /// Prepends the Whirlpool program account.
    fn instruction(&self, accounts: Vec<AccountMeta>, data: Vec<u8>) -> Instruction {
        let mut metas = Vec::with_capacity(accounts.len() + 1);
        metas.push(AccountMeta::new_readonly(self.whirlpool_program_id, false)); // whirlpool_program
        metas.extend(accounts);
        Instruction {
            program_id: self.program_id,
            accounts: metas,
            data,
        }
    }
}
