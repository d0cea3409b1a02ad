//! Transaction building and sending.
//!
//! A [`TransactionBuilder`] collects instruction sets, each with the extra
//! keypairs that must sign it, and sends them as one transaction paid by the
//! wallet.

use crate::error::ScenarioError;
use moai_protocols::ProtocolError;
use moai_protocols::rpc::{RpcProvider, build_signed_transaction};
use serde::{Deserialize, Serialize};
use solana_sdk::{
    hash::Hash,
    instruction::Instruction,
    signature::{Signature, Signer},
    transaction::Transaction,
};
use tracing::{debug, info, warn};

/// Result of a sent transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionResult {
    /// What the transaction did.
    pub label: String,
    /// Transaction signature.
    pub signature: Signature,
    /// Slot observed after confirmation, `None` when the lookup failed.
    pub slot: Option<u64>,
}

/// Instructions plus the keypairs they need besides the payer.
struct InstructionSet<'a> {
    instructions: Vec<Instruction>,
    signers: Vec<&'a dyn Signer>,
}

/// Builder for a single transaction.
pub struct TransactionBuilder<'a> {
    label: String,
    payer: &'a dyn Signer,
    sets: Vec<InstructionSet<'a>>,
}

impl<'a> TransactionBuilder<'a> {
    pub fn new(label: impl Into<String>, payer: &'a dyn Signer) -> Self {
        Self {
            label: label.into(),
            payer,
            sets: Vec::new(),
        }
    }

    /// Adds instructions signed by `signers` in addition to the payer.
    #[must_use]
    pub fn add_instructions(mut self, instructions: Vec<Instruction>, signers: Vec<&'a dyn Signer>) -> Self {
        self.sets.push(InstructionSet {
            instructions,
            signers,
        });
        self
    }

    /// Adds a single instruction signed by the payer only.
    #[must_use]
    pub fn add_instruction(self, instruction: Instruction) -> Self {
        self.add_instructions(vec![instruction], Vec::new())
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_empty(&self) -> bool {
        self.sets.iter().all(|set| set.instructions.is_empty())
    }

    /// All instructions in insertion order.
    pub fn instructions(&self) -> Vec<Instruction> {
        self.sets
            .iter()
            .flat_map(|set| set.instructions.iter().cloned())
            .collect()
    }

    fn signers(&self) -> Vec<&'a dyn Signer> {
        self.sets.iter().flat_map(|set| set.signers.iter().copied()).collect()
    }

    /// Signs the transaction against `recent_blockhash` without sending it.
    pub fn build(&self, recent_blockhash: Hash) -> Result<Transaction, ScenarioError> {
        Ok(build_signed_transaction(
            &self.instructions(),
            self.payer,
            &self.signers(),
            recent_blockhash,
        )?)
    }

    /// Signs with a fresh blockhash, sends and waits for confirmation.
    pub async fn execute(self, provider: &RpcProvider) -> Result<TransactionResult, ScenarioError> {
        let instructions = self.instructions();
        debug!(
            label = %self.label,
            instructions = instructions.len(),
            "Sending transaction"
        );

        let signature = provider
            .send_instructions(&instructions, self.payer, &self.signers())
            .await?;
        let slot = observed_slot(&self.label, provider.get_slot().await);
        info!(label = %self.label, signature = %signature, slot = ?slot, "Transaction confirmed");

        Ok(TransactionResult {
            label: self.label,
            signature,
            slot,
        })
    }
}

/// Keeps the slot read after a confirmed send. A failed read is logged and
/// does not fail the transaction.
fn observed_slot(label: &str, slot: Result<u64, ProtocolError>) -> Option<u64> {
    match slot {
        Ok(slot) => Some(slot),
        Err(error) => {
            warn!(label, error = %error, "Could not read slot after confirmation");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moai_protocols::spl;
    use solana_sdk::signature::Keypair;

    #[test]
    fn test_collects_sets_in_order() {
        let payer = Keypair::new();
        let mint = Keypair::new();
        let create = spl::create_mint(&payer.pubkey(), &mint.pubkey(), &payer.pubkey(), 0, 1).unwrap();
        let ata = spl::create_associated_token_account_idempotent(&payer.pubkey(), &payer.pubkey(), &mint.pubkey());

        let builder = TransactionBuilder::new("create mint", &payer)
            .add_instructions(create, vec![&mint as &dyn Signer])
            .add_instruction(ata.clone());

        assert_eq!(builder.label(), "create mint");
        assert!(!builder.is_empty());
        let instructions = builder.instructions();
        assert_eq!(instructions.len(), 3);
        assert_eq!(instructions[2], ata);
    }

    #[test]
    fn test_build_signs_with_every_set_signer() {
        let payer = Keypair::new();
        let mint = Keypair::new();
        let create = spl::create_mint(&payer.pubkey(), &mint.pubkey(), &payer.pubkey(), 0, 1).unwrap();

        let tx = TransactionBuilder::new("create mint", &payer)
            .add_instructions(create, vec![&mint as &dyn Signer])
            .build(Hash::default())
            .unwrap();
        assert_eq!(tx.signatures.len(), 2);
        assert!(tx.verify().is_ok());
    }

    #[test]
    fn test_build_without_required_signer_fails() {
        let payer = Keypair::new();
        let mint = Keypair::new();
        let create = spl::create_mint(&payer.pubkey(), &mint.pubkey(), &payer.pubkey(), 0, 1).unwrap();

        let result = TransactionBuilder::new("create mint", &payer)
            .add_instructions(create, Vec::new())
            .build(Hash::default());
        assert!(matches!(result, Err(ScenarioError::Protocol(_))));
    }

    #[test]
    fn test_observed_slot() {
        assert_eq!(observed_slot("fund user", Ok(42)), Some(42));
        let failed = observed_slot("fund user", Err(ProtocolError::InvalidResponse("slot".to_string())));
        assert_eq!(failed, None);
    }

    #[test]
    fn test_empty_builder() {
        let payer = Keypair::new();
        assert!(TransactionBuilder::new("noop", &payer).is_empty());
    }
}
