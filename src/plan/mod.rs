//! Conversion of a selected trade into ordered on-chain operations.
//!
//! For every hop the planner emits, in order: the permission grant the input asset
//! needs (if any), the pool-specific swap call, and the matching revoke for
//! standards that require one. The routing-fee transfer, when non-zero, closes the
//! list. The planner only guarantees ordering; the executor is expected to submit
//! the list as one atomic batch.

pub mod encoding;
pub mod registry;

pub use encoding::{encode_swap, SwapCall, SwapParams};
pub use registry::{AssetEntry, AssetRegistry, PermissionStandard, StaticAssetRegistry};

use crate::errors::{PlanError, Result};
use crate::fee::{FeeCollection, HopBound, RoutingFee};
use crate::path::{Trade, TradeOperation};
use crate::utils::{biguint_to_u256, string_to_h160};
use alloy::primitives::{Address, Bytes as AlloyBytes, U256};
use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// What an operation does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// `approve(pool, 0)` ahead of a fresh allowance
    ResetApproval,
    /// `approve(pool, amount)`
    Approve,
    /// `addOperator(pool)`
    AddOperator,
    /// Pool-specific swap call
    Swap,
    /// `removeOperator(pool)`
    RemoveOperator,
    /// Routing fee paid as native value
    NativeTransfer,
    /// Routing fee paid with `transfer(treasury, amount)`
    TokenTransfer,
}

impl OperationKind {
    pub fn is_grant(&self) -> bool {
        matches!(self, OperationKind::ResetApproval | OperationKind::Approve | OperationKind::AddOperator)
    }

    pub fn is_revoke(&self) -> bool {
        matches!(self, OperationKind::RemoveOperator)
    }

    pub fn is_fee(&self) -> bool {
        matches!(self, OperationKind::NativeTransfer | OperationKind::TokenTransfer)
    }
}

/// One call for the external executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub kind: OperationKind,
    /// Contract (or recipient, for native transfers) being called
    pub target: Address,
    pub call_data: AlloyBytes,
    /// Native value attached to the call
    pub value: U256,
    /// Asset the operation moves or authorises
    pub asset: String,
    /// Amount the operation moves or authorises
    pub amount: BigUint,
    /// Pool address for hop-related operations
    pub pool: Option<String>,
}

impl Operation {
    /// Convert to a serializable record.
    pub fn to_storage(&self) -> OperationForStorage {
        OperationForStorage::from(self)
    }
}

/// Storage-friendly, hex-encoded representation of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationForStorage {
    pub kind: OperationKind,
    pub target: String,
    pub call_data: String,
    pub value: String,
    pub asset: String,
    pub amount: String,
    pub pool: Option<String>,
}

impl From<&Operation> for OperationForStorage {
    fn from(operation: &Operation) -> Self {
        Self {
            kind: operation.kind,
            target: operation.target.to_string(),
            call_data: format!("0x{}", hex::encode(&operation.call_data)),
            value: operation.value.to_string(),
            asset: operation.asset.clone(),
            amount: operation.amount.to_string(),
            pool: operation.pool.clone(),
        }
    }
}

/// Bounds and extras applied on top of a trade's quoted amounts.
#[derive(Debug, Clone, Default)]
pub struct PlanOptions {
    /// Spend and minimum output per hop; empty means the quoted amounts
    pub bounds: Vec<HopBound>,
    pub routing_fee: Option<RoutingFee>,
}

/// Turns trades into ordered operations.
#[derive(Clone)]
pub struct OperationPlanner {
    registry: Arc<dyn AssetRegistry>,
    native_asset: String,
}

impl fmt::Debug for OperationPlanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationPlanner")
            .field("native_asset", &self.native_asset)
            .finish()
    }
}

impl OperationPlanner {
    pub fn new(registry: Arc<dyn AssetRegistry>, native_asset: impl Into<String>) -> Self {
        Self { registry, native_asset: native_asset.into() }
    }

    pub fn native_asset(&self) -> &str {
        &self.native_asset
    }

    /// Plan `trade` for `sender` using the quoted amounts as bounds.
    pub fn plan(&self, trade: &Trade, sender: Address) -> Result<Vec<Operation>> {
        self.plan_with(trade, sender, &PlanOptions::default())
    }

    /// Plan `trade` for `sender` with explicit bounds and an optional routing fee.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The trade is empty
    /// - Bounds are given but their count differs from the hop count
    /// - A spent asset has a known standard but no registered contract
    /// - An amount does not fit in 256 bits
    /// - The routing fee is denominated in a different asset than the trade output
    pub fn plan_with(&self, trade: &Trade, sender: Address, options: &PlanOptions) -> Result<Vec<Operation>> {
        if trade.is_empty() {
            return Err(PlanError::EmptyTrade.into());
        }

        if !options.bounds.is_empty() && options.bounds.len() != trade.len() {
            return Err(PlanError::BoundsMismatch {
                bounds: options.bounds.len(),
                hops: trade.len(),
            }
            .into());
        }

        let mut operations = Vec::with_capacity(trade.len() * 3 + 1);

        for (index, hop) in trade.iter().enumerate() {
            match options.bounds.get(index) {
                Some(bound) => self.plan_hop(hop, sender, &bound.spend, &bound.min_out, &mut operations)?,
                None => self.plan_hop(hop, sender, &hop.amount_in, &hop.amount_out, &mut operations)?,
            }
        }

        if let Some(fee) = &options.routing_fee {
            if let Some(operation) = self.fee_operation(trade, fee)? {
                operations.push(operation);
            }
        }

        tracing::debug!(
            hop_count = trade.len(),
            operation_count = operations.len(),
            grants = operations.iter().filter(|op| op.kind.is_grant()).count(),
            revokes = operations.iter().filter(|op| op.kind.is_revoke()).count(),
            "Operation plan built"
        );

        Ok(operations)
    }

    fn plan_hop(
        &self,
        hop: &TradeOperation,
        sender: Address,
        spend: &BigUint,
        min_out: &BigUint,
        operations: &mut Vec<Operation>,
    ) -> Result<()> {
        let asset_in = hop.token_in();
        let pool = string_to_h160(hop.pool_address())?;
        let spend_word = to_word(spend, "hop input")?;
        let native_input = asset_in == self.native_asset;

        let standard = if native_input {
            Some(PermissionStandard::Native)
        } else {
            self.registry.permission_standard(asset_in)
        };
        let token_in = if native_input {
            Address::ZERO
        } else {
            self.registry.contract_address(asset_in).unwrap_or(Address::ZERO)
        };

        let granted = match standard {
            Some(standard) if standard.requires_grant() => {
                let token = self.registry.contract_address(asset_in).ok_or_else(|| {
                    PlanError::MissingAssetContract { asset: asset_in.to_string() }
                })?;
                self.push_grant(standard, token, pool, hop, spend, spend_word, operations);
                Some((standard, token))
            }
            Some(_) => None,
            None => {
                tracing::warn!(
                    asset = asset_in,
                    pool = hop.pool_address(),
                    "Permission standard unknown; skipping grant"
                );
                None
            }
        };

        let call = encode_swap(
            hop.pool_type(),
            &SwapParams {
                pool,
                token_in,
                amount_in: spend_word,
                min_amount_out: to_word(min_out, "minimum output")?,
                zero_for_one: hop.zero_for_one(),
                recipient: sender,
                native_input,
            },
        );
        operations.push(Operation {
            kind: OperationKind::Swap,
            target: call.target,
            call_data: call.call_data,
            value: call.value,
            asset: asset_in.to_string(),
            amount: spend.clone(),
            pool: Some(hop.pool_address().to_string()),
        });

        if let Some((standard, token)) = granted {
            if standard.requires_revoke() {
                operations.push(Operation {
                    kind: OperationKind::RemoveOperator,
                    target: token,
                    call_data: encoding::remove_operator_calldata(pool),
                    value: U256::ZERO,
                    asset: asset_in.to_string(),
                    amount: BigUint::zero(),
                    pool: Some(hop.pool_address().to_string()),
                });
            }
        }

        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn push_grant(
        &self,
        standard: PermissionStandard,
        token: Address,
        pool: Address,
        hop: &TradeOperation,
        spend: &BigUint,
        spend_word: U256,
        operations: &mut Vec<Operation>,
    ) {
        let grant = |kind: OperationKind, call_data: AlloyBytes, amount: BigUint| Operation {
            kind,
            target: token,
            call_data,
            value: U256::ZERO,
            asset: hop.token_in().to_string(),
            amount,
            pool: Some(hop.pool_address().to_string()),
        };

        match standard {
            PermissionStandard::Native => {}
            PermissionStandard::Allowance => {
                operations.push(grant(
                    OperationKind::Approve,
                    encoding::approve_calldata(pool, spend_word),
                    spend.clone(),
                ));
            }
            PermissionStandard::ResettableAllowance => {
                operations.push(grant(
                    OperationKind::ResetApproval,
                    encoding::approve_calldata(pool, U256::ZERO),
                    BigUint::zero(),
                ));
                operations.push(grant(
                    OperationKind::Approve,
                    encoding::approve_calldata(pool, spend_word),
                    spend.clone(),
                ));
            }
            PermissionStandard::OperatorList => {
                operations.push(grant(
                    OperationKind::AddOperator,
                    encoding::add_operator_calldata(pool),
                    spend.clone(),
                ));
            }
        }
    }

    fn fee_operation(&self, trade: &Trade, fee: &RoutingFee) -> Result<Option<Operation>> {
        if fee.amount.is_zero() {
            return Ok(None);
        }

        let output_asset = trade.output_token().unwrap_or_default();
        if fee.asset != output_asset {
            return Err(PlanError::FeeAssetMismatch {
                fee_asset: fee.asset.clone(),
                output_asset: output_asset.to_string(),
            }
            .into());
        }

        let treasury = string_to_h160(&fee.recipient)?;
        let amount = to_word(&fee.amount, "routing fee")?;

        let operation = match fee.collection {
            FeeCollection::NativeTransfer => Operation {
                kind: OperationKind::NativeTransfer,
                target: treasury,
                call_data: AlloyBytes::new(),
                value: amount,
                asset: fee.asset.clone(),
                amount: fee.amount.clone(),
                pool: None,
            },
            FeeCollection::TokenTransfer => {
                let token = self.registry.contract_address(&fee.asset).ok_or_else(|| {
                    PlanError::MissingAssetContract { asset: fee.asset.clone() }
                })?;
                Operation {
                    kind: OperationKind::TokenTransfer,
                    target: token,
                    call_data: encoding::transfer_calldata(treasury, amount),
                    value: U256::ZERO,
                    asset: fee.asset.clone(),
                    amount: fee.amount.clone(),
                    pool: None,
                }
            }
        };

        Ok(Some(operation))
    }
}

fn to_word(amount: &BigUint, context: &'static str) -> Result<U256> {
    biguint_to_u256(amount).map_err(|_| {
        PlanError::AmountOverflow { context, amount: amount.to_string() }.into()
    })
}
