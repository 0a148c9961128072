//! Calldata encoding for planned operations.
//!
//! Every call is `selector ++ abi_encode_params(args)` where the selector is the
//! first four bytes of the keccak hash of the function signature. Swap calls are
//! encoded per pool type through an exhaustive `match`, so adding a pool type does
//! not compile until its encoding exists.

use crate::graph::PoolType;
use alloy::primitives::{keccak256, Address, Bytes as AlloyBytes, U256};
use alloy::sol_types::SolValue;

pub const APPROVE_SIGNATURE: &str = "approve(address,uint256)";
pub const TRANSFER_SIGNATURE: &str = "transfer(address,uint256)";
pub const ADD_OPERATOR_SIGNATURE: &str = "addOperator(address)";
pub const REMOVE_OPERATOR_SIGNATURE: &str = "removeOperator(address)";

/// Function selector for a canonical signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Prefix ABI-encoded arguments with the selector of `signature`.
pub fn encode_call(signature: &str, encoded_args: Vec<u8>) -> AlloyBytes {
    let mut call_data = selector(signature).to_vec();
    call_data.extend(encoded_args);
    AlloyBytes::from(call_data)
}

/// `approve(spender, amount)`
pub fn approve_calldata(spender: Address, amount: U256) -> AlloyBytes {
    encode_call(APPROVE_SIGNATURE, (spender, amount).abi_encode_params())
}

/// `transfer(recipient, amount)`
pub fn transfer_calldata(recipient: Address, amount: U256) -> AlloyBytes {
    encode_call(TRANSFER_SIGNATURE, (recipient, amount).abi_encode_params())
}

pub fn add_operator_calldata(operator: Address) -> AlloyBytes {
    encode_call(ADD_OPERATOR_SIGNATURE, operator.abi_encode())
}

pub fn remove_operator_calldata(operator: Address) -> AlloyBytes {
    encode_call(REMOVE_OPERATOR_SIGNATURE, operator.abi_encode())
}

/// Inputs shared by every pool type's swap call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapParams {
    /// Pool contract receiving the call
    pub pool: Address,
    /// Contract of the asset sold; zero address for the native asset
    pub token_in: Address,
    pub amount_in: U256,
    pub min_amount_out: U256,
    pub zero_for_one: bool,
    pub recipient: Address,
    /// Whether the input is the native asset and travels as call value
    pub native_input: bool,
}

/// A fully encoded swap call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapCall {
    pub target: Address,
    pub call_data: AlloyBytes,
    pub value: U256,
}

/// Canonical swap signature for a pool type.
pub fn swap_signature(pool_type: PoolType) -> &'static str {
    match pool_type {
        PoolType::V2Classic => "swap(uint256,uint256,bool,address)",
        PoolType::V2Plus => "swapExactIn(address,uint256,uint256,address)",
        PoolType::V2Lite => "swap(address,bool,uint256,uint256)",
    }
}

/// Encode the swap call for one hop.
pub fn encode_swap(pool_type: PoolType, params: &SwapParams) -> SwapCall {
    let args = match pool_type {
        PoolType::V2Classic => (
            params.amount_in,
            params.min_amount_out,
            params.zero_for_one,
            params.recipient,
        )
            .abi_encode_params(),
        PoolType::V2Plus => (
            params.token_in,
            params.amount_in,
            params.min_amount_out,
            params.recipient,
        )
            .abi_encode_params(),
        PoolType::V2Lite => (
            params.recipient,
            params.zero_for_one,
            params.amount_in,
            params.min_amount_out,
        )
            .abi_encode_params(),
    };

    let value = if params.native_input { params.amount_in } else { U256::ZERO };

    SwapCall {
        target: params.pool,
        call_data: encode_call(swap_signature(pool_type), args),
        value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(call_data: &[u8], index: usize) -> &[u8] {
        let start = 4 + index * 32;
        &call_data[start..start + 32]
    }

    fn params(native_input: bool) -> SwapParams {
        SwapParams {
            pool: Address::repeat_byte(0x11),
            token_in: Address::repeat_byte(0x22),
            amount_in: U256::from(1_000u64),
            min_amount_out: U256::from(900u64),
            zero_for_one: true,
            recipient: Address::repeat_byte(0x33),
            native_input,
        }
    }

    #[test]
    fn test_approve_selector_and_layout() {
        let spender = Address::repeat_byte(0xaa);
        let call_data = approve_calldata(spender, U256::from(1000));

        // approve(address,uint256) = 0x095ea7b3
        assert_eq!(&call_data[..4], &[0x09, 0x5e, 0xa7, 0xb3]);
        assert_eq!(call_data.len(), 4 + 64);
        assert_eq!(&word(&call_data, 0)[12..], spender.as_slice());
        assert_eq!(U256::from_be_slice(word(&call_data, 1)), U256::from(1000));
    }

    #[test]
    fn test_transfer_selector() {
        let call_data = transfer_calldata(Address::ZERO, U256::from(5));
        // transfer(address,uint256) = 0xa9059cbb
        assert_eq!(&call_data[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
    }

    #[test]
    fn test_operator_calls_are_single_word() {
        let operator = Address::repeat_byte(0x44);
        let grant = add_operator_calldata(operator);
        let revoke = remove_operator_calldata(operator);

        assert_eq!(grant.len(), 36);
        assert_eq!(&grant[..4], &selector(ADD_OPERATOR_SIGNATURE));
        assert_eq!(&revoke[..4], &selector(REMOVE_OPERATOR_SIGNATURE));
        assert_ne!(grant[..4], revoke[..4]);
        assert_eq!(&word(&revoke, 0)[12..], operator.as_slice());
    }

    #[test]
    fn test_swap_encoding_differs_per_pool_type() {
        let params = params(false);

        let classic = encode_swap(PoolType::V2Classic, &params);
        assert_eq!(classic.target, params.pool);
        assert_eq!(classic.value, U256::ZERO);
        assert_eq!(&classic.call_data[..4], &selector(swap_signature(PoolType::V2Classic)));
        assert_eq!(U256::from_be_slice(word(&classic.call_data, 0)), params.amount_in);
        assert_eq!(U256::from_be_slice(word(&classic.call_data, 1)), params.min_amount_out);
        assert_eq!(U256::from_be_slice(word(&classic.call_data, 2)), U256::from(1));

        let plus = encode_swap(PoolType::V2Plus, &params);
        assert_eq!(&word(&plus.call_data, 0)[12..], params.token_in.as_slice());
        assert_eq!(U256::from_be_slice(word(&plus.call_data, 1)), params.amount_in);

        let lite = encode_swap(PoolType::V2Lite, &params);
        assert_eq!(&word(&lite.call_data, 0)[12..], params.recipient.as_slice());
        assert_eq!(U256::from_be_slice(word(&lite.call_data, 3)), params.min_amount_out);

        for call in [&classic, &plus, &lite] {
            assert_eq!(call.call_data.len(), 4 + 4 * 32);
        }
    }

    #[test]
    fn test_native_input_travels_as_value() {
        let call = encode_swap(PoolType::V2Lite, &params(true));
        assert_eq!(call.value, U256::from(1_000u64));
    }
}
