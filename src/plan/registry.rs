//! Asset metadata lookup for planning.
//!
//! The planner needs two facts about every non-native asset it spends: which
//! contract holds it and which permission standard governs spending it. Both come
//! from an external collaborator behind the [`AssetRegistry`] trait.

use crate::errors::Result;
use crate::utils::string_to_h160;
use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How a contract is authorised to move an asset on the sender's behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionStandard {
    /// The chain's native asset; sent as call value, no authorisation.
    Native,
    /// `approve(spender, amount)` sets the allowance exactly.
    Allowance,
    /// Allowance token that must be reset to zero before a new amount is set.
    ResettableAllowance,
    /// Owner-managed operator list: `addOperator` before, `removeOperator` after.
    OperatorList,
}

impl PermissionStandard {
    /// Whether spending requires a grant operation before the swap.
    pub fn requires_grant(&self) -> bool {
        !matches!(self, PermissionStandard::Native)
    }

    /// Whether the grant must be revoked right after the swap.
    pub fn requires_revoke(&self) -> bool {
        matches!(self, PermissionStandard::OperatorList)
    }

    /// Whether the standard can set an exact allowance in one call.
    pub fn has_exact_setter(&self) -> bool {
        matches!(self, PermissionStandard::Allowance)
    }
}

/// Lookup of contract addresses and permission standards by asset slug.
pub trait AssetRegistry: Send + Sync {
    /// Permission standard for `asset`, or `None` when it cannot be determined.
    fn permission_standard(&self, asset: &str) -> Option<PermissionStandard>;

    /// Contract address of `asset`, or `None` for unknown or native assets.
    fn contract_address(&self, asset: &str) -> Option<Address>;
}

/// One asset entry as stored in a registry file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetEntry {
    pub slug: String,
    /// Hex contract address; absent for the native asset
    pub address: Option<String>,
    pub standard: PermissionStandard,
}

#[derive(Debug, Clone, Copy)]
struct ResolvedAsset {
    address: Option<Address>,
    standard: PermissionStandard,
}

/// A map-backed registry, for hosts with a static asset list and for tests.
#[derive(Debug, Clone, Default)]
pub struct StaticAssetRegistry {
    assets: HashMap<String, ResolvedAsset>,
}

impl StaticAssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from file entries, parsing every contract address.
    pub fn from_entries<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = AssetEntry>,
    {
        let mut registry = Self::new();
        for entry in entries {
            let address = entry.address.as_deref().map(string_to_h160).transpose()?;
            registry.assets.insert(entry.slug, ResolvedAsset { address, standard: entry.standard });
        }
        Ok(registry)
    }

    /// Register the native asset under `slug`.
    pub fn with_native(mut self, slug: impl Into<String>) -> Self {
        self.assets.insert(
            slug.into(),
            ResolvedAsset { address: None, standard: PermissionStandard::Native },
        );
        self
    }

    /// Register a contract-backed asset.
    pub fn with_token(mut self, slug: impl Into<String>, address: Address, standard: PermissionStandard) -> Self {
        self.assets.insert(slug.into(), ResolvedAsset { address: Some(address), standard });
        self
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl AssetRegistry for StaticAssetRegistry {
    fn permission_standard(&self, asset: &str) -> Option<PermissionStandard> {
        self.assets.get(asset).map(|entry| entry.standard)
    }

    fn contract_address(&self, asset: &str) -> Option<Address> {
        self.assets.get(asset).and_then(|entry| entry.address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_properties() {
        assert!(!PermissionStandard::Native.requires_grant());
        assert!(PermissionStandard::Allowance.has_exact_setter());
        assert!(!PermissionStandard::ResettableAllowance.has_exact_setter());
        assert!(!PermissionStandard::ResettableAllowance.requires_revoke());
        assert!(PermissionStandard::OperatorList.requires_revoke());
    }

    #[test]
    fn test_registry_from_json_entries() {
        let json = r#"[
            {"slug": "ETH", "address": null, "standard": "native"},
            {"slug": "USDT", "address": "0x00000000000000000000000000000000000000c1",
             "standard": "resettable_allowance"}
        ]"#;
        let entries: Vec<AssetEntry> = serde_json::from_str(json).unwrap();
        let registry = StaticAssetRegistry::from_entries(entries).unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.permission_standard("ETH"), Some(PermissionStandard::Native));
        assert_eq!(registry.contract_address("ETH"), None);
        assert_eq!(
            registry.permission_standard("USDT"),
            Some(PermissionStandard::ResettableAllowance)
        );
        assert!(registry.contract_address("USDT").is_some());
        assert_eq!(registry.permission_standard("DAI"), None);
    }

    #[test]
    fn test_registry_rejects_bad_address() {
        let entries = vec![AssetEntry {
            slug: "BAD".to_string(),
            address: Some("0x1234".to_string()),
            standard: PermissionStandard::Allowance,
        }];
        assert!(StaticAssetRegistry::from_entries(entries).is_err());
    }
}
