//! Configuration management for the swap router.
//!
//! The engine never reads ambient state while quoting: the host builds a
//! [`RouterConfig`] once (from code or from `ROUTER_*` environment variables) and
//! resolves the effective routing fee with an explicit timestamp through
//! [`RoutingFeeSchedule::fee_bps_at`].

use crate::amm::FeeSchedule;
use crate::errors::{ConfigError, Result};
use crate::graph::PoolType;
use crate::path::DEFAULT_MAX_DEPTH;
use crate::utils::{percent_to_bps, string_to_h160, BPS_DENOMINATOR};
use alloy::primitives::Address;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

pub const ENV_MAX_DEPTH: &str = "ROUTER_MAX_DEPTH";
pub const ENV_POOL_FEES: &str = "ROUTER_POOL_FEES";
pub const ENV_ROUTING_FEE_PERCENT: &str = "ROUTER_ROUTING_FEE_PERCENT";
pub const ENV_FEE_PROMOTIONS: &str = "ROUTER_FEE_PROMOTIONS";
pub const ENV_TREASURY_ADDRESS: &str = "ROUTER_TREASURY_ADDRESS";
pub const ENV_NATIVE_ASSET: &str = "ROUTER_NATIVE_ASSET";
pub const ENV_STALENESS_SECS: &str = "ROUTER_STALENESS_SECS";
pub const ENV_REFRESH_INTERVAL_MS: &str = "ROUTER_REFRESH_INTERVAL_MS";

/// A period during which the routing fee is waived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl PromotionWindow {
    /// Whether `now` falls in `[start, end)`.
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        self.start <= now && now < self.end
    }
}

/// Base routing fee plus the windows in which it drops to zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingFeeSchedule {
    pub base_bps: u32,
    pub promotions: Vec<PromotionWindow>,
}

impl RoutingFeeSchedule {
    pub fn flat(base_bps: u32) -> Self {
        Self { base_bps, promotions: Vec::new() }
    }

    pub fn with_promotion(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.promotions.push(PromotionWindow { start, end });
        self
    }

    /// Effective routing fee at `now`.
    pub fn fee_bps_at(&self, now: DateTime<Utc>) -> u32 {
        if self.promotions.iter().any(|window| window.contains(now)) {
            0
        } else {
            self.base_bps
        }
    }
}

/// Main configuration structure for the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterConfig {
    /// Maximum number of hops per route
    pub max_depth: usize,
    /// Swap fee per pool type
    pub pool_fees: FeeSchedule,
    pub routing_fee: RoutingFeeSchedule,
    /// Recipient of routing fees
    pub treasury_address: Address,
    /// Slug reserved for the chain's native asset
    pub native_asset: String,
    /// Age after which a snapshot is reported stale
    pub staleness_secs: u64,
    /// Period of the quote refresh timer
    pub refresh_interval_ms: u64,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            pool_fees: FeeSchedule::new(),
            routing_fee: RoutingFeeSchedule::default(),
            treasury_address: Address::ZERO,
            native_asset: "ETH".to_string(),
            staleness_secs: 30,
            refresh_interval_ms: 10_000,
        }
    }
}

impl RouterConfig {
    /// Create a new configuration from environment variables
    ///
    /// # Environment Variables
    ///
    /// All optional; unset variables keep their defaults.
    /// - `ROUTER_MAX_DEPTH`: Maximum hops per route (default: 3)
    /// - `ROUTER_POOL_FEES`: Per-type fee overrides in percent, e.g. `v2_classic=0.3,v2_plus=0.35`
    /// - `ROUTER_ROUTING_FEE_PERCENT`: Routing fee in percent (default: 0)
    /// - `ROUTER_FEE_PROMOTIONS`: Fee-free windows as `start/end` RFC 3339 pairs, comma separated
    /// - `ROUTER_TREASURY_ADDRESS`: Routing fee recipient
    /// - `ROUTER_NATIVE_ASSET`: Native asset slug (default: ETH)
    /// - `ROUTER_STALENESS_SECS`: Snapshot staleness threshold (default: 30)
    /// - `ROUTER_REFRESH_INTERVAL_MS`: Quote refresh period (default: 10000)
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or the resulting
    /// configuration fails [`RouterConfig::validate`].
    pub fn from_env() -> Result<Self> {
        tracing::info!("Loading router configuration from environment");
        let mut config = Self::default();

        if let Some(value) = read_var(ENV_MAX_DEPTH) {
            config.max_depth = parse_number(ENV_MAX_DEPTH, &value)?;
        }

        if let Some(value) = read_var(ENV_POOL_FEES) {
            config.pool_fees = parse_pool_fees(&value)?;
            tracing::debug!(
                fees = ?config.pool_fees.entries().collect::<Vec<_>>(),
                "Pool fee overrides loaded"
            );
        }

        if let Some(value) = read_var(ENV_ROUTING_FEE_PERCENT) {
            config.routing_fee.base_bps = percent_to_bps(&value).map_err(|e| invalid(ENV_ROUTING_FEE_PERCENT, &value, e))?;
        }

        if let Some(value) = read_var(ENV_FEE_PROMOTIONS) {
            config.routing_fee.promotions = parse_promotions(&value)?;
        }

        if let Some(value) = read_var(ENV_TREASURY_ADDRESS) {
            config.treasury_address = string_to_h160(&value).map_err(|e| invalid(ENV_TREASURY_ADDRESS, &value, e))?;
        }

        if let Some(value) = read_var(ENV_NATIVE_ASSET) {
            config.native_asset = value;
        }

        if let Some(value) = read_var(ENV_STALENESS_SECS) {
            config.staleness_secs = parse_number(ENV_STALENESS_SECS, &value)?;
        }

        if let Some(value) = read_var(ENV_REFRESH_INTERVAL_MS) {
            config.refresh_interval_ms = parse_number(ENV_REFRESH_INTERVAL_MS, &value)?;
        }

        config.validate()?;

        tracing::info!(
            max_depth = config.max_depth,
            routing_fee_bps = config.routing_fee.base_bps,
            promotions = config.routing_fee.promotions.len(),
            native_asset = %config.native_asset,
            treasury = %config.treasury_address,
            staleness_secs = config.staleness_secs,
            "Router configuration loaded successfully"
        );

        Ok(config)
    }

    /// Check ranges and cross-field consistency.
    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(ConfigError::InvalidConfiguration {
                message: "max_depth must be at least 1".to_string(),
            }
            .into());
        }

        if let Some((pool_type, fee)) = self.pool_fees.entries().find(|(_, fee)| *fee >= BPS_DENOMINATOR) {
            return Err(ConfigError::InvalidConfiguration {
                message: format!("pool fee for {} is {} bps, must be below 10000", pool_type, fee),
            }
            .into());
        }

        if self.routing_fee.base_bps > BPS_DENOMINATOR {
            return Err(ConfigError::InvalidConfiguration {
                message: format!("routing fee {} bps exceeds 10000", self.routing_fee.base_bps),
            }
            .into());
        }

        if let Some(window) = self.routing_fee.promotions.iter().find(|window| window.end <= window.start) {
            return Err(ConfigError::InvalidConfiguration {
                message: format!("promotion window {} .. {} is empty", window.start, window.end),
            }
            .into());
        }

        if self.routing_fee.base_bps > 0 && self.treasury_address == Address::ZERO {
            return Err(ConfigError::InvalidConfiguration {
                message: "a routing fee requires a treasury address".to_string(),
            }
            .into());
        }

        if self.native_asset.trim().is_empty() {
            return Err(ConfigError::InvalidConfiguration {
                message: "native asset slug cannot be empty".to_string(),
            }
            .into());
        }

        if self.refresh_interval_ms == 0 {
            return Err(ConfigError::InvalidConfiguration {
                message: "refresh interval must be positive".to_string(),
            }
            .into());
        }

        Ok(())
    }

    pub fn staleness_threshold(&self) -> Duration {
        Duration::seconds(i64::try_from(self.staleness_secs).unwrap_or(i64::MAX))
    }

    pub fn refresh_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.refresh_interval_ms)
    }

    /// Treasury address in checksummed hex, as carried by routing fees.
    pub fn treasury(&self) -> String {
        self.treasury_address.to_string()
    }
}

fn read_var(name: &'static str) -> Option<String> {
    env::var(name).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

fn invalid(variable: &'static str, value: &str, reason: impl ToString) -> ConfigError {
    ConfigError::InvalidVariable {
        variable,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_number<T>(variable: &'static str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: ToString,
{
    value.parse::<T>().map_err(|e| invalid(variable, value, e).into())
}

fn parse_pool_fees(value: &str) -> Result<FeeSchedule> {
    let mut fees = FeeSchedule::new();
    for entry in value.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
        let (name, percent) = entry
            .split_once('=')
            .ok_or_else(|| invalid(ENV_POOL_FEES, entry, "expected <pool_type>=<percent>"))?;
        let pool_type = PoolType::from_str(name).map_err(|e| invalid(ENV_POOL_FEES, entry, e))?;
        let fee_bps = percent_to_bps(percent).map_err(|e| invalid(ENV_POOL_FEES, entry, e))?;
        fees.set_fee(pool_type, fee_bps);
    }
    Ok(fees)
}

fn parse_promotions(value: &str) -> Result<Vec<PromotionWindow>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| -> Result<PromotionWindow> {
            let (start, end) = entry
                .split_once('/')
                .ok_or_else(|| invalid(ENV_FEE_PROMOTIONS, entry, "expected <start>/<end>"))?;
            let parse = |raw: &str| {
                DateTime::parse_from_rfc3339(raw.trim())
                    .map(|time| time.with_timezone(&Utc))
                    .map_err(|e| invalid(ENV_FEE_PROMOTIONS, entry, e))
            };
            Ok(PromotionWindow { start: parse(start)?, end: parse(end)? })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::Mutex;

    // Use a mutex to ensure tests don't interfere with each other's environment variables
    static TEST_MUTEX: Mutex<()> = Mutex::new(());

    const ALL_VARS: [&str; 8] = [
        ENV_MAX_DEPTH,
        ENV_POOL_FEES,
        ENV_ROUTING_FEE_PERCENT,
        ENV_FEE_PROMOTIONS,
        ENV_TREASURY_ADDRESS,
        ENV_NATIVE_ASSET,
        ENV_STALENESS_SECS,
        ENV_REFRESH_INTERVAL_MS,
    ];

    fn clear_env() {
        for name in ALL_VARS {
            env::remove_var(name);
        }
    }

    #[test]
    fn test_config_from_env_defaults() {
        let _guard = TEST_MUTEX.lock().unwrap();
        clear_env();

        let config = RouterConfig::from_env().unwrap();
        assert_eq!(config, RouterConfig::default());
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.pool_fees.fee_bps(PoolType::V2Plus), 35);
    }

    #[test]
    fn test_config_from_env_valid() {
        let _guard = TEST_MUTEX.lock().unwrap();
        clear_env();

        env::set_var(ENV_MAX_DEPTH, "2");
        env::set_var(ENV_POOL_FEES, "v2_classic=0.25, v2_lite=0.05");
        env::set_var(ENV_ROUTING_FEE_PERCENT, "0.5");
        env::set_var(ENV_TREASURY_ADDRESS, "0x00000000000000000000000000000000000000fe");
        env::set_var(ENV_NATIVE_ASSET, "MATIC");
        env::set_var(ENV_FEE_PROMOTIONS, "2026-01-01T00:00:00Z/2026-01-08T00:00:00Z");

        let result = RouterConfig::from_env();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.max_depth, 2);
        assert_eq!(config.pool_fees.fee_bps(PoolType::V2Classic), 25);
        assert_eq!(config.pool_fees.fee_bps(PoolType::V2Lite), 5);
        assert_eq!(config.pool_fees.fee_bps(PoolType::V2Plus), 35);
        assert_eq!(config.routing_fee.base_bps, 50);
        assert_eq!(config.routing_fee.promotions.len(), 1);
        assert_eq!(config.native_asset, "MATIC");
    }

    #[test]
    fn test_config_from_env_invalid_values() {
        let _guard = TEST_MUTEX.lock().unwrap();

        let cases = [
            (ENV_MAX_DEPTH, "three"),
            (ENV_MAX_DEPTH, "0"),
            (ENV_POOL_FEES, "v4=0.3"),
            (ENV_POOL_FEES, "v2_classic"),
            (ENV_ROUTING_FEE_PERCENT, "0.125"),
            (ENV_TREASURY_ADDRESS, "0x1234"),
            (ENV_FEE_PROMOTIONS, "yesterday/today"),
            (ENV_REFRESH_INTERVAL_MS, "0"),
        ];

        for (name, value) in cases {
            clear_env();
            env::set_var(name, value);
            let result = RouterConfig::from_env();
            assert!(result.is_err(), "Expected error for {}={}", name, value);
        }
        clear_env();
    }

    #[test]
    fn test_routing_fee_requires_treasury() {
        let config = RouterConfig {
            routing_fee: RoutingFeeSchedule::flat(50),
            ..RouterConfig::default()
        };
        let error = config.validate().unwrap_err();
        assert!(error.to_string().contains("treasury"));
    }

    #[test]
    fn test_promotion_window_waives_fee() {
        let start = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap();
        let schedule = RoutingFeeSchedule::flat(50).with_promotion(start, end);

        assert_eq!(schedule.fee_bps_at(start - Duration::seconds(1)), 50);
        assert_eq!(schedule.fee_bps_at(start), 0);
        assert_eq!(schedule.fee_bps_at(start + Duration::hours(12)), 0);
        assert_eq!(schedule.fee_bps_at(end), 50);
    }

    #[test]
    fn test_durations() {
        let config = RouterConfig::default();
        assert_eq!(config.staleness_threshold(), Duration::seconds(30));
        assert_eq!(config.refresh_interval(), std::time::Duration::from_millis(10_000));
    }
}
