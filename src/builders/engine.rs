//! Builder pattern for QuoteEngine

use crate::config::RouterConfig;
use crate::errors::{ConfigError, Result};
use crate::graph::PoolFeed;
use crate::path::{BestTradeSelector, RouteEnumerator, TradeBuilder};
use crate::plan::{AssetRegistry, OperationPlanner};
use crate::quote::{QuoteEngine, QuotePipeline};
use std::sync::Arc;

/// Builder for creating QuoteEngine instances with a fluent API
pub struct QuoteEngineBuilder {
    config: RouterConfig,
    registry: Option<Arc<dyn AssetRegistry>>,
    feed: Option<Arc<PoolFeed>>,
}

impl QuoteEngineBuilder {
    /// Create a QuoteEngineBuilder from a RouterConfig
    ///
    /// # Arguments
    ///
    /// * `config` - The router configuration to use
    pub fn from_config(config: &RouterConfig) -> Self {
        Self {
            config: config.clone(),
            registry: None,
            feed: None,
        }
    }

    /// Asset registry consulted for permission standards (required)
    pub fn with_registry(mut self, registry: Arc<dyn AssetRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Share an existing feed instead of creating one from the configuration
    pub fn with_feed(mut self, feed: Arc<PoolFeed>) -> Self {
        self.feed = Some(feed);
        self
    }

    /// Build the pipeline alone, for hosts that drive quoting themselves.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or no registry was set.
    pub fn build_pipeline(&self) -> Result<QuotePipeline> {
        self.config.validate()?;
        let registry = self.registry.clone().ok_or_else(|| ConfigError::InvalidConfiguration {
            message: "an asset registry is required".to_string(),
        })?;

        let builder = TradeBuilder::new(self.config.pool_fees.clone());
        Ok(QuotePipeline::new(
            RouteEnumerator::new(self.config.max_depth),
            BestTradeSelector::new(builder),
            OperationPlanner::new(registry, self.config.native_asset.clone()),
            self.config.treasury(),
        ))
    }

    /// Build the QuoteEngine
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or no registry was set.
    pub fn build(self) -> Result<QuoteEngine> {
        let pipeline = self.build_pipeline()?;
        let feed = self
            .feed
            .unwrap_or_else(|| Arc::new(PoolFeed::new(self.config.staleness_threshold())));

        tracing::debug!(
            max_depth = self.config.max_depth,
            native_asset = %self.config.native_asset,
            refresh_interval_ms = self.config.refresh_interval_ms,
            "Quote engine built"
        );

        Ok(QuoteEngine::new(
            pipeline,
            feed,
            self.config.routing_fee.clone(),
            self.config.refresh_interval(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::StaticAssetRegistry;
    use crate::quote::QuoteRequest;

    #[test]
    fn test_builder_requires_registry() {
        let result = QuoteEngineBuilder::from_config(&RouterConfig::default()).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        let config = RouterConfig { max_depth: 0, ..RouterConfig::default() };
        let result = QuoteEngineBuilder::from_config(&config)
            .with_registry(Arc::new(StaticAssetRegistry::new()))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_wires_config() {
        let config = RouterConfig { max_depth: 2, ..RouterConfig::default() };
        let engine = QuoteEngineBuilder::from_config(&config)
            .with_registry(Arc::new(StaticAssetRegistry::new().with_native("ETH")))
            .build()
            .unwrap();

        assert_eq!(engine.pipeline().enumerator().max_depth(), 2);
        assert_eq!(engine.pipeline().planner().native_asset(), "ETH");
        assert!(engine.feed().snapshot().is_empty());
        assert_eq!(engine.submit(QuoteRequest::exact_input("ETH", "USDC", 1u32)), 1);
    }
}
