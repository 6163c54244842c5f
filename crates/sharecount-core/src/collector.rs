use std::sync::Arc;
use std::time::Instant;

use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::aggregate::join_platforms;
use crate::config::CollectorConfig;
use crate::http_client::{HttpClientFactory, ReqwestClientFactory};
use crate::origin::resolve;
use crate::platform::{PlatformRegistry, SelectionSet};
use crate::report::{combine, AggregatedReport};

/// Collection engine: resolves the origin, fans out, and combines.
///
/// Cheap to clone. Every run reads its configuration from `self` only, so one
/// collector can serve concurrent runs.
#[derive(Clone)]
pub struct Collector {
    registry: Arc<PlatformRegistry>,
    config: Arc<CollectorConfig>,
    factory: Arc<dyn HttpClientFactory>,
}

impl Default for Collector {
    fn default() -> Self {
        Self::new(
            PlatformRegistry::default(),
            CollectorConfig::default(),
            Arc::new(ReqwestClientFactory),
        )
    }
}

impl Collector {
    pub fn new(
        registry: PlatformRegistry,
        config: CollectorConfig,
        factory: Arc<dyn HttpClientFactory>,
    ) -> Self {
        Self {
            registry: Arc::new(registry),
            config: Arc::new(config),
            factory,
        }
    }

    pub fn registry(&self) -> &PlatformRegistry {
        &self.registry
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// Collects share counts for `url` from every platform in `selection`.
    ///
    /// Never fails as a whole: unreachable platforms end up in `errors`.
    pub async fn collect(&self, url: &str, selection: &SelectionSet) -> AggregatedReport {
        let run_id = Uuid::new_v4();
        let span = info_span!("collect", %run_id, url);
        self.run(url, selection).instrument(span).await
    }

    async fn run(&self, url: &str, selection: &SelectionSet) -> AggregatedReport {
        let started = Instant::now();
        let resolution = resolve(
            url,
            self.registry.origin(),
            &self.config,
            self.factory.as_ref(),
        )
        .await;

        let platforms = self.registry.selected(selection);
        let dispatched = platforms.len();
        let joined = join_platforms(
            platforms,
            &resolution.resolved_url,
            Arc::clone(&self.config),
            Arc::clone(&self.factory),
        )
        .await;

        let mut stats = Vec::with_capacity(joined.stats.len() + 1);
        let mut errors = Vec::with_capacity(joined.errors.len() + 1);
        match resolution.stat {
            Ok(stat) => stats.push(stat),
            Err(error) => errors.push(error),
        }
        stats.extend(joined.stats);
        errors.extend(joined.errors);

        let report = combine(stats, errors);
        info!(
            dispatched,
            total = report.meta.total,
            errors = report.errors.len(),
            elapsed_secs = started.elapsed().as_secs_f64(),
            "collection finished"
        );
        report
    }
}

/// One-shot collection with the built-in platforms over the network.
///
/// An empty `platforms` slice selects every enabled platform and an empty
/// `proxy` means a direct connection.
pub async fn collect(url: &str, platforms: &[String], proxy: &str) -> AggregatedReport {
    let collector = Collector::new(
        PlatformRegistry::default(),
        CollectorConfig::new().with_proxy(Some(proxy)),
        Arc::new(ReqwestClientFactory),
    );
    collector
        .collect(url, &SelectionSet::from_names(platforms))
        .await
}
