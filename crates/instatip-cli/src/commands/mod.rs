pub mod demo;
pub mod score;

use instatip_scorer::{ContentScorer, ScorerConfig};

use crate::config::AppConfig;

/// Scorer whose suggestions scale from the configured one-tap tip
pub fn content_scorer(config: &AppConfig) -> ContentScorer {
    ContentScorer::new(ScorerConfig {
        base_tip: config.session.default_tip,
        ..ScorerConfig::default()
    })
}
