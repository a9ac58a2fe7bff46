//! InstaTip Scorer - content quality heuristics
//!
//! Scores a piece of text on a 1-10 scale and suggests a tip for it. The
//! result is advisory: callers decide what amount to pass into a transfer,
//! and the session core never calls the scorer itself.
//!
//! # Factors
//!
//! | Factor | Max bonus |
//! |---|---|
//! | Length | 2.0 |
//! | Engagement (emoji, `!`, `?`, `#`) | 2.0 |
//! | Educational vocabulary | 2.0 |
//! | Technical vocabulary | 1.5 |
//! | Positive sentiment | 1.5 |
//! | Creativity | 1.0 |
//! | Community | 1.0 |

use instatip_types::Amount;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

const BASE_SCORE: f64 = 5.0;
const MIN_SCORE: f64 = 1.0;
const MAX_SCORE: f64 = 10.0;

/// Result of scoring a piece of content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentAnalysis {
    /// Quality on a 1-10 scale, one decimal place
    pub score: f64,
    /// Factors that contributed to the score
    pub factors: Vec<String>,
    pub reasoning: String,
    pub suggested_tip: Amount,
}

/// Vocabulary and tip base used by the scorer
#[derive(Debug, Clone)]
pub struct ScorerConfig {
    /// Tip suggested for content scoring exactly 5
    pub base_tip: Amount,
    pub educational_words: Vec<&'static str>,
    pub technical_words: Vec<&'static str>,
    pub positive_words: Vec<&'static str>,
    pub creative_words: Vec<&'static str>,
    pub community_words: Vec<&'static str>,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            base_tip: Amount::new(Decimal::new(1, 2)),
            educational_words: vec![
                "explain", "tutorial", "guide", "learn", "understand", "how to", "step by step",
            ],
            technical_words: vec![
                "blockchain", "crypto", "defi", "nft", "smart contract", "web3", "ethereum",
            ],
            positive_words: vec![
                "amazing", "great", "excellent", "awesome", "love", "beautiful", "fantastic",
                "incredible",
            ],
            creative_words: vec![
                "innovative", "creative", "unique", "original", "interesting", "inspiring",
            ],
            community_words: vec![
                "community", "together", "share", "collaborate", "support", "help",
            ],
        }
    }
}

/// Heuristic content scorer
#[derive(Debug, Clone, Default)]
pub struct ContentScorer {
    config: ScorerConfig,
}

impl ContentScorer {
    pub fn new(config: ScorerConfig) -> Self {
        Self { config }
    }

    pub fn analyze(&self, content: &str) -> ContentAnalysis {
        let lower = content.to_lowercase();
        let mut score = BASE_SCORE;
        let mut factors = Vec::new();
        let mut add = |bonus: f64, factor: &str| {
            score += bonus;
            factors.push(factor.to_string());
        };

        let words = content.split_whitespace().count();
        if words > 100 {
            add(2.0, "comprehensive content");
        } else if words > 50 {
            add(1.5, "substantial length");
        } else if words > 20 {
            add(1.0, "moderate length");
        }

        if content.chars().any(is_face_emoji) {
            add(0.8, "engaging visuals");
        }
        if content.contains('!') {
            add(0.6, "enthusiastic tone");
        }
        if content.contains('?') {
            add(0.4, "interactive content");
        }
        if content.contains('#') {
            add(0.2, "social media optimized");
        }

        let educational = count_matches(&lower, &self.config.educational_words);
        if educational > 0 {
            add((educational as f64 * 0.4).min(2.0), "educational value");
        }
        let technical = count_matches(&lower, &self.config.technical_words);
        if technical > 0 {
            add((technical as f64 * 0.3).min(1.5), "technical expertise");
        }
        let positive = count_matches(&lower, &self.config.positive_words);
        if positive > 0 {
            add((positive as f64 * 0.3).min(1.5), "positive sentiment");
        }
        if count_matches(&lower, &self.config.creative_words) > 0 {
            add(1.0, "creative expression");
        }
        let community = count_matches(&lower, &self.config.community_words);
        if community > 0 {
            add((community as f64 * 0.2).min(1.0), "community building");
        }

        let score = (score.clamp(MIN_SCORE, MAX_SCORE) * 10.0).round() / 10.0;
        let suggested_tip = self.suggested_tip(score);
        let reasoning = format!(
            "Quality Score: {score:.1}/10. Factors: {}.",
            factors.join(", ")
        );
        debug!(score, words, suggested_tip = %suggested_tip, "content scored");

        ContentAnalysis {
            score,
            factors,
            reasoning,
            suggested_tip,
        }
    }

    /// `base_tip × score / 5`, rounded to cents
    pub fn suggested_tip(&self, score: f64) -> Amount {
        let score = Decimal::from_f64(score.clamp(MIN_SCORE, MAX_SCORE)).unwrap_or(Decimal::ONE);
        Amount::new((self.config.base_tip.value() * score / Decimal::from(5)).round_dp(2))
    }
}

/// Shape of recent tipping activity, as seen by the application layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TipPattern {
    /// Tips sent in the observed window
    pub frequency: u32,
    pub amount: Amount,
    /// Whether every tip in the window went to the same recipient
    pub same_recipient: bool,
}

/// Flag tipping activity that looks automated or abusive
pub fn is_suspicious(pattern: &TipPattern) -> bool {
    pattern.frequency > 100
        || pattern.amount > Amount::from(10)
        || (pattern.same_recipient && pattern.frequency > 50)
}

fn count_matches(haystack: &str, needles: &[&str]) -> usize {
    needles.iter().filter(|w| haystack.contains(*w)).count()
}

fn is_face_emoji(c: char) -> bool {
    ('\u{1F600}'..='\u{1F64F}').contains(&c)
}
