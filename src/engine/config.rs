/// Weights applied to each sub-score in the final interest score.
///
/// Sub-scores keep their own scales (time 0-40, scroll 0-20, repeat 0-20,
/// recency 0-10, diversity 0-10); each weight is applied exactly once.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    pub weight_time: f64,
    pub weight_scroll: f64,
    pub weight_repeat: f64,
    pub weight_recency: f64,
    pub weight_diversity: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weight_time: 0.4,
            weight_scroll: 0.2,
            weight_repeat: 0.2,
            weight_recency: 0.1,
            weight_diversity: 0.1,
        }
    }
}
