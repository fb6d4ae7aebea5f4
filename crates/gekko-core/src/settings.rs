use std::time::Duration;

use chrono::Datelike;

use crate::chunking::ChunkStrategy;

/// Tunables for [`crate::Assistant`].
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    /// Maximum characters per transcript chunk, and the cap on serialized
    /// statement rows sent for metric summaries.
    pub chunk_size: usize,
    pub chunk_strategy: ChunkStrategy,
    /// Pause between chunk summaries.
    pub chunk_delay: Duration,
    /// Pause between transcripts.
    pub transcript_delay: Duration,
    /// Run a second summary over the surviving chunk summaries.
    pub condense_summaries: bool,
    /// Year used when an earnings-call question names none.
    pub default_year: Option<i32>,
    pub metric_limit: u32,
    pub metric_max_limit: u32,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            chunk_size: 6000,
            chunk_strategy: ChunkStrategy::Fixed,
            chunk_delay: Duration::from_millis(125),
            transcript_delay: Duration::from_millis(500),
            condense_summaries: true,
            default_year: None,
            metric_limit: 5,
            metric_max_limit: 20,
        }
    }
}

impl PipelineSettings {
    /// Defaults without any rate-limit pauses.
    pub fn immediate() -> Self {
        Self {
            chunk_delay: Duration::ZERO,
            transcript_delay: Duration::ZERO,
            ..Self::default()
        }
    }

    /// The configured default year, or the current calendar year.
    pub fn effective_year(&self) -> i32 {
        self.default_year
            .unwrap_or_else(|| chrono::Utc::now().year())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_year_wins() {
        let settings = PipelineSettings {
            default_year: Some(2021),
            ..PipelineSettings::default()
        };
        assert_eq!(settings.effective_year(), 2021);
    }

    #[test]
    fn falls_back_to_current_year() {
        let year = chrono::Utc::now().year();
        assert_eq!(PipelineSettings::default().effective_year(), year);
    }
}
