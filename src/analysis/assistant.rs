use anyhow::Result;
use async_trait::async_trait;

use crate::engine::{
    basic_ideas, basic_theme_analysis, ContentIdea, IdeaContext, PageMetadata, PageRef,
    ThemeAnalysis,
};

/// Source of theme analysis and content ideas for an analyzed page.
///
/// Implementations may call out to remote services; the analyzer falls back
/// to the keyword rules whenever a call fails.
#[async_trait]
pub trait ContentAssistant: Send + Sync {
    async fn analyze_themes(
        &self,
        metadata: &PageMetadata,
        page: PageRef<'_>,
    ) -> Result<ThemeAnalysis>;

    async fn generate_ideas(&self, context: &IdeaContext) -> Result<Vec<ContentIdea>>;
}

/// Offline assistant built on the keyword rules. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordAssistant;

#[async_trait]
impl ContentAssistant for KeywordAssistant {
    async fn analyze_themes(
        &self,
        metadata: &PageMetadata,
        page: PageRef<'_>,
    ) -> Result<ThemeAnalysis> {
        Ok(basic_theme_analysis(metadata, page))
    }

    async fn generate_ideas(&self, context: &IdeaContext) -> Result<Vec<ContentIdea>> {
        Ok(basic_ideas(context))
    }
}
