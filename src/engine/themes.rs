//! Keyword theme analysis.
//!
//! Used whenever no content assistant is configured or the assistant fails,
//! so it has to work from nothing but the page reference and whatever
//! metadata happens to be available.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

const MAX_THEMES: usize = 4;
const MAX_TAGS: usize = 10;
const MAX_INSIGHTS: usize = 3;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Tutorial,
    News,
    Analysis,
    Product,
    Discussion,
    #[default]
    Reference,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TechnicalLevel {
    Beginner,
    Intermediate,
    Advanced,
    #[default]
    Mixed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ThemeAnalysis {
    /// High-level themes, at most four.
    pub themes: Vec<String>,
    /// Specific tags, at most ten.
    pub content_tags: Vec<String>,
    pub content_type: ContentType,
    pub key_insights: Vec<String>,
    pub technical_level: TechnicalLevel,
}

impl ThemeAnalysis {
    /// Trim every list to its documented maximum.
    pub fn truncated(mut self) -> Self {
        self.themes.truncate(MAX_THEMES);
        self.content_tags.truncate(MAX_TAGS);
        self.key_insights.truncate(MAX_INSIGHTS);
        self
    }

    pub fn main_theme(&self) -> Option<&str> {
        self.themes.first().map(String::as_str)
    }
}

/// Extra page metadata, typically scraped; empty when unavailable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct PageMetadata {
    pub description: Option<String>,
    pub keywords: Vec<String>,
}

/// Borrowed view of the page a session was spent on.
#[derive(Debug, Clone, Copy)]
pub struct PageRef<'a> {
    pub url: &'a str,
    pub title: Option<&'a str>,
    pub domain: &'a str,
}

static THEME_RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (
            r"\b(ai|artificial intelligence|machine learning|ml|deep learning)\b",
            "Artificial Intelligence",
        ),
        (r"\b(react|vue|angular|frontend|ui|ux)\b", "Frontend Development"),
        (
            r"\b(node|python|backend|api|database|server)\b",
            "Backend Development",
        ),
        (
            r"\b(startup|founder|entrepreneur|business|funding)\b",
            "Startups & Business",
        ),
        (
            r"\b(product|management|roadmap|metrics|analytics)\b",
            "Product Management",
        ),
    ]
    .into_iter()
    .filter_map(|(pattern, theme)| Regex::new(pattern).ok().map(|re| (re, theme)))
    .collect()
});

const DOMAIN_THEMES: &[(&str, [&str; 2])] = &[
    ("github.com", ["Open Source", "Development"]),
    ("youtube.com", ["Video Content", "Learning"]),
    ("substack.com", ["Newsletter", "Writing"]),
    ("news.ycombinator.com", ["Tech News", "Discussion"]),
    ("medium.com", ["Articles", "Insights"]),
    ("stackoverflow.com", ["Q&A", "Programming"]),
    ("twitter.com", ["Social Media", "Updates"]),
    ("linkedin.com", ["Professional", "Networking"]),
];

const FALLBACK_THEMES: [&str; 2] = ["Technology", "General"];

const TECH_TAGS: &[&str] = &[
    "javascript",
    "typescript",
    "python",
    "react",
    "nodejs",
    "api",
    "database",
    "cloud",
    "devops",
    "security",
];

/// Derive themes, tags and a content type from keywords alone.
pub fn basic_theme_analysis(metadata: &PageMetadata, page: PageRef<'_>) -> ThemeAnalysis {
    let text = format!(
        "{} {} {}",
        page.title.unwrap_or(""),
        metadata.description.as_deref().unwrap_or(""),
        metadata.keywords.join(" ")
    )
    .to_lowercase();

    let mut themes: Vec<String> = THEME_RULES
        .iter()
        .filter(|(re, _)| re.is_match(&text))
        .map(|(_, theme)| theme.to_string())
        .collect();

    if themes.is_empty() {
        let defaults = DOMAIN_THEMES
            .iter()
            .find(|(domain, _)| page.domain.contains(domain))
            .map(|(_, themes)| *themes)
            .unwrap_or(FALLBACK_THEMES);
        themes.extend(defaults.iter().map(|theme| theme.to_string()));
    }

    let mut tags: Vec<String> = Vec::new();
    let candidates = metadata
        .keywords
        .iter()
        .map(|keyword| keyword.to_lowercase())
        .chain(
            TECH_TAGS
                .iter()
                .filter(|tag| text.contains(*tag))
                .map(|tag| tag.to_string()),
        );
    for tag in candidates {
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }

    let content_type = detect_content_type(&text, page);
    let key_insights = vec![format!("Content about {}", themes[0])];

    ThemeAnalysis {
        themes,
        content_tags: tags,
        content_type,
        key_insights,
        technical_level: TechnicalLevel::Mixed,
    }
    .truncated()
}

fn detect_content_type(text: &str, page: PageRef<'_>) -> ContentType {
    let has_any = |needles: &[&str]| needles.iter().any(|needle| text.contains(needle));

    if has_any(&["tutorial", "how to", "guide"]) {
        ContentType::Tutorial
    } else if has_any(&["announcement", "launched", "introducing"]) {
        ContentType::News
    } else if has_any(&["analysis", "deep dive", "explained"]) {
        ContentType::Analysis
    } else if page.domain.contains("github.com") && page.url.contains("/issues/") {
        ContentType::Discussion
    } else {
        ContentType::Reference
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page<'a>(url: &'a str, title: Option<&'a str>, domain: &'a str) -> PageRef<'a> {
        PageRef { url, title, domain }
    }

    #[test]
    fn keyword_rules_collect_themes_in_order() {
        let analysis = basic_theme_analysis(
            &PageMetadata::default(),
            page(
                "https://example.com/a",
                Some("A React frontend for your ML startup"),
                "example.com",
            ),
        );
        assert_eq!(
            analysis.themes,
            vec![
                "Artificial Intelligence",
                "Frontend Development",
                "Startups & Business"
            ]
        );
        assert_eq!(analysis.key_insights, vec!["Content about Artificial Intelligence"]);
        assert_eq!(analysis.technical_level, TechnicalLevel::Mixed);
    }

    #[test]
    fn rules_need_whole_words() {
        // "email" and "build" must not trigger the ai / ui rules.
        let analysis = basic_theme_analysis(
            &PageMetadata::default(),
            page("https://example.com/a", Some("Email build notes"), "example.com"),
        );
        assert_eq!(analysis.themes, vec!["Technology", "General"]);
    }

    #[test]
    fn domain_themes_apply_when_no_rule_matches() {
        let analysis = basic_theme_analysis(
            &PageMetadata::default(),
            page("https://stackoverflow.com/q/1", Some("Borrow checker woes"), "stackoverflow.com"),
        );
        assert_eq!(analysis.themes, vec!["Q&A", "Programming"]);
    }

    #[test]
    fn tags_merge_metadata_and_tech_terms_without_duplicates() {
        let metadata = PageMetadata {
            description: Some("Using Python and a database in the cloud".into()),
            keywords: vec!["Python".into(), "Postgres".into()],
        };
        let analysis = basic_theme_analysis(&metadata, page("https://example.com", None, "example.com"));
        assert_eq!(analysis.content_tags, vec!["python", "postgres", "database", "cloud"]);
    }

    #[test]
    fn tags_are_capped_at_ten() {
        let metadata = PageMetadata {
            description: None,
            keywords: (0..15).map(|i| format!("tag{i}")).collect(),
        };
        let analysis = basic_theme_analysis(&metadata, page("https://example.com", None, "example.com"));
        assert_eq!(analysis.content_tags.len(), 10);
        assert_eq!(analysis.content_tags[0], "tag0");
    }

    #[test]
    fn content_type_detection_priority() {
        let meta = PageMetadata::default();
        let tutorial = basic_theme_analysis(
            &meta,
            page("https://example.com", Some("How to write a deep dive"), "example.com"),
        );
        assert_eq!(tutorial.content_type, ContentType::Tutorial);

        let news = basic_theme_analysis(
            &meta,
            page("https://example.com", Some("Introducing v2"), "example.com"),
        );
        assert_eq!(news.content_type, ContentType::News);

        let analysis = basic_theme_analysis(
            &meta,
            page("https://example.com", Some("Lifetimes explained"), "example.com"),
        );
        assert_eq!(analysis.content_type, ContentType::Analysis);

        let discussion = basic_theme_analysis(
            &meta,
            page("https://github.com/a/b/issues/12", Some("Crash on start"), "github.com"),
        );
        assert_eq!(discussion.content_type, ContentType::Discussion);

        let reference = basic_theme_analysis(
            &meta,
            page("https://example.com", Some("Changelog"), "example.com"),
        );
        assert_eq!(reference.content_type, ContentType::Reference);
    }

    #[test]
    fn truncated_caps_every_list() {
        let analysis = ThemeAnalysis {
            themes: (0..6).map(|i| i.to_string()).collect(),
            content_tags: (0..12).map(|i| i.to_string()).collect(),
            key_insights: (0..5).map(|i| i.to_string()).collect(),
            ..ThemeAnalysis::default()
        }
        .truncated();
        assert_eq!(analysis.themes.len(), 4);
        assert_eq!(analysis.content_tags.len(), 10);
        assert_eq!(analysis.key_insights.len(), 3);
    }

    #[test]
    fn deserializes_partial_assistant_output() {
        let parsed: ThemeAnalysis =
            serde_json::from_str(r#"{"themes":["Rust"],"contentType":"tutorial"}"#).unwrap();
        assert_eq!(parsed.themes, vec!["Rust"]);
        assert_eq!(parsed.content_type, ContentType::Tutorial);
        assert_eq!(parsed.technical_level, TechnicalLevel::Mixed);
        assert!(parsed.content_tags.is_empty());
    }
}
