use crate::models::Topic;

/// Keyword table in priority order: the first topic with any match wins.
const TOPIC_KEYWORDS: &[(Topic, &[&str])] = &[
    (
        Topic::AiAgents,
        &["agent", "crew", "autonomous", "langchain", "autogen", "crewai"],
    ),
    (
        Topic::MachineLearning,
        &["ml", "model", "training", "neural", "deep learning", "transformer"],
    ),
    (
        Topic::WebDevelopment,
        &["react", "nextjs", "typescript", "javascript", "frontend", "backend"],
    ),
    (
        Topic::ProductManagement,
        &["product", "roadmap", "user research", "metrics", "analytics"],
    ),
    (
        Topic::Startups,
        &["startup", "founder", "funding", "yc", "venture", "entrepreneur"],
    ),
    (
        Topic::Blockchain,
        &["crypto", "blockchain", "defi", "nft", "ethereum", "bitcoin"],
    ),
    (
        Topic::DevOps,
        &["docker", "kubernetes", "ci/cd", "deployment", "infrastructure"],
    ),
    (
        Topic::DataScience,
        &["data", "analysis", "visualization", "pandas", "jupyter"],
    ),
    (
        Topic::Security,
        &["security", "vulnerability", "encryption", "authentication", "privacy"],
    ),
    (
        Topic::Cloud,
        &["aws", "azure", "gcp", "cloud", "serverless", "lambda"],
    ),
];

/// Checked against the domain only, after every keyword entry missed.
const DOMAIN_TOPICS: &[(&str, Topic)] = &[
    ("github.com", Topic::OpenSource),
    ("youtube.com", Topic::VideoContent),
    ("substack.com", Topic::Newsletter),
    ("news.ycombinator.com", Topic::TechNews),
];

const DEFAULT_TOPIC: Topic = Topic::GeneralTech;

/// Map a page's title, URL and domain to exactly one topic.
///
/// Plain case-insensitive substring matching, so "html" counts as "ml".
/// Never consults history and always returns a label.
pub fn classify_topic(url: &str, title: Option<&str>, domain: &str) -> Topic {
    let haystack = format!("{} {} {}", title.unwrap_or(""), url, domain).to_lowercase();

    TOPIC_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|keyword| haystack.contains(keyword)))
        .map(|(topic, _)| *topic)
        .or_else(|| topic_for_domain(domain))
        .unwrap_or(DEFAULT_TOPIC)
}

fn topic_for_domain(domain: &str) -> Option<Topic> {
    let domain = domain.to_lowercase();
    DOMAIN_TOPICS
        .iter()
        .find(|(needle, _)| domain.contains(needle))
        .map(|(_, topic)| *topic)
}
