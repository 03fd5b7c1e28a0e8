use serde::{Deserialize, Deserializer, Serialize};

use crate::engine::themes::{ContentType, ThemeAnalysis};

const DEEP_DIVE_MIN_SCORE: u8 = 70;
const HOOK_TITLE_CHARS: usize = 50;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IdeaFormat {
    Tweet,
    Thread,
    Linkedin,
    Blog,
    Video,
}

impl IdeaFormat {
    /// Normalize free-form format labels ("LinkedIn post", "YouTube Shorts", ...).
    pub fn parse_loose(raw: &str) -> IdeaFormat {
        let raw = raw.to_lowercase();
        if raw.contains("linkedin") {
            IdeaFormat::Linkedin
        } else if raw.contains("thread") {
            IdeaFormat::Thread
        } else if raw.contains("blog") {
            IdeaFormat::Blog
        } else if raw.contains("video") || raw.contains("shorts") {
            IdeaFormat::Video
        } else {
            IdeaFormat::Tweet
        }
    }
}

fn deserialize_format<'de, D>(deserializer: D) -> Result<IdeaFormat, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().map(IdeaFormat::parse_loose).unwrap_or(IdeaFormat::Tweet))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EstimatedReach {
    /// 1-100
    pub score: u8,
    pub reasoning: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContentIdea {
    pub title: String,
    pub hook: String,
    #[serde(deserialize_with = "deserialize_format", default = "default_format")]
    pub format: IdeaFormat,
    pub estimated_reach: EstimatedReach,
    pub angle: String,
    #[serde(default)]
    pub draft_content: Option<String>,
    #[serde(default)]
    pub outline: Vec<String>,
    #[serde(default)]
    pub hashtags: Vec<String>,
}

fn default_format() -> IdeaFormat {
    IdeaFormat::Tweet
}

/// Everything an idea generator may draw on for one analyzed session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeaContext {
    pub url: String,
    pub title: Option<String>,
    pub domain: String,
    pub interest_score: u8,
    /// Engaged time in whole seconds.
    pub session_seconds: u64,
    pub scroll_percent: u8,
    pub themes: ThemeAnalysis,
    pub recent_topics: Vec<String>,
    pub user_expertise: Vec<String>,
    pub weekly_interests: Vec<String>,
}

impl IdeaContext {
    fn minutes(&self) -> u64 {
        (self.session_seconds as f64 / 60.0).round() as u64
    }
}

/// Template ideas derived from engagement and content type.
///
/// Always returns at least the quick-insight tweet.
pub fn basic_ideas(context: &IdeaContext) -> Vec<ContentIdea> {
    let main_theme = context
        .themes
        .main_theme()
        .unwrap_or("this topic")
        .to_string();
    let theme_tag: String = main_theme
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let minutes = context.minutes();
    let mut ideas = Vec::new();

    if context.interest_score > DEEP_DIVE_MIN_SCORE {
        let hook = format!(
            "I spent {minutes} minutes diving into {main_theme}. Here's what blew my mind:"
        );
        ideas.push(ContentIdea {
            title: format!("Deep dive into {main_theme}"),
            draft_content: Some(format!(
                "1/ {hook}\n\n2/ First key insight from the article...\n\n3/ What this means for builders...\n\n4/ How you can apply this today...\n\n5/ Resources to go deeper:"
            )),
            hook,
            format: IdeaFormat::Thread,
            estimated_reach: EstimatedReach {
                score: 75,
                reasoning: "Deep dives on trending topics perform well".into(),
            },
            angle: "Personal learning journey with practical takeaways".into(),
            outline: Vec::new(),
            hashtags: vec![theme_tag.clone(), "buildinpublic".into(), "learning".into()],
        });
    }

    if context.themes.content_type == ContentType::Tutorial {
        ideas.push(ContentIdea {
            title: format!("How to implement {main_theme} (practical guide)"),
            hook: format!(
                "Just learned an elegant approach to {main_theme}. Here's how you can implement it:"
            ),
            format: IdeaFormat::Blog,
            estimated_reach: EstimatedReach {
                score: 80,
                reasoning: "Practical tutorials have high search value".into(),
            },
            angle: "Step-by-step implementation guide".into(),
            draft_content: Some(format!(
                "Just spent {minutes} minutes diving into {main_theme}, and I finally found an approach that clicks. If you've been struggling with this too, here's what made the difference for me.\n\nThe core insight is actually quite simple once you see it. Most tutorials overcomplicate things, but the key is understanding that...\n\n[Continue with specific implementation details based on the actual content]"
            )),
            outline: [
                "The problem it solves",
                "Core concepts explained simply",
                "Implementation walkthrough",
                "Common pitfalls to avoid",
                "Next steps and resources",
            ]
            .iter()
            .map(|point| point.to_string())
            .collect(),
            hashtags: vec![
                theme_tag.clone(),
                "tutorial".into(),
                "webdev".into(),
                "coding".into(),
            ],
        });
    }

    if matches!(
        context.themes.content_type,
        ContentType::News | ContentType::Product
    ) {
        let subject = context
            .title
            .as_deref()
            .map(|title| title.chars().take(HOOK_TITLE_CHARS).collect::<String>())
            .unwrap_or_else(|| main_theme.clone());
        let hook = format!(
            "Everyone's talking about {subject}, but here's what it really means for builders:"
        );
        ideas.push(ContentIdea {
            title: format!("Why {main_theme} matters for builders"),
            draft_content: Some(format!(
                "{hook}\n\nWhile the headlines focus on [mainstream angle], the real opportunity is in [builder angle].\n\nThree immediate actions you can take:\n\n1. [Action 1]\n2. [Action 2]\n3. [Action 3]\n\nThe builders who move on this now will have a significant advantage.\n\nWhat's your take on this development?"
            )),
            hook,
            format: IdeaFormat::Linkedin,
            estimated_reach: EstimatedReach {
                score: 70,
                reasoning: "Timely commentary on news gets engagement".into(),
            },
            angle: "Builder perspective on industry news".into(),
            outline: Vec::new(),
            hashtags: vec![
                theme_tag.clone(),
                "startup".into(),
                "innovation".into(),
                "buildinpublic".into(),
            ],
        });
    }

    let insight = context.themes.key_insights.first();
    ideas.push(ContentIdea {
        title: format!("Quick insight on {main_theme}"),
        hook: format!(
            "{} {}",
            insight
                .cloned()
                .unwrap_or_else(|| format!("Interesting perspective on {main_theme}")),
            context.url
        ),
        format: IdeaFormat::Tweet,
        estimated_reach: EstimatedReach {
            score: 60,
            reasoning: "Quick insights are shareable".into(),
        },
        angle: "Concise takeaway with link to source".into(),
        draft_content: Some(format!(
            "{}\n\nSpent {minutes} minutes on this and it was worth every second.\n\n{}",
            insight
                .cloned()
                .unwrap_or_else(|| format!("Fascinating perspective on {main_theme}")),
            context.url
        )),
        outline: Vec::new(),
        hashtags: vec![theme_tag, "buildinpublic".into()],
    });

    ideas
}
