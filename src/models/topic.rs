use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse topic label drawn from a closed vocabulary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Topic {
    #[serde(rename = "AI Agents")]
    AiAgents,
    #[serde(rename = "Machine Learning")]
    MachineLearning,
    #[serde(rename = "Web Development")]
    WebDevelopment,
    #[serde(rename = "Product Management")]
    ProductManagement,
    #[serde(rename = "Startups")]
    Startups,
    #[serde(rename = "Blockchain")]
    Blockchain,
    #[serde(rename = "DevOps")]
    DevOps,
    #[serde(rename = "Data Science")]
    DataScience,
    #[serde(rename = "Security")]
    Security,
    #[serde(rename = "Cloud")]
    Cloud,
    #[serde(rename = "Open Source")]
    OpenSource,
    #[serde(rename = "Video Content")]
    VideoContent,
    #[serde(rename = "Newsletter")]
    Newsletter,
    #[serde(rename = "Tech News")]
    TechNews,
    #[serde(rename = "General Tech")]
    GeneralTech,
}

impl Topic {
    pub const ALL: [Topic; 15] = [
        Topic::AiAgents,
        Topic::MachineLearning,
        Topic::WebDevelopment,
        Topic::ProductManagement,
        Topic::Startups,
        Topic::Blockchain,
        Topic::DevOps,
        Topic::DataScience,
        Topic::Security,
        Topic::Cloud,
        Topic::OpenSource,
        Topic::VideoContent,
        Topic::Newsletter,
        Topic::TechNews,
        Topic::GeneralTech,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Topic::AiAgents => "AI Agents",
            Topic::MachineLearning => "Machine Learning",
            Topic::WebDevelopment => "Web Development",
            Topic::ProductManagement => "Product Management",
            Topic::Startups => "Startups",
            Topic::Blockchain => "Blockchain",
            Topic::DevOps => "DevOps",
            Topic::DataScience => "Data Science",
            Topic::Security => "Security",
            Topic::Cloud => "Cloud",
            Topic::OpenSource => "Open Source",
            Topic::VideoContent => "Video Content",
            Topic::Newsletter => "Newsletter",
            Topic::TechNews => "Tech News",
            Topic::GeneralTech => "General Tech",
        }
    }

    pub fn from_label(label: &str) -> Option<Topic> {
        Topic::ALL.into_iter().find(|topic| topic.label() == label)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
