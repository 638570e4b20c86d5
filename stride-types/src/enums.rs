use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Visible,
    Hidden,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Visible => "visible",
            PostStatus::Hidden => "hidden",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "visible" => Some(PostStatus::Visible),
            "hidden" => Some(PostStatus::Hidden),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionType {
    Like,
    Funny,
    Insightful,
    Fire,
}

impl ReactionType {
    /// Every reaction type, in display order
    pub const ALL: [ReactionType; 4] = [
        ReactionType::Like,
        ReactionType::Funny,
        ReactionType::Insightful,
        ReactionType::Fire,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReactionType::Like => "like",
            ReactionType::Funny => "funny",
            ReactionType::Insightful => "insightful",
            ReactionType::Fire => "fire",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "like" => Some(ReactionType::Like),
            "funny" => Some(ReactionType::Funny),
            "insightful" => Some(ReactionType::Insightful),
            "fire" => Some(ReactionType::Fire),
            _ => None,
        }
    }
}

/// Kind of entity a reaction (or a reaction query) points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Post,
    Comment,
}

impl TargetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetType::Post => "post",
            TargetType::Comment => "comment",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "post" => Some(TargetType::Post),
            "comment" => Some(TargetType::Comment),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FeedFilter {
    #[default]
    Default,
    Following,
    Trending,
}

impl FeedFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedFilter::Default => "default",
            FeedFilter::Following => "following",
            FeedFilter::Trending => "trending",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "default" => Some(FeedFilter::Default),
            "following" => Some(FeedFilter::Following),
            "trending" => Some(FeedFilter::Trending),
            _ => None,
        }
    }
}

/// Outcome of a reaction toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleAction {
    Added,
    Removed,
}

impl ToggleAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToggleAction::Added => "added",
            ToggleAction::Removed => "removed",
        }
    }

    /// The action a second identical toggle would produce
    pub fn inverse(self) -> Self {
        match self {
            ToggleAction::Added => ToggleAction::Removed,
            ToggleAction::Removed => ToggleAction::Added,
        }
    }
}
