//! Links (`t3`), submissions and comments (`t1`).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::thing::{Listing, Thing};

/// `false` when never edited, otherwise the edit time in epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Edited {
    Flag(bool),
    At(f64),
}

impl Default for Edited {
    fn default() -> Self {
        Self::Flag(false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubredditType {
    Public,
    Private,
    Restricted,
    GoldRestricted,
    Archived,
    User,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gildings {
    #[serde(default)]
    pub gid_1: Option<u64>,
    #[serde(default)]
    pub gid_2: Option<u64>,
    #[serde(default)]
    pub gid_3: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaEmbed {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub scrolling: Option<bool>,
    #[serde(default)]
    pub media_domain_url: Option<String>,
}

/// Reply tree under a comment. The API sends `""` when there are none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Replies {
    Thread(Box<Thing<Listing<Comment>>>),
    Empty(String),
}

impl Default for Replies {
    fn default() -> Self {
        Self::Empty(String::new())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub author: String,
    #[serde(default)]
    pub author_flair_css_class: Option<String>,
    #[serde(default)]
    pub author_flair_text: Option<String>,
    #[serde(default)]
    pub approved_by: Option<String>,
    #[serde(default)]
    pub banned_by: Option<String>,
    pub body: String,
    #[serde(default)]
    pub body_html: Option<String>,
    #[serde(default)]
    pub edited: Edited,
    #[serde(default)]
    pub gilded: u32,
    #[serde(default)]
    pub link_author: Option<String>,
    #[serde(default)]
    pub link_id: Option<String>,
    #[serde(default)]
    pub link_title: Option<String>,
    #[serde(default)]
    pub link_url: Option<String>,
    #[serde(default)]
    pub num_reports: Option<u32>,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub replies: Replies,
    #[serde(default)]
    pub saved: bool,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub score_hidden: bool,
    pub subreddit: String,
    #[serde(default)]
    pub subreddit_id: Option<String>,
    #[serde(default)]
    pub distinguished: Option<String>,
    #[serde(default)]
    pub ups: i64,
    #[serde(default)]
    pub downs: i64,
    /// `Some(true)` upvoted, `Some(false)` downvoted, `None` no vote.
    #[serde(default)]
    pub likes: Option<bool>,
    #[serde(default)]
    pub created: f64,
    #[serde(default)]
    pub created_utc: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub author: String,
    #[serde(default)]
    pub author_flair_css_class: Option<String>,
    #[serde(default)]
    pub author_flair_text: Option<String>,
    #[serde(default)]
    pub clicked: bool,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub is_self: bool,
    #[serde(default)]
    pub link_flair_css_class: Option<String>,
    #[serde(default)]
    pub link_flair_text: Option<String>,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub media: Option<Value>,
    #[serde(default)]
    pub media_embed: Option<MediaEmbed>,
    #[serde(default)]
    pub num_comments: u64,
    #[serde(default)]
    pub over_18: bool,
    pub permalink: String,
    #[serde(default)]
    pub saved: bool,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub selftext: Option<String>,
    #[serde(default)]
    pub selftext_html: Option<String>,
    pub subreddit: String,
    #[serde(default)]
    pub subreddit_id: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub edited: Edited,
    #[serde(default)]
    pub distinguished: Option<String>,
    #[serde(default)]
    pub stickied: bool,
    #[serde(default)]
    pub ups: i64,
    #[serde(default)]
    pub downs: i64,
    #[serde(default)]
    pub likes: Option<bool>,
    #[serde(default)]
    pub created: f64,
    #[serde(default)]
    pub created_utc: f64,
}

/// Item of a saved/submitted listing: a link or, in mixed listings, a
/// comment, so the comment-only fields are optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: String,
    pub name: String,
    pub author: String,
    #[serde(default)]
    pub author_fullname: Option<String>,
    pub subreddit: String,
    #[serde(default)]
    pub subreddit_id: Option<String>,
    #[serde(default)]
    pub subreddit_name_prefixed: Option<String>,
    #[serde(default)]
    pub subreddit_type: Option<SubredditType>,
    #[serde(default)]
    pub subreddit_subscribers: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub selftext: Option<String>,
    #[serde(default)]
    pub selftext_html: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub url_overridden_by_dest: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    pub permalink: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub post_hint: Option<String>,
    #[serde(default)]
    pub is_self: Option<bool>,
    #[serde(default)]
    pub is_video: Option<bool>,
    #[serde(default)]
    pub over_18: bool,
    #[serde(default)]
    pub spoiler: Option<bool>,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub stickied: bool,
    #[serde(default)]
    pub pinned: Option<bool>,
    #[serde(default)]
    pub saved: bool,
    #[serde(default)]
    pub hidden: Option<bool>,
    #[serde(default)]
    pub clicked: Option<bool>,
    #[serde(default)]
    pub visited: Option<bool>,
    #[serde(default)]
    pub edited: Edited,
    #[serde(default)]
    pub gilded: u32,
    #[serde(default)]
    pub gildings: Gildings,
    #[serde(default)]
    pub total_awards_received: u32,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub upvote_ratio: Option<f64>,
    #[serde(default)]
    pub ups: i64,
    #[serde(default)]
    pub downs: i64,
    #[serde(default)]
    pub likes: Option<bool>,
    #[serde(default)]
    pub num_comments: u64,
    #[serde(default)]
    pub num_crossposts: Option<u64>,
    #[serde(default)]
    pub link_flair_text: Option<String>,
    #[serde(default)]
    pub link_flair_css_class: Option<String>,
    #[serde(default)]
    pub author_flair_text: Option<String>,
    #[serde(default)]
    pub author_flair_css_class: Option<String>,
    #[serde(default)]
    pub distinguished: Option<String>,
    #[serde(default)]
    pub media: Option<Value>,
    #[serde(default)]
    pub secure_media: Option<Value>,
    #[serde(default)]
    pub media_embed: Option<MediaEmbed>,
    #[serde(default)]
    pub preview: Option<Value>,
    #[serde(default)]
    pub crosspost_parent: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub body_html: Option<String>,
    #[serde(default)]
    pub link_id: Option<String>,
    #[serde(default)]
    pub link_title: Option<String>,
    #[serde(default)]
    pub link_permalink: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub created: f64,
    #[serde(default)]
    pub created_utc: f64,
}
