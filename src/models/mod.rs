//! Data-transfer shapes for Reddit API resources.
//!
//! These mirror the JSON the API returns and are meant to be used as the
//! target type of [`CredentialSession::get`](crate::oauth::CredentialSession::get).
//! Fields the API sometimes omits or nulls are `Option`s.

pub mod account;
pub mod link;
pub mod thing;

pub use account::Identity;
pub use link::{Comment, Edited, Gildings, Link, MediaEmbed, Replies, Submission, SubredditType};
pub use thing::{Listing, Thing};
