//! OAuth scopes understood by the Reddit API.
//!
//! Scopes are opaque tags to this crate: they are rendered into the consent
//! URL and parsed back out of token responses, but never interpreted.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// A permission the resource owner can grant to the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Account,
    Creddits,
    Edit,
    Flair,
    History,
    Identity,
    LiveManage,
    ModConfig,
    ModContributors,
    ModFlair,
    ModLog,
    ModMail,
    ModOthers,
    ModPosts,
    ModSelf,
    ModWiki,
    MySubreddits,
    PrivateMessages,
    Read,
    Report,
    Save,
    StructuredStyles,
    Submit,
    Subscribe,
    Vote,
    WikiEdit,
    WikiRead,
}

impl Scope {
    /// Every scope, in wire-name order.
    pub const ALL: [Scope; 27] = [
        Scope::Account,
        Scope::Creddits,
        Scope::Edit,
        Scope::Flair,
        Scope::History,
        Scope::Identity,
        Scope::LiveManage,
        Scope::ModConfig,
        Scope::ModContributors,
        Scope::ModFlair,
        Scope::ModLog,
        Scope::ModMail,
        Scope::ModOthers,
        Scope::ModPosts,
        Scope::ModSelf,
        Scope::ModWiki,
        Scope::MySubreddits,
        Scope::PrivateMessages,
        Scope::Read,
        Scope::Report,
        Scope::Save,
        Scope::StructuredStyles,
        Scope::Submit,
        Scope::Subscribe,
        Scope::Vote,
        Scope::WikiEdit,
        Scope::WikiRead,
    ];

    /// The exact string the provider uses for this scope.
    pub fn as_str(self) -> &'static str {
        match self {
            Scope::Account => "account",
            Scope::Creddits => "creddits",
            Scope::Edit => "edit",
            Scope::Flair => "flair",
            Scope::History => "history",
            Scope::Identity => "identity",
            Scope::LiveManage => "livemanage",
            Scope::ModConfig => "modconfig",
            Scope::ModContributors => "modcontributors",
            Scope::ModFlair => "modflair",
            Scope::ModLog => "modlog",
            Scope::ModMail => "modmail",
            Scope::ModOthers => "modothers",
            Scope::ModPosts => "modposts",
            Scope::ModSelf => "modself",
            Scope::ModWiki => "modwiki",
            Scope::MySubreddits => "mysubreddits",
            Scope::PrivateMessages => "privatemessages",
            Scope::Read => "read",
            Scope::Report => "report",
            Scope::Save => "save",
            Scope::StructuredStyles => "structuredstyles",
            Scope::Submit => "submit",
            Scope::Subscribe => "subscribe",
            Scope::Vote => "vote",
            Scope::WikiEdit => "wikiedit",
            Scope::WikiRead => "wikiread",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scope::ALL
            .iter()
            .copied()
            .find(|scope| scope.as_str() == s)
            .ok_or_else(|| format!("Unknown scope: {s}"))
    }
}

/// An unordered, duplicate-free collection of scopes.
///
/// Backed by a `BTreeSet` so that rendering is reproducible.
pub type ScopeSet = BTreeSet<Scope>;

/// Render scopes as the single space-joined string the provider expects.
pub fn join_scopes<'a>(scopes: impl IntoIterator<Item = &'a Scope>) -> String {
    scopes
        .into_iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse a whitespace-delimited scope string.
///
/// Any run of whitespace separates tokens, duplicates collapse, and tokens
/// that are not known scopes are dropped with a warning.
pub fn parse_scopes(raw: &str) -> ScopeSet {
    raw.split_whitespace()
        .filter_map(|token| match token.parse::<Scope>() {
            Ok(scope) => Some(scope),
            Err(_) => {
                warn!(scope = %token, "Ignoring unrecognized scope in token response");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_wire_names_round_trip() {
        for scope in Scope::ALL {
            assert_eq!(scope.as_str().parse::<Scope>().unwrap(), scope);
            assert_eq!(scope.to_string(), scope.as_str());
        }
    }

    #[test]
    fn test_unknown_scope_rejected() {
        assert!("telepathy".parse::<Scope>().is_err());
        assert!("READ".parse::<Scope>().is_err());
    }

    #[test]
    fn test_parse_read_history() {
        let expected: ScopeSet = [Scope::Read, Scope::History].into_iter().collect();
        assert_eq!(parse_scopes("read history"), expected);
        assert_eq!(parse_scopes("  read\t\thistory \n"), expected);
        assert_eq!(parse_scopes("history read read"), expected);
    }

    #[test]
    fn test_parse_skips_unknown_tokens() {
        let parsed = parse_scopes("read * identity");
        assert_eq!(parsed.len(), 2);
        assert!(parsed.contains(&Scope::Read));
        assert!(parsed.contains(&Scope::Identity));
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse_scopes("").is_empty());
        assert!(parse_scopes("   ").is_empty());
    }

    #[test]
    fn test_join_scopes() {
        let scopes: ScopeSet = [Scope::Vote, Scope::Read].into_iter().collect();
        assert_eq!(join_scopes(&scopes), "read vote");
    }

    #[test]
    fn test_serde_uses_wire_names() {
        let json = serde_json::to_string(&Scope::MySubreddits).unwrap();
        assert_eq!(json, "\"mysubreddits\"");
        let back: Scope = serde_json::from_str("\"wikiread\"").unwrap();
        assert_eq!(back, Scope::WikiRead);
    }

    fn whitespace() -> impl Strategy<Value = String> {
        proptest::collection::vec(prop_oneof![Just(' '), Just('\t'), Just('\n')], 1..4)
            .prop_map(|chars| chars.into_iter().collect())
    }

    proptest! {
        #[test]
        fn prop_parse_ignores_separator_shape(
            picks in proptest::collection::vec(0..Scope::ALL.len(), 0..8),
            seps in proptest::collection::vec(whitespace(), 8),
        ) {
            let mut raw = String::new();
            for (i, idx) in picks.iter().enumerate() {
                raw.push_str(Scope::ALL[*idx].as_str());
                raw.push_str(&seps[i]);
            }
            let expected: ScopeSet = picks.iter().map(|i| Scope::ALL[*i]).collect();
            prop_assert_eq!(parse_scopes(&raw), expected);
        }
    }
}
