//! Leaderboard endpoint mapping.
//!
//! The proxy exposes a closed set of logical endpoints. Each one maps to a
//! fixed path template on the upstream, parameterized by a wallet address.
//! Anything outside the set is rejected before a request is made.

use std::fmt;
use std::str::FromStr;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::defaults::{MYSTERY_BOX_PAGE, MYSTERY_BOX_PAGE_SIZE};
use crate::error::ProxyError;

/// Characters escaped when the address is placed in a path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// A recognized leaderboard endpoint.
///
/// # Example
///
/// ```
/// use xpgate_core::Endpoint;
///
/// let endpoint: Endpoint = "mystery-box".parse().unwrap();
/// assert_eq!(
///     endpoint.path("0xabc"),
///     "/xp/0xabc/mystery-box?page_size=20&page=1"
/// );
/// assert!("leaderboard".parse::<Endpoint>().is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endpoint {
    /// Total XP of a wallet.
    Xp,
    /// Badges earned by a wallet.
    Badges,
    /// First page of a wallet's mystery boxes.
    MysteryBox,
}

impl Endpoint {
    /// All recognized endpoints.
    pub const ALL: [Endpoint; 3] = [Endpoint::Xp, Endpoint::Badges, Endpoint::MysteryBox];

    /// Returns the query-string name of the endpoint.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Xp => "xp",
            Self::Badges => "badges",
            Self::MysteryBox => "mystery-box",
        }
    }

    /// Builds the upstream path and query for `address`.
    ///
    /// The address is escaped as a single path segment.
    pub fn path(self, address: &str) -> String {
        let address = utf8_percent_encode(address, PATH_SEGMENT);
        match self {
            Self::Xp => format!("/xp/{address}"),
            Self::Badges => format!("/xp/{address}/badges"),
            Self::MysteryBox => format!(
                "/xp/{address}/mystery-box?page_size={MYSTERY_BOX_PAGE_SIZE}&page={MYSTERY_BOX_PAGE}"
            ),
        }
    }

    /// Builds the absolute upstream URL for `address` under `base_url`.
    pub fn upstream_url(self, base_url: &str, address: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.path(address))
    }
}

impl FromStr for Endpoint {
    type Err = ProxyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|endpoint| endpoint.as_str() == s)
            .ok_or_else(|| ProxyError::UnknownEndpoint(s.to_string()))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
