//! Display order and descriptions of known metrics.

use crate::names;
use std::cmp::Ordering;

/// A known metric and the remark shown next to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Metric name
    pub name: String,
    /// One-sentence explanation for dashboard cards
    pub description: String,
}

/// Known metrics in dashboard order.
#[derive(Debug, Clone)]
pub struct MetricCatalog {
    entries: Vec<CatalogEntry>,
}

impl Default for MetricCatalog {
    fn default() -> Self {
        let entries = [
            (
                names::TOTAL_UNIQUE_SESSIONS,
                "Number of unique sessions created for showing chatbot button on website",
            ),
            (
                names::USER_CONSENTED_SESSIONS,
                "Number of sessions where user consented to Terms of Service to use the bot",
            ),
            (
                names::CLICK_THROUGH_RATE,
                "Percentage of users consented to initiate chat out of total chatbot button views",
            ),
            (
                names::ACTIVE_CHAT_SESSIONS,
                "Sessions where users initiated the chat by prompting at least once",
            ),
            (
                names::TOTAL_CHAT_MESSAGES,
                "Total number of chat messages in all the chat sessions",
            ),
            (
                names::AVG_MESSAGES_PER_CHAT_SESSION,
                "Average number of chat messages in a single chat session",
            ),
            (
                names::MAX_MESSAGES_IN_CHAT_SESSION,
                "Maximum number of chat messages in a single chat session",
            ),
            (
                names::TOTAL_ENGAGEMENT_MINUTES,
                "Total time spent by all users across all chat sessions interacting with the bot",
            ),
            (
                names::AVG_SESSION_DURATION_MINUTES,
                "Average time spent by a user chatting with the bot",
            ),
            (
                names::MAX_SESSION_DURATION_MINUTES,
                "Maximum time spent by a user in a single chat session with the bot",
            ),
            (
                names::OTP_LOGGED_IN_SESSIONS,
                "Number of sessions where user logged in via OTP auth to fetch the info",
            ),
            (
                names::MANUALLY_LOGGED_OUT_SESSIONS,
                "Number of sessions where user manually logged out by clicking the logout button",
            ),
        ];

        Self {
            entries: entries
                .into_iter()
                .map(|(name, description)| CatalogEntry {
                    name: name.to_string(),
                    description: description.to_string(),
                })
                .collect(),
        }
    }
}

impl MetricCatalog {
    /// Catalog with the given entries, in order.
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// Description of a known metric.
    pub fn describe(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.description.as_str())
    }

    /// Position of a known metric in display order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.name == name)
    }

    /// Entries in display order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Catalogued metrics first in catalog order, then unknown ones alphabetically.
    pub fn display_order(&self, a: &str, b: &str) -> Ordering {
        match (self.position(a), self.position(b)) {
            (Some(pa), Some(pb)) => pa.cmp(&pb),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.cmp(b),
        }
    }
}
