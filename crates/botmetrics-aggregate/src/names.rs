//! Metric names produced by the session export backend and by the engine.

/// Sessions created for showing the chatbot button.
pub const TOTAL_UNIQUE_SESSIONS: &str = "Total unique sessions";
/// Sessions where the user accepted the terms of service.
pub const USER_CONSENTED_SESSIONS: &str = "User consented sessions";
/// Sessions where the user prompted at least once.
pub const ACTIVE_CHAT_SESSIONS: &str = "Active chat sessions";
/// Chat messages across all active chat sessions.
pub const TOTAL_CHAT_MESSAGES: &str = "Total chat messages";
/// Longest conversation, in messages.
pub const MAX_MESSAGES_IN_CHAT_SESSION: &str = "Max messages in a chat session";
/// Minutes spent chatting across all active chat sessions.
pub const TOTAL_ENGAGEMENT_MINUTES: &str = "Total engagement time (minutes)";
/// Longest conversation, in minutes.
pub const MAX_SESSION_DURATION_MINUTES: &str = "Max session duration (minutes)";
/// Sessions authenticated through OTP.
pub const OTP_LOGGED_IN_SESSIONS: &str = "OTP logged in chat sessions";
/// Sessions closed with the logout button.
pub const MANUALLY_LOGGED_OUT_SESSIONS: &str = "Manually logged out chat sessions";

/// Consented over total unique sessions, in percent.
pub const CLICK_THROUGH_RATE: &str = "Click Through Rate (%)";
/// Chat messages per active chat session.
pub const AVG_MESSAGES_PER_CHAT_SESSION: &str = "Avg messages per chat session";
/// Engagement minutes per active chat session.
pub const AVG_SESSION_DURATION_MINUTES: &str = "Avg session duration (minutes, active chat sessions)";

/// Prefix marking a metric reduced by maximum.
pub const MAXIMUM_PREFIX: &str = "Max ";
