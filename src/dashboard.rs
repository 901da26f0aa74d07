//! Admin dashboard view model.
//!
//! Shapes store state into what the dashboard page renders: headline stats
//! and a table of the most recent contact submissions.

use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::contact::Contact;
use crate::credentials::Credentials;

pub const RECENT_LIMIT: usize = 10;
pub const MESSAGE_PREVIEW_CHARS: usize = 50;
const PLACEHOLDER: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub total_contacts: usize,
    /// `"ON"` or `"OFF"`.
    pub maintenance_status: &'static str,
    pub maintenance_on: bool,
    pub username: String,
    /// Newest first, at most [`RECENT_LIMIT`] rows.
    pub recent: Vec<ContactRow>,
}

/// One rendered row of the recent-submissions table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactRow {
    pub name: String,
    pub email: String,
    pub service: String,
    pub message: String,
    pub date: String,
}

impl DashboardSummary {
    #[must_use]
    pub fn build(contacts: &[Contact], maintenance_on: bool, credentials: &Credentials) -> Self {
        let recent = contacts.iter().rev().take(RECENT_LIMIT).map(ContactRow::from_contact).collect();
        let username = if credentials.username.is_empty() {
            "admin".to_owned()
        } else {
            credentials.username.clone()
        };

        Self {
            total_contacts: contacts.len(),
            maintenance_status: maintenance_status(maintenance_on),
            maintenance_on,
            username,
            recent,
        }
    }
}

impl ContactRow {
    #[must_use]
    pub fn from_contact(contact: &Contact) -> Self {
        Self {
            name: or_placeholder(&contact.name),
            email: or_placeholder(&contact.email),
            service: or_placeholder(&contact.service),
            message: or_placeholder(&preview(&contact.message)),
            date: display_date(&contact.timestamp),
        }
    }
}

#[must_use]
pub fn maintenance_status(enabled: bool) -> &'static str {
    if enabled { "ON" } else { "OFF" }
}

/// Truncate to [`MESSAGE_PREVIEW_CHARS`] characters, marking the cut with `...`.
#[must_use]
pub fn preview(message: &str) -> String {
    match message.char_indices().nth(MESSAGE_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &message[..cut]),
        None => message.to_owned(),
    }
}

/// Calendar date (`YYYY-MM-DD`, UTC) of an ISO 8601 timestamp.
///
/// Unparseable timestamps are shown as stored.
#[must_use]
pub fn display_date(timestamp: &str) -> String {
    match OffsetDateTime::parse(timestamp, &Rfc3339) {
        Ok(at) => at.to_offset(time::UtcOffset::UTC).date().to_string(),
        Err(_) => or_placeholder(timestamp),
    }
}

fn or_placeholder(value: &str) -> String {
    if value.is_empty() { PLACEHOLDER.to_owned() } else { value.to_owned() }
}

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod tests;
