//! Ordered field resolution over loosely-typed webhook payloads.
//!
//! Both platforms use several names for the same value depending on the
//! event and API revision. Each semantic field is resolved from a tagged,
//! ordered candidate list; the first non-blank candidate wins.

use crate::error::{BridgeError, BridgeResult};

/// One place a value might live in a payload, tagged with its field name.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub source: &'static str,
    pub value: Option<&'a str>,
}

impl<'a> Candidate<'a> {
    pub fn new(source: &'static str, value: Option<&'a str>) -> Self {
        Self { source, value }
    }
}

/// The winning candidate. Trimmed everywhere except message content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub source: &'static str,
    pub value: String,
}

pub fn first_non_empty<'a, I>(candidates: I) -> Option<Resolved>
where
    I: IntoIterator<Item = Candidate<'a>>,
{
    candidates.into_iter().find_map(|candidate| {
        candidate
            .value
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| Resolved {
                source: candidate.source,
                value: value.to_string(),
            })
    })
}

/// Starts with `+`, or is all ASCII digits once spaces and hyphens are removed.
pub fn is_plausible_phone(value: &str) -> bool {
    let trimmed = value.trim();
    if trimmed.starts_with('+') {
        return true;
    }
    let digits: String = trimmed
        .chars()
        .filter(|ch| *ch != ' ' && *ch != '-')
        .collect();
    !digits.is_empty() && digits.chars().all(|ch| ch.is_ascii_digit())
}

/// Recipient for an outgoing inbox message: the structured recipient
/// username, else the first destination handle that looks like a phone number.
pub fn resolve_recipient_phone(
    recipient_username: Option<&str>,
    to_handles: &[&str],
) -> BridgeResult<Resolved> {
    let phone_handle = to_handles
        .iter()
        .copied()
        .find(|handle| is_plausible_phone(handle));
    first_non_empty([
        Candidate::new("message.recipient.username", recipient_username),
        Candidate::new("message.to_handle", phone_handle),
    ])
    .ok_or(BridgeError::MissingRecipient)
}

/// Text of an incoming carrier message, exactly as sent. Blank candidates are
/// skipped; `None` means the event carries no text and should be
/// acknowledged without forwarding.
pub fn resolve_content(content: Option<&str>, body: Option<&str>) -> Option<Resolved> {
    [Candidate::new("content", content), Candidate::new("body", body)]
        .into_iter()
        .find_map(|candidate| {
            candidate
                .value
                .filter(|value| !value.trim().is_empty())
                .map(|value| Resolved {
                    source: candidate.source,
                    value: value.to_string(),
                })
        })
}

pub fn resolve_sender_phone(
    number: Option<&str>,
    from_number: Option<&str>,
) -> BridgeResult<Resolved> {
    first_non_empty([
        Candidate::new("number", number),
        Candidate::new("from_number", from_number),
    ])
    .ok_or(BridgeError::MissingRequiredField("number"))
}

pub fn resolve_destination(sendblue_number: Option<&str>, default_label: &str) -> Resolved {
    first_non_empty([Candidate::new("sendblue_number", sendblue_number)]).unwrap_or_else(|| {
        Resolved {
            source: "default",
            value: default_label.to_string(),
        }
    })
}
