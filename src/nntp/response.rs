//! NNTP status lines.

use crate::error::NntpError;

/// Status codes used by the client
pub mod codes {
    /// Service available, posting allowed
    pub const SERVICE_AVAILABLE_POSTING: u16 = 200;
    /// Service available, posting prohibited
    pub const SERVICE_AVAILABLE_NO_POSTING: u16 = 201;
    /// Connection closing
    pub const CLOSING_CONNECTION: u16 = 205;
    /// Group successfully selected
    pub const GROUP_SELECTED: u16 = 211;
    /// Body follows
    pub const BODY_FOLLOWS: u16 = 222;
    /// Authentication accepted
    pub const AUTH_ACCEPTED: u16 = 281;
    /// Password required
    pub const PASSWORD_REQUIRED: u16 = 381;
    /// No such newsgroup
    pub const NO_SUCH_GROUP: u16 = 411;
    /// No article with that message-id
    pub const NO_SUCH_ARTICLE: u16 = 430;
    /// Authentication failed or rejected
    pub const AUTH_REJECTED: u16 = 481;
}

/// A single status line: three-digit code plus free text
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    /// Status code
    pub code: u16,
    /// Text following the code
    pub message: String,
}

impl Response {
    /// Parse a raw status line (terminator optional).
    pub fn parse(line: &[u8]) -> Result<Self, NntpError> {
        let text = String::from_utf8_lossy(line);
        let text = text.trim_end_matches(['\r', '\n']);

        let code = text
            .get(..3)
            .filter(|c| c.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|c| c.parse::<u16>().ok())
            .ok_or_else(|| NntpError::InvalidResponse(text.to_string()))?;

        let message = match text.get(3..) {
            Some("") | None => String::new(),
            Some(rest) if rest.starts_with(' ') => rest[1..].to_string(),
            Some(_) => return Err(NntpError::InvalidResponse(text.to_string())),
        };

        Ok(Self { code, message })
    }

    /// Whether the code is a greeting that allows the session to continue.
    pub fn is_greeting(&self) -> bool {
        matches!(
            self.code,
            codes::SERVICE_AVAILABLE_POSTING | codes::SERVICE_AVAILABLE_NO_POSTING
        )
    }
}
