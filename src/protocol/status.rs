//! Device status codes carried in the packet header's error field.

use serde::Serialize;
use std::fmt;

/// Error code reported by a switch.
///
/// Non-zero codes are answers, not transport failures: a caller seeing
/// [`ErrorCode::WrongCredentials`] after a login would typically re-prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorCode {
    Success,
    WrongCredentials,
    Other(i32),
}

impl ErrorCode {
    /// Raw header value.
    pub fn code(self) -> i32 {
        match self {
            ErrorCode::Success => 0,
            ErrorCode::WrongCredentials => 1,
            ErrorCode::Other(code) => code,
        }
    }

    /// Symbolic name from the fixed code table.
    pub fn name(self) -> &'static str {
        match self {
            ErrorCode::Success => "SUCCESS",
            ErrorCode::WrongCredentials => "WRONG_CREDENTIALS",
            ErrorCode::Other(_) => "UNKNOWN_ERROR",
        }
    }

    #[inline]
    pub fn is_success(self) -> bool {
        self == ErrorCode::Success
    }
}

impl From<i32> for ErrorCode {
    fn from(code: i32) -> Self {
        match code {
            0 => ErrorCode::Success,
            1 => ErrorCode::WrongCredentials,
            other => ErrorCode::Other(other),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_table() {
        assert_eq!(ErrorCode::from(0), ErrorCode::Success);
        assert_eq!(ErrorCode::from(1).name(), "WRONG_CREDENTIALS");
        assert_eq!(ErrorCode::from(7), ErrorCode::Other(7));
        assert_eq!(ErrorCode::from(7).name(), "UNKNOWN_ERROR");
        assert_eq!(ErrorCode::from(-3).code(), -3);
        assert!(ErrorCode::Success.is_success());
        assert_eq!(ErrorCode::WrongCredentials.to_string(), "WRONG_CREDENTIALS (1)");
    }
}
