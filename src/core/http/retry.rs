//! Retry decision for authentication failures
//!
//! A request may be resent at most once, after a token refresh. The attempt
//! marker lives with the client's send loop, not on the caller's request.

/// Which send of a given request this is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    First,
    /// Already resent after a refresh
    Retried,
}

/// What the client does with a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Next {
    /// Hand the response (success or error status) to the caller
    Deliver,
    /// Refresh the access token, then resend once
    RefreshAndRetry,
    /// Hard authentication failure
    Fail,
}

/// Decide how to handle a response status.
///
/// `had_token` is whether the request carried a bearer credential; a 401
/// on an anonymous request cannot be fixed by refreshing.
pub fn decide(status: u16, attempt: Attempt, had_token: bool) -> Next {
    if status != 401 {
        return Next::Deliver;
    }
    match attempt {
        Attempt::First if had_token => Next::RefreshAndRetry,
        _ => Next::Fail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_401_is_delivered() {
        for status in [200, 204, 400, 403, 404, 500] {
            assert_eq!(decide(status, Attempt::First, true), Next::Deliver);
            assert_eq!(decide(status, Attempt::Retried, true), Next::Deliver);
        }
    }

    #[test]
    fn test_first_401_refreshes() {
        assert_eq!(decide(401, Attempt::First, true), Next::RefreshAndRetry);
    }

    #[test]
    fn test_second_401_fails() {
        assert_eq!(decide(401, Attempt::Retried, true), Next::Fail);
    }

    #[test]
    fn test_anonymous_401_fails() {
        assert_eq!(decide(401, Attempt::First, false), Next::Fail);
    }
}
