//! Assertion macros shared by the integration suite

/// Assert that a result is ok and return the value
#[macro_export]
macro_rules! assert_ok {
    ($result:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
    ($result:expr, $message:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("{}: {:?}", $message, e),
        }
    };
}

/// Assert that a result is an error, optionally of a given shape
#[macro_export]
macro_rules! assert_err {
    ($result:expr) => {
        assert!($result.is_err(), "Expected Err, got Ok");
    };
    ($result:expr, $pattern:pat) => {
        match $result {
            Err($pattern) => {}
            Ok(value) => panic!("Expected Err, got Ok: {:?}", value),
            Err(e) => panic!("Expected different error variant, got: {:?}", e),
        }
    };
}

/// Assert that a string contains a substring
#[macro_export]
macro_rules! assert_contains {
    ($haystack:expr, $needle:expr) => {
        assert!(
            $haystack.contains($needle),
            "Expected '{}' to contain '{}'",
            $haystack,
            $needle
        );
    };
}

/// Assert that the unread counts a participant sees, keyed by counterpart
/// id, match the expected pairs in any order
#[macro_export]
macro_rules! assert_unread {
    ($summaries:expr, [$(($counterpart:expr, $count:expr)),* $(,)?]) => {{
        let mut actual: Vec<(i64, u64)> = $summaries
            .iter()
            .map(|s| (s.counterpart.id(), s.unread_count))
            .collect();
        actual.sort();
        let mut expected: Vec<(i64, u64)> = vec![$(($counterpart, $count)),*];
        expected.sort();
        assert_eq!(actual, expected, "unread counts by counterpart");
    }};
}
