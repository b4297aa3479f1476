//! Integration tests for reconnection strategies
//!
//! These tests verify reconnection pacing with different strategies.

use chatsocket::traits::reconnect::{
    ExponentialBackoff, FixedDelay, NeverReconnect, ReconnectionStrategy,
};
use std::time::Duration;

/// Macro for verbose test output
macro_rules! verbose_println {
    ($($arg:tt)*) => {
        if std::env::var("TEST_VERBOSE").is_ok() {
            println!($($arg)*);
        }
    };
}

#[test]
fn test_chat_backoff_full_sequence() {
    verbose_println!("Testing chat backoff full sequence...");

    let strategy = ExponentialBackoff::default();

    // min(1000 * 2^n, 10000) for n in 0..5
    let expected_delays = [1000, 2000, 4000, 8000, 10000];

    for (attempt, &expected_ms) in expected_delays.iter().enumerate() {
        let delay = strategy.next_delay(attempt as u32).unwrap();
        verbose_println!("  Attempt {}: {:?}", attempt, delay);
        assert_eq!(
            delay.as_millis(),
            expected_ms,
            "Unexpected delay at attempt {}",
            attempt
        );
    }

    // Attempt 5 should return None (max_attempts = 5)
    assert!(
        strategy.next_delay(5).is_none(),
        "Should return None after max attempts"
    );
    assert!(!strategy.should_reconnect(5));
}

#[test]
fn test_exponential_backoff_with_capping() {
    verbose_println!("Testing exponential backoff with capping...");

    let strategy = ExponentialBackoff::new(
        Duration::from_millis(500),
        Duration::from_secs(2), // Cap at 2 seconds
        None,
    );

    let delays: Vec<u64> = (0..6)
        .map(|i| strategy.next_delay(i).unwrap().as_millis() as u64)
        .collect();

    verbose_println!("  Delays: {:?}", delays);

    assert_eq!(delays, vec![500, 1000, 2000, 2000, 2000, 2000]);
}

#[test]
fn test_fixed_delay_with_max_attempts() {
    verbose_println!("Testing fixed delay with max attempts...");

    let strategy = FixedDelay::new(Duration::from_millis(500), Some(3));

    assert_eq!(strategy.next_delay(0), Some(Duration::from_millis(500)));
    assert_eq!(strategy.next_delay(2), Some(Duration::from_millis(500)));
    assert!(strategy.next_delay(3).is_none());
}

#[test]
fn test_never_reconnect_always_fails() {
    verbose_println!("Testing NeverReconnect strategy...");

    let strategy = NeverReconnect;

    for attempt in 0..10 {
        assert!(strategy.next_delay(attempt).is_none());
        assert!(!strategy.should_reconnect(attempt));
    }
}

#[test]
fn test_exponential_backoff_overflow_safety() {
    verbose_println!("Testing exponential backoff overflow safety...");

    let strategy = ExponentialBackoff::new(
        Duration::from_millis(100),
        Duration::from_secs(3600), // 1 hour max
        None,
    );

    // 100ms * 2^70 overflows u64; must clamp to the cap, not panic
    assert_eq!(strategy.next_delay(30), Some(Duration::from_secs(3600)));
    assert_eq!(strategy.next_delay(70), Some(Duration::from_secs(3600)));
    assert_eq!(strategy.next_delay(u32::MAX), Some(Duration::from_secs(3600)));
}
