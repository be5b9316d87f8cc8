use once_cell::sync::Lazy;
use std::time::{Duration, Instant};

// The single, static reference point for all entry timestamps.
// It is initialized lazily on its first use.
static CACHE_EPOCH: Lazy<Instant> = Lazy::new(Instant::now);

/// Converts an `Instant` into nanoseconds since the cache's epoch.
///
/// The result is never zero, so zero stays free to mean "unset".
#[inline]
pub(crate) fn instant_to_nanos(instant: Instant) -> u64 {
  let nanos = instant.saturating_duration_since(*CACHE_EPOCH).as_nanos();
  (nanos.min(u64::MAX as u128) as u64).max(1)
}

/// Converts nanoseconds since the cache's epoch back into an `Instant`.
#[inline]
pub(crate) fn nanos_to_instant(nanos: u64) -> Instant {
  *CACHE_EPOCH + Duration::from_nanos(nanos)
}

// Deadlines are clamped to this distance from their start, which keeps them
// well inside the u64 nanosecond range.
const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Returns `now + ttl`, saturating instead of panicking on overflow.
#[inline]
pub(crate) fn deadline(now: Instant, ttl: Duration) -> Instant {
  let mut ttl = ttl.min(MAX_TTL);
  loop {
    if let Some(at) = now.checked_add(ttl) {
      return at;
    }
    ttl /= 2;
  }
}
