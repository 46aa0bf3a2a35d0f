use chrono::{DateTime, Utc};

/// Credentials issued by a single successful login call
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub nonce: String,
    pub lease_end: DateTime<Utc>,
}

impl Session {
    /// When to log in again: the midpoint of the lease window, leaving
    /// half the lease as margin for retries before the token expires.
    pub fn renewal_time(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        midpoint(now, self.lease_end)
    }
}

/// Midpoint of two instants, symmetric in argument order so a lease end
/// behind `now` (clock skew, zero lease) still lands between the pair.
pub fn midpoint(a: DateTime<Utc>, b: DateTime<Utc>) -> DateTime<Utc> {
    let (earlier, later) = if a <= b { (a, b) } else { (b, a) };
    earlier + (later - earlier) / 2
}
