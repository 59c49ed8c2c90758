//! Per-client session state: the busy guard, the cached thumbnail and the
//! population ticket counter.
//!
//! Only the `App` event loop owns a `ClientSession`; background tasks never
//! touch it.

use tracing::{debug, info};

/// Why the busy guard was released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusyRelease {
    /// `POST /convert` failed before a job existed.
    SubmitFailed,
    /// The job reported `done`.
    JobDone,
    /// The job reported `error`.
    JobFailed,
    /// The status channel closed.
    TransportClosed,
    /// The status channel broke or never opened.
    TransportFailed,
}

impl BusyRelease {
    pub fn label(self) -> &'static str {
        match self {
            Self::SubmitFailed => "conversion request failed",
            Self::JobDone => "job done",
            Self::JobFailed => "job failed",
            Self::TransportClosed => "status channel closed",
            Self::TransportFailed => "status channel failed",
        }
    }
}

/// Identifies one form population.  Cover lookups carry the ticket of the
/// population that started them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopulationTicket(u64);

#[derive(Debug, Default)]
pub struct ClientSession {
    busy: bool,
    last_thumbnail: Option<String>,
    populations: u64,
}

impl ClientSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Take the busy guard.  Returns false if it was already held.
    pub fn acquire(&mut self) -> bool {
        if self.busy {
            return false;
        }
        self.busy = true;
        debug!("session: busy");
        true
    }

    /// Release the busy guard.  Returns true if it was held.
    pub fn release(&mut self, reason: BusyRelease) -> bool {
        let was_busy = std::mem::replace(&mut self.busy, false);
        if was_busy {
            info!("session: busy released ({})", reason.label());
        } else {
            debug!("session: release ({}) while idle", reason.label());
        }
        was_busy
    }

    pub fn last_thumbnail(&self) -> Option<&str> {
        self.last_thumbnail.as_deref()
    }

    /// Remember the thumbnail of the latest lookup.  Blank URLs clear it.
    pub fn cache_thumbnail(&mut self, url: Option<&str>) {
        self.last_thumbnail = url
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string);
    }

    pub fn begin_population(&mut self) -> PopulationTicket {
        self.populations += 1;
        PopulationTicket(self.populations)
    }

    pub fn is_current(&self, ticket: PopulationTicket) -> bool {
        ticket.0 == self.populations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_busy_guard_is_exclusive() {
        let mut s = ClientSession::new();
        assert!(s.acquire());
        assert!(!s.acquire());
        assert!(s.is_busy());
        assert!(s.release(BusyRelease::JobDone));
        assert!(!s.is_busy());
        assert!(!s.release(BusyRelease::TransportClosed));
    }

    #[test]
    fn test_newer_population_supersedes() {
        let mut s = ClientSession::new();
        let first = s.begin_population();
        assert!(s.is_current(first));
        let second = s.begin_population();
        assert!(!s.is_current(first));
        assert!(s.is_current(second));
    }

    #[test]
    fn test_blank_thumbnail_clears_cache() {
        let mut s = ClientSession::new();
        s.cache_thumbnail(Some("https://i.ytimg.com/vi/x/hq.jpg"));
        assert_eq!(s.last_thumbnail(), Some("https://i.ytimg.com/vi/x/hq.jpg"));
        s.cache_thumbnail(Some("  "));
        assert_eq!(s.last_thumbnail(), None);
    }
}
