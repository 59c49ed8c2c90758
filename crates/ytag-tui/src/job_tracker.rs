//! Job status tracker: follows one conversion job through its status
//! channel and exposes what the progress area should show.
//!
//! ```text
//! Idle → Submitting → Waiting → Downloading → Converting → Done | Error
//! ```
//!
//! Messages are applied in arrival order and each one is absolute; nothing
//! is interpolated.  Once a job reaches `done`/`error`, or its channel
//! ends, later events for it are ignored.

use tracing::{debug, info, warn};
use ytag_proto::protocol::{JobHandle, JobStatus, StatusMessage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobPhase {
    #[default]
    Idle,
    /// The convert request is in flight; no job id yet.
    Submitting,
    Waiting,
    Downloading {
        percent: Option<u8>,
    },
    Converting,
    Done,
    Error,
}

impl JobPhase {
    pub fn label(self) -> Option<&'static str> {
        match self {
            Self::Idle => None,
            Self::Submitting => Some("Submitting"),
            Self::Waiting => Some("Waiting"),
            Self::Downloading { .. } => Some("Downloading video"),
            Self::Converting => Some("Extracting audio"),
            Self::Done => Some("Done"),
            Self::Error => Some("Failed"),
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Error)
    }
}

/// Effect of one status event on the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Stale job, unknown label or post-terminal noise.
    Ignored,
    /// Phase or progress changed.
    Updated,
    /// The job finished: refresh the song table once.
    Done,
    /// The job reported `error`.
    Failed,
    /// The channel ended before a terminal status.
    Interrupted,
    /// The channel ended after a terminal status.
    Closed,
}

#[derive(Debug, Default)]
pub struct JobTracker {
    job: Option<JobHandle>,
    phase: JobPhase,
    channel_open: bool,
    interrupted: bool,
}

impl JobTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn job(&self) -> Option<&JobHandle> {
        self.job.as_ref()
    }

    pub fn phase(&self) -> JobPhase {
        self.phase
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted
    }

    /// True while the progress indicator should be visible.
    pub fn is_active(&self) -> bool {
        self.phase == JobPhase::Submitting
            || (self.job.is_some()
                && !self.phase.is_terminal()
                && !self.interrupted
                && self.channel_open)
    }

    /// The convert request went out: show the indicator before the job
    /// is accepted.  Anything still attached from an earlier job is dropped.
    pub fn begin_submit(&mut self) {
        self.job = None;
        self.phase = JobPhase::Submitting;
        self.channel_open = false;
        self.interrupted = false;
    }

    /// The convert request failed, so no job will be attached.
    pub fn abandon_submit(&mut self) {
        if self.phase == JobPhase::Submitting {
            self.phase = JobPhase::Idle;
        }
    }

    /// Start following a freshly accepted job.
    pub fn attach(&mut self, handle: JobHandle) {
        info!("tracker: following job {}", handle);
        self.job = Some(handle);
        self.phase = JobPhase::Waiting;
        self.channel_open = true;
        self.interrupted = false;
    }

    fn follows(&self, handle: &JobHandle) -> bool {
        self.job.as_ref() == Some(handle) && self.channel_open
    }

    pub fn on_message(&mut self, handle: &JobHandle, msg: &StatusMessage) -> Transition {
        if !self.follows(handle) {
            debug!("tracker: ignoring status for job {}", handle);
            return Transition::Ignored;
        }
        if self.phase.is_terminal() {
            debug!("tracker: {:?} after terminal status ignored", msg.status);
            return Transition::Ignored;
        }
        match msg.status {
            JobStatus::Waiting => {
                self.phase = JobPhase::Waiting;
                Transition::Updated
            }
            JobStatus::Downloading => {
                self.phase = JobPhase::Downloading {
                    percent: msg.percent(),
                };
                Transition::Updated
            }
            JobStatus::Converting => {
                self.phase = JobPhase::Converting;
                Transition::Updated
            }
            JobStatus::Done => {
                info!("tracker: job {} done", handle);
                self.phase = JobPhase::Done;
                Transition::Done
            }
            JobStatus::Error => {
                warn!("tracker: job {} failed", handle);
                self.phase = JobPhase::Error;
                Transition::Failed
            }
            JobStatus::Unknown => {
                warn!("tracker: unknown status label for job {}", handle);
                Transition::Ignored
            }
        }
    }

    /// The status channel for `handle` closed or broke.
    pub fn on_transport_end(&mut self, handle: &JobHandle) -> Transition {
        if !self.follows(handle) {
            return Transition::Ignored;
        }
        self.channel_open = false;
        if self.phase.is_terminal() {
            Transition::Closed
        } else {
            warn!("tracker: channel for job {} ended in {:?}", handle, self.phase);
            self.interrupted = true;
            Transition::Interrupted
        }
    }

    /// Text next to the bar, e.g. `"37%"`.
    pub fn progress_text(&self) -> Option<String> {
        match self.phase {
            JobPhase::Downloading { percent: Some(p) } => Some(format!("{}%", p)),
            _ => None,
        }
    }

    /// Bar fill, 0.0..=1.0.  Only the download phase has a numeric value.
    pub fn ratio(&self) -> Option<f64> {
        match self.phase {
            JobPhase::Downloading { percent: Some(p) } => Some(f64::from(p) / 100.0),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(status: JobStatus, p: Option<f64>) -> StatusMessage {
        StatusMessage::new(status, p)
    }

    fn attached() -> (JobTracker, JobHandle) {
        let mut t = JobTracker::new();
        let h = JobHandle::new("job-1");
        t.attach(h.clone());
        (t, h)
    }

    #[test]
    fn test_attach_shows_waiting() {
        let (t, _) = attached();
        assert_eq!(t.phase(), JobPhase::Waiting);
        assert_eq!(t.phase().label(), Some("Waiting"));
        assert!(t.is_active());
        assert_eq!(t.progress_text(), None);
    }

    #[test]
    fn test_submit_shows_indicator_before_attach() {
        let (mut t, h) = attached();
        t.on_message(&h, &msg(JobStatus::Done, None));
        assert!(!t.is_active());

        t.begin_submit();
        assert!(t.is_active());
        assert_eq!(t.phase().label(), Some("Submitting"));
        assert_eq!(t.job(), None);
        assert_eq!(t.on_transport_end(&h), Transition::Ignored);

        t.attach(JobHandle::new("job-2"));
        assert_eq!(t.phase(), JobPhase::Waiting);
        assert!(t.is_active());
    }

    #[test]
    fn test_abandoned_submit_hides_indicator() {
        let mut t = JobTracker::new();
        t.begin_submit();
        t.abandon_submit();
        assert_eq!(t.phase(), JobPhase::Idle);
        assert!(!t.is_active());
    }

    #[test]
    fn test_download_progress_is_rounded() {
        let (mut t, h) = attached();
        assert_eq!(
            t.on_message(&h, &msg(JobStatus::Downloading, Some(0.37))),
            Transition::Updated
        );
        assert_eq!(t.phase().label(), Some("Downloading video"));
        assert_eq!(t.progress_text().as_deref(), Some("37%"));
        assert_eq!(t.ratio(), Some(0.37));
    }

    #[test]
    fn test_progress_values_are_absolute() {
        let (mut t, h) = attached();
        t.on_message(&h, &msg(JobStatus::Downloading, Some(0.8)));
        t.on_message(&h, &msg(JobStatus::Downloading, Some(0.2)));
        assert_eq!(t.progress_text().as_deref(), Some("20%"));
    }

    #[test]
    fn test_converting_has_no_number() {
        let (mut t, h) = attached();
        t.on_message(&h, &msg(JobStatus::Downloading, Some(1.0)));
        t.on_message(&h, &msg(JobStatus::Converting, Some(1.0)));
        assert_eq!(t.phase().label(), Some("Extracting audio"));
        assert_eq!(t.ratio(), None);
    }

    #[test]
    fn test_done_then_close() {
        let (mut t, h) = attached();
        assert_eq!(t.on_message(&h, &msg(JobStatus::Done, None)), Transition::Done);
        assert!(!t.is_active());
        assert_eq!(
            t.on_message(&h, &msg(JobStatus::Done, None)),
            Transition::Ignored
        );
        assert_eq!(t.on_transport_end(&h), Transition::Closed);
        assert!(!t.is_interrupted());
    }

    #[test]
    fn test_close_before_terminal_interrupts() {
        let (mut t, h) = attached();
        t.on_message(&h, &msg(JobStatus::Downloading, Some(0.5)));
        assert_eq!(t.on_transport_end(&h), Transition::Interrupted);
        assert!(t.is_interrupted());
        assert!(!t.is_active());
        assert_eq!(t.progress_text().as_deref(), Some("50%"));
        assert_eq!(t.on_transport_end(&h), Transition::Ignored);
    }

    #[test]
    fn test_other_job_is_ignored() {
        let (mut t, _) = attached();
        let other = JobHandle::new("job-0");
        assert_eq!(
            t.on_message(&other, &msg(JobStatus::Done, None)),
            Transition::Ignored
        );
        assert_eq!(t.on_transport_end(&other), Transition::Ignored);
        assert!(t.is_active());
    }

    #[test]
    fn test_unknown_label_keeps_phase() {
        let (mut t, h) = attached();
        t.on_message(&h, &msg(JobStatus::Converting, None));
        assert_eq!(
            t.on_message(&h, &msg(JobStatus::Unknown, None)),
            Transition::Ignored
        );
        assert_eq!(t.phase(), JobPhase::Converting);
    }
}
