//! Submit handlers for the lookup and convert forms, and the glue between
//! status events and the busy guard.
//!
//! These functions only decide; the `App` performs the network calls they
//! ask for.

use thiserror::Error;
use tracing::{info, warn};
use ytag_proto::protocol::{ConversionRequest, JobHandle};
use ytag_proto::status::StatusEvent;
use ytag_proto::video::{extract_video_id, VideoRefError};

use crate::form::TagForm;
use crate::job_tracker::{JobTracker, Transition};
use crate::session::{BusyRelease, ClientSession};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("a conversion is already in progress")]
    Busy,
    #[error(transparent)]
    InvalidVideo(#[from] VideoRefError),
    #[error("the {0} field is required")]
    MissingField(&'static str),
}

/// Lookup form submit.  `Ok(None)` means there is nothing to do (blank
/// input); `Ok(Some(id))` asks for `POST /metadata` with that id.
pub fn submit_lookup(session: &ClientSession, input: &str) -> Result<Option<String>, SubmitError> {
    if session.is_busy() {
        info!("lookup ignored: busy");
        return Err(SubmitError::Busy);
    }
    Ok(extract_video_id(input)?)
}

/// Convert form submit.  On success the busy guard is held, the tracker
/// shows the request as pending and the caller must post the returned
/// request.
pub fn submit_conversion(
    session: &mut ClientSession,
    tracker: &mut JobTracker,
    form: &TagForm,
    default_tagger: Option<&str>,
) -> Result<ConversionRequest, SubmitError> {
    if session.is_busy() {
        info!("convert ignored: busy");
        return Err(SubmitError::Busy);
    }
    if let Some(field) = form.missing_required() {
        return Err(SubmitError::MissingField(field.label()));
    }
    let req = form.build_request(default_tagger, session);
    session.acquire();
    tracker.begin_submit();
    info!(
        "convert: {} by {:?} ({})",
        req.title, req.artists, req.video_id
    );
    Ok(req)
}

/// `POST /convert` failed: there is no job to wait for.
pub fn conversion_failed(session: &mut ClientSession, tracker: &mut JobTracker) {
    session.release(BusyRelease::SubmitFailed);
    tracker.abandon_submit();
}

/// Apply one status-channel event of job `handle`, releasing the busy guard
/// where the job or its channel ended.
pub fn handle_job_event(
    session: &mut ClientSession,
    tracker: &mut JobTracker,
    handle: &JobHandle,
    event: &StatusEvent,
) -> Transition {
    let transition = match event {
        StatusEvent::Message(msg) => tracker.on_message(handle, msg),
        StatusEvent::Closed | StatusEvent::Failed(_) => tracker.on_transport_end(handle),
    };
    let release = match (transition, event) {
        (Transition::Done, _) => Some(BusyRelease::JobDone),
        (Transition::Failed, _) => Some(BusyRelease::JobFailed),
        (Transition::Interrupted | Transition::Closed, StatusEvent::Failed(e)) => {
            warn!("job {}: {}", handle, e);
            Some(BusyRelease::TransportFailed)
        }
        (Transition::Interrupted | Transition::Closed, _) => Some(BusyRelease::TransportClosed),
        (Transition::Ignored | Transition::Updated, _) => None,
    };
    if let Some(reason) = release {
        session.release(reason);
    }
    transition
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FieldId;
    use crate::job_tracker::JobPhase;
    use ytag_proto::protocol::{JobStatus, StatusMessage};
    use ytag_proto::status::StatusChannelError;

    fn filled_form() -> TagForm {
        let mut form = TagForm::new();
        form.edit(FieldId::Title, "Ghost".into());
        form.edit(FieldId::Artists, "Suisei".into());
        form.edit(FieldId::VideoId, "a1b2c3".into());
        form
    }

    fn status(s: JobStatus) -> StatusEvent {
        StatusEvent::Message(StatusMessage::new(s, None))
    }

    /// Runs a scripted job and counts how many table refreshes it asks for.
    fn run_job(events: &[StatusEvent]) -> (ClientSession, JobTracker, usize) {
        let mut session = ClientSession::new();
        let mut tracker = JobTracker::new();
        submit_conversion(&mut session, &mut tracker, &filled_form(), None).unwrap();
        let handle = JobHandle::new("j");
        tracker.attach(handle.clone());
        let refreshes = events
            .iter()
            .filter(|ev| handle_job_event(&mut session, &mut tracker, &handle, ev) == Transition::Done)
            .count();
        (session, tracker, refreshes)
    }

    #[test]
    fn test_url_without_video_id_raises_alert() {
        let session = ClientSession::new();
        let err = submit_lookup(&session, "https://www.youtube.com/watch?list=PL1").unwrap_err();
        assert_eq!(err, SubmitError::InvalidVideo(VideoRefError::MissingVideoId));
        assert_eq!(
            err.to_string(),
            "Provided URL is invalid: it does not contain a video ID"
        );
    }

    #[test]
    fn test_lookup_extracts_id() {
        let session = ClientSession::new();
        assert_eq!(
            submit_lookup(&session, "https://www.youtube.com/watch?v=a1b2c3&t=4").unwrap(),
            Some("a1b2c3".to_string())
        );
        assert_eq!(submit_lookup(&session, "   ").unwrap(), None);
    }

    #[test]
    fn test_busy_makes_submissions_no_ops() {
        let mut session = ClientSession::new();
        let mut tracker = JobTracker::new();
        let form = filled_form();
        submit_conversion(&mut session, &mut tracker, &form, None).unwrap();

        assert_eq!(
            submit_lookup(&session, "https://www.youtube.com/watch?v=x"),
            Err(SubmitError::Busy)
        );
        assert_eq!(
            submit_conversion(&mut session, &mut tracker, &form, None),
            Err(SubmitError::Busy)
        );
        assert!(session.is_busy());
    }

    #[test]
    fn test_missing_title_does_not_take_guard() {
        let mut session = ClientSession::new();
        let mut tracker = JobTracker::new();
        let mut form = filled_form();
        form.edit(FieldId::Title, "  ".into());
        assert_eq!(
            submit_conversion(&mut session, &mut tracker, &form, None),
            Err(SubmitError::MissingField("title"))
        );
        assert!(!session.is_busy());
        assert_eq!(tracker.phase(), JobPhase::Idle);
    }

    #[test]
    fn test_failed_post_releases_guard() {
        let mut session = ClientSession::new();
        let mut tracker = JobTracker::new();
        submit_conversion(&mut session, &mut tracker, &filled_form(), None).unwrap();
        assert_eq!(tracker.phase(), JobPhase::Submitting);
        assert!(tracker.is_active());

        conversion_failed(&mut session, &mut tracker);
        assert!(!session.is_busy());
        assert!(!tracker.is_active());
    }

    #[test]
    fn test_done_refreshes_exactly_once() {
        let (session, tracker, refreshes) = run_job(&[
            status(JobStatus::Waiting),
            StatusEvent::Message(StatusMessage::new(JobStatus::Downloading, Some(0.5))),
            status(JobStatus::Converting),
            status(JobStatus::Done),
            StatusEvent::Closed,
        ]);
        assert_eq!(refreshes, 1);
        assert!(!session.is_busy());
        assert!(!tracker.is_active());
    }

    #[test]
    fn test_error_status_clears_busy_without_refresh() {
        let (session, _, refreshes) =
            run_job(&[status(JobStatus::Downloading), status(JobStatus::Error), StatusEvent::Closed]);
        assert_eq!(refreshes, 0);
        assert!(!session.is_busy());
    }

    #[test]
    fn test_close_before_terminal_clears_busy_without_refresh() {
        let (session, tracker, refreshes) =
            run_job(&[status(JobStatus::Waiting), StatusEvent::Closed]);
        assert_eq!(refreshes, 0);
        assert!(!session.is_busy());
        assert!(tracker.is_interrupted());
    }

    #[test]
    fn test_channel_failure_clears_busy() {
        let (session, _, refreshes) = run_job(&[StatusEvent::Failed(StatusChannelError::Connect(
            "connection refused".into(),
        ))]);
        assert_eq!(refreshes, 0);
        assert!(!session.is_busy());
    }

    #[test]
    fn test_stale_job_events_leave_guard_alone() {
        let mut session = ClientSession::new();
        let mut tracker = JobTracker::new();
        submit_conversion(&mut session, &mut tracker, &filled_form(), None).unwrap();
        tracker.attach(JobHandle::new("current"));

        let stale = JobHandle::new("previous");
        let t = handle_job_event(&mut session, &mut tracker, &stale, &StatusEvent::Closed);
        assert_eq!(t, Transition::Ignored);
        assert!(session.is_busy());
    }
}
