use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::AbortHandle;
use tracing::{info, warn};

use super::artifact::{PreviewRegistry, ResponseArtifact};
use super::config::SetupMetadata;
use super::navigator::SessionNavigator;
use super::snapshot::{CaptureStatus, SessionPhase, SessionSnapshot};
use super::state::SessionState;
use crate::error::{NavigationError, SessionError};
use crate::media::{DeviceHandle, MediaCapture, RecordingHandle};
use crate::submission::{InterviewReport, SubmissionCoordinator, SubmissionRequest};

/// Camera held for the active question
enum LiveCapture {
    Previewing(DeviceHandle),
    Recording {
        handle: RecordingHandle,
        question_index: usize,
    },
}

impl LiveCapture {
    fn status(&self) -> CaptureStatus {
        match self {
            Self::Previewing(_) => CaptureStatus::Previewing,
            Self::Recording { question_index, .. } => CaptureStatus::Recording {
                question_index: *question_index,
            },
        }
    }

    fn release(self) {
        match self {
            Self::Previewing(mut device) => {
                device.release();
            }
            Self::Recording { handle, .. } => handle.abandon(),
        }
    }
}

/// Answers detached for upload, tagged with the session epoch they belong to
#[derive(Debug)]
pub struct PendingSubmission {
    pub epoch: u64,
    pub request: SubmissionRequest,
}

/// Drives one interview from start to report
///
/// The controller is the only mutator of the response store. Every
/// mutation publishes a [`SessionSnapshot`] to subscribers.
pub struct InterviewSessionController {
    capture: MediaCapture,
    coordinator: Arc<SubmissionCoordinator>,
    session: Option<SessionState>,
    live_capture: Option<LiveCapture>,
    phase: SessionPhase,
    epoch: u64,
    last_report: Option<InterviewReport>,
    submission_task: Option<AbortHandle>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
}

impl InterviewSessionController {
    pub fn new(capture: MediaCapture, coordinator: Arc<SubmissionCoordinator>) -> Self {
        let (snapshot_tx, _) = watch::channel(SessionSnapshot::idle(SessionPhase::Idle, 0));

        Self {
            capture,
            coordinator,
            session: None,
            live_capture: None,
            phase: SessionPhase::Idle,
            epoch: 0,
            last_report: None,
            submission_task: None,
            snapshot_tx,
        }
    }

    pub fn registry(&self) -> &Arc<dyn PreviewRegistry> {
        self.capture.registry()
    }

    pub fn coordinator(&self) -> &Arc<SubmissionCoordinator> {
        &self.coordinator
    }

    /// Receive a snapshot after every state change
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn state(&self) -> Option<&SessionState> {
        self.session.as_ref()
    }

    pub fn last_report(&self) -> Option<&InterviewReport> {
        self.last_report.as_ref()
    }

    pub fn is_capturing(&self) -> bool {
        self.live_capture.is_some()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let capture = self
            .live_capture
            .as_ref()
            .map(LiveCapture::status)
            .unwrap_or(CaptureStatus::Idle);

        let Some(state) = &self.session else {
            return SessionSnapshot {
                capture,
                ..SessionSnapshot::idle(self.phase, self.epoch)
            };
        };

        let count = state.questions().len();
        SessionSnapshot {
            session_id: Some(state.id().to_string()),
            epoch: self.epoch,
            phase: self.phase,
            questions: state.questions().to_vec(),
            current_index: state.current_index(),
            max_unlocked_index: state.max_unlocked_index(),
            answered: (0..count).map(|i| state.responses().contains(i)).collect(),
            previews: (0..count)
                .map(|i| state.responses().get(i).map(|a| a.preview_url().to_string()))
                .collect(),
            capture,
            can_complete: self.phase == SessionPhase::Answering && state.can_complete(),
            started_at: Some(state.started_at()),
        }
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.snapshot());
    }

    /// Begin a new interview, discarding any previous one
    pub fn start(&mut self, questions: Vec<String>, setup: SetupMetadata) -> Result<String, SessionError> {
        let questions: Vec<String> = questions
            .into_iter()
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty())
            .collect();

        if questions.is_empty() {
            return Err(SessionError::InvalidSetup(
                "at least one question is required".to_string(),
            ));
        }
        let setup = setup.validated()?;

        if let Some(previous) = &self.session {
            info!("Starting a new interview, discarding {}", previous.id());
        }
        self.teardown();
        self.epoch += 1;

        let state = SessionState::new(questions, setup);
        let id = state.id().to_string();
        info!(
            "Interview {} started: {} questions, {} at {} ({})",
            id,
            state.questions().len(),
            state.setup().position,
            state.setup().company,
            state.setup().experience
        );

        self.session = Some(state);
        self.phase = SessionPhase::Answering;
        self.last_report = None;
        self.publish();

        Ok(id)
    }

    fn ensure_answering(&self) -> Result<(), SessionError> {
        match (self.phase, &self.session) {
            (SessionPhase::Answering, Some(_)) => Ok(()),
            (SessionPhase::Submitting, _) => Err(SessionError::SubmissionInProgress),
            _ => Err(SessionError::NoActiveSession),
        }
    }

    fn current_index(&self) -> Result<usize, SessionError> {
        self.session
            .as_ref()
            .map(SessionState::current_index)
            .ok_or(SessionError::NoActiveSession)
    }

    fn store_response(&mut self, index: usize, artifact: ResponseArtifact) -> Result<(), SessionError> {
        let state = self.session.as_mut().ok_or(SessionError::NoActiveSession)?;
        let before = state.max_unlocked_index();

        state.responses.set(index, artifact);
        state.recompute_unlock();

        if state.max_unlocked_index() != before {
            info!("Unlocked up to question {}", state.max_unlocked_index());
        }

        self.publish();
        Ok(())
    }

    /// Record `artifact` (typically a selected file) for the current question
    pub fn answer_current(&mut self, artifact: ResponseArtifact) -> Result<usize, SessionError> {
        self.ensure_answering()?;
        if matches!(self.live_capture, Some(LiveCapture::Recording { .. })) {
            return Err(SessionError::CaptureInProgress);
        }

        // a chosen file replaces any open camera preview
        self.release_live_capture();

        let index = self.current_index()?;
        self.store_response(index, artifact)?;
        Ok(index)
    }

    /// Delete the current question's response
    pub fn reset_current(&mut self) -> Result<bool, SessionError> {
        self.ensure_answering()?;
        let state = self.session.as_mut().ok_or(SessionError::NoActiveSession)?;

        let index = state.current_index();
        let cleared = state.responses.clear(index);
        state.recompute_unlock();

        self.publish();
        Ok(cleared)
    }

    pub fn advance(&mut self) -> Result<bool, SessionError> {
        self.navigate(|nav| Ok(nav.next()))
    }

    pub fn retreat(&mut self) -> Result<bool, SessionError> {
        self.navigate(|nav| Ok(nav.previous()))
    }

    pub fn jump_to(&mut self, index: usize) -> Result<(), SessionError> {
        self.navigate(|nav| nav.go_to(index).map(|_| true)).map(|_| ())
    }

    /// Leaving a question turns its camera off
    fn navigate(
        &mut self,
        step: impl FnOnce(&mut SessionNavigator) -> Result<bool, NavigationError>,
    ) -> Result<bool, SessionError> {
        self.ensure_answering()?;
        let state = self.session.as_mut().ok_or(SessionError::NoActiveSession)?;

        let before = state.current_index();
        let moved = step(&mut state.navigator)?;
        let after = state.current_index();

        if after != before {
            info!("Moved from question {} to {}", before, after);
            self.release_live_capture();
            self.publish();
        }

        Ok(moved)
    }

    /// Ask for the camera and show a live preview
    pub async fn open_camera(&mut self) -> Result<(), SessionError> {
        self.ensure_answering()?;
        if self.live_capture.is_some() {
            return Err(SessionError::CaptureInProgress);
        }

        let device = self.capture.request_device().await?;
        self.live_capture = Some(LiveCapture::Previewing(device));
        self.publish();
        Ok(())
    }

    /// Start recording the current question, opening the camera if needed
    pub async fn start_recording(&mut self) -> Result<(), SessionError> {
        self.ensure_answering()?;

        let device = match self.live_capture.take() {
            Some(LiveCapture::Previewing(device)) => device,
            Some(recording) => {
                self.live_capture = Some(recording);
                return Err(SessionError::CaptureInProgress);
            }
            None => self.capture.request_device().await?,
        };

        let question_index = self.current_index()?;
        match self.capture.start_recording(device).await {
            Ok(handle) => {
                self.live_capture = Some(LiveCapture::Recording {
                    handle,
                    question_index,
                });
                self.publish();
                Ok(())
            }
            Err(e) => {
                warn!("Could not start recording question {}: {}", question_index, e);
                self.publish();
                Err(e.into())
            }
        }
    }

    /// Stop recording and store the result for the recorded question
    ///
    /// On a capture error the question stays unanswered and may be retried.
    pub async fn stop_recording(&mut self) -> Result<usize, SessionError> {
        let (handle, question_index) = match self.live_capture.take() {
            Some(LiveCapture::Recording {
                handle,
                question_index,
            }) => (handle, question_index),
            other => {
                self.live_capture = other;
                return Err(SessionError::NoActiveCapture);
            }
        };

        match self.capture.stop_recording(handle).await {
            Ok(artifact) => {
                self.store_response(question_index, artifact)?;
                Ok(question_index)
            }
            Err(e) => {
                warn!("Recording for question {} produced no answer: {}", question_index, e);
                self.publish();
                Err(e.into())
            }
        }
    }

    /// Turn the camera off without keeping anything
    pub fn cancel_capture(&mut self) -> bool {
        let had_capture = self.live_capture.is_some();
        self.release_live_capture();
        if had_capture {
            self.publish();
        }
        had_capture
    }

    /// The last question is answered and nothing is uploading yet
    pub fn can_complete(&self) -> bool {
        self.phase == SessionPhase::Answering && self.session.as_ref().is_some_and(SessionState::can_complete)
    }

    /// Freeze the session and detach its answers for upload
    pub fn begin_completion(&mut self) -> Result<PendingSubmission, SessionError> {
        self.ensure_answering()?;
        let state = self.session.as_ref().ok_or(SessionError::NoActiveSession)?;

        if !state.can_complete() {
            return Err(SessionError::Incomplete {
                missing: state.navigator().last_index(),
            });
        }

        let request = state.submission_request();
        info!(
            "Completing interview {} ({} of {} answered)",
            state.id(),
            state.responses().len(),
            state.questions().len()
        );

        self.release_live_capture();
        self.phase = SessionPhase::Submitting;
        self.publish();

        Ok(PendingSubmission {
            epoch: self.epoch,
            request,
        })
    }

    /// Hand over the task running the upload for `epoch`
    ///
    /// Exit or restart aborts it. A task for an epoch that already ended is
    /// aborted right away.
    pub fn track_submission(&mut self, epoch: u64, task: AbortHandle) {
        if epoch != self.epoch || self.phase != SessionPhase::Submitting {
            task.abort();
            return;
        }
        self.submission_task = Some(task);
    }

    /// Apply a report if its session is still the current one
    pub fn finish_completion(&mut self, epoch: u64, report: InterviewReport) -> Result<InterviewReport, SessionError> {
        if epoch != self.epoch || self.phase != SessionPhase::Submitting {
            warn!(
                "Dropping report {} for ended epoch {} (current {})",
                report.session_id, epoch, self.epoch
            );
            return Err(SessionError::Stale { epoch });
        }

        // the caller is the tracked task; it must run to the end
        self.submission_task = None;
        self.teardown();
        self.phase = SessionPhase::Completed;
        self.last_report = Some(report.clone());
        self.publish();

        Ok(report)
    }

    /// Submit every answer and return the report
    pub async fn complete(&mut self) -> Result<InterviewReport, SessionError> {
        let pending = self.begin_completion()?;
        let coordinator = Arc::clone(&self.coordinator);
        let report = coordinator.submit(pending.request).await;
        self.finish_completion(pending.epoch, report)
    }

    /// Leave the interview, releasing the camera and every response
    ///
    /// Requires `confirmed` when answers or a capture would be lost. A
    /// tracked submission is aborted; an untracked one reports `Stale`.
    pub fn exit(&mut self, confirmed: bool) -> Result<(), SessionError> {
        let Some(state) = &self.session else {
            self.cancel_capture();
            return Ok(());
        };

        let has_work = self.live_capture.is_some()
            || self.phase == SessionPhase::Submitting
            || !state.responses().is_empty();
        if has_work && !confirmed {
            return Err(SessionError::ConfirmationRequired);
        }

        info!("Exiting interview {}", state.id());
        self.teardown();
        self.epoch += 1;
        self.phase = SessionPhase::Exited;
        self.publish();
        Ok(())
    }

    fn release_live_capture(&mut self) {
        if let Some(live) = self.live_capture.take() {
            live.release();
        }
    }

    fn teardown(&mut self) {
        if let Some(task) = self.submission_task.take() {
            info!("Aborting submission in flight");
            task.abort();
        }
        self.release_live_capture();
        if let Some(mut state) = self.session.take() {
            let released = state.responses.clear_all();
            info!("Interview {} torn down ({} responses released)", state.id(), released);
        }
    }
}
