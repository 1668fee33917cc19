//! The analysis session: everything the window shows is derived from the
//! state kept here.
//!
//! One request may be in flight at a time. While it is, the previous result is
//! hidden and the submit control is disabled; when it resolves (either way)
//! the session goes back to idle with a fully populated result. Transport
//! failures are folded into a synthesized [`AnalysisResult`] so the result
//! panel never has to render a separate error state.
//!
//! Speech playback is tracked alongside. At most one utterance exists at a
//! time, and submitting new code silences whatever is being read out.

use crate::analysis::{
    AnalysisClient, AnalysisOutcome, AnalysisResult, DebugRequest, TransportFailure,
};
use crate::speech::{SpeechEngine, SpeechEvent};
use crate::states::toast::{Toast, ToastState, ToastType};
use crate::task::{TaskHandle, TaskPoll};
use tracing::{debug, info, warn};

pub const SAMPLE_CODE: &str = "def my_function(a, b):
  result = a + b
  print(result)

my_function(5)";

const TOAST_SECS: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Idle,
    InFlight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechState {
    Idle,
    Speaking,
}

/// Destination for "copy corrected code".
pub trait Clipboard {
    fn write_text(&mut self, text: &str);
}

pub struct AnalysisSession {
    source: String,
    result: Option<AnalysisResult>,
    translate: bool,
    request: Option<TaskHandle<AnalysisOutcome>>,
    utterance: Option<TaskHandle<SpeechEvent>>,
    speech: SpeechState,
    toast: ToastState,
    client: Box<dyn AnalysisClient>,
    speech_engine: Box<dyn SpeechEngine>,
}

impl AnalysisSession {
    pub fn new(client: Box<dyn AnalysisClient>, speech_engine: Box<dyn SpeechEngine>) -> Self {
        Self {
            source: SAMPLE_CODE.to_string(),
            result: None,
            translate: false,
            request: None,
            utterance: None,
            speech: SpeechState::Idle,
            toast: ToastState::default(),
            client,
            speech_engine,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    pub fn request_state(&self) -> RequestState {
        if self.request.is_some() {
            RequestState::InFlight
        } else {
            RequestState::Idle
        }
    }

    pub fn speech_state(&self) -> SpeechState {
        self.speech
    }

    pub fn toast(&self) -> Option<&Toast> {
        self.toast.current()
    }

    pub fn translate(&self) -> bool {
        self.translate
    }

    pub fn set_translate(&mut self, translate: bool) {
        self.translate = translate;
    }

    pub fn update_source(&mut self, text: impl Into<String>) {
        self.source = text.into();
    }

    pub fn reset_source(&mut self) {
        self.update_source(SAMPLE_CODE);
    }

    /// Replace the editor contents with the corrected listing.
    pub fn apply_fix(&mut self) -> bool {
        let Some(result) = &self.result else {
            return false;
        };
        let fixed = result.corrected_code.clone();
        self.update_source(fixed);
        true
    }

    /// Send the current source for analysis. Returns `false` (and does
    /// nothing) while a request is already in flight.
    pub fn submit(&mut self) -> bool {
        if self.request.is_some() {
            debug!("submit ignored, a request is already in flight");
            return false;
        }

        self.stop_speaking();
        self.result = None;

        info!(code_len = self.source.len(), translate = self.translate, "submitting code");
        let request = DebugRequest {
            code: self.source.clone(),
            translate: self.translate,
        };
        self.request = Some(self.client.submit(request));
        self.toast.show_sticky(ToastType::Info, "Analyzing your code...");
        true
    }

    pub fn copy_corrected_code(&mut self, clipboard: &mut dyn Clipboard, now: f64) -> bool {
        let Some(result) = &self.result else {
            return false;
        };
        clipboard.write_text(&result.corrected_code);
        self.toast
            .show(ToastType::Success, "Copied to clipboard!", now, TOAST_SECS);
        true
    }

    /// Read the explanation aloud. Ignored while already speaking, or when
    /// there is nothing to read.
    pub fn speak_explanation(&mut self) -> bool {
        if self.speech == SpeechState::Speaking {
            return false;
        }
        let text = match &self.result {
            Some(result) if !result.explanation.is_empty() => result.explanation.clone(),
            _ => return false,
        };

        // An utterance may have been requested but not started yet.
        self.stop_speaking();
        self.utterance = Some(self.speech_engine.speak(&text));
        true
    }

    pub fn stop_speaking(&mut self) {
        if let Some(mut utterance) = self.utterance.take() {
            utterance.cancel();
            debug!("utterance cancelled");
        }
        self.speech = SpeechState::Idle;
    }

    /// Report a problem that did not come from the analysis service (file
    /// dialogs and the like).
    pub fn notify_error(&mut self, message: impl Into<String>, now: f64) {
        self.toast.show(ToastType::Error, message, now, TOAST_SECS);
    }

    pub fn notify_success(&mut self, message: impl Into<String>, now: f64) {
        self.toast.show(ToastType::Success, message, now, TOAST_SECS);
    }

    /// Apply whatever the background workers have reported since the last
    /// frame. Returns `true` while there is still outstanding work.
    pub fn poll(&mut self, now: f64) -> bool {
        self.poll_request(now);
        self.poll_speech();
        self.toast.expire(now);
        self.request.is_some() || self.utterance.is_some()
    }

    fn poll_request(&mut self, now: f64) {
        let Some(request) = &self.request else {
            return;
        };
        let outcome = match request.poll() {
            TaskPoll::Pending => return,
            TaskPoll::Ready(outcome) => outcome,
            TaskPoll::Closed => Err(TransportFailure::Disconnected),
        };
        self.request = None;

        match outcome {
            Ok(result) => {
                info!(has_errors = result.has_errors, "analysis finished");
                self.result = Some(result);
                self.toast
                    .show(ToastType::Success, "Analysis complete!", now, TOAST_SECS);
            }
            Err(failure) => {
                warn!(error = %failure, "analysis request failed");
                self.result = Some(AnalysisResult::from_failure(&failure));
                self.toast
                    .show(ToastType::Error, "Failed to analyze code.", now, TOAST_SECS);
            }
        }
    }

    fn poll_speech(&mut self) {
        while let Some(utterance) = &self.utterance {
            match utterance.poll() {
                TaskPoll::Pending => break,
                TaskPoll::Ready(SpeechEvent::Started) => {
                    debug!("utterance playing");
                    self.speech = SpeechState::Speaking;
                }
                TaskPoll::Ready(SpeechEvent::Finished) | TaskPoll::Closed => {
                    self.utterance = None;
                    self.speech = SpeechState::Idle;
                }
                TaskPoll::Ready(SpeechEvent::Failed(msg)) => {
                    warn!(error = %msg, "speech playback failed");
                    self.utterance = None;
                    self.speech = SpeechState::Idle;
                }
            }
        }
    }
}

impl Drop for AnalysisSession {
    fn drop(&mut self) {
        self.stop_speaking();
    }
}
