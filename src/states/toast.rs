// The transient status line shown at the bottom of the window.  There is a
// single slot: showing a new toast replaces whatever was there, which is how
// the "Analyzing..." notice gets swapped for the success/failure one.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastType {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub message: String,
    pub kind: ToastType,
    /// Wall-clock time (seconds, egui's `input.time`) after which the toast
    /// is dropped. `f64::INFINITY` keeps it until it is replaced.
    pub deadline: f64,
}

#[derive(Debug, Default)]
pub struct ToastState {
    current: Option<Toast>,
}

impl ToastState {
    pub fn show(&mut self, kind: ToastType, message: impl Into<String>, now: f64, secs: f64) {
        self.current = Some(Toast {
            message: message.into(),
            kind,
            deadline: now + secs,
        });
    }

    /// Show a toast that stays up until something replaces it.
    pub fn show_sticky(&mut self, kind: ToastType, message: impl Into<String>) {
        self.current = Some(Toast {
            message: message.into(),
            kind,
            deadline: f64::INFINITY,
        });
    }

    pub fn expire(&mut self, now: f64) {
        if self.current.as_ref().is_some_and(|t| now > t.deadline) {
            self.current = None;
        }
    }

    pub fn current(&self) -> Option<&Toast> {
        self.current.as_ref()
    }
}
