// Background work (the analysis request, a speech utterance) reports back to
// the UI thread through a `TaskHandle`.  The handle owns the receiving end of
// an mpsc channel and an optional cancel hook; the worker owns the sender and
// simply drops it when it has nothing more to say.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

/// Result of a non-blocking look at a task's channel.
#[derive(Debug, PartialEq, Eq)]
pub enum TaskPoll<T> {
    /// Nothing new yet; the worker is still running.
    Pending,
    /// The worker delivered a value.
    Ready(T),
    /// The worker hung up without (further) values.
    Closed,
}

pub struct TaskHandle<T> {
    rx: Receiver<T>,
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl<T> TaskHandle<T> {
    pub fn new(rx: Receiver<T>) -> Self {
        Self { rx, cancel: None }
    }

    /// Create a handle together with the sender a worker should report on.
    pub fn channel() -> (Sender<T>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx, Self::new(rx))
    }

    /// Attach the hook run by [`TaskHandle::cancel`].
    pub fn with_cancel(mut self, cancel: impl FnOnce() + Send + 'static) -> Self {
        self.cancel = Some(Box::new(cancel));
        self
    }

    pub fn poll(&self) -> TaskPoll<T> {
        match self.rx.try_recv() {
            Ok(value) => TaskPoll::Ready(value),
            Err(TryRecvError::Empty) => TaskPoll::Pending,
            Err(TryRecvError::Disconnected) => TaskPoll::Closed,
        }
    }

    /// Runs the cancel hook. Calling it again is a no-op.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    #[cfg(test)]
    pub fn wait(&self, timeout: std::time::Duration) -> TaskPoll<T> {
        match self.rx.recv_timeout(timeout) {
            Ok(value) => TaskPoll::Ready(value),
            Err(mpsc::RecvTimeoutError::Timeout) => TaskPoll::Pending,
            Err(mpsc::RecvTimeoutError::Disconnected) => TaskPoll::Closed,
        }
    }
}

impl<T> std::fmt::Debug for TaskHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskHandle")
            .field("cancellable", &self.cancel.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn poll_reports_pending_ready_then_closed() {
        let (tx, handle) = TaskHandle::channel();
        assert_eq!(handle.poll(), TaskPoll::Pending);

        tx.send(7).unwrap();
        assert_eq!(handle.poll(), TaskPoll::Ready(7));
        assert_eq!(handle.poll(), TaskPoll::Pending);

        drop(tx);
        assert_eq!(handle.poll(), TaskPoll::<i32>::Closed);
    }

    #[test]
    fn values_sent_before_hangup_are_still_delivered() {
        let (tx, handle) = TaskHandle::channel();
        tx.send("started").unwrap();
        drop(tx);

        assert_eq!(handle.poll(), TaskPoll::Ready("started"));
        assert_eq!(handle.poll(), TaskPoll::Closed);
    }

    #[test]
    fn cancel_hook_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let (_tx, handle) = TaskHandle::<()>::channel();
        let mut handle = handle.with_cancel(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        handle.cancel();
        handle.cancel();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
