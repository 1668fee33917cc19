// Text-to-speech for the explanation panel.
//
// `SystemSpeech` pipes the text into an external synthesizer (espeak, `say`,
// or PowerShell's System.Speech) running as a child process.  A watcher
// thread reports `Started` once the process is up and `Finished`/`Failed`
// when it exits; cancelling kills the process and the watcher hangs up
// without a final event.

use crate::task::TaskHandle;
use anyhow::{bail, Context, Result};
use std::io::Write;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEvent {
    Started,
    Finished,
    Failed(String),
}

pub trait SpeechEngine {
    /// Start speaking `text`. Any utterance this engine started earlier is
    /// cancelled first.
    fn speak(&mut self, text: &str) -> TaskHandle<SpeechEvent>;
}

/// A synthesizer program that reads the text to speak from stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl SpeechCommand {
    pub fn parse(line: &str) -> Result<Self> {
        let mut words = shell_words::split(line)
            .with_context(|| format!("invalid speech command: {line}"))?
            .into_iter();
        let Some(program) = words.next() else {
            bail!("speech command is empty");
        };
        Ok(Self {
            program,
            args: words.collect(),
        })
    }

    pub fn platform_default() -> Self {
        if cfg!(target_os = "macos") {
            Self {
                program: "say".into(),
                args: vec!["-f".into(), "-".into()],
            }
        } else if cfg!(windows) {
            Self {
                program: "powershell".into(),
                args: vec![
                    "-NoProfile".into(),
                    "-Command".into(),
                    "Add-Type -AssemblyName System.Speech; \
                     (New-Object System.Speech.Synthesis.SpeechSynthesizer).Speak([Console]::In.ReadToEnd())"
                        .into(),
                ],
            }
        } else {
            Self {
                program: "espeak".into(),
                args: vec!["--stdin".into()],
            }
        }
    }
}

#[derive(Default)]
struct Utterance {
    child: Mutex<Option<Child>>,
    cancelled: AtomicBool,
}

impl Utterance {
    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        if let Ok(mut slot) = self.child.lock() {
            if let Some(child) = slot.as_mut() {
                let _ = child.kill();
            }
        }
    }

    /// Kill the stored child and wait for it so it does not linger as a
    /// zombie.
    fn reap(&self) {
        let child = match self.child.lock() {
            Ok(mut slot) => slot.take(),
            Err(_) => None,
        };
        if let Some(mut child) = child {
            let _ = child.kill();
            let _ = child.wait();
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

pub struct SystemSpeech {
    command: SpeechCommand,
    current: Option<Arc<Utterance>>,
}

impl SystemSpeech {
    pub fn new(command: SpeechCommand) -> Self {
        Self {
            command,
            current: None,
        }
    }
}

impl SpeechEngine for SystemSpeech {
    fn speak(&mut self, text: &str) -> TaskHandle<SpeechEvent> {
        if let Some(previous) = self.current.take() {
            previous.cancel();
        }

        let (tx, handle) = TaskHandle::channel();
        let utterance = Arc::new(Utterance::default());
        self.current = Some(Arc::clone(&utterance));

        let worker = Arc::clone(&utterance);
        let command = self.command.clone();
        let text = text.to_owned();
        let spawned = thread::Builder::new()
            .name("speech".into())
            .spawn(move || run_utterance(&command, &text, &worker, &tx));
        if let Err(err) = spawned {
            warn!(error = %err, "could not spawn speech worker");
        }

        handle.with_cancel(move || utterance.cancel())
    }
}

impl Drop for SystemSpeech {
    fn drop(&mut self) {
        if let Some(current) = self.current.take() {
            current.cancel();
        }
    }
}

fn run_utterance(
    command: &SpeechCommand,
    text: &str,
    utterance: &Utterance,
    tx: &Sender<SpeechEvent>,
) {
    if utterance.is_cancelled() {
        return;
    }

    let mut child = match Command::new(&command.program)
        .args(&command.args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(child) => child,
        Err(err) => {
            let _ = tx.send(SpeechEvent::Failed(format!(
                "could not start `{}`: {err}",
                command.program
            )));
            return;
        }
    };

    let stdin = child.stdin.take();
    match utterance.child.lock() {
        Ok(mut slot) => *slot = Some(child),
        Err(_) => {
            let _ = child.kill();
            return;
        }
    }
    // cancel() may have run before the child was stored
    if utterance.is_cancelled() {
        utterance.reap();
        return;
    }

    let _ = tx.send(SpeechEvent::Started);
    debug!(program = %command.program, chars = text.len(), "utterance started");

    if let Some(mut stdin) = stdin {
        // A failed write usually means the process was killed; the exit
        // status below tells the rest of the story.
        let _ = stdin.write_all(text.as_bytes());
    }

    let status = loop {
        let exited = match utterance.child.lock() {
            Ok(mut slot) => match slot.as_mut() {
                Some(child) => child.try_wait(),
                None => return,
            },
            Err(_) => return,
        };
        match exited {
            Ok(Some(status)) => break Ok(status),
            Ok(None) => thread::sleep(EXIT_POLL_INTERVAL),
            Err(err) => break Err(err),
        }
    };

    if utterance.is_cancelled() {
        utterance.reap();
        return;
    }

    let event = match status {
        Ok(status) if status.success() => SpeechEvent::Finished,
        Ok(status) => SpeechEvent::Failed(format!("`{}` exited with {status}", command.program)),
        Err(err) => SpeechEvent::Failed(err.to_string()),
    };
    let _ = tx.send(event);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskPoll;

    const WAIT: Duration = Duration::from_secs(10);

    #[test]
    fn parse_rejects_empty_command() {
        assert!(SpeechCommand::parse("   ").is_err());
        assert!(SpeechCommand::parse("say 'unterminated").is_err());
    }

    #[test]
    fn platform_default_names_a_program() {
        let command = SpeechCommand::platform_default();
        assert!(!command.program.is_empty());
    }

    #[test]
    fn missing_program_reports_failure() {
        let mut speech = SystemSpeech::new(SpeechCommand {
            program: "pysleuth-no-such-synthesizer".into(),
            args: Vec::new(),
        });
        let handle = speech.speak("hello");
        match handle.wait(WAIT) {
            TaskPoll::Ready(SpeechEvent::Failed(msg)) => {
                assert!(msg.contains("pysleuth-no-such-synthesizer"))
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn utterance_starts_then_finishes() {
        let mut speech = SystemSpeech::new(SpeechCommand::parse("cat").unwrap());
        let handle = speech.speak("Division by zero");

        assert_eq!(handle.wait(WAIT), TaskPoll::Ready(SpeechEvent::Started));
        assert_eq!(handle.wait(WAIT), TaskPoll::Ready(SpeechEvent::Finished));
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_a_failure() {
        let mut speech = SystemSpeech::new(SpeechCommand::parse("sh -c 'exit 3'").unwrap());
        let handle = speech.speak("text");

        assert_eq!(handle.wait(WAIT), TaskPoll::Ready(SpeechEvent::Started));
        assert!(matches!(
            handle.wait(WAIT),
            TaskPoll::Ready(SpeechEvent::Failed(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn cancelled_utterance_hangs_up_without_final_event() {
        let mut speech = SystemSpeech::new(SpeechCommand::parse("sleep 30").unwrap());
        let mut handle = speech.speak("text");
        assert_eq!(handle.wait(WAIT), TaskPoll::Ready(SpeechEvent::Started));

        handle.cancel();
        assert_eq!(handle.wait(WAIT), TaskPoll::Closed);
    }

    #[cfg(unix)]
    #[test]
    fn reap_kills_and_clears_the_stored_child() {
        let utterance = Utterance::default();
        let child = Command::new("sleep").arg("30").spawn().unwrap();
        let pid = child.id();
        *utterance.child.lock().unwrap() = Some(child);

        utterance.cancel();
        utterance.reap();

        assert!(utterance.child.lock().unwrap().is_none());
        // A reaped pid is gone from the process table; a zombie would
        // still answer signal 0.
        let alive = Command::new("kill")
            .args(["-0", &pid.to_string()])
            .stderr(Stdio::null())
            .status()
            .unwrap();
        assert!(!alive.success());
    }

    #[cfg(unix)]
    #[test]
    fn new_utterance_cancels_the_previous_one() {
        let mut speech = SystemSpeech::new(SpeechCommand::parse("sleep 30").unwrap());
        let first = speech.speak("one");
        assert_eq!(first.wait(WAIT), TaskPoll::Ready(SpeechEvent::Started));

        let mut second = speech.speak("two");
        assert_eq!(first.wait(WAIT), TaskPoll::Closed);
        assert_eq!(second.wait(WAIT), TaskPoll::Ready(SpeechEvent::Started));
        second.cancel();
    }
}
