//! Background generation runner
//!
//! Runs a single completion request on a worker thread and hands the result
//! back to the event loop through a channel that is polled on every tick.

use super::completion::{CompletionError, CompletionService};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use tracing::{debug, warn};

/// Result of a finished generation request
pub type GenerationOutcome = Result<String, CompletionError>;

/// Runner owning at most one outstanding generation request
#[derive(Default)]
pub struct GenerationRunner {
    receiver: Option<Receiver<GenerationOutcome>>,
}

impl GenerationRunner {
    pub fn new() -> Self {
        Self { receiver: None }
    }

    /// Whether a request has been spawned and not yet collected
    pub fn is_pending(&self) -> bool {
        self.receiver.is_some()
    }

    /// Spawn a completion request on a worker thread
    ///
    /// Any previous receiver is replaced; callers check the domain's
    /// generation flag before spawning.
    pub fn spawn(&mut self, service: Arc<dyn CompletionService>, prompt: String) {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let outcome = service.complete(&prompt);
            if tx.send(outcome).is_err() {
                debug!("generation result dropped, receiver gone");
            }
        });

        self.receiver = Some(rx);
    }

    /// Collect the finished request, if any
    pub fn poll(&mut self) -> Option<GenerationOutcome> {
        let receiver = self.receiver.as_ref()?;

        match receiver.try_recv() {
            Ok(outcome) => {
                self.receiver = None;
                Some(outcome)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                warn!("generation worker exited without a result");
                self.receiver = None;
                Some(Err(CompletionError::Network(
                    "generation worker exited unexpectedly".to_string(),
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    struct EchoService;

    impl CompletionService for EchoService {
        fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
            Ok(format!("echo: {}", prompt))
        }
    }

    struct PanickingService;

    impl CompletionService for PanickingService {
        fn complete(&self, _prompt: &str) -> Result<String, CompletionError> {
            panic!("worker blew up");
        }
    }

    /// Poll until the runner yields a result or the deadline passes
    fn wait_for(runner: &mut GenerationRunner) -> GenerationOutcome {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(outcome) = runner.poll() {
                return outcome;
            }
            assert!(Instant::now() < deadline, "generation did not finish");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_poll_without_job_is_none() {
        let mut runner = GenerationRunner::new();
        assert!(!runner.is_pending());
        assert!(runner.poll().is_none());
    }

    #[test]
    fn test_spawn_and_collect() {
        let mut runner = GenerationRunner::new();
        runner.spawn(Arc::new(EchoService), "hello".to_string());
        assert!(runner.is_pending());

        let outcome = wait_for(&mut runner);
        assert_eq!(outcome.unwrap(), "echo: hello");
        assert!(!runner.is_pending());
        assert!(runner.poll().is_none());
    }

    #[test]
    fn test_dead_worker_reports_error() {
        let mut runner = GenerationRunner::new();
        runner.spawn(Arc::new(PanickingService), "x".to_string());

        let outcome = wait_for(&mut runner);
        assert!(matches!(outcome, Err(CompletionError::Network(_))));
    }
}
