/// What the engine should do after classifying one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The target accepted the request; leave the loop.
    Stop,
    /// Wait for the fixed delay and send again.
    Continue,
    /// Give up and propagate the error to the orchestrator.
    Fatal,
}

impl Outcome {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Outcome::Continue)
    }
}
