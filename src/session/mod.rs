pub(crate) mod controller;
pub(crate) mod runner;
pub(crate) mod ticker;


pub(crate) use runner::run_attempt;

/// Events driving one attempt session. Produced by the stdin reader and the
/// ticker task, consumed by the single event loop in `runner`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SessionEvent {
    /// 1-based choice among the current question's options.
    Select(usize),
    Next,
    Tick,
    Quit,
}
