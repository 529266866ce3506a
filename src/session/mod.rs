//! Session layer: the human boundary, the durable recorder, and the
//! orchestration loop that drives rounds end to end.

pub mod host;
pub mod recorder;
pub mod runner;

pub use host::{ConsoleHost, EditOutcome, InteractionHost, EXIT_SENTINEL};
pub use recorder::{InteractionSink, JsonFileRecorder, SessionLog};
pub use runner::{ElicitationLoop, RunSummary};
