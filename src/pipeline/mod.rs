pub mod error;
pub mod runner;
pub mod session;
pub mod stage;

pub use error::PipelineError;
pub use runner::{AuditWrite, StageOutcome, StageRunner};
pub use session::{Session, StageTicket};
pub use stage::{Stage, StageInput, StageStatus};
