pub mod candidate;
pub mod loaders;
pub mod outcome;
pub mod query;

pub use candidate::ImageCandidate;
pub use loaders::{load_queries_from_file, parse_queries};
pub use outcome::{AcquisitionOutcome, BatchRun, OutcomeStatus};
pub use query::{normalize, Query};
