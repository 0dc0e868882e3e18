pub mod fitness_sync;
pub mod recognition;

pub use fitness_sync::FitnessSyncPayload;
pub use recognition::RecognitionSummary;
