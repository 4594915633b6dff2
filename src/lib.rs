//! Herdsense - On-device analytics engine for livestock movement tracking
//!
//! Herdsense runs two independent pipelines over animal position data:
//!
//! - **Batch classification**: delimited tabular samples → feature encoding
//!   → feed-forward classifier training → behavior predictions
//! - **Live tracking**: a stream of coordinates → distance and energy
//!   accumulation, stationary-location alerts, activity recommendations,
//!   and per-coordinate behavior classification
//!
//! ## Modules
//!
//! - **loader / encoder**: tabular ingestion and feature encoding policies
//! - **network / model / predictor**: classifier training and inference
//! - **geo / tracker**: the streaming coordinate analytics state machine

pub mod encoder;
pub mod error;
pub mod geo;
pub mod loader;
pub mod model;
pub mod network;
pub mod pipeline;
pub mod predictor;
pub mod report;
pub mod tracker;
pub mod types;

pub use error::HerdError;
pub use model::{ClassifierModel, ClassifierSpec, LogObserver, NoopObserver, TrainConfig, TrainedModel, TrainingObserver};
pub use pipeline::{classify_csv, classify_csv_files, HerdProcessor};
pub use predictor::PredictionService;
pub use report::{PredictionReport, ReportEncoder};
pub use tracker::{TrackUpdate, TrackingSession};
pub use types::{
    Behavior, EncodingPolicy, EpochMetrics, LabeledSample, Observation, Recommendation,
    TrackEvent, TrackState,
};

/// Engine version embedded in all prediction reports
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for prediction reports
pub const PRODUCER_NAME: &str = "herdsense";
