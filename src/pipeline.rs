//! Pipeline orchestration
//!
//! Public entry points for the batch pipeline (load → encode → train →
//! predict → report) and a stateful processor that keeps a trained model
//! across calls and opens live tracking sessions.

use crate::encoder::{EncodedBatch, FeatureEncoder};
use crate::error::HerdError;
use crate::loader;
use crate::model::{ClassifierModel, ClassifierSpec, TrainConfig, TrainedModel, TrainingObserver};
use crate::predictor::PredictionService;
use crate::report::{PredictionReport, ReportEncoder};
use crate::tracker::TrackingSession;
use std::io::Read;
use std::path::Path;

/// Run the full batch pipeline from CSV readers.
///
/// Trains under the normalized 3-feature policy, then classifies the input
/// batch with the fixed 0.5 threshold. Fails with [`HerdError::Training`]
/// when the training data has no usable rows or no label column.
pub fn classify_csv<R1: Read, R2: Read>(
    train_input: R1,
    classify_input: R2,
    config: &TrainConfig,
    observer: &mut dyn TrainingObserver,
) -> Result<PredictionReport, HerdError> {
    let mut processor = HerdProcessor::new();
    processor.train_from_reader(train_input, config, observer)?;
    processor.classify_from_reader(classify_input)
}

/// Convenience wrapper over [`classify_csv`] taking file paths.
pub fn classify_csv_files<P1: AsRef<Path>, P2: AsRef<Path>>(
    train_path: P1,
    classify_path: P2,
    config: &TrainConfig,
    observer: &mut dyn TrainingObserver,
) -> Result<PredictionReport, HerdError> {
    let train_file = std::fs::File::open(train_path)?;
    let classify_file = std::fs::File::open(classify_path)?;
    classify_csv(train_file, classify_file, config, observer)
}

/// Stateful processor for incremental use.
///
/// Trains once, keeps the resulting models for the process lifetime, and
/// classifies any number of further batches. Also trains the 2-feature raw
/// variant alongside, so live tracking sessions opened from this processor
/// classify coordinates as they arrive.
pub struct HerdProcessor {
    batch_model: Option<TrainedModel>,
    live_model: Option<TrainedModel>,
    report_encoder: ReportEncoder,
}

impl Default for HerdProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl HerdProcessor {
    pub fn new() -> Self {
        Self {
            batch_model: None,
            live_model: None,
            report_encoder: ReportEncoder::new(),
        }
    }

    pub fn is_trained(&self) -> bool {
        self.batch_model.is_some()
    }

    /// Train both model variants from labeled CSV data.
    ///
    /// The batch model trains on normalized `[lat, long, speed]` vectors;
    /// the live model trains on raw `[lat, long]` pairs from the same rows.
    /// Rows with unparseable numeric fields are dropped before training.
    pub fn train_from_reader<R: Read>(
        &mut self,
        input: R,
        config: &TrainConfig,
        observer: &mut dyn TrainingObserver,
    ) -> Result<(), HerdError> {
        let rows = loader::load_rows(input)?;

        let batch = FeatureEncoder::encode(&rows, crate::types::EncodingPolicy::Normalized);
        FeatureEncoder::check_alignment(&batch)?;
        if !batch.is_labeled() {
            return Err(HerdError::Training(
                "training data has no behavior column".into(),
            ));
        }

        tracing::info!(
            rows = rows.len(),
            usable = batch.features.len(),
            "training behavior classifier"
        );

        let batch_model = ClassifierModel::train(
            &batch.features,
            &batch.labels,
            ClassifierSpec::batch(),
            config,
            observer,
        )?;

        // The live variant sees the same rows as raw coordinate pairs.
        // Dropped rows must stay dropped so the labels still line up.
        let live_batch = live_features_from(&batch);
        let live_model = ClassifierModel::train(
            &live_batch.features,
            &live_batch.labels,
            ClassifierSpec::live(),
            config,
            observer,
        )?;

        self.batch_model = Some(batch_model);
        self.live_model = Some(live_model);
        Ok(())
    }

    /// Classify an unlabeled CSV batch with the trained model.
    pub fn classify_from_reader<R: Read>(&self, input: R) -> Result<PredictionReport, HerdError> {
        let model = self
            .batch_model
            .as_ref()
            .ok_or_else(|| HerdError::Training("no trained model available".into()))?;

        let rows = loader::load_rows(input)?;
        let batch = FeatureEncoder::encode(&rows, model.policy());
        let predictions = PredictionService::predict(model, &batch.features)?;

        Ok(self.report_encoder.encode(predictions, model.policy()))
    }

    /// Open a tracking session bound to the live model, when one exists.
    pub fn open_session(&self) -> Result<TrackingSession, HerdError> {
        match &self.live_model {
            Some(model) => TrackingSession::with_model(model.clone()),
            None => Ok(TrackingSession::new()),
        }
    }
}

/// Denormalize a batch back to raw `[lat, long]` pairs for the live model.
///
/// Operates on the already-filtered normalized batch so row dropping and
/// label alignment carry over unchanged.
fn live_features_from(batch: &EncodedBatch) -> EncodedBatch {
    let features = batch
        .features
        .iter()
        .map(|v| vec![v[0] * 180.0 - 90.0, v[1] * 360.0 - 180.0])
        .collect();
    EncodedBatch {
        features,
        labels: batch.labels.clone(),
    }
}
