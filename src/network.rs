//! Dense feed-forward network engine
//!
//! A minimal trainable function approximator backing the behavior
//! classifier: fully-connected layers with ReLU hidden activations, a single
//! sigmoid output unit, binary cross-entropy loss, and Adam updates over
//! shuffled mini-batches. Weight initialization is stochastic, so repeated
//! training runs produce different exact losses.

use crate::types::EpochMetrics;
use rand::seq::SliceRandom;
use rand::Rng;

const ADAM_BETA1: f64 = 0.9;
const ADAM_BETA2: f64 = 0.999;
const ADAM_EPSILON: f64 = 1e-8;

/// Clamp for sigmoid outputs before the log in the BCE loss
const PROBABILITY_FLOOR: f64 = 1e-7;

/// One fully-connected layer: `outputs x inputs` weights plus biases
#[derive(Debug, Clone)]
struct DenseLayer {
    weights: Vec<Vec<f64>>,
    biases: Vec<f64>,
    relu: bool,
}

impl DenseLayer {
    /// Xavier-uniform initialization scaled by fan-in and fan-out
    fn new_xavier<R: Rng>(inputs: usize, outputs: usize, relu: bool, rng: &mut R) -> Self {
        let limit = (6.0 / (inputs + outputs) as f64).sqrt();
        let weights = (0..outputs)
            .map(|_| (0..inputs).map(|_| rng.gen_range(-limit..limit)).collect())
            .collect();
        Self {
            weights,
            biases: vec![0.0; outputs],
            relu,
        }
    }

    /// Pre-activation outputs for one input vector
    fn pre_activate(&self, input: &[f64]) -> Vec<f64> {
        self.weights
            .iter()
            .zip(&self.biases)
            .map(|(row, bias)| {
                row.iter().zip(input).map(|(w, x)| w * x).sum::<f64>() + bias
            })
            .collect()
    }

    fn activate(&self, pre: &[f64]) -> Vec<f64> {
        pre.iter()
            .map(|&z| if self.relu { z.max(0.0) } else { sigmoid(z) })
            .collect()
    }
}

/// Per-layer Adam moment buffers, shaped like the layer's parameters
#[derive(Debug, Clone)]
struct AdamMoments {
    m_weights: Vec<Vec<f64>>,
    v_weights: Vec<Vec<f64>>,
    m_biases: Vec<f64>,
    v_biases: Vec<f64>,
}

impl AdamMoments {
    fn zeros_like(layer: &DenseLayer) -> Self {
        let shape: Vec<Vec<f64>> = layer
            .weights
            .iter()
            .map(|row| vec![0.0; row.len()])
            .collect();
        Self {
            m_weights: shape.clone(),
            v_weights: shape,
            m_biases: vec![0.0; layer.biases.len()],
            v_biases: vec![0.0; layer.biases.len()],
        }
    }
}

/// Gradient accumulator shaped like one layer
#[derive(Debug, Clone)]
struct LayerGradients {
    weights: Vec<Vec<f64>>,
    biases: Vec<f64>,
}

impl LayerGradients {
    fn zeros_like(layer: &DenseLayer) -> Self {
        Self {
            weights: layer
                .weights
                .iter()
                .map(|row| vec![0.0; row.len()])
                .collect(),
            biases: vec![0.0; layer.biases.len()],
        }
    }
}

/// Feed-forward network with a single sigmoid output
#[derive(Debug, Clone)]
pub struct Network {
    layers: Vec<DenseLayer>,
    input_width: usize,
}

impl Network {
    /// Build a network from layer widths, e.g. `[3, 16, 8, 1]`.
    ///
    /// All hidden layers use ReLU; the final layer is a sigmoid unit.
    pub fn new<R: Rng>(widths: &[usize], rng: &mut R) -> Self {
        debug_assert!(widths.len() >= 2);
        debug_assert_eq!(*widths.last().unwrap_or(&0), 1);

        let last = widths.len() - 2;
        let layers = widths
            .windows(2)
            .enumerate()
            .map(|(i, pair)| DenseLayer::new_xavier(pair[0], pair[1], i != last, rng))
            .collect();

        Self {
            layers,
            input_width: widths[0],
        }
    }

    pub fn input_width(&self) -> usize {
        self.input_width
    }

    /// Forward pass producing a probability in [0, 1]
    pub fn forward(&self, input: &[f64]) -> f64 {
        let mut current = input.to_vec();
        for layer in &self.layers {
            let pre = layer.pre_activate(&current);
            current = layer.activate(&pre);
        }
        current[0]
    }

    /// Run one pass of mini-batch gradient descent over the whole dataset.
    ///
    /// Returns loss and accuracy measured over the training portion after
    /// the updates. `step` is the global Adam timestep counter, advanced
    /// once per batch.
    fn run_epoch<R: Rng>(
        &mut self,
        features: &[Vec<f64>],
        labels: &[f32],
        batch_size: usize,
        learning_rate: f64,
        moments: &mut [AdamMoments],
        step: &mut u64,
        rng: &mut R,
    ) -> EpochMetrics {
        let mut order: Vec<usize> = (0..features.len()).collect();
        order.shuffle(rng);

        for batch in order.chunks(batch_size) {
            let mut gradients: Vec<LayerGradients> =
                self.layers.iter().map(LayerGradients::zeros_like).collect();

            for &i in batch {
                self.accumulate_gradients(&features[i], labels[i] as f64, &mut gradients);
            }

            *step += 1;
            self.apply_adam(&gradients, batch.len(), learning_rate, moments, *step);
        }

        let (loss, accuracy) = self.evaluate(features, labels);
        EpochMetrics {
            epoch: 0,
            loss,
            accuracy,
        }
    }

    /// Train with Adam over shuffled mini-batches, reporting per-epoch
    /// metrics through `on_epoch`.
    pub fn fit<R, F>(
        &mut self,
        features: &[Vec<f64>],
        labels: &[f32],
        epochs: usize,
        batch_size: usize,
        validation_split: f64,
        learning_rate: f64,
        rng: &mut R,
        mut on_epoch: F,
    ) where
        R: Rng,
        F: FnMut(&EpochMetrics),
    {
        // Hold out the tail fraction for validation; train on the head.
        let holdout = ((features.len() as f64) * validation_split) as usize;
        let train_len = features.len().saturating_sub(holdout).max(1);
        let train_features = &features[..train_len];
        let train_labels = &labels[..train_len];

        let mut moments: Vec<AdamMoments> =
            self.layers.iter().map(AdamMoments::zeros_like).collect();
        let mut step = 0u64;

        for epoch in 0..epochs {
            let mut metrics = self.run_epoch(
                train_features,
                train_labels,
                batch_size.max(1),
                learning_rate,
                &mut moments,
                &mut step,
                rng,
            );
            metrics.epoch = epoch;
            on_epoch(&metrics);
        }
    }

    /// Mean BCE loss and accuracy at the fixed 0.5 threshold
    pub fn evaluate(&self, features: &[Vec<f64>], labels: &[f32]) -> (f64, f64) {
        if features.is_empty() {
            return (0.0, 0.0);
        }

        let mut loss_sum = 0.0;
        let mut correct = 0usize;
        for (input, &label) in features.iter().zip(labels) {
            let p = self
                .forward(input)
                .clamp(PROBABILITY_FLOOR, 1.0 - PROBABILITY_FLOOR);
            let y = label as f64;
            loss_sum -= y * p.ln() + (1.0 - y) * (1.0 - p).ln();
            let predicted = if p > 0.5 { 1.0 } else { 0.0 };
            if (predicted - y).abs() < f64::EPSILON {
                correct += 1;
            }
        }

        (
            loss_sum / features.len() as f64,
            correct as f64 / features.len() as f64,
        )
    }

    /// Backpropagate one sample, adding its gradients into the accumulator.
    ///
    /// Sigmoid output + BCE loss collapse to `delta = p - y` at the output.
    fn accumulate_gradients(
        &self,
        input: &[f64],
        target: f64,
        gradients: &mut [LayerGradients],
    ) {
        // Forward pass keeping pre-activations and activations per layer
        let mut activations: Vec<Vec<f64>> = vec![input.to_vec()];
        let mut pre_activations: Vec<Vec<f64>> = Vec::with_capacity(self.layers.len());

        for layer in &self.layers {
            let pre = layer.pre_activate(activations.last().map(|a| a.as_slice()).unwrap_or(input));
            let post = layer.activate(&pre);
            pre_activations.push(pre);
            activations.push(post);
        }

        let output = activations
            .last()
            .and_then(|a| a.first().copied())
            .unwrap_or(0.0);
        let mut delta = vec![output - target];

        for (index, layer) in self.layers.iter().enumerate().rev() {
            let layer_input = &activations[index];
            let grad = &mut gradients[index];

            for (j, &d) in delta.iter().enumerate() {
                grad.biases[j] += d;
                for (k, &x) in layer_input.iter().enumerate() {
                    grad.weights[j][k] += d * x;
                }
            }

            if index == 0 {
                break;
            }

            // Propagate through this layer's weights, then through the
            // previous layer's ReLU
            let prev_pre = &pre_activations[index - 1];
            let mut next_delta = vec![0.0; layer_input.len()];
            for (j, &d) in delta.iter().enumerate() {
                for (k, slot) in next_delta.iter_mut().enumerate() {
                    *slot += d * layer.weights[j][k];
                }
            }
            for (slot, &z) in next_delta.iter_mut().zip(prev_pre) {
                if z <= 0.0 {
                    *slot = 0.0;
                }
            }
            delta = next_delta;
        }
    }

    /// Apply one Adam update from batch-averaged gradients
    fn apply_adam(
        &mut self,
        gradients: &[LayerGradients],
        batch_len: usize,
        learning_rate: f64,
        moments: &mut [AdamMoments],
        step: u64,
    ) {
        let scale = 1.0 / batch_len.max(1) as f64;
        let bias1 = 1.0 - ADAM_BETA1.powi(step as i32);
        let bias2 = 1.0 - ADAM_BETA2.powi(step as i32);

        for ((layer, grad), moment) in self.layers.iter_mut().zip(gradients).zip(moments) {
            for j in 0..layer.weights.len() {
                for k in 0..layer.weights[j].len() {
                    let g = grad.weights[j][k] * scale;
                    let m = &mut moment.m_weights[j][k];
                    let v = &mut moment.v_weights[j][k];
                    *m = ADAM_BETA1 * *m + (1.0 - ADAM_BETA1) * g;
                    *v = ADAM_BETA2 * *v + (1.0 - ADAM_BETA2) * g * g;
                    let m_hat = *m / bias1;
                    let v_hat = *v / bias2;
                    layer.weights[j][k] -= learning_rate * m_hat / (v_hat.sqrt() + ADAM_EPSILON);
                }

                let g = grad.biases[j] * scale;
                let m = &mut moment.m_biases[j];
                let v = &mut moment.v_biases[j];
                *m = ADAM_BETA1 * *m + (1.0 - ADAM_BETA1) * g;
                *v = ADAM_BETA2 * *v + (1.0 - ADAM_BETA2) * g * g;
                let m_hat = *m / bias1;
                let v_hat = *v / bias2;
                layer.biases[j] -= learning_rate * m_hat / (v_hat.sqrt() + ADAM_EPSILON);
            }
        }
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}
