use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossFnConfig {
    Mse,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerConfig {
    GradientDescent { lr: f64 },
    GradientDescentWithMomentum { lr: f64, mu: f64 },
}

/// The sequence the network learns to predict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalConfig {
    /// `s_t = amplitude * sin(2π t / period)`, the input is `s_t` and the target `s_{t+1}`.
    Sine {
        period: f64,
        amplitude: f64,
        len: usize,
    },
    /// One timestep per row, `x_size` inputs followed by `y_size` targets.
    Inline {
        data: Vec<f64>,
        x_size: usize,
        y_size: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub signal: SignalConfig,
    pub optimizer: OptimizerConfig,
    pub loss_fn: LossFnConfig,
    pub epochs: NonZeroUsize,
    #[serde(default)]
    pub teacher_forcing: bool,
    #[serde(default)]
    pub seed: Option<u64>,
}
