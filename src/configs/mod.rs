mod network;
mod training;

use std::{fs, num::NonZeroUsize, path::Path};

use serde::{Deserialize, Serialize};

pub use network::{ActFnConfig, NetworkConfig, ParamGenConfig};
pub use training::{LossFnConfig, OptimizerConfig, SignalConfig, TrainingConfig};

use crate::error::SessionError;

/// The whole configuration of a training session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub network: NetworkConfig,
    pub training: TrainingConfig,
}

impl Default for Config {
    /// A small network learning to predict the next sample of a sine wave.
    fn default() -> Self {
        Self {
            network: NetworkConfig {
                inputs: 1,
                hidden: 4,
                outputs: 1,
                hidden_act_fn: ActFnConfig::Tanh,
                output_act_fn: ActFnConfig::Linear,
                init: ParamGenConfig::Uniform {
                    low: -0.3,
                    high: 0.3,
                },
            },
            training: TrainingConfig {
                signal: SignalConfig::Sine {
                    period: 16.,
                    amplitude: 0.8,
                    len: 200,
                },
                optimizer: OptimizerConfig::GradientDescent { lr: 0.02 },
                loss_fn: LossFnConfig::Mse,
                epochs: NonZeroUsize::new(20).unwrap_or(NonZeroUsize::MIN),
                teacher_forcing: false,
                seed: Some(42),
            },
        }
    }
}

impl Config {
    /// Parses a json configuration, it isn't validated yet.
    pub fn from_json(json: &str) -> Result<Self, SessionError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a json configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SessionError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Checks every constraint the network and the trainer need before anything is built.
    pub fn validate(&self) -> Result<(), SessionError> {
        self.validate_network()?;
        self.validate_training()
    }

    fn validate_network(&self) -> Result<(), SessionError> {
        let network = &self.network;

        if network.inputs == 0 {
            return Err(invalid("the network must have at least one input"));
        }

        if network.outputs == 0 {
            return Err(invalid("the network must have at least one output"));
        }

        for act_fn in [network.hidden_act_fn, network.output_act_fn] {
            match act_fn {
                ActFnConfig::Sigmoid { amp } if !amp.is_finite() || amp <= 0. => {
                    return Err(invalid(format!(
                        "sigmoid amplitude must be positive, got {amp}"
                    )));
                }
                _ => {}
            }
        }

        match network.init {
            ParamGenConfig::Const { value } if !value.is_finite() => Err(invalid(format!(
                "constant initialization must be finite, got {value}"
            ))),
            ParamGenConfig::Uniform { low, high }
                if low.is_nan() || high.is_nan() || low >= high =>
            {
                Err(invalid(format!(
                    "uniform initialization needs low < high, got [{low}, {high})"
                )))
            }
            ParamGenConfig::Normal { std_dev, .. } if std_dev.is_nan() || std_dev < 0. => {
                Err(invalid(format!(
                    "normal initialization needs a non negative std_dev, got {std_dev}"
                )))
            }
            _ => Ok(()),
        }
    }

    fn validate_training(&self) -> Result<(), SessionError> {
        let (inputs, outputs) = (self.network.inputs, self.network.outputs);
        let training = &self.training;

        match &training.signal {
            SignalConfig::Sine {
                period,
                amplitude,
                len,
            } => {
                if inputs != 1 || outputs != 1 {
                    return Err(invalid(format!(
                        "a sine signal needs 1 input and 1 output, the network has {inputs} and {outputs}"
                    )));
                }

                if !period.is_finite() || *period <= 0. {
                    return Err(invalid(format!("sine period must be positive, got {period}")));
                }

                if !amplitude.is_finite() {
                    return Err(invalid(format!(
                        "sine amplitude must be finite, got {amplitude}"
                    )));
                }

                if *len == 0 {
                    return Err(invalid("the signal must have at least one timestep"));
                }
            }
            SignalConfig::Inline {
                data,
                x_size,
                y_size,
            } => {
                if *x_size != inputs || *y_size != outputs {
                    return Err(invalid(format!(
                        "inline signal rows are {x_size} + {y_size} wide, the network has {inputs} inputs and {outputs} outputs"
                    )));
                }

                let row = x_size + y_size;
                if data.is_empty() || data.len() % row != 0 {
                    return Err(invalid(format!(
                        "inline signal length ({}) must be a non zero multiple of {row}",
                        data.len()
                    )));
                }
            }
        }

        let lr = match training.optimizer {
            OptimizerConfig::GradientDescent { lr } => lr,
            OptimizerConfig::GradientDescentWithMomentum { lr, mu } => {
                if !(0.0..1.0).contains(&mu) {
                    return Err(invalid(format!("momentum must be in [0, 1), got {mu}")));
                }

                lr
            }
        };

        if !lr.is_finite() || lr <= 0. {
            return Err(invalid(format!("learning rate must be positive, got {lr}")));
        }

        Ok(())
    }
}

fn invalid<S: Into<String>>(msg: S) -> SessionError {
    SessionError::InvalidConfig(msg.into())
}
