use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActFnConfig {
    Sigmoid { amp: f64 },
    Tanh,
    FastSigmoid,
    Linear,
}

/// How the initial parameters are generated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamGenConfig {
    Const { value: f64 },
    Uniform { low: f64, high: f64 },
    Normal { mean: f64, std_dev: f64 },
}

/// A fully connected recurrent network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub inputs: usize,
    pub hidden: usize,
    pub outputs: usize,
    pub hidden_act_fn: ActFnConfig,
    pub output_act_fn: ActFnConfig,
    pub init: ParamGenConfig,
}
