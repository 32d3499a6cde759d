use super::{FastSigmoid, Sigmoid, Tanh};

/// The activation function applied by a neuron to its weighted input.
#[derive(Clone, Debug, PartialEq)]
pub enum ActFn {
    Sigmoid(Sigmoid),
    Tanh(Tanh),
    FastSigmoid(FastSigmoid),
    Linear,
}

impl ActFn {
    pub fn sigmoid(amp: f64) -> Self {
        Self::Sigmoid(Sigmoid::new(amp))
    }

    pub fn tanh() -> Self {
        Self::Tanh(Tanh)
    }

    pub fn fast_sigmoid() -> Self {
        Self::FastSigmoid(FastSigmoid)
    }

    pub fn linear() -> Self {
        Self::Linear
    }

    /// Evaluates the function at the weighted input `z`.
    pub fn f(&self, z: f64) -> f64 {
        match self {
            Self::Sigmoid(a) => a.f(z),
            Self::Tanh(a) => a.f(z),
            Self::FastSigmoid(a) => a.f(z),
            Self::Linear => z,
        }
    }

    /// Evaluates the derivative of the function at the weighted input `z`.
    pub fn df(&self, z: f64) -> f64 {
        match self {
            Self::Sigmoid(a) => a.df(z),
            Self::Tanh(a) => a.df(z),
            Self::FastSigmoid(a) => a.df(z),
            Self::Linear => 1.,
        }
    }
}
