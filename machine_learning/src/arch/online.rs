use std::{
    mem,
    sync::atomic::{AtomicUsize, Ordering},
};

use log::{debug, trace};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis, linalg, s};
use rayon::prelude::*;

use super::{Model, RecurrentStructure};
use crate::{MlErr, Result};

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

fn next_id() -> usize {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// The mutable state of one sequence being fed to an `OnlineRnn`.
///
/// It is created by `OnlineRnn::create_state` and can only be used with the model that
/// created it. A new sequence needs a new state, nothing is ever reset.
#[derive(Clone, Debug)]
pub struct SequenceState {
    owner: usize,
    activation: Array1<f64>,
    last_activation: Array1<f64>,
    derivative: Array1<f64>,
    gradient: Option<UnitGradient>,
    steps: usize,
}

/// `current[i][k]` is the derivative of neuron `k`'s activation with respect to parameter `i`,
/// `next` is scratch space of the same shape for the recurrence.
#[derive(Clone, Debug)]
struct UnitGradient {
    current: Array2<f64>,
    next: Array2<f64>,
}

impl SequenceState {
    /// Returns the unit activations after the last evaluation.
    pub fn activation(&self) -> ArrayView1<'_, f64> {
        self.activation.view()
    }

    /// Returns the unit activations before the last evaluation.
    pub fn last_activation(&self) -> ArrayView1<'_, f64> {
        self.last_activation.view()
    }

    /// Returns the `[parameters × neurons]` derivatives of the neuron activations, or `None` if
    /// the model doesn't track gradients.
    pub fn unit_gradient(&self) -> Option<ArrayView2<'_, f64>> {
        self.gradient.as_ref().map(|g| g.current.view())
    }

    /// Returns the amount of timesteps evaluated on this state.
    pub fn steps(&self) -> usize {
        self.steps
    }
}

/// A recurrent network evaluated one timestep at a time.
///
/// Every call to `eval` feeds a single input and advances the given `SequenceState`. When built
/// with gradient tracking, each step also updates the derivatives of all neuron activations with
/// respect to all parameters (forward mode, real time recurrent learning), which costs
/// `O(parameters × neurons²)` time and `O(parameters × neurons)` memory per sequence.
///
/// The model itself is never mutated by evaluation, so it can be shared between threads as long
/// as every sequence has its own state.
#[derive(Debug)]
pub struct OnlineRnn {
    id: usize,
    structure: RecurrentStructure,
    compute_gradient: bool,
}

impl Clone for OnlineRnn {
    fn clone(&self) -> Self {
        Self {
            id: next_id(),
            structure: self.structure.clone(),
            compute_gradient: self.compute_gradient,
        }
    }
}

impl OnlineRnn {
    /// Creates a new `OnlineRnn`.
    ///
    /// # Arguments
    /// * `structure` - The topology and weights of the network.
    /// * `compute_gradient` - Whether the sequence states track the parameter derivatives.
    pub fn new(structure: RecurrentStructure, compute_gradient: bool) -> Self {
        Self {
            id: next_id(),
            structure,
            compute_gradient,
        }
    }

    pub fn structure(&self) -> &RecurrentStructure {
        &self.structure
    }

    pub fn computes_gradient(&self) -> bool {
        self.compute_gradient
    }

    /// Returns the bytes every sequence state allocates for the parameter derivatives.
    pub fn gradient_memory(&self) -> usize {
        if !self.compute_gradient {
            return 0;
        }

        2 * self.structure.parameters() * self.structure.neurons() * mem::size_of::<f64>()
    }

    /// Creates the state for a new sequence, all activations start at zero.
    pub fn create_state(&self) -> SequenceState {
        debug!(
            model = self.id,
            gradient_bytes = self.gradient_memory();
            "creating sequence state"
        );

        self.new_state(self.compute_gradient)
    }

    fn new_state(&self, with_gradient: bool) -> SequenceState {
        let units = self.structure.units();
        let neurons = self.structure.neurons();
        let shape = (self.structure.parameters(), neurons);

        let gradient = with_gradient.then(|| UnitGradient {
            current: Array2::zeros(shape),
            next: Array2::zeros(shape),
        });

        SequenceState {
            owner: self.id,
            activation: Array1::zeros(units),
            last_activation: Array1::zeros(units),
            derivative: Array1::zeros(neurons),
            gradient,
            steps: 0,
        }
    }

    /// Feeds one timestep to the network.
    ///
    /// # Arguments
    /// * `pattern` - A batch holding exactly one input row.
    /// * `state` - The state of the sequence, created by this model.
    ///
    /// # Returns
    /// A `[1 × outputs]` batch with the output, or an error, in which case `state` is untouched.
    pub fn eval(
        &self,
        pattern: ArrayView2<f64>,
        state: &mut SequenceState,
    ) -> Result<Array2<f64>> {
        let input = single_row(pattern)?;
        let output = self.eval_step(input, state)?;
        Ok(output.insert_axis(Axis(0)))
    }

    /// Feeds one timestep to the network.
    ///
    /// # Arguments
    /// * `input` - The input of this timestep.
    /// * `state` - The state of the sequence, created by this model.
    ///
    /// # Returns
    /// The output of the network, or an error, in which case `state` is untouched.
    pub fn eval_step(
        &self,
        input: ArrayView1<f64>,
        state: &mut SequenceState,
    ) -> Result<Array1<f64>> {
        self.check_state(state)?;
        check_len("input", input.len(), self.structure.inputs())?;

        let SequenceState {
            activation,
            last_activation,
            derivative,
            gradient,
            steps,
            ..
        } = state;

        last_activation.assign(&*activation);
        self.structure
            .step(input, activation.view_mut(), derivative.view_mut())?;

        if let Some(gradient) = gradient {
            self.update_gradient(input, last_activation.view(), derivative.view(), gradient);
        }

        *steps += 1;
        trace!(model = self.id, step = *steps; "evaluated timestep");

        Ok(self.output(activation.view()).to_owned())
    }

    /// Applies one step of the forward recurrence
    ///
    /// `G_t[i][k] = f'_k * (sum_l W[k][l] * G_{t-1}[i][l] + [i = (k, j)] * src_j)`
    ///
    /// where `l` runs over the neurons and `src_j` is what unit `j` fed into the weighted sums
    /// of this step.
    fn update_gradient(
        &self,
        input: ArrayView1<f64>,
        last_activation: ArrayView1<f64>,
        derivative: ArrayView1<f64>,
        gradient: &mut UnitGradient,
    ) {
        let structure = &self.structure;
        let inputs = structure.inputs();
        let recurrent = structure.weights().slice_move(s![.., structure.first_neuron()..]);
        let UnitGradient { current, next } = gradient;

        linalg::general_mat_mul(1.0, &*current, &recurrent.t(), 0.0, &mut *next);

        for (i, &(k, j)) in structure.param_indices().iter().enumerate() {
            let src = if j < inputs {
                input[j]
            } else if j == structure.bias() {
                1.
            } else {
                last_activation[j]
            };

            next[[i, k]] += src;
        }

        *next *= &derivative;
        mem::swap(current, next);
    }

    /// Computes the derivative of a weighted sum of the outputs with respect to every parameter,
    /// `sum_o coefficients[o] * d output_o / d param_i`.
    ///
    /// Must be called after `eval` for the timestep it refers to and before the next one.
    ///
    /// # Arguments
    /// * `pattern` - The batch given to the last `eval`, only its shape is checked.
    /// * `coefficients` - A batch holding one row of `outputs` coefficients, usually the
    ///   derivative of a loss with respect to the outputs.
    /// * `state` - The state of the sequence.
    ///
    /// # Returns
    /// One value per parameter, `MlErr::GradientDisabled` if the model was built without
    /// gradient tracking or `MlErr::NotEvaluated` if `state` hasn't seen any timestep yet.
    pub fn weighted_parameter_derivative(
        &self,
        pattern: ArrayView2<f64>,
        coefficients: ArrayView2<f64>,
        state: &SequenceState,
    ) -> Result<Array1<f64>> {
        if !self.compute_gradient {
            return Err(MlErr::GradientDisabled);
        }

        self.check_state(state)?;

        if state.steps == 0 {
            return Err(MlErr::NotEvaluated);
        }

        let input = single_row(pattern)?;
        check_len("input", input.len(), self.structure.inputs())?;

        let coefficients = single_row(coefficients)?;
        check_len("coefficients", coefficients.len(), self.structure.outputs())?;

        let gradient = state.gradient.as_ref().ok_or(MlErr::GradientDisabled)?;
        let outputs = gradient.current.slice(s![.., self.structure.hidden()..]);

        Ok(outputs.dot(&coefficients))
    }

    /// Overwrites the output activations of the sequence, the next step will see `values` as
    /// the previous output of the network. Used for teacher forcing.
    pub fn set_output_activation(
        &self,
        state: &mut SequenceState,
        values: ArrayView1<f64>,
    ) -> Result<()> {
        self.check_state(state)?;
        check_len("output activation", values.len(), self.structure.outputs())?;

        let start = self.structure.units() - self.structure.outputs();
        state.activation.slice_mut(s![start..]).assign(&values);
        Ok(())
    }

    /// Evaluates independent sequences in parallel, each one with a fresh state.
    ///
    /// # Arguments
    /// * `sequences` - The sequences, one timestep per row.
    ///
    /// # Returns
    /// The outputs of every sequence, one timestep per row, in the same order.
    pub fn eval_sequences(&self, sequences: &[ArrayView2<f64>]) -> Result<Vec<Array2<f64>>> {
        sequences
            .par_iter()
            .map(|sequence| -> Result<Array2<f64>> {
                let mut state = self.new_state(false);
                let mut outputs = Array2::zeros((sequence.nrows(), self.structure.outputs()));

                for (input, mut output) in sequence.outer_iter().zip(outputs.outer_iter_mut()) {
                    output.assign(&self.eval_step(input, &mut state)?);
                }

                Ok(outputs)
            })
            .collect()
    }

    fn output<'a>(&self, activation: ArrayView1<'a, f64>) -> ArrayView1<'a, f64> {
        let start = self.structure.units() - self.structure.outputs();
        activation.slice_move(s![start..])
    }

    fn check_state(&self, state: &SequenceState) -> Result<()> {
        if state.owner != self.id {
            return Err(MlErr::ForeignState {
                owner: state.owner,
                model: self.id,
            });
        }

        check_len(
            "sequence state",
            state.activation.len(),
            self.structure.units(),
        )
    }
}

impl Model for OnlineRnn {
    fn input_size(&self) -> usize {
        self.structure.inputs()
    }

    fn output_size(&self) -> usize {
        self.structure.outputs()
    }

    fn number_of_parameters(&self) -> usize {
        self.structure.parameters()
    }

    fn parameter_vector(&self) -> Array1<f64> {
        self.structure.parameter_vector()
    }

    fn set_parameter_vector(&mut self, params: &[f64]) -> Result<()> {
        self.structure.set_parameter_vector(params)
    }

    /// Always fails, there's nowhere to keep the recurrent state between calls.
    fn eval(&self, _batch: ArrayView2<f64>) -> Result<Array2<f64>> {
        Err(MlErr::MissingState)
    }
}

fn single_row(batch: ArrayView2<'_, f64>) -> Result<ArrayView1<'_, f64>> {
    if batch.nrows() != 1 {
        return Err(MlErr::InvalidBatchSize {
            got: batch.nrows(),
        });
    }

    Ok(batch.index_axis_move(Axis(0), 0))
}

fn check_len(what: &'static str, got: usize, expected: usize) -> Result<()> {
    if got != expected {
        return Err(MlErr::SizeMismatch {
            what,
            got,
            expected,
        });
    }

    Ok(())
}
