use ndarray::{Array1, Array2, ArrayView1, ArrayView2, ArrayViewMut1, linalg, s};

use super::activations::ActFn;
use crate::{MlErr, Result};

/// The topology and weights of a recurrent network.
///
/// Units are laid out as `[inputs | bias | hidden neurons | output neurons]`, the bias unit
/// always has an activation of one. Every neuron computes its weighted input from the current
/// input, the bias and the activations of all neurons at the previous timestep.
///
/// The parameters are the weights of the existing connections, listed neuron by neuron and
/// unit by unit.
#[derive(Clone, Debug)]
pub struct RecurrentStructure {
    inputs: usize,
    hidden: usize,
    outputs: usize,
    act_fn: ActFn,
    output_act_fn: ActFn,

    // [neurons × units], `weights` is zero wherever there's no connection.
    connections: Array2<bool>,
    weights: Array2<f64>,

    // The (neuron, unit) pair of every parameter, in parameter vector order.
    param_indices: Vec<(usize, usize)>,
}

impl RecurrentStructure {
    /// Creates a new fully connected `RecurrentStructure` with all weights set to zero.
    ///
    /// # Arguments
    /// * `inputs` - The amount of input units.
    /// * `hidden` - The amount of hidden neurons.
    /// * `outputs` - The amount of output neurons.
    /// * `act_fn` - The activation function of the hidden neurons.
    /// * `output_act_fn` - The activation function of the output neurons.
    ///
    /// # Returns
    /// A new `RecurrentStructure` or an error if there are no output neurons.
    pub fn new(
        inputs: usize,
        hidden: usize,
        outputs: usize,
        act_fn: ActFn,
        output_act_fn: ActFn,
    ) -> Result<Self> {
        if outputs == 0 {
            return Err(MlErr::InvalidTopology(
                "the network needs at least one output neuron",
            ));
        }

        let neurons = hidden + outputs;
        let units = inputs + 1 + neurons;

        let mut structure = Self {
            inputs,
            hidden,
            outputs,
            act_fn,
            output_act_fn,
            connections: Array2::from_elem((neurons, units), true),
            weights: Array2::zeros((neurons, units)),
            param_indices: Vec::new(),
        };

        structure.index_params();
        Ok(structure)
    }

    /// Restricts the connections of the network, weights of removed connections are zeroed.
    ///
    /// # Arguments
    /// * `connections` - A `[neurons × units]` matrix, entry `(k, l)` tells whether unit `l`
    ///   feeds neuron `k`.
    ///
    /// # Returns
    /// The restricted structure or an error if the matrix has the wrong shape or no connections.
    pub fn with_connections(mut self, connections: Array2<bool>) -> Result<Self> {
        let (neurons, units) = (self.neurons(), self.units());

        if connections.dim() != (neurons, units) {
            return Err(MlErr::SizeMismatch {
                what: "connection matrix",
                got: connections.len(),
                expected: neurons * units,
            });
        }

        if !connections.iter().any(|&c| c) {
            return Err(MlErr::InvalidTopology(
                "the network needs at least one connection",
            ));
        }

        self.weights.zip_mut_with(&connections, |w, &c| {
            if !c {
                *w = 0.;
            }
        });

        self.connections = connections;
        self.index_params();
        Ok(self)
    }

    fn index_params(&mut self) {
        self.param_indices = self
            .connections
            .indexed_iter()
            .filter(|(_, c)| **c)
            .map(|(idx, _)| idx)
            .collect();
    }

    pub fn inputs(&self) -> usize {
        self.inputs
    }

    pub fn hidden(&self) -> usize {
        self.hidden
    }

    pub fn outputs(&self) -> usize {
        self.outputs
    }

    /// Returns the amount of units with incoming weights, hidden and output neurons.
    pub fn neurons(&self) -> usize {
        self.hidden + self.outputs
    }

    /// Returns the amount of units: inputs, bias and neurons.
    pub fn units(&self) -> usize {
        self.inputs + 1 + self.neurons()
    }

    /// Returns the unit index of the bias.
    pub fn bias(&self) -> usize {
        self.inputs
    }

    /// Returns the unit index of the first neuron.
    pub fn first_neuron(&self) -> usize {
        self.inputs + 1
    }

    /// Returns the amount of parameters, that is, the amount of connections.
    pub fn parameters(&self) -> usize {
        self.param_indices.len()
    }

    pub fn connections(&self) -> ArrayView2<'_, bool> {
        self.connections.view()
    }

    /// Returns the `[neurons × units]` weight matrix.
    pub fn weights(&self) -> ArrayView2<'_, f64> {
        self.weights.view()
    }

    /// Returns the (neuron, unit) pair every parameter connects, in parameter vector order.
    pub fn param_indices(&self) -> &[(usize, usize)] {
        &self.param_indices
    }

    /// Returns the activation function of the given neuron.
    pub fn act_fn(&self, neuron: usize) -> &ActFn {
        if neuron < self.hidden {
            &self.act_fn
        } else {
            &self.output_act_fn
        }
    }

    pub fn parameter_vector(&self) -> Array1<f64> {
        self.param_indices
            .iter()
            .map(|&idx| self.weights[idx])
            .collect()
    }

    pub fn set_parameter_vector(&mut self, params: &[f64]) -> Result<()> {
        if params.len() != self.parameters() {
            return Err(MlErr::SizeMismatch {
                what: "parameter vector",
                got: params.len(),
                expected: self.parameters(),
            });
        }

        for (&idx, &p) in self.param_indices.iter().zip(params) {
            self.weights[idx] = p;
        }

        Ok(())
    }

    /// Computes one timestep of the network in place.
    ///
    /// # Arguments
    /// * `input` - The external input of this timestep.
    /// * `activation` - The unit activations, on entry those of the previous timestep and on
    ///   exit those of the current one.
    /// * `derivative` - Receives the derivative of every neuron's activation with respect to
    ///   its weighted input.
    ///
    /// # Returns
    /// An error if any of the buffers has the wrong length, in which case nothing is written.
    pub fn step(
        &self,
        input: ArrayView1<f64>,
        mut activation: ArrayViewMut1<f64>,
        mut derivative: ArrayViewMut1<f64>,
    ) -> Result<()> {
        check_len("input", input.len(), self.inputs)?;
        check_len("activation", activation.len(), self.units())?;
        check_len("derivative", derivative.len(), self.neurons())?;

        activation.slice_mut(s![..self.inputs]).assign(&input);
        activation[self.bias()] = 1.;

        // The neuron slice still holds the previous timestep here.
        linalg::general_mat_vec_mul(1.0, &self.weights, &activation, 0.0, &mut derivative);

        let first = self.first_neuron();
        for (k, d) in derivative.iter_mut().enumerate() {
            let act_fn = self.act_fn(k);
            let z = *d;

            activation[first + k] = act_fn.f(z);
            *d = act_fn.df(z);
        }

        Ok(())
    }
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
