use ndarray::{Array1, Array2, ArrayView2};

use crate::error::Result;

/// The capabilities shared by every model: evaluating batches and exposing its parameters as a
/// flat vector.
pub trait Model {
    /// Returns the length of every input row.
    fn input_size(&self) -> usize;

    /// Returns the length of every output row.
    fn output_size(&self) -> usize;

    /// Returns the amount of parameters in the model.
    fn number_of_parameters(&self) -> usize;

    /// Returns a copy of the model's parameters.
    fn parameter_vector(&self) -> Array1<f64>;

    /// Replaces the model's parameters.
    ///
    /// # Errors
    /// `MlErr::SizeMismatch` if `params` doesn't have `number_of_parameters` entries.
    fn set_parameter_vector(&mut self, params: &[f64]) -> Result<()>;

    /// Evaluates the model on a batch of inputs, one per row.
    ///
    /// # Arguments
    /// * `batch` - The inputs, a `[n × input_size]` matrix.
    ///
    /// # Returns
    /// A `[n × output_size]` matrix or an error if the model can't evaluate the batch.
    fn eval(&self, batch: ArrayView2<f64>) -> Result<Array2<f64>>;
}

/// A model whose outputs are class labels.
pub trait Classifier {
    /// Assigns a class to every row of the batch.
    fn classify(&self, batch: ArrayView2<f64>) -> Result<Vec<usize>>;
}
