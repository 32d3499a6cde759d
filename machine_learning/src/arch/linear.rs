use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use super::{Classifier, Model};
use crate::{MlErr, Result};

/// An affine model, `y = W x + b`.
///
/// The parameter vector holds the `[outputs × inputs]` weights row by row followed by the biases.
#[derive(Clone, Debug)]
pub struct LinearModel {
    weights: Array2<f64>,
    bias: Array1<f64>,
}

impl LinearModel {
    /// Creates a new `LinearModel` with all parameters set to zero.
    pub fn new(inputs: usize, outputs: usize) -> Self {
        Self {
            weights: Array2::zeros((outputs, inputs)),
            bias: Array1::zeros(outputs),
        }
    }

    /// Creates a new `LinearModel` from its weights and biases.
    ///
    /// # Returns
    /// An error if there aren't as many biases as rows in `weights`.
    pub fn from_parts(weights: Array2<f64>, bias: Array1<f64>) -> Result<Self> {
        if weights.nrows() != bias.len() {
            return Err(MlErr::SizeMismatch {
                what: "linear model bias",
                got: bias.len(),
                expected: weights.nrows(),
            });
        }

        Ok(Self { weights, bias })
    }
}

impl Model for LinearModel {
    fn input_size(&self) -> usize {
        self.weights.ncols()
    }

    fn output_size(&self) -> usize {
        self.weights.nrows()
    }

    fn number_of_parameters(&self) -> usize {
        self.weights.len() + self.bias.len()
    }

    fn parameter_vector(&self) -> Array1<f64> {
        self.weights.iter().chain(&self.bias).copied().collect()
    }

    fn set_parameter_vector(&mut self, params: &[f64]) -> Result<()> {
        if params.len() != self.number_of_parameters() {
            return Err(MlErr::SizeMismatch {
                what: "parameter vector",
                got: params.len(),
                expected: self.number_of_parameters(),
            });
        }

        let (w, b) = params.split_at(self.weights.len());
        self.weights
            .iter_mut()
            .zip(w)
            .for_each(|(dst, &src)| *dst = src);
        self.bias.assign(&ArrayView1::from(b));
        Ok(())
    }

    fn eval(&self, batch: ArrayView2<f64>) -> Result<Array2<f64>> {
        if batch.ncols() != self.input_size() {
            return Err(MlErr::SizeMismatch {
                what: "input",
                got: batch.ncols(),
                expected: self.input_size(),
            });
        }

        Ok(batch.dot(&self.weights.t()) + &self.bias)
    }
}

/// A linear classifier, every row is assigned the class with the highest score.
#[derive(Clone, Debug)]
pub struct LinearClassifier {
    scores: LinearModel,
}

impl LinearClassifier {
    pub fn new(scores: LinearModel) -> Self {
        Self { scores }
    }
}

impl Model for LinearClassifier {
    fn input_size(&self) -> usize {
        self.scores.input_size()
    }

    fn output_size(&self) -> usize {
        self.scores.output_size()
    }

    fn number_of_parameters(&self) -> usize {
        self.scores.number_of_parameters()
    }

    fn parameter_vector(&self) -> Array1<f64> {
        self.scores.parameter_vector()
    }

    fn set_parameter_vector(&mut self, params: &[f64]) -> Result<()> {
        self.scores.set_parameter_vector(params)
    }

    fn eval(&self, batch: ArrayView2<f64>) -> Result<Array2<f64>> {
        self.scores.eval(batch)
    }
}

impl Classifier for LinearClassifier {
    fn classify(&self, batch: ArrayView2<f64>) -> Result<Vec<usize>> {
        let scores = self.scores.eval(batch)?;
        Ok(scores.outer_iter().map(arg_max).collect())
    }
}

/// Returns the index of the largest value, the first one on ties.
pub(super) fn arg_max(row: ArrayView1<f64>) -> usize {
    let mut best = 0;

    for (i, &v) in row.iter().enumerate().skip(1) {
        if v > row[best] {
            best = i;
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    fn model() -> LinearModel {
        LinearModel::from_parts(array![[1.0, 2.0], [-1.0, 0.5]], array![0.5, 0.0]).unwrap()
    }

    #[test]
    fn eval_is_affine() {
        let y = model().eval(array![[1.0, 1.0], [0.0, 2.0]].view()).unwrap();
        assert_eq!(y, array![[3.5, -0.5], [4.5, 1.0]]);
    }

    #[test]
    fn parameter_vector_is_weights_then_bias() {
        let mut model = model();
        assert_eq!(model.parameter_vector(), array![1.0, 2.0, -1.0, 0.5, 0.5, 0.0]);

        model
            .set_parameter_vector(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0])
            .unwrap();
        let y = model.eval(array![[1.0, 0.0]].view()).unwrap();
        assert_eq!(y, array![[4.0, 7.0]]);
    }

    #[test]
    fn new_model_starts_at_zero() {
        let model = LinearModel::new(3, 2);

        assert_eq!(model.number_of_parameters(), 3 * 2 + 2);
        assert_eq!(model.parameter_vector(), Array1::<f64>::zeros(8));
        assert_eq!(
            model.eval(array![[1.0, 2.0, 3.0]].view()).unwrap(),
            Array2::<f64>::zeros((1, 2))
        );
    }

    #[test]
    fn input_width_is_checked() {
        let err = model().eval(array![[1.0, 1.0, 1.0]].view()).unwrap_err();
        assert!(matches!(err, MlErr::SizeMismatch { what: "input", .. }));
    }

    #[test]
    fn ties_go_to_the_lowest_class() {
        assert_eq!(arg_max(array![0.1, 0.7, 0.7].view()), 1);
        assert_eq!(arg_max(array![2.0, 2.0].view()), 0);
    }

    #[test]
    fn classifier_picks_highest_score() {
        let classifier = LinearClassifier::new(model());
        let classes = classifier
            .classify(array![[1.0, 1.0], [-4.0, 0.0]].view())
            .unwrap();

        assert_eq!(classes, [0, 1]);
    }
}
