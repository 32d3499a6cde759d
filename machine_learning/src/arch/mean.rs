use ndarray::{Array1, Array2, ArrayView2};

use super::{Classifier, Model, linear::arg_max};
use crate::{MlErr, Result};

/// Computes the weighted mean of a set of models.
///
/// For continuous outputs the result is the weighted average of the members' outputs. For
/// classifiers every member votes for a class with its weight and the class with the most
/// weight wins, ties going to the lowest class index.
#[derive(Clone, Debug)]
pub struct MeanModel<M> {
    models: Vec<M>,
    weights: Vec<f64>,
    weight_sum: f64,
}

impl<M> Default for MeanModel<M> {
    fn default() -> Self {
        Self {
            models: Vec::new(),
            weights: Vec::new(),
            weight_sum: 0.,
        }
    }
}

impl<M> MeanModel<M> {
    /// Creates a new empty `MeanModel`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes all models from the ensemble.
    pub fn clear_models(&mut self) {
        self.models.clear();
        self.weights.clear();
        self.weight_sum = 0.;
    }

    /// Adds a new model to the ensemble.
    ///
    /// # Arguments
    /// * `model` - The new model.
    /// * `weight` - The weight of the model, must be positive.
    pub fn add_model(&mut self, model: M, weight: f64) -> Result<()> {
        check_weight(weight)?;

        self.models.push(model);
        self.weights.push(weight);
        self.weight_sum += weight;
        Ok(())
    }

    pub fn model(&self, index: usize) -> Option<&M> {
        self.models.get(index)
    }

    pub fn weight(&self, index: usize) -> Option<f64> {
        self.weights.get(index).copied()
    }

    /// Changes the weight of the `index`-th model, the new weight must be positive.
    pub fn set_weight(&mut self, index: usize, weight: f64) -> Result<()> {
        check_weight(weight)?;

        let len = self.weights.len();
        let old = self
            .weights
            .get_mut(index)
            .ok_or(MlErr::IndexOutOfBounds {
                what: "ensemble",
                index,
                len,
            })?;

        self.weight_sum += weight - *old;
        *old = weight;
        Ok(())
    }

    pub fn number_of_models(&self) -> usize {
        self.models.len()
    }

    pub fn weight_sum(&self) -> f64 {
        self.weight_sum
    }
}

fn check_weight(weight: f64) -> Result<()> {
    if weight.is_nan() || weight <= 0. {
        return Err(MlErr::InvalidWeight { weight });
    }

    Ok(())
}

impl<M: Model> Model for MeanModel<M> {
    fn input_size(&self) -> usize {
        self.models.first().map_or(0, |m| m.input_size())
    }

    fn output_size(&self) -> usize {
        self.models.first().map_or(0, |m| m.output_size())
    }

    /// The ensemble itself has no parameters.
    fn number_of_parameters(&self) -> usize {
        0
    }

    fn parameter_vector(&self) -> Array1<f64> {
        Array1::zeros(0)
    }

    fn set_parameter_vector(&mut self, params: &[f64]) -> Result<()> {
        if !params.is_empty() {
            return Err(MlErr::SizeMismatch {
                what: "ensemble parameters",
                got: params.len(),
                expected: 0,
            });
        }

        Ok(())
    }

    fn eval(&self, batch: ArrayView2<f64>) -> Result<Array2<f64>> {
        let (first, rest) = self.models.split_first().ok_or(MlErr::EmptyEnsemble)?;

        let mut outputs = first.eval(batch)? * self.weights[0];

        for (model, &weight) in rest.iter().zip(&self.weights[1..]) {
            let y = model.eval(batch)?;

            if y.dim() != outputs.dim() {
                return Err(MlErr::SizeMismatch {
                    what: "ensemble member output",
                    got: y.len(),
                    expected: outputs.len(),
                });
            }

            outputs.scaled_add(weight, &y);
        }

        outputs /= self.weight_sum;
        Ok(outputs)
    }
}

impl<M: Classifier> Classifier for MeanModel<M> {
    fn classify(&self, batch: ArrayView2<f64>) -> Result<Vec<usize>> {
        if self.models.is_empty() {
            return Err(MlErr::EmptyEnsemble);
        }

        let rows = batch.nrows();
        let mut responses = Vec::with_capacity(self.models.len());
        let mut classes = 0;

        for model in &self.models {
            let response = model.classify(batch)?;

            if response.len() != rows {
                return Err(MlErr::SizeMismatch {
                    what: "ensemble member classes",
                    got: response.len(),
                    expected: rows,
                });
            }

            classes = response.iter().fold(classes, |acc, &c| acc.max(c + 1));
            responses.push(response);
        }

        let mut votes = Array2::<f64>::zeros((rows, classes));
        for (response, &weight) in responses.iter().zip(&self.weights) {
            for (p, &class) in response.iter().enumerate() {
                votes[[p, class]] += weight;
            }
        }

        Ok(votes.outer_iter().map(arg_max).collect())
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;
    use crate::{
        ErrorKind,
        arch::{LinearClassifier, LinearModel},
    };

    fn constant(value: f64) -> LinearModel {
        LinearModel::from_parts(array![[0.0]], array![value]).unwrap()
    }

    /// Votes for `class` out of `classes` whatever the input.
    fn voter(class: usize, classes: usize) -> LinearClassifier {
        let mut bias = Array1::zeros(classes);
        bias[class] = 1.;
        LinearClassifier::new(LinearModel::from_parts(Array2::zeros((classes, 1)), bias).unwrap())
    }

    #[test]
    fn eval_is_the_weighted_average() {
        let mut mean = MeanModel::new();
        mean.add_model(constant(1.0), 1.0).unwrap();
        mean.add_model(constant(4.0), 2.0).unwrap();

        let y = mean.eval(array![[0.0], [1.0]].view()).unwrap();
        assert_eq!(y, array![[3.0], [3.0]]);
    }

    #[test]
    fn empty_ensemble_fails() {
        let mean = MeanModel::<LinearModel>::new();
        let err = mean.eval(array![[0.0]].view()).unwrap_err();

        assert_eq!(err, MlErr::EmptyEnsemble);
    }

    #[test]
    fn weights_must_be_positive() {
        let mut mean = MeanModel::new();

        let err = mean.add_model(constant(1.0), 0.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(mean.add_model(constant(1.0), f64::NAN).is_err());
        assert_eq!(mean.number_of_models(), 0);
    }

    #[test]
    fn set_weight_updates_the_sum_by_the_difference() {
        let mut mean = MeanModel::new();
        mean.add_model(constant(1.0), 1.0).unwrap();
        mean.add_model(constant(4.0), 2.0).unwrap();
        mean.add_model(constant(7.0), 3.0).unwrap();

        mean.set_weight(1, 5.0).unwrap();

        assert_eq!(mean.weight(1), Some(5.0));
        assert_eq!(mean.weight(9), None);
        assert_eq!(mean.weight_sum(), 9.0);

        let y = mean.eval(array![[0.0]].view()).unwrap();
        assert_eq!(y, array![[(1.0 + 20.0 + 21.0) / 9.0]]);
    }

    #[test]
    fn set_weight_out_of_bounds() {
        let mut mean = MeanModel::new();
        mean.add_model(constant(1.0), 1.0).unwrap();

        let err = mean.set_weight(3, 1.0).unwrap_err();
        assert!(matches!(err, MlErr::IndexOutOfBounds { index: 3, .. }));
    }

    #[test]
    fn members_are_kept_in_order() {
        let mut mean = MeanModel::new();
        mean.add_model(constant(1.0), 1.0).unwrap();
        mean.add_model(constant(4.0), 2.0).unwrap();

        let second = mean.model(1).unwrap();
        assert_eq!(second.parameter_vector(), array![0.0, 4.0]);
        assert!(mean.model(0).is_some());
        assert!(mean.model(9).is_none());
    }

    #[test]
    fn clear_resets_the_sum() {
        let mut mean = MeanModel::new();
        mean.add_model(constant(1.0), 1.5).unwrap();
        mean.clear_models();

        assert_eq!(mean.number_of_models(), 0);
        assert_eq!(mean.weight_sum(), 0.0);
    }

    #[test]
    fn ensemble_has_no_parameters() {
        let mut mean = MeanModel::new();
        mean.add_model(constant(1.0), 1.0).unwrap();

        assert_eq!(mean.number_of_parameters(), 0);
        assert!(mean.set_parameter_vector(&[]).is_ok());
        assert!(mean.set_parameter_vector(&[1.0]).is_err());
    }

    #[test]
    fn voting_follows_the_weights() {
        let mut mean = MeanModel::new();
        mean.add_model(voter(0, 3), 1.0).unwrap();
        mean.add_model(voter(2, 3), 1.5).unwrap();
        mean.add_model(voter(0, 3), 1.0).unwrap();

        let classes = mean.classify(array![[0.0], [1.0]].view()).unwrap();
        assert_eq!(classes, [0, 0]);

        mean.set_weight(1, 2.5).unwrap();
        let classes = mean.classify(array![[0.0]].view()).unwrap();
        assert_eq!(classes, [2]);
    }

    #[test]
    fn voting_ties_favor_the_lowest_class() {
        let mut mean = MeanModel::new();
        mean.add_model(voter(2, 3), 1.0).unwrap();
        mean.add_model(voter(1, 3), 1.0).unwrap();

        let classes = mean.classify(array![[0.0]].view()).unwrap();
        assert_eq!(classes, [1]);
    }
}
