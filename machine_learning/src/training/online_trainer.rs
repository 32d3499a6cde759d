use log::info;
use ndarray::{ArrayView2, Axis, s};

use crate::{
    MlErr, Result,
    arch::{Model, OnlineRnn, loss::LossFn},
    optimization::Optimizer,
};

/// Trains an `OnlineRnn` while it runs through a sequence, updating the parameters after every
/// timestep with the gradient tracked in the sequence state.
pub struct OnlineTrainer<O, L>
where
    O: Optimizer,
    L: LossFn,
{
    optimizer: O,
    loss_fn: L,
    teacher_forcing: bool,
}

impl<O, L> OnlineTrainer<O, L>
where
    O: Optimizer,
    L: LossFn,
{
    /// Returns a new `OnlineTrainer`.
    ///
    /// # Arguments
    /// * `optimizer` - Updates the parameters after every timestep.
    /// * `loss_fn` - Measures the difference between the network's output and the target.
    /// * `teacher_forcing` - Whether the network sees the target instead of its own output on
    ///   the next timestep.
    pub fn new(optimizer: O, loss_fn: L, teacher_forcing: bool) -> Self {
        Self {
            optimizer,
            loss_fn,
            teacher_forcing,
        }
    }

    /// Runs `epochs` passes over the same sequence, each one with a fresh state.
    ///
    /// # Returns
    /// The mean loss of every epoch.
    pub fn train(
        &mut self,
        model: &mut OnlineRnn,
        xs: ArrayView2<f64>,
        ys: ArrayView2<f64>,
        epochs: usize,
    ) -> Result<Vec<f64>> {
        let mut losses = Vec::with_capacity(epochs);

        for epoch in 0..epochs {
            let loss = self.train_sequence(model, xs, ys)?;
            info!(epoch = epoch, loss = loss; "finished epoch");
            losses.push(loss);
        }

        Ok(losses)
    }

    /// Feeds a sequence to the model, one timestep per row, taking an optimizer step after
    /// each of them.
    ///
    /// # Arguments
    /// * `model` - A model with gradient tracking enabled.
    /// * `xs` - The inputs, a `[timesteps × inputs]` matrix.
    /// * `ys` - The targets, a `[timesteps × outputs]` matrix.
    ///
    /// # Returns
    /// The mean loss over the sequence.
    pub fn train_sequence(
        &mut self,
        model: &mut OnlineRnn,
        xs: ArrayView2<f64>,
        ys: ArrayView2<f64>,
    ) -> Result<f64> {
        if !model.computes_gradient() {
            return Err(MlErr::GradientDisabled);
        }

        if ys.nrows() != xs.nrows() {
            return Err(MlErr::SizeMismatch {
                what: "targets",
                got: ys.nrows(),
                expected: xs.nrows(),
            });
        }

        if ys.ncols() != model.output_size() {
            return Err(MlErr::SizeMismatch {
                what: "target",
                got: ys.ncols(),
                expected: model.output_size(),
            });
        }

        let mut state = model.create_state();
        let mut total_loss = 0.;

        for (t, y) in ys.outer_iter().enumerate() {
            let pattern = xs.slice(s![t..t + 1, ..]);
            let output = model.eval(pattern, &mut state)?;
            let y_pred = output.index_axis(Axis(0), 0);

            total_loss += self.loss_fn.loss(y_pred, y);

            let coefficients = self.loss_fn.loss_prime(y_pred, y).insert_axis(Axis(0));
            let grad = model.weighted_parameter_derivative(pattern, coefficients.view(), &state)?;

            let mut params = model.parameter_vector().to_vec();
            self.optimizer.update_params(&mut params, &grad.to_vec())?;
            model.set_parameter_vector(&params)?;

            if self.teacher_forcing {
                model.set_output_activation(&mut state, y)?;
            }
        }

        let timesteps = xs.nrows().max(1);
        Ok(total_loss / timesteps as f64)
    }
}

#[cfg(test)]
mod tests {
    use ndarray::{Array2, array};
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::{
        ErrorKind,
        arch::{RecurrentStructure, activations::ActFn, loss::Mse},
        initialization::{ParamGen, RandParamGen},
        optimization::GradientDescent,
    };

    fn rnn(compute_gradient: bool) -> OnlineRnn {
        let mut structure =
            RecurrentStructure::new(1, 4, 1, ActFn::tanh(), ActFn::linear()).unwrap();

        let n = structure.parameters();
        let mut param_gen = RandParamGen::uniform(StdRng::seed_from_u64(7), n, -0.3, 0.3).unwrap();
        let params = param_gen.sample(n).unwrap();
        structure.set_parameter_vector(&params).unwrap();

        OnlineRnn::new(structure, compute_gradient)
    }

    /// Inputs are `s_t` and targets `s_{t+1}` of a sine wave.
    fn sine(len: usize) -> (Array2<f64>, Array2<f64>) {
        let signal = |t: usize| 0.8 * (2. * std::f64::consts::PI * t as f64 / 16.).sin();
        let xs = Array2::from_shape_fn((len, 1), |(t, _)| signal(t));
        let ys = Array2::from_shape_fn((len, 1), |(t, _)| signal(t + 1));
        (xs, ys)
    }

    #[test]
    fn loss_decreases_on_a_sine_wave() {
        let mut model = rnn(true);
        let (xs, ys) = sine(64);
        let mut trainer = OnlineTrainer::new(GradientDescent::new(0.02), Mse, false);

        let losses = trainer.train(&mut model, xs.view(), ys.view(), 20).unwrap();

        assert_eq!(losses.len(), 20);
        assert!(losses.iter().all(|l| l.is_finite()));
        assert!(losses[19] < losses[0]);
    }

    #[test]
    fn teacher_forcing_trains_too() {
        let mut model = rnn(true);
        let (xs, ys) = sine(64);
        let mut trainer = OnlineTrainer::new(GradientDescent::new(0.02), Mse, true);

        let losses = trainer.train(&mut model, xs.view(), ys.view(), 20).unwrap();
        assert!(losses[19] < losses[0]);
    }

    #[test]
    fn parameters_change_every_sequence() {
        let mut model = rnn(true);
        let before = model.parameter_vector();
        let mut trainer = OnlineTrainer::new(GradientDescent::new(0.1), Mse, false);

        trainer
            .train_sequence(&mut model, array![[0.5], [0.1]].view(), array![[1.0], [-1.0]].view())
            .unwrap();

        assert_ne!(model.parameter_vector(), before);
    }

    #[test]
    fn needs_gradient_tracking() {
        let mut model = rnn(false);
        let mut trainer = OnlineTrainer::new(GradientDescent::new(0.1), Mse, false);

        let err = trainer
            .train_sequence(&mut model, array![[0.5]].view(), array![[1.0]].view())
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ConfigurationMismatch);
    }

    #[test]
    fn targets_must_match_inputs() {
        let mut model = rnn(true);
        let before = model.parameter_vector();
        let mut trainer = OnlineTrainer::new(GradientDescent::new(0.1), Mse, false);

        let err = trainer
            .train_sequence(&mut model, array![[0.5], [0.2]].view(), array![[1.0]].view())
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::DimensionMismatch);
        assert_eq!(model.parameter_vector(), before);
    }
}
