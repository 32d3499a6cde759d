use std::f64::consts::PI;

use log::{debug, info};
use machine_learning::{
    arch::{
        Model, OnlineRnn, RecurrentStructure,
        activations::ActFn,
        loss::{LossFn, Mse},
    },
    initialization::{ConstParamGen, ParamGen, RandErr, RandParamGen},
    optimization::{GradientDescent, GradientDescentWithMomentum, Optimizer},
    training::OnlineTrainer,
};
use ndarray::{Array2, s};
use rand::{SeedableRng, rngs::StdRng};

use crate::{
    configs::{
        ActFnConfig, Config, LossFnConfig, NetworkConfig, OptimizerConfig, ParamGenConfig,
        SignalConfig, TrainingConfig,
    },
    error::SessionError,
};

/// What's left once a session finishes.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    /// The mean loss of every epoch.
    pub losses: Vec<f64>,
    /// The trained parameters, in the network's parameter order.
    pub params: Vec<f64>,
}

/// A network ready to be trained on a signal.
pub struct Session {
    model: OnlineRnn,
    xs: Array2<f64>,
    ys: Array2<f64>,
    training: TrainingConfig,
}

impl Session {
    /// Validates the configuration and builds the network, its initial parameters and the signal.
    ///
    /// # Errors
    /// `SessionError::InvalidConfig` if the configuration can't describe a working session.
    pub fn new(config: Config) -> Result<Self, SessionError> {
        config.validate()?;

        let Config { network, training } = config;
        let mut rng = match training.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let mut structure = RecurrentStructure::new(
            network.inputs,
            network.hidden,
            network.outputs,
            act_fn(network.hidden_act_fn),
            act_fn(network.output_act_fn),
        )?;

        let params = initial_params(&network, structure.parameters(), &mut rng)?;
        structure.set_parameter_vector(&params)?;

        let (xs, ys) = signal(&training.signal);

        debug!(
            parameters = structure.parameters(),
            timesteps = xs.nrows();
            "session built"
        );

        Ok(Self {
            model: OnlineRnn::new(structure, true),
            xs,
            ys,
            training,
        })
    }

    /// Trains the network for every configured epoch.
    pub fn run(self) -> Result<TrainingReport, SessionError> {
        let loss_fn = match self.training.loss_fn {
            LossFnConfig::Mse => Mse::new(),
        };

        let optimizer = self.training.optimizer;
        match optimizer {
            OptimizerConfig::GradientDescent { lr } => {
                self.run_with(GradientDescent::new(lr), loss_fn)
            }
            OptimizerConfig::GradientDescentWithMomentum { lr, mu } => {
                let len = self.model.number_of_parameters();
                self.run_with(GradientDescentWithMomentum::new(len, lr, mu), loss_fn)
            }
        }
    }

    fn run_with<O, L>(mut self, optimizer: O, loss_fn: L) -> Result<TrainingReport, SessionError>
    where
        O: Optimizer,
        L: LossFn,
    {
        let epochs = self.training.epochs.get();
        let mut trainer = OnlineTrainer::new(optimizer, loss_fn, self.training.teacher_forcing);

        info!(
            "training {} parameters for {epochs} epoch(s) on {} timesteps",
            self.model.number_of_parameters(),
            self.xs.nrows()
        );

        let losses = trainer.train(&mut self.model, self.xs.view(), self.ys.view(), epochs)?;

        if let (Some(first), Some(last)) = (losses.first(), losses.last()) {
            info!(first_loss = *first, last_loss = *last; "training finished");
        }

        Ok(TrainingReport {
            losses,
            params: self.model.parameter_vector().to_vec(),
        })
    }
}

fn act_fn(config: ActFnConfig) -> ActFn {
    match config {
        ActFnConfig::Sigmoid { amp } => ActFn::sigmoid(amp),
        ActFnConfig::Tanh => ActFn::tanh(),
        ActFnConfig::FastSigmoid => ActFn::fast_sigmoid(),
        ActFnConfig::Linear => ActFn::linear(),
    }
}

fn initial_params(
    network: &NetworkConfig,
    n: usize,
    rng: &mut StdRng,
) -> Result<Vec<f64>, SessionError> {
    let rand_err = |e: RandErr| SessionError::InvalidConfig(format!("parameter initialization: {e}"));

    let mut param_gen: Box<dyn ParamGen + '_> = match network.init {
        ParamGenConfig::Const { value } => Box::new(ConstParamGen::new(value, n)),
        ParamGenConfig::Uniform { low, high } => {
            Box::new(RandParamGen::uniform(rng, n, low, high).map_err(rand_err)?)
        }
        ParamGenConfig::Normal { mean, std_dev } => {
            Box::new(RandParamGen::normal(rng, n, mean, std_dev).map_err(rand_err)?)
        }
    };

    match param_gen.sample(n) {
        Some(params) if params.len() == n => Ok(params),
        _ => Err(SessionError::InvalidConfig(format!(
            "the initializer couldn't generate {n} parameters"
        ))),
    }
}

/// Splits the signal into an input and a target matrix, one timestep per row.
fn signal(config: &SignalConfig) -> (Array2<f64>, Array2<f64>) {
    match config {
        SignalConfig::Sine {
            period,
            amplitude,
            len,
        } => {
            let sample = |t: usize| amplitude * (2. * PI * t as f64 / period).sin();
            let xs = Array2::from_shape_fn((*len, 1), |(t, _)| sample(t));
            let ys = Array2::from_shape_fn((*len, 1), |(t, _)| sample(t + 1));
            (xs, ys)
        }
        SignalConfig::Inline {
            data,
            x_size,
            y_size,
        } => {
            let width = x_size + y_size;
            let rows = data.len() / width;
            let table = Array2::from_shape_fn((rows, width), |(r, c)| data[r * width + c]);

            let xs = table.slice(s![.., ..*x_size]).to_owned();
            let ys = table.slice(s![.., *x_size..]).to_owned();
            (xs, ys)
        }
    }
}
