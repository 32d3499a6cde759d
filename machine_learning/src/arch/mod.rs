pub mod activations;
mod linear;
pub mod loss;
mod mean;
mod model;
mod online;
mod recurrent;

pub use linear::{LinearClassifier, LinearModel};
pub use mean::MeanModel;
pub use model::{Classifier, Model};
pub use online::{OnlineRnn, SequenceState};
pub use recurrent::RecurrentStructure;
