mod act_fn;
mod fast_sigmoid;
mod sigmoid;
mod tanh;

pub use act_fn::ActFn;
pub use fast_sigmoid::FastSigmoid;
pub use sigmoid::Sigmoid;
pub use tanh::Tanh;
