/// The logistic function scaled by an amplitude, `amp / (1 + e^-z)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Sigmoid {
    amp: f64,
}

impl Default for Sigmoid {
    fn default() -> Self {
        Self { amp: 1.0 }
    }
}

impl Sigmoid {
    pub fn new(amp: f64) -> Self {
        Self { amp }
    }

    pub fn f(&self, z: f64) -> f64 {
        self.amp / (1. + (-z).exp())
    }

    pub fn df(&self, z: f64) -> f64 {
        let s = 1. / (1. + (-z).exp());
        self.amp * s * (1. - s)
    }
}
