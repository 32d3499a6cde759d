mod online_trainer;

pub use online_trainer::OnlineTrainer;
