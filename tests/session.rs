use online_rnn::{
    SessionError,
    configs::{Config, OptimizerConfig, SignalConfig},
    train,
};

#[test]
fn sine_session_reduces_the_loss() {
    let report = train(Config::default()).unwrap();

    assert_eq!(report.losses.len(), 20);
    assert!(report.losses.iter().all(|l| l.is_finite()));
    assert!(report.losses[19] < report.losses[0]);
}

#[test]
fn same_seed_same_training() {
    let a = train(Config::default()).unwrap();
    let b = train(Config::default()).unwrap();

    assert_eq!(a.losses, b.losses);
    assert_eq!(a.params, b.params);
}

#[test]
fn sample_config_file_loads() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/configs/sine.json");
    let config = Config::load(path).unwrap();

    assert_eq!(config, Config::default());
}

#[test]
fn missing_config_file() {
    let err = Config::load("does/not/exist.json").unwrap_err();
    assert!(matches!(err, SessionError::Io(_)));
}

#[test]
fn momentum_with_teacher_forcing() {
    let mut config = Config::default();
    config.training.optimizer =
        OptimizerConfig::GradientDescentWithMomentum { lr: 0.005, mu: 0.5 };
    config.training.teacher_forcing = true;

    let report = train(config).unwrap();
    assert!(report.losses[19] < report.losses[0]);
}

#[test]
fn inline_signal() {
    let mut config = Config::default();
    config.training.signal = SignalConfig::Inline {
        data: vec![0.0, 0.5, 0.5, 1.0, 1.0, 0.5, 0.5, 0.0],
        x_size: 1,
        y_size: 1,
    };

    let report = train(config).unwrap();

    assert_eq!(report.losses.len(), 20);
    assert_eq!(report.params.len(), 5 * 7);
}

#[test]
fn invalid_config_is_rejected_before_training() {
    let mut config = Config::default();
    config.network.hidden_act_fn = online_rnn::configs::ActFnConfig::Sigmoid { amp: -1.0 };

    let err = train(config).unwrap_err();
    assert!(matches!(err, SessionError::InvalidConfig(_)));
}
