use std::env;

use anyhow::Context;
use online_rnn::{configs::Config, train};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = match env::args().nth(1) {
        Some(path) => Config::load(&path).with_context(|| format!("loading {path}"))?,
        None => {
            log::info!("no config given, using the default sine session");
            Config::default()
        }
    };

    let report = train(config)?;

    if let (Some(first), Some(last)) = (report.losses.first(), report.losses.last()) {
        println!("loss: {first:.6} -> {last:.6}");
    }
    println!("params: {:?}", report.params);

    Ok(())
}
