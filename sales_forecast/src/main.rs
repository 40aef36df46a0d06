use clap::Parser;
use sales_forecast::{Cli, ForecastRunner};
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stdout)
        .init();

    let args = Cli::parse();
    log::debug!("Parsed arguments: {:?}", args);

    let result = args
        .into_config()
        .and_then(ForecastRunner::new)
        .and_then(|runner| runner.run());

    match result {
        Ok(outcome) => {
            println!("{outcome}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("Forecast run failed: {err}");
            ExitCode::FAILURE
        }
    }
}
