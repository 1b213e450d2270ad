use std::io;

use clap::Parser;

use goup_dash::api::{ApiClient, HttpClient, ScriptedClient};
use goup_dash::config::{Args, DashConfig};
use goup_dash::drivers::console::{ConsoleInputDriver, ConsoleOutputDriver};
use goup_dash::runner::run_dashboard;
use goup_dash::shell::Shell;
use goup_dash::tracing_sub;

fn main() -> io::Result<()> {
    let args = Args::parse();
    let config = DashConfig::load(&args)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err.to_string()))?;
    tracing_sub::init(config.log_file.as_deref())?;

    let client: Box<dyn ApiClient> = if config.demo {
        tracing::info!("running against demo data");
        Box::new(ScriptedClient::demo())
    } else {
        tracing::info!(api = %config.api, "connecting");
        let client = HttpClient::new(config.api.clone(), config.request_timeout)
            .map_err(io::Error::other)?;
        Box::new(client)
    };

    let mut shell = Shell::new(client);
    if let Err(err) = shell.navigate(&config.start) {
        tracing::warn!(path = %config.start, error = %err, "start path not routable");
    }

    let mut output = ConsoleOutputDriver::new()?;
    let result = run_dashboard(
        ConsoleInputDriver::new(),
        &mut output,
        &mut shell,
        config.poll_interval,
    );
    if let Err(err) = &result {
        tracing::warn!(error = %err, "dashboard stopped with an error");
    }
    result
}
