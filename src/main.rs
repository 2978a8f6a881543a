use std::net::TcpListener;

use actix_web::web;
use env_logger::Env;
use racewatch::{configuration::get_configuration, services::RaceChecker, startup::run};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let configuration = get_configuration().expect("Failed to read configuration.");

    let race_checker =
        RaceChecker::from_settings(&configuration).expect("Failed to build race checker.");
    let race_checker = web::Data::new(race_checker);

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(address)?;
    log::info!("Listening on {}", listener.local_addr()?);

    run(listener, race_checker)?.await
}
