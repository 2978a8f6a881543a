use std::net::TcpListener;

use actix_web::{dev::Server, middleware::Logger, web::Data, App, HttpServer};

use crate::{
    routes::{default_route, notify_route},
    services::RaceChecker,
};

pub fn run(
    listener: TcpListener,
    race_checker: Data<RaceChecker>,
) -> Result<Server, std::io::Error> {
    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .service(default_route::default)
            .service(notify_route::notify)
            .app_data(race_checker.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
