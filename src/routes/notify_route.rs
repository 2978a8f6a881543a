use actix_web::{get, web, HttpResponse};

use crate::services::RaceChecker;

#[get("/notify")]
async fn notify(race_checker: web::Data<RaceChecker>) -> HttpResponse {
    let outcome = race_checker.check_and_notify().await;
    log::info!("Race check finished: {:?}", outcome);

    HttpResponse::Ok().body("Notified")
}
