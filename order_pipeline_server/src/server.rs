use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use order_pipeline_engine::{
    db_types::{ItemWorkUnit, NewOrder},
    queue::MemoryQueue,
    IntakeApi,
    SqliteDatabase,
};

use crate::{
    auth::TokenVerifier,
    config::ServerConfig,
    errors::ServerError,
    routes::{customer_orders, health, submit_order},
    workers::{start_order_expander, start_stock_updater},
};

/// Brings the whole pipeline up: database, queues, the two workers, and the HTTP server, then runs the server to
/// completion. The workers are detached tasks; they die with the process.
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    if config.auto_migrate {
        db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    }
    let intake_queue = MemoryQueue::<NewOrder>::new("order-intake", config.delivery.visibility_timeout);
    let item_queue = MemoryQueue::<ItemWorkUnit>::new("item-processing", config.delivery.visibility_timeout);
    let policy = config.delivery.batch_policy();
    let _expander = start_order_expander(db.clone(), intake_queue.clone(), item_queue.clone(), policy);
    let _updater = start_stock_updater(db.clone(), item_queue, policy);
    let srv = create_server_instance(config, db, intake_queue)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    intake_queue: MemoryQueue<NewOrder>,
) -> Result<Server, ServerError> {
    let srv = HttpServer::new(move || {
        let intake_api = IntakeApi::new(intake_queue.clone());
        let verifier = TokenVerifier::new(&config.auth);
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("omp::access_log"))
            .app_data(web::Data::new(intake_api))
            .app_data(web::Data::new(verifier))
            .app_data(web::Data::new(db.clone()))
            .service(health)
            .service(
                web::resource("/orders")
                    .route(web::post().to(submit_order::<MemoryQueue<NewOrder>>))
                    .route(web::get().to(customer_orders::<SqliteDatabase>)),
            )
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
