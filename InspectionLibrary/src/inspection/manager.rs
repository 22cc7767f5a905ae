use std::time::Duration;
use actix_web::{web, App, HttpServer};
use lazy_static::lazy_static;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::time::sleep;
use crate::inspection::file_manager::FileManager;
use crate::inspection::inference_manager::InferenceEngine;
use crate::inspection::model_manager::ModelManager;
use crate::inspection::utils::profile::InspectionProfile;
use crate::utils::config::Config;
use crate::utils::logging::*;
use crate::web::page;

lazy_static! {
    static ref INSPECTION: RwLock<Inspection> = RwLock::new(Inspection::new());
}

pub struct Inspection {
    terminate: bool,
}

impl Inspection {
    fn new() -> Self {
        Self {
            terminate: false,
        }
    }

    pub async fn instance() -> RwLockReadGuard<'static, Self> {
        INSPECTION.read().await
    }

    pub async fn instance_mut() -> RwLockWriteGuard<'static, Self> {
        INSPECTION.write().await
    }

    pub async fn run() {
        let config = Config::now().await;
        FileManager::initialize().await;
        let model_path = match ModelManager::acquire().await {
            Ok(model_path) => model_path,
            Err(err) => {
                logging_emergency!("Inspection", "Unable to acquire the detection model.", err);
                return;
            },
        };
        let engine = web::Data::new(InferenceEngine::new(
            model_path,
            config.confidence_threshold,
            config.overlap_threshold,
            config.inference_timeout,
        ));
        let profile = web::Data::new(InspectionProfile::from_capture_mode(config.capture_mode));
        let http_server = loop {
            if Self::instance().await.terminate {
                return;
            }
            let engine = engine.clone();
            let profile = profile.clone();
            let http_server = HttpServer::new(move || {
                App::new()
                    .app_data(engine.clone())
                    .app_data(profile.clone())
                    .route("/", web::get().to(page::inspection::index_redirect))
                    .service(page::inspection::initialize())
                    .service(page::config::initialize())
                    .service(page::log::initialize())
                    .service(page::javascript::initialize())
                    .service(page::misc::initialize())
            }).bind(format!("127.0.0.1:{}", config.http_server_bind_port));
            match http_server {
                Ok(http_server) => break http_server,
                Err(err) => {
                    logging_error!("Inspection", "Http service bind port failed.", format!("Err: {err}"));
                    sleep(Duration::from_millis(config.internal_timestamp)).await;
                    continue;
                },
            }
        };
        logging_information!("Inspection", "Web service ready.");
        logging_information!("Inspection", "Online.");
        if let Err(err) = http_server.run().await {
            logging_error!("Inspection", "Error while Http service running.", format!("Err: {err}"));
        }
    }

    pub async fn terminate() {
        logging_information!("Inspection", "Terminating.");
        Self::instance_mut().await.terminate = true;
        FileManager::cleanup().await;
        logging_information!("Inspection", "Termination complete.");
    }
}
