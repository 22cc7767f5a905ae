use std::path::{Path, PathBuf};
use actix_files::NamedFile;
use actix_multipart::{Field, Multipart};
use actix_web::{get, post, web, HttpRequest, HttpResponse, Responder, Scope};
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use futures::{StreamExt, TryStreamExt};
use sanitize_filename::sanitize;
use serde::Serialize;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;
use crate::inspection::analysis_manager::AnalysisManager;
use crate::inspection::inference_manager::InferenceEngine;
use crate::inspection::utils::analysis_report::AnalysisReport;
use crate::inspection::utils::profile::{AnalysisError, InspectionProfile};
use crate::utils::logging::*;
use crate::utils::static_files::StaticFiles;
use crate::web::utils::response::OperationStatus;

pub fn initialize() -> Scope {
    web::scope("/inspection")
        .service(page)
        .service(submit)
        .service(annotated_image)
        .service(discard)
}

pub async fn index_redirect() -> impl Responder {
    HttpResponse::Found()
        .insert_header(("Location", "/inspection"))
        .finish()
}

#[get("")]
async fn page() -> impl Responder {
    let html = StaticFiles::get("html/inspection.html").expect("File not found in static files.").data;
    HttpResponse::Ok().content_type("text/html").body(html.into_owned())
}

#[derive(Serialize)]
struct SubmitResponse {
    session: Uuid,
    report: AnalysisReport,
    annotated: Vec<String>,
}

#[post("/submit")]
async fn submit(mut payload: Multipart, engine: web::Data<InferenceEngine>, profile: web::Data<InspectionProfile>) -> impl Responder {
    let session = Uuid::new_v4();
    let mut image_paths = Vec::new();
    while let Ok(Some(mut field)) = payload.try_next().await {
        let content_disposition = field.content_disposition();
        let (field_name, file_name) = match (content_disposition.get_name(), content_disposition.get_filename()) {
            (Some(field_name), Some(file_name)) => (field_name.to_string(), sanitize(file_name)),
            _ => return HttpResponse::BadRequest().json(OperationStatus::new(false, Some("Invalid payload.".to_string()))),
        };
        if field_name != "captureFile" {
            return HttpResponse::BadRequest().json(OperationStatus::new(false, Some("Invalid payload.".to_string())));
        }
        if file_name.is_empty() {
            return HttpResponse::BadRequest().json(OperationStatus::new(false, Some("Invalid filename.".to_string())));
        }
        //Index keeps two same-named captures in one session from colliding.
        let file_name = format!("{session}_{index}_{file_name}", index = image_paths.len());
        let file_extension = Path::new(&file_name).extension().and_then(|os_str| os_str.to_str()).unwrap_or("");
        if !matches!(file_extension, "png" | "jpg" | "jpeg") {
            return HttpResponse::BadRequest().json(OperationStatus::new(false, Some("Invalid file type or extension.".to_string())));
        }
        let file_path = Path::new(".").join("SavedFile").join(&file_name);
        if create_file(&file_path, &mut field).await.is_err() {
            return HttpResponse::InternalServerError().json(OperationStatus::new(false, None));
        }
        image_paths.push(file_path);
    }
    match AnalysisManager::run_session(&engine, &profile, session, &image_paths).await {
        Ok(outcome) => HttpResponse::Ok().json(SubmitResponse {
            session,
            report: outcome.report,
            annotated: outcome.annotated_filenames,
        }),
        Err(err @ AnalysisError::ImageCountMismatch { .. }) => {
            AnalysisManager::discard_session(session).await;
            HttpResponse::BadRequest().json(OperationStatus::new(false, Some(err.to_string())))
        },
        Err(err) => {
            logging_error!("Inspection Page", format!("Session {session} failed."), err.to_string());
            AnalysisManager::discard_session(session).await;
            HttpResponse::InternalServerError().json(OperationStatus::new(false, Some(err.to_string())))
        },
    }
}

#[get("/image/{filename}")]
async fn annotated_image(req: HttpRequest, filename: web::Path<String>) -> impl Responder {
    let file_name = sanitize(filename.into_inner());
    let file_path = Path::new(".").join("Result").join(&file_name);
    match NamedFile::open_async(&file_path).await {
        Ok(named_file) => {
            let content_disposition = ContentDisposition {
                disposition: DispositionType::Inline,
                parameters: vec![DispositionParam::Filename(file_name.clone())],
            };
            named_file
                .set_content_disposition(content_disposition)
                .set_content_type(mime_guess::from_path(&file_path).first_or_octet_stream())
                .into_response(&req)
        },
        Err(_) => HttpResponse::NotFound().finish(),
    }
}

#[post("/discard/{session}")]
async fn discard(session: web::Path<Uuid>) -> impl Responder {
    AnalysisManager::discard_session(session.into_inner()).await;
    HttpResponse::Ok().json(OperationStatus::new(true, None))
}

async fn create_file(file_path: &PathBuf, field: &mut Field) -> Result<(), ()> {
    let mut file = File::create(&file_path).await.map_err(|_| ())?;
    while let Some(chunk) = field.next().await {
        let data = chunk.map_err(|_| ())?;
        file.write_all(&data).await.map_err(|_| ())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};

    fn test_app_data() -> (web::Data<InferenceEngine>, web::Data<InspectionProfile>) {
        let engine = web::Data::new(InferenceEngine::new(PathBuf::from("model.pt"), 0.25, 0.5, 120));
        let profile = web::Data::new(InspectionProfile::dual_capture());
        (engine, profile)
    }

    #[actix_rt::test]
    async fn page_is_embedded() {
        let (engine, profile) = test_app_data();
        let app = test::init_service(
            App::new().app_data(engine).app_data(profile).service(initialize()),
        ).await;
        let request = test::TestRequest::get().uri("/inspection").to_request();
        let response = test::call_service(&app, request).await;
        assert!(response.status().is_success());
    }

    #[actix_rt::test]
    async fn submit_without_images_reports_cardinality_not_a_verdict() {
        let (engine, profile) = test_app_data();
        let app = test::init_service(
            App::new().app_data(engine).app_data(profile).service(initialize()),
        ).await;
        let request = test::TestRequest::post()
            .uri("/inspection/submit")
            .insert_header(("content-type", "multipart/form-data; boundary=edge"))
            .set_payload("--edge--\r\n")
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), actix_web::http::StatusCode::BAD_REQUEST);
        let status: OperationStatus = test::read_body_json(response).await;
        assert!(!status.success);
        assert!(status.message.unwrap().contains("capture 2 images"));
    }

    #[actix_rt::test]
    async fn submit_rejects_unknown_extensions() {
        let (engine, profile) = test_app_data();
        let app = test::init_service(
            App::new().app_data(engine).app_data(profile).service(initialize()),
        ).await;
        let body = concat!(
            "--edge\r\n",
            "Content-Disposition: form-data; name=\"captureFile\"; filename=\"surface.gif\"\r\n",
            "Content-Type: image/gif\r\n",
            "\r\n",
            "GIF89a\r\n",
            "--edge--\r\n",
        );
        let request = test::TestRequest::post()
            .uri("/inspection/submit")
            .insert_header(("content-type", "multipart/form-data; boundary=edge"))
            .set_payload(body)
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), actix_web::http::StatusCode::BAD_REQUEST);
        let status: OperationStatus = test::read_body_json(response).await;
        assert!(status.message.unwrap().contains("Invalid file type"));
    }
}
