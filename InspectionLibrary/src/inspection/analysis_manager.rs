use std::path::{Path, PathBuf};
use uuid::Uuid;
use crate::inspection::file_manager::FileManager;
use crate::inspection::inference_manager::InferenceEngine;
use crate::inspection::utils::analysis_report::AnalysisReport;
use crate::inspection::utils::profile::{AnalysisError, InspectionProfile};
use crate::utils::logging::*;

pub struct SessionOutcome {
    pub session: Uuid,
    pub report: AnalysisReport,
    pub annotated_filenames: Vec<String>,
}

///Runs one stateless analysis session: detect per image, reduce to a report,
///annotate the captures. Sessions never share state, so concurrent requests
///need no coordination.
pub struct AnalysisManager;

impl AnalysisManager {
    pub async fn run_session(
        engine: &InferenceEngine,
        profile: &InspectionProfile,
        session: Uuid,
        image_paths: &[PathBuf],
    ) -> Result<SessionOutcome, AnalysisError> {
        let required = profile.required_images();
        if image_paths.len() != required {
            //Guarded here as well so no inference is paid for a doomed session.
            return Err(AnalysisError::ImageCountMismatch { required, supplied: image_paths.len() });
        }
        let mut detections_per_image = Vec::with_capacity(image_paths.len());
        for image_path in image_paths {
            let detections = engine.detect(image_path).await?;
            logging_debug!("Analysis Manager", format!("{count} detections in {path}.", count = detections.len(), path = image_path.display()));
            detections_per_image.push(detections);
        }
        let report = profile.analyze(&detections_per_image)?;
        let mut annotated_filenames = Vec::with_capacity(image_paths.len());
        for (image_path, detections) in image_paths.iter().zip(&detections_per_image) {
            let file_name = image_path.file_name().and_then(|name| name.to_str())
                .ok_or_else(|| AnalysisError::Annotation("Invalid capture filename.".to_string()))?;
            let output_path = Path::new(".").join("Result").join(file_name);
            FileManager::annotate_image(image_path, detections, &output_path).await
                .map_err(AnalysisError::Annotation)?;
            annotated_filenames.push(file_name.to_string());
        }
        logging_information!("Analysis Manager", format!("Session {session} analyzed."));
        Ok(SessionOutcome {
            session,
            report,
            annotated_filenames,
        })
    }

    ///The user-visible reset: forget everything about one session.
    pub async fn discard_session(session: Uuid) {
        let prefix = format!("{session}_");
        for folder in ["SavedFile", "Result"] {
            let mut entries = match tokio::fs::read_dir(folder).await {
                Ok(entries) => entries,
                Err(_) => continue,
            };
            while let Ok(Some(entry)) = entries.next_entry().await {
                let file_name = entry.file_name();
                let Some(file_name) = file_name.to_str() else { continue };
                if file_name.starts_with(&prefix) {
                    if let Err(err) = tokio::fs::remove_file(entry.path()).await {
                        logging_warning!("Analysis Manager", format!("Cannot remove session file {file_name}."), format!("Err: {err}"));
                    }
                }
            }
        }
        logging_information!("Analysis Manager", format!("Session {session} discarded."));
    }
}
