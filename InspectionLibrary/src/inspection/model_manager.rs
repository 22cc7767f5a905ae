use std::path::{Path, PathBuf};
use tokio::fs;
use crate::utils::config::Config;
use crate::utils::logging::*;

///Acquires the detection model artifact at startup so a missing or corrupt
///download fails the process before the server binds, never on first request.
pub struct ModelManager;

impl ModelManager {
    pub async fn acquire() -> Result<PathBuf, String> {
        let config = Config::now().await;
        let model_path = Path::new(".").join("SavedModel").join(&config.model_filename);
        if fs::try_exists(&model_path).await.unwrap_or(false) {
            logging_information!("Model Manager", format!("Detection model found at {path}.", path = model_path.display()));
            return Ok(model_path);
        }
        let url = match &config.model_download_url {
            Some(url) if !url.is_empty() => url.clone(),
            _ => {
                let path = model_path.display();
                return Err(format!("Model file {path} is missing and no download url is configured."));
            },
        };
        logging_information!("Model Manager", format!("Downloading detection model from {url}."));
        let response = reqwest::get(&url).await
            .map_err(|err| format!("Model download failed.\nReason: {err}"))?;
        if !response.status().is_success() {
            return Err(format!("Model download failed with status {status}.", status = response.status()));
        }
        let bytes = response.bytes().await
            .map_err(|err| format!("Model download was interrupted.\nReason: {err}"))?;
        fs::write(&model_path, &bytes).await
            .map_err(|err| format!("Unable to write model file {path}.\nReason: {err}", path = model_path.display()))?;
        logging_information!("Model Manager", format!("Detection model saved to {path}.", path = model_path.display()));
        Ok(model_path)
    }
}
