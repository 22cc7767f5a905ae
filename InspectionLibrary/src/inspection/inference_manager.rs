use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command as AsyncCommand;
use tokio::time::timeout;
use crate::inspection::utils::bounding_box::BoundingBox;

///A failed detection is never an empty detection list; conflating the two
///would let a broken model pass a dirty surface as clean.
#[derive(Debug)]
pub enum InferenceError {
    ProcessSpawn(String),
    ProcessFailure { code: Option<i32>, stderr: String },
    Timeout { seconds: u64 },
    InvalidOutput(String),
}

impl Display for InferenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InferenceError::ProcessSpawn(err) => write!(f, "Unable to start the inference process. Reason: {err}"),
            InferenceError::ProcessFailure { code, stderr } => {
                let code = code.unwrap_or(-1);
                write!(f, "Inference process exited with code {code}. {stderr}")
            },
            InferenceError::Timeout { seconds } => write!(f, "Inference process did not finish within {seconds} seconds."),
            InferenceError::InvalidOutput(err) => write!(f, "Inference process produced unreadable output. Reason: {err}"),
        }
    }
}

///Wraps the Ultralytics helper script as an opaque detection service. The
///confidence and overlap filtering happens inside the script, so every
///detection returned here is already accepted.
#[derive(Debug, Clone)]
pub struct InferenceEngine {
    model_path: PathBuf,
    confidence_threshold: f64,
    overlap_threshold: f64,
    inference_timeout: u64,
}

impl InferenceEngine {
    pub fn new(model_path: PathBuf, confidence_threshold: f64, overlap_threshold: f64, inference_timeout: u64) -> Self {
        Self {
            model_path,
            confidence_threshold,
            overlap_threshold,
            inference_timeout,
        }
    }

    pub async fn detect(&self, image_path: &Path) -> Result<Vec<BoundingBox>, InferenceError> {
        #[cfg(target_os = "windows")]
        let python = "python";
        #[cfg(not(target_os = "windows"))]
        let python = "python3";
        let process = AsyncCommand::new(python)
            .arg("Script/ultralytics/image_inference.py")
            .arg(&self.model_path)
            .arg(image_path)
            .arg(self.confidence_threshold.to_string())
            .arg(self.overlap_threshold.to_string())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| InferenceError::ProcessSpawn(err.to_string()))?;
        let output = timeout(Duration::from_secs(self.inference_timeout), process.wait_with_output())
            .await
            .map_err(|_| InferenceError::Timeout { seconds: self.inference_timeout })?
            .map_err(|err| InferenceError::ProcessSpawn(err.to_string()))?;
        if !output.status.success() {
            return Err(InferenceError::ProcessFailure {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Self::parse_detections(&output.stdout)
    }

    pub fn parse_detections(stdout: &[u8]) -> Result<Vec<BoundingBox>, InferenceError> {
        serde_json::from_slice(stdout).map_err(|err| InferenceError::InvalidOutput(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_script_output_contract() {
        let stdout = br#"[{"xmin": 10, "ymin": 20, "xmax": 110, "ymax": 220, "name": "bacteria", "confidence": 0.87}]"#;
        let detections = InferenceEngine::parse_detections(stdout).unwrap();
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].name, "bacteria");
        assert_eq!(detections[0].width(), 100);
        assert_eq!(detections[0].height(), 200);
    }

    #[test]
    fn empty_array_is_zero_detections_not_an_error() {
        let detections = InferenceEngine::parse_detections(b"[]").unwrap();
        assert!(detections.is_empty());
    }

    #[test]
    fn garbage_output_is_an_error_not_zero_detections() {
        let result = InferenceEngine::parse_detections(b"Traceback (most recent call last):");
        assert!(matches!(result, Err(InferenceError::InvalidOutput(_))));
    }

    //Whether the interpreter is missing or the helper script is, the session
    //must see a failure, never an empty detection list.
    #[actix_rt::test]
    async fn unrunnable_inference_surfaces_as_an_error() {
        let engine = InferenceEngine::new(PathBuf::from("missing_model.pt"), 0.25, 0.5, 30);
        let result = engine.detect(Path::new("missing_image.jpg")).await;
        assert!(result.is_err());
    }
}
