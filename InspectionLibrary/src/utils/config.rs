use std::fs;
use tokio::sync::RwLock;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use Common::utils::logging::*;
use crate::inspection::utils::profile::CaptureMode;

lazy_static! {
    static ref CONFIG: RwLock<Config> = RwLock::new(Config::new());
}

#[derive(Debug, Deserialize)]
struct ConfigTable {
    #[serde(rename = "Config")]
    config: Config,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    pub internal_timestamp: u64, //milliseconds
    pub http_server_bind_port: u16, //port
    pub capture_mode: CaptureMode, //single or dual
    pub model_filename: String, //file inside SavedModel
    #[serde(default)]
    pub model_download_url: Option<String>, //url
    pub confidence_threshold: f64, //ratio
    pub overlap_threshold: f64, //IoU ratio
    pub inference_timeout: u64, //seconds
    pub font_path: String, //path
    pub font_size: f32, //points
    pub border_width: u32, //pixels
    pub border_color: [u8; 3], //RGB
    pub text_color: [u8; 3], //RGB
}

impl Config {
    pub fn new() -> Self {
        //Seriously, the program must be terminated.
        match fs::read_to_string("./inspection.toml") {
            Ok(toml_string) => {
                match toml::from_str::<ConfigTable>(&toml_string) {
                    Ok(config_table) => {
                        let config = config_table.config;
                        if !Self::validate(&config) {
                            logging_console!(emergency_entry!("Config", "Invalid configuration file"));
                            panic!("Invalid configuration file");
                        }
                        config
                    },
                    Err(err) => {
                        logging_console!(emergency_entry!("Config", "Unable to parse configuration file", format!("Err: {err}")));
                        panic!("Unable to parse configuration file");
                    },
                }
            },
            Err(err) => {
                logging_console!(emergency_entry!("Config", "Configuration file not found", format!("Err: {err}")));
                panic!("Configuration file not found");
            },
        }
    }

    pub async fn now() -> Config {
        CONFIG.read().await.clone()
    }

    pub async fn update(config: Config) {
        *CONFIG.write().await = config
    }

    pub fn validate(config: &Config) -> bool {
        Config::validate_mini_second(config.internal_timestamp)
            && Config::validate_second(config.inference_timeout)
            && Config::validate_ratio(config.confidence_threshold)
            && Config::validate_ratio(config.overlap_threshold)
            && Config::validate_filename(&config.model_filename)
            && Config::validate_font_size(config.font_size)
            && Config::validate_border_width(config.border_width)
    }

    fn validate_mini_second(millisecond: u64) -> bool {
        millisecond <= 60000
    }

    fn validate_second(second: u64) -> bool {
        second > 0 && second <= 3600
    }

    fn validate_ratio(ratio: f64) -> bool {
        (0.0..=1.0).contains(&ratio)
    }

    fn validate_filename(filename: &str) -> bool {
        !filename.trim().is_empty()
    }

    fn validate_border_width(width: u32) -> bool {
        width > 0_u32
    }

    fn validate_font_size(size: f32) -> bool {
        size > 0_f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            internal_timestamp: 1000,
            http_server_bind_port: 8080,
            capture_mode: CaptureMode::Single,
            model_filename: "Yolov11_BacteriaDetection.pt".to_string(),
            model_download_url: None,
            confidence_threshold: 0.25,
            overlap_threshold: 0.5,
            inference_timeout: 120,
            font_path: "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf".to_string(),
            font_size: 20.0,
            border_width: 2,
            border_color: [0, 255, 0],
            text_color: [255, 255, 255],
        }
    }

    #[test]
    fn default_shape_is_valid() {
        assert!(Config::validate(&config()));
    }

    #[test]
    fn thresholds_must_be_ratios() {
        let mut invalid = config();
        invalid.confidence_threshold = 1.5;
        assert!(!Config::validate(&invalid));
        let mut invalid = config();
        invalid.overlap_threshold = -0.1;
        assert!(!Config::validate(&invalid));
    }

    #[test]
    fn model_filename_must_not_be_blank() {
        let mut invalid = config();
        invalid.model_filename = "  ".to_string();
        assert!(!Config::validate(&invalid));
    }

    #[test]
    fn inference_timeout_must_be_bounded() {
        let mut invalid = config();
        invalid.inference_timeout = 0;
        assert!(!Config::validate(&invalid));
        invalid.inference_timeout = 4000;
        assert!(!Config::validate(&invalid));
    }

    #[test]
    fn capture_mode_parses_from_toml() {
        let table: ConfigTable = toml::from_str(
            r#"
            [Config]
            internal_timestamp = 1000
            http_server_bind_port = 8080
            capture_mode = "dual"
            model_filename = "model.pt"
            confidence_threshold = 0.25
            overlap_threshold = 0.5
            inference_timeout = 120
            font_path = "font.ttf"
            font_size = 20.0
            border_width = 2
            border_color = [0, 255, 0]
            text_color = [255, 255, 255]
            "#,
        )
        .unwrap();
        assert_eq!(table.config.capture_mode, CaptureMode::Dual);
        assert_eq!(table.config.model_download_url, None);
    }
}
