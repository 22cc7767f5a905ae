use serde::{Serialize, Deserialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct OperationStatus {
    pub success: bool,
    pub message: Option<String>,
}

impl OperationStatus {
    pub fn new(success: bool, message: Option<String>) -> Self {
        Self {
            success,
            message,
        }
    }
}
