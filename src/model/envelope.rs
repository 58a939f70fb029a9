use serde::{Deserialize, Serialize};

/// The `{success, data, message}` wrapper every backend response uses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

/// Body of a non-2xx response. Only `message` is relied on.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}
