use serde::Serialize;

/// Uniform JSON wrapper for every response the API produces.
///
/// Built only through [`ResponseEnvelope::success`] or
/// [`ResponseEnvelope::error`], so a payload and an error never coexist.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseEnvelope<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ResponseEnvelope<T> {
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: None,
            error: Some(error.into()),
        }
    }
}
