use serde::{Deserialize, Serialize};

pub const MODEL_VERSION: &str = "1.0.0";

/// Feature order expected by the model.
pub const FEATURE_NAMES: [&str; 4] = ["sepal_length", "sepal_width", "petal_length", "petal_width"];

/// Raw `/predict` body.
///
/// Every field is optional at the decoding stage so that a missing field is
/// reported by name together with the other failing fields.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct PredictionRequest {
    pub sepal_length: Option<f64>,
    pub sepal_width: Option<f64>,
    pub petal_length: Option<f64>,
    pub petal_width: Option<f64>,
}

impl PredictionRequest {
    pub fn validate(&self) -> Result<IrisFeatures, Vec<FieldError>> {
        let fields = [
            (FEATURE_NAMES[0], self.sepal_length),
            (FEATURE_NAMES[1], self.sepal_width),
            (FEATURE_NAMES[2], self.petal_length),
            (FEATURE_NAMES[3], self.petal_width),
        ];

        let mut errors = Vec::new();
        for (name, value) in fields.iter() {
            match value {
                None => errors.push(FieldError::missing(name)),
                // NaN fails this comparison too
                Some(v) if !(*v > 0.0) => errors.push(FieldError::not_positive(name)),
                Some(_) => {}
            }
        }

        match (self.sepal_length, self.sepal_width, self.petal_length, self.petal_width) {
            (Some(sepal_length), Some(sepal_width), Some(petal_length), Some(petal_width))
                if errors.is_empty() =>
            {
                Ok(IrisFeatures {
                    sepal_length,
                    sepal_width,
                    petal_length,
                    petal_width,
                })
            }
            _ => Err(errors),
        }
    }
}

/// A validated measurement record: all four values present and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IrisFeatures {
    pub sepal_length: f64,
    pub sepal_width: f64,
    pub petal_length: f64,
    pub petal_width: f64,
}

impl IrisFeatures {
    pub fn to_array(&self) -> [f64; 4] {
        [
            self.sepal_length,
            self.sepal_width,
            self.petal_length,
            self.petal_width,
        ]
    }
}

/// One entry of a 422 response body.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct FieldError {
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl FieldError {
    pub fn missing(field: &str) -> Self {
        FieldError {
            loc: vec!["body".to_string(), field.to_string()],
            msg: "Field required".to_string(),
            kind: "missing".to_string(),
        }
    }

    pub fn not_positive(field: &str) -> Self {
        FieldError {
            loc: vec!["body".to_string(), field.to_string()],
            msg: "Input should be greater than 0".to_string(),
            kind: "greater_than".to_string(),
        }
    }

    /// The body could not be decoded at all (bad JSON, wrong value type).
    pub fn invalid_body(reason: impl Into<String>) -> Self {
        FieldError {
            loc: vec!["body".to_string()],
            msg: reason.into(),
            kind: "json_invalid".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct PredictionResponse {
    pub prediction: i64,
    pub model_version: String,
}

impl PredictionResponse {
    pub fn new(prediction: i64) -> Self {
        PredictionResponse {
            prediction,
            model_version: MODEL_VERSION.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model_loaded: bool,
}

impl HealthResponse {
    pub fn healthy(model_loaded: bool) -> Self {
        HealthResponse {
            status: "healthy",
            model_loaded,
        }
    }
}

/// Error body shared by every non-2xx answer: `{"detail": ...}`.
#[derive(Debug, Serialize)]
pub struct ErrorDetail<T: Serialize> {
    pub detail: T,
}
