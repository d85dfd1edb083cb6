use crate::utils::error::{PocketError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(PocketError::ConfigParse {
            field: field_name.to_string(),
            message: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(PocketError::ConfigParse {
                field: field_name.to_string(),
                message: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(PocketError::ConfigParse {
            field: field_name.to_string(),
            message: format!("Invalid URL format '{}': {}", url_str, e),
        }),
    }
}

/// Rejects empty and whitespace-only credentials before anything hits the wire.
pub fn validate_credential(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(PocketError::config(format!(
            "{} is not present in lint.toml. Please add it using the format '{} = \"value\"'.",
            field_name, field_name
        )));
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(PocketError::invalid_request(format!(
            "{} cannot be empty or whitespace-only",
            field_name
        )));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(PocketError::ConfigParse {
            field: field_name.to_string(),
            message: format!("Value {} must be between {} and {}", value, min, max),
        });
    }
    Ok(())
}
