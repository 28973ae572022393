use crate::utils::error::{EtlError, Result};
use reqwest::header::{HeaderName, HeaderValue};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(EtlError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// Every segment of a dotted path must be non-empty (`a..b` and `.a` are rejected).
pub fn validate_dotted_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() || path.split('.').any(|segment| segment.trim().is_empty()) {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Dotted path must not contain empty segments".to_string(),
        });
    }
    Ok(())
}

pub fn validate_delimiter(field_name: &str, delimiter: char) -> Result<()> {
    if !delimiter.is_ascii() || delimiter == '"' || delimiter == '\n' || delimiter == '\r' {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: delimiter.escape_default().to_string(),
            reason: "Delimiter must be a single ASCII character other than a quote or newline"
                .to_string(),
        });
    }
    Ok(())
}

/// Parse one configured HTTP header. Names must be valid tokens (no spaces)
/// and values visible ASCII.
pub fn parse_header(field_name: &str, name: &str, value: &str) -> Result<(HeaderName, HeaderValue)> {
    let header_name =
        HeaderName::from_bytes(name.as_bytes()).map_err(|e| EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: name.to_string(),
            reason: format!("Invalid header name: {}", e),
        })?;
    let header_value = HeaderValue::from_str(value).map_err(|e| EtlError::InvalidConfigValueError {
        field: format!("{}.{}", field_name, name),
        value: value.to_string(),
        reason: format!("Invalid header value: {}", e),
    })?;
    Ok((header_name, header_value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("source.endpoint", "https://api.hh.ru/vacancies").is_ok());
        assert!(validate_url("source.endpoint", "http://example.com").is_ok());
        assert!(validate_url("source.endpoint", "").is_err());
        assert!(validate_url("source.endpoint", "invalid-url").is_err());
        assert!(validate_url("source.endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("harvest.page_size", 100, 1).is_ok());
        assert!(validate_positive_number("harvest.page_size", 0, 1).is_err());
    }

    #[test]
    fn test_validate_dotted_path() {
        assert!(validate_dotted_path("project.fields", "employer.name").is_ok());
        assert!(validate_dotted_path("project.fields", "id").is_ok());
        assert!(validate_dotted_path("project.fields", "").is_err());
        assert!(validate_dotted_path("project.fields", "employer..name").is_err());
        assert!(validate_dotted_path("project.fields", ".name").is_err());
    }

    #[test]
    fn test_parse_header() {
        assert!(parse_header("source.headers", "User-Agent", "small-harvest/0.1").is_ok());
        assert!(parse_header("source.headers", "User Agent", "x").is_err());
        assert!(parse_header("source.headers", "", "x").is_err());
        assert!(parse_header("source.headers", "X-Token", "line\nbreak").is_err());
    }

    #[test]
    fn test_validate_delimiter() {
        assert!(validate_delimiter("load.delimiter", ',').is_ok());
        assert!(validate_delimiter("load.delimiter", '\t').is_ok());
        assert!(validate_delimiter("load.delimiter", '"').is_err());
        assert!(validate_delimiter("load.delimiter", '§').is_err());
    }
}
