use std::path::Path;

pub fn validate_path_exists(path: &str) -> Result<String, String> {
    if Path::new(path).exists() {
        Ok(path.to_string())
    } else {
        Err(format!("Path does not exist: {path}"))
    }
}

/// Output locations may not exist yet, but they must name something.
pub fn validate_output_path(path: &str) -> Result<String, String> {
    if path.trim().is_empty() {
        Err("Output path must not be empty".to_string())
    } else {
        Ok(path.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path_exists() {
        assert!(validate_path_exists(".").is_ok());
        let err = validate_path_exists("no/such/collection.json").unwrap_err();
        assert_eq!(err, "Path does not exist: no/such/collection.json");
    }

    #[test]
    fn test_validate_output_path() {
        assert!(validate_output_path("cypress/e2e/postman").is_ok());
        assert!(validate_output_path("  ").is_err());
    }
}
