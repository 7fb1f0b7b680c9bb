use super::ApiError;
use crate::domain::ItemId;

const MAX_ID_LEN: usize = 64;

/// Checks a path id before it reaches the store.
pub fn validate_item_id(id: &str) -> Result<ItemId, ApiError> {
    validate_id("item", id).map(ItemId::new)
}

pub fn validate_template_id(id: &str) -> Result<&str, ApiError> {
    validate_id("template", id)
}

fn validate_id<'a>(kind: &str, id: &'a str) -> Result<&'a str, ApiError> {
    if id.is_empty() || id.len() > MAX_ID_LEN {
        return Err(ApiError::validation(format!(
            "Invalid {kind} ID: must be 1 to {MAX_ID_LEN} characters"
        )));
    }

    if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(ApiError::validation(format!(
            "Invalid {kind} ID: '{id}'"
        )));
    }

    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_item_id() {
        assert!(validate_item_id("4b1f0c52-9c55-4f0b-a0f1-1f7a0e2b2d11").is_ok());
        assert!(validate_item_id("").is_err());
        assert!(validate_item_id("../etc").is_err());
        assert!(validate_item_id(&"a".repeat(65)).is_err());
    }

    #[test]
    fn test_validate_template_id() {
        assert_eq!(validate_template_id("abc-123").unwrap(), "abc-123");
        assert!(validate_template_id("a b").is_err());
    }
}
