//! Synchronous checkpoint input validation.
//!
//! Every check runs before the store touches its state or the network and
//! fails with [`CairnError::Validation`].

use super::model::{CheckpointMetadataUpdate, CheckpointPriority};
use crate::error::{CairnError, Result};

pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_DESCRIPTION_LENGTH: usize = 500;
pub const MAX_TAGS: usize = 10;
pub const MAX_TAG_LENGTH: usize = 50;

pub fn validate_checkpoint_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(CairnError::validation("Checkpoint name cannot be empty"));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(CairnError::validation(format!(
            "Checkpoint name cannot exceed {} characters",
            MAX_NAME_LENGTH
        )));
    }
    Ok(())
}

/// Parses a priority string (`low`, `medium`, `high`).
pub fn validate_checkpoint_priority(priority: &str) -> Result<CheckpointPriority> {
    priority.parse()
}

pub fn validate_checkpoint_tags(tags: &[String]) -> Result<()> {
    if tags.len() > MAX_TAGS {
        return Err(CairnError::validation(format!(
            "Cannot have more than {} tags",
            MAX_TAGS
        )));
    }

    for tag in tags {
        if tag.chars().count() > MAX_TAG_LENGTH {
            return Err(CairnError::validation(format!(
                "Tag cannot exceed {} characters",
                MAX_TAG_LENGTH
            )));
        }
        if tag.contains(',') {
            return Err(CairnError::validation("Tags cannot contain commas"));
        }
    }

    Ok(())
}

pub fn validate_checkpoint_description(description: Option<&str>) -> Result<()> {
    match description {
        Some(text) if text.chars().count() > MAX_DESCRIPTION_LENGTH => {
            Err(CairnError::validation(format!(
                "Checkpoint description cannot exceed {} characters",
                MAX_DESCRIPTION_LENGTH
            )))
        }
        _ => Ok(()),
    }
}

/// Validates only the fields an update actually carries.
pub fn validate_metadata_update(update: &CheckpointMetadataUpdate) -> Result<()> {
    if let Some(name) = &update.name {
        validate_checkpoint_name(name)?;
    }
    validate_checkpoint_description(update.description.as_deref())?;
    if let Some(tags) = &update.tags {
        validate_checkpoint_tags(tags)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("tag{}", i)).collect()
    }

    #[test]
    fn test_name_boundaries() {
        assert!(validate_checkpoint_name(&"a".repeat(100)).is_ok());

        let err = validate_checkpoint_name(&"a".repeat(101)).unwrap_err();
        assert_eq!(err.to_string(), "Checkpoint name cannot exceed 100 characters");

        let err = validate_checkpoint_name("   \t ").unwrap_err();
        assert_eq!(err.to_string(), "Checkpoint name cannot be empty");
        assert!(validate_checkpoint_name("").is_err());
    }

    #[test]
    fn test_priority_values() {
        for value in ["low", "medium", "high"] {
            assert!(validate_checkpoint_priority(value).is_ok());
        }
        let err = validate_checkpoint_priority("HIGH").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_tag_count_boundary() {
        assert!(validate_checkpoint_tags(&tags(10)).is_ok());
        let err = validate_checkpoint_tags(&tags(11)).unwrap_err();
        assert_eq!(err.to_string(), "Cannot have more than 10 tags");
    }

    #[test]
    fn test_tag_content() {
        let err = validate_checkpoint_tags(&["a,b".to_string()]).unwrap_err();
        assert_eq!(err.to_string(), "Tags cannot contain commas");

        assert!(validate_checkpoint_tags(&["x".repeat(50)]).is_ok());
        let err = validate_checkpoint_tags(&["x".repeat(51)]).unwrap_err();
        assert_eq!(err.to_string(), "Tag cannot exceed 50 characters");

        assert!(validate_checkpoint_tags(&[]).is_ok());
    }

    #[test]
    fn test_description_limit() {
        assert!(validate_checkpoint_description(None).is_ok());
        assert!(validate_checkpoint_description(Some(&"d".repeat(500))).is_ok());
        assert!(validate_checkpoint_description(Some(&"d".repeat(501))).is_err());
    }

    #[test]
    fn test_metadata_update_checks_present_fields_only() {
        assert!(validate_metadata_update(&CheckpointMetadataUpdate::default()).is_ok());

        let update = CheckpointMetadataUpdate {
            tags: Some(vec!["bad,tag".into()]),
            ..Default::default()
        };
        assert!(validate_metadata_update(&update).is_err());

        let update = CheckpointMetadataUpdate {
            name: Some(" ".into()),
            ..Default::default()
        };
        assert!(validate_metadata_update(&update).is_err());
    }
}
