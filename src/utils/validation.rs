use crate::error::{AppError, Result};
use crate::namespaces::ALL_NAMESPACES;

/// Largest page the list endpoints will serve.
pub const MAX_ITEMS_PER_PAGE: usize = 500;

/// Validates a Kubernetes resource name
pub fn validate_resource_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(AppError::Validation("Resource name cannot be empty".to_string()));
    }

    if name.len() > 253 {
        return Err(AppError::Validation("Resource name cannot exceed 253 characters".to_string()));
    }

    // Kubernetes name validation: lowercase alphanumeric and dashes, cannot start/end with dash
    let is_valid = name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !name.starts_with('-')
        && !name.ends_with('-');

    if !is_valid {
        return Err(AppError::Validation(
            "Resource name must be lowercase alphanumeric characters or '-', and cannot start or end with '-'".to_string()
        ));
    }

    Ok(())
}

/// Validates a Kubernetes namespace name
pub fn validate_namespace(namespace: &str) -> Result<()> {
    if namespace.is_empty() {
        return Err(AppError::Validation("Namespace cannot be empty".to_string()));
    }

    if namespace.len() > 63 {
        return Err(AppError::Validation("Namespace cannot exceed 63 characters".to_string()));
    }

    validate_resource_name(namespace)
}

/// Validates a namespace selection; `_all` stands for every namespace and must be alone.
pub fn validate_namespace_selection(namespaces: &[String]) -> Result<()> {
    if namespaces.iter().any(|ns| ns == ALL_NAMESPACES) {
        if namespaces.len() > 1 {
            return Err(AppError::Validation(format!(
                "'{}' cannot be combined with other namespaces",
                ALL_NAMESPACES
            )));
        }
        return Ok(());
    }

    for namespace in namespaces {
        validate_namespace(namespace)?;
    }

    Ok(())
}

/// Validates an equality- or set-based label selector such as `app=web,tier in (a,b),!legacy`
pub fn validate_label_selector(selector: &str) -> Result<()> {
    if selector.trim().is_empty() {
        return Err(AppError::Validation("Label selector cannot be empty".to_string()));
    }

    for requirement in split_requirements(selector)? {
        validate_requirement(requirement.trim())?;
    }

    Ok(())
}

/// Validates the page size of a list request
pub fn validate_items_per_page(items: usize) -> Result<()> {
    if items == 0 {
        return Err(AppError::Validation("Items per page must be at least 1".to_string()));
    }

    if items > MAX_ITEMS_PER_PAGE {
        return Err(AppError::Validation(format!(
            "Items per page cannot exceed {}",
            MAX_ITEMS_PER_PAGE
        )));
    }

    Ok(())
}

/// Splits on commas that are not inside a `(...)` value set.
fn split_requirements(selector: &str) -> Result<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in selector.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth.checked_sub(1).ok_or_else(|| {
                    AppError::Validation("Unbalanced ')' in label selector".to_string())
                })?
            }
            ',' if depth == 0 => {
                parts.push(&selector[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }

    if depth != 0 {
        return Err(AppError::Validation("Unbalanced '(' in label selector".to_string()));
    }
    parts.push(&selector[start..]);

    Ok(parts)
}

fn validate_requirement(requirement: &str) -> Result<()> {
    if requirement.is_empty() {
        return Err(AppError::Validation("Label selector has an empty requirement".to_string()));
    }

    if let Some(key) = requirement.strip_prefix('!') {
        return validate_label_key(key.trim());
    }

    for op in ["!=", "==", "="] {
        if let Some((key, value)) = requirement.split_once(op) {
            validate_label_key(key.trim())?;
            return validate_label_value(value.trim());
        }
    }

    for op in [" notin ", " in "] {
        if let Some((key, values)) = requirement.split_once(op) {
            validate_label_key(key.trim())?;
            let values = values
                .trim()
                .strip_prefix('(')
                .and_then(|v| v.strip_suffix(')'))
                .ok_or_else(|| {
                    AppError::Validation(format!("Label set '{}' must be wrapped in '(...)'", values.trim()))
                })?;
            for value in values.split(',') {
                validate_label_value(value.trim())?;
            }
            return Ok(());
        }
    }

    validate_label_key(requirement)
}

fn validate_label_key(key: &str) -> Result<()> {
    let name = match key.rsplit_once('/') {
        Some((prefix, name)) => {
            if prefix.is_empty() || prefix.len() > 253 {
                return Err(AppError::Validation(format!("Invalid label key prefix in '{}'", key)));
            }
            name
        }
        None => key,
    };

    if name.is_empty() {
        return Err(AppError::Validation("Label key cannot be empty".to_string()));
    }

    validate_label_value(name)
}

fn validate_label_value(value: &str) -> Result<()> {
    if value.len() > 63 {
        return Err(AppError::Validation(format!(
            "Label value '{}' cannot exceed 63 characters",
            value
        )));
    }

    // Empty values are allowed; otherwise alphanumeric at both ends with '-', '_' or '.' inside
    let is_valid = value.is_empty()
        || (value.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && value.starts_with(|c: char| c.is_ascii_alphanumeric())
            && value.ends_with(|c: char| c.is_ascii_alphanumeric()));

    if !is_valid {
        return Err(AppError::Validation(format!("Invalid label name or value '{}'", value)));
    }

    Ok(())
}
