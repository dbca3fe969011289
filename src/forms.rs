/// Form validation
///
/// Explicit validator functions per entity: each takes the raw submitted
/// values and returns either a constructed-but-unsaved draft or field-level
/// error messages. Validation is purely functional over the submitted data;
/// referential checks (does the group exist) stay with the handler, which
/// folds failures into the same `FormErrors` shape.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw post form fields as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPostForm {
    pub text: Option<String>,
    pub group: Option<String>,
    pub image: Option<String>,
}

/// Raw comment form fields as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCommentForm {
    pub text: Option<String>,
}

/// A validated post, ready for the handler to attach an author and persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub text: String,
    pub group_id: Option<i64>,
    pub image: Option<String>,
}

/// Field-level validation errors, keyed by field name.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct FormErrors {
    pub errors: BTreeMap<String, Vec<String>>,
}

impl FormErrors {
    pub fn add(&mut self, field: &str, message: &str) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

fn required_text(raw: Option<&str>, field: &str, errors: &mut FormErrors) -> Option<String> {
    match raw.map(str::trim) {
        Some(value) if !value.is_empty() => Some(value.to_string()),
        _ => {
            errors.add(field, "This field is required.");
            None
        }
    }
}

/// Validate a post submission.
///
/// `text` is required and stored trimmed; `group` is optional but must be a
/// well-formed id when present; `image` is an optional reference path from
/// the upload collaborator.
pub fn validate_post_form(raw: &RawPostForm) -> Result<PostDraft, FormErrors> {
    let mut errors = FormErrors::default();

    let text = required_text(raw.text.as_deref(), "text", &mut errors);

    let group_id = match raw.group.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(value) => match value.parse::<i64>() {
            Ok(id) => Some(id),
            Err(_) => {
                errors.add("group", "Select a valid group.");
                None
            }
        },
    };

    let image = raw
        .image
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string);

    match (text, errors.is_empty()) {
        (Some(text), true) => Ok(PostDraft {
            text,
            group_id,
            image,
        }),
        _ => Err(errors),
    }
}

/// Validate a comment submission: `text` is required and stored trimmed.
pub fn validate_comment_form(raw: &RawCommentForm) -> Result<String, FormErrors> {
    let mut errors = FormErrors::default();
    match required_text(raw.text.as_deref(), "text", &mut errors) {
        Some(text) => Ok(text),
        None => Err(errors),
    }
}
