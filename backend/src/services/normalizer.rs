//! Request body normalization.
//!
//! Clients send posts in three shapes: a bare object, a list of objects, or an
//! object wrapping a list under `"posts"`. The shape is resolved once into a
//! [`BodyShape`] and every record is then reduced to a canonical [`PostDraft`].
//! Only `title` and `tags` are carried over; any other field is dropped.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::post::{PostDraft, PostPatch, TAGS_FIELD, TITLE_FIELD};

/// Key under which a list of posts may be wrapped.
pub const WRAPPER_KEY: &str = "posts";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("Missing required field '{0}'")]
    MissingField(&'static str),
}

type NormalizeResult<T> = Result<T, NormalizeError>;

/// Recognized body layouts.
#[derive(Debug)]
enum BodyShape<'a> {
    Single(&'a Map<String, Value>),
    List(&'a [Value]),
    Wrapped(&'a [Value]),
}

impl<'a> BodyShape<'a> {
    fn classify(body: &'a Value) -> NormalizeResult<Self> {
        match body {
            Value::Object(object) if has_title(object) => Ok(BodyShape::Single(object)),
            Value::Object(object) => match object.get(WRAPPER_KEY) {
                Some(Value::Array(items)) if items.is_empty() => Err(invalid(
                    "The 'posts' list must contain at least one post",
                )),
                Some(Value::Array(items)) => Ok(BodyShape::Wrapped(items)),
                Some(_) => Err(invalid("'posts' must be a list of posts")),
                None => Err(invalid(
                    "Expected a post with a 'title', a list of posts, or an object with a 'posts' list",
                )),
            },
            Value::Array(items) => match items.first() {
                None => Err(invalid("The list of posts must not be empty")),
                Some(Value::Object(first)) if has_title(first) => Ok(BodyShape::List(items)),
                Some(_) => Err(invalid(
                    "Expected the first element of the list to be a post with a 'title'",
                )),
            },
            _ => Err(invalid("Expected a JSON object or a list of JSON objects")),
        }
    }
}

/// Reduce a write body to its canonical drafts.
///
/// A bare object yields one draft; a list or a wrapped list yields one draft per
/// element, in order. If any element lacks a `title` the whole batch fails with
/// [`NormalizeError::MissingField`].
pub fn normalize(body: &Value) -> NormalizeResult<Vec<PostDraft>> {
    match BodyShape::classify(body)? {
        BodyShape::Single(object) => Ok(vec![draft_from_object(object)?]),
        BodyShape::List(items) | BodyShape::Wrapped(items) => {
            items.iter().map(draft_from_element).collect()
        }
    }
}

/// Parse a single post with a required `title`, as used for full replacement.
pub fn parse_draft(body: &Value) -> NormalizeResult<PostDraft> {
    match body {
        Value::Object(object) => draft_from_object(object),
        _ => Err(invalid("Expected a JSON object")),
    }
}

/// Parse a partial update. `title` and `tags` are both optional and an `id`
/// field is ignored.
pub fn parse_patch(body: &Value) -> NormalizeResult<PostPatch> {
    let object = body
        .as_object()
        .ok_or_else(|| invalid("Expected a JSON object"))?;

    let title = match object.get(TITLE_FIELD) {
        None | Some(Value::Null) => None,
        Some(value) => Some(title_from(value)?),
    };

    Ok(PostPatch {
        title,
        tags: tags_from(object)?,
    })
}

fn draft_from_element(element: &Value) -> NormalizeResult<PostDraft> {
    match element {
        Value::Object(object) => draft_from_object(object),
        _ => Err(NormalizeError::MissingField(TITLE_FIELD)),
    }
}

fn draft_from_object(object: &Map<String, Value>) -> NormalizeResult<PostDraft> {
    let title = match object.get(TITLE_FIELD) {
        None | Some(Value::Null) => return Err(NormalizeError::MissingField(TITLE_FIELD)),
        Some(value) => title_from(value)?,
    };

    Ok(PostDraft {
        title,
        tags: tags_from(object)?.unwrap_or_default(),
    })
}

fn title_from(value: &Value) -> NormalizeResult<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| invalid("'title' must be a string"))
}

fn tags_from(object: &Map<String, Value>) -> NormalizeResult<Option<Vec<String>>> {
    match object.get(TAGS_FIELD) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => items
            .iter()
            .map(|tag| tag.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .map(Some)
            .ok_or_else(|| invalid("'tags' must be a list of strings")),
        Some(_) => Err(invalid("'tags' must be a list of strings")),
    }
}

fn has_title(object: &Map<String, Value>) -> bool {
    !matches!(object.get(TITLE_FIELD), None | Some(Value::Null))
}

fn invalid(message: &str) -> NormalizeError {
    NormalizeError::InvalidInput(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn titles(drafts: &[PostDraft]) -> Vec<&str> {
        drafts.iter().map(|d| d.title.as_str()).collect()
    }

    #[test]
    fn test_single_object() {
        let drafts = normalize(&json!({"title": "A"})).unwrap();
        assert_eq!(drafts, vec![PostDraft::new("A", vec![])]);
    }

    #[test]
    fn test_list_of_objects_keeps_order() {
        let drafts = normalize(&json!([{"title": "A"}, {"title": "B", "tags": ["x"]}])).unwrap();
        assert_eq!(titles(&drafts), vec!["A", "B"]);
        assert_eq!(drafts[1].tags, vec!["x"]);
    }

    #[test]
    fn test_wrapped_list() {
        let drafts = normalize(&json!({"posts": [{"title": "A", "tags": ["x"]}]})).unwrap();
        assert_eq!(drafts, vec![PostDraft::new("A", vec!["x".to_string()])]);
    }

    #[test]
    fn test_extra_fields_are_dropped() {
        let drafts = normalize(&json!({"title": "A", "author": "me", "id": "3"})).unwrap();
        assert_eq!(drafts, vec![PostDraft::new("A", vec![])]);
    }

    #[test]
    fn test_object_with_title_wins_over_wrapper() {
        let drafts = normalize(&json!({"title": "A", "posts": [{"title": "B"}]})).unwrap();
        assert_eq!(titles(&drafts), vec!["A"]);
    }

    #[test]
    fn test_unrecognized_shapes_are_invalid() {
        for body in [
            json!({}),
            json!("title"),
            json!(42),
            json!(null),
            json!([]),
            json!({"posts": []}),
            json!({"posts": {"title": "A"}}),
            json!([{"tags": ["x"]}, {"title": "B"}]),
            json!(["A"]),
        ] {
            assert!(
                matches!(normalize(&body), Err(NormalizeError::InvalidInput(_))),
                "expected invalid input for {}",
                body
            );
        }
    }

    #[test]
    fn test_later_element_without_title_fails_batch() {
        let result = normalize(&json!([{"title": "A"}, {"tags": ["x"]}]));
        assert_eq!(result, Err(NormalizeError::MissingField("title")));

        let result = normalize(&json!({"posts": [{"title": "A"}, 7]}));
        assert_eq!(result, Err(NormalizeError::MissingField("title")));
    }

    #[test]
    fn test_field_types_are_checked() {
        assert!(matches!(
            normalize(&json!({"title": 5})),
            Err(NormalizeError::InvalidInput(_))
        ));
        assert!(matches!(
            normalize(&json!({"title": "A", "tags": "x"})),
            Err(NormalizeError::InvalidInput(_))
        ));
        assert!(matches!(
            normalize(&json!({"title": "A", "tags": [1, 2]})),
            Err(NormalizeError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_null_tags_default_to_empty() {
        let drafts = normalize(&json!({"title": "A", "tags": null})).unwrap();
        assert!(drafts[0].tags.is_empty());
    }

    #[test]
    fn test_parse_draft_requires_title() {
        assert_eq!(
            parse_draft(&json!({"tags": ["x"]})),
            Err(NormalizeError::MissingField("title"))
        );
        assert!(matches!(
            parse_draft(&json!([{"title": "A"}])),
            Err(NormalizeError::InvalidInput(_))
        ));
        assert_eq!(
            parse_draft(&json!({"title": "A", "tags": ["x"]})).unwrap(),
            PostDraft::new("A", vec!["x".to_string()])
        );
    }

    #[test]
    fn test_parse_patch_keeps_only_present_fields() {
        let patch = parse_patch(&json!({"id": "1", "title": "B"})).unwrap();
        assert_eq!(patch.title.as_deref(), Some("B"));
        assert!(patch.tags.is_none());

        let empty = parse_patch(&json!({"id": "1"})).unwrap();
        assert!(empty.is_empty());

        assert!(parse_patch(&json!(["x"])).is_err());
    }
}
