//! Filters available to tooltip templates

use crate::session::{CurrentField, SESSION_KEY};
use chrono::NaiveDateTime;
use minijinja::{Environment, Error, ErrorKind, State, Value};
use tracing::warn;

/// Timestamp layout accepted by `date` (ISO-8601, UTC, fractional seconds)
pub const ISO_TIMESTAMP: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

/// Layout produced by `date` and used for `today`
pub const FORM_DATE: &str = "%m/%d/%y";

pub(crate) fn register(env: &mut Environment<'static>) {
    env.add_filter("date", date);
    env.add_filter("paste", paste);
    env.add_filter("check", check);
    env.add_filter("X", x_mark);
    env.add_filter("Y", y_mark);
}

/// `2024-03-05T00:00:00.000Z` -> `03/05/24`; falsy input renders empty
pub fn date(value: Value) -> Result<String, Error> {
    if !value.is_true() {
        return Ok(String::new());
    }

    let text = value.to_string();
    let parsed = NaiveDateTime::parse_from_str(&text, ISO_TIMESTAMP).map_err(|e| {
        Error::new(
            ErrorKind::InvalidOperation,
            format!("'{text}' is not an ISO timestamp"),
        )
        .with_source(e)
    })?;

    Ok(parsed.format(FORM_DATE).to_string())
}

/// Checkbox state: `Yes` / `Off`
pub fn check(value: Value) -> &'static str {
    if value.is_true() {
        "Yes"
    } else {
        "Off"
    }
}

/// `X` / blank
pub fn x_mark(value: Value) -> &'static str {
    if value.is_true() {
        "X"
    } else {
        " "
    }
}

/// `Y` / `N`
pub fn y_mark(value: Value) -> &'static str {
    if value.is_true() {
        "Y"
    } else {
        "N"
    }
}

fn outside_render_pass() -> Error {
    Error::new(
        ErrorKind::InvalidOperation,
        "paste can only be used while rendering a form field",
    )
}

/// Place an image over the current field
///
/// A string is read as an image path, bytes are used as image data; any
/// other value renders empty. On success the field itself receives a
/// single space, hidden beneath the image.
pub fn paste(state: &State, value: Value) -> Result<Value, Error> {
    let session = state.lookup(SESSION_KEY).ok_or_else(outside_render_pass)?;
    let field = session
        .downcast_object_ref::<CurrentField>()
        .ok_or_else(outside_render_pass)?;

    if value.as_str().is_none() && value.as_bytes().is_none() {
        return Ok(Value::from(""));
    }

    let Some(rect) = field.rect else {
        warn!(field = %field.name, "paste target has no rectangle, nothing placed");
        return Ok(Value::from(""));
    };

    let data = match value.as_str() {
        Some(path) => std::fs::read(path).map_err(|e| {
            Error::new(
                ErrorKind::InvalidOperation,
                format!("cannot read image '{path}'"),
            )
            .with_source(e)
        })?,
        None => value.as_bytes().map(<[u8]>::to_vec).unwrap_or_default(),
    };

    field.place_image(&data, rect).map_err(|e| {
        Error::new(ErrorKind::InvalidOperation, "cannot place image").with_source(e)
    })?;

    Ok(Value::from(" "))
}
