//! Field-state code decoding.
//!
//! The field management system publishes a short string; the first two
//! characters give which side of the near switch and of the scale belong to
//! us. Anything after the second character is ignored.

use heapless::String;
use thiserror::Error;

use crate::consts::FIELD_STATE_CAPACITY;

use super::state::Side;

/// Raw field-state code as delivered by the transport.
pub type FieldCode = String<FIELD_STATE_CAPACITY>;

/// Decoded field state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldState {
    /// Our side of the near switch.
    pub switch: Side,
    /// Our side of the scale.
    pub scale: Side,
}

/// Field-state code could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldStateError {
    #[error("field-state code too short: {0:?}")]
    TooShort(FieldCode),
    #[error("invalid field-state character {found:?} at {index}")]
    InvalidChar { index: usize, found: char },
}

impl FieldState {
    /// Decode the first two characters of `code`.
    pub fn parse(code: &str) -> Result<Self, FieldStateError> {
        let mut chars = code.chars();
        let (Some(first), Some(second)) = (chars.next(), chars.next()) else {
            return Err(FieldStateError::TooShort(field_code(code)));
        };
        let switch = Side::from_code(first).ok_or(FieldStateError::InvalidChar {
            index: 0,
            found: first,
        })?;
        let scale = Side::from_code(second).ok_or(FieldStateError::InvalidChar {
            index: 1,
            found: second,
        })?;
        Ok(Self { switch, scale })
    }
}

impl std::fmt::Display for FieldState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.switch.code(), self.scale.code())
    }
}

/// Copy `raw` into a [`FieldCode`], truncated to capacity.
pub fn field_code(raw: &str) -> FieldCode {
    let mut code = FieldCode::new();
    for c in raw.chars() {
        if code.push(c).is_err() {
            break;
        }
    }
    code
}
