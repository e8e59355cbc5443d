//! Typed readers
//!
//! Coerce raw INI values into typed fields. Missing keys are seeded with an
//! empty value so the file lists every recognized option after a load; a
//! value that fails to parse is reported and leaves the field untouched.

use std::str::FromStr;

use thiserror::Error;

use super::schema::{Color, Named};
use crate::ini::IniStore;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValueError {
    #[error("invalid integer {0:?}")]
    Int(String),

    #[error("invalid double {0:?}")]
    Double(String),

    #[error("invalid bool {0:?}")]
    Bool(String),

    #[error("invalid character {0:?}")]
    Char(String),

    #[error("invalid time {value:?}: {reason}")]
    Time { value: String, reason: &'static str },

    #[error("unknown value {0:?}")]
    Name(String),
}

pub fn parse_int<T: FromStr>(value: &str) -> Result<T, ValueError> {
    value
        .trim()
        .parse()
        .map_err(|_| ValueError::Int(value.to_string()))
}

pub fn parse_double(value: &str) -> Result<f64, ValueError> {
    value
        .trim()
        .parse()
        .map_err(|_| ValueError::Double(value.to_string()))
}

pub fn parse_bool(value: &str) -> Result<bool, ValueError> {
    match value.trim() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ValueError::Bool(value.to_string())),
    }
}

/// `'c'` or a numeric code point; control characters are rejected.
pub fn parse_char(value: &str) -> Result<char, ValueError> {
    let err = || ValueError::Char(value.to_string());

    let ch = if let Some(quoted) = value.strip_prefix('\'') {
        let mut chars = quoted.chars();
        match (chars.next(), chars.next()) {
            (Some(c), Some('\'')) => c,
            _ => return Err(err()),
        }
    } else {
        let code: u32 = parse_int(value)?;
        char::from_u32(code).ok_or_else(err)?
    };

    if (ch as u32) < 32 {
        return Err(err());
    }
    Ok(ch)
}

/// Seconds, or `MM:SS[.mmm]`, to milliseconds.
pub fn parse_time(value: &str) -> Result<u32, ValueError> {
    let invalid = |reason| ValueError::Time {
        value: value.to_string(),
        reason,
    };

    let Some((minutes, rest)) = value.split_once(':') else {
        let seconds: u32 = parse_int(value)?;
        return seconds
            .checked_mul(1000)
            .ok_or_else(|| invalid("too long"));
    };

    let minutes: i32 = parse_int(minutes)?;
    if !(0..=99).contains(&minutes) {
        return Err(invalid("minutes out of range"));
    }

    let (seconds, millis) = match rest.split_once('.') {
        None => (parse_int::<i32>(rest)?, 0),
        Some((seconds, fraction)) => {
            let scale = match fraction.len() {
                1 => 100,
                2 => 10,
                3 => 1,
                _ => return Err(invalid("fraction must have 1 to 3 digits")),
            };
            let millis: u32 = parse_int(fraction)?;
            (parse_int::<i32>(seconds)?, millis * scale)
        }
    };
    if !(0..=59).contains(&seconds) {
        return Err(invalid("seconds out of range"));
    }

    Ok((minutes as u32 * 60 + seconds as u32) * 1000 + millis)
}

/// Non-empty value of `key`, seeding an empty entry if the key is absent
pub fn read_key(ini: &mut IniStore, key: &str) -> Option<String> {
    match ini.value(key) {
        None => {
            tracing::debug!("Key doesn't exist: {}", key);
            if let Err(e) = ini.add_value(key, "") {
                tracing::warn!("{}", e);
            }
            None
        }
        Some("") => None,
        Some(value) => Some(value.to_string()),
    }
}

/// Raw value of `key`, empty if absent or blank
pub fn read_string(ini: &mut IniStore, key: &str) -> String {
    read_key(ini, key).unwrap_or_default()
}

/// Parse `key` into `field`; returns whether `field` was assigned
fn read_with<T>(
    ini: &mut IniStore,
    key: &str,
    field: &mut T,
    parse: impl FnOnce(&str) -> Result<T, ValueError>,
) -> bool {
    let Some(value) = read_key(ini, key) else {
        return false;
    };
    match parse(&value) {
        Ok(v) => {
            *field = v;
            true
        }
        Err(e) => {
            tracing::warn!(key, "Error parsing value: {}", e);
            false
        }
    }
}

pub fn read_int<T: FromStr>(ini: &mut IniStore, key: &str, field: &mut T) -> bool {
    read_with(ini, key, field, parse_int)
}

pub fn read_double(ini: &mut IniStore, key: &str, field: &mut f64) -> bool {
    read_with(ini, key, field, parse_double)
}

pub fn read_bool(ini: &mut IniStore, key: &str, field: &mut bool) -> bool {
    read_with(ini, key, field, parse_bool)
}

pub fn read_char(ini: &mut IniStore, key: &str, field: &mut char) -> bool {
    read_with(ini, key, field, parse_char)
}

pub fn read_time(ini: &mut IniStore, key: &str, field: &mut u32) -> bool {
    read_with(ini, key, field, parse_time)
}

pub fn read_named<T: Named>(ini: &mut IniStore, key: &str, field: &mut T) -> bool {
    read_with(ini, key, field, |s| {
        T::from_name(s).ok_or_else(|| ValueError::Name(s.to_string()))
    })
}

pub fn read_color(ini: &mut IniStore, key: &str, field: &mut Color) -> bool {
    read_named(ini, key, field)
}
