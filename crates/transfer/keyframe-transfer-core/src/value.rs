//! Attribute values and frame-time keys.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A keyframe or attribute value. Hosts expose numeric and boolean channels;
/// enum and integer channels travel as numbers.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum KeyValue {
    // Bool before Number so JSON `true` never lands in the numeric arm.
    Bool(bool),
    Number(f64),
}

impl KeyValue {
    #[inline]
    pub fn as_f64(&self) -> f64 {
        match self {
            KeyValue::Number(n) => *n,
            KeyValue::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    #[inline]
    pub fn is_bool(&self) -> bool {
        matches!(self, KeyValue::Bool(_))
    }
}

impl From<f64> for KeyValue {
    fn from(v: f64) -> Self {
        KeyValue::Number(v)
    }
}

impl From<bool> for KeyValue {
    fn from(v: bool) -> Self {
        KeyValue::Bool(v)
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyValue::Number(n) => write!(f, "{n}"),
            KeyValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Totally ordered frame time, usable as a map key.
///
/// Ordering follows `f64::total_cmp`; two keys are equal only when their bit
/// patterns order equal, so `-0.0` and `0.0` are distinct keys.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameTime(pub f64);

impl FrameTime {
    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }

    /// Render as a document key: whole frames keep a trailing `.0` ("10.0").
    pub fn to_key_string(self) -> String {
        format!("{:?}", self.0)
    }

    pub fn parse_key(s: &str) -> Result<Self, String> {
        let t: f64 = s
            .trim()
            .parse()
            .map_err(|_| format!("invalid keyframe time '{s}'"))?;
        if !t.is_finite() {
            return Err(format!("keyframe time '{s}' is not finite"));
        }
        Ok(FrameTime(t))
    }
}

impl PartialEq for FrameTime {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrameTime {}

impl PartialOrd for FrameTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrameTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl From<f64> for FrameTime {
    fn from(t: f64) -> Self {
        FrameTime(t)
    }
}

impl fmt::Display for FrameTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
