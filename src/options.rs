//! Option values handed to the engine's polymorphic setter.
//!
//! Options are transient input, not stored state: a name plus one to three
//! values, dispatched across six native setters by runtime shape. The
//! dispatch itself lives in [`crate::session`]; this module models the value
//! shapes and the two predicates the dispatcher keys on.

/// One option value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OptionArg<'a> {
    Str(&'a str),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl OptionArg<'_> {
    /// Zero-like values and absent values both select the single-value
    /// dispatch branch.
    pub(crate) fn is_falsy(self) -> bool {
        match self {
            OptionArg::Str(s) => s.is_empty(),
            OptionArg::Int(v) => v == 0,
            OptionArg::Float(v) => v == 0.0 || v.is_nan(),
            OptionArg::Bool(b) => !b,
        }
    }

    pub(crate) fn is_number(self) -> bool {
        matches!(self, OptionArg::Int(_) | OptionArg::Float(_))
    }

    /// Whether the value's canonical decimal rendering is all digits, the
    /// test the setter dispatch applies to numbers. Negative values fail it
    /// (leading sign), as do fractional, non-finite, and very large floats
    /// (exponent notation); integral non-negative floats pass, since they
    /// render without a fractional part.
    pub(crate) fn looks_like_plain_integer(self) -> bool {
        match self {
            OptionArg::Int(v) => v >= 0,
            OptionArg::Float(v) => v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v < 1e21,
            _ => false,
        }
    }

    pub(crate) fn as_i32(self) -> i32 {
        match self {
            OptionArg::Int(v) => v as i32,
            OptionArg::Float(v) => v as i32,
            OptionArg::Bool(b) => b as i32,
            OptionArg::Str(_) => 0,
        }
    }

    pub(crate) fn as_f32(self) -> f32 {
        match self {
            OptionArg::Int(v) => v as f32,
            OptionArg::Float(v) => v as f32,
            OptionArg::Bool(b) => b as i32 as f32,
            OptionArg::Str(_) => 0.0,
        }
    }
}

impl<'a> From<&'a str> for OptionArg<'a> {
    fn from(value: &'a str) -> Self {
        OptionArg::Str(value)
    }
}

impl<'a> From<i32> for OptionArg<'a> {
    fn from(value: i32) -> Self {
        OptionArg::Int(value.into())
    }
}

impl<'a> From<i64> for OptionArg<'a> {
    fn from(value: i64) -> Self {
        OptionArg::Int(value)
    }
}

impl<'a> From<f32> for OptionArg<'a> {
    fn from(value: f32) -> Self {
        OptionArg::Float(value.into())
    }
}

impl<'a> From<f64> for OptionArg<'a> {
    fn from(value: f64) -> Self {
        OptionArg::Float(value)
    }
}

impl<'a> From<bool> for OptionArg<'a> {
    fn from(value: bool) -> Self {
        OptionArg::Bool(value)
    }
}

/// The one-to-three values of a single `set_option` call.
///
/// Built from a scalar or a tuple:
///
/// ```ignore
/// indigo.set_option("render-comment", "caffeine");
/// indigo.set_option("render-image-size", (250, 250));
/// indigo.set_option("render-background-color", (0.5, 0.7, 0.3));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptionArgs<'a> {
    pub value1: OptionArg<'a>,
    pub value2: Option<OptionArg<'a>>,
    pub value3: Option<OptionArg<'a>>,
}

impl<'a> From<&'a str> for OptionArgs<'a> {
    fn from(value: &'a str) -> Self {
        OptionArg::from(value).into()
    }
}

impl<'a> From<i32> for OptionArgs<'a> {
    fn from(value: i32) -> Self {
        OptionArg::from(value).into()
    }
}

impl<'a> From<i64> for OptionArgs<'a> {
    fn from(value: i64) -> Self {
        OptionArg::from(value).into()
    }
}

impl<'a> From<f32> for OptionArgs<'a> {
    fn from(value: f32) -> Self {
        OptionArg::from(value).into()
    }
}

impl<'a> From<f64> for OptionArgs<'a> {
    fn from(value: f64) -> Self {
        OptionArg::from(value).into()
    }
}

impl<'a> From<bool> for OptionArgs<'a> {
    fn from(value: bool) -> Self {
        OptionArg::from(value).into()
    }
}

impl<'a> From<OptionArg<'a>> for OptionArgs<'a> {
    fn from(value: OptionArg<'a>) -> Self {
        OptionArgs {
            value1: value,
            value2: None,
            value3: None,
        }
    }
}

impl<'a, A, B> From<(A, B)> for OptionArgs<'a>
where
    A: Into<OptionArg<'a>>,
    B: Into<OptionArg<'a>>,
{
    fn from((a, b): (A, B)) -> Self {
        OptionArgs {
            value1: a.into(),
            value2: Some(b.into()),
            value3: None,
        }
    }
}

impl<'a, A, B, C> From<(A, B, C)> for OptionArgs<'a>
where
    A: Into<OptionArg<'a>>,
    B: Into<OptionArg<'a>>,
    C: Into<OptionArg<'a>>,
{
    fn from((a, b, c): (A, B, C)) -> Self {
        OptionArgs {
            value1: a.into(),
            value2: Some(b.into()),
            value3: Some(c.into()),
        }
    }
}
