//! Resolved snapshot: one value or marker per well-known parameter.

use core::fmt;

use super::param::Param;

/// A resolved parameter value.
///
/// `Undefined` means the parameter has no complete, type-correct path from a
/// source. It is never conflated with zero.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParamValue {
    /// A resolved number.
    Defined(f32),
    /// No satisfied path.
    Undefined,
}

impl ParamValue {
    /// Returns the number, or `None` when undefined.
    pub fn value(self) -> Option<f32> {
        match self {
            ParamValue::Defined(v) => Some(v),
            ParamValue::Undefined => None,
        }
    }

    /// Returns true if the value is defined.
    pub fn is_defined(self) -> bool {
        matches!(self, ParamValue::Defined(_))
    }

    /// Returns the number, or `NaN` when undefined.
    ///
    /// For consumers that carry "undefined" in-band as a float.
    pub fn to_f32_or_nan(self) -> f32 {
        self.value().unwrap_or(f32::NAN)
    }
}

impl From<Option<f32>> for ParamValue {
    fn from(value: Option<f32>) -> Self {
        value.map_or(ParamValue::Undefined, ParamValue::Defined)
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Defined(v) => write!(f, "{v}"),
            ParamValue::Undefined => f.write_str("undefined"),
        }
    }
}

/// Flat parameter map produced by one recompute pass.
///
/// Always holds exactly one entry per [`Param`], in [`Param::ALL`] order. A
/// snapshot is a plain value with no link back to the graph.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    values: [ParamValue; Param::COUNT],
}

impl Snapshot {
    /// A snapshot with every parameter undefined.
    pub fn undefined() -> Self {
        Self {
            values: [ParamValue::Undefined; Param::COUNT],
        }
    }

    /// Returns the value for a parameter.
    pub fn get(&self, param: Param) -> ParamValue {
        self.values[param.index()]
    }

    /// Sets the value for a parameter.
    pub fn set(&mut self, param: Param, value: ParamValue) {
        self.values[param.index()] = value;
    }

    /// Iterates `(param, value)` pairs in wire order.
    pub fn iter(&self) -> impl Iterator<Item = (Param, ParamValue)> + '_ {
        Param::ALL.into_iter().zip(self.values.iter().copied())
    }

    /// Number of defined parameters.
    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_defined()).count()
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::undefined()
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (param, value) in self.iter() {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            write!(f, "{param}={value}")?;
        }
        Ok(())
    }
}
