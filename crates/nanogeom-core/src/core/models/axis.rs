use nalgebra::Vector3;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[error("Invalid axis '{0}'. Expected x, y or z with an optional '+' or '-' prefix.")]
pub struct AxisParseError(pub String);

/// A Cartesian axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn unit(self) -> Vector3<f64> {
        match self {
            Axis::X => Vector3::x(),
            Axis::Y => Vector3::y(),
            Axis::Z => Vector3::z(),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Axis {
    type Err = AxisParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "x" => Ok(Axis::X),
            "y" => Ok(Axis::Y),
            "z" => Ok(Axis::Z),
            _ => Err(AxisParseError(s.to_string())),
        }
    }
}

/// An axis together with a direction of travel along it.
///
/// Parsed from strings such as `"+x"`, `"-z"` or plain `"y"` (positive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignedAxis {
    pub axis: Axis,
    pub negative: bool,
}

impl SignedAxis {
    pub const fn positive(axis: Axis) -> Self {
        Self {
            axis,
            negative: false,
        }
    }

    pub const fn negative(axis: Axis) -> Self {
        Self {
            axis,
            negative: true,
        }
    }

    /// Unit vector pointing in the signed direction.
    pub fn direction(self) -> Vector3<f64> {
        if self.negative {
            -self.axis.unit()
        } else {
            self.axis.unit()
        }
    }

    pub fn flipped(self) -> Self {
        Self {
            axis: self.axis,
            negative: !self.negative,
        }
    }
}

impl fmt::Display for SignedAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.negative { '-' } else { '+' };
        write!(f, "{}{}", sign, self.axis)
    }
}

impl FromStr for SignedAxis {
    type Err = AxisParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (negative, rest) = match trimmed.chars().next() {
            Some('-') => (true, &trimmed[1..]),
            Some('+') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };
        let axis = rest
            .parse::<Axis>()
            .map_err(|_| AxisParseError(s.to_string()))?;
        Ok(Self { axis, negative })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_signed_and_unsigned_axes() {
        assert_eq!("+x".parse(), Ok(SignedAxis::positive(Axis::X)));
        assert_eq!("-Z".parse(), Ok(SignedAxis::negative(Axis::Z)));
        assert_eq!("y".parse(), Ok(SignedAxis::positive(Axis::Y)));
    }

    #[test]
    fn rejects_unknown_axes() {
        assert!("w".parse::<SignedAxis>().is_err());
        assert!("+".parse::<SignedAxis>().is_err());
        assert!("--x".parse::<SignedAxis>().is_err());
    }

    #[test]
    fn direction_respects_sign() {
        assert_eq!(SignedAxis::negative(Axis::Y).direction(), -Vector3::y());
        assert_eq!(SignedAxis::positive(Axis::Z).flipped().direction(), -Vector3::z());
    }

    #[test]
    fn display_always_includes_sign() {
        assert_eq!(SignedAxis::positive(Axis::X).to_string(), "+x");
        assert_eq!(SignedAxis::negative(Axis::Z).to_string(), "-z");
    }
}
