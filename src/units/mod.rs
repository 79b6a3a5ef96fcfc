//! Physical units.
//!
//! A [`Unit`] is a symbol plus its scale factor relative to the coherent SI unit of the same
//! [`Dimensionality`]. Two units are interchangeable when both the dimensionality and the scale
//! agree; conversion between units is possible whenever the dimensionality agrees.
//!
//! ## Symbols
//! [`Unit::parse`] accepts a base symbol (`s`, `Hz`, `V`, `A`, `m`, `g`, `Ohm`, ...) with an
//! optional SI prefix (`G`, `M`, `k`, `c`, `m`, `u`/`µ`, `n`, `p`):
//!
//! ```text
//! "ms"   -> milli + second     scale 1e-3   dims s
//! "kHz"  -> kilo  + hertz      scale 1e3    dims s^-1
//! "uV"   -> micro + volt       scale 1e-6   dims m^2*kg*s^-3*A^-1
//! "min"  -> minute             scale 60     dims s
//! ""     -> dimensionless
//! ```

use std::str::FromStr;

use compact_str::CompactString;

use crate::units::error::{UnitConversionError, UnitParseError};

pub mod error;
pub mod quantity;

const BASE_SYMBOLS: [&str; 7] = ["m", "kg", "s", "A", "K", "mol", "cd"];

/// Exponents over the seven SI base dimensions
/// (length, mass, time, current, temperature, amount, luminous intensity).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Dimensionality([i8; 7]);

impl Dimensionality {
    pub const NONE: Self = Self([0, 0, 0, 0, 0, 0, 0]);
    pub const LENGTH: Self = Self([1, 0, 0, 0, 0, 0, 0]);
    pub const MASS: Self = Self([0, 1, 0, 0, 0, 0, 0]);
    pub const TIME: Self = Self([0, 0, 1, 0, 0, 0, 0]);
    pub const CURRENT: Self = Self([0, 0, 0, 1, 0, 0, 0]);
    pub const TEMPERATURE: Self = Self([0, 0, 0, 0, 1, 0, 0]);
    pub const AMOUNT: Self = Self([0, 0, 0, 0, 0, 1, 0]);
    pub const LUMINOUS: Self = Self([0, 0, 0, 0, 0, 0, 1]);
    pub const FREQUENCY: Self = Self([0, 0, -1, 0, 0, 0, 0]);
    pub const VOLTAGE: Self = Self([2, 1, -3, -1, 0, 0, 0]);
    pub const RESISTANCE: Self = Self([2, 1, -3, -2, 0, 0, 0]);
    pub const CONDUCTANCE: Self = Self([-2, -1, 3, 2, 0, 0, 0]);
    pub const CAPACITANCE: Self = Self([-2, -1, 4, 2, 0, 0, 0]);
    pub const POWER: Self = Self([2, 1, -3, 0, 0, 0, 0]);

    pub const fn new(exponents: [i8; 7]) -> Self {
        Self(exponents)
    }

    pub const fn exponents(&self) -> [i8; 7] {
        self.0
    }

    pub fn is_dimensionless(&self) -> bool {
        self.0.iter().all(|&e| e == 0)
    }
}

impl std::fmt::Display for Dimensionality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_dimensionless() {
            return f.write_str("dimensionless");
        }
        let mut first = true;
        for (symbol, &exp) in BASE_SYMBOLS.iter().zip(self.0.iter()) {
            if exp == 0 {
                continue;
            }
            if !first {
                f.write_str("*")?;
            }
            first = false;
            if exp == 1 {
                write!(f, "{symbol}")?;
            } else {
                write!(f, "{symbol}^{exp}")?;
            }
        }
        Ok(())
    }
}

const UNITS: &[(&str, f64, Dimensionality)] = &[
    ("dimensionless", 1.0, Dimensionality::NONE),
    ("s", 1.0, Dimensionality::TIME),
    ("min", 60.0, Dimensionality::TIME),
    ("h", 3600.0, Dimensionality::TIME),
    ("Hz", 1.0, Dimensionality::FREQUENCY),
    ("m", 1.0, Dimensionality::LENGTH),
    ("g", 1e-3, Dimensionality::MASS),
    ("A", 1.0, Dimensionality::CURRENT),
    ("V", 1.0, Dimensionality::VOLTAGE),
    ("Ohm", 1.0, Dimensionality::RESISTANCE),
    ("ohm", 1.0, Dimensionality::RESISTANCE),
    ("S", 1.0, Dimensionality::CONDUCTANCE),
    ("F", 1.0, Dimensionality::CAPACITANCE),
    ("W", 1.0, Dimensionality::POWER),
    ("K", 1.0, Dimensionality::TEMPERATURE),
    ("mol", 1.0, Dimensionality::AMOUNT),
    ("cd", 1.0, Dimensionality::LUMINOUS),
];

const PREFIXES: &[(&str, f64)] = &[
    ("G", 1e9),
    ("M", 1e6),
    ("k", 1e3),
    ("c", 1e-2),
    ("m", 1e-3),
    ("u", 1e-6),
    ("µ", 1e-6),
    ("n", 1e-9),
    ("p", 1e-12),
];

fn lookup(symbol: &str) -> Option<(f64, Dimensionality)> {
    UNITS
        .iter()
        .find(|(s, _, _)| *s == symbol)
        .map(|&(_, scale, dims)| (scale, dims))
}

/// A physical unit.
///
/// Equality ignores the symbol: `Unit::parse("ohm") == Unit::parse("Ohm")`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Unit {
    symbol: CompactString,
    scale: f64,
    dimensionality: Dimensionality,
}

impl Unit {
    /// Build a unit from its parts.
    ///
    /// `scale` is the factor that converts a magnitude in this unit into the coherent SI unit.
    pub fn new(symbol: impl Into<CompactString>, scale: f64, dimensionality: Dimensionality) -> Self {
        Self {
            symbol: symbol.into(),
            scale,
            dimensionality,
        }
    }

    pub fn dimensionless() -> Self {
        Self::new("dimensionless", 1.0, Dimensionality::NONE)
    }

    pub fn second() -> Self {
        Self::new("s", 1.0, Dimensionality::TIME)
    }

    pub fn hertz() -> Self {
        Self::new("Hz", 1.0, Dimensionality::FREQUENCY)
    }

    /// Resolve a unit symbol such as `"ms"` or `"uV"`.
    ///
    /// # Errors
    /// Returns [`UnitParseError::UnknownSymbol`] if the symbol is neither a known unit nor a
    /// known prefix followed by a known unit.
    pub fn parse(symbol: &str) -> Result<Self, UnitParseError> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Ok(Self::dimensionless());
        }
        if let Some((scale, dims)) = lookup(symbol) {
            return Ok(Self::new(symbol, scale, dims));
        }
        for &(prefix, factor) in PREFIXES {
            let Some(rest) = symbol.strip_prefix(prefix) else {
                continue;
            };
            if rest == "dimensionless" {
                continue;
            }
            if let Some((scale, dims)) = lookup(rest) {
                return Ok(Self::new(symbol, factor * scale, dims));
            }
        }
        Err(UnitParseError::UnknownSymbol {
            symbol: symbol.to_string(),
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn dimensionality(&self) -> Dimensionality {
        self.dimensionality
    }

    /// Whether magnitudes in `self` can be converted into `other`.
    pub fn is_compatible_with(&self, other: &Unit) -> bool {
        self.dimensionality == other.dimensionality
    }

    /// Factor that converts a magnitude in `self` into a magnitude in `to`.
    ///
    /// # Errors
    /// Returns [`UnitConversionError::Incompatible`] if the dimensionalities differ.
    pub fn conversion_factor(&self, to: &Unit) -> Result<f64, UnitConversionError> {
        if !self.is_compatible_with(to) {
            return Err(UnitConversionError::Incompatible {
                from: self.symbol.clone(),
                from_dims: self.dimensionality.to_string(),
                to: to.symbol.clone(),
                to_dims: to.dimensionality.to_string(),
            });
        }
        Ok(self.scale / to.scale)
    }
}

impl PartialEq for Unit {
    fn eq(&self, other: &Self) -> bool {
        self.dimensionality == other.dimensionality && self.scale == other.scale
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.symbol)
    }
}

impl FromStr for Unit {
    type Err = UnitParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Unit {
    type Error = UnitParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Unit> for String {
    fn from(unit: Unit) -> Self {
        unit.symbol.into()
    }
}
