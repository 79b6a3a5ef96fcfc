use compact_str::CompactString;
use thiserror::Error;

/// Errors returned by [`Unit::parse`](crate::units::Unit::parse).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitParseError {
    /// The symbol is neither a known unit nor a known prefix + unit.
    #[error("unknown unit symbol `{symbol}`")]
    UnknownSymbol { symbol: String },
}

/// Errors returned when converting data between units.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitConversionError {
    /// The two units measure different physical dimensions.
    #[error("unable to convert between units of `{from}` ({from_dims}) and `{to}` ({to_dims})")]
    Incompatible {
        from: CompactString,
        from_dims: String,
        to: CompactString,
        to_dims: String,
    },
    #[error(transparent)]
    Parse(#[from] UnitParseError),
}
