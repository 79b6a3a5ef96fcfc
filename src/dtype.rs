/// Element kind of an annotation array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum DataType {
    I64,
    F64,
    Bool,
    Utf8,
    Timestamp,
    /// `f64` magnitudes sharing one unit.
    Quantity,
    /// Heterogeneous simple values (mixed kinds, mappings, nulls).
    Object,
}

impl DataType {
    pub const fn name(&self) -> &'static str {
        match self {
            DataType::I64 => "int64",
            DataType::F64 => "float64",
            DataType::Bool => "bool",
            DataType::Utf8 => "str",
            DataType::Timestamp => "datetime",
            DataType::Quantity => "quantity",
            DataType::Object => "object",
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
