use crate::RuntimeError;
use std::fmt;
use std::str::FromStr;

/// Element type tag attached to every runtime tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    F32,
    F64,
}

impl ElementType {
    /// The tag string the runtime bindings use ("u8", "f32", ...).
    pub fn tag(self) -> &'static str {
        match self {
            ElementType::U8 => "u8",
            ElementType::I8 => "i8",
            ElementType::U16 => "u16",
            ElementType::I16 => "i16",
            ElementType::U32 => "u32",
            ElementType::I32 => "i32",
            ElementType::F32 => "f32",
            ElementType::F64 => "f64",
        }
    }

    pub fn size_in_bytes(self) -> usize {
        match self {
            ElementType::U8 | ElementType::I8 => 1,
            ElementType::U16 | ElementType::I16 => 2,
            ElementType::U32 | ElementType::I32 | ElementType::F32 => 4,
            ElementType::F64 => 8,
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ElementType {
    type Err = RuntimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "u8" => Ok(ElementType::U8),
            "i8" => Ok(ElementType::I8),
            "u16" => Ok(ElementType::U16),
            "i16" => Ok(ElementType::I16),
            "u32" => Ok(ElementType::U32),
            "i32" => Ok(ElementType::I32),
            "f32" => Ok(ElementType::F32),
            "f64" => Ok(ElementType::F64),
            other => Err(RuntimeError::UnsupportedType(other.to_string())),
        }
    }
}
