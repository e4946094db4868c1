// src/ir/display.rs
//
// Display for IR types and ids. Type variables print as `#<index>`; the
// scope-aware rendering with debug names lives in sema.

use std::fmt;

use super::{ConstValue, FunctionId, InterfaceId, RecordId, Type, TypeVarId};

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for InterfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for TypeVarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index())
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => f.write_str("Int"),
            Type::Boolean => f.write_str("Boolean"),
            Type::Bytes => f.write_str("Bytes"),
            Type::Variable(v) => write!(f, "{v}"),
            Type::Compound { record, arguments } => {
                write!(f, "{record}")?;
                if !arguments.is_empty() {
                    f.write_str("[")?;
                    for (i, arg) in arguments.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    f.write_str("]")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Int(v) => write!(f, "{v}"),
            ConstValue::Boolean(v) => write!(f, "{v}"),
            ConstValue::Bytes(bytes) => write!(f, "{:?}", String::from_utf8_lossy(bytes)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compound_type_display() {
        let ty = Type::Compound {
            record: RecordId::new("example.Pair"),
            arguments: vec![Type::Int, Type::Variable(TypeVarId::new(1))],
        };
        assert_eq!(ty.to_string(), "example.Pair[Int, #1]");
    }

    #[test]
    fn bare_compound_omits_brackets() {
        let ty = Type::Compound {
            record: RecordId::new("example.Unit"),
            arguments: vec![],
        };
        assert_eq!(ty.to_string(), "example.Unit");
    }
}
