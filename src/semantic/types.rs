use std::fmt;

/// Builtin scalar types, plus the two sentinels: `Unit` for value-less
/// positions and `Unknown` for subtrees that already failed analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinType {
    Int,
    Float,
    String,
    Bool,
    Unit,
    Unknown,
}

/// A resolved semantic type, distinct from the parsed annotation
/// [`crate::parser::Type`].
#[derive(Debug, Clone)]
pub enum TypeInfo {
    Builtin(BuiltinType),
    Reference {
        mutable: bool,
        pointed_to: Box<TypeInfo>,
        /// Lifetime of the scope the borrow was taken in. Not part of the
        /// type's identity; see the manual `PartialEq`.
        lifetime_id: usize,
    },
    Function {
        parameters: Vec<TypeInfo>,
        return_type: Box<TypeInfo>,
    },
    /// Reserved. User-defined structs are not in the surface language yet.
    Struct {
        name: String,
        field_names: Vec<String>,
        field_types: Vec<TypeInfo>,
    },
}

impl TypeInfo {
    pub fn unknown() -> TypeInfo {
        TypeInfo::Builtin(BuiltinType::Unknown)
    }

    pub fn unit() -> TypeInfo {
        TypeInfo::Builtin(BuiltinType::Unit)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, TypeInfo::Builtin(BuiltinType::Unknown))
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            TypeInfo::Builtin(BuiltinType::Int) | TypeInfo::Builtin(BuiltinType::Float)
        )
    }

    pub fn is_comparable(&self) -> bool {
        matches!(
            self,
            TypeInfo::Builtin(BuiltinType::Int)
                | TypeInfo::Builtin(BuiltinType::Float)
                | TypeInfo::Builtin(BuiltinType::String)
                | TypeInfo::Builtin(BuiltinType::Bool)
        )
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, TypeInfo::Builtin(BuiltinType::Bool))
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, TypeInfo::Reference { .. })
    }

    /// A reference type is borrowed; everything else is owned.
    pub fn is_borrowed(&self) -> bool {
        self.is_reference()
    }

    pub fn is_owned(&self) -> bool {
        !self.is_reference()
    }

    /// Assignability is structural equality; there is no implicit
    /// numeric coercion.
    pub fn is_assignable_to(&self, target: &TypeInfo) -> bool {
        self == target
    }
}

// Structural equality. Reference lifetimes are scope bookkeeping, not part
// of the type, so they are deliberately excluded.
impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TypeInfo::Builtin(a), TypeInfo::Builtin(b)) => a == b,
            (
                TypeInfo::Reference { mutable: a_mut, pointed_to: a_inner, .. },
                TypeInfo::Reference { mutable: b_mut, pointed_to: b_inner, .. },
            ) => a_mut == b_mut && a_inner == b_inner,
            (
                TypeInfo::Function { parameters: a_params, return_type: a_ret },
                TypeInfo::Function { parameters: b_params, return_type: b_ret },
            ) => a_params == b_params && a_ret == b_ret,
            (TypeInfo::Struct { name: a, .. }, TypeInfo::Struct { name: b, .. }) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TypeInfo::Builtin(BuiltinType::Int) => write!(f, "int"),
            TypeInfo::Builtin(BuiltinType::Float) => write!(f, "float"),
            TypeInfo::Builtin(BuiltinType::String) => write!(f, "string"),
            TypeInfo::Builtin(BuiltinType::Bool) => write!(f, "bool"),
            TypeInfo::Builtin(BuiltinType::Unit) => write!(f, "()"),
            TypeInfo::Builtin(BuiltinType::Unknown) => write!(f, "unknown"),
            TypeInfo::Reference { mutable, pointed_to, .. } => {
                if *mutable {
                    write!(f, "&mut {}", pointed_to)
                } else {
                    write!(f, "&{}", pointed_to)
                }
            }
            TypeInfo::Function { parameters, return_type } => {
                write!(f, "func(")?;
                for (i, param) in parameters.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", param)?;
                }
                write!(f, ") -> {}", return_type)
            }
            TypeInfo::Struct { name, .. } => write!(f, "struct {}", name),
        }
    }
}
