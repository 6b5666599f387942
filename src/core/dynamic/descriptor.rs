use std::fmt;

/// Structural type of a [`Node`](super::Node), derived on demand from its variant.
///
/// `Dynamic` stands for a null: it carries no shape of its own.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeDescriptor {
    Dynamic,
    Bool,
    Number,
    String,
    Object(Vec<(String, TypeDescriptor)>),
    Tuple(Vec<TypeDescriptor>),
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Dynamic => f.write_str("dynamic"),
            TypeDescriptor::Bool => f.write_str("bool"),
            TypeDescriptor::Number => f.write_str("number"),
            TypeDescriptor::String => f.write_str("string"),
            TypeDescriptor::Object(fields) => {
                f.write_str("object({")?;
                for (idx, (key, descriptor)) in fields.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    if super::is_plain_key(key) {
                        f.write_str(key)?;
                    } else {
                        f.write_str(&super::quote_key(key))?;
                    }
                    write!(f, ": {descriptor}")?;
                }
                f.write_str("})")
            }
            TypeDescriptor::Tuple(elements) => {
                f.write_str("tuple([")?;
                for (idx, descriptor) in elements.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{descriptor}")?;
                }
                f.write_str("])")
            }
        }
    }
}
