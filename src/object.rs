//! PDF object types, as far as stream decoding needs them.
//!
//! Parsing objects out of a file happens elsewhere; this module only models
//! the already-parsed values and the accessors the stream layer consumes.

use std::collections::HashMap;

/// A PDF dictionary.
pub type Dictionary = HashMap<String, Object>;

/// PDF object representation.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    /// Null object
    Null,
    /// Boolean value
    Boolean(bool),
    /// Integer value
    Integer(i64),
    /// Real (floating-point) value
    Real(f64),
    /// String (byte array)
    String(Vec<u8>),
    /// Name (starting with /)
    Name(String),
    /// Array of objects
    Array(Vec<Object>),
    /// Dictionary (key-value pairs)
    Dictionary(Dictionary),
    /// Indirect object reference
    Reference(ObjectRef),
}

/// Reference to an indirect object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    /// Object number
    pub id: u32,
    /// Generation number
    pub gen: u16,
}

impl ObjectRef {
    /// Create a new object reference.
    pub fn new(id: u32, gen: u16) -> Self {
        Self { id, gen }
    }
}

impl std::fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} R", self.id, self.gen)
    }
}

impl Object {
    /// Get the type name of this object (without data).
    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Null => "Null",
            Object::Boolean(_) => "Boolean",
            Object::Integer(_) => "Integer",
            Object::Real(_) => "Real",
            Object::String(_) => "String",
            Object::Name(_) => "Name",
            Object::Array(_) => "Array",
            Object::Dictionary(_) => "Dictionary",
            Object::Reference(_) => "Reference",
        }
    }

    /// Create a name object.
    pub fn name(name: impl Into<String>) -> Self {
        Object::Name(name.into())
    }

    /// Try to cast to integer. Reals are truncated, like the PDF number coercion.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Object::Integer(i) => Some(*i),
            Object::Real(r) => Some(*r as i64),
            _ => None,
        }
    }

    /// Try to cast to name.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Object::Name(s) => Some(s),
            _ => None,
        }
    }

    /// Try to cast to dictionary.
    pub fn as_dict(&self) -> Option<&Dictionary> {
        match self {
            Object::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    /// Try to cast to array.
    pub fn as_array(&self) -> Option<&Vec<Object>> {
        match self {
            Object::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Try to cast to reference.
    pub fn as_reference(&self) -> Option<ObjectRef> {
        match self {
            Object::Reference(r) => Some(*r),
            _ => None,
        }
    }

    /// Try to cast to boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Object::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Check if object is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Object::Null)
    }

    /// Check if object is an indirect reference.
    pub fn is_indirect(&self) -> bool {
        matches!(self, Object::Reference(_))
    }

    /// Number of elements if this is an array, 0 otherwise.
    pub fn array_len(&self) -> usize {
        self.as_array().map_or(0, Vec::len)
    }

    /// Element `index` of an array. Out of range and non-arrays give `None`.
    pub fn array_get(&self, index: usize) -> Option<&Object> {
        self.as_array().and_then(|arr| arr.get(index))
    }
}

/// Look up `key`, falling back to its abbreviated spelling `alt`.
///
/// Stream dictionaries may use either `Filter` or `F`, `DecodeParms` or `DP`;
/// the first spelling present wins.
pub fn get_either<'a>(dict: &'a Dictionary, key: &str, alt: &str) -> Option<&'a Object> {
    dict.get(key).or_else(|| dict.get(alt))
}

/// Integer entry of a dictionary, 0 when absent or not a number.
pub fn dict_int(dict: Option<&Dictionary>, key: &str) -> i64 {
    dict.and_then(|d| d.get(key))
        .and_then(Object::as_integer)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_integer() {
        let obj = Object::Integer(42);
        assert_eq!(obj.as_integer(), Some(42));
        assert!(obj.as_name().is_none());
        assert!(!obj.is_null());
    }

    #[test]
    fn test_object_real_coerces_to_integer() {
        assert_eq!(Object::Real(12.9).as_integer(), Some(12));
    }

    #[test]
    fn test_object_name() {
        let obj = Object::name("Type");
        assert_eq!(obj.as_name(), Some("Type"));
        assert!(obj.as_integer().is_none());
    }

    #[test]
    fn test_object_array_access() {
        let obj = Object::Array(vec![Object::Integer(1), Object::Integer(2)]);
        assert_eq!(obj.array_len(), 2);
        assert_eq!(obj.array_get(1), Some(&Object::Integer(2)));
        assert_eq!(obj.array_get(2), None);
        assert_eq!(Object::Null.array_len(), 0);
    }

    #[test]
    fn test_object_reference() {
        let obj_ref = ObjectRef::new(10, 0);
        let obj = Object::Reference(obj_ref);

        assert!(obj.is_indirect());
        assert_eq!(obj.as_reference(), Some(obj_ref));
        assert_eq!(format!("{}", obj_ref), "10 0 R");
    }

    #[test]
    fn test_get_either_prefers_long_spelling() {
        let mut dict = Dictionary::new();
        dict.insert("F".to_string(), Object::name("AHx"));
        assert_eq!(get_either(&dict, "Filter", "F"), Some(&Object::name("AHx")));

        dict.insert("Filter".to_string(), Object::name("FlateDecode"));
        assert_eq!(
            get_either(&dict, "Filter", "F"),
            Some(&Object::name("FlateDecode"))
        );
    }

    #[test]
    fn test_dict_int_defaults_to_zero() {
        let mut dict = Dictionary::new();
        dict.insert("Length".to_string(), Object::Integer(100));
        assert_eq!(dict_int(Some(&dict), "Length"), 100);
        assert_eq!(dict_int(Some(&dict), "Missing"), 0);
        assert_eq!(dict_int(None, "Length"), 0);
    }
}
