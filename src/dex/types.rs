// Tue Oct 13 2026 - Alex

use serde::{Deserialize, Serialize};

/// Fundamental kind of a type descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Fundamental {
    Boolean,
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Void,
    Class,
    Array,
    Unknown,
}

impl Fundamental {
    pub fn of(descriptor: &str) -> Self {
        match descriptor.as_bytes().first() {
            Some(b'Z') => Fundamental::Boolean,
            Some(b'B') => Fundamental::Byte,
            Some(b'C') => Fundamental::Char,
            Some(b'D') => Fundamental::Double,
            Some(b'F') => Fundamental::Float,
            Some(b'I') => Fundamental::Int,
            Some(b'J') => Fundamental::Long,
            Some(b'S') => Fundamental::Short,
            Some(b'V') => Fundamental::Void,
            Some(b'L') if descriptor.ends_with(';') => Fundamental::Class,
            Some(b'[') => Fundamental::Array,
            _ => Fundamental::Unknown,
        }
    }

    pub fn is_wide(&self) -> bool {
        matches!(self, Fundamental::Long | Fundamental::Double)
    }
}

/// Java source spelling of a descriptor: `Ljava/lang/String;` becomes
/// `java.lang.String`, `[[I` becomes `int[][]`.
pub fn pretty_type(descriptor: &str) -> String {
    let dims = descriptor.bytes().take_while(|&b| b == b'[').count();
    let element = &descriptor[dims..];
    let base = match Fundamental::of(element) {
        Fundamental::Boolean => "boolean".to_string(),
        Fundamental::Byte => "byte".to_string(),
        Fundamental::Char => "char".to_string(),
        Fundamental::Double => "double".to_string(),
        Fundamental::Float => "float".to_string(),
        Fundamental::Int => "int".to_string(),
        Fundamental::Long => "long".to_string(),
        Fundamental::Short => "short".to_string(),
        Fundamental::Void => "void".to_string(),
        Fundamental::Class => element[1..element.len() - 1].replace('/', "."),
        Fundamental::Array | Fundamental::Unknown => element.to_string(),
    };
    let mut out = base;
    for _ in 0..dims {
        out.push_str("[]");
    }
    out
}

/// Class descriptor named by a type, looking through array dimensions.
pub fn referenced_class(descriptor: &str) -> Option<&str> {
    let element = descriptor.trim_start_matches('[');
    match Fundamental::of(element) {
        Fundamental::Class => Some(element),
        _ => None,
    }
}

pub fn is_class_descriptor(descriptor: &str) -> bool {
    Fundamental::of(descriptor) == Fundamental::Class
}
