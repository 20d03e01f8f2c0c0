// Wed Oct 14 2026 - Alex

use crate::dex::types::{pretty_type, Fundamental};
use crate::dex::{AccessFlags, EncodedValue, Prototype};

/// Dense id of a class: its position in the class-definition table.
pub type ClassId = u32;

#[derive(Debug, Clone)]
pub struct Class {
    pub id: ClassId,
    pub type_idx: u32,
    pub name: String,
    pub superclass: Option<String>,
    pub superclass_idx: Option<u32>,
    pub access_flags: AccessFlags,
    pub interfaces: Vec<String>,
    pub source_file: Option<String>,
    pub static_fields: Vec<Field>,
    pub instance_fields: Vec<Field>,
    pub direct_methods: Vec<Method>,
    pub virtual_methods: Vec<Method>,
}

impl Class {
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.static_fields.iter().chain(self.instance_fields.iter())
    }

    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.direct_methods.iter().chain(self.virtual_methods.iter())
    }

    pub fn method_count(&self) -> usize {
        self.direct_methods.len() + self.virtual_methods.len()
    }

    pub fn field_count(&self) -> usize {
        self.static_fields.len() + self.instance_fields.len()
    }

    pub fn is_interface(&self) -> bool {
        self.access_flags.is_interface()
    }

    pub fn java_name(&self) -> String {
        pretty_type(&self.name)
    }
}

#[derive(Debug, Clone)]
pub struct Field {
    pub field_idx: u32,
    pub class_id: ClassId,
    pub class_name: String,
    pub name: String,
    pub type_descriptor: String,
    pub fundamental: Fundamental,
    pub access_flags: AccessFlags,
    /// Only set for static fields with an entry in `static_values`.
    pub static_value: Option<EncodedValue>,
}

impl Field {
    pub fn full_name(&self) -> String {
        format!("{}->{}:{}", self.class_name, self.name, self.type_descriptor)
    }

    pub fn pretty_type(&self) -> String {
        pretty_type(&self.type_descriptor)
    }

    pub fn is_static(&self) -> bool {
        self.access_flags.is_static()
    }
}

/// Location and frame metadata of a method's `code_item`. The instruction
/// units themselves stay in the file buffer until disassembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeInfo {
    pub offset: u32,
    pub registers_size: u16,
    pub ins_size: u16,
    pub outs_size: u16,
    pub tries_size: u16,
    pub debug_info_off: u32,
    pub insns_size: u32,
}

impl CodeInfo {
    pub const HEADER_SIZE: usize = 16;

    pub fn insns_offset(&self) -> usize {
        self.offset as usize + Self::HEADER_SIZE
    }

    pub fn insns_len_bytes(&self) -> usize {
        self.insns_size as usize * 2
    }

    /// Offset of the first `try_item`, after the optional alignment unit.
    pub fn tries_offset(&self) -> usize {
        let end = self.insns_offset() + self.insns_len_bytes();
        (end + 3) & !3
    }
}

#[derive(Debug, Clone)]
pub struct Method {
    pub method_idx: u32,
    pub class_id: ClassId,
    pub class_name: String,
    pub name: String,
    pub prototype: Prototype,
    pub access_flags: AccessFlags,
    pub code: Option<CodeInfo>,
}

impl Method {
    /// `Lfoo/Bar;->baz(I)V`
    pub fn dalvik_name(&self) -> String {
        format!("{}->{}{}", self.class_name, self.name, self.prototype)
    }

    /// `void foo.Bar.baz(int)`
    pub fn demangled_name(&self) -> String {
        let params: Vec<String> = self
            .prototype
            .parameters
            .iter()
            .map(|p| pretty_type(p))
            .collect();
        format!(
            "{} {}.{}({})",
            pretty_type(&self.prototype.return_type),
            pretty_type(&self.class_name),
            self.name,
            params.join(", ")
        )
    }

    pub fn descriptor(&self) -> String {
        self.prototype.descriptor()
    }

    pub fn is_abstract(&self) -> bool {
        self.access_flags.is_abstract()
    }

    pub fn is_native(&self) -> bool {
        self.access_flags.is_native()
    }

    pub fn registers_size(&self) -> u16 {
        self.code.map(|c| c.registers_size).unwrap_or(0)
    }

    pub fn ins_size(&self) -> u16 {
        self.code.map(|c| c.ins_size).unwrap_or(0)
    }
}
