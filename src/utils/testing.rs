// Wed Oct 14 2026 - Alex

//! Synthetic DEX images for unit tests.

use crate::dex::header::{ENDIAN_CONSTANT, HEADER_SIZE};
use crate::dex::DexHeader;
use crate::reader::{mutf8, NO_INDEX};
use ahash::AHashMap;

pub fn uleb128(mut value: u32) -> Vec<u8> {
    let mut out = Vec::new();
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return out;
        }
        out.push(byte | 0x80);
    }
}

pub fn sleb128(mut value: i32) -> Vec<u8> {
    let mut out = Vec::new();
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        let done = (value == 0 && byte & 0x40 == 0) || (value == -1 && byte & 0x40 != 0);
        if done {
            out.push(byte);
            return out;
        }
        out.push(byte | 0x80);
    }
}

#[derive(Debug, Clone, Default)]
pub struct TrySpec {
    pub start_addr: u32,
    pub insn_count: u16,
    pub handlers: Vec<(u32, u32)>,
    pub catch_all: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct CodeSpec {
    pub registers: u16,
    pub ins: u16,
    pub outs: u16,
    pub insns: Vec<u16>,
    pub tries: Vec<TrySpec>,
}

impl CodeSpec {
    pub fn new(registers: u16, insns: Vec<u16>) -> Self {
        Self {
            registers,
            insns,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct MethodSpec {
    pub method_idx: u32,
    pub access: u32,
    pub code: Option<CodeSpec>,
    /// Replaces the computed `code_off` (for corrupt-offset tests).
    pub raw_code_off: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct ClassSpec {
    pub class_idx: u32,
    pub access: u32,
    pub superclass: Option<u32>,
    pub interfaces: Vec<u32>,
    pub source_file: Option<u32>,
    pub static_fields: Vec<(u32, u32)>,
    pub instance_fields: Vec<(u32, u32)>,
    pub direct_methods: Vec<MethodSpec>,
    pub virtual_methods: Vec<MethodSpec>,
    /// Encoded array bytes for `static_values_off`.
    pub static_values: Option<Vec<u8>>,
}

impl ClassSpec {
    fn has_class_data(&self) -> bool {
        !(self.static_fields.is_empty()
            && self.instance_fields.is_empty()
            && self.direct_methods.is_empty()
            && self.virtual_methods.is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct DexBuilder {
    version: [u8; 3],
    strings: Vec<String>,
    string_index: AHashMap<String, u32>,
    types: Vec<u32>,
    type_index: AHashMap<u32, u32>,
    protos: Vec<(u32, u32, Vec<u32>)>,
    fields: Vec<(u16, u16, u32)>,
    methods: Vec<(u16, u16, u32)>,
    classes: Vec<ClassSpec>,
}

impl Default for DexBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DexBuilder {
    pub fn new() -> Self {
        Self {
            version: *b"035",
            strings: Vec::new(),
            string_index: AHashMap::new(),
            types: Vec::new(),
            type_index: AHashMap::new(),
            protos: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            classes: Vec::new(),
        }
    }

    pub fn with_version(mut self, version: &[u8; 3]) -> Self {
        self.version = *version;
        self
    }

    pub fn string(&mut self, value: &str) -> u32 {
        if let Some(&idx) = self.string_index.get(value) {
            return idx;
        }
        let idx = self.strings.len() as u32;
        self.strings.push(value.to_string());
        self.string_index.insert(value.to_string(), idx);
        idx
    }

    pub fn type_id(&mut self, descriptor: &str) -> u32 {
        let string_idx = self.string(descriptor);
        if let Some(&idx) = self.type_index.get(&string_idx) {
            return idx;
        }
        let idx = self.types.len() as u32;
        self.types.push(string_idx);
        self.type_index.insert(string_idx, idx);
        idx
    }

    pub fn proto(&mut self, return_type: &str, params: &[&str]) -> u32 {
        let shorty: String = std::iter::once(return_type)
            .chain(params.iter().copied())
            .map(|t| match t.as_bytes()[0] {
                b'[' => 'L',
                c => c as char,
            })
            .collect();
        let shorty_idx = self.string(&shorty);
        let return_idx = self.type_id(return_type);
        let param_idxs: Vec<u32> = params.iter().map(|p| self.type_id(p)).collect();
        let key = (shorty_idx, return_idx, param_idxs);
        if let Some(pos) = self.protos.iter().position(|p| *p == key) {
            return pos as u32;
        }
        self.protos.push(key);
        (self.protos.len() - 1) as u32
    }

    pub fn field(&mut self, class: &str, type_descriptor: &str, name: &str) -> u32 {
        let class_idx = self.type_id(class) as u16;
        let type_idx = self.type_id(type_descriptor) as u16;
        let name_idx = self.string(name);
        self.raw_field(class_idx, type_idx, name_idx)
    }

    pub fn raw_field(&mut self, class_idx: u16, type_idx: u16, name_idx: u32) -> u32 {
        self.fields.push((class_idx, type_idx, name_idx));
        (self.fields.len() - 1) as u32
    }

    pub fn method(&mut self, class: &str, name: &str, return_type: &str, params: &[&str]) -> u32 {
        let class_idx = self.type_id(class) as u16;
        let proto_idx = self.proto(return_type, params) as u16;
        let name_idx = self.string(name);
        self.raw_method(class_idx, proto_idx, name_idx)
    }

    pub fn raw_method(&mut self, class_idx: u16, proto_idx: u16, name_idx: u32) -> u32 {
        self.methods.push((class_idx, proto_idx, name_idx));
        (self.methods.len() - 1) as u32
    }

    /// Adds a class definition and returns its position in the table.
    pub fn class(&mut self, name: &str, superclass: Option<&str>) -> usize {
        let class_idx = self.type_id(name);
        let superclass = superclass.map(|s| self.type_id(s));
        self.classes.push(ClassSpec {
            class_idx,
            access: 0x0001,
            superclass,
            ..Default::default()
        });
        self.classes.len() - 1
    }

    pub fn class_mut(&mut self, pos: usize) -> &mut ClassSpec {
        &mut self.classes[pos]
    }

    pub fn add_direct_method(&mut self, class: usize, method_idx: u32, access: u32, code: Option<CodeSpec>) {
        self.classes[class].direct_methods.push(MethodSpec {
            method_idx,
            access,
            code,
            raw_code_off: None,
        });
    }

    pub fn add_virtual_method(&mut self, class: usize, method_idx: u32, access: u32, code: Option<CodeSpec>) {
        self.classes[class].virtual_methods.push(MethodSpec {
            method_idx,
            access,
            code,
            raw_code_off: None,
        });
    }

    pub fn build(&self) -> Vec<u8> {
        let string_ids_off = HEADER_SIZE;
        let type_ids_off = string_ids_off + self.strings.len() * 4;
        let proto_ids_off = type_ids_off + self.types.len() * 4;
        let field_ids_off = proto_ids_off + self.protos.len() * 12;
        let method_ids_off = field_ids_off + self.fields.len() * 8;
        let class_defs_off = method_ids_off + self.methods.len() * 8;
        let data_off = class_defs_off + self.classes.len() * 32;

        let mut data = DataSection::new(data_off);

        let string_offsets: Vec<u32> = self
            .strings
            .iter()
            .map(|s| {
                let off = data.position();
                data.bytes(&uleb128(s.encode_utf16().count() as u32));
                data.bytes(&mutf8::encode(s));
                data.bytes(&[0]);
                off
            })
            .collect();

        let proto_params: Vec<u32> = self
            .protos
            .iter()
            .map(|(_, _, params)| data.type_list(params))
            .collect();

        let mut class_entries = Vec::with_capacity(self.classes.len());
        for class in &self.classes {
            let interfaces_off = data.type_list(&class.interfaces);
            let direct_offs: Vec<u32> = class.direct_methods.iter().map(|m| data.code(m)).collect();
            let virtual_offs: Vec<u32> = class.virtual_methods.iter().map(|m| data.code(m)).collect();

            let class_data_off = if class.has_class_data() {
                let off = data.position();
                data.bytes(&uleb128(class.static_fields.len() as u32));
                data.bytes(&uleb128(class.instance_fields.len() as u32));
                data.bytes(&uleb128(class.direct_methods.len() as u32));
                data.bytes(&uleb128(class.virtual_methods.len() as u32));
                data.field_list(&class.static_fields);
                data.field_list(&class.instance_fields);
                data.method_list(&class.direct_methods, &direct_offs);
                data.method_list(&class.virtual_methods, &virtual_offs);
                off
            } else {
                0
            };

            let static_values_off = match &class.static_values {
                Some(bytes) => {
                    let off = data.position();
                    data.bytes(bytes);
                    off
                }
                None => 0,
            };

            class_entries.push((interfaces_off, class_data_off, static_values_off));
        }
        data.align(4);

        let data_bytes = data.finish();
        let file_size = data_off + data_bytes.len();

        let mut out = Vec::with_capacity(file_size);
        out.extend_from_slice(b"dex\n");
        out.extend_from_slice(&self.version);
        out.push(0);
        out.extend_from_slice(&[0u8; 4]);
        out.extend_from_slice(&[0u8; 20]);
        put_u32(&mut out, file_size as u32);
        put_u32(&mut out, HEADER_SIZE as u32);
        put_u32(&mut out, ENDIAN_CONSTANT);
        put_u32(&mut out, 0);
        put_u32(&mut out, 0);
        put_u32(&mut out, 0);
        for (count, off) in [
            (self.strings.len(), string_ids_off),
            (self.types.len(), type_ids_off),
            (self.protos.len(), proto_ids_off),
            (self.fields.len(), field_ids_off),
            (self.methods.len(), method_ids_off),
            (self.classes.len(), class_defs_off),
        ] {
            put_u32(&mut out, count as u32);
            put_u32(&mut out, if count == 0 { 0 } else { off as u32 });
        }
        put_u32(&mut out, data_bytes.len() as u32);
        put_u32(&mut out, data_off as u32);
        debug_assert_eq!(out.len(), HEADER_SIZE);

        for off in &string_offsets {
            put_u32(&mut out, *off);
        }
        for string_idx in &self.types {
            put_u32(&mut out, *string_idx);
        }
        for ((shorty, ret, _), params_off) in self.protos.iter().zip(&proto_params) {
            put_u32(&mut out, *shorty);
            put_u32(&mut out, *ret);
            put_u32(&mut out, *params_off);
        }
        for (class_idx, type_idx, name_idx) in &self.fields {
            put_u16(&mut out, *class_idx);
            put_u16(&mut out, *type_idx);
            put_u32(&mut out, *name_idx);
        }
        for (class_idx, proto_idx, name_idx) in &self.methods {
            put_u16(&mut out, *class_idx);
            put_u16(&mut out, *proto_idx);
            put_u32(&mut out, *name_idx);
        }
        for (class, (interfaces_off, class_data_off, static_values_off)) in
            self.classes.iter().zip(&class_entries)
        {
            put_u32(&mut out, class.class_idx);
            put_u32(&mut out, class.access);
            put_u32(&mut out, class.superclass.unwrap_or(NO_INDEX));
            put_u32(&mut out, *interfaces_off);
            put_u32(&mut out, class.source_file.unwrap_or(NO_INDEX));
            put_u32(&mut out, 0);
            put_u32(&mut out, *class_data_off);
            put_u32(&mut out, *static_values_off);
        }
        debug_assert_eq!(out.len(), data_off);
        out.extend_from_slice(&data_bytes);

        let checksum = DexHeader::compute_checksum(&out);
        out[8..12].copy_from_slice(&checksum.to_le_bytes());
        out
    }
}

fn put_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

struct DataSection {
    base: usize,
    buf: Vec<u8>,
}

impl DataSection {
    fn new(base: usize) -> Self {
        Self { base, buf: Vec::new() }
    }

    fn position(&self) -> u32 {
        (self.base + self.buf.len()) as u32
    }

    fn align(&mut self, alignment: usize) {
        while (self.base + self.buf.len()) % alignment != 0 {
            self.buf.push(0);
        }
    }

    fn bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    fn type_list(&mut self, types: &[u32]) -> u32 {
        if types.is_empty() {
            return 0;
        }
        self.align(4);
        let off = self.position();
        put_u32(&mut self.buf, types.len() as u32);
        for t in types {
            put_u16(&mut self.buf, *t as u16);
        }
        off
    }

    fn code(&mut self, method: &MethodSpec) -> u32 {
        if let Some(raw) = method.raw_code_off {
            return raw;
        }
        let Some(code) = &method.code else {
            return 0;
        };
        self.align(4);
        let off = self.position();
        put_u16(&mut self.buf, code.registers);
        put_u16(&mut self.buf, code.ins);
        put_u16(&mut self.buf, code.outs);
        put_u16(&mut self.buf, code.tries.len() as u16);
        put_u32(&mut self.buf, 0);
        put_u32(&mut self.buf, code.insns.len() as u32);
        for unit in &code.insns {
            put_u16(&mut self.buf, *unit);
        }
        if code.tries.is_empty() {
            return off;
        }
        if code.insns.len() % 2 == 1 {
            put_u16(&mut self.buf, 0);
        }

        let mut handlers = uleb128(code.tries.len() as u32);
        let mut handler_offs = Vec::with_capacity(code.tries.len());
        for t in &code.tries {
            handler_offs.push(handlers.len() as u16);
            let count = t.handlers.len() as i32;
            let size = if t.catch_all.is_some() { -count } else { count };
            handlers.extend(sleb128(size));
            for (type_idx, addr) in &t.handlers {
                handlers.extend(uleb128(*type_idx));
                handlers.extend(uleb128(*addr));
            }
            if let Some(addr) = t.catch_all {
                handlers.extend(uleb128(addr));
            }
        }
        for (t, handler_off) in code.tries.iter().zip(handler_offs) {
            put_u32(&mut self.buf, t.start_addr);
            put_u16(&mut self.buf, t.insn_count);
            put_u16(&mut self.buf, handler_off);
        }
        self.buf.extend(handlers);
        off
    }

    fn field_list(&mut self, fields: &[(u32, u32)]) {
        let mut prev = 0u32;
        for (idx, access) in fields {
            self.bytes(&uleb128(idx.wrapping_sub(prev)));
            self.bytes(&uleb128(*access));
            prev = *idx;
        }
    }

    fn method_list(&mut self, methods: &[MethodSpec], code_offs: &[u32]) {
        let mut prev = 0u32;
        for (method, code_off) in methods.iter().zip(code_offs) {
            self.bytes(&uleb128(method.method_idx.wrapping_sub(prev)));
            self.bytes(&uleb128(method.access));
            self.bytes(&uleb128(*code_off));
            prev = method.method_idx;
        }
    }

    fn finish(self) -> Vec<u8> {
        self.buf
    }
}

/// One class `Lfoo/Bar;` extending `Ljava/lang/Object;` with a single
/// method `baz()V` whose body is `return-void`.
pub fn minimal_dex() -> Vec<u8> {
    let mut builder = DexBuilder::new();
    let class = builder.class("Lfoo/Bar;", Some("Ljava/lang/Object;"));
    let baz = builder.method("Lfoo/Bar;", "baz", "V", &[]);
    builder.add_direct_method(class, baz, 0x0001, Some(CodeSpec::new(1, vec![0x000e])));
    builder.build()
}
