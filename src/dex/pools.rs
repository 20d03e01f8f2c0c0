// Tue Oct 13 2026 - Alex

use crate::dex::{DexHeader, ParseIssue, PoolKind};
use crate::reader::{BinaryReader, ReaderError};
use std::fmt;

#[derive(Debug, Clone, Default)]
pub struct StringPool {
    strings: Vec<String>,
}

impl StringPool {
    pub fn get(&self, idx: u32) -> Option<&str> {
        self.strings.get(idx as usize).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.strings.iter().map(|s| s.as_str())
    }
}

/// Index-addressed table whose entries may be missing when the record
/// pointed at something outside its target pool.
#[derive(Debug, Clone)]
pub struct IdPool<T> {
    entries: Vec<Option<T>>,
}

impl<T> IdPool<T> {
    pub fn get(&self, idx: u32) -> Option<&T> {
        self.entries.get(idx as usize).and_then(|e| e.as_ref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &T)> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.as_ref().map(|e| (i as u32, e)))
    }
}

impl<T> Default for IdPool<T> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Prototype {
    pub shorty: String,
    pub return_type: String,
    pub parameters: Vec<String>,
}

impl Prototype {
    pub fn descriptor(&self) -> String {
        format!("({}){}", self.parameters.concat(), self.return_type)
    }
}

impl fmt::Display for Prototype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}){}", self.parameters.concat(), self.return_type)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldRef {
    pub class_idx: u32,
    pub type_idx: u32,
    pub name_idx: u32,
    pub class_name: String,
    pub type_descriptor: String,
    pub name: String,
}

impl FieldRef {
    /// `Lfoo/Bar;->count:I`
    pub fn full_name(&self) -> String {
        format!("{}->{}:{}", self.class_name, self.name, self.type_descriptor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodRef {
    pub class_idx: u32,
    pub proto_idx: u32,
    pub name_idx: u32,
    pub class_name: String,
    pub name: String,
    pub prototype: Prototype,
}

impl MethodRef {
    /// Canonical Dalvik signature, `Lfoo/Bar;->baz(I)V`.
    pub fn dalvik_name(&self) -> String {
        format!("{}->{}{}", self.class_name, self.name, self.prototype)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Pools {
    pub strings: StringPool,
    pub types: IdPool<String>,
    pub protos: IdPool<Prototype>,
    pub fields: IdPool<FieldRef>,
    pub methods: IdPool<MethodRef>,
}

impl Pools {
    pub fn string(&self, idx: u32) -> Option<&str> {
        self.strings.get(idx)
    }

    pub fn type_name(&self, idx: u32) -> Option<&str> {
        self.types.get(idx).map(|s| s.as_str())
    }

    pub fn proto(&self, idx: u32) -> Option<&Prototype> {
        self.protos.get(idx)
    }

    pub fn field(&self, idx: u32) -> Option<&FieldRef> {
        self.fields.get(idx)
    }

    pub fn method(&self, idx: u32) -> Option<&MethodRef> {
        self.methods.get(idx)
    }

    pub fn size_of(&self, kind: PoolKind) -> usize {
        match kind {
            PoolKind::Strings => self.strings.len(),
            PoolKind::Types => self.types.len(),
            PoolKind::Protos => self.protos.len(),
            PoolKind::Fields => self.fields.len(),
            PoolKind::Methods => self.methods.len(),
            PoolKind::Classes => 0,
        }
    }

    /// Resolves a type index, recording a dangling reference for `context`
    /// when it does not land on a usable entry.
    pub(crate) fn resolve_type(
        &self,
        idx: u32,
        context: &str,
        issues: &mut Vec<ParseIssue>,
    ) -> Option<String> {
        match self.type_name(idx) {
            Some(name) => Some(name.to_string()),
            None => {
                issues.push(dangling(PoolKind::Types, idx, self.types.len(), context));
                None
            }
        }
    }

    pub(crate) fn resolve_string(
        &self,
        idx: u32,
        context: &str,
        issues: &mut Vec<ParseIssue>,
    ) -> Option<String> {
        match self.string(idx) {
            Some(value) => Some(value.to_string()),
            None => {
                issues.push(dangling(PoolKind::Strings, idx, self.strings.len(), context));
                None
            }
        }
    }
}

pub(crate) fn dangling(pool: PoolKind, index: u32, size: usize, context: &str) -> ParseIssue {
    ParseIssue::DanglingReference {
        pool,
        index,
        size: size as u32,
        context: context.to_string(),
    }
}

/// Reads a `type_list` and returns the raw type indices.
pub fn read_type_list(reader: &BinaryReader<'_>, offset: u32) -> Result<Vec<u32>, ReaderError> {
    if offset == 0 {
        return Ok(Vec::new());
    }
    let offset = offset as usize;
    let size = reader.read_u32(offset)? as usize;
    reader.check_range(offset + 4, size.saturating_mul(2))?;
    (0..size)
        .map(|i| reader.read_u16(offset + 4 + i * 2).map(|v| v as u32))
        .collect()
}

pub(crate) fn parse_pools(
    reader: &BinaryReader<'_>,
    header: &DexHeader,
    placeholder: &str,
    issues: &mut Vec<ParseIssue>,
) -> Pools {
    let mut pools = Pools::default();
    pools.strings = parse_strings(reader, header, placeholder, issues);
    pools.types = parse_types(reader, header, &pools, issues);
    pools.protos = parse_protos(reader, header, &pools, issues);
    pools.fields = parse_fields(reader, header, &pools, issues);
    pools.methods = parse_methods(reader, header, &pools, issues);
    pools
}

fn parse_strings(
    reader: &BinaryReader<'_>,
    header: &DexHeader,
    placeholder: &str,
    issues: &mut Vec<ParseIssue>,
) -> StringPool {
    let section = header.string_ids;
    let mut strings = Vec::with_capacity(section.size as usize);

    for i in 0..section.size {
        let result = reader
            .read_u32(section.offset as usize + i as usize * 4)
            .and_then(|data_off| {
                let (utf16_len, prefix) = reader.read_uleb128(data_off as usize)?;
                reader.read_string(data_off as usize + prefix, utf16_len as usize)
            });
        match result {
            Ok(value) => strings.push(value),
            Err(err) => {
                let issue = if err.is_truncation() {
                    ParseIssue::Truncated {
                        context: format!("string #{}", i),
                        source: err,
                    }
                } else {
                    ParseIssue::MalformedString {
                        index: i,
                        reason: err.to_string(),
                    }
                };
                log::warn!("{}", issue);
                issues.push(issue);
                strings.push(placeholder.to_string());
            }
        }
    }

    StringPool { strings }
}

fn parse_types(
    reader: &BinaryReader<'_>,
    header: &DexHeader,
    pools: &Pools,
    issues: &mut Vec<ParseIssue>,
) -> IdPool<String> {
    let section = header.type_ids;
    let mut entries = Vec::with_capacity(section.size as usize);

    for i in 0..section.size {
        let entry = match reader.read_u32(section.offset as usize + i as usize * 4) {
            Ok(descriptor_idx) => {
                pools.resolve_string(descriptor_idx, &format!("type #{}", i), issues)
            }
            Err(err) => {
                issues.push(ParseIssue::Truncated {
                    context: format!("type #{}", i),
                    source: err,
                });
                None
            }
        };
        entries.push(entry);
    }

    IdPool { entries }
}

fn parse_protos(
    reader: &BinaryReader<'_>,
    header: &DexHeader,
    pools: &Pools,
    issues: &mut Vec<ParseIssue>,
) -> IdPool<Prototype> {
    let section = header.proto_ids;
    let mut entries = Vec::with_capacity(section.size as usize);

    for i in 0..section.size {
        let context = format!("proto #{}", i);
        let base = section.offset as usize + i as usize * 12;
        let raw = (|| -> Result<(u32, u32, Vec<u32>), ReaderError> {
            let shorty_idx = reader.read_u32(base)?;
            let return_idx = reader.read_u32(base + 4)?;
            let params = read_type_list(reader, reader.read_u32(base + 8)?)?;
            Ok((shorty_idx, return_idx, params))
        })();

        let entry = match raw {
            Ok((shorty_idx, return_idx, params)) => {
                let shorty = pools.resolve_string(shorty_idx, &context, issues);
                let return_type = pools.resolve_type(return_idx, &context, issues);
                let parameters: Option<Vec<String>> = params
                    .into_iter()
                    .map(|p| pools.resolve_type(p, &context, issues))
                    .collect();
                match (shorty, return_type, parameters) {
                    (Some(shorty), Some(return_type), Some(parameters)) => Some(Prototype {
                        shorty,
                        return_type,
                        parameters,
                    }),
                    _ => None,
                }
            }
            Err(err) => {
                issues.push(ParseIssue::Truncated { context, source: err });
                None
            }
        };
        entries.push(entry);
    }

    IdPool { entries }
}

fn parse_fields(
    reader: &BinaryReader<'_>,
    header: &DexHeader,
    pools: &Pools,
    issues: &mut Vec<ParseIssue>,
) -> IdPool<FieldRef> {
    let section = header.field_ids;
    let mut entries = Vec::with_capacity(section.size as usize);

    for i in 0..section.size {
        let context = format!("field #{}", i);
        let base = section.offset as usize + i as usize * 8;
        let raw = (|| -> Result<(u32, u32, u32), ReaderError> {
            Ok((
                reader.read_u16(base)? as u32,
                reader.read_u16(base + 2)? as u32,
                reader.read_u32(base + 4)?,
            ))
        })();

        let entry = match raw {
            Ok((class_idx, type_idx, name_idx)) => {
                let class_name = pools.resolve_type(class_idx, &context, issues);
                let type_descriptor = pools.resolve_type(type_idx, &context, issues);
                let name = pools.resolve_string(name_idx, &context, issues);
                match (class_name, type_descriptor, name) {
                    (Some(class_name), Some(type_descriptor), Some(name)) => Some(FieldRef {
                        class_idx,
                        type_idx,
                        name_idx,
                        class_name,
                        type_descriptor,
                        name,
                    }),
                    _ => None,
                }
            }
            Err(err) => {
                issues.push(ParseIssue::Truncated { context, source: err });
                None
            }
        };
        entries.push(entry);
    }

    IdPool { entries }
}

fn parse_methods(
    reader: &BinaryReader<'_>,
    header: &DexHeader,
    pools: &Pools,
    issues: &mut Vec<ParseIssue>,
) -> IdPool<MethodRef> {
    let section = header.method_ids;
    let mut entries = Vec::with_capacity(section.size as usize);

    for i in 0..section.size {
        let context = format!("method #{}", i);
        let base = section.offset as usize + i as usize * 8;
        let raw = (|| -> Result<(u32, u32, u32), ReaderError> {
            Ok((
                reader.read_u16(base)? as u32,
                reader.read_u16(base + 2)? as u32,
                reader.read_u32(base + 4)?,
            ))
        })();

        let entry = match raw {
            Ok((class_idx, proto_idx, name_idx)) => {
                let class_name = pools.resolve_type(class_idx, &context, issues);
                let prototype = match pools.proto(proto_idx) {
                    Some(proto) => Some(proto.clone()),
                    None => {
                        issues.push(dangling(
                            PoolKind::Protos,
                            proto_idx,
                            pools.protos.len(),
                            &context,
                        ));
                        None
                    }
                };
                let name = pools.resolve_string(name_idx, &context, issues);
                match (class_name, prototype, name) {
                    (Some(class_name), Some(prototype), Some(name)) => Some(MethodRef {
                        class_idx,
                        proto_idx,
                        name_idx,
                        class_name,
                        name,
                        prototype,
                    }),
                    _ => None,
                }
            }
            Err(err) => {
                issues.push(ParseIssue::Truncated { context, source: err });
                None
            }
        };
        entries.push(entry);
    }

    IdPool { entries }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prototype_descriptor() {
        let proto = Prototype {
            shorty: "VIL".to_string(),
            return_type: "V".to_string(),
            parameters: vec!["I".to_string(), "Ljava/lang/String;".to_string()],
        };
        assert_eq!(proto.descriptor(), "(ILjava/lang/String;)V");
        assert_eq!(proto.to_string(), proto.descriptor());
    }

    #[test]
    fn test_method_and_field_names() {
        let proto = Prototype {
            shorty: "V".to_string(),
            return_type: "V".to_string(),
            parameters: Vec::new(),
        };
        let method = MethodRef {
            class_idx: 0,
            proto_idx: 0,
            name_idx: 0,
            class_name: "Lfoo/Bar;".to_string(),
            name: "baz".to_string(),
            prototype: proto,
        };
        assert_eq!(method.dalvik_name(), "Lfoo/Bar;->baz()V");

        let field = FieldRef {
            class_idx: 0,
            type_idx: 1,
            name_idx: 2,
            class_name: "Lfoo/Bar;".to_string(),
            type_descriptor: "I".to_string(),
            name: "count".to_string(),
        };
        assert_eq!(field.full_name(), "Lfoo/Bar;->count:I");
    }

    #[test]
    fn test_id_pool_skips_missing_entries() {
        let pool = IdPool {
            entries: vec![Some("a".to_string()), None, Some("c".to_string())],
        };
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.get(1), None);
        assert_eq!(pool.get(7), None);
        let present: Vec<u32> = pool.iter().map(|(i, _)| i).collect();
        assert_eq!(present, vec![0, 2]);
    }

    #[test]
    fn test_read_type_list() {
        let data = [0xAA, 0xAA, 0xAA, 0xAA, 0x02, 0, 0, 0, 0x05, 0x00, 0x07, 0x00];
        let reader = BinaryReader::new(&data);
        assert!(read_type_list(&reader, 0).unwrap().is_empty());
        assert_eq!(read_type_list(&reader, 4).unwrap(), vec![5, 7]);
        assert!(read_type_list(&reader, 6).is_err());
    }
}
