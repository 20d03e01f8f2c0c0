// Wed Oct 14 2026 - Alex

use crate::config::Config;
use crate::dex::pools::{dangling, parse_pools, read_type_list};
use crate::dex::types::Fundamental;
use crate::dex::{
    AccessFlags, Class, ClassId, CodeInfo, DexHeader, EncodedValue, Field, Method, ParseError,
    ParseIssue, PoolKind, Pools,
};
use crate::reader::{BinaryReader, Cursor, ReaderError, NO_INDEX};
use crate::utils::logging::ScopedTimer;
use log::{debug, warn};

/// Structural view of one DEX image: header, id pools and the class model.
/// Immutable once built.
#[derive(Debug, Clone)]
pub struct DexFile {
    pub header: DexHeader,
    pub pools: Pools,
    pub classes: Vec<Class>,
    pub issues: Vec<ParseIssue>,
}

impl DexFile {
    pub fn parse(data: &[u8], config: &Config) -> Result<Self, ParseError> {
        let _timer = ScopedTimer::new("dex parse");
        let reader = BinaryReader::new(data);
        let header = DexHeader::parse(&reader)?;
        let mut issues = Vec::new();

        if config.verify_checksum {
            let computed = DexHeader::compute_checksum(data);
            if computed != header.checksum {
                issues.push(ParseIssue::ChecksumMismatch {
                    declared: header.checksum,
                    computed,
                });
            }
        }

        let pools = parse_pools(&reader, &header, &config.placeholder_string, &mut issues);
        let classes = ClassDefParser {
            reader,
            pools: &pools,
            parse_static_values: config.parse_static_values,
            issues: &mut issues,
        }
        .parse_all(&header);

        for issue in &issues {
            warn!("{}", issue);
        }
        debug!(
            "parsed DEX {:03}: {} strings, {} types, {} methods, {} classes, {} issues",
            header.version,
            pools.strings.len(),
            pools.types.len(),
            pools.methods.len(),
            classes.len(),
            issues.len()
        );

        Ok(Self {
            header,
            pools,
            classes,
            issues,
        })
    }

    /// Class by its class-definition position.
    pub fn class(&self, id: ClassId) -> Option<&Class> {
        match self.classes.get(id as usize) {
            Some(class) if class.id == id => Some(class),
            _ => self
                .classes
                .binary_search_by_key(&id, |c| c.id)
                .ok()
                .map(|pos| &self.classes[pos]),
        }
    }

    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.classes.iter().flat_map(|c| c.methods())
    }

    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.classes.iter().flat_map(|c| c.fields())
    }
}

struct ClassDefParser<'a, 'p> {
    reader: BinaryReader<'a>,
    pools: &'p Pools,
    parse_static_values: bool,
    issues: &'p mut Vec<ParseIssue>,
}

struct ClassDefRecord {
    class_idx: u32,
    access_flags: u32,
    superclass_idx: u32,
    interfaces_off: u32,
    source_file_idx: u32,
    class_data_off: u32,
    static_values_off: u32,
}

impl<'a, 'p> ClassDefParser<'a, 'p> {
    fn parse_all(mut self, header: &DexHeader) -> Vec<Class> {
        let section = header.class_defs;
        let mut classes = Vec::with_capacity(section.size as usize);

        // Per-class delta decoding is order dependent; classes are walked in
        // table order as well so issue lists stay deterministic.
        for id in 0..section.size {
            let base = section.offset as usize + id as usize * PoolKind::Classes.entry_size();
            let record = match self.read_record(base) {
                Ok(record) => record,
                Err(err) => {
                    self.issues.push(ParseIssue::Truncated {
                        context: format!("class_def #{}", id),
                        source: err,
                    });
                    continue;
                }
            };
            if let Some(class) = self.parse_class(id, record) {
                classes.push(class);
            }
        }

        classes
    }

    fn read_record(&self, base: usize) -> Result<ClassDefRecord, ReaderError> {
        Ok(ClassDefRecord {
            class_idx: self.reader.read_u32(base)?,
            access_flags: self.reader.read_u32(base + 4)?,
            superclass_idx: self.reader.read_u32(base + 8)?,
            interfaces_off: self.reader.read_u32(base + 12)?,
            source_file_idx: self.reader.read_u32(base + 16)?,
            class_data_off: self.reader.read_u32(base + 24)?,
            static_values_off: self.reader.read_u32(base + 28)?,
        })
    }

    fn parse_class(&mut self, id: ClassId, record: ClassDefRecord) -> Option<Class> {
        let context = format!("class_def #{}", id);
        let name = self
            .pools
            .resolve_type(record.class_idx, &context, self.issues)?;

        let (superclass, superclass_idx) = if record.superclass_idx == NO_INDEX {
            (None, None)
        } else {
            let resolved = self
                .pools
                .resolve_type(record.superclass_idx, &context, self.issues);
            let idx = resolved.as_ref().map(|_| record.superclass_idx);
            (resolved, idx)
        };

        let interfaces = match read_type_list(&self.reader, record.interfaces_off) {
            Ok(list) => list
                .into_iter()
                .filter_map(|idx| self.pools.resolve_type(idx, &context, self.issues))
                .collect(),
            Err(err) => {
                self.issues.push(ParseIssue::Truncated {
                    context: format!("interfaces of {}", name),
                    source: err,
                });
                Vec::new()
            }
        };

        let source_file = if record.source_file_idx == NO_INDEX {
            None
        } else {
            self.pools
                .resolve_string(record.source_file_idx, &context, self.issues)
        };

        let mut class = Class {
            id,
            type_idx: record.class_idx,
            name,
            superclass,
            superclass_idx,
            access_flags: AccessFlags::from_raw(record.access_flags),
            interfaces,
            source_file,
            static_fields: Vec::new(),
            instance_fields: Vec::new(),
            direct_methods: Vec::new(),
            virtual_methods: Vec::new(),
        };

        if record.class_data_off != 0 {
            self.parse_class_data(&mut class, record.class_data_off as usize);
        }
        if self.parse_static_values && record.static_values_off != 0 {
            self.apply_static_values(&mut class, record.static_values_off as usize);
        }

        Some(class)
    }

    fn parse_class_data(&mut self, class: &mut Class, offset: usize) {
        let mut cursor = Cursor::new(self.reader, offset);
        let result = (|| -> Result<(), ReaderError> {
            let static_count = cursor.read_uleb128()?;
            let instance_count = cursor.read_uleb128()?;
            let direct_count = cursor.read_uleb128()?;
            let virtual_count = cursor.read_uleb128()?;

            let mut statics = std::mem::take(&mut class.static_fields);
            let r = self.read_fields(&mut cursor, static_count, class, &mut statics);
            class.static_fields = statics;
            r?;

            let mut instances = std::mem::take(&mut class.instance_fields);
            let r = self.read_fields(&mut cursor, instance_count, class, &mut instances);
            class.instance_fields = instances;
            r?;

            let mut direct = std::mem::take(&mut class.direct_methods);
            let r = self.read_methods(&mut cursor, direct_count, class, &mut direct);
            class.direct_methods = direct;
            r?;

            let mut virtuals = std::mem::take(&mut class.virtual_methods);
            let r = self.read_methods(&mut cursor, virtual_count, class, &mut virtuals);
            class.virtual_methods = virtuals;
            r
        })();

        if let Err(err) = result {
            self.issues.push(ParseIssue::Truncated {
                context: format!("class data of {}", class.name),
                source: err,
            });
        }
    }

    fn read_fields(
        &mut self,
        cursor: &mut Cursor<'a>,
        count: u32,
        class: &Class,
        out: &mut Vec<Field>,
    ) -> Result<(), ReaderError> {
        let mut field_idx = 0u32;
        for _ in 0..count {
            let diff = cursor.read_uleb128()?;
            let access = cursor.read_uleb128()?;
            field_idx = field_idx.wrapping_add(diff);

            let Some(field_ref) = self.pools.field(field_idx) else {
                self.issues.push(dangling(
                    PoolKind::Fields,
                    field_idx,
                    self.pools.fields.len(),
                    &format!("class data of {}", class.name),
                ));
                continue;
            };

            out.push(Field {
                field_idx,
                class_id: class.id,
                class_name: class.name.clone(),
                name: field_ref.name.clone(),
                type_descriptor: field_ref.type_descriptor.clone(),
                fundamental: Fundamental::of(&field_ref.type_descriptor),
                access_flags: AccessFlags::from_raw(access),
                static_value: None,
            });
        }
        Ok(())
    }

    fn read_methods(
        &mut self,
        cursor: &mut Cursor<'a>,
        count: u32,
        class: &Class,
        out: &mut Vec<Method>,
    ) -> Result<(), ReaderError> {
        let mut method_idx = 0u32;
        for _ in 0..count {
            let diff = cursor.read_uleb128()?;
            let access = cursor.read_uleb128()?;
            let code_off = cursor.read_uleb128()?;
            method_idx = method_idx.wrapping_add(diff);

            let Some(method_ref) = self.pools.method(method_idx) else {
                self.issues.push(dangling(
                    PoolKind::Methods,
                    method_idx,
                    self.pools.methods.len(),
                    &format!("class data of {}", class.name),
                ));
                continue;
            };

            let code = if code_off == 0 {
                None
            } else {
                match self.read_code_info(code_off) {
                    Ok(code) => Some(code),
                    Err(err) => {
                        self.issues.push(ParseIssue::MalformedCodeItem {
                            method: method_ref.dalvik_name(),
                            source: err,
                        });
                        None
                    }
                }
            };

            out.push(Method {
                method_idx,
                class_id: class.id,
                class_name: class.name.clone(),
                name: method_ref.name.clone(),
                prototype: method_ref.prototype.clone(),
                access_flags: AccessFlags::from_raw(access),
                code,
            });
        }
        Ok(())
    }

    fn read_code_info(&self, offset: u32) -> Result<CodeInfo, ReaderError> {
        let base = offset as usize;
        self.reader.check_range(base, CodeInfo::HEADER_SIZE)?;
        Ok(CodeInfo {
            offset,
            registers_size: self.reader.read_u16(base)?,
            ins_size: self.reader.read_u16(base + 2)?,
            outs_size: self.reader.read_u16(base + 4)?,
            tries_size: self.reader.read_u16(base + 6)?,
            debug_info_off: self.reader.read_u32(base + 8)?,
            insns_size: self.reader.read_u32(base + 12)?,
        })
    }

    fn apply_static_values(&mut self, class: &mut Class, offset: usize) {
        let mut cursor = Cursor::new(self.reader, offset);
        match EncodedValue::read_array(&mut cursor) {
            Ok(values) => {
                if values.len() > class.static_fields.len() {
                    self.issues.push(ParseIssue::MalformedStaticValues {
                        class: class.name.clone(),
                        reason: format!(
                            "{} values for {} static fields",
                            values.len(),
                            class.static_fields.len()
                        ),
                    });
                }
                for (field, value) in class.static_fields.iter_mut().zip(values) {
                    field.static_value = Some(value);
                }
            }
            Err(err) => self.issues.push(ParseIssue::MalformedStaticValues {
                class: class.name.clone(),
                reason: err.to_string(),
            }),
        }
    }
}
