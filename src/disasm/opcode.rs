// Thu Oct 15 2026 - Alex

use std::fmt;

/// Operand layout of an instruction, named after the Dalvik format ids
/// (`22c` = two units, two registers, one constant-pool index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    F10x,
    F12x,
    F11n,
    F11x,
    F10t,
    F20t,
    F22x,
    F21t,
    F21s,
    F21h,
    F21c,
    F23x,
    F22b,
    F22t,
    F22s,
    F22c,
    F32x,
    F30t,
    F31t,
    F31i,
    F31c,
    F35c,
    F3rc,
    F45cc,
    F4rcc,
    F51l,
}

impl Format {
    /// Length in 16-bit code units.
    pub fn units(&self) -> usize {
        match self {
            Format::F10x | Format::F12x | Format::F11n | Format::F11x | Format::F10t => 1,
            Format::F20t
            | Format::F22x
            | Format::F21t
            | Format::F21s
            | Format::F21h
            | Format::F21c
            | Format::F23x
            | Format::F22b
            | Format::F22t
            | Format::F22s
            | Format::F22c => 2,
            Format::F32x
            | Format::F30t
            | Format::F31t
            | Format::F31i
            | Format::F31c
            | Format::F35c
            | Format::F3rc => 3,
            Format::F45cc | Format::F4rcc => 4,
            Format::F51l => 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReferenceKind {
    String,
    Type,
    Field,
    Method,
    Proto,
    CallSite,
    MethodHandle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Nop,
    Move,
    MoveResult,
    Return,
    Const,
    ConstString,
    ConstClass,
    ConstMethodHandle,
    ConstMethodType,
    Monitor,
    CheckCast,
    InstanceOf,
    ArrayLength,
    NewInstance,
    NewArray,
    FilledNewArray,
    FillArrayData,
    Throw,
    Goto,
    Switch,
    Compare,
    IfTest,
    IfTestZ,
    ArrayGet,
    ArrayPut,
    InstanceGet,
    InstancePut,
    StaticGet,
    StaticPut,
    Invoke,
    Unary,
    Binary,
    Binary2Addr,
    BinaryLit,
    Unused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeInfo {
    pub name: &'static str,
    pub format: Format,
    pub kind: OpKind,
    pub reference: Option<ReferenceKind>,
}

impl OpcodeInfo {
    const fn new(name: &'static str, format: Format, kind: OpKind) -> Self {
        Self {
            name,
            format,
            kind,
            reference: None,
        }
    }

    const fn with_ref(name: &'static str, format: Format, kind: OpKind, r: ReferenceKind) -> Self {
        Self {
            name,
            format,
            kind,
            reference: Some(r),
        }
    }
}

const MOVES: [(&str, Format); 9] = [
    ("move", Format::F12x),
    ("move/from16", Format::F22x),
    ("move/16", Format::F32x),
    ("move-wide", Format::F12x),
    ("move-wide/from16", Format::F22x),
    ("move-wide/16", Format::F32x),
    ("move-object", Format::F12x),
    ("move-object/from16", Format::F22x),
    ("move-object/16", Format::F32x),
];

const CONSTS: [(&str, Format); 8] = [
    ("const/4", Format::F11n),
    ("const/16", Format::F21s),
    ("const", Format::F31i),
    ("const/high16", Format::F21h),
    ("const-wide/16", Format::F21s),
    ("const-wide/32", Format::F31i),
    ("const-wide", Format::F51l),
    ("const-wide/high16", Format::F21h),
];

const CMP: [&str; 5] = ["cmpl-float", "cmpg-float", "cmpl-double", "cmpg-double", "cmp-long"];
const IF_TEST: [&str; 6] = ["if-eq", "if-ne", "if-lt", "if-ge", "if-gt", "if-le"];
const IF_TESTZ: [&str; 6] = ["if-eqz", "if-nez", "if-ltz", "if-gez", "if-gtz", "if-lez"];

const AGET: [&str; 7] = [
    "aget", "aget-wide", "aget-object", "aget-boolean", "aget-byte", "aget-char", "aget-short",
];
const APUT: [&str; 7] = [
    "aput", "aput-wide", "aput-object", "aput-boolean", "aput-byte", "aput-char", "aput-short",
];
const IGET: [&str; 7] = [
    "iget", "iget-wide", "iget-object", "iget-boolean", "iget-byte", "iget-char", "iget-short",
];
const IPUT: [&str; 7] = [
    "iput", "iput-wide", "iput-object", "iput-boolean", "iput-byte", "iput-char", "iput-short",
];
const SGET: [&str; 7] = [
    "sget", "sget-wide", "sget-object", "sget-boolean", "sget-byte", "sget-char", "sget-short",
];
const SPUT: [&str; 7] = [
    "sput", "sput-wide", "sput-object", "sput-boolean", "sput-byte", "sput-char", "sput-short",
];

const INVOKE: [&str; 5] = [
    "invoke-virtual",
    "invoke-super",
    "invoke-direct",
    "invoke-static",
    "invoke-interface",
];
const INVOKE_RANGE: [&str; 5] = [
    "invoke-virtual/range",
    "invoke-super/range",
    "invoke-direct/range",
    "invoke-static/range",
    "invoke-interface/range",
];

const UNOPS: [&str; 21] = [
    "neg-int",
    "not-int",
    "neg-long",
    "not-long",
    "neg-float",
    "neg-double",
    "int-to-long",
    "int-to-float",
    "int-to-double",
    "long-to-int",
    "long-to-float",
    "long-to-double",
    "float-to-int",
    "float-to-long",
    "float-to-double",
    "double-to-int",
    "double-to-long",
    "double-to-float",
    "int-to-byte",
    "int-to-char",
    "int-to-short",
];

const BINOPS: [&str; 32] = [
    "add-int", "sub-int", "mul-int", "div-int", "rem-int", "and-int", "or-int", "xor-int",
    "shl-int", "shr-int", "ushr-int", "add-long", "sub-long", "mul-long", "div-long",
    "rem-long", "and-long", "or-long", "xor-long", "shl-long", "shr-long", "ushr-long",
    "add-float", "sub-float", "mul-float", "div-float", "rem-float", "add-double",
    "sub-double", "mul-double", "div-double", "rem-double",
];

const BINOPS_2ADDR: [&str; 32] = [
    "add-int/2addr", "sub-int/2addr", "mul-int/2addr", "div-int/2addr", "rem-int/2addr",
    "and-int/2addr", "or-int/2addr", "xor-int/2addr", "shl-int/2addr", "shr-int/2addr",
    "ushr-int/2addr", "add-long/2addr", "sub-long/2addr", "mul-long/2addr",
    "div-long/2addr", "rem-long/2addr", "and-long/2addr", "or-long/2addr",
    "xor-long/2addr", "shl-long/2addr", "shr-long/2addr", "ushr-long/2addr",
    "add-float/2addr", "sub-float/2addr", "mul-float/2addr", "div-float/2addr",
    "rem-float/2addr", "add-double/2addr", "sub-double/2addr", "mul-double/2addr",
    "div-double/2addr", "rem-double/2addr",
];

const LIT16: [&str; 8] = [
    "add-int/lit16",
    "rsub-int",
    "mul-int/lit16",
    "div-int/lit16",
    "rem-int/lit16",
    "and-int/lit16",
    "or-int/lit16",
    "xor-int/lit16",
];

const LIT8: [&str; 11] = [
    "add-int/lit8",
    "rsub-int/lit8",
    "mul-int/lit8",
    "div-int/lit8",
    "rem-int/lit8",
    "and-int/lit8",
    "or-int/lit8",
    "xor-int/lit8",
    "shl-int/lit8",
    "shr-int/lit8",
    "ushr-int/lit8",
];

/// First code unit of a switch or array-data payload.
pub const PACKED_SWITCH_PAYLOAD: u16 = 0x0100;
pub const SPARSE_SWITCH_PAYLOAD: u16 = 0x0200;
pub const FILL_ARRAY_DATA_PAYLOAD: u16 = 0x0300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Opcode(pub u8);

impl Opcode {
    pub const NOP: Opcode = Opcode(0x00);
    pub const RETURN_VOID: Opcode = Opcode(0x0e);
    pub const CONST_STRING: Opcode = Opcode(0x1a);
    pub const CONST_STRING_JUMBO: Opcode = Opcode(0x1b);
    pub const CONST_CLASS: Opcode = Opcode(0x1c);
    pub const NEW_INSTANCE: Opcode = Opcode(0x22);
    pub const FILL_ARRAY_DATA: Opcode = Opcode(0x26);
    pub const PACKED_SWITCH: Opcode = Opcode(0x2b);
    pub const SPARSE_SWITCH: Opcode = Opcode(0x2c);

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn info(&self) -> OpcodeInfo {
        lookup(self.0)
    }

    pub fn name(&self) -> &'static str {
        self.info().name
    }

    pub fn format(&self) -> Format {
        self.info().format
    }

    pub fn kind(&self) -> OpKind {
        self.info().kind
    }

    pub fn is_unused(&self) -> bool {
        self.kind() == OpKind::Unused
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn lookup(op: u8) -> OpcodeInfo {
    use Format::*;
    use OpKind as K;
    use ReferenceKind as R;

    let i = op as usize;
    match op {
        0x00 => OpcodeInfo::new("nop", F10x, K::Nop),
        0x01..=0x09 => OpcodeInfo::new(MOVES[i - 0x01].0, MOVES[i - 0x01].1, K::Move),
        0x0a => OpcodeInfo::new("move-result", F11x, K::MoveResult),
        0x0b => OpcodeInfo::new("move-result-wide", F11x, K::MoveResult),
        0x0c => OpcodeInfo::new("move-result-object", F11x, K::MoveResult),
        0x0d => OpcodeInfo::new("move-exception", F11x, K::MoveResult),
        0x0e => OpcodeInfo::new("return-void", F10x, K::Return),
        0x0f => OpcodeInfo::new("return", F11x, K::Return),
        0x10 => OpcodeInfo::new("return-wide", F11x, K::Return),
        0x11 => OpcodeInfo::new("return-object", F11x, K::Return),
        0x12..=0x19 => OpcodeInfo::new(CONSTS[i - 0x12].0, CONSTS[i - 0x12].1, K::Const),
        0x1a => OpcodeInfo::with_ref("const-string", F21c, K::ConstString, R::String),
        0x1b => OpcodeInfo::with_ref("const-string/jumbo", F31c, K::ConstString, R::String),
        0x1c => OpcodeInfo::with_ref("const-class", F21c, K::ConstClass, R::Type),
        0x1d => OpcodeInfo::new("monitor-enter", F11x, K::Monitor),
        0x1e => OpcodeInfo::new("monitor-exit", F11x, K::Monitor),
        0x1f => OpcodeInfo::with_ref("check-cast", F21c, K::CheckCast, R::Type),
        0x20 => OpcodeInfo::with_ref("instance-of", F22c, K::InstanceOf, R::Type),
        0x21 => OpcodeInfo::new("array-length", F12x, K::ArrayLength),
        0x22 => OpcodeInfo::with_ref("new-instance", F21c, K::NewInstance, R::Type),
        0x23 => OpcodeInfo::with_ref("new-array", F22c, K::NewArray, R::Type),
        0x24 => OpcodeInfo::with_ref("filled-new-array", F35c, K::FilledNewArray, R::Type),
        0x25 => OpcodeInfo::with_ref("filled-new-array/range", F3rc, K::FilledNewArray, R::Type),
        0x26 => OpcodeInfo::new("fill-array-data", F31t, K::FillArrayData),
        0x27 => OpcodeInfo::new("throw", F11x, K::Throw),
        0x28 => OpcodeInfo::new("goto", F10t, K::Goto),
        0x29 => OpcodeInfo::new("goto/16", F20t, K::Goto),
        0x2a => OpcodeInfo::new("goto/32", F30t, K::Goto),
        0x2b => OpcodeInfo::new("packed-switch", F31t, K::Switch),
        0x2c => OpcodeInfo::new("sparse-switch", F31t, K::Switch),
        0x2d..=0x31 => OpcodeInfo::new(CMP[i - 0x2d], F23x, K::Compare),
        0x32..=0x37 => OpcodeInfo::new(IF_TEST[i - 0x32], F22t, K::IfTest),
        0x38..=0x3d => OpcodeInfo::new(IF_TESTZ[i - 0x38], F21t, K::IfTestZ),
        0x44..=0x4a => OpcodeInfo::new(AGET[i - 0x44], F23x, K::ArrayGet),
        0x4b..=0x51 => OpcodeInfo::new(APUT[i - 0x4b], F23x, K::ArrayPut),
        0x52..=0x58 => OpcodeInfo::with_ref(IGET[i - 0x52], F22c, K::InstanceGet, R::Field),
        0x59..=0x5f => OpcodeInfo::with_ref(IPUT[i - 0x59], F22c, K::InstancePut, R::Field),
        0x60..=0x66 => OpcodeInfo::with_ref(SGET[i - 0x60], F21c, K::StaticGet, R::Field),
        0x67..=0x6d => OpcodeInfo::with_ref(SPUT[i - 0x67], F21c, K::StaticPut, R::Field),
        0x6e..=0x72 => OpcodeInfo::with_ref(INVOKE[i - 0x6e], F35c, K::Invoke, R::Method),
        0x74..=0x78 => OpcodeInfo::with_ref(INVOKE_RANGE[i - 0x74], F3rc, K::Invoke, R::Method),
        0x7b..=0x8f => OpcodeInfo::new(UNOPS[i - 0x7b], F12x, K::Unary),
        0x90..=0xaf => OpcodeInfo::new(BINOPS[i - 0x90], F23x, K::Binary),
        0xb0..=0xcf => OpcodeInfo::new(BINOPS_2ADDR[i - 0xb0], F12x, K::Binary2Addr),
        0xd0..=0xd7 => OpcodeInfo::new(LIT16[i - 0xd0], F22s, K::BinaryLit),
        0xd8..=0xe2 => OpcodeInfo::new(LIT8[i - 0xd8], F22b, K::BinaryLit),
        0xfa => OpcodeInfo::with_ref("invoke-polymorphic", F45cc, K::Invoke, R::Method),
        0xfb => OpcodeInfo::with_ref("invoke-polymorphic/range", F4rcc, K::Invoke, R::Method),
        0xfc => OpcodeInfo::with_ref("invoke-custom", F35c, K::Invoke, R::CallSite),
        0xfd => OpcodeInfo::with_ref("invoke-custom/range", F3rc, K::Invoke, R::CallSite),
        0xfe => OpcodeInfo::with_ref(
            "const-method-handle",
            F21c,
            K::ConstMethodHandle,
            R::MethodHandle,
        ),
        0xff => OpcodeInfo::with_ref("const-method-type", F21c, K::ConstMethodType, R::Proto),
        // 3e..43, 73, 79..7a, e3..f9
        _ => OpcodeInfo::new("unused", F10x, K::Unused),
    }
}
