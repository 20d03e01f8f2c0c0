// Tue Oct 13 2026 - Alex

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AccessFlags: u32 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const SYNCHRONIZED = 0x0020;
        const VOLATILE = 0x0040;
        const BRIDGE = 0x0040;
        const TRANSIENT = 0x0080;
        const VARARGS = 0x0080;
        const NATIVE = 0x0100;
        const INTERFACE = 0x0200;
        const ABSTRACT = 0x0400;
        const STRICT = 0x0800;
        const SYNTHETIC = 0x1000;
        const ANNOTATION = 0x2000;
        const ENUM = 0x4000;
        const CONSTRUCTOR = 0x1_0000;
        const DECLARED_SYNCHRONIZED = 0x2_0000;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagTarget {
    Class,
    Field,
    Method,
}

impl AccessFlags {
    pub fn from_raw(raw: u32) -> Self {
        Self::from_bits_retain(raw)
    }

    pub fn is_static(&self) -> bool {
        self.contains(Self::STATIC)
    }

    pub fn is_abstract(&self) -> bool {
        self.contains(Self::ABSTRACT)
    }

    pub fn is_native(&self) -> bool {
        self.contains(Self::NATIVE)
    }

    pub fn is_interface(&self) -> bool {
        self.contains(Self::INTERFACE)
    }

    /// Keyword list in smali order. Bits shared between field and method
    /// meanings are named according to `target`.
    pub fn describe(&self, target: FlagTarget) -> String {
        let mut words = Vec::new();
        let mut push = |flag: AccessFlags, word: &'static str| {
            if self.contains(flag) {
                words.push(word);
            }
        };
        push(Self::PUBLIC, "public");
        push(Self::PRIVATE, "private");
        push(Self::PROTECTED, "protected");
        push(Self::STATIC, "static");
        push(Self::FINAL, "final");
        match target {
            FlagTarget::Method => {
                push(Self::SYNCHRONIZED, "synchronized");
                push(Self::BRIDGE, "bridge");
                push(Self::VARARGS, "varargs");
                push(Self::NATIVE, "native");
            }
            FlagTarget::Field => {
                push(Self::VOLATILE, "volatile");
                push(Self::TRANSIENT, "transient");
            }
            FlagTarget::Class => {}
        }
        push(Self::INTERFACE, "interface");
        push(Self::ABSTRACT, "abstract");
        push(Self::STRICT, "strictfp");
        push(Self::SYNTHETIC, "synthetic");
        push(Self::ANNOTATION, "annotation");
        push(Self::ENUM, "enum");
        if target == FlagTarget::Method {
            push(Self::CONSTRUCTOR, "constructor");
            push(Self::DECLARED_SYNCHRONIZED, "declared-synchronized");
        }
        words.join(" ")
    }
}
