//! Object Descriptions
//!
//! Every BCD object carries a packed 32-bit classification value stored at
//! `Objects\{id}\Description\Type`:
//!
//! ```text
//!  31    28 27    24 23    20 19                               0
//! +--------+--------+--------+----------------------------------+
//! |  type  |  rsvd  |subtype |         application type         |
//! +--------+--------+--------+----------------------------------+
//! ```
//!
//! The subtype nibble is interpreted against the object type: under an
//! application object it names the application class, under an inherit
//! object it names which objects may inherit the settings. The two numeric
//! spaces overlap and must never be compared with each other.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Object type bits
pub const OBJECT_TYPE_MASK: u32 = 0xF000_0000;

/// Object subtype bits
pub const OBJECT_SUBTYPE_MASK: u32 = 0x00F0_0000;

/// Application type bits
pub const APPLICATION_TYPE_MASK: u32 = 0x000F_FFFF;

/// Top-level object category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    /// Boot application (boot manager, OS loader, ...)
    Application,
    /// Inheritable settings group
    Inherit,
    /// Device descriptor
    Device,
    /// Any other value of the type nibble (already masked)
    Unknown(u32),
}

impl ObjectType {
    /// Pre-shifted bits of this object type
    pub const fn bits(&self) -> u32 {
        match self {
            Self::Application => 0x1000_0000,
            Self::Inherit => 0x2000_0000,
            Self::Device => 0x3000_0000,
            Self::Unknown(bits) => *bits & OBJECT_TYPE_MASK,
        }
    }

    /// Classify masked type bits
    pub const fn from_bits(bits: u32) -> Self {
        match bits & OBJECT_TYPE_MASK {
            0x1000_0000 => Self::Application,
            0x2000_0000 => Self::Inherit,
            0x3000_0000 => Self::Device,
            other => Self::Unknown(other),
        }
    }
}

/// Application class, valid under [`ObjectType::Application`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApplicationSubType {
    Firmware,
    WindowsBoot,
    LegacyLoader,
    RealMode,
}

/// Inheritance scope, valid under [`ObjectType::Inherit`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InheritSubType {
    InheritableByAny,
    InheritableByApplication,
    InheritableByDevice,
}

/// Object subtype, disambiguated by the sibling object type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectSubType {
    /// Subtype of an application object
    Application(ApplicationSubType),
    /// Subtype of an inherit object
    Inherit(InheritSubType),
    /// Bits with no meaning under the object type (already masked)
    Other(u32),
}

impl ObjectSubType {
    /// Pre-shifted bits of this subtype
    pub const fn bits(&self) -> u32 {
        match self {
            Self::Application(sub) => match sub {
                ApplicationSubType::Firmware => 0x0010_0000,
                ApplicationSubType::WindowsBoot => 0x0020_0000,
                ApplicationSubType::LegacyLoader => 0x0030_0000,
                ApplicationSubType::RealMode => 0x0040_0000,
            },
            Self::Inherit(sub) => match sub {
                InheritSubType::InheritableByAny => 0x0010_0000,
                InheritSubType::InheritableByApplication => 0x0020_0000,
                InheritSubType::InheritableByDevice => 0x0030_0000,
            },
            Self::Other(bits) => *bits & OBJECT_SUBTYPE_MASK,
        }
    }

    /// Interpret subtype bits in the numeric space of `object_type`
    pub const fn from_bits(object_type: ObjectType, bits: u32) -> Self {
        let bits = bits & OBJECT_SUBTYPE_MASK;
        match (object_type, bits) {
            (ObjectType::Application, 0x0010_0000) => {
                Self::Application(ApplicationSubType::Firmware)
            }
            (ObjectType::Application, 0x0020_0000) => {
                Self::Application(ApplicationSubType::WindowsBoot)
            }
            (ObjectType::Application, 0x0030_0000) => {
                Self::Application(ApplicationSubType::LegacyLoader)
            }
            (ObjectType::Application, 0x0040_0000) => {
                Self::Application(ApplicationSubType::RealMode)
            }
            (ObjectType::Inherit, 0x0010_0000) => Self::Inherit(InheritSubType::InheritableByAny),
            (ObjectType::Inherit, 0x0020_0000) => {
                Self::Inherit(InheritSubType::InheritableByApplication)
            }
            (ObjectType::Inherit, 0x0030_0000) => {
                Self::Inherit(InheritSubType::InheritableByDevice)
            }
            _ => Self::Other(bits),
        }
    }
}

/// Boot application type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApplicationType {
    Fwbootmgr,
    Bootmgr,
    Osloader,
    Resume,
    Memdiag,
    Ntldr,
    Setupldr,
    Bootsector,
    Startup,
    Bootapp,
    /// Unlisted value (already masked)
    Unknown(u32),
}

impl ApplicationType {
    /// Listed application types, numbered 1 through 10
    pub const ALL: [ApplicationType; 10] = [
        Self::Fwbootmgr,
        Self::Bootmgr,
        Self::Osloader,
        Self::Resume,
        Self::Memdiag,
        Self::Ntldr,
        Self::Setupldr,
        Self::Bootsector,
        Self::Startup,
        Self::Bootapp,
    ];

    /// Numeric value of this application type
    pub const fn bits(&self) -> u32 {
        match self {
            Self::Fwbootmgr => 1,
            Self::Bootmgr => 2,
            Self::Osloader => 3,
            Self::Resume => 4,
            Self::Memdiag => 5,
            Self::Ntldr => 6,
            Self::Setupldr => 7,
            Self::Bootsector => 8,
            Self::Startup => 9,
            Self::Bootapp => 10,
            Self::Unknown(bits) => *bits & APPLICATION_TYPE_MASK,
        }
    }

    /// Classify masked application type bits
    pub fn from_bits(bits: u32) -> Self {
        let bits = bits & APPLICATION_TYPE_MASK;
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.bits() == bits)
            .unwrap_or(Self::Unknown(bits))
    }

    /// Canonical name, `None` for unlisted values
    pub fn name(&self) -> Option<&'static str> {
        Some(match self {
            Self::Fwbootmgr => "fwbootmgr",
            Self::Bootmgr => "bootmgr",
            Self::Osloader => "osloader",
            Self::Resume => "resume",
            Self::Memdiag => "memdiag",
            Self::Ntldr => "ntldr",
            Self::Setupldr => "setupldr",
            Self::Bootsector => "bootsector",
            Self::Startup => "startup",
            Self::Bootapp => "bootapp",
            Self::Unknown(_) => return None,
        })
    }
}

/// Packed object classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BcdDescription(u32);

impl BcdDescription {
    /// Wrap a raw packed value
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Pack the three components; each is taken as already shifted
    pub const fn pack(
        object_type: ObjectType,
        subtype: ObjectSubType,
        application_type: ApplicationType,
    ) -> Self {
        Self(object_type.bits() | subtype.bits() | application_type.bits())
    }

    /// Raw packed value
    pub const fn raw(&self) -> u32 {
        self.0
    }

    /// Object type bits (mask 0xF0000000)
    pub const fn object_type_bits(&self) -> u32 {
        self.0 & OBJECT_TYPE_MASK
    }

    /// Subtype bits (mask 0x00F00000)
    pub const fn subtype_bits(&self) -> u32 {
        self.0 & OBJECT_SUBTYPE_MASK
    }

    /// Application type bits (mask 0x000FFFFF)
    pub const fn application_type_bits(&self) -> u32 {
        self.0 & APPLICATION_TYPE_MASK
    }

    pub const fn object_type(&self) -> ObjectType {
        ObjectType::from_bits(self.0)
    }

    /// Subtype interpreted against this description's object type
    pub const fn object_subtype(&self) -> ObjectSubType {
        ObjectSubType::from_bits(self.object_type(), self.0)
    }

    pub fn application_type(&self) -> ApplicationType {
        ApplicationType::from_bits(self.0)
    }
}

impl From<u32> for BcdDescription {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for BcdDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}
