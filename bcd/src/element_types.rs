//! Element Type Catalog
//!
//! Static metadata for the element codes Windows defines. Element codes are
//! scoped: `22000002` is `SystemRoot` on an OS loader but means nothing on
//! the boot manager, so lookups always go through the owning object's
//! [`BcdDescription`].
//!
//! # Tables
//! - Generic: library settings shared by every application
//! - Boot manager: `{bootmgr}` and `{fwbootmgr}`
//! - OS loader: `winload` entries
//! - Device: ramdisk and network boot options

use core::fmt;

use crate::description::{ApplicationType, BcdDescription, InheritSubType, ObjectSubType, ObjectType};

/// Number of hex digits in an element key
pub const ELEMENT_KEY_DIGITS: usize = 8;

/// Value format hint for an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementFormat {
    Device,
    String,
    Object,
    ObjectList,
    Integer,
    IntegerList,
    Boolean,
}

impl ElementFormat {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Device => "Device",
            Self::String => "String",
            Self::Object => "Object",
            Self::ObjectList => "ObjectList",
            Self::Integer => "Integer",
            Self::IntegerList => "IntegerList",
            Self::Boolean => "Boolean",
        }
    }
}

impl fmt::Display for ElementFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Static description of one element code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BcdElementMeta {
    /// Element code
    pub code: u32,
    /// Symbolic name
    pub name: &'static str,
    /// Format hint
    pub format: ElementFormat,
}

const fn meta(code: u32, name: &'static str, format: ElementFormat) -> BcdElementMeta {
    BcdElementMeta { code, name, format }
}

use ElementFormat::{Boolean, Device, Integer, IntegerList, Object, ObjectList, String};

/// Library elements valid on every application object
pub const GENERIC_ELEMENT_TYPES: &[BcdElementMeta] = &[
    meta(0x11000001, "Device", Device),
    meta(0x12000002, "Path", String),
    meta(0x12000004, "Description", String),
    meta(0x12000005, "Locale", String),
    meta(0x14000006, "Inherit", ObjectList),
    meta(0x14000008, "RecoverySequence", ObjectList),
    meta(0x16000009, "RecoveryEnabled", Boolean),
];

/// Boot manager elements
pub const BOOTMGR_ELEMENT_TYPES: &[BcdElementMeta] = &[
    meta(0x24000001, "DisplayOrder", ObjectList),
    meta(0x24000002, "BootSequence", ObjectList),
    meta(0x23000003, "DefaultObject", Object),
    meta(0x25000004, "Timeout", Integer),
    meta(0x26000005, "AttemptResume", Boolean),
    meta(0x23000006, "ResumeObject", Object),
    meta(0x24000010, "ToolsDisplayOrder", ObjectList),
    meta(0x26000020, "DisplayBootMenu", Boolean),
    meta(0x26000021, "NoErrorDisplay", Boolean),
    meta(0x21000022, "BcdDevice", Device),
    meta(0x22000023, "BcdFilePath", String),
    meta(0x26000028, "ProcessCustomActionsFirst", Boolean),
    meta(0x27000030, "CustomActionsList", IntegerList),
    meta(0x26000031, "PersistBootSequence", Boolean),
];

/// Device object elements
pub const DEVICE_ELEMENT_TYPES: &[BcdElementMeta] = &[
    meta(0x35000001, "RamdiskImageOffset", Integer),
    meta(0x35000002, "TftpClientPort", Integer),
    meta(0x31000003, "SdiDevice", Integer),
    meta(0x32000004, "SdiPath", Integer),
    meta(0x35000005, "RamdiskImageLength", Integer),
    meta(0x36000006, "RamdiskExportAsCd", Boolean),
    meta(0x36000007, "RamdiskTftpBlockSize", Integer),
    meta(0x36000008, "RamdiskTftpWindowSize", Integer),
    meta(0x36000009, "RamdiskMulticastEnabled", Boolean),
    meta(0x3600000A, "RamdiskMulticastTftpFallback", Boolean),
    meta(0x3600000B, "RamdiskTftpVarWindow", Boolean),
];

/// OS loader elements
pub const OSLOADER_ELEMENT_TYPES: &[BcdElementMeta] = &[
    meta(0x21000001, "OSDevice", Device),
    meta(0x22000002, "SystemRoot", String),
    meta(0x23000003, "AssociatedResumeObject", Object),
    meta(0x26000010, "DetectKernelAndHal", Boolean),
    meta(0x22000011, "KernelPath", String),
    meta(0x22000012, "HalPath", String),
    meta(0x22000013, "DbgTransportPath", String),
    meta(0x25000020, "NxPolicy", Integer),
    meta(0x25000021, "PAEPolicy", Integer),
    meta(0x26000022, "WinPEMode", Boolean),
    meta(0x26000024, "DisableCrashAutoReboot", Boolean),
    meta(0x26000025, "UseLastGoodSettings", Boolean),
    meta(0x26000027, "AllowPrereleaseSignatures", Boolean),
    meta(0x26000030, "NoLowMemory", Boolean),
    meta(0x25000031, "RemoveMemory", Integer),
    meta(0x25000032, "IncreaseUserVa", Integer),
    meta(0x26000040, "UseVgaDriver", Boolean),
    meta(0x26000041, "DisableBootDisplay", Boolean),
    meta(0x26000042, "DisableVesaBios", Boolean),
    meta(0x26000043, "DisableVgaMode", Boolean),
    meta(0x25000050, "ClusterModeAddressing", Integer),
    meta(0x26000051, "UsePhysicalDestination", Boolean),
    meta(0x25000052, "RestrictApicCluster", Integer),
    meta(0x26000054, "UseLegacyApicMode", Boolean),
    meta(0x25000055, "X2ApicPolicy", Integer),
    meta(0x26000060, "UseBootProcessorOnly", Boolean),
    meta(0x25000061, "NumberOfProcessors", Integer),
    meta(0x26000062, "ForceMaximumProcessors", Boolean),
    meta(0x25000063, "ProcessorConfigurationFlags", Boolean),
    meta(0x26000064, "MaximizeGroupsCreated", Boolean),
    meta(0x26000065, "ForceGroupAwareness", Boolean),
    meta(0x25000066, "GroupSize", Integer),
    meta(0x26000070, "UseFirmwarePciSettings", Integer),
    meta(0x25000071, "MsiPolicy", Integer),
    meta(0x25000080, "SafeBoot", Integer),
    meta(0x26000081, "SafeBootAlternateShell", Boolean),
    meta(0x26000090, "BootLogInitialization", Boolean),
    meta(0x26000091, "VerboseObjectLoadMode", Boolean),
    meta(0x260000A0, "KernelDebuggerEnabled", Boolean),
    meta(0x260000A1, "DebuggerHalBreakpoint", Boolean),
    meta(0x260000A2, "UsePlatformClock", Boolean),
    meta(0x260000A3, "ForceLegacyPlatform", Boolean),
    meta(0x250000A6, "TscSyncPolicy", Integer),
    meta(0x260000B0, "EmsEnabled", Boolean),
    meta(0x250000C1, "DriverLoadFailurePolicy", Integer),
    meta(0x250000C2, "BootMenuPolicy", Integer),
    meta(0x260000C3, "AdvancedOptionsOneTime", Boolean),
    meta(0x250000E0, "BootStatusPolicy", Integer),
    meta(0x260000E1, "DisableElamDrivers", Boolean),
    meta(0x250000F0, "HypervisorLaunchType", Integer),
    meta(0x260000F2, "HypervisorDebuggerEnabled", Boolean),
    meta(0x250000F3, "HypervisorDebuggerType", Integer),
    meta(0x250000F4, "HypervisorDebuggerPortNumber", Integer),
    meta(0x250000F5, "HypervisorDebuggerBaudrate", Integer),
    meta(0x250000F6, "HypervisorDebugger1394Channel", Integer),
    meta(0x250000F7, "BootUxPolicy", Integer),
    meta(0x220000F9, "HypervisorDebuggerBusParams", String),
    meta(0x250000FA, "HypervisorNumProc", Integer),
    meta(0x250000FB, "HypervisorRootProcPerNode", Integer),
    meta(0x260000FC, "HypervisorUseLargeVTlb", Boolean),
    meta(0x250000FD, "HypervisorDebuggerNetHostIp", Integer),
    meta(0x250000FE, "HypervisorDebuggerNetHostPort", Integer),
    meta(0x25000100, "TpmBootEntropyPolicy", Integer),
    meta(0x22000110, "HypervisorDebuggerNetKey", String),
    meta(0x26000114, "HypervisorDebuggerNetDhcp", Boolean),
    meta(0x25000115, "HypervisorIommuPolicy", Integer),
    meta(0x2500012B, "XSaveDisable", Integer),
];

/// Parse an element key; exactly eight hex digits, either case
pub fn parse_element_key(key: &str) -> Option<u32> {
    if key.len() != ELEMENT_KEY_DIGITS || !key.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(key, 16).ok()
}

/// Format an element code as a key
pub fn element_key(code: u32) -> std::string::String {
    format!("{code:08x}")
}

/// Tables searched for an application of this type, in order
fn application_tables(application_type: ApplicationType) -> &'static [&'static [BcdElementMeta]] {
    match application_type {
        ApplicationType::Bootmgr | ApplicationType::Fwbootmgr => {
            &[BOOTMGR_ELEMENT_TYPES, GENERIC_ELEMENT_TYPES]
        }
        ApplicationType::Osloader => &[OSLOADER_ELEMENT_TYPES, GENERIC_ELEMENT_TYPES],
        // No dedicated table: generic library elements still resolve, rather than none
        _ => &[GENERIC_ELEMENT_TYPES],
    }
}

/// Tables that apply to objects with this description
///
/// Device objects (and device-inheritable settings) only see the device
/// table; the generic library table is merged for applications alone.
fn tables_for(description: BcdDescription) -> &'static [&'static [BcdElementMeta]] {
    match description.object_type() {
        ObjectType::Application => application_tables(description.application_type()),
        ObjectType::Device => &[DEVICE_ELEMENT_TYPES],
        ObjectType::Inherit => match description.object_subtype() {
            ObjectSubType::Inherit(InheritSubType::InheritableByApplication) => {
                application_tables(description.application_type())
            }
            ObjectSubType::Inherit(InheritSubType::InheritableByDevice) => &[DEVICE_ELEMENT_TYPES],
            _ => &[],
        },
        ObjectType::Unknown(_) => &[],
    }
}

/// Resolve element metadata for an object with the given description
///
/// Returns `None` for malformed keys and for codes the selected tables do
/// not list; vendor-specific elements are expected to miss.
pub fn resolve(description: BcdDescription, key: &str) -> Option<&'static BcdElementMeta> {
    let code = parse_element_key(key)?;
    tables_for(description)
        .iter()
        .flat_map(|table| table.iter())
        .find(|meta| meta.code == code)
}
