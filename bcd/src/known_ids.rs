//! Well-Known Object Identifiers
//!
//! Standard application and settings objects have fixed GUIDs. Tools show
//! them by alias (`{bootmgr}` rather than `{9dea862c-...}`), and accept the
//! alias wherever an identifier is expected.

/// Well-known object GUIDs and their aliases
pub const KNOWN_OBJECT_IDS: &[(&str, &str)] = &[
    // 0x10100002
    ("{9dea862c-5cdd-4e70-acc1-f32b344d4795}", "{bootmgr}"),
    // 0x10100001
    ("{a5a30fa2-3d06-4e9f-b5f4-a01df9d1fcba}", "{fwbootmgr}"),
    ("{b2721d73-1db4-4c62-bf78-c548a880142d}", "{memdiag}"),
    // 0x10300006
    ("{466f5a88-0af2-4f76-9038-095b170dc21c}", "{ntldr}"),
    ("{fa926493-6f1c-4193-a414-58f0b2456d1e}", "{current}"),
    ("{5189b25c-5558-4bf2-bca4-289b11bd29e2}", "{badmemory}"),
    ("{6efb52bf-1766-41db-a6b3-0ee5eff72bd7}", "{bootloadersettings}"),
    ("{4636856e-540f-4170-a130-a84776f4c654}", "{dbgsettings}"),
    ("{0ce4991b-e6b3-4b16-b23c-5e0d9250e5d9}", "{emssettings}"),
    ("{7ea2e1ac-2e61-4728-aaa3-896d9d0a9f0e}", "{globalsettings}"),
    ("{1afa9c49-16ab-4a5c-901b-212802da9460}", "{resumeloadersettings}"),
];

/// Alias for a well-known identifier, if it has one
pub fn alias_of(id: &str) -> Option<&'static str> {
    let lower = id.to_ascii_lowercase();
    KNOWN_OBJECT_IDS
        .iter()
        .find(|(guid, _)| *guid == lower)
        .map(|(_, alias)| *alias)
}

/// Display form of an identifier: its alias, or the input unchanged
pub fn display_id(id: &str) -> &str {
    alias_of(id).unwrap_or(id)
}

/// Identifier named by user input: aliases map back to their GUID
pub fn resolve_alias(input: &str) -> &str {
    let lower = input.to_ascii_lowercase();
    KNOWN_OBJECT_IDS
        .iter()
        .find(|(_, alias)| *alias == lower)
        .map_or(input, |(guid, _)| *guid)
}
