#![cfg(test)]
//! Property tests for the description packing and the value codecs

use proptest::prelude::*;

use crate::description::{
    ApplicationSubType, ApplicationType, BcdDescription, InheritSubType, ObjectSubType, ObjectType,
};
use crate::value;

fn arb_object_type() -> impl Strategy<Value = ObjectType> {
    prop_oneof![
        Just(ObjectType::Application),
        Just(ObjectType::Inherit),
        Just(ObjectType::Device),
    ]
}

fn arb_subtype(object_type: ObjectType) -> BoxedStrategy<ObjectSubType> {
    match object_type {
        ObjectType::Application => prop_oneof![
            Just(ApplicationSubType::Firmware),
            Just(ApplicationSubType::WindowsBoot),
            Just(ApplicationSubType::LegacyLoader),
            Just(ApplicationSubType::RealMode),
        ]
        .prop_map(ObjectSubType::Application)
        .boxed(),
        ObjectType::Inherit => prop_oneof![
            Just(InheritSubType::InheritableByAny),
            Just(InheritSubType::InheritableByApplication),
            Just(InheritSubType::InheritableByDevice),
        ]
        .prop_map(ObjectSubType::Inherit)
        .boxed(),
        _ => Just(ObjectSubType::Other(0)).boxed(),
    }
}

fn arb_triple() -> impl Strategy<Value = (ObjectType, ObjectSubType, ApplicationType)> {
    arb_object_type().prop_flat_map(|object_type| {
        (
            Just(object_type),
            arb_subtype(object_type),
            prop::sample::select(ApplicationType::ALL.to_vec()),
        )
    })
}

fn nul_free() -> impl Strategy<Value = String> {
    "[^\\x00]{0,40}"
}

proptest! {
    #[test]
    fn description_unpack_pack_roundtrip((object_type, subtype, application_type) in arb_triple()) {
        let packed = BcdDescription::pack(object_type, subtype, application_type);
        prop_assert_eq!(packed.object_type(), object_type);
        prop_assert_eq!(packed.object_subtype(), subtype);
        prop_assert_eq!(packed.application_type(), application_type);
    }

    #[test]
    fn description_raw_repack(raw in any::<u32>().prop_map(|r| r & !0x0F00_0000)) {
        let description = BcdDescription::from_raw(raw);
        let repacked = BcdDescription::pack(
            description.object_type(),
            description.object_subtype(),
            description.application_type(),
        );
        prop_assert_eq!(repacked.raw(), raw);
    }

    #[test]
    fn sz_roundtrip(s in nul_free()) {
        let raw = value::encode_sz(&s);
        prop_assert_eq!(raw.len(), s.encode_utf16().count() * 2 + 2);
        let (consumed, decoded) = value::decode_sz(&raw).unwrap();
        prop_assert_eq!(consumed, raw.len());
        prop_assert_eq!(decoded, s);
    }

    #[test]
    fn multi_sz_roundtrip(list in prop::collection::vec("[^\\x00]{1,12}", 0..6)) {
        let raw = value::encode_multi_sz(&list);
        prop_assert_eq!(value::decode_multi_sz(&raw).unwrap(), list);
    }

    #[test]
    fn integer_roundtrip(d in any::<u32>(), q in any::<u64>()) {
        prop_assert_eq!(value::decode_dword(&value::encode_dword(d)).unwrap(), d);
        prop_assert_eq!(value::decode_qword(&value::encode_qword(q)).unwrap(), q);
    }
}
