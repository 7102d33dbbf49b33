use super::*;
use crate::sink::CaptureSink;

fn assert_identity_law<E: ForcedWidthEnum>() {
    for constant in E::CONSTANTS {
        let value = E::from_i128(i128::from(constant.value))
            .unwrap_or_else(|| panic!("{} does not fit {}", constant.name, E::C_NAME));
        assert_eq!(value.identity(), value, "{}", constant.name);
        assert_eq!(value.identity().to_i128(), i128::from(constant.value));
    }
}

fn assert_print_law<E: ForcedWidthEnum>() {
    let sink = CaptureSink::new();
    for constant in E::CONSTANTS {
        let value = E::try_decode(i128::from(constant.value)).unwrap();
        value.print(&sink);
    }
    let expected: Vec<String> = E::CONSTANTS
        .iter()
        .map(|constant| constant.value.to_string())
        .collect();
    assert_eq!(sink.take(), expected, "{}", E::C_NAME);
}

fn assert_family_laws<E: ForcedWidthEnum>() {
    assert_identity_law::<E>();
    assert_print_law::<E>();
}

#[test]
fn every_family_satisfies_identity_and_print() {
    assert_family_laws::<EnumForceSInt8>();
    assert_family_laws::<EnumForceUInt8>();
    assert_family_laws::<EnumForceSInt16>();
    assert_family_laws::<EnumForceUInt16>();
    assert_family_laws::<EnumForceSInt32>();
    assert_family_laws::<EnumForceUInt32>();
    assert_family_laws::<EnumForceSInt64>();
    assert_family_laws::<EnumForceUInt64>();
}

#[test]
fn sentinel_values_match_native_declarations() {
    assert_eq!(EnumForceSInt8::FORCE.raw(), 0x7F);
    assert_eq!(EnumForceUInt8::FORCE.raw(), 0xFF);
    assert_eq!(EnumForceSInt16::FORCE.raw(), 0x7FFF);
    assert_eq!(EnumForceUInt16::FORCE.raw(), 0xFFFF);
    assert_eq!(EnumForceSInt32::FORCE.raw(), 0x7FFF_FFFF);
    assert_eq!(EnumForceUInt32::FORCE.raw(), 0xFFFF_FFFF);
    assert_eq!(EnumForceSInt64::FORCE.raw(), 0x7FFF_FFFF);
    assert_eq!(EnumForceUInt64::FORCE.raw(), 0xFFFF_FFFF);
}

#[test]
fn storage_width_matches_declared_integer_type() {
    assert_eq!(std::mem::size_of::<EnumForceSInt8>(), 1);
    assert_eq!(std::mem::size_of::<EnumForceUInt8>(), 1);
    assert_eq!(std::mem::size_of::<EnumForceSInt16>(), 2);
    assert_eq!(std::mem::size_of::<EnumForceUInt16>(), 2);
    assert_eq!(std::mem::size_of::<EnumForceSInt32>(), 4);
    assert_eq!(std::mem::size_of::<EnumForceUInt32>(), 4);
    assert_eq!(std::mem::size_of::<EnumForceSInt64>(), 8);
    assert_eq!(std::mem::size_of::<EnumForceUInt64>(), 8);

    assert_eq!(EnumForceUInt8::INTEGER_TYPE.size_of, 1);
    assert_eq!(EnumForceUInt64::INTEGER_TYPE.size_of, 8);
}

#[test]
fn sentinel_forces_narrowest_width_below_64_bits() {
    fn narrowest<E: ForcedWidthEnum>() -> IntegerType {
        IntegerType::narrowest_for(
            i128::from(E::sentinel().value),
            E::INTEGER_TYPE.is_signed,
        )
        .unwrap()
    }

    assert_eq!(narrowest::<EnumForceSInt8>(), EnumForceSInt8::INTEGER_TYPE);
    assert_eq!(narrowest::<EnumForceUInt8>(), EnumForceUInt8::INTEGER_TYPE);
    assert_eq!(narrowest::<EnumForceSInt16>(), EnumForceSInt16::INTEGER_TYPE);
    assert_eq!(narrowest::<EnumForceUInt16>(), EnumForceUInt16::INTEGER_TYPE);
    assert_eq!(narrowest::<EnumForceSInt32>(), EnumForceSInt32::INTEGER_TYPE);
    assert_eq!(narrowest::<EnumForceUInt32>(), EnumForceUInt32::INTEGER_TYPE);

    // 32-bit range sentinels on the 64-bit families
    assert_eq!(narrowest::<EnumForceSInt64>(), IntegerType::SINT32);
    assert_eq!(narrowest::<EnumForceUInt64>(), IntegerType::UINT32);
    assert!(EnumForceSInt64::INTEGER_TYPE.holds(i128::from(EnumForceSInt64::FORCE.raw())));
    assert!(EnumForceUInt64::INTEGER_TYPE.holds(i128::from(EnumForceUInt64::FORCE.raw())));
}

#[test]
fn uint8_sentinel_does_not_wrap() {
    let value = EnumForceUInt8::FORCE;
    assert_eq!(value.identity().raw(), 0xFF);
    assert_eq!(value.to_string(), "255");
}

#[test]
fn checked_decode_rejects_undeclared_values() {
    let err = EnumForceSInt16::try_decode(6).unwrap_err();
    match err {
        FixtureError::UnrecognizedDiscriminant { type_name, value } => {
            assert_eq!(type_name, "Enum_Force_SInt16");
            assert_eq!(value, 6);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // out of storage range entirely
    assert!(EnumForceUInt8::try_decode(256).is_err());
    assert!(EnumForceUInt32::try_decode(-1).is_err());
}

#[test]
fn unchecked_passthrough_keeps_undeclared_values() {
    let raw = EnumForceUInt16::from_raw(1234);
    assert_eq!(raw.identity().raw(), 1234);
    assert_eq!(raw.constant_name(), None);
}

#[test]
fn constant_names_follow_native_prefixes() {
    assert_eq!(
        EnumForceUInt32::WEDNESDAY.constant_name(),
        Some("ENUM_FORCE_UINT32_DAY_WEDNESDAY")
    );
    assert_eq!(
        EnumForceSInt64::FORCE.constant_name(),
        Some("_ENUM_FORCE_SINT64")
    );
}

#[test]
fn integer_type_lookup_by_c_name() {
    assert_eq!(IntegerType::from_c_name("uint16_t"), Some(IntegerType::UINT16));
    assert_eq!(IntegerType::from_c_name("long double"), None);
    assert_eq!(IntegerType::SINT8.min_value(), -128);
    assert_eq!(IntegerType::UINT64.max_value(), u64::MAX as i128);
}
