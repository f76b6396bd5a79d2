//! Encode-side helpers and lenient readout behavior

use proptest::prelude::*;
use sml::application::{AttentionCode, StatusWord, TrxGenerator, status::bits};
use sml::readout::{coerce, normalize_value};
use sml::{ObisCode, SmlTime, Value, units};
use std::collections::HashSet;

#[test]
fn test_normalize_examples() {
    let code = ObisCode::new(1, 0, 1, 8, 0, 255);
    assert_eq!(normalize_value(&code, -2, units::WATT_HOUR, &Value::u32(1234)), "12.34");
    assert_eq!(normalize_value(&code, -3, units::WATT_HOUR, &Value::u32(5)), "0.005");
    assert_eq!(normalize_value(&code, -2, units::WATT, &Value::i32(-42)), "-0.42");
    assert_eq!(normalize_value(&code, 0, units::WATT, &Value::i8(-5)), "-5");
}

#[test]
fn test_five_byte_obis_is_zero() {
    assert_eq!(ObisCode::from_slice(&[1, 0, 1, 8, 0]), ObisCode::zero());
    assert!(coerce::to_obis(&Value::binary(vec![1, 0, 1, 8, 0])).is_zero());
}

#[test]
fn test_malformed_time_is_zero() {
    assert_eq!(coerce::to_sml_time(&Value::binary(vec![1, 2])), SmlTime::zero());
    assert_eq!(coerce::to_string(&Value::empty_list()), "");
}

#[test]
fn test_attention_codes_are_constant() {
    let codes: Vec<ObisCode> = (0..3).map(|_| AttentionCode::NoServerId.to_obis()).collect();
    assert!(codes.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(codes[0].to_bytes(), [0x81, 0x81, 0xC7, 0xC7, 0xFE, 0x03]);
    assert_eq!(AttentionCode::from_obis(&codes[0]), AttentionCode::NoServerId);
    assert_eq!(AttentionCode::JobIsRunning.to_obis(), AttentionCode::JobIsRunning.to_obis());
}

#[test]
fn test_trx_uniqueness() {
    let mut trx = TrxGenerator::new();
    let ids: HashSet<String> = (0..1000).map(|_| trx.pre_increment()).collect();
    assert_eq!(ids.len(), 1000);

    let prefix = trx.prefix().to_string();
    trx.regenerate(7);
    assert_ne!(trx.prefix(), prefix);
    assert_eq!(trx.to_string(), format!("{}-0", trx.prefix()));
}

#[test]
fn test_status_word() {
    let mut status = StatusWord::new();
    assert!(status.is_device_on() && status.is_reset_by_watchdog() && status.is_ext_if_available());
    status.set_authorized(false);
    assert_ne!(status.bits() & bits::NOT_AUTHORIZED, 0);
    status.set_authorized(true);
    assert_eq!(status.bits() & bits::NOT_AUTHORIZED, 0);
}

proptest! {
    #[test]
    fn prop_normalize_matches_float(raw in -1_000_000i64..1_000_000, scaler in -6i8..=0) {
        let code = ObisCode::new(1, 0, 2, 8, 0, 255);
        let text = normalize_value(&code, scaler, units::WATT_HOUR, &Value::i64(raw));
        let parsed: f64 = text.parse().unwrap();
        let expected = raw as f64 * 10f64.powi(i32::from(scaler));
        prop_assert!((parsed - expected).abs() < 1e-9 * expected.abs().max(1.0));
        if scaler < 0 {
            let decimals = text.split('.').nth(1).map(str::len);
            prop_assert_eq!(decimals, Some(usize::from(scaler.unsigned_abs())));
        }
    }

    #[test]
    fn prop_obis_leniency(bytes in proptest::collection::vec(any::<u8>(), 0..12)) {
        let code = ObisCode::from_slice(&bytes);
        if bytes.len() == 6 {
            prop_assert_eq!(&code.to_bytes()[..], &bytes[..]);
        } else {
            prop_assert!(code.is_zero());
        }
    }
}
