//! Get list messages
//!
//! A list response is what a meter pushes periodically: a list of register
//! entries, each with OBIS code, status, unit, scaler and raw value.

use crate::coerce::{
    to_bytes, to_i8, to_obis, to_obis_opt, to_sml_time_opt, to_string, to_u64, to_u8,
};
use crate::normalize::normalize_value;
use serde::{Deserialize, Serialize};
use sml_core::{ObisCode, ScaledValue, SmlResult, SmlTime, Value};
use std::collections::BTreeMap;

/// Number of slots of a list entry
const ENTRY_ARITY: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetListRequest {
    pub client_id: Vec<u8>,
    pub server_id: Vec<u8>,
    pub username: String,
    pub password: String,
    pub list_name: Option<ObisCode>,
}

/// A register reading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListEntry {
    pub code: ObisCode,
    pub status: Option<u64>,
    pub timestamp: Option<SmlTime>,
    pub unit: u8,
    pub scaler: i8,
    pub raw: Value,
    pub signature: Vec<u8>,
    /// Normalized rendering of `raw`
    pub value: String,
}

impl ListEntry {
    /// The reading as scaled number, if it is numeric
    pub fn scaled(&self) -> Option<ScaledValue> {
        Some(ScaledValue::new(self.raw.as_i64()?, self.scaler, self.unit))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResponse {
    pub client_id: Vec<u8>,
    pub server_id: Vec<u8>,
    pub list_name: Option<ObisCode>,
    pub sensor_time: Option<SmlTime>,
    pub gateway_time: Option<SmlTime>,
    pub values: BTreeMap<ObisCode, ListEntry>,
    pub signature: Vec<u8>,
}

pub fn read_get_list_request(body: &Value) -> SmlResult<GetListRequest> {
    let slots = body.expect_list(5, "get list request")?;
    Ok(GetListRequest {
        client_id: to_bytes(&slots[0]),
        server_id: to_bytes(&slots[1]),
        username: to_string(&slots[2]),
        password: to_string(&slots[3]),
        list_name: to_obis_opt(&slots[4]),
    })
}

pub fn read_get_list_response(body: &Value) -> SmlResult<ListResponse> {
    let slots = body.expect_list(7, "get list response")?;
    let mut values = BTreeMap::new();
    collect_entries(&slots[4], &mut values);
    Ok(ListResponse {
        client_id: to_bytes(&slots[0]),
        server_id: to_bytes(&slots[1]),
        list_name: to_obis_opt(&slots[2]),
        sensor_time: to_sml_time_opt(&slots[3]),
        values,
        signature: to_bytes(&slots[5]),
        gateway_time: to_sml_time_opt(&slots[6]),
    })
}

/// Interpret one `[obis, status, time, unit, scaler, value, signature]` entry
pub fn read_list_entry(value: &Value) -> SmlResult<ListEntry> {
    let slots = value.expect_list(ENTRY_ARITY, "list entry")?;
    let code = to_obis(&slots[0]);
    let unit = to_u8(&slots[3]);
    let scaler = to_i8(&slots[4]);
    Ok(ListEntry {
        code,
        status: (!slots[1].is_optional()).then(|| to_u64(&slots[1])),
        timestamp: to_sml_time_opt(&slots[2]),
        unit,
        scaler,
        raw: slots[5].clone(),
        signature: to_bytes(&slots[6]),
        value: normalize_value(&code, scaler, unit, &slots[5]),
    })
}

fn is_entry(value: &Value) -> bool {
    matches!(value.as_list(), Some(slots) if slots.len() == ENTRY_ARITY && matches!(slots[0], Value::Binary(_)))
}

/// Walk a value list, descending into nested lists
fn collect_entries(value: &Value, values: &mut BTreeMap<ObisCode, ListEntry>) {
    let Some(items) = value.as_list() else {
        log::debug!("value list is {}, not a list", value.type_name());
        return;
    };
    for item in items {
        if is_entry(item) {
            match read_list_entry(item) {
                Ok(entry) => {
                    values.insert(entry.code, entry);
                }
                Err(e) => log::debug!("skipping list entry: {}", e),
            }
        } else if item.is_list() {
            collect_entries(item, values);
        } else {
            log::debug!("skipping {} in value list", item.type_name());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sml_application::generator::{get_list_request, get_list_response, list_entry};
    use sml_core::obis_code::codes;
    use sml_core::units;

    fn entries() -> Vec<Value> {
        vec![
            list_entry(&codes::MANUFACTURER, Value::Optional, 0, 0, Value::binary(b"EMH".to_vec())),
            list_entry(&codes::REG_POS_ACT_E, Value::u32(0x182), units::WATT_HOUR, -1, Value::u64(123456)),
            list_entry(&codes::REG_CUR_POS_ACT_SUM, Value::Optional, units::WATT, -2, Value::i32(-4200)),
        ]
    }

    #[test]
    fn test_list_response() {
        let time = SmlTime::SecIndex(12);
        let body = get_list_response(b"", b"server", None, Some(&time), entries(), None);
        let response = read_get_list_response(&body).unwrap();

        assert_eq!(response.server_id, b"server");
        assert_eq!(response.sensor_time, Some(time));
        assert_eq!(response.values.len(), 3);
        assert_eq!(response.values[&codes::MANUFACTURER].value, "EMH");

        let energy = &response.values[&codes::REG_POS_ACT_E];
        assert_eq!(energy.value, "12345.6");
        assert_eq!(energy.status, Some(0x182));
        assert_eq!(energy.scaled().unwrap().to_string(), "12345.6 Wh");

        let power = &response.values[&codes::REG_CUR_POS_ACT_SUM];
        assert_eq!(power.value, "-42.00");
        assert_eq!(power.status, None);
    }

    #[test]
    fn test_nested_entries() {
        let mut nested = entries();
        let inner = nested.split_off(1);
        nested.push(Value::list(inner));
        let body = get_list_response(b"", b"server", None, None, nested, None);
        let response = read_get_list_response(&body).unwrap();
        assert_eq!(response.values.len(), 3);
    }

    #[test]
    fn test_bad_entry_is_skipped() {
        let mut list = entries();
        list.push(Value::u8(1));
        let body = get_list_response(b"", b"server", None, None, list, None);
        assert_eq!(read_get_list_response(&body).unwrap().values.len(), 3);
    }

    #[test]
    fn test_list_request() {
        let body = get_list_request(b"client", b"server", "user", "pwd", Some(&codes::SERVER_ID));
        let request = read_get_list_request(&body).unwrap();
        assert_eq!(request.list_name, Some(codes::SERVER_ID));
        assert_eq!(request.username, "user");
    }
}
