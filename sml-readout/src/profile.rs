//! Profile list and profile pack messages

use crate::coerce::{
    to_bool_opt, to_bytes, to_i8, to_obis, to_obis_path, to_sml_time, to_sml_time_opt, to_string,
    to_u32, to_u64, to_u8,
};
use crate::normalize::normalize_value;
use serde::{Deserialize, Serialize};
use sml_core::{ObisCode, SmlResult, SmlTime, Value};

/// Body of a profile list or profile pack request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRequest {
    pub server_id: Vec<u8>,
    pub username: String,
    pub password: String,
    pub with_raw_data: Option<bool>,
    pub begin: Option<SmlTime>,
    pub end: Option<SmlTime>,
    pub path: Vec<ObisCode>,
    pub objects: Vec<ObisCode>,
}

/// One register of a profile period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodEntry {
    pub code: ObisCode,
    pub unit: u8,
    pub scaler: i8,
    pub raw: Value,
    pub value: String,
    pub signature: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileListResponse {
    pub server_id: Vec<u8>,
    pub act_time: SmlTime,
    pub reg_period: u32,
    pub path: Vec<ObisCode>,
    pub val_time: SmlTime,
    pub status: u64,
    pub period: Vec<PeriodEntry>,
    pub raw_data: String,
    pub signature: Vec<u8>,
}

pub fn read_get_profile_request(body: &Value) -> SmlResult<ProfileRequest> {
    let slots = body.expect_list(9, "get profile request")?;
    let objects = match &slots[7] {
        Value::List(items) => items.iter().map(to_obis).collect(),
        _ => Vec::new(),
    };
    Ok(ProfileRequest {
        server_id: to_bytes(&slots[0]),
        username: to_string(&slots[1]),
        password: to_string(&slots[2]),
        with_raw_data: to_bool_opt(&slots[3]),
        begin: to_sml_time_opt(&slots[4]),
        end: to_sml_time_opt(&slots[5]),
        path: to_obis_path(&slots[6]),
        objects,
    })
}

/// Interpret one `[obis, unit, scaler, value, signature]` period entry
pub fn read_period_entry(value: &Value) -> SmlResult<PeriodEntry> {
    let slots = value.expect_list(5, "period entry")?;
    let code = to_obis(&slots[0]);
    let unit = to_u8(&slots[1]);
    let scaler = to_i8(&slots[2]);
    Ok(PeriodEntry {
        code,
        unit,
        scaler,
        raw: slots[3].clone(),
        value: normalize_value(&code, scaler, unit, &slots[3]),
        signature: to_bytes(&slots[4]),
    })
}

pub fn read_get_profile_list_response(body: &Value) -> SmlResult<ProfileListResponse> {
    let slots = body.expect_list(9, "get profile list response")?;
    let period = match slots[6].as_list() {
        Some(items) => items.iter().map(read_period_entry).collect::<SmlResult<_>>()?,
        None => {
            log::debug!("period list is {}", slots[6].type_name());
            Vec::new()
        }
    };
    Ok(ProfileListResponse {
        server_id: to_bytes(&slots[0]),
        act_time: to_sml_time(&slots[1]),
        reg_period: to_u32(&slots[2]),
        path: to_obis_path(&slots[3]),
        val_time: to_sml_time(&slots[4]),
        status: to_u64(&slots[5]),
        period,
        raw_data: to_string(&slots[7]),
        signature: to_bytes(&slots[8]),
    })
}
