//! Attention responses

use crate::coerce::{to_bytes, to_obis, to_string};
use crate::proc_par::{ParamTree, read_param_tree};
use serde::{Deserialize, Serialize};
use sml_application::AttentionCode;
use sml_core::{ObisCode, SmlResult, Value};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttentionResponse {
    pub server_id: Vec<u8>,
    /// Code as received
    pub attention_no: ObisCode,
    pub code: AttentionCode,
    pub message: String,
    pub details: Option<ParamTree>,
}

pub fn read_attention_response(body: &Value) -> SmlResult<AttentionResponse> {
    let slots = body.expect_list(4, "attention response")?;
    let attention_no = to_obis(&slots[1]);
    let details = if slots[3].is_optional() {
        None
    } else {
        Some(read_param_tree(&slots[3])?)
    };
    Ok(AttentionResponse {
        server_id: to_bytes(&slots[0]),
        attention_no,
        code: AttentionCode::from_obis(&attention_no),
        message: to_string(&slots[2]),
        details,
    })
}
