//! Semantic readout of decoded SML messages
//!
//! The parser delivers message bodies as generic [`Value`](sml_core::Value)
//! trees. This crate interprets them: per message kind it reads the body
//! slots into typed records, resolving OBIS codes, times, scalers and units.
//!
//! Reading is lenient below the record level. A body with the wrong number
//! of slots is a [`TreeShape`](sml_core::SmlError::TreeShape) error, but a
//! single slot of unexpected type degrades to a default value (see
//! [`coerce`]).
//!
//! # Usage
//!
//! ```
//! use sml_application::{MessageKind, generator};
//! use sml_core::{Value, obis_code::codes, units};
//! use sml_readout::{Body, read_body};
//!
//! let entry = generator::list_entry(&codes::REG_POS_ACT_E, Value::Optional, units::WATT_HOUR, -1, Value::u32(105));
//! let body = generator::get_list_response(b"", b"meter", None, None, vec![entry], None);
//!
//! let Body::GetListResponse(list) = read_body(MessageKind::GetListResponse, &body).unwrap() else {
//!     panic!("not a list response");
//! };
//! assert_eq!(list.values[&codes::REG_POS_ACT_E].value, "10.5");
//! ```

pub mod attention;
pub mod body;
pub mod coerce;
pub mod list;
pub mod normalize;
pub mod open;
pub mod proc_par;
pub mod profile;

pub use attention::{AttentionResponse, read_attention_response};
pub use body::{Body, read_body, read_message};
pub use list::{GetListRequest, ListEntry, ListResponse, read_get_list_request, read_get_list_response, read_list_entry};
pub use normalize::normalize_value;
pub use open::{Close, OpenRequest, OpenResponse, read_close, read_open_request, read_open_response};
pub use proc_par::{
    GetProcParameterRequest, GetProcParameterResponse, ParamTree, SetProcParameterRequest,
    read_get_proc_parameter_request, read_get_proc_parameter_response, read_param_tree,
    read_set_proc_parameter_request,
};
pub use profile::{
    PeriodEntry, ProfileListResponse, ProfileRequest, read_get_profile_list_response,
    read_get_profile_request, read_period_entry,
};
