//! Dispatch over message kinds

use crate::attention::{AttentionResponse, read_attention_response};
use crate::list::{GetListRequest, ListResponse, read_get_list_request, read_get_list_response};
use crate::open::{Close, OpenRequest, OpenResponse, read_close, read_open_request, read_open_response};
use crate::proc_par::{
    GetProcParameterRequest, GetProcParameterResponse, SetProcParameterRequest,
    read_get_proc_parameter_request, read_get_proc_parameter_response,
    read_set_proc_parameter_request,
};
use crate::profile::{
    ProfileListResponse, ProfileRequest, read_get_profile_list_response, read_get_profile_request,
};
use serde::{Deserialize, Serialize};
use sml_application::{Message, MessageKind};
use sml_core::{SmlResult, Value};

/// A message body read into its record type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Body {
    OpenRequest(OpenRequest),
    OpenResponse(OpenResponse),
    CloseRequest(Close),
    CloseResponse(Close),
    GetProfilePackRequest(ProfileRequest),
    GetProfileListRequest(ProfileRequest),
    GetProfileListResponse(ProfileListResponse),
    GetProcParameterRequest(GetProcParameterRequest),
    GetProcParameterResponse(GetProcParameterResponse),
    SetProcParameterRequest(SetProcParameterRequest),
    GetListRequest(GetListRequest),
    GetListResponse(ListResponse),
    AttentionResponse(AttentionResponse),
    /// A known kind without a record type, body kept as is
    Raw(MessageKind, Value),
    /// A body tag this implementation does not know
    Unknown(Value),
}

/// Read a body according to its kind
pub fn read_body(kind: MessageKind, body: &Value) -> SmlResult<Body> {
    let record = match kind {
        MessageKind::OpenRequest => Body::OpenRequest(read_open_request(body)?),
        MessageKind::OpenResponse => Body::OpenResponse(read_open_response(body)?),
        MessageKind::CloseRequest => Body::CloseRequest(read_close(body)?),
        MessageKind::CloseResponse => Body::CloseResponse(read_close(body)?),
        MessageKind::GetProfilePackRequest => {
            Body::GetProfilePackRequest(read_get_profile_request(body)?)
        }
        MessageKind::GetProfileListRequest => {
            Body::GetProfileListRequest(read_get_profile_request(body)?)
        }
        MessageKind::GetProfileListResponse => {
            Body::GetProfileListResponse(read_get_profile_list_response(body)?)
        }
        MessageKind::GetProcParameterRequest => {
            Body::GetProcParameterRequest(read_get_proc_parameter_request(body)?)
        }
        MessageKind::GetProcParameterResponse => {
            Body::GetProcParameterResponse(read_get_proc_parameter_response(body)?)
        }
        MessageKind::SetProcParameterRequest => {
            Body::SetProcParameterRequest(read_set_proc_parameter_request(body)?)
        }
        MessageKind::GetListRequest => Body::GetListRequest(read_get_list_request(body)?),
        MessageKind::GetListResponse => Body::GetListResponse(read_get_list_response(body)?),
        MessageKind::AttentionResponse => Body::AttentionResponse(read_attention_response(body)?),
        MessageKind::GetProfilePackResponse
        | MessageKind::SetProcParameterResponse
        | MessageKind::GetCosemRequest
        | MessageKind::GetCosemResponse
        | MessageKind::SetCosemRequest
        | MessageKind::SetCosemResponse
        | MessageKind::ActionCosemRequest
        | MessageKind::ActionCosemResponse => Body::Raw(kind, body.clone()),
        MessageKind::Unknown(tag) => {
            log::debug!("no reader for body tag 0x{:04X}", tag);
            Body::Unknown(body.clone())
        }
    };
    Ok(record)
}

/// Read the body of a decoded message
pub fn read_message(message: &Message) -> SmlResult<Body> {
    read_body(message.kind, &message.body)
}
