//! Open and close messages

use crate::coerce::{to_bytes, to_sml_time_opt, to_string, to_u8};
use serde::{Deserialize, Serialize};
use sml_core::{SmlResult, SmlTime, Value};

/// Body of a public open request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenRequest {
    pub codepage: String,
    pub client_id: Vec<u8>,
    pub req_file_id: String,
    pub server_id: Vec<u8>,
    pub username: String,
    pub password: String,
    pub sml_version: u8,
}

/// Body of a public open response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenResponse {
    pub codepage: String,
    pub client_id: Vec<u8>,
    pub req_file_id: String,
    pub server_id: Vec<u8>,
    pub ref_time: Option<SmlTime>,
    pub sml_version: u8,
}

/// Body of a public close request or response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Close {
    pub signature: Vec<u8>,
}

pub fn read_open_request(body: &Value) -> SmlResult<OpenRequest> {
    let slots = body.expect_list(7, "open request")?;
    Ok(OpenRequest {
        codepage: to_string(&slots[0]),
        client_id: to_bytes(&slots[1]),
        req_file_id: to_string(&slots[2]),
        server_id: to_bytes(&slots[3]),
        username: to_string(&slots[4]),
        password: to_string(&slots[5]),
        sml_version: to_u8(&slots[6]),
    })
}

pub fn read_open_response(body: &Value) -> SmlResult<OpenResponse> {
    let slots = body.expect_list(6, "open response")?;
    Ok(OpenResponse {
        codepage: to_string(&slots[0]),
        client_id: to_bytes(&slots[1]),
        req_file_id: to_string(&slots[2]),
        server_id: to_bytes(&slots[3]),
        ref_time: to_sml_time_opt(&slots[4]),
        sml_version: to_u8(&slots[5]),
    })
}

pub fn read_close(body: &Value) -> SmlResult<Close> {
    let slots = body.expect_list(1, "close")?;
    Ok(Close {
        signature: to_bytes(&slots[0]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sml_application::generator;
    use sml_core::SmlError;

    #[test]
    fn test_open_request() {
        let body = generator::open_request(b"client", "4711-1", &[0x0A, 0x01], "operator", "secret");
        let open = read_open_request(&body).unwrap();
        assert_eq!(open.client_id, b"client");
        assert_eq!(open.req_file_id, "4711-1");
        assert_eq!(open.server_id, vec![0x0A, 0x01]);
        assert_eq!(open.username, "operator");
        assert_eq!(open.password, "secret");
        assert_eq!(open.sml_version, 0);
    }

    #[test]
    fn test_open_response() {
        let time = SmlTime::SecIndex(99);
        let body = generator::open_response(b"client", "4711-1", b"server", Some(&time));
        let open = read_open_response(&body).unwrap();
        assert_eq!(open.ref_time, Some(time));
        assert_eq!(open.server_id, b"server");
    }

    #[test]
    fn test_wrong_arity() {
        let body = Value::list(vec![Value::Optional; 6]);
        assert!(matches!(read_open_request(&body), Err(SmlError::TreeShape(_))));
        assert!(read_close(&Value::empty_list()).is_err());
        assert_eq!(read_close(&generator::close_body()).unwrap(), Close::default());
    }
}
