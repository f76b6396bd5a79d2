//! Message body builders
//!
//! Free functions build the value trees of message bodies and their parts.
//! [`RequestGenerator`] and [`ResponseGenerator`] assemble complete files:
//! they number the messages of a file, assign transaction ids and frame the
//! result.
//!
//! # Parameter trees
//!
//! A parameter tree node is the triple `[name, value, children]`:
//!
//! ```text
//! [ 81 81 C7 82 01 FF, [1, "value"], null ]                  parameter node
//! [ 81 81 C7 82 01 FF, null, [ node, node, ... ] ]           child list node
//! ```

use crate::attention::AttentionCode;
use crate::config::TrxConfig;
use crate::message::{Message, MessageKind, make_message, pack};
use crate::trx::TrxGenerator;
use bytes::Bytes;
use sml_core::{ObisCode, SmlResult, SmlTime, Value};

/// Parameter value choice tags
pub const PROC_PAR_VALUE: u8 = 1;
pub const PROC_PAR_PERIOD: u8 = 2;
pub const PROC_PAR_TUPEL: u8 = 3;
pub const PROC_PAR_TIME: u8 = 4;
pub const PROC_PAR_LIST: u8 = 5;

fn obis(code: &ObisCode) -> Value {
    Value::binary(code.to_bytes().to_vec())
}

fn optional<T>(value: Option<T>, f: impl FnOnce(T) -> Value) -> Value {
    value.map(f).unwrap_or(Value::Optional)
}

fn text(s: &str) -> Value {
    Value::binary(s.as_bytes().to_vec())
}

/// A plain parameter value
pub fn proc_par_value(value: Value) -> Value {
    Value::list(vec![Value::u8(PROC_PAR_VALUE), value])
}

/// A time parameter value
pub fn proc_par_time(time: &SmlTime) -> Value {
    Value::list(vec![Value::u8(PROC_PAR_TIME), time.to_value()])
}

/// Tree node without value and children
pub fn empty_tree(code: &ObisCode) -> Value {
    tree(code, None, None)
}

/// Tree leaf carrying a plain value
pub fn tree_param(code: &ObisCode, value: Value) -> Value {
    tree(code, Some(proc_par_value(value)), None)
}

/// Tree node with children only
pub fn tree_child_list(code: &ObisCode, children: Vec<Value>) -> Value {
    tree(code, None, Some(children))
}

/// General tree node; `attribute` must already be a parameter value choice
pub fn tree(code: &ObisCode, attribute: Option<Value>, children: Option<Vec<Value>>) -> Value {
    Value::list(vec![
        obis(code),
        attribute.unwrap_or(Value::Optional),
        optional(children, Value::list),
    ])
}

/// A path of OBIS codes addressing a tree node
pub fn tree_path(path: &[ObisCode]) -> Value {
    Value::list(path.iter().map(obis).collect())
}

/// Entry of a list response
pub fn list_entry(code: &ObisCode, status: Value, unit: u8, scaler: i8, value: Value) -> Value {
    Value::list(vec![
        obis(code),
        status,
        Value::Optional,
        Value::u8(unit),
        Value::i8(scaler),
        value,
        Value::Optional,
    ])
}

/// Entry of a profile period
pub fn period_entry(code: &ObisCode, unit: u8, scaler: i8, value: Value) -> Value {
    Value::list(vec![obis(code), Value::u8(unit), Value::i8(scaler), value, Value::Optional])
}

pub fn open_request(
    client_id: &[u8],
    req_file_id: &str,
    server_id: &[u8],
    username: &str,
    password: &str,
) -> Value {
    Value::list(vec![
        Value::Optional,
        Value::binary(client_id),
        text(req_file_id),
        Value::binary(server_id),
        text(username),
        text(password),
        Value::Optional,
    ])
}

pub fn open_response(
    client_id: &[u8],
    req_file_id: &str,
    server_id: &[u8],
    ref_time: Option<&SmlTime>,
) -> Value {
    Value::list(vec![
        Value::Optional,
        Value::binary(client_id),
        text(req_file_id),
        Value::binary(server_id),
        optional(ref_time, SmlTime::to_value),
        Value::Optional,
    ])
}

/// Close request and response share the same body
pub fn close_body() -> Value {
    Value::list(vec![Value::Optional])
}

pub fn get_proc_parameter_request(
    server_id: &[u8],
    username: &str,
    password: &str,
    path: &[ObisCode],
    attribute: Option<&ObisCode>,
) -> Value {
    Value::list(vec![
        Value::binary(server_id),
        text(username),
        text(password),
        tree_path(path),
        optional(attribute, obis),
    ])
}

pub fn get_proc_parameter_response(server_id: &[u8], path: &[ObisCode], tree: Value) -> Value {
    Value::list(vec![Value::binary(server_id), tree_path(path), tree])
}

pub fn set_proc_parameter_request(
    server_id: &[u8],
    username: &str,
    password: &str,
    path: &[ObisCode],
    tree: Value,
) -> Value {
    Value::list(vec![
        Value::binary(server_id),
        text(username),
        text(password),
        tree_path(path),
        tree,
    ])
}

pub fn get_list_request(
    client_id: &[u8],
    server_id: &[u8],
    username: &str,
    password: &str,
    list_name: Option<&ObisCode>,
) -> Value {
    Value::list(vec![
        Value::binary(client_id),
        Value::binary(server_id),
        text(username),
        text(password),
        optional(list_name, obis),
    ])
}

pub fn get_list_response(
    client_id: &[u8],
    server_id: &[u8],
    list_name: Option<&ObisCode>,
    sensor_time: Option<&SmlTime>,
    entries: Vec<Value>,
    gateway_time: Option<&SmlTime>,
) -> Value {
    Value::list(vec![
        Value::binary(client_id),
        Value::binary(server_id),
        optional(list_name, obis),
        optional(sensor_time, SmlTime::to_value),
        Value::list(entries),
        Value::Optional,
        optional(gateway_time, SmlTime::to_value),
    ])
}

/// Body of a profile list or profile pack request
pub fn get_profile_request(
    server_id: &[u8],
    username: &str,
    password: &str,
    begin: Option<&SmlTime>,
    end: Option<&SmlTime>,
    path: &[ObisCode],
    objects: &[ObisCode],
) -> Value {
    Value::list(vec![
        Value::binary(server_id),
        text(username),
        text(password),
        Value::Optional,
        optional(begin, SmlTime::to_value),
        optional(end, SmlTime::to_value),
        tree_path(path),
        if objects.is_empty() {
            Value::Optional
        } else {
            Value::list(objects.iter().map(obis).collect())
        },
        Value::Optional,
    ])
}

pub fn get_profile_list_response(
    server_id: &[u8],
    act_time: &SmlTime,
    reg_period: u32,
    path: &[ObisCode],
    val_time: &SmlTime,
    status: u64,
    period: Vec<Value>,
) -> Value {
    Value::list(vec![
        Value::binary(server_id),
        act_time.to_value(),
        Value::u32(reg_period),
        tree_path(path),
        val_time.to_value(),
        Value::u64(status),
        Value::list(period),
        Value::Optional,
        Value::Optional,
    ])
}

pub fn attention_response(
    server_id: &[u8],
    code: AttentionCode,
    message: Option<&str>,
    details: Option<Value>,
) -> Value {
    Value::list(vec![
        Value::binary(server_id),
        obis(&code.to_obis()),
        optional(message, text),
        details.unwrap_or(Value::Optional),
    ])
}

/// Messages of one file under construction
#[derive(Debug, Default)]
struct FileBuffer {
    group_no: u8,
    messages: Vec<Message>,
}

impl FileBuffer {
    fn push(&mut self, trx: String, kind: MessageKind, body: Value) -> &Message {
        let message = make_message(trx, self.group_no, 0, kind, body);
        self.group_no = self.group_no.wrapping_add(1);
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    fn boxing(&mut self) -> SmlResult<Bytes> {
        let frame = pack(&self.messages)?;
        log::debug!("boxed {} messages into {} bytes", self.messages.len(), frame.len());
        self.clear();
        Ok(frame)
    }

    fn clear(&mut self) {
        self.messages.clear();
        self.group_no = 0;
    }
}

/// Builds request files for one client
#[derive(Debug)]
pub struct RequestGenerator {
    client_id: Vec<u8>,
    trx: TrxGenerator,
    file: FileBuffer,
}

impl RequestGenerator {
    pub fn new(client_id: impl Into<Vec<u8>>) -> Self {
        Self::from_config(client_id, &TrxConfig::default())
    }

    pub fn from_config(client_id: impl Into<Vec<u8>>, config: &TrxConfig) -> Self {
        Self {
            client_id: client_id.into(),
            trx: TrxGenerator::from_config(config),
            file: FileBuffer::default(),
        }
    }

    fn next_trx(&mut self) -> String {
        self.trx.pre_increment()
    }

    /// Open a file; the request file id is the transaction id of this message
    pub fn public_open(&mut self, server_id: &[u8], username: &str, password: &str) -> &Message {
        let trx = self.next_trx();
        let body = open_request(&self.client_id, &trx, server_id, username, password);
        self.file.push(trx, MessageKind::OpenRequest, body)
    }

    pub fn public_close(&mut self) -> &Message {
        let trx = self.next_trx();
        self.file.push(trx, MessageKind::CloseRequest, close_body())
    }

    pub fn get_proc_parameter(
        &mut self,
        server_id: &[u8],
        username: &str,
        password: &str,
        path: &[ObisCode],
        attribute: Option<&ObisCode>,
    ) -> &Message {
        let trx = self.next_trx();
        let body = get_proc_parameter_request(server_id, username, password, path, attribute);
        self.file.push(trx, MessageKind::GetProcParameterRequest, body)
    }

    pub fn set_proc_parameter(
        &mut self,
        server_id: &[u8],
        username: &str,
        password: &str,
        path: &[ObisCode],
        tree: Value,
    ) -> &Message {
        let trx = self.next_trx();
        let body = set_proc_parameter_request(server_id, username, password, path, tree);
        self.file.push(trx, MessageKind::SetProcParameterRequest, body)
    }

    pub fn get_list(
        &mut self,
        server_id: &[u8],
        username: &str,
        password: &str,
        list_name: Option<&ObisCode>,
    ) -> &Message {
        let trx = self.next_trx();
        let body = get_list_request(&self.client_id, server_id, username, password, list_name);
        self.file.push(trx, MessageKind::GetListRequest, body)
    }

    pub fn get_profile_list(
        &mut self,
        server_id: &[u8],
        username: &str,
        password: &str,
        begin: Option<&SmlTime>,
        end: Option<&SmlTime>,
        path: &[ObisCode],
    ) -> &Message {
        let trx = self.next_trx();
        let body = get_profile_request(server_id, username, password, begin, end, path, &[]);
        self.file.push(trx, MessageKind::GetProfileListRequest, body)
    }

    /// Messages of the current file
    pub fn messages(&self) -> &[Message] {
        &self.file.messages
    }

    /// Frame the current file and start a new one
    pub fn boxing(&mut self) -> SmlResult<Bytes> {
        self.file.boxing()
    }

    /// Drop the current file and draw a new transaction prefix
    pub fn reset(&mut self, prefix_length: usize) {
        self.file.clear();
        self.trx.regenerate(prefix_length);
    }
}

/// Builds response files; responses echo the transaction id of their request
#[derive(Debug, Default)]
pub struct ResponseGenerator {
    file: FileBuffer,
}

impl ResponseGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn public_open(
        &mut self,
        trx: &str,
        client_id: &[u8],
        req_file_id: &str,
        server_id: &[u8],
        ref_time: Option<&SmlTime>,
    ) -> &Message {
        let body = open_response(client_id, req_file_id, server_id, ref_time);
        self.file.push(trx.to_string(), MessageKind::OpenResponse, body)
    }

    pub fn public_close(&mut self, trx: &str) -> &Message {
        self.file.push(trx.to_string(), MessageKind::CloseResponse, close_body())
    }

    pub fn get_proc_parameter(
        &mut self,
        trx: &str,
        server_id: &[u8],
        path: &[ObisCode],
        tree: Value,
    ) -> &Message {
        let body = get_proc_parameter_response(server_id, path, tree);
        self.file.push(trx.to_string(), MessageKind::GetProcParameterResponse, body)
    }

    pub fn get_list(
        &mut self,
        trx: &str,
        client_id: &[u8],
        server_id: &[u8],
        list_name: Option<&ObisCode>,
        entries: Vec<Value>,
    ) -> &Message {
        let body = get_list_response(client_id, server_id, list_name, None, entries, None);
        self.file.push(trx.to_string(), MessageKind::GetListResponse, body)
    }

    pub fn attention(
        &mut self,
        trx: &str,
        server_id: &[u8],
        code: AttentionCode,
        message: Option<&str>,
    ) -> &Message {
        let body = attention_response(server_id, code, message, None);
        self.file.push(trx.to_string(), MessageKind::AttentionResponse, body)
    }

    pub fn messages(&self) -> &[Message] {
        &self.file.messages
    }

    pub fn boxing(&mut self) -> SmlResult<Bytes> {
        self.file.boxing()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sml_core::obis_code::codes;

    #[test]
    fn test_tree_shapes() {
        let code = codes::SERVER_ID;
        let leaf = tree_param(&code, Value::u16(42));
        let items = leaf.as_list().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].as_bytes(), Some(&code.to_bytes()[..]));
        assert_eq!(items[1], Value::list(vec![Value::u8(PROC_PAR_VALUE), Value::u16(42)]));
        assert!(items[2].is_optional());

        let node = tree_child_list(&code, vec![leaf.clone()]);
        assert_eq!(node.as_list().unwrap()[2], Value::list(vec![leaf]));
        assert_eq!(
            empty_tree(&code),
            Value::list(vec![Value::binary(code.to_bytes().to_vec()), Value::Optional, Value::Optional])
        );
    }

    #[test]
    fn test_body_arity() {
        assert_eq!(open_request(b"c", "1", b"s", "u", "p").as_list().unwrap().len(), 7);
        assert_eq!(open_response(b"c", "1", b"s", None).as_list().unwrap().len(), 6);
        assert_eq!(close_body().as_list().unwrap().len(), 1);
        assert_eq!(
            get_proc_parameter_request(b"s", "u", "p", &[codes::SERVER_ID], None)
                .as_list()
                .unwrap()
                .len(),
            5
        );
        assert_eq!(
            get_list_response(b"c", b"s", None, None, vec![], None).as_list().unwrap().len(),
            7
        );
        assert_eq!(
            get_profile_request(b"s", "u", "p", None, None, &[], &[]).as_list().unwrap().len(),
            9
        );
        assert_eq!(
            attention_response(b"s", AttentionCode::Ok, None, None).as_list().unwrap().len(),
            4
        );
    }

    #[test]
    fn test_list_entry_layout() {
        let entry = list_entry(&codes::REG_POS_ACT_E, Value::u32(0x0182), 0x1E, -1, Value::i64(1234));
        let items = entry.as_list().unwrap();
        assert_eq!(items.len(), 7);
        assert_eq!(items[3], Value::u8(0x1E));
        assert_eq!(items[4], Value::i8(-1));
        assert_eq!(items[5], Value::i64(1234));
    }

    #[test]
    fn test_request_generator_numbers_messages() {
        let mut generator = RequestGenerator::new(b"client".to_vec());
        generator.public_open(b"server", "operator", "secret");
        generator.get_proc_parameter(b"server", "operator", "secret", &[codes::SERVER_ID], None);
        generator.public_close();

        let messages = generator.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].kind, MessageKind::OpenRequest);
        assert_eq!(messages[2].kind, MessageKind::CloseRequest);
        let groups: Vec<u8> = messages.iter().map(|m| m.group_no).collect();
        assert_eq!(groups, vec![0, 1, 2]);
        assert_ne!(messages[0].trx, messages[1].trx);

        let frame = generator.boxing().unwrap();
        assert_eq!(frame.len() % 4, 0);
        assert!(generator.messages().is_empty());
    }

    #[test]
    fn test_response_generator_echoes_trx() {
        let mut generator = ResponseGenerator::new();
        let message = generator.attention("4711-1", b"server", AttentionCode::NotAuthorized, Some("denied"));
        assert_eq!(message.trx, "4711-1");
        assert_eq!(message.kind, MessageKind::AttentionResponse);
    }
}
