//! Parameter trees and the process parameter messages carrying them

use crate::coerce::{to_bytes, to_obis, to_obis_opt, to_obis_path, to_string};
use serde::{Deserialize, Serialize};
use sml_core::{ObisCode, SmlError, SmlResult, SmlTime, Value};

/// A node of a parameter tree
///
/// `attribute` holds the parameter value choice `[tag, value]` as
/// transmitted; [`ParamTree::value`] unwraps plain values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamTree {
    pub code: ObisCode,
    pub attribute: Option<Value>,
    pub children: Vec<ParamTree>,
}

impl ParamTree {
    pub fn new(code: ObisCode) -> Self {
        Self {
            code,
            attribute: None,
            children: Vec::new(),
        }
    }

    /// The value of a plain or time attribute
    pub fn value(&self) -> Option<&Value> {
        match self.attribute.as_ref()?.as_list()? {
            [_, value] => Some(value),
            _ => None,
        }
    }

    /// The attribute as time, if it is one
    pub fn time(&self) -> Option<SmlTime> {
        SmlTime::from_value(self.value()?).ok()
    }

    /// Depth-first search for a node by name
    pub fn find(&self, code: &ObisCode) -> Option<&ParamTree> {
        if &self.code == code {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(code))
    }

    /// Number of levels below and including this node
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(ParamTree::depth).max().unwrap_or(0)
    }

    /// Encode as `[name, attribute, children]`
    pub fn to_value(&self) -> Value {
        Value::list(vec![
            Value::binary(self.code.to_bytes().to_vec()),
            self.attribute.clone().unwrap_or(Value::Optional),
            if self.children.is_empty() {
                Value::Optional
            } else {
                Value::list(self.children.iter().map(ParamTree::to_value).collect())
            },
        ])
    }
}

/// Interpret `[obis, attribute-or-null, child-list-or-null]`
///
/// Children are read depth-first in transmission order.
pub fn read_param_tree(value: &Value) -> SmlResult<ParamTree> {
    let slots = value.expect_list(3, "parameter tree")?;
    let attribute = match &slots[1] {
        Value::Optional => None,
        other => Some(other.clone()),
    };
    let children = match &slots[2] {
        Value::Optional => Vec::new(),
        Value::List(items) => items.iter().map(read_param_tree).collect::<SmlResult<_>>()?,
        other => {
            return Err(SmlError::TreeShape(format!(
                "parameter tree children must be a list, got {}",
                other.type_name()
            )));
        }
    };
    Ok(ParamTree {
        code: to_obis(&slots[0]),
        attribute,
        children,
    })
}

fn read_tree_opt(value: &Value) -> SmlResult<Option<ParamTree>> {
    if value.is_optional() {
        Ok(None)
    } else {
        read_param_tree(value).map(Some)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetProcParameterRequest {
    pub server_id: Vec<u8>,
    pub username: String,
    pub password: String,
    pub path: Vec<ObisCode>,
    pub attribute: Option<ObisCode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetProcParameterResponse {
    pub server_id: Vec<u8>,
    pub path: Vec<ObisCode>,
    pub tree: Option<ParamTree>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetProcParameterRequest {
    pub server_id: Vec<u8>,
    pub username: String,
    pub password: String,
    pub path: Vec<ObisCode>,
    pub tree: Option<ParamTree>,
}

pub fn read_get_proc_parameter_request(body: &Value) -> SmlResult<GetProcParameterRequest> {
    let slots = body.expect_list(5, "get proc parameter request")?;
    Ok(GetProcParameterRequest {
        server_id: to_bytes(&slots[0]),
        username: to_string(&slots[1]),
        password: to_string(&slots[2]),
        path: to_obis_path(&slots[3]),
        attribute: to_obis_opt(&slots[4]),
    })
}

pub fn read_get_proc_parameter_response(body: &Value) -> SmlResult<GetProcParameterResponse> {
    let slots = body.expect_list(3, "get proc parameter response")?;
    Ok(GetProcParameterResponse {
        server_id: to_bytes(&slots[0]),
        path: to_obis_path(&slots[1]),
        tree: read_tree_opt(&slots[2])?,
    })
}

pub fn read_set_proc_parameter_request(body: &Value) -> SmlResult<SetProcParameterRequest> {
    let slots = body.expect_list(5, "set proc parameter request")?;
    Ok(SetProcParameterRequest {
        server_id: to_bytes(&slots[0]),
        username: to_string(&slots[1]),
        password: to_string(&slots[2]),
        path: to_obis_path(&slots[3]),
        tree: read_tree_opt(&slots[4])?,
    })
}
