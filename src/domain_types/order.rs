//! 訂單結構定義

use super::types::{DomainError, FieldName, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// 訂單記錄
///
/// 內部保留呼叫端送來的完整 JSON 物件（含欄位順序），
/// 只有 `id`、`item`、`quantity` 三個欄位具有意義，其餘欄位原樣傳遞。
/// 系統不檢查 `id` 是否唯一。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Order {
    fields: Map<String, Value>,
}

impl Order {
    /// 從提交請求建立訂單，三個必要欄位都存在且不為 null 才通過
    pub fn from_submission(candidate: Value) -> Result<Self> {
        let fields = match candidate {
            Value::Object(fields) => fields,
            other => return Err(DomainError::NotAnObject(json_kind(&other))),
        };

        let missing: Vec<&'static str> = FieldName::REQUIRED
            .iter()
            .copied()
            .filter(|name| fields.get(*name).map_or(true, Value::is_null))
            .collect();

        if !missing.is_empty() {
            return Err(DomainError::MissingOrderFields { missing });
        }

        Ok(Self { fields })
    }

    /// 從消息載荷解碼，只要求是 JSON 物件
    pub fn decode(payload: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(payload)
    }

    /// 編碼為消息載荷（UTF-8 JSON）
    pub fn encode(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(&self.fields)
    }

    pub fn id(&self) -> Option<&Value> {
        self.fields.get(FieldName::ID)
    }

    pub fn item(&self) -> Option<&Value> {
        self.fields.get(FieldName::ITEM)
    }

    pub fn quantity(&self) -> Option<&Value> {
        self.fields.get(FieldName::QUANTITY)
    }

    /// 所有欄位（含額外欄位）
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |v: Option<&Value>| v.map(Value::to_string).unwrap_or_else(|| "-".into());
        write!(
            f,
            "Order(id={}, item={}, quantity={})",
            show(self.id()),
            show(self.item()),
            show(self.quantity())
        )
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
