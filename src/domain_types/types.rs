use thiserror::Error;

/// 領域錯誤
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// 缺少必要欄位
    #[error("Missing order information (id, item, quantity are required).")]
    MissingOrderFields {
        missing: Vec<&'static str>,
    },

    #[error("Order record must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

pub type Result<T> = std::result::Result<T, DomainError>;

/// 訂單欄位名稱
pub struct FieldName;

impl FieldName {
    pub const ID: &'static str = "id";
    pub const ITEM: &'static str = "item";
    pub const QUANTITY: &'static str = "quantity";

    /// 提交時必須存在的欄位
    pub const REQUIRED: [&'static str; 3] = [Self::ID, Self::ITEM, Self::QUANTITY];
}
