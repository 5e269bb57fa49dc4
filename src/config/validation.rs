use thiserror::Error;

/// 配置驗證錯誤
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required setting: {0}")]
    MissingField(String),

    #[error("Invalid setting: {0}")]
    InvalidValue(String),

    #[error("{field} = {value} is outside {min}..={max}")]
    RangeError {
        field: String,
        value: String,
        min: String,
        max: String,
    },
}

/// 配置驗證器trait
pub trait Validator {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// 驗證工具函數
pub struct ValidationUtils;

impl ValidationUtils {
    /// 驗證配置值是否在指定範圍內（含邊界）
    pub fn in_range<T>(value: T, min: T, max: T, field_name: &str) -> Result<(), ValidationError>
    where
        T: PartialOrd + ToString,
    {
        if value < min || value > max {
            return Err(ValidationError::RangeError {
                field: field_name.to_string(),
                value: value.to_string(),
                min: min.to_string(),
                max: max.to_string(),
            });
        }
        Ok(())
    }

    /// 驗證字串（不分大小寫）是否為允許值之一
    pub fn one_of(value: &str, options: &[&str], field_name: &str) -> Result<(), ValidationError> {
        if !options.iter().any(|o| o.eq_ignore_ascii_case(value)) {
            return Err(ValidationError::InvalidValue(format!(
                "{} must be one of {:?}, got {:?}",
                field_name, options, value
            )));
        }
        Ok(())
    }

    /// 檢查必要的字串欄位是否有值
    pub fn not_empty(value: &str, field_name: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::MissingField(field_name.to_string()));
        }
        Ok(())
    }

    /// 檢查 URL 的 scheme
    pub fn url_scheme(value: &str, schemes: &[&str], field_name: &str) -> Result<(), ValidationError> {
        Self::not_empty(value, field_name)?;

        let scheme = value.split_once("://").map(|(scheme, _)| scheme);
        match scheme {
            Some(s) if schemes.iter().any(|allowed| allowed.eq_ignore_ascii_case(s)) => Ok(()),
            _ => Err(ValidationError::InvalidValue(format!(
                "{} must start with one of {:?}://",
                field_name, schemes
            ))),
        }
    }
}
