//! 通用类型定义：属性值、属性映射、邻接方向

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 属性值
///
/// 从文本加载的属性一律为 `String`，类型化读取时再解析。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    /// 空值；写入空值等价于删除该属性
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<PropertyValue>),
    Map(IndexMap<String, PropertyValue>),
}

impl PropertyValue {
    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }

    /// 读取整数，字符串值会被解析
    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropertyValue::Int(v) => Some(*v),
            PropertyValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// 读取浮点数，整数和字符串值会被转换
    pub fn as_float(&self) -> Option<f64> {
        match self {
            PropertyValue::Float(v) => Some(*v),
            PropertyValue::Int(v) => Some(*v as f64),
            PropertyValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// 读取布尔值，字符串只接受 true/false（忽略大小写）
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(v) => Some(*v),
            PropertyValue::String(s) => {
                let s = s.trim();
                if s.eq_ignore_ascii_case("true") {
                    Some(true)
                } else if s.eq_ignore_ascii_case("false") {
                    Some(false)
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Null => write!(f, "null"),
            PropertyValue::Bool(v) => write!(f, "{}", v),
            PropertyValue::Int(v) => write!(f, "{}", v),
            PropertyValue::Float(v) => write!(f, "{}", v),
            PropertyValue::String(v) => write!(f, "{}", v),
            PropertyValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            PropertyValue::Map(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}={}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        PropertyValue::Bool(v)
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        PropertyValue::Int(v)
    }
}

impl From<i32> for PropertyValue {
    fn from(v: i32) -> Self {
        PropertyValue::Int(v as i64)
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        PropertyValue::Float(v)
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        PropertyValue::String(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        PropertyValue::String(v.to_string())
    }
}

impl<T: Into<PropertyValue>> From<Option<T>> for PropertyValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(PropertyValue::Null)
    }
}

/// 属性映射（保持插入顺序）
pub type Properties = IndexMap<String, PropertyValue>;

/// 邻接方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Outgoing,
    Incoming,
    Both,
}

impl Default for Direction {
    fn default() -> Self {
        Direction::Both
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_values_are_parsed_on_read() {
        let v = PropertyValue::from(" 42 ");
        assert_eq!(v.as_int(), Some(42));
        assert_eq!(v.as_float(), Some(42.0));
        assert_eq!(v.as_bool(), None);

        let b = PropertyValue::from("TRUE");
        assert_eq!(b.as_bool(), Some(true));
        assert_eq!(b.as_int(), None);
    }

    #[test]
    fn test_none_becomes_null() {
        let v: PropertyValue = Option::<i64>::None.into();
        assert!(v.is_null());
        let v: PropertyValue = Some(3i64).into();
        assert_eq!(v, PropertyValue::Int(3));
    }

    #[test]
    fn test_display() {
        let mut map = IndexMap::new();
        map.insert("a".to_string(), PropertyValue::Int(1));
        let v = PropertyValue::List(vec![PropertyValue::from("x"), PropertyValue::Map(map)]);
        assert_eq!(v.to_string(), "[x, {a=1}]");
    }
}
