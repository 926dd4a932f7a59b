//! 属性文本解析
//!
//! 格式为 `;` 分隔的 `key=value` 列表。没有 `=` 的片段对顶点无意义，
//! 对边则尝试解析为权重；无法解析的片段直接跳过。

use crate::error::{Error, Result};
use crate::types::{Properties, PropertyValue};

/// 解析结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedProperties {
    /// 键值对，重复的键以后出现的为准
    pub properties: Properties,
    /// 最后一个可解析的有限数值片段
    pub weight: Option<f64>,
}

/// 解析属性列表文本
pub fn parse_property_list(text: &str) -> ParsedProperties {
    let mut parsed = ParsedProperties::default();

    for segment in text.split(';') {
        match segment.split_once('=') {
            Some((key, value)) => {
                let key = key.trim();
                if !key.is_empty() {
                    parsed
                        .properties
                        .insert(key.to_string(), PropertyValue::from(value.trim()));
                }
            }
            None => {
                // nan、inf 之类不是合法权重
                if let Some(weight) = segment.trim().parse::<f64>().ok().filter(|w| w.is_finite()) {
                    parsed.weight = Some(weight);
                }
            }
        }
    }

    parsed
}

/// 按类型读取属性值
pub(crate) fn typed_value<T>(
    value: Option<PropertyValue>,
    key: &str,
    expected: &'static str,
    read: impl FnOnce(&PropertyValue) -> Option<T>,
) -> Result<T> {
    let value = value.ok_or_else(|| Error::PropertyNotFound(key.to_string()))?;
    read(&value).ok_or_else(|| Error::PropertyType {
        key: key.to_string(),
        expected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairs_and_weight() {
        let parsed = parse_property_list(" 5 ; type = road ;capacity=100");
        assert_eq!(parsed.weight, Some(5.0));
        assert_eq!(
            parsed.properties.get("type"),
            Some(&PropertyValue::from("road"))
        );
        assert_eq!(
            parsed.properties.get("capacity"),
            Some(&PropertyValue::from("100"))
        );
    }

    #[test]
    fn test_malformed_segments_are_skipped() {
        let parsed = parse_property_list("abc;=orphan;;x=1;x=2;7.5;oops");
        assert_eq!(parsed.weight, Some(7.5));
        assert_eq!(parsed.properties.len(), 1);
        assert_eq!(parsed.properties.get("x"), Some(&PropertyValue::from("2")));
    }

    #[test]
    fn test_non_finite_weight_is_skipped() {
        for text in ["nan", "NaN", "inf", "-infinity", "Infinity"] {
            assert_eq!(parse_property_list(text).weight, None, "{text}");
        }
        assert_eq!(parse_property_list("2;inf").weight, Some(2.0));
        assert_eq!(parse_property_list("1e3").weight, Some(1000.0));
    }

    #[test]
    fn test_value_may_contain_separator() {
        let parsed = parse_property_list("expr=a=b");
        assert_eq!(
            parsed.properties.get("expr"),
            Some(&PropertyValue::from("a=b"))
        );
    }

    #[test]
    fn test_typed_value_errors() {
        let missing = typed_value(None, "k", "int", PropertyValue::as_int);
        assert!(matches!(missing, Err(Error::PropertyNotFound(_))));

        let wrong = typed_value(Some(PropertyValue::from("x")), "k", "int", PropertyValue::as_int);
        assert!(matches!(wrong, Err(Error::PropertyType { expected: "int", .. })));
    }
}
