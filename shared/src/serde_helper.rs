//! 宽松的反序列化辅助函数
//!
//! 后端与本地存储里的历史数据并不总是规整：字段可能为 `null`，
//! 作者可能是单个字符串，年份可能是数字字符串。

use serde::{Deserialize, Deserializer};

/// `null` 视为类型默认值
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAuthors {
    One(String),
    Many(Vec<Option<String>>),
}

/// 作者：字符串、字符串数组或 `null`，统一为去空白后的非空列表
pub fn authors<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawAuthors>::deserialize(deserializer)?;
    let list = match raw {
        None => Vec::new(),
        Some(RawAuthors::One(s)) => vec![s],
        Some(RawAuthors::Many(items)) => items.into_iter().flatten().collect(),
    };
    Ok(list
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawYear {
    Int(i64),
    Float(f64),
    Text(String),
}

/// 年份：整数、浮点或数字字符串；无法识别时为 None
pub fn year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawYear>::deserialize(deserializer)?;
    Ok(match raw {
        None => None,
        Some(RawYear::Int(n)) => i32::try_from(n).ok(),
        Some(RawYear::Float(f)) if f.is_finite() => Some(f.trunc() as i32),
        Some(RawYear::Float(_)) => None,
        Some(RawYear::Text(s)) => s.trim().parse::<i32>().ok(),
    })
    .map(|y| y.filter(|y| *y > 0))
}
