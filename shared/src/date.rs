//! 时间类型模块
//!
//! - `Timestamp`: 可序列化的 UTC 时间点，线上格式为 RFC 3339（毫秒精度，`Z` 结尾）
//! - `Clock`: 时间来源抽象，生产环境用 `SystemClock`，测试用 `ManualClock`

use chrono::{DateTime, Local, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cell::Cell;
use std::fmt;

// =========================================================
// Timestamp - 可传输的时间戳类型
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    #[inline]
    pub fn new(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// 从毫秒时间戳创建，越界时返回 None
    pub fn from_millis(ms: i64) -> Option<Self> {
        Utc.timestamp_millis_opt(ms).single().map(Self)
    }

    /// 获取毫秒值
    #[inline]
    pub fn as_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    #[inline]
    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }

    /// 解析 RFC 3339 字符串（任意时区偏移都会归一到 UTC）
    pub fn parse(s: &str) -> Option<Self> {
        DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| Self(dt.with_timezone(&Utc)))
    }

    /// `2024-05-01T12:30:00.000Z`
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// 本地时区的日期，如 `May 1, 2024`
    pub fn display_date(&self) -> String {
        self.display_date_in(&Local)
    }

    /// 本地时区的日期时间，如 `May 1, 2024 12:30`
    pub fn display_datetime(&self) -> String {
        self.display_datetime_in(&Local)
    }

    pub fn display_date_in<Tz: TimeZone>(&self, tz: &Tz) -> String
    where
        Tz::Offset: fmt::Display,
    {
        self.0.with_timezone(tz).format("%b %-d, %Y").to_string()
    }

    pub fn display_datetime_in<Tz: TimeZone>(&self, tz: &Tz) -> String
    where
        Tz::Offset: fmt::Display,
    {
        self.0.with_timezone(tz).format("%b %-d, %Y %H:%M").to_string()
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Timestamp::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
    }
}

// =========================================================
// Clock - 时间来源
// =========================================================

pub trait Clock {
    fn now(&self) -> Timestamp;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp(Utc::now())
    }
}

/// 手动推进的时钟，供测试使用
#[derive(Debug)]
pub struct ManualClock {
    millis: Cell<i64>,
}

impl ManualClock {
    pub fn at_millis(ms: i64) -> Self {
        Self {
            millis: Cell::new(ms),
        }
    }

    pub fn set_millis(&self, ms: i64) {
        self.millis.set(ms);
    }

    pub fn advance_millis(&self, delta: i64) {
        self.millis.set(self.millis.get() + delta);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_millis(self.millis.get()).unwrap_or(Timestamp(DateTime::UNIX_EPOCH))
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for std::rc::Rc<C> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_rfc3339_millis_utc() {
        let ts = Timestamp::from_millis(1_714_566_600_000).unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-05-01T12:30:00.000Z");

        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, "\"2024-05-01T12:30:00.000Z\"");
        let back: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ts);
    }

    #[test]
    fn parse_normalizes_offsets() {
        let ts = Timestamp::parse("2024-05-01T14:30:00+02:00").unwrap();
        assert_eq!(ts.as_millis(), 1_714_566_600_000);
        assert!(Timestamp::parse("yesterday").is_none());
    }

    #[test]
    fn display_formats() {
        let ts = Timestamp::from_millis(1_714_566_600_000).unwrap();
        assert_eq!(ts.display_date_in(&Utc), "May 1, 2024");
        assert_eq!(ts.display_datetime_in(&Utc), "May 1, 2024 12:30");
    }

    #[test]
    fn display_follows_the_given_offset() {
        let ts = Timestamp::from_millis(1_714_566_600_000).unwrap();
        let nairobi = chrono::FixedOffset::east_opt(3 * 3600).unwrap();
        assert_eq!(ts.display_datetime_in(&nairobi), "May 1, 2024 15:30");

        let honolulu = chrono::FixedOffset::west_opt(10 * 3600).unwrap();
        assert_eq!(ts.display_date_in(&honolulu), "May 1, 2024");
        let late = Timestamp::parse("2024-05-01T05:00:00Z").unwrap();
        assert_eq!(late.display_date_in(&honolulu), "Apr 30, 2024");

        // 默认使用本地时区
        assert_eq!(ts.display_datetime(), ts.display_datetime_in(&Local));
    }

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::at_millis(1_000);
        assert_eq!(clock.now().as_millis(), 1_000);
        clock.advance_millis(500);
        assert_eq!(clock.now().as_millis(), 1_500);
    }
}
