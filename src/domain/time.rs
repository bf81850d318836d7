// ==========================================
// 学校课表排课系统 - 时刻工具
// ==========================================
// 课表时刻统一使用 HH:MM 文本格式
// 加分钟运算按自然进位（分钟溢出进位到小时）
// ==========================================

use chrono::{Duration, NaiveTime};

/// 课表时刻格式
pub const CLOCK_FORMAT: &str = "%H:%M";

/// 解析 HH:MM 时刻（兼容 HH:MM:SS 与单位数小时）
pub fn parse_clock(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, CLOCK_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .ok()
}

/// 格式化为 HH:MM
pub fn format_clock(t: NaiveTime) -> String {
    t.format(CLOCK_FORMAT).to_string()
}

/// 在时刻上加 N 分钟
///
/// 教学日不跨越午夜，不做日界处理
pub fn add_minutes(t: NaiveTime, minutes: u32) -> NaiveTime {
    t + Duration::minutes(i64::from(minutes))
}

/// serde 适配: NaiveTime <-> "HH:MM"
pub mod hhmm {
    use super::{format_clock, parse_clock};
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(t: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_clock(*t))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_clock(&raw).ok_or_else(|| de::Error::custom(format!("无效的时刻: {}", raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_minutes_carries_into_hours() {
        let t = parse_clock("07:50").unwrap();
        assert_eq!(format_clock(add_minutes(t, 40)), "08:30");
        assert_eq!(format_clock(add_minutes(t, 130)), "10:00");
    }

    #[test]
    fn test_parse_clock_variants() {
        assert_eq!(parse_clock("7:10"), NaiveTime::from_hms_opt(7, 10, 0));
        assert_eq!(parse_clock("07:10:00"), NaiveTime::from_hms_opt(7, 10, 0));
        assert!(parse_clock("7h10").is_none());
    }
}
