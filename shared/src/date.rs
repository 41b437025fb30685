//! 预约日期规则模块
//!
//! 纯粹的日期业务规则，不依赖浏览器 API，前端日历和表单
//! 校验共用。服务端对真实可约性拥有最终裁决权，这里只做
//! 界面层的软校验。

use chrono::{Datelike, NaiveDate, Weekday};

/// 日期是否落在周末（门诊不开放）
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// 日历上该日期是否可选
///
/// 拒绝过去的日期和周末。当天仍然可选，真实的时段可用性
/// 由服务端的 available_slots 决定。
pub fn is_selectable(today: NaiveDate, date: NaiveDate) -> bool {
    date >= today && !is_weekend(date)
}

/// 预约查询使用的日期串 "YYYY-MM-DD"
pub fn format_day(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// 组合日期与 "HH:MM" 时段为提交用的 ISO 时刻串
pub fn combine(date: NaiveDate, time: &str) -> String {
    format!("{}T{}:00", format_day(date), time)
}

/// 解析 "YYYY-MM-DD"（日历输入控件的值）
pub fn parse_day(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        parse_day(s).unwrap()
    }

    #[test]
    fn weekends_are_rejected() {
        // 2025-03-08 是周六，2025-03-09 是周日
        let today = day("2025-03-01");
        assert!(!is_selectable(today, day("2025-03-08")));
        assert!(!is_selectable(today, day("2025-03-09")));
        assert!(is_selectable(today, day("2025-03-10")));
    }

    #[test]
    fn past_dates_are_rejected_today_is_allowed() {
        let today = day("2025-03-10");
        assert!(!is_selectable(today, day("2025-03-07")));
        assert!(is_selectable(today, today));
        assert!(is_selectable(today, day("2025-03-11")));
    }

    #[test]
    fn combine_builds_iso_instant() {
        assert_eq!(combine(day("2025-03-10"), "09:00"), "2025-03-10T09:00:00");
    }

    #[test]
    fn parse_day_round_trips() {
        let d = day("2025-12-01");
        assert_eq!(parse_day(&format_day(d)), Some(d));
    }

    #[test]
    fn parse_day_rejects_garbage() {
        assert!(parse_day("2025/12/01").is_none());
        assert!(parse_day("").is_none());
    }
}
