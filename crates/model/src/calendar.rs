use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ServiceId;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarRule {
    pub service_id: ServiceId,
    pub monday: bool,
    pub tuesday: bool,
    pub wednesday: bool,
    pub thursday: bool,
    pub friday: bool,
    pub saturday: bool,
    pub sunday: bool,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl CalendarRule {
    /// Whether the weekday flag for `date` is set, ignoring the date range.
    pub fn weekday_active(&self, date: NaiveDate) -> bool {
        use chrono::Datelike;
        match date.weekday() {
            chrono::Weekday::Mon => self.monday,
            chrono::Weekday::Tue => self.tuesday,
            chrono::Weekday::Wed => self.wednesday,
            chrono::Weekday::Thu => self.thursday,
            chrono::Weekday::Fri => self.friday,
            chrono::Weekday::Sat => self.saturday,
            chrono::Weekday::Sun => self.sunday,
        }
    }

    pub fn active_on(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date && self.weekday_active(date)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum ExceptionType {
    Added = 1,
    Removed = 2,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarException {
    pub service_id: ServiceId,
    pub date: NaiveDate,
    pub exception_type: ExceptionType,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(service_id: &str) -> CalendarRule {
        CalendarRule {
            service_id: ServiceId::new(service_id.to_owned()),
            monday: true,
            tuesday: true,
            wednesday: true,
            thursday: true,
            friday: true,
            saturday: false,
            sunday: false,
            start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
        }
    }

    #[test]
    fn inactive_on_excluded_weekday() {
        let r = rule("WD");
        // 2026-01-03 is a Saturday.
        let date = NaiveDate::from_ymd_opt(2026, 1, 3).unwrap();
        assert!(!r.active_on(date));
    }

    #[test]
    fn active_within_date_range_on_matching_weekday() {
        let r = rule("WD");
        // 2026-01-05 is a Monday.
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        assert!(r.active_on(date));
    }
}
