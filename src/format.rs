// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Locale formatting of zone-local fields.
//!
//! The clock engine hands out numbers only; strings are produced here by a
//! [`LocaleFormatter`].  [`EnGbFormatter`] renders the British English
//! forms used by the clock faces:
//!
//! | Label    | Example          |
//! |----------|------------------|
//! | time     | `09:05:07`       |
//! | date     | `1 January 2024` |
//! | weekday  | `Monday`         |
//! | short    | `09:05`          |

use chrono::{Month, Weekday};
use serde::{Deserialize, Serialize};

use crate::zone::LocalFields;

/// Display strings for one clock face.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockLabels {
    /// Time of day with seconds, e.g. `09:05:07`.
    pub time: String,
    /// Calendar date, e.g. `1 January 2024`.
    pub date: String,
    /// Day name, e.g. `Monday`.
    pub weekday: String,
}

/// Turns zone-local fields into display strings.
pub trait LocaleFormatter {
    /// Full time of day with seconds.
    fn time(&self, fields: &LocalFields) -> String;
    /// Calendar date.
    fn date(&self, fields: &LocalFields) -> String;
    /// Day of the week.
    fn weekday(&self, fields: &LocalFields) -> String;
    /// Hours and minutes only, for map labels.
    fn short_time(&self, fields: &LocalFields) -> String;

    /// All three clock-face labels at once.
    fn labels(&self, fields: &LocalFields) -> ClockLabels {
        ClockLabels {
            time: self.time(fields),
            date: self.date(fields),
            weekday: self.weekday(fields),
        }
    }
}

/// British English, 24-hour clock.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct EnGbFormatter;

impl LocaleFormatter for EnGbFormatter {
    fn time(&self, f: &LocalFields) -> String {
        format!("{:02}:{:02}:{:02}", f.hour, f.minute, f.second)
    }

    fn date(&self, f: &LocalFields) -> String {
        let month = u8::try_from(f.month)
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .map_or("?", |m| m.name());
        format!("{} {} {}", f.day, month, f.year)
    }

    fn weekday(&self, f: &LocalFields) -> String {
        weekday_name(f.weekday).to_owned()
    }

    fn short_time(&self, f: &LocalFields) -> String {
        format!("{:02}:{:02}", f.hour, f.minute)
    }
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
