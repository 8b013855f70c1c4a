//!  Tripwindow Trip Finder
//!
//!  Copyright (C) 2026  Mamy Ratsimbazafy
//!
//!  This program is free software: you can redistribute it and/or modify
//!  it under the terms of the GNU Affero General Public License as published by
//!  the Free Software Foundation, either version 3 of the License, or
//!  (at your option) any later version.
//!
//!  This program is distributed in the hope that it will be useful,
//!  but WITHOUT ANY WARRANTY; without even the implied warranty of
//!  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//!  GNU Affero General Public License for more details.
//!
//!  You should have received a copy of the GNU Affero General Public License
//!  along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! # Vacation Days
//!
//! A vacation day is a weekday the traveller has to take off.

use chrono::{Datelike, NaiveDate, Weekday};

/// Returns true for Monday–Friday.
pub fn is_vacation_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Count the weekdays in `[start, end]`, both ends included.
///
/// An inverted range counts as zero.
pub fn count_vacation_days(start: NaiveDate, end: NaiveDate) -> i64 {
    start
        .iter_days()
        .take_while(|day| *day <= end)
        .filter(|day| is_vacation_day(*day))
        .count() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, day).unwrap()
    }

    #[test]
    fn full_week_has_five_vacation_days() {
        // Every 7-day window holds exactly one weekend.
        for offset in 0..7 {
            let start = d(10, 1 + offset);
            let end = start + chrono::Days::new(6);
            assert_eq!(count_vacation_days(start, end), 5, "from {start}");
        }
    }

    #[test]
    fn weekend_costs_nothing() {
        // 2024-10-05 is a Saturday
        assert_eq!(count_vacation_days(d(10, 5), d(10, 6)), 0);
        assert_eq!(count_vacation_days(d(10, 5), d(10, 7)), 1);
    }

    #[test]
    fn single_day_and_inverted_range() {
        assert_eq!(count_vacation_days(d(10, 1), d(10, 1)), 1);
        assert_eq!(count_vacation_days(d(10, 6), d(10, 6)), 0);
        assert_eq!(count_vacation_days(d(10, 9), d(10, 1)), 0);
    }
}
