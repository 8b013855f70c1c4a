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

//! # Date Windows
//!
//! Side-effect free enumeration of the (departure, return) pairs that fit a
//! search window, a blackout list, and a vacation-day budget.

use std::collections::BTreeSet;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TripError};
use crate::models::DatePair;
use crate::vacation_days::count_vacation_days;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DateWindow {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub exclude_dates: BTreeSet<NaiveDate>,
    /// Weekdays the traveller is willing to take off.
    pub vacation_days: i64,
    /// Shortest stay, counting both travel days.
    pub min_days: i64,
    /// Longest stay, counting both travel days.
    pub max_days: i64,
}

impl DateWindow {
    pub fn validate(&self) -> Result<()> {
        if self.min_days > self.max_days {
            return Err(TripError::invalid(format!(
                "min_days ({}) cannot be greater than max_days ({})",
                self.min_days, self.max_days
            )));
        }
        if self.min_days < 1 {
            return Err(TripError::invalid(format!(
                "min_days ({}) cannot be less than 1",
                self.min_days
            )));
        }
        if self.start_date > self.end_date {
            return Err(TripError::invalid(format!(
                "start_date ({}) cannot be after end_date ({})",
                self.start_date, self.end_date
            )));
        }
        if self.vacation_days < 0 {
            return Err(TripError::invalid(format!(
                "vacation_days ({}) cannot be less than 0",
                self.vacation_days
            )));
        }
        Ok(())
    }

    fn is_blacked_out(&self, departure: NaiveDate, return_date: NaiveDate) -> bool {
        self.exclude_dates
            .range(departure..=return_date)
            .next()
            .is_some()
    }
}

/// Every valid date pair in `window`, departures ascending then stay length ascending.
pub fn generate_date_pairs(window: &DateWindow) -> Result<Vec<DatePair>> {
    window.validate()?;

    let mut pairs = Vec::new();
    for departure in window
        .start_date
        .iter_days()
        .take_while(|day| *day <= window.end_date)
    {
        // Stays ascend, so the first return past the window ends this departure.
        for stay in window.min_days..=window.max_days {
            let Some(return_date) = departure.checked_add_days(Days::new(stay as u64 - 1)) else {
                break;
            };
            if return_date > window.end_date {
                break;
            }
            if window.is_blacked_out(departure, return_date) {
                continue;
            }
            if count_vacation_days(departure, return_date) > window.vacation_days {
                continue;
            }
            pairs.push(DatePair {
                departure,
                return_date,
            });
        }
    }

    tracing::debug!(
        "Generated {} date pairs between {} and {}",
        pairs.len(),
        window.start_date,
        window.end_date
    );
    Ok(pairs)
}
