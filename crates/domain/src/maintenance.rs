// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Vehicle maintenance counters and date-based maintenance facts.
//!
//! Every vehicle carries four usage counters (oil, `AdBlue`, brakes,
//! bearings) that accumulate driven kilometers until reset, and four
//! date-based facts (brake fluid, green card, coolant, technical
//! inspection) from which a due date and progress are derived.
//!
//! ## Invariants
//!
//! - Distance is always credited to all four counters at once
//! - A counter's km only decreases on an explicit reset, which stamps the
//!   reset instant
//! - Exactly one counter or fact changes per reset or date-set call
//! - The derived status view never fails on unset dates

use crate::dates::{add_months, sub_months, utc_day_of};
use crate::error::DomainError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::OffsetDateTime;

/// Default oil change interval.
pub const DEFAULT_OIL_LIMIT_KM: i64 = 15_000;
/// Default `AdBlue` service interval.
pub const DEFAULT_ADBLUE_LIMIT_KM: i64 = 20_000;
/// Default brake pad interval.
pub const DEFAULT_BRAKES_LIMIT_KM: i64 = 40_000;
/// Default wheel bearing interval.
pub const DEFAULT_BEARINGS_LIMIT_KM: i64 = 100_000;
/// Default brake fluid change interval.
pub const DEFAULT_BRAKE_FLUID_MONTHS: u32 = 24;
/// Default green card validity.
pub const DEFAULT_GREEN_CARD_MONTHS: u32 = 12;
/// Default coolant change interval.
pub const DEFAULT_COOLANT_MONTHS: u32 = 48;
/// Validity window of a technical inspection.
pub const TECHNICAL_INSPECTION_MONTHS: u32 = 24;

/// One of the four km-based wear counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterKind {
    /// Engine oil.
    Oil,
    /// `AdBlue` (diesel exhaust fluid) system.
    #[serde(rename = "adblue")]
    AdBlue,
    /// Brake pads and discs.
    Brakes,
    /// Wheel bearings.
    Bearings,
}

impl CounterKind {
    /// All counters, in display order.
    pub const ALL: [Self; 4] = [Self::Oil, Self::AdBlue, Self::Brakes, Self::Bearings];

    /// Converts this counter to its string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Oil => "oil",
            Self::AdBlue => "adblue",
            Self::Brakes => "brakes",
            Self::Bearings => "bearings",
        }
    }
}

impl FromStr for CounterKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "oil" => Ok(Self::Oil),
            "adblue" => Ok(Self::AdBlue),
            "brakes" => Ok(Self::Brakes),
            "bearings" => Ok(Self::Bearings),
            _ => Err(DomainError::InvalidCounter(s.to_string())),
        }
    }
}

impl std::fmt::Display for CounterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What a manual reset applies to.
///
/// Brake fluid has no km counter; resetting it records today as the last
/// change date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResetTarget {
    /// Zero a wear counter.
    Counter(CounterKind),
    /// Record a brake fluid change today.
    BrakeFluid,
}

impl FromStr for ResetTarget {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s.trim().to_ascii_lowercase();
        if key == "brakefluid" || key == "brake_fluid" {
            return Ok(Self::BrakeFluid);
        }
        CounterKind::from_str(&key)
            .map(Self::Counter)
            .map_err(|_| DomainError::InvalidCounter(s.to_string()))
    }
}

/// One of the four date-based maintenance facts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DateFact {
    /// Technical inspection, stored as its expiry date.
    TechnicalInspection,
    /// Brake fluid, stored as its last change date.
    BrakeFluid,
    /// Insurance green card, stored as its expiry date.
    GreenCard,
    /// Coolant, stored as its last change date.
    #[serde(alias = "fridex")]
    Coolant,
}

impl DateFact {
    /// All facts, in display order.
    pub const ALL: [Self; 4] = [
        Self::TechnicalInspection,
        Self::BrakeFluid,
        Self::GreenCard,
        Self::Coolant,
    ];

    /// Converts this fact to its string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TechnicalInspection => "technicalInspection",
            Self::BrakeFluid => "brakeFluid",
            Self::GreenCard => "greenCard",
            Self::Coolant => "coolant",
        }
    }

    /// Days before the due date at which the fact is reported as due soon.
    #[must_use]
    pub const fn lookahead_days(self) -> i64 {
        match self {
            Self::BrakeFluid | Self::Coolant => 90,
            Self::GreenCard | Self::TechnicalInspection => 30,
        }
    }

    /// Whether the stored date is an expiry date rather than a last change.
    #[must_use]
    pub const fn stores_expiry(self) -> bool {
        matches!(self, Self::GreenCard | Self::TechnicalInspection)
    }
}

impl FromStr for DateFact {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "technicalinspection" | "technical_inspection" | "stk" => Ok(Self::TechnicalInspection),
            "brakefluid" | "brake_fluid" => Ok(Self::BrakeFluid),
            "greencard" | "green_card" => Ok(Self::GreenCard),
            "coolant" | "fridex" => Ok(Self::Coolant),
            _ => Err(DomainError::InvalidDateFact(s.to_string())),
        }
    }
}

impl std::fmt::Display for DateFact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A km-based wear counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageCounter {
    km: i64,
    limit_km: i64,
    last_reset_at: Option<OffsetDateTime>,
}

impl UsageCounter {
    /// Creates a fresh counter at zero with the given limit.
    #[must_use]
    pub const fn new(limit_km: i64) -> Self {
        Self {
            km: 0,
            limit_km,
            last_reset_at: None,
        }
    }

    /// Rebuilds a counter from stored values.
    #[must_use]
    pub const fn with_state(km: i64, limit_km: i64, last_reset_at: Option<OffsetDateTime>) -> Self {
        Self {
            km,
            limit_km,
            last_reset_at,
        }
    }

    /// Kilometers accumulated since the last reset.
    #[must_use]
    pub const fn km(&self) -> i64 {
        self.km
    }

    /// Kilometers after which service is due.
    #[must_use]
    pub const fn limit_km(&self) -> i64 {
        self.limit_km
    }

    /// When the counter was last reset, if ever.
    #[must_use]
    pub const fn last_reset_at(&self) -> Option<OffsetDateTime> {
        self.last_reset_at
    }

    /// Kilometers left before service is due. Negative when overdue.
    #[must_use]
    pub const fn remaining_km(&self) -> i64 {
        self.limit_km - self.km
    }

    /// Returns whether the counter has reached its limit.
    #[must_use]
    pub const fn is_due(&self) -> bool {
        self.km >= self.limit_km
    }

    /// Share of the limit used, clamped to `0.0..=1.0`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percent_used(&self) -> f64 {
        if self.limit_km <= 0 {
            return 1.0;
        }
        (self.km as f64 / self.limit_km as f64).clamp(0.0, 1.0)
    }

    const fn credit(&mut self, km: i64) {
        self.km = self.km.saturating_add(km);
    }

    const fn reset(&mut self, now: OffsetDateTime) {
        self.km = 0;
        self.last_reset_at = Some(now);
    }
}

/// A stored date together with its interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateSchedule {
    date: Option<NaiveDate>,
    interval_months: u32,
}

impl DateSchedule {
    /// Creates a schedule.
    #[must_use]
    pub const fn new(date: Option<NaiveDate>, interval_months: u32) -> Self {
        Self {
            date,
            interval_months,
        }
    }

    /// The stored date, if set.
    #[must_use]
    pub const fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    /// Interval between changes, or the validity window for expiry dates.
    #[must_use]
    pub const fn interval_months(&self) -> u32 {
        self.interval_months
    }
}

/// Derived traffic-light state of a date-based fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DueStatus {
    /// No date has been recorded.
    Unknown,
    /// Not due within the lookahead window.
    Ok,
    /// Due within the lookahead window.
    Soon,
    /// Due date reached or passed.
    Expired,
}

/// Read-side view of one date-based fact, computed against a given day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DateFactStatus {
    /// Which fact this is.
    pub fact: DateFact,
    /// The stored date.
    pub date: Option<NaiveDate>,
    /// When the fact is next due.
    pub next_due: Option<NaiveDate>,
    /// Days from today to `next_due`. Negative when overdue.
    pub days_remaining: Option<i64>,
    /// Share of the window elapsed, clamped to `0.0..=1.0`.
    pub percent_elapsed: f64,
    /// Traffic-light state.
    pub status: DueStatus,
}

/// Evaluates a date-based fact.
///
/// For last-change facts the window runs from the stored date to the stored
/// date plus the interval. For expiry facts the window ends at the stored
/// date and its start is back-computed as expiry minus the interval.
///
/// # Errors
///
/// Returns an error only if month arithmetic overflows.
#[allow(clippy::cast_precision_loss)]
pub fn evaluate_date_fact(
    fact: DateFact,
    schedule: DateSchedule,
    today: NaiveDate,
) -> Result<DateFactStatus, DomainError> {
    let Some(date) = schedule.date() else {
        return Ok(DateFactStatus {
            fact,
            date: None,
            next_due: None,
            days_remaining: None,
            percent_elapsed: 0.0,
            status: DueStatus::Unknown,
        });
    };

    let (start, next_due): (NaiveDate, NaiveDate) = if fact.stores_expiry() {
        (sub_months(date, schedule.interval_months())?, date)
    } else {
        (date, add_months(date, schedule.interval_months())?)
    };

    let days_remaining: i64 = (next_due - today).num_days();
    let span: i64 = (next_due - start).num_days();
    let percent_elapsed: f64 = if span <= 0 {
        if today >= next_due { 1.0 } else { 0.0 }
    } else {
        ((today - start).num_days() as f64 / span as f64).clamp(0.0, 1.0)
    };

    let status: DueStatus = if next_due <= today {
        DueStatus::Expired
    } else if days_remaining <= fact.lookahead_days() {
        DueStatus::Soon
    } else {
        DueStatus::Ok
    };

    Ok(DateFactStatus {
        fact,
        date: Some(date),
        next_due: Some(next_due),
        days_remaining: Some(days_remaining),
        percent_elapsed,
        status,
    })
}

/// Maintenance state of a single vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaintenanceState {
    /// Oil counter.
    pub oil: UsageCounter,
    /// `AdBlue` counter.
    pub adblue: UsageCounter,
    /// Brakes counter.
    pub brakes: UsageCounter,
    /// Bearings counter.
    pub bearings: UsageCounter,
    /// Technical inspection expiry.
    pub technical_inspection_expiry: Option<NaiveDate>,
    /// Brake fluid last change.
    pub brake_fluid: DateSchedule,
    /// Green card expiry.
    pub green_card: DateSchedule,
    /// Coolant last change.
    pub coolant: DateSchedule,
}

impl Default for MaintenanceState {
    fn default() -> Self {
        Self {
            oil: UsageCounter::new(DEFAULT_OIL_LIMIT_KM),
            adblue: UsageCounter::new(DEFAULT_ADBLUE_LIMIT_KM),
            brakes: UsageCounter::new(DEFAULT_BRAKES_LIMIT_KM),
            bearings: UsageCounter::new(DEFAULT_BEARINGS_LIMIT_KM),
            technical_inspection_expiry: None,
            brake_fluid: DateSchedule::new(None, DEFAULT_BRAKE_FLUID_MONTHS),
            green_card: DateSchedule::new(None, DEFAULT_GREEN_CARD_MONTHS),
            coolant: DateSchedule::new(None, DEFAULT_COOLANT_MONTHS),
        }
    }
}

impl MaintenanceState {
    /// Returns the given counter.
    #[must_use]
    pub const fn counter(&self, kind: CounterKind) -> &UsageCounter {
        match kind {
            CounterKind::Oil => &self.oil,
            CounterKind::AdBlue => &self.adblue,
            CounterKind::Brakes => &self.brakes,
            CounterKind::Bearings => &self.bearings,
        }
    }

    const fn counter_mut(&mut self, kind: CounterKind) -> &mut UsageCounter {
        match kind {
            CounterKind::Oil => &mut self.oil,
            CounterKind::AdBlue => &mut self.adblue,
            CounterKind::Brakes => &mut self.brakes,
            CounterKind::Bearings => &mut self.bearings,
        }
    }

    /// Returns the schedule backing a date-based fact.
    #[must_use]
    pub const fn schedule(&self, fact: DateFact) -> DateSchedule {
        match fact {
            DateFact::TechnicalInspection => DateSchedule::new(
                self.technical_inspection_expiry,
                TECHNICAL_INSPECTION_MONTHS,
            ),
            DateFact::BrakeFluid => self.brake_fluid,
            DateFact::GreenCard => self.green_card,
            DateFact::Coolant => self.coolant,
        }
    }

    /// Adds `km` to all four counters.
    ///
    /// Zero or negative distances are ignored. Returns whether anything was
    /// credited.
    pub fn credit_distance(&mut self, km: i64) -> bool {
        if km <= 0 {
            return false;
        }
        for kind in CounterKind::ALL {
            self.counter_mut(kind).credit(km);
        }
        true
    }

    /// Resets a single counter, or records a brake fluid change.
    ///
    /// # Errors
    ///
    /// Returns an error if `now` cannot be turned into a calendar day.
    pub fn reset(&mut self, target: ResetTarget, now: OffsetDateTime) -> Result<(), DomainError> {
        match target {
            ResetTarget::Counter(kind) => self.counter_mut(kind).reset(now),
            ResetTarget::BrakeFluid => self.brake_fluid.date = Some(utc_day_of(now)?),
        }
        Ok(())
    }

    /// Overwrites the stored date of a fact. `None` clears it.
    pub const fn set_date(&mut self, fact: DateFact, date: Option<NaiveDate>) {
        match fact {
            DateFact::TechnicalInspection => self.technical_inspection_expiry = date,
            DateFact::BrakeFluid => self.brake_fluid.date = date,
            DateFact::GreenCard => self.green_card.date = date,
            DateFact::Coolant => self.coolant.date = date,
        }
    }

    /// Changes the km limit of a counter.
    ///
    /// # Errors
    ///
    /// Returns an error if the limit is not positive.
    pub const fn set_limit(&mut self, kind: CounterKind, limit_km: i64) -> Result<(), DomainError> {
        if limit_km <= 0 {
            return Err(DomainError::InvalidCounterLimit { limit_km });
        }
        self.counter_mut(kind).limit_km = limit_km;
        Ok(())
    }

    /// Changes the interval of a date-based fact.
    ///
    /// # Errors
    ///
    /// Returns an error if the interval is not positive or the fact is the
    /// technical inspection, whose window is fixed.
    pub fn set_interval(&mut self, fact: DateFact, months: i64) -> Result<(), DomainError> {
        let months_u32: u32 = u32::try_from(months)
            .ok()
            .filter(|m| *m > 0)
            .ok_or(DomainError::InvalidInterval { months })?;
        match fact {
            DateFact::TechnicalInspection => {
                return Err(DomainError::FixedInterval("technical inspection"));
            }
            DateFact::BrakeFluid => self.brake_fluid.interval_months = months_u32,
            DateFact::GreenCard => self.green_card.interval_months = months_u32,
            DateFact::Coolant => self.coolant.interval_months = months_u32,
        }
        Ok(())
    }

    /// Evaluates every date-based fact against `today`.
    ///
    /// # Errors
    ///
    /// Returns an error only if month arithmetic overflows.
    pub fn date_statuses(&self, today: NaiveDate) -> Result<Vec<DateFactStatus>, DomainError> {
        DateFact::ALL
            .iter()
            .map(|fact| evaluate_date_fact(*fact, self.schedule(*fact), today))
            .collect()
    }
}
