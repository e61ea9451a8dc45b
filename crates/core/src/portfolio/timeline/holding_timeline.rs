use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::TimelineError;

/// Start of a constant-quantity interval: from `effective_date` (inclusive)
/// until the next breakpoint, the holding is `quantity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakpoint {
    pub effective_date: NaiveDate,
    pub quantity: Decimal,
}

impl Breakpoint {
    pub fn new(effective_date: NaiveDate, quantity: Decimal) -> Self {
        Self {
            effective_date,
            quantity,
        }
    }
}

/// Quantity history of one asset in one portfolio, c_{i,t}.
///
/// Breakpoints are strictly increasing by date and never edited once written;
/// history only grows at the end. Storage is O(number of transactions).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingTimeline {
    breakpoints: Vec<Breakpoint>,
}

impl HoldingTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a timeline from persisted breakpoints, re-checking every invariant.
    pub fn from_breakpoints(
        breakpoints: impl IntoIterator<Item = Breakpoint>,
    ) -> Result<Self, TimelineError> {
        let mut timeline = Self::new();
        let mut iter = breakpoints.into_iter();
        if let Some(first) = iter.next() {
            timeline.initialize(first.effective_date, first.quantity)?;
        }
        for breakpoint in iter {
            timeline.append_breakpoint(breakpoint.effective_date, breakpoint.quantity)?;
        }
        Ok(timeline)
    }

    /// Sets the sole starting breakpoint (the initial allocation).
    pub fn initialize(&mut self, date: NaiveDate, quantity: Decimal) -> Result<(), TimelineError> {
        if let Some(first) = self.breakpoints.first() {
            return Err(TimelineError::AlreadyInitialized {
                date: first.effective_date,
            });
        }
        check_quantity(date, quantity)?;
        self.breakpoints.push(Breakpoint::new(date, quantity));
        Ok(())
    }

    /// Effective quantity on `date`: the latest breakpoint on or before it,
    /// or zero if `date` precedes the first breakpoint.
    pub fn quantity_at(&self, date: NaiveDate) -> Result<Decimal, TimelineError> {
        if self.breakpoints.is_empty() {
            return Err(TimelineError::Uninitialized);
        }
        let idx = self
            .breakpoints
            .partition_point(|bp| bp.effective_date <= date);
        Ok(match idx {
            0 => Decimal::ZERO,
            n => self.breakpoints[n - 1].quantity,
        })
    }

    /// Appends a breakpoint strictly after the latest one.
    pub fn append_breakpoint(
        &mut self,
        date: NaiveDate,
        quantity: Decimal,
    ) -> Result<(), TimelineError> {
        self.check_append(date, quantity)?;
        self.breakpoints.push(Breakpoint::new(date, quantity));
        Ok(())
    }

    /// Checks whether [`append_breakpoint`](Self::append_breakpoint) would succeed.
    pub fn check_append(&self, date: NaiveDate, quantity: Decimal) -> Result<(), TimelineError> {
        let last = self.breakpoints.last().ok_or(TimelineError::Uninitialized)?;
        if date <= last.effective_date {
            return Err(TimelineError::OutOfOrder {
                date,
                last_date: last.effective_date,
            });
        }
        check_quantity(date, quantity)
    }

    /// Undoes the latest append. Never removes the initial breakpoint.
    pub(crate) fn rollback_last(&mut self) -> Option<Breakpoint> {
        if self.breakpoints.len() > 1 {
            self.breakpoints.pop()
        } else {
            None
        }
    }

    pub fn breakpoints(&self) -> &[Breakpoint] {
        &self.breakpoints
    }

    pub fn is_initialized(&self) -> bool {
        !self.breakpoints.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.breakpoints.first().map(|bp| bp.effective_date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.breakpoints.last().map(|bp| bp.effective_date)
    }

    pub fn latest_quantity(&self) -> Option<Decimal> {
        self.breakpoints.last().map(|bp| bp.quantity)
    }

    pub fn len(&self) -> usize {
        self.breakpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.breakpoints.is_empty()
    }
}

fn check_quantity(date: NaiveDate, quantity: Decimal) -> Result<(), TimelineError> {
    if quantity.is_sign_negative() && !quantity.is_zero() {
        return Err(TimelineError::NegativeQuantity { date, quantity });
    }
    Ok(())
}
