use crate::shared::entity::{Entity, ID};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A `Stay` is a guest's booked interval at a property.
///
/// A `Stay` is active on every day `D` where `check_in <= D <= check_out`.
/// The check out day itself is active (the guest leaves that morning) but
/// it is never counted as a night of the stay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stay {
    pub id: ID,
    pub property_name: String,
    pub guest_name: String,
    /// Address the notifications are sent to, usually a phone number
    pub contact: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

#[derive(Error, Debug, PartialEq)]
pub enum InvalidStayError {
    #[error("Check out date: {check_out} must be after check in date: {check_in}")]
    NoNights {
        check_in: NaiveDate,
        check_out: NaiveDate,
    },
}

/// The part of a `Stay` a given day falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StayPhase {
    /// The check in day
    Arrival,
    /// The check out day
    Departure,
    /// A day strictly between check in and check out
    MidStay,
}

impl StayPhase {
    /// The substring a trigger type must contain to fire in this phase
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Arrival => "checkin",
            Self::Departure => "checkout",
            Self::MidStay => "multinight",
        }
    }
}

impl Stay {
    /// Creates a new `Stay` as done by reservation intake. Stays without
    /// at least one night are rejected here so that the phase computation
    /// never has to guess about them.
    pub fn new(
        property_name: String,
        guest_name: String,
        contact: String,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<Self, InvalidStayError> {
        if check_out <= check_in {
            return Err(InvalidStayError::NoNights {
                check_in,
                check_out,
            });
        }
        Ok(Self {
            id: Default::default(),
            property_name,
            guest_name,
            contact,
            check_in,
            check_out,
        })
    }

    pub fn is_active_on(&self, day: NaiveDate) -> bool {
        self.check_in <= day && day <= self.check_out
    }

    /// A day is in at most one phase. A degenerate stay with
    /// check in == check out only ever yields `Arrival`.
    pub fn phase_on(&self, day: NaiveDate) -> Option<StayPhase> {
        if self.check_in == day {
            Some(StayPhase::Arrival)
        } else if self.check_out == day {
            Some(StayPhase::Departure)
        } else if self.check_in < day && day < self.check_out {
            Some(StayPhase::MidStay)
        } else {
            None
        }
    }

    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }
}

impl Entity for Stay {
    fn id(&self) -> &ID {
        &self.id
    }
}
