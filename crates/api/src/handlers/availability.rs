// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Per-user, per-day availability.

use chrono::NaiveDate;
use fleetbook_domain::{AvailabilityChange, AvailabilityStatus, format_day};
use fleetbook_persistence::{AvailabilityData, SqlitePersistence};
use time::OffsetDateTime;

use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::error::ApiError;
use crate::handlers::{parse_optional_value, parse_query_day, require_day};
use crate::request_response::{
    AvailabilityInfo, AvailabilityQuery, ListAvailabilityResponse, SetAvailabilityRequest,
    SetAvailabilityResponse,
};

/// Lists availability in an inclusive day range. Drivers only see their
/// own entries.
///
/// # Errors
///
/// Returns an error if a bound is missing or invalid, `from` is after `to`,
/// or a Driver asks about someone else.
pub fn list_availability(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    query: &AvailabilityQuery,
) -> Result<ListAvailabilityResponse, ApiError> {
    let from: NaiveDate = parse_query_day("from", query.from.as_deref())?
        .ok_or_else(|| ApiError::invalid("from", "Start day is required"))?;
    let to: NaiveDate = parse_query_day("to", query.to.as_deref())?
        .ok_or_else(|| ApiError::invalid("to", "End day is required"))?;
    if from > to {
        return Err(ApiError::invalid(
            "from",
            "Start day must not be after end day",
        ));
    }

    let user_id: Option<i64> = match query.user_id {
        Some(user_id) => {
            AuthorizationService::require_self_or_dispatcher(actor, user_id, "list_availability")?;
            Some(user_id)
        }
        None if actor.is_dispatcher() => None,
        None => Some(actor.id),
    };

    let entries: Vec<AvailabilityData> = persistence.list_availability(from, to, user_id)?;
    Ok(ListAvailabilityResponse {
        entries: entries.iter().map(AvailabilityInfo::from).collect(),
    })
}

/// Sets or clears availability for one user on one day.
///
/// An absent status clears the record. The day is normalized to its UTC
/// calendar date.
///
/// # Errors
///
/// Returns an error if the day or status is invalid, a Driver targets
/// someone else, or the user does not exist.
pub fn set_availability(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    request: &SetAvailabilityRequest,
    now: OffsetDateTime,
) -> Result<SetAvailabilityResponse, ApiError> {
    let user_id: i64 = request.user_id.unwrap_or(actor.id);
    AuthorizationService::require_self_or_dispatcher(actor, user_id, "set_availability")?;
    let day: NaiveDate = require_day("day", &request.day)?;
    let status: Option<AvailabilityStatus> = parse_optional_value(request.status.as_deref())?;
    let change: AvailabilityChange =
        AvailabilityChange::from_request(status, request.note.as_deref());

    let entry: Option<AvailabilityData> = persistence.set_availability(user_id, day, &change, now)?;
    Ok(SetAvailabilityResponse {
        user_id,
        day: format_day(day),
        entry: entry.as_ref().map(AvailabilityInfo::from),
    })
}
