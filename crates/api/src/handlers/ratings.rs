// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Driver reviews.

use fleetbook_domain::{DomainError, ReviewDirection, Role};
use fleetbook_persistence::{ChangeContext, ReviewData, ReviewOutcome, SqlitePersistence, UserData};
use time::OffsetDateTime;
use tracing::debug;

use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::error::ApiError;
use crate::handlers::parse_value;
use crate::request_response::{
    DriverReviewsResponse, ResetRatingsResponse, ReviewInfo, ReviewRequest, ReviewResponse,
};

fn load_driver(persistence: &mut SqlitePersistence, driver_id: i64) -> Result<UserData, ApiError> {
    let user: UserData = persistence
        .get_user_by_id(driver_id)?
        .ok_or_else(|| ApiError::not_found("user", driver_id))?;
    if user.role != Role::Driver {
        return Err(DomainError::NotADriver { user_id: driver_id }.into());
    }
    Ok(user)
}

/// Returns a driver's counters and reviews, newest first.
///
/// # Errors
///
/// Returns an error if a Driver asks about someone else, or the user does
/// not exist or is not a driver.
pub fn list_reviews(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    driver_id: i64,
) -> Result<DriverReviewsResponse, ApiError> {
    AuthorizationService::require_self_or_dispatcher(actor, driver_id, "list_reviews")?;
    let driver: UserData = load_driver(persistence, driver_id)?;
    let reviews: Vec<ReviewData> = persistence.list_reviews(driver_id)?;

    Ok(DriverReviewsResponse {
        driver_id,
        rating_up: driver.rating.up,
        rating_down: driver.rating.down,
        score: driver.rating.score(),
        reviews: reviews.iter().map(ReviewInfo::from).collect(),
    })
}

/// Adds a thumbs-up or thumbs-down review.
///
/// # Errors
///
/// Returns an error if the actor is a Driver, the direction is unknown, the
/// note is too long, or the target is missing or not a driver.
pub fn add_review(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    driver_id: i64,
    request: &ReviewRequest,
    now: OffsetDateTime,
) -> Result<ReviewResponse, ApiError> {
    AuthorizationService::require_dispatcher(actor, "add_review")?;
    let direction: ReviewDirection = parse_value(&request.direction)?;

    let outcome: ReviewOutcome = persistence.add_review(
        driver_id,
        direction,
        request.note.as_deref(),
        ChangeContext::new(Some(actor.id), now),
    )?;
    debug!(driver_id, direction = %direction, reviewed_by = actor.id, "Driver reviewed");

    Ok(ReviewResponse {
        review: ReviewInfo::from(&outcome.review),
        rating_up: outcome.rating.up,
        rating_down: outcome.rating.down,
        score: outcome.rating.score(),
    })
}

/// Deletes all of a driver's reviews and zeroes their counters.
///
/// # Errors
///
/// Returns an error if the actor is a Driver or the target is missing or
/// not a driver.
pub fn reset_ratings(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    driver_id: i64,
) -> Result<ResetRatingsResponse, ApiError> {
    AuthorizationService::require_dispatcher(actor, "reset_ratings")?;
    let removed_reviews: usize = persistence.reset_ratings(driver_id)?;
    debug!(driver_id, removed_reviews, "Driver ratings reset");
    Ok(ResetRatingsResponse {
        driver_id,
        removed_reviews,
    })
}
