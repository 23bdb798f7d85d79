//! Eligibility check - has an apartment already voted?

use crate::{
    context::AppContext,
    errors::Result,
    models::ApartmentNumber,
    store::Lookup,
};
use tracing::{debug, instrument};

/// Returns the voter name if `apartment` has already voted, `None` otherwise.
///
/// Only a genuine "no record" from the store means "not voted"; any other storage
/// failure propagates. Fails with [`crate::errors::Error::PollClosed`] once the poll is closed.
#[instrument(skip(ctx))]
pub async fn has_voted(ctx: &AppContext, apartment: i64) -> Result<Option<String>> {
    ctx.schedule().ensure_open(ctx.now())?;
    let number = ApartmentNumber::new(apartment)?;

    match ctx.store().find_apartment(number).await? {
        Lookup::Found(record) => {
            debug!("Apartment {} has already voted.", number);
            Ok(Some(record.voter_name))
        }
        Lookup::NotFound => Ok(None),
    }
}
