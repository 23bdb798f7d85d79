//! Tally engine.
//!
//! Counts are computed fresh from the ballot store on every call and are only
//! revealed once the poll has closed.

use crate::{context::AppContext, errors::Result, models::Choice};
use tracing::{info, instrument, warn};

/// Per-choice ballot counts. There is one counter per [`Choice`] variant and the
/// total is always their sum.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tally {
    counts: [u64; Choice::ALL.len()],
}

impl Tally {
    /// Adds `count` ballots to the bucket of `choice`.
    pub fn add(&mut self, choice: Choice, count: u64) {
        self.counts[choice.index()] += count;
    }

    /// Ballots cast for `choice`.
    #[must_use]
    pub const fn get(&self, choice: Choice) -> u64 {
        self.counts[choice.index()]
    }

    /// All counted ballots.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

/// What the results endpoint may show at a given moment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResultsView {
    /// Poll still open; carries the human-readable publication time
    Hidden {
        /// Message telling voters when results appear
        message: String,
    },
    /// Poll closed; the final counts
    Revealed(Tally),
}

/// Produces the results view for the current moment.
///
/// Stored values that are not a known choice are skipped and excluded from every
/// counter.
#[instrument(skip(ctx))]
pub async fn tally(ctx: &AppContext) -> Result<ResultsView> {
    let schedule = ctx.schedule();
    if schedule.is_open(ctx.now()) {
        let ends = schedule.ends_at_local();
        return Ok(ResultsView::Hidden {
            message: format!(
                "Results will be published on {} at {}",
                ends.format("%d/%m/%Y"),
                ends.format("%H:%M")
            ),
        });
    }

    let mut tally = Tally::default();
    for stored in ctx.store().ballot_counts().await? {
        match stored.value.parse::<Choice>() {
            Ok(choice) => tally.add(choice, stored.count),
            Err(_) => warn!(
                "Skipping {} ballots with unrecognized value {:?}.",
                stored.count, stored.value
            ),
        }
    }

    info!(
        total = tally.total(),
        "Tallied {} for, {} against.",
        tally.get(Choice::For),
        tally.get(Choice::Against)
    );
    Ok(ResultsView::Revealed(tally))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::voting::submit_vote;
    use crate::entities::ballot;
    use crate::errors::Error;
    use crate::store::VoteStore;
    use crate::test_utils::*;
    use chrono::Duration;
    use sea_orm::{EntityTrait, Set};
    use std::sync::Arc;

    fn revealed(view: ResultsView) -> Tally {
        match view {
            ResultsView::Revealed(tally) => tally,
            ResultsView::Hidden { message } => panic!("results still hidden: {message}"),
        }
    }

    #[tokio::test]
    async fn test_hidden_through_end_time() -> Result<()> {
        let (ctx, clock) = open_poll_context(memory_store());
        submit_vote(&ctx, 1, "Dana", "for").await?;
        let end = ctx.schedule().ends_at();

        clock.set(end - Duration::seconds(1));
        assert!(matches!(tally(&ctx).await?, ResultsView::Hidden { .. }));

        clock.set(end);
        assert!(matches!(tally(&ctx).await?, ResultsView::Hidden { .. }));

        clock.set(end + Duration::seconds(1));
        assert_eq!(revealed(tally(&ctx).await?).total(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_hidden_message_names_publication_time() -> Result<()> {
        let (ctx, _clock) = open_poll_context(memory_store());
        let ends = ctx.schedule().ends_at_local();

        let ResultsView::Hidden { message } = tally(&ctx).await? else {
            panic!("results should be hidden while the poll is open");
        };
        assert_eq!(
            message,
            format!(
                "Results will be published on {} at {}",
                ends.format("%d/%m/%Y"),
                ends.format("%H:%M")
            )
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_store_counts_zero() -> Result<()> {
        let (ctx, clock) = open_poll_context(memory_store());
        clock.set(ctx.schedule().ends_at() + Duration::seconds(1));

        let tally = revealed(tally(&ctx).await?);
        assert_eq!(tally, Tally::default());
        assert_eq!(tally.total(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_total_is_sum_of_buckets() -> Result<()> {
        let store = setup_test_store().await?;
        let (ctx, clock) = open_poll_context(Arc::new(store));

        let votes = ["for", "against", "For", "בעד", "against", "for", "נגד"];
        for (apartment, vote) in (1..).zip(votes) {
            submit_vote(&ctx, apartment, "Resident", vote).await?;
        }

        clock.set(ctx.schedule().ends_at() + Duration::days(1));
        let tally = revealed(tally(&ctx).await?);
        assert_eq!(tally.get(Choice::For), 4);
        assert_eq!(tally.get(Choice::Against), 3);
        assert_eq!(tally.total(), 7);
        assert_eq!(
            tally.total(),
            Choice::ALL.iter().map(|c| tally.get(*c)).sum::<u64>()
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_unrecognized_values_are_excluded() -> Result<()> {
        let store = setup_test_store().await?;
        ballot::Entity::insert(ballot::ActiveModel {
            ordering_key: Set(1),
            choice: Set("maybe".to_string()),
        })
        .exec_without_returning(store.connection())
        .await?;
        let (ctx, clock) = open_poll_context(Arc::new(store));
        submit_vote(&ctx, 3, "Dana", "against").await?;

        clock.set(ctx.schedule().ends_at() + Duration::seconds(1));
        let tally = revealed(tally(&ctx).await?);
        assert_eq!(tally.get(Choice::For), 0);
        assert_eq!(tally.get(Choice::Against), 1);
        assert_eq!(tally.total(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_counts_are_fresh_on_every_call() -> Result<()> {
        let store = memory_store();
        let (ctx, clock) = open_poll_context(Arc::clone(&store));
        clock.set(ctx.schedule().ends_at() + Duration::seconds(1));
        assert_eq!(revealed(tally(&ctx).await?).total(), 0);

        // Write directly to the store; the gate only applies to the API operations
        let mut unit = store.begin().await?;
        unit.append_ballot(&crate::models::BallotRecord::new(Choice::For))
            .await?;
        unit.commit().await?;

        assert_eq!(revealed(tally(&ctx).await?).total(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_scenario_single_vote() -> Result<()> {
        let (ctx, clock) = scenario_context(memory_store());

        clock.set(local_instant("2024-03-01 10:00:00"));
        submit_vote(&ctx, 12, "Dana", "For").await?;
        assert!(matches!(
            submit_vote(&ctx, 12, "Dana", "Against").await,
            Err(Error::AlreadyVoted { apartment: 12 })
        ));

        clock.set(local_instant("2024-04-02 00:00:00"));
        let tally = revealed(tally(&ctx).await?);
        assert_eq!(tally.get(Choice::For), 1);
        assert_eq!(tally.get(Choice::Against), 0);
        assert_eq!(tally.total(), 1);
        Ok(())
    }
}
