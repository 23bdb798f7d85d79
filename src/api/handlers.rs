//! Request handlers for the four poll endpoints.

use crate::{
    context::AppContext,
    core::{self, ResultsView},
    errors::{Error, Result},
    models::{ApartmentNumber, Choice},
};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};

/// `GET /api/check-apartment/{number}` response
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckApartmentResponse {
    /// Whether the apartment has voted
    pub voted: bool,
    /// Who voted, when it has
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// `POST /api/vote` body
#[derive(Debug, Deserialize, Serialize)]
pub struct VoteRequest {
    /// Apartment casting the vote
    pub apartment_number: i64,
    /// Display name of the voter
    pub voter_name: String,
    /// Raw choice, parsed by the core
    pub vote: String,
}

/// `POST /api/vote` success response
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoteResponse {
    /// Always `"success"`
    pub status: String,
}

/// `GET /api/results` response
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ResultsResponse {
    /// Poll closed
    Revealed {
        /// Ballots for
        #[serde(rename = "for")]
        for_votes: u64,
        /// Ballots against
        against: u64,
        /// Sum of all buckets
        total: u64,
        /// Always false
        hidden: bool,
    },
    /// Poll still open
    Hidden {
        /// Always true
        hidden: bool,
        /// When results are published
        message: String,
    },
}

/// `GET /api/poll-status` response
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PollStatusResponse {
    /// Whether the poll has ended
    pub is_ended: bool,
    /// Local end time, `YYYY-MM-DDTHH:MM:SS`
    pub end_date: String,
}

/// Reports whether an apartment has voted and, if so, who voted.
pub async fn check_apartment(
    State(ctx): State<AppContext>,
    Path(number): Path<String>,
) -> Result<Json<CheckApartmentResponse>> {
    // Gate before parsing so a closed poll wins over a malformed number
    ctx.schedule().ensure_open(ctx.now())?;
    let number = ApartmentNumber::parse(&number)?;

    let name = core::has_voted(&ctx, number.get()).await?;
    Ok(Json(CheckApartmentResponse {
        voted: name.is_some(),
        name,
    }))
}

/// Casts a vote.
pub async fn submit_vote(
    State(ctx): State<AppContext>,
    payload: std::result::Result<Json<VoteRequest>, JsonRejection>,
) -> Result<Json<VoteResponse>> {
    ctx.schedule().ensure_open(ctx.now())?;
    let Json(request) = payload.map_err(|e| Error::invalid_input(e.body_text()))?;

    core::submit_vote(
        &ctx,
        request.apartment_number,
        &request.voter_name,
        &request.vote,
    )
    .await?;

    Ok(Json(VoteResponse {
        status: "success".to_string(),
    }))
}

/// Returns the results, or when they will be published.
pub async fn get_results(State(ctx): State<AppContext>) -> Result<Json<ResultsResponse>> {
    let response = match core::tally(&ctx).await? {
        ResultsView::Hidden { message } => ResultsResponse::Hidden {
            hidden: true,
            message,
        },
        ResultsView::Revealed(tally) => ResultsResponse::Revealed {
            for_votes: tally.get(Choice::For),
            against: tally.get(Choice::Against),
            total: tally.total(),
            hidden: false,
        },
    };
    Ok(Json(response))
}

/// Returns whether the poll has ended and its end time.
pub async fn get_poll_status(State(ctx): State<AppContext>) -> Json<PollStatusResponse> {
    let status = core::poll_status(&ctx);
    Json(PollStatusResponse {
        is_ended: status.is_ended,
        end_date: status.end_time.format("%Y-%m-%dT%H:%M:%S").to_string(),
    })
}
