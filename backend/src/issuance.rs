use thiserror::Error;
use uuid::Uuid;

use crate::models::{Listing, NewListing, NewListingRequest, Purpose};
use crate::store::{ListingStore, StoreError};

/// Service-area token embedded in every listing code.
const REGION_CODE: &str = "RJN";

/// How many codes a single submission may race for before giving up.
const MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Error)]
pub enum IssuanceError {
    #[error("invalid purpose {0:?}, expected SELL or RENT")]
    InvalidPurpose(String),
    #[error("could not assign a unique listing code after {attempts} attempts, please resubmit")]
    Exhausted { attempts: u32 },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Formats a candidate listing code, e.g. `S-RJN-0004`.
///
/// Pure formatting; uniqueness comes from the caller varying `sequence`.
/// Sequences below 1000 are zero-padded to four digits, wider ones keep
/// their full width.
pub fn format_code(purpose: Purpose, sequence: i64) -> String {
    format!("{}-{}-{:04}", purpose.prefix(), REGION_CODE, sequence)
}

/// Issues a code and persists the listing, retrying on code collisions.
///
/// The per-purpose count is an estimate, not a reservation: two submissions
/// can observe the same count and race for the same code. The unique index
/// on the code column picks the winner; the loser re-estimates against the
/// advanced count. After [`MAX_ATTEMPTS`] losses the submission fails with
/// [`IssuanceError::Exhausted`] and nothing is persisted.
pub fn issue_listing(
    store: &dyn ListingStore,
    owner_email: &str,
    request: NewListingRequest,
) -> Result<Listing, IssuanceError> {
    let purpose = Purpose::parse(&request.purpose)
        .ok_or_else(|| IssuanceError::InvalidPurpose(request.purpose.clone()))?;

    for attempt in 1..=MAX_ATTEMPTS {
        let sequence = store.count_by_purpose(purpose)? + 1;
        let code = format_code(purpose, sequence);

        let listing = NewListing {
            id: Uuid::new_v4(),
            code: code.clone(),
            title: request.title.clone(),
            price: request.price,
            location: request.location.clone(),
            purpose: purpose.as_str().to_string(),
            identity: request.identity.clone(),
            description: request.description.clone(),
            images: request.images.clone(),
            contact_name: request.contact_name.clone(),
            contact_phone: request.contact_phone.clone(),
            owner_email: owner_email.to_string(),
        };

        match store.insert_listing(listing) {
            Ok(created) => {
                log::info!("Issued listing code {} on attempt {}", created.code, attempt);
                return Ok(created);
            }
            Err(StoreError::DuplicateCode) => {
                log::warn!(
                    "Listing code {} already taken, retrying ({}/{})",
                    code,
                    attempt,
                    MAX_ATTEMPTS
                );
            }
            Err(other) => return Err(IssuanceError::Store(other)),
        }
    }

    Err(IssuanceError::Exhausted {
        attempts: MAX_ATTEMPTS,
    })
}
