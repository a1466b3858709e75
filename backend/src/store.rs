use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;
use uuid::Uuid;

use crate::db::DbPool;
use crate::models::{Listing, ListingSummary, NewListing, NewUser, Purpose};
use crate::schema::{listings, users};

#[derive(Debug, Error)]
pub enum StoreError {
    /// Another listing already holds the code we tried to claim.
    #[error("listing code already taken")]
    DuplicateCode,
    #[error("database connection failed: {0}")]
    Connection(String),
    #[error("database query failed: {0}")]
    Query(String),
}

/// Persistence seam for listings and users. Implementations must be safe to
/// share behind an `Arc` so handlers can move calls onto blocking threads.
pub trait ListingStore: Send + Sync {
    /// Number of listings currently stored for `purpose`. Callers treat this
    /// as an estimate, not a reservation.
    fn count_by_purpose(&self, purpose: Purpose) -> Result<i64, StoreError>;

    /// Persists a listing, enforcing code uniqueness. Returns
    /// [`StoreError::DuplicateCode`] when the code lost a race to another
    /// submission.
    fn insert_listing(&self, listing: NewListing) -> Result<Listing, StoreError>;

    fn list_listings(&self) -> Result<Vec<Listing>, StoreError>;

    fn get_listing(&self, listing_id: Uuid) -> Result<Option<Listing>, StoreError>;

    fn admin_listings(&self) -> Result<Vec<ListingSummary>, StoreError>;

    /// Flags a listing as admin-verified. Returns `false` when no listing has
    /// that id.
    fn mark_verified(&self, listing_id: Uuid) -> Result<bool, StoreError>;

    fn delete_listing(&self, listing_id: Uuid) -> Result<bool, StoreError>;

    /// Records an account by email, keeping the existing row when the email
    /// is already known.
    fn save_user(&self, email: &str, name: Option<&str>) -> Result<(), StoreError>;
}

/// Diesel-backed store over a pooled Postgres connection.
pub struct PgListingStore {
    pool: DbPool,
}

impl PgListingStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<PooledConnection<ConnectionManager<PgConnection>>, StoreError> {
        self.pool
            .get()
            .map_err(|e| StoreError::Connection(e.to_string()))
    }
}

/// Map Diesel errors to store errors, singling out the unique-index
/// violation that drives code retry.
fn map_diesel_error(error: DieselError) -> StoreError {
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            StoreError::DuplicateCode
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
            StoreError::Connection(info.message().to_string())
        }
        other => StoreError::Query(other.to_string()),
    }
}

impl ListingStore for PgListingStore {
    fn count_by_purpose(&self, purpose: Purpose) -> Result<i64, StoreError> {
        let mut conn = self.conn()?;
        listings::table
            .filter(listings::purpose.eq(purpose.as_str()))
            .count()
            .get_result(&mut conn)
            .map_err(map_diesel_error)
    }

    fn insert_listing(&self, listing: NewListing) -> Result<Listing, StoreError> {
        let mut conn = self.conn()?;
        diesel::insert_into(listings::table)
            .values(&listing)
            .returning(Listing::as_returning())
            .get_result(&mut conn)
            .map_err(map_diesel_error)
    }

    fn list_listings(&self) -> Result<Vec<Listing>, StoreError> {
        let mut conn = self.conn()?;
        listings::table
            .order(listings::created_at.desc())
            .select(Listing::as_select())
            .load(&mut conn)
            .map_err(map_diesel_error)
    }

    fn get_listing(&self, listing_id: Uuid) -> Result<Option<Listing>, StoreError> {
        let mut conn = self.conn()?;
        listings::table
            .find(listing_id)
            .select(Listing::as_select())
            .first(&mut conn)
            .optional()
            .map_err(map_diesel_error)
    }

    fn admin_listings(&self) -> Result<Vec<ListingSummary>, StoreError> {
        let mut conn = self.conn()?;
        listings::table
            .order(listings::created_at.desc())
            .select(ListingSummary::as_select())
            .load(&mut conn)
            .map_err(map_diesel_error)
    }

    fn mark_verified(&self, listing_id: Uuid) -> Result<bool, StoreError> {
        let mut conn = self.conn()?;
        let updated = diesel::update(listings::table.find(listing_id))
            .set(listings::verified.eq(true))
            .execute(&mut conn)
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    fn delete_listing(&self, listing_id: Uuid) -> Result<bool, StoreError> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(listings::table.find(listing_id))
            .execute(&mut conn)
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    fn save_user(&self, email: &str, name: Option<&str>) -> Result<(), StoreError> {
        let mut conn = self.conn()?;
        let user = NewUser {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: name.map(str::to_string),
        };
        diesel::insert_into(users::table)
            .values(&user)
            .on_conflict(users::email)
            .do_nothing()
            .execute(&mut conn)
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}
