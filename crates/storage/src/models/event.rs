use sqlx::FromRow;
use uuid::Uuid;

/// An event joined with its event type's point value.
///
/// Either side of the join may be missing; such events score nothing.
#[derive(Debug, Clone, FromRow)]
pub struct ScoredEvent {
    pub event_id: Uuid,
    pub star_id: Option<i32>,
    pub value: Option<i32>,
}
