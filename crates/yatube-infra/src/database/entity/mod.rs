//! SeaORM entities, one per table.

pub mod comment;
pub mod follow;
pub mod group;
pub mod post;
pub mod user;

/// `NotSet` for an unsaved id so the database assigns one on insert.
pub(crate) fn id_value(id: i64) -> sea_orm::ActiveValue<i64> {
    if id == yatube_core::domain::UNSAVED_ID {
        sea_orm::ActiveValue::NotSet
    } else {
        sea_orm::ActiveValue::Unchanged(id)
    }
}
