//! Domain types - the vocabulary of an observed request.

mod claims;
mod fields;
mod record;
mod stack;

pub use claims::{IdentityClaims, USER_CLAIMS_KEY, USER_ID_ENTRY, user_id_from_claims};
pub use fields::{FieldSet, FieldValue};
pub use record::{LogLevel, LogRecord};
pub use stack::StackSnapshot;
