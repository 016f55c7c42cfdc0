//! Wire types for the NLQ REST protocol.
//!
//! Everything the server sends or accepts as JSON lives here: the
//! response envelope, request state records, and the user, company,
//! probe and feedback beans. Each type is a plain serde shape whose
//! field names follow the server's camelCase schema; there is no
//! behavior beyond (de)serialization and the odd readiness predicate.
//!
//! Keeping the wire model free of client logic means these types only
//! change when the protocol itself does. The ergonomic client API is
//! built on top of them in `nlq-rs`.

pub mod company;
pub mod envelope;
pub mod feedback;
pub mod probe;
pub mod state;
pub mod user;

pub use company::*;
pub use envelope::*;
pub use feedback::*;
pub use probe::*;
pub use state::*;
pub use user::*;
