//! Client for JsonWebDB, a database reached over HTTP with JSON envelopes.
//!
//! [`AnySql`] runs sql text, [`Insert`] writes [`Record`]s into a [`Table`],
//! and selects come back as a [`Cursor`]. Everything goes through a
//! [`Session`]; [`HttpSession`] is the stock implementation.

pub mod core;
pub mod error;
pub mod session;

pub use crate::core::{
    any_sql::AnySql,
    cursor::{Cursor, Row},
    insert::Insert,
    request::{Invoke, Request, RequestKind},
    response::Response,
    table::Table,
    types::{BindValue, ColumnDefinition, Precision, Record},
};
pub use error::{JwdbError, JwdbResult};
pub use session::{HttpSession, HttpSessionConfig, Session};
