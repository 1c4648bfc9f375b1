pub mod any_sql;
pub mod cursor;
pub(crate) mod ident;
pub mod insert;
pub mod limits;
pub mod request;
pub mod response;
pub mod table;
pub mod types;
