//! Access-log ingestion.
//!
//! Raw rows are read from a CSV export of a web-server log
//! ([`reader::AccessLogReader`]), narrowed to successful page requests
//! ([`filter::RequestFilter`]) and converted to the [`record::RequestEvent`]
//! stream that the sessionizer consumes.

pub mod filter;
pub mod reader;
pub mod record;

pub use self::filter::RequestFilter;
pub use self::reader::AccessLogReader;
pub use self::record::{AccessRecord, RequestEvent};
