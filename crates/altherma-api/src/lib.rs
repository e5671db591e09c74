// altherma-api: wire layer for the Daikin Altherma websocket control protocol.

pub mod envelope;
pub mod error;
pub mod query;
pub mod transport;
pub mod websocket;

pub use envelope::{
    Content, PLAIN_TEXT_ENCODING, RESPONSE_OK, Request, SUCCESS_CODES, is_success, response_code,
};
pub use error::Error;
pub use query::{CONTENT_PATH, QueryOptions, RESPONSE_CODE_PATH, lookup, query};
pub use transport::{ConnectionConfig, Transport};
pub use websocket::Connection;
