mod buffer;
mod parser;
mod response;
mod types;

pub use buffer::ByteBuilder;
pub use parser::{ParseStatus, RequestParser};
pub use response::{
    CONTENT_HTML, CONTENT_JSON, CONTENT_PLAIN, NOT_FOUND_BODY, SERVER_NAME, not_found,
    respond_options, respond_text,
};
pub use types::{Header, Limits, Method, ParseError, ParseErrorKind, Request};
