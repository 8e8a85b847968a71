pub mod archive;
pub mod error;
pub mod extract;
pub mod filter;
pub mod input;
pub mod output;
pub mod pipeline;
pub mod schema;
pub mod source;
pub mod value;

pub use error::{Error, ErrorKind, Result};
pub use extract::{ExtractOptions, ExtractRequest, Summary, extract, extract_with};
pub use schema::Schema;
