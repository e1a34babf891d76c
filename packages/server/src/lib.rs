// NIL AD Rolodex - API Core
//
// Builds a directory of college athletic-department contacts: a language model
// proposes contact rows for a search focus, the rows are validated against a
// fixed schema, and appended to an append-only spreadsheet with an audit trail.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
