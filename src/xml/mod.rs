//! Legacy XML API adapter
//!
//! A single `execute` primitive posts an action to `/db/{dbid}` and returns
//! the raw XML; `call` parses it and turns a non-zero `errcode` into
//! `Error::XmlApi`. The typed methods on [`XmlClient`] are thin wrappers
//! that build the request fragment and pick fields out of the response.

mod client;
mod parser;
mod types;

pub use client::{XmlClient, ACTION_HEADER, MAIN_DBID};
pub use parser::{as_list, escape, text_of, unescape, xml_to_json, TEXT_KEY};
pub use types::{UserInfo, UserRole, XmlAction};
