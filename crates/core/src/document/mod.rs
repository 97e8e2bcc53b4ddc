//! # Document composition
//!
//! Pure functions turning an [`AuthorizationRecord`](authorization::AuthorizationRecord)
//! into printable markup: the body document plus the header and footer fragments the
//! rendering engine stamps on every page. Nothing here touches the browser.

pub mod composer;
pub mod format;
pub mod page_templates;
pub mod sections;

pub use composer::compose_document;
pub use format::{escape_html, format_date, format_timestamp, request_code};
pub use page_templates::{footer_template, header_template, PageTemplates};
