//! Shared record types.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ApiObject`] | Decode trait for records that keep their raw JSON |
//! | [`ListPage`] | Generic `{"object":"list","data":[...]}` page |

pub mod list;

pub use list::{ApiObject, ListPage};
