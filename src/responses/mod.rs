//! Responses resource: create (blocking or streamed), retrieve, delete, cancel,
//! input items and input token counts.

mod client;
mod types;

pub use client::Responses;
pub use types::{
    CreateResponseRequest, InputItem, InputTokenCount, InputTokensRequest, ListInputItemsParams,
    ResponseDeleted, ResponseObject, ResponseUsage, RetrieveResponseParams,
};
