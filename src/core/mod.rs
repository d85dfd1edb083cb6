pub mod actions;
pub mod auth;
pub mod client;
pub mod items;
pub mod transport;

pub use crate::domain::model::{
    AccessGrant, Action, ActionKind, Credential, ItemRequest, ModifyOutcome, ModifyRequest,
    ModifyResponse, RequestToken, RetrieveResponse, Session,
};
pub use crate::domain::ports::{PocketApi, Transport};
pub use crate::utils::error::Result;
