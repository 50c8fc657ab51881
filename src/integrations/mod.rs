//! External service integrations.

pub mod notion_client {
    pub use crate::notion_client::*;
}
