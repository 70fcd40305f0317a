pub mod create;
pub mod delete;
pub mod list;
pub mod scoped;

pub use create::CreateRequest;
pub use delete::DeleteRequest;
pub use list::ListAllRequest;
pub use scoped::ScopedRequest;

use serde::{Deserialize, Serialize};

use common::content::ContentRecord;

/// `{ data: [...] }` body shared by the listing routes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentList {
    pub data: Vec<ContentRecord>,
}
