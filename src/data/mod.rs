//! Data access layer.

pub mod repository {
    pub use crate::repository::*;
}

pub mod db {
    pub use crate::db::*;
}

pub mod db_storage {
    pub use crate::db_storage::*;
}

pub mod cache_validator {
    pub use crate::cache_validator::*;
}
