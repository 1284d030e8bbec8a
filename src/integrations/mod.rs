//! External service integrations.

pub mod clients {
    pub use crate::clients::*;
}

pub mod services {
    pub use crate::services::*;
}

pub mod scraping_client {
    pub use crate::scraping_client::*;
}
