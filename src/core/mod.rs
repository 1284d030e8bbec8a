// Domain-layer modules and shared errors/models
pub mod scoring {
    pub use crate::scoring::*;
}

pub mod skill_matcher {
    pub use crate::skill_matcher::*;
}

pub mod network_graph {
    pub use crate::network_graph::*;
}

pub mod github_connection {
    pub use crate::github_connection::*;
}

pub mod behavioral {
    pub use crate::behavioral::*;
}

pub mod cited_evidence {
    pub use crate::cited_evidence::*;
}

pub mod enrichment {
    pub use crate::enrichment::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod errors {
    pub use crate::errors::*;
}
