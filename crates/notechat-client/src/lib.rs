//! REST clients for the two external collaborators.
//!
//! [`NodeClient`] speaks to the ledger node, [`CustodyClient`] to the
//! key-custody service. Both authenticate every request with an API
//! token header and map transport or status failures into the central
//! error type. Binary fields (notes, signed transactions) travel
//! hex-encoded inside JSON bodies.

pub mod custody;
pub mod node;

pub use custody::CustodyClient;
pub use node::NodeClient;

/// Header carrying the API token on every request.
pub(crate) const API_TOKEN_HEADER: &str = "X-API-Token";
