//! Resolves root GraphQL query and mutation fields against an [`EntityStore`].

pub mod context;
pub mod error;
pub mod mutation;
pub mod naming;
pub mod resolver;
mod shape;
pub mod store;

pub use context::{RequestContext, CUSTOMER_ENTITY, SALES_CHANNEL_ENTITY};
pub use error::{QueryResolvingError, OPAQUE_MESSAGE};
pub use mutation::{Mutation, MutationAction};
pub use naming::Inflector;
pub use resolver::QueryResolver;
pub use store::{EntityStore, StoreError, WriteResult};
