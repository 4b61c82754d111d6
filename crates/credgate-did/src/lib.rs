//! Credgate DID Layer
//!
//! Resolves decentralised identifiers to DID documents and extracts the
//! public keys they publish:
//! - DID parsing and the W3C DID document model
//! - A static registry of local method strategies (key, web, pkh, peer, jwk)
//! - A universal resolver client with a cached method list
//! - A composite resolver trying local strategies before the remote service
//! - Key extraction across multibase, base58 and JWK encodings

pub mod did;
pub mod document;
pub mod error;
pub mod key_extractor;
pub mod local;
pub mod methods;
pub mod remote;
pub mod resolver;

pub use did::Did;
pub use document::{
    Document, DocumentMetadata, ResolutionMetadata, ResolutionOptions, ResolutionResult, Service,
    VerificationMethod, VerificationRelationship,
};
pub use error::{KeyError, ResolverError};
pub use key_extractor::extract_public_key;
pub use local::LocalResolver;
pub use methods::{lookup, registered_methods, MethodResolver};
pub use remote::{RemoteResolver, RemoteResolverOptions};
pub use resolver::{DidResolver, Resolver};
