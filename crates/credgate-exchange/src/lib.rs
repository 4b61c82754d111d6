//! Credgate Presentation Exchange
//!
//! - Presentation definitions and their structural validation
//! - Presentation submissions and verified submission data
//! - VP/VC JWT claim parsing
//! - JSONPath field constraints and filters
//! - The [`SubmissionVerifier`] contract and a JWT presentation verifier
//! - Builders for signed credentials and submissions

pub mod builder;
pub mod constraints;
pub mod definition;
pub mod error;
pub mod presentation;
pub mod submission;
pub mod verifier;

pub use builder::{build_presentation_submission, sign_credential_jwt, PresentationClaim, Signer};
pub use definition::{
    ClaimFormat, Constraints, Field, Filter, InputDescriptor, JwtFormat, PresentationDefinition,
};
pub use error::ExchangeError;
pub use presentation::{
    parse_credential_jwt, parse_presentation_jwt, ParsedPresentation, VcClaims, VerifiablePresentation,
    VpClaims,
};
pub use submission::{DescriptorMap, PresentationSubmission, VerifiedSubmissionData};
pub use verifier::{PresentationExchangeVerifier, PresentationTarget, SubmissionVerifier, JWT_VC_FORMAT};
