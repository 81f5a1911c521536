//! REST API conformance layer for the pet-store service.
//!
//! [`client`] wraps the `/pet` endpoints behind typed requests, and [`suite`]
//! drives them through a fixed sequence of conformance checks. Both require
//! the `api` crate feature.

pub mod client;
pub mod suite;

pub use client::{
    random_pet_id, random_pet_name, ApiCall, ApiError, ApiMessage, Category, Pet, PetClient,
    PetStatus, Tag, DEFAULT_BASE_URL,
};
pub use suite::{
    updated_pet, Check, CheckOutcome, PetSuite, SuiteConfig, SuiteReport, MALFORMED_UPDATE_BODY,
    SAMPLE_IMAGE,
};
