//! Domain layer: models, trait seams and services.

pub mod activities;
pub mod batch;
pub mod communication;
pub mod contacts;
pub mod rules;
pub mod templates;
pub mod tokens;
