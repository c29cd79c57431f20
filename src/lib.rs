//! Guestflow - WhatsApp Travel-Detail Capture
//!
//! This crate implements the conversational capture engine that collects
//! structured travel itineraries from event guests over WhatsApp, plus the
//! RSVP side-channel that shares its messaging window.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
