//! Rail itinerary search and booking service.
//!
//! Answers two questions: "which connections take me from here to there
//! under the layover rules?" and "book this connection for these
//! travelers, exactly once".

pub mod booking;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod planner;
pub mod store;
pub mod web;
