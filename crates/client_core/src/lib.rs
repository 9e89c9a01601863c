//! Single-shot picture-of-the-day pipeline: fetch once, classify, transition once.

mod controller;
mod fetcher;

pub use controller::{transition, StateController};
pub use fetcher::{Fetcher, HttpFetcher, Outcome, TransportError};
