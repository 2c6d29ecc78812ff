//! HTTP/SSE hosting surface for seam agents.
//!
//! Wires the translation core to axum: `POST /v1/runs` streams one run's
//! wire events over SSE and persists the drained transcript, while
//! `GET /v1/threads/{id}/messages` pages the persisted history. Deltas come
//! from a [`producer::UpdateProducer`]; sessions persist through any
//! `seam_session::SessionStore`.
#![allow(missing_docs)]

pub mod http;
pub mod producer;
mod run;
pub mod service;
pub mod sse;
