//! dotweave Core Types and Definitions
//!
//! This crate provides the foundational types shared by the dotweave parser
//! and layout pipeline. It includes:
//!
//! - **Geometry**: Point, size and rectangle value types ([`geometry`] module)
//! - **Engines**: The layout algorithm variants offered by Graphviz ([`engine::LayoutEngine`])
//! - **Attributes**: Ordered attribute maps for pass-through DOT attributes ([`attributes::Attributes`])
//! - **Graph model**: Traits an application implements to be laid out ([`graph`] module)
//! - **Notifications**: Payload-free change signalling ([`notify::ChangeNotifier`])
//! - **Colors**: CSS color handling ([`color::Color`])

pub mod attributes;
pub mod color;
pub mod engine;
pub mod geometry;
pub mod graph;
pub mod notify;
pub mod simple;
