// Copyright: Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Removal of the attribution is not allowed, as covered under the AGPL license

#![deny(
    clippy::mutable_key_type,
    clippy::map_entry,
    clippy::boxed_local,
    clippy::let_unit_value,
    clippy::redundant_allocation,
    clippy::bool_comparison,
    clippy::bind_instead_of_map,
    clippy::vec_box,
    clippy::while_let_loop,
    clippy::useless_asref,
    clippy::repeat_once,
    clippy::deref_addrof,
    clippy::suspicious_map,
    clippy::single_char_pattern,
    clippy::for_kv_map,
    clippy::let_and_return,
    clippy::iter_nth,
    clippy::iter_cloned_collect,
    clippy::match_result_ok,
    clippy::cmp_owned,
    clippy::cmp_null,
    clippy::op_ref
)]

//! Circular walk discovery on a neighbourhood street network.
//!
//! The pipeline is: [`street_graph::build_graph`] turns pre-filtered ways into a
//! weighted street graph, [`street_graph::simplify_graph`] reduces it to a
//! decision graph, [`loops::repeatable_edges`] finds the home spur,
//! [`loops::WalkEnumerator`] explores every non-backtracking round trip within
//! the distance budget and [`loops::select_walks`] keeps the best few.

#[macro_use]
extern crate serde;

pub mod config;
pub mod errors;
pub mod geometry;
pub mod loops;
pub mod street_graph;
pub mod ways;


pub use config::{WalkConstraints, WalkSettings};
pub use errors::{ConfigurationError, DataError, LoopError};
pub use loops::{ScoredWalk, ScoringPolicy, SelectionOrder, Walk};
pub use street_graph::{EdgeId, NodeId, StreetGraph};
