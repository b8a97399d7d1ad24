// /////////////////////////////////////////////////////////////////////////////
// Lakehouse Ingest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Storage adapters for the three lakehouse surfaces: tabular (SQLite via
//! `sqlx`), vector (in-process flat store with IVF-style index sizing),
//! and graph (in-process entity/relationship store).

pub mod graph;
pub mod tabular;
pub mod vector;

pub use graph::InMemoryGraphStore;
pub use tabular::SqlxTabularStore;
pub use vector::FlatVectorStore;
