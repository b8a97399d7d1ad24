// /////////////////////////////////////////////////////////////////////////////
// Lakehouse Ingest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Application Layer
//!
//! Coordinates the domain and infrastructure layers into the one use case
//! this crate exposes: ingesting a customer's folders into the lakehouse.
//! [`orchestrator::Orchestrator`] is the sole entry point; everything else
//! here is its supporting cast (crawl result plumbing, run options).

pub mod orchestrator;
