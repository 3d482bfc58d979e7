//! Apiworker - asynchronous task-reconciliation worker.
//!
//! Drains a durable, at-least-once task queue and executes cleanup and
//! notification work against a keyspace-addressed store: cascading deletes
//! of compound resources, weekly reminder scheduling under a distributed
//! once-per-period gate, and fan-out emission of subordinate tasks.

pub mod domain;
pub mod infrastructure;
pub mod services;
