//! Tests for the dbt-core IR data structures.

mod context;
mod dump;
mod op;
