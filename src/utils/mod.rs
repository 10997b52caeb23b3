//! Utilities module aggregator exposing testing helpers.
