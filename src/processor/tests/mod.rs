//! Tests for the batch processing engine
