//! Test fixtures shared across codec tests.
