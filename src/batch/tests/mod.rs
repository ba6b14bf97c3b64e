//! Batch manager test suites
