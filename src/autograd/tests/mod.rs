//! Tests for autograd operations with gradient checking
