// src/common/mod.rs

pub mod error;

#[cfg(test)]
pub mod test_support;
