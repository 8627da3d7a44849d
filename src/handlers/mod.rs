// src/handlers/mod.rs

pub mod audit;
pub mod auth;
pub mod catalog;
pub mod rbac;
pub mod storage;
pub mod tenancy;
