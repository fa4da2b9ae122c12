//! Items that can be put on an order.

pub mod item_api;
pub mod item_repository;
pub mod item_service;
