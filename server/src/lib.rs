//! Lokakelas Server
//!
//! Backend for a content-gated e-learning storefront: a public course
//! catalog with tiered access, a member portal, and an admin back-office
//! for courses, homepage content, buyers, and announcements.

pub mod access;
pub mod announcements;
pub mod api;
pub mod buyers;
pub mod catalog;
pub mod config;
pub mod db;
pub mod enrollments;
pub mod homepage;
pub mod member;
pub mod ordering;
pub mod webhook;
