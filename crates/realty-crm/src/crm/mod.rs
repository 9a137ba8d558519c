//! CRM core: lead management, reporting aggregation, bulk transfer, and
//! site-visit scheduling over pluggable persistence.

pub mod access;
pub mod http;
pub mod leads;
pub mod visits;
