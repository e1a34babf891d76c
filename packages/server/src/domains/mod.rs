// Business domains
pub mod contacts;
pub mod schools;
