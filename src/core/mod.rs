//! Core business logic, independent of the chat interface.

/// Absence log
pub mod absence;
/// `DD/MM/YYYY` dates and month periods
pub mod dates;
/// Design image catalogue
pub mod designs;
/// Daily production figures and derived totals
pub mod production;
/// Monthly and individual production reports
pub mod report;
/// Employee roster
pub mod roster;
/// Row-addressed sheet storage
pub mod sheet;
/// Work orders
pub mod work_order;
