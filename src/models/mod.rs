//! Modelos del sistema
//!
//! Este módulo contiene las entidades que mapean exactamente
//! al schema PostgreSQL, junto con su normalización.

pub mod driver;
pub mod infraction_type;
pub mod officer;
pub mod ticket;
pub mod vehicle;

pub use driver::Driver;
pub use infraction_type::{InfractionType, Severity};
pub use officer::{Officer, OfficerRole};
pub use ticket::Ticket;
pub use vehicle::Vehicle;
