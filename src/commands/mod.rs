pub mod convert;
pub mod extract;
pub mod inventory;
pub mod status;
