pub mod alert;
pub mod booking;
pub mod ledger;
pub mod procedures;
pub mod sensor;
