pub mod patients;
pub mod requests;
