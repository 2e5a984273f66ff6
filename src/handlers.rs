pub mod auth;
pub mod cards;
pub mod empresa;
pub mod nfc;
pub mod people;
pub mod pets;
