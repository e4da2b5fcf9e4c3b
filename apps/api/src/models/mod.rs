pub mod contact;
pub mod interaction;
