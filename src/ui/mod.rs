pub mod components;
pub mod layout;
pub mod login;
pub mod theme;
